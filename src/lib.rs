//! # Osprey
//!
//!> *Sends your model off to train and brings back what it caught*
//!
//! A pipeline step that launches a SageMaker training job, follows it to completion,
//! relays its logs and hands the model artifacts to downstream steps.
//!
//! This crate serves as an entry point, re-exporting the core types, the training
//! job kind and the orchestrator, and optionally the service backends via feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`sagemaker`** | SageMaker and CloudWatch Logs backend (`osprey_sagemaker`). |
//! | **`mock`** | Scripted in-memory backend for tests (`osprey_mock`). |
//!
//! ## Example: Training Step
//!
//! ```toml
//! [dependencies]
//! osprey = { version = "0.1", features = ["sagemaker"] }
//! ```
//!
//! ```rust,ignore
//! use osprey::prelude::*;
//! use aws_config::BehaviorVersion;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
//!     let backend = SageMakerBackend::new(&config);
//!
//!     let orchestrator = Orchestrator::new(
//!         TrainingJob::new(backend.clone(), AlgorithmCatalog::builtin()),
//!         backend,
//!     );
//!
//!     let mut spec = Spec::default()
//!         .with_input("role", "arn:aws:iam::123456789012:role/training")
//!         .with_input("algorithm_name", "xgboost");
//!     let run = orchestrator.run(&mut spec).await;
//! }
//! ```

pub use osprey_core::*;

pub mod training {
    pub use osprey_training::*;
}

pub mod orchestrator {
    pub use osprey_orchestrator::*;
}

#[cfg(feature = "sagemaker")]
pub mod sagemaker {
    pub use osprey_sagemaker::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use osprey_mock::*;
}

pub mod prelude {
    pub use osprey_core::prelude::*;

    pub use osprey_orchestrator::{CancellationToken, JobRun, Orchestrator, PollSettings};
    pub use osprey_training::TrainingJob;

    #[cfg(feature = "sagemaker")]
    pub use osprey_sagemaker::SageMakerBackend;

    #[cfg(feature = "mock")]
    pub use osprey_mock::ScriptedBackend;
}
