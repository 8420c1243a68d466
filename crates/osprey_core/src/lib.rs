//! # Osprey Core
//!
//! Types and traits shared by every part of the pipeline step.
//!
//! Defines the contract between the orchestrator and the remote training service.
//!
//! - **[`Spec`](spec::Spec)**: The caller's inputs and the outputs handed to downstream steps.
//! - **[`JobKind`](traits::JobKind)**: Hooks a concrete job type plugs into the orchestrator.
//! - **[`TrainingService`](traits::TrainingService)**: Trait for implementing the remote training API (e.g., SageMaker).
//! - **[`LogService`](traits::LogService)**: Trait for implementing the remote log store (e.g., CloudWatch Logs).
//! - **[`AlgorithmCatalog`](catalog::AlgorithmCatalog)**: Read-only lookup of built-in algorithm images.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod job;
pub mod retry;
pub mod spec;
pub mod traits;
pub mod training;

pub mod prelude {
    pub use super::catalog::*;
    pub use super::constants::*;
    pub use super::error::*;
    pub use super::job::*;
    pub use super::retry::*;
    pub use super::spec::*;
    pub use super::traits::*;
    pub use super::training::*;
}
