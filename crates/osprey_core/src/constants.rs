pub mod inputs {
    pub const JOB_NAME: &str = "job_name";
    pub const REGION: &str = "region";
    pub const ROLE: &str = "role";
    pub const IMAGE: &str = "image";
    pub const ALGORITHM_NAME: &str = "algorithm_name";
    pub const CHANNELS: &str = "channels";
    pub const HYPERPARAMETERS: &str = "hyperparameters";
    pub const MAX_WAIT_TIME: &str = "max_wait_time";
    pub const CHECKPOINT_CONFIG: &str = "checkpoint_config";
    pub const INSTANCE_TYPE: &str = "instance_type";
    pub const DEBUG_HOOK_CONFIG: &str = "debug_hook_config";
    pub const DEBUG_RULE_CONFIG: &str = "debug_rule_config";
}

pub mod outputs {
    pub const JOB_NAME: &str = "job_name";
    pub const MODEL_ARTIFACT_URL: &str = "model_artifact_url";
    pub const TRAINING_IMAGE: &str = "training_image";
}

pub mod log_groups {
    pub const TRAINING_JOBS: &str = "/aws/sagemaker/TrainingJobs";
}

/// Process exit codes, one per terminal outcome.
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const JOB_FAILED: u8 = 1;
    pub const VALIDATION: u8 = 2;
    pub const SUBMISSION: u8 = 3;
    /// The job may still be running; its final state is unknown.
    pub const INDETERMINATE: u8 = 4;
    /// The step could not be set up (unreadable catalog, unwritable outputs).
    pub const SETUP: u8 = 5;
    pub const CANCELLED: u8 = 130;
}

/// Defaults applied when the caller leaves a value unset or zero.
pub mod defaults {
    pub const TRAINING_INPUT_MODE: &str = "File";
    pub const INSTANCE_TYPE: &str = "ml.m4.xlarge";
    pub const INSTANCE_COUNT: u32 = 1;
    pub const VOLUME_SIZE_GB: u32 = 30;
    pub const MAX_RUNTIME_SECONDS: u32 = 86_400;
    pub const JOB_NAME_PREFIX: &str = "TrainingJob";
}
