use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Unknown environment: {name}. Supported values for btpEnvName are live or canary")]
    InvalidEnvironment { name: String },

    #[error("Command `{command}` exited with status {status}")]
    CommandFailed {
        command: String,
        status: i32,
        output: String,
    },

    #[error("Failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No subaccount found with the display name '{display_name}'")]
    SubaccountNotFound { display_name: String },

    #[error("{resource} did not become ready after {attempts} attempts (last seen: {last_seen})")]
    Timeout {
        resource: String,
        attempts: u32,
        last_seen: String,
    },

    #[error("{resource} entered state {state}: {message}")]
    ResourceFailed {
        resource: String,
        state: String,
        message: String,
    },

    #[error("Service binding '{binding}' has no credentials")]
    MissingCredentials { binding: String },

    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    ExternalTool,
    Platform,
    System,
}

impl ProvisionError {
    /// The innermost error, looking through step wrappers.
    pub fn root(&self) -> &ProvisionError {
        match self {
            ProvisionError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            ProvisionError::InvalidEnvironment { .. } => ErrorCategory::Input,
            ProvisionError::ConfigValidationError { .. }
            | ProvisionError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ProvisionError::CommandFailed { .. }
            | ProvisionError::CommandSpawn { .. }
            | ProvisionError::SerializationError(_) => ErrorCategory::ExternalTool,
            ProvisionError::SubaccountNotFound { .. }
            | ProvisionError::Timeout { .. }
            | ProvisionError::ResourceFailed { .. }
            | ProvisionError::MissingCredentials { .. } => ErrorCategory::Platform,
            ProvisionError::IoError(_) | ProvisionError::StepFailed { .. } => {
                ErrorCategory::System
            }
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => 2,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProvisionError::StepFailed { step, source } => {
                format!(
                    "Provisioning stopped at step '{}': {}",
                    step,
                    source.user_friendly_message()
                )
            }
            ProvisionError::CommandFailed { command, status, .. } => {
                format!(
                    "The btp CLI failed (exit status {}) while running: {}",
                    status, command
                )
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            ProvisionError::InvalidEnvironment { .. } => {
                "Pass --btpEnvName live or --btpEnvName canary"
            }
            ProvisionError::CommandSpawn { .. } => {
                "Make sure the btp CLI is installed and on PATH, or set [tool].binary in the config file"
            }
            ProvisionError::CommandFailed { .. } => {
                "Check the command output above; credentials, region and subdomain are the usual suspects"
            }
            ProvisionError::SerializationError(_) => {
                "The btp CLI returned unexpected output; check that the installed version supports --format json"
            }
            ProvisionError::SubaccountNotFound { .. } => {
                "Check the global account subdomain and whether the subaccount was created in the cockpit"
            }
            ProvisionError::Timeout { .. } => {
                "The platform is slow to respond; raise max_attempts or interval_seconds in the [polling] section"
            }
            ProvisionError::ResourceFailed { .. } => {
                "Inspect the resource in the BTP cockpit, delete it and run again"
            }
            ProvisionError::MissingCredentials { .. } => {
                "Fetch the binding manually with `btp --format json get services/binding`"
            }
            ProvisionError::ConfigValidationError { .. }
            | ProvisionError::InvalidConfigValueError { .. } => {
                "Fix the command-line arguments or the configuration file and run again"
            }
            ProvisionError::IoError(_) | ProvisionError::StepFailed { .. } => {
                "Check file permissions and available disk space"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
