pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::ProcessRunner;
pub use config::{toml_config::ProvisionConfig, CliConfig};
pub use crate::core::provisioner::{ProvisionOutcome, ProvisionSettings, Provisioner};
pub use domain::model::{BtpEnvironment, ProvisionRequest};
pub use utils::error::{ProvisionError, Result};
