pub mod commands;
pub mod environment;
pub mod poll;
pub mod provisioner;
pub mod sequence;
pub mod steps;

pub use crate::domain::command::BtpCommand;
pub use crate::domain::model::{ProvisionContext, ProvisionRequest, StepResult};
pub use crate::domain::ports::{CommandRunner, ProvisionStep};
pub use crate::utils::error::Result;
