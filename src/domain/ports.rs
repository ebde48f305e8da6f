use crate::domain::command::BtpCommand;
use crate::domain::model::ProvisionContext;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs btp CLI invocations and hands back their standard output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion. `echo` prints the command and its output.
    /// A non-zero exit is an error.
    async fn run(&self, command: &BtpCommand, echo: bool) -> Result<String>;
}

/// One step of the provisioning sequence.
#[async_trait]
pub trait ProvisionStep: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, runner: &dyn CommandRunner, context: &mut ProvisionContext)
        -> Result<()>;

    /// Commands this step would issue, for dry runs. Values not known yet are placeholders.
    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand>;
}
