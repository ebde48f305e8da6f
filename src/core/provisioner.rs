use crate::core::commands::ServiceSettings;
use crate::core::poll::PollPolicy;
use crate::core::sequence::StepSequence;
use crate::core::steps::{
    AssignEntitlementStep, CreateBindingStep, CreateInstanceStep, CreateSubaccountStep,
    FetchCredentialsStep, LoginStep, ResolveSubaccountStep,
};
use crate::domain::command::BtpCommand;
use crate::domain::model::{ProvisionContext, ProvisionRequest, StepResult};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{ProvisionError, Result};
use std::sync::Arc;
use std::time::Duration;

pub const HANDOFF_BANNER: &str =
    "Below json output should be uploaded to DwC vault namespace designated to the product";

/// Tuning knobs of a run; everything except the request itself.
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub service: ServiceSettings,
    pub subaccount_poll: PollPolicy,
    pub instance_poll: PollPolicy,
    pub binding_poll: PollPolicy,
    pub entitlement_settle: Duration,
    pub echo: bool,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            subaccount_poll: PollPolicy::new(Duration::from_secs(10), 30),
            instance_poll: PollPolicy::new(Duration::from_secs(5), 60),
            binding_poll: PollPolicy::new(Duration::from_secs(5), 60),
            entitlement_settle: Duration::from_secs(10),
            echo: true,
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub technical_name: String,
    pub credentials: serde_json::Value,
    pub steps: Vec<StepResult>,
}

pub struct Provisioner {
    sequence: StepSequence,
    execution_id: String,
}

impl Provisioner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        settings: &ProvisionSettings,
        execution_id: String,
    ) -> Self {
        let sequence = StepSequence::new(runner)
            .with_step(Box::new(LoginStep {
                echo: settings.echo,
            }))
            .with_step(Box::new(CreateSubaccountStep {
                echo: settings.echo,
            }))
            .with_step(Box::new(ResolveSubaccountStep {
                policy: settings.subaccount_poll,
            }))
            .with_step(Box::new(AssignEntitlementStep {
                service: settings.service.clone(),
                settle: settings.entitlement_settle,
                echo: settings.echo,
            }))
            .with_step(Box::new(CreateInstanceStep {
                service: settings.service.clone(),
                policy: settings.instance_poll,
                echo: settings.echo,
            }))
            .with_step(Box::new(CreateBindingStep {
                policy: settings.binding_poll,
                echo: settings.echo,
            }))
            .with_step(Box::new(FetchCredentialsStep));

        Self {
            sequence,
            execution_id,
        }
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.sequence.step_names()
    }

    pub fn plan(&self, request: &ProvisionRequest) -> Vec<(String, Vec<BtpCommand>)> {
        let context = ProvisionContext::new(self.execution_id.clone(), request.clone());
        self.sequence.plan(&context)
    }

    pub async fn run(&self, request: ProvisionRequest) -> Result<ProvisionOutcome> {
        tracing::info!(
            execution_id = %self.execution_id,
            environment = %request.environment,
            subaccount = %request.display_name(),
            "🚀 Starting provisioning"
        );

        let mut context = ProvisionContext::new(self.execution_id.clone(), request);
        self.sequence.execute_all(&mut context).await?;

        let summary = StepSequence::get_execution_summary(&context);
        tracing::info!("📊 Execution summary: {:?}", summary);

        let technical_name = context.require_technical_name()?.to_string();
        let credentials = context
            .credentials
            .take()
            .ok_or_else(|| ProvisionError::MissingCredentials {
                binding: context.request.binding_name(),
            })?;

        Ok(ProvisionOutcome {
            technical_name,
            credentials,
            steps: context.completed,
        })
    }
}

/// Text printed for the operator to copy into the secret store.
pub fn render_handoff(credentials: &serde_json::Value) -> Result<String> {
    Ok(format!(
        "{}\n{}",
        HANDOFF_BANNER,
        serde_json::to_string_pretty(credentials)?
    ))
}
