use crate::core::commands::{self, ServiceSettings};
use crate::core::poll::{poll_until, timeout_error, PollPolicy, PollStatus};
use crate::domain::command::BtpCommand;
use crate::domain::model::{
    ProvisionContext, Readiness, ServiceBinding, ServiceInstance, SubaccountList,
};
use crate::domain::ports::{CommandRunner, ProvisionStep};
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

const NOT_LISTED: &str = "not listed yet";
const SUBACCOUNT_STATE_OK: &str = "OK";

/// Runs `command` without echo and decodes its output.
pub async fn run_json<T: DeserializeOwned>(
    runner: &dyn CommandRunner,
    command: &BtpCommand,
) -> Result<T> {
    let output = runner.run(command, false).await?;
    Ok(serde_json::from_str(&output)?)
}

/// Technical name of the first subaccount whose display name matches.
pub fn find_technical_name(list: &SubaccountList, display_name: &str) -> Result<String> {
    list.find_by_display_name(display_name)
        .and_then(|sa| sa.technical_name.clone().or_else(|| sa.guid.clone()))
        .ok_or_else(|| ProvisionError::SubaccountNotFound {
            display_name: display_name.to_string(),
        })
}

pub struct LoginStep {
    pub echo: bool,
}

#[async_trait]
impl ProvisionStep for LoginStep {
    fn name(&self) -> &str {
        "login"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        runner.run(&commands::login(&context.request), self.echo).await?;
        Ok(())
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        vec![commands::login(&context.request)]
    }
}

pub struct CreateSubaccountStep {
    pub echo: bool,
}

#[async_trait]
impl ProvisionStep for CreateSubaccountStep {
    fn name(&self) -> &str {
        "create-subaccount"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        runner
            .run(&commands::create_subaccount(&context.request), self.echo)
            .await?;
        Ok(())
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        vec![commands::create_subaccount(&context.request)]
    }
}

/// Waits until the new subaccount is listed and in state OK, then records its technical name.
pub struct ResolveSubaccountStep {
    pub policy: PollPolicy,
}

#[async_trait]
impl ProvisionStep for ResolveSubaccountStep {
    fn name(&self) -> &str {
        "resolve-subaccount"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        let display_name = context.request.display_name();
        let list_command = commands::list_subaccounts(&context.request);

        let technical_name = poll_until(
            "subaccount",
            self.policy,
            |_| {
                let list_command = &list_command;
                let display_name = &display_name;
                async move {
                    let list: SubaccountList = run_json(runner, list_command).await?;
                    subaccount_status(&list, display_name)
                }
            },
            |last, attempts| match last.as_deref() {
                None | Some(NOT_LISTED) => ProvisionError::SubaccountNotFound {
                    display_name: display_name.clone(),
                },
                Some(state) => ProvisionError::Timeout {
                    resource: format!("subaccount '{}'", display_name),
                    attempts,
                    last_seen: state.to_string(),
                },
            },
        )
        .await?;

        println!(
            "The technical Name for the subaccount '{}' is: {}",
            display_name, technical_name
        );
        tracing::info!(technical_name = %technical_name, "Subaccount resolved");
        context.technical_name = Some(technical_name);
        Ok(())
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        vec![commands::list_subaccounts(&context.request)]
    }
}

fn subaccount_status(list: &SubaccountList, display_name: &str) -> Result<PollStatus<String>> {
    let Some(subaccount) = list.find_by_display_name(display_name) else {
        return Ok(PollStatus::Pending(NOT_LISTED.to_string()));
    };

    match subaccount.state.as_deref() {
        None | Some(SUBACCOUNT_STATE_OK) => {
            find_technical_name(list, display_name).map(PollStatus::Done)
        }
        Some(state) if state.ends_with("FAILED") => Err(ProvisionError::ResourceFailed {
            resource: format!("subaccount '{}'", display_name),
            state: state.to_string(),
            message: subaccount.state_message.clone().unwrap_or_default(),
        }),
        Some(state) => Ok(PollStatus::Pending(state.to_string())),
    }
}

/// Assigns the entitlement. The CLI has no readiness query for it, so the step
/// waits a fixed settle delay afterwards.
pub struct AssignEntitlementStep {
    pub service: ServiceSettings,
    pub settle: Duration,
    pub echo: bool,
}

#[async_trait]
impl ProvisionStep for AssignEntitlementStep {
    fn name(&self) -> &str {
        "assign-entitlement"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        let technical_name = context.require_technical_name()?;
        runner
            .run(&commands::assign_entitlement(&self.service, technical_name), self.echo)
            .await?;

        if !self.settle.is_zero() {
            tracing::debug!("Waiting {:?} for the entitlement to settle", self.settle);
            tokio::time::sleep(self.settle).await;
        }
        Ok(())
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        vec![commands::assign_entitlement(
            &self.service,
            context.technical_name_or_placeholder(),
        )]
    }
}

pub struct CreateInstanceStep {
    pub service: ServiceSettings,
    pub policy: PollPolicy,
    pub echo: bool,
}

#[async_trait]
impl ProvisionStep for CreateInstanceStep {
    fn name(&self) -> &str {
        "create-instance"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        let request = &context.request;
        let technical_name = context.require_technical_name()?;
        runner
            .run(
                &commands::create_instance(request, &self.service, technical_name),
                self.echo,
            )
            .await?;

        let resource = format!("service instance '{}'", request.instance_name());
        let get_command = commands::get_instance(request, technical_name);
        poll_until(
            &resource,
            self.policy,
            |_| {
                let get_command = &get_command;
                let resource = &resource;
                async move {
                    let instance: ServiceInstance = run_json(runner, get_command).await?;
                    readiness_status(resource, instance.readiness(), ())
                }
            },
            timeout_error(&resource),
        )
        .await
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        let technical_name = context.technical_name_or_placeholder();
        vec![
            commands::create_instance(&context.request, &self.service, technical_name),
            commands::get_instance(&context.request, technical_name),
        ]
    }
}

pub struct CreateBindingStep {
    pub policy: PollPolicy,
    pub echo: bool,
}

#[async_trait]
impl ProvisionStep for CreateBindingStep {
    fn name(&self) -> &str {
        "create-binding"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        let request = &context.request;
        let technical_name = context.require_technical_name()?;
        runner
            .run(&commands::create_binding(request, technical_name), self.echo)
            .await?;

        let resource = format!("service binding '{}'", request.binding_name());
        let get_command = commands::get_binding(request, technical_name);
        poll_until(
            &resource,
            self.policy,
            |_| {
                let get_command = &get_command;
                let resource = &resource;
                async move {
                    let binding: ServiceBinding = run_json(runner, get_command).await?;
                    readiness_status(resource, binding.readiness(), ())
                }
            },
            timeout_error(&resource),
        )
        .await
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        let technical_name = context.technical_name_or_placeholder();
        vec![
            commands::create_binding(&context.request, technical_name),
            commands::get_binding(&context.request, technical_name),
        ]
    }
}

fn readiness_status<T>(resource: &str, readiness: Readiness, value: T) -> Result<PollStatus<T>> {
    match readiness {
        Readiness::Ready => Ok(PollStatus::Done(value)),
        Readiness::Pending(observed) => Ok(PollStatus::Pending(observed)),
        Readiness::Failed { state, message } => Err(ProvisionError::ResourceFailed {
            resource: resource.to_string(),
            state,
            message,
        }),
    }
}

/// Reads the binding's credentials into the context.
pub struct FetchCredentialsStep;

#[async_trait]
impl ProvisionStep for FetchCredentialsStep {
    fn name(&self) -> &str {
        "fetch-credentials"
    }

    async fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: &mut ProvisionContext,
    ) -> Result<()> {
        let technical_name = context.require_technical_name()?;
        let binding: ServiceBinding =
            run_json(runner, &commands::get_binding(&context.request, technical_name)).await?;

        let credentials = binding
            .credentials
            .filter(|c| !c.is_null())
            .ok_or_else(|| ProvisionError::MissingCredentials {
                binding: context.request.binding_name(),
            })?;

        context.credentials = Some(credentials);
        Ok(())
    }

    fn planned_commands(&self, context: &ProvisionContext) -> Vec<BtpCommand> {
        vec![commands::get_binding(
            &context.request,
            context.technical_name_or_placeholder(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Subaccount;

    fn subaccount(display: &str, technical: &str, state: Option<&str>) -> Subaccount {
        Subaccount {
            display_name: Some(display.to_string()),
            technical_name: Some(technical.to_string()),
            state: state.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_technical_name() {
        let list = SubaccountList {
            value: vec![
                subaccount("other-cloud-mgmt", "tn-other", Some("OK")),
                subaccount("team-cloud-mgmt", "tn-team", Some("OK")),
            ],
        };
        assert_eq!(find_technical_name(&list, "team-cloud-mgmt").unwrap(), "tn-team");
        assert!(matches!(
            find_technical_name(&list, "missing-cloud-mgmt"),
            Err(ProvisionError::SubaccountNotFound { .. })
        ));
    }

    #[test]
    fn test_first_match_wins() {
        let list = SubaccountList {
            value: vec![
                subaccount("team-cloud-mgmt", "tn-first", None),
                subaccount("team-cloud-mgmt", "tn-second", None),
            ],
        };
        assert_eq!(find_technical_name(&list, "team-cloud-mgmt").unwrap(), "tn-first");
    }

    #[test]
    fn test_subaccount_status() {
        let creating = SubaccountList {
            value: vec![subaccount("team-cloud-mgmt", "tn", Some("CREATING"))],
        };
        assert!(matches!(
            subaccount_status(&creating, "team-cloud-mgmt").unwrap(),
            PollStatus::Pending(ref s) if s == "CREATING"
        ));

        let failed = SubaccountList {
            value: vec![subaccount("team-cloud-mgmt", "tn", Some("CREATION_FAILED"))],
        };
        assert!(matches!(
            subaccount_status(&failed, "team-cloud-mgmt"),
            Err(ProvisionError::ResourceFailed { .. })
        ));

        let empty = SubaccountList::default();
        assert!(matches!(
            subaccount_status(&empty, "team-cloud-mgmt").unwrap(),
            PollStatus::Pending(ref s) if s == NOT_LISTED
        ));
    }
}
