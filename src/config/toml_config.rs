use crate::core::commands::ServiceSettings;
use crate::core::poll::PollPolicy;
use crate::core::provisioner::ProvisionSettings;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest interval accepted anywhere in the file, in seconds.
const MAX_INTERVAL_SECONDS: u64 = 600;

/// Optional tuning file passed with `--config`. Every section may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionConfig {
    pub tool: Option<ToolConfig>,
    pub service: Option<ServiceConfig>,
    pub polling: Option<PollingConfig>,
    pub timing: Option<TimingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub binary: Option<String>,
    pub echo: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub offering: Option<String>,
    pub plan: Option<String>,
    pub grant_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub subaccount: Option<PollConfig>,
    pub instance: Option<PollConfig>,
    pub binding: Option<PollConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    pub entitlement_settle_seconds: Option<u64>,
}

impl ProvisionConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProvisionError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProvisionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(tool) = &self.tool {
            if let Some(binary) = &tool.binary {
                validation::validate_non_empty_string("tool.binary", binary)?;
            }
        }

        if let Some(service) = &self.service {
            for (field, value) in [
                ("service.offering", &service.offering),
                ("service.plan", &service.plan),
                ("service.grant_type", &service.grant_type),
            ] {
                if let Some(value) = value {
                    validation::validate_non_empty_string(field, value)?;
                }
            }
        }

        if let Some(polling) = &self.polling {
            for (name, poll) in [
                ("polling.subaccount", &polling.subaccount),
                ("polling.instance", &polling.instance),
                ("polling.binding", &polling.binding),
            ] {
                let Some(poll) = poll else { continue };
                if let Some(attempts) = poll.max_attempts {
                    validation::validate_positive_number(
                        &format!("{}.max_attempts", name),
                        u64::from(attempts),
                        1,
                    )?;
                }
                if let Some(interval) = poll.interval_seconds {
                    validation::validate_range(
                        &format!("{}.interval_seconds", name),
                        interval,
                        0,
                        MAX_INTERVAL_SECONDS,
                    )?;
                }
            }
        }

        if let Some(settle) = self
            .timing
            .as_ref()
            .and_then(|t| t.entitlement_settle_seconds)
        {
            validation::validate_range(
                "timing.entitlement_settle_seconds",
                settle,
                0,
                MAX_INTERVAL_SECONDS,
            )?;
        }

        Ok(())
    }

    /// btp binary to execute.
    pub fn binary(&self) -> &str {
        self.tool
            .as_ref()
            .and_then(|t| t.binary.as_deref())
            .unwrap_or("btp")
    }

    /// Settings with every unset value taken from the defaults.
    pub fn to_settings(&self) -> ProvisionSettings {
        let defaults = ProvisionSettings::default();
        let default_service = defaults.service.clone();

        let service = match &self.service {
            Some(s) => ServiceSettings {
                offering: s.offering.clone().unwrap_or(default_service.offering),
                plan: s.plan.clone().unwrap_or(default_service.plan),
                grant_type: s.grant_type.clone().unwrap_or(default_service.grant_type),
            },
            None => default_service,
        };

        let polling = self.polling.as_ref();
        ProvisionSettings {
            service,
            subaccount_poll: merge_poll(
                polling.and_then(|p| p.subaccount.as_ref()),
                defaults.subaccount_poll,
            ),
            instance_poll: merge_poll(
                polling.and_then(|p| p.instance.as_ref()),
                defaults.instance_poll,
            ),
            binding_poll: merge_poll(
                polling.and_then(|p| p.binding.as_ref()),
                defaults.binding_poll,
            ),
            entitlement_settle: self
                .timing
                .as_ref()
                .and_then(|t| t.entitlement_settle_seconds)
                .map(Duration::from_secs)
                .unwrap_or(defaults.entitlement_settle),
            echo: self
                .tool
                .as_ref()
                .and_then(|t| t.echo)
                .unwrap_or(defaults.echo),
        }
    }
}

fn merge_poll(config: Option<&PollConfig>, default: PollPolicy) -> PollPolicy {
    match config {
        Some(c) => PollPolicy {
            interval: c
                .interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(default.interval),
            max_attempts: c.max_attempts.unwrap_or(default.max_attempts),
        },
        None => default,
    }
}

impl Validate for ProvisionConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
