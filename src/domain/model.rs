use crate::utils::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LIVE_CLI_URL: &str = "https://cli.btp.cloud.sap";
pub const CANARY_CLI_URL: &str = "https://canary.cli.btp.int.sap";

/// Suffix appended to the alias to form the subaccount display name and subdomain.
pub const SUBACCOUNT_SUFFIX: &str = "-cloud-mgmt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtpEnvironment {
    Live,
    Canary,
}

impl BtpEnvironment {
    pub fn cli_url(&self) -> &'static str {
        match self {
            BtpEnvironment::Live => LIVE_CLI_URL,
            BtpEnvironment::Canary => CANARY_CLI_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BtpEnvironment::Live => "live",
            BtpEnvironment::Canary => "canary",
        }
    }
}

impl FromStr for BtpEnvironment {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "live" => Ok(BtpEnvironment::Live),
            "canary" => Ok(BtpEnvironment::Canary),
            other => Err(ProvisionError::InvalidEnvironment {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BtpEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `btp --format json list accounts/subaccount`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subaccount {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub technical_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubaccountList {
    #[serde(default)]
    pub value: Vec<Subaccount>,
}

impl SubaccountList {
    /// First subaccount whose display name equals `display_name`.
    pub fn find_by_display_name(&self, display_name: &str) -> Option<&Subaccount> {
        self.value
            .iter()
            .find(|sa| sa.display_name.as_deref() == Some(display_name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastOperation {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Readiness as reported by `get services/instance` and `get services/binding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Pending(String),
    Failed { state: String, message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceInstance {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub last_operation: Option<LastOperation>,
}

impl ServiceInstance {
    pub fn readiness(&self) -> Readiness {
        readiness_of(self.ready, self.last_operation.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceBinding {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub last_operation: Option<LastOperation>,
    #[serde(default)]
    pub credentials: Option<serde_json::Value>,
}

impl ServiceBinding {
    pub fn readiness(&self) -> Readiness {
        readiness_of(self.ready, self.last_operation.as_ref())
    }
}

fn readiness_of(ready: Option<bool>, last_operation: Option<&LastOperation>) -> Readiness {
    let state = last_operation.and_then(|op| op.state.as_deref());

    if state == Some("failed") {
        return Readiness::Failed {
            state: "failed".to_string(),
            message: last_operation
                .and_then(|op| op.description.clone())
                .unwrap_or_default(),
        };
    }

    match (ready, state) {
        (Some(true), _) => Readiness::Ready,
        // Older CLI versions omit `ready` and only report the last operation.
        (None, Some("succeeded")) | (None, None) => Readiness::Ready,
        (Some(false), Some("succeeded")) => {
            Readiness::Pending("last operation succeeded but ready is still false".to_string())
        }
        (_, Some(state)) => Readiness::Pending(state.to_string()),
        (Some(false), None) => Readiness::Pending("not ready".to_string()),
    }
}

/// Validated inputs of one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub environment: BtpEnvironment,
    pub user_name: String,
    pub password: String,
    pub global_subdomain: String,
    pub alias: String,
    pub region: String,
}

impl ProvisionRequest {
    pub fn display_name(&self) -> String {
        format!("{}{}", self.alias, SUBACCOUNT_SUFFIX)
    }

    pub fn subaccount_subdomain(&self) -> String {
        self.display_name()
    }

    pub fn instance_name(&self) -> &str {
        &self.alias
    }

    pub fn binding_name(&self) -> String {
        format!("{}-binding", self.alias)
    }
}

/// Placeholder used in dry-run plans before the subaccount exists.
pub const TECHNICAL_NAME_PLACEHOLDER: &str = "<technical-name>";

#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_name: String,
    pub duration: std::time::Duration,
}

/// State handed from one step to the next.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    pub execution_id: String,
    pub request: ProvisionRequest,
    pub technical_name: Option<String>,
    pub credentials: Option<serde_json::Value>,
    pub completed: Vec<StepResult>,
}

impl ProvisionContext {
    pub fn new(execution_id: String, request: ProvisionRequest) -> Self {
        Self {
            execution_id,
            request,
            technical_name: None,
            credentials: None,
            completed: Vec::new(),
        }
    }

    /// Technical name resolved by an earlier step.
    pub fn require_technical_name(&self) -> Result<&str> {
        self.technical_name
            .as_deref()
            .ok_or_else(|| ProvisionError::SubaccountNotFound {
                display_name: self.request.display_name(),
            })
    }

    pub fn technical_name_or_placeholder(&self) -> &str {
        self.technical_name
            .as_deref()
            .unwrap_or(TECHNICAL_NAME_PLACEHOLDER)
    }

    pub fn add_result(&mut self, result: StepResult) {
        self.completed.push(result);
    }
}
