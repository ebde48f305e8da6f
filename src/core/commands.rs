//! Builders for every btp invocation the provisioning run issues.

use crate::domain::command::BtpCommand;
use crate::domain::model::ProvisionRequest;

/// Which service gets entitled, instantiated and bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub offering: String,
    pub plan: String,
    pub grant_type: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            offering: "cis".to_string(),
            plan: "central".to_string(),
            grant_type: "clientCredentials".to_string(),
        }
    }
}

impl ServiceSettings {
    /// Instance creation parameters, e.g. `{"grantType": "clientCredentials"}`.
    pub fn instance_parameters(&self) -> String {
        format!(r#"{{"grantType": {}}}"#, serde_json::Value::String(self.grant_type.clone()))
    }
}

pub fn login(request: &ProvisionRequest) -> BtpCommand {
    BtpCommand::login()
        .arg("--url", request.environment.cli_url())
        .arg("--user", &request.user_name)
        .arg("--password", &request.password)
        .arg("--subdomain", &request.global_subdomain)
}

pub fn create_subaccount(request: &ProvisionRequest) -> BtpCommand {
    BtpCommand::json("create", "accounts/subaccount")
        .arg("--display-name", request.display_name())
        .arg("--region", &request.region)
        .arg("--subdomain", request.subaccount_subdomain())
        .arg("--used-for-production", "false")
}

pub fn list_subaccounts(request: &ProvisionRequest) -> BtpCommand {
    BtpCommand::json("list", "accounts/subaccount")
        .arg("--global-account", &request.global_subdomain)
}

pub fn assign_entitlement(service: &ServiceSettings, technical_name: &str) -> BtpCommand {
    BtpCommand::new("assign", "accounts/entitlement")
        .arg("--for-service", &service.offering)
        .arg("--plan", &service.plan)
        .arg("--enable", "true")
        .arg("--to-subaccount", technical_name)
}

pub fn create_instance(
    request: &ProvisionRequest,
    service: &ServiceSettings,
    technical_name: &str,
) -> BtpCommand {
    BtpCommand::new("create", "services/instance")
        .arg("--offering-name", &service.offering)
        .arg("--service", request.instance_name())
        .arg("--plan-name", &service.plan)
        .arg("--parameters", service.instance_parameters())
        .arg("--subaccount", technical_name)
}

pub fn get_instance(request: &ProvisionRequest, technical_name: &str) -> BtpCommand {
    BtpCommand::json("get", "services/instance")
        .arg("--name", request.instance_name())
        .arg("--subaccount", technical_name)
}

pub fn create_binding(request: &ProvisionRequest, technical_name: &str) -> BtpCommand {
    BtpCommand::new("create", "services/binding")
        .arg("--name", request.binding_name())
        .arg("--instance-name", request.instance_name())
        .arg("--subaccount", technical_name)
}

pub fn get_binding(request: &ProvisionRequest, technical_name: &str) -> BtpCommand {
    BtpCommand::json("get", "services/binding")
        .arg("--name", request.binding_name())
        .arg("--subaccount", technical_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::BtpEnvironment;

    fn request() -> ProvisionRequest {
        ProvisionRequest {
            environment: BtpEnvironment::Canary,
            user_name: "svc-user".to_string(),
            password: "p@ss word".to_string(),
            global_subdomain: "ga-sub".to_string(),
            alias: "team".to_string(),
            region: "eu10".to_string(),
        }
    }

    #[test]
    fn test_login_command() {
        assert_eq!(
            login(&request()).to_string(),
            "btp login --url https://canary.cli.btp.int.sap --user svc-user --password ******** --subdomain ga-sub"
        );
        assert_eq!(login(&request()).value_of("--password"), Some("p@ss word"));
    }

    #[test]
    fn test_create_subaccount_command() {
        assert_eq!(
            create_subaccount(&request()).to_string(),
            "btp --format json create accounts/subaccount --display-name team-cloud-mgmt --region eu10 \
             --subdomain team-cloud-mgmt --used-for-production false"
        );
    }

    #[test]
    fn test_service_commands() {
        let service = ServiceSettings::default();
        assert_eq!(
            assign_entitlement(&service, "tn-1").to_string(),
            "btp assign accounts/entitlement --for-service cis --plan central --enable true --to-subaccount tn-1"
        );
        assert_eq!(
            create_instance(&request(), &service, "tn-1").to_string(),
            r#"btp create services/instance --offering-name cis --service team --plan-name central --parameters '{"grantType": "clientCredentials"}' --subaccount tn-1"#
        );
        assert_eq!(
            create_binding(&request(), "tn-1").to_string(),
            "btp create services/binding --name team-binding --instance-name team --subaccount tn-1"
        );
        assert_eq!(
            get_binding(&request(), "tn-1").to_string(),
            "btp --format json get services/binding --name team-binding --subaccount tn-1"
        );
    }
}
