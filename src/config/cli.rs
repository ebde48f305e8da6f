use crate::config::CliConfig;
use crate::core::environment::resolve_environment_url;
use crate::domain::model::ProvisionRequest;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::fmt;

impl CliConfig {
    /// Validated request for the provisioning run.
    pub fn to_request(&self) -> Result<ProvisionRequest> {
        self.validate()?;

        Ok(ProvisionRequest {
            environment: self.btp_env_name.parse()?,
            user_name: self.user_name.clone(),
            password: self.password.clone(),
            global_subdomain: self.sub_domain.clone(),
            alias: self.sub_domain_alias.clone(),
            region: self.region.clone(),
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        resolve_environment_url(&self.btp_env_name)?;
        validation::validate_non_empty_string("userName", &self.user_name)?;
        validation::validate_non_empty_string("password", &self.password)?;
        validation::validate_subdomain("subDomain", &self.sub_domain)?;
        validation::validate_subdomain("subDomainAlias", &self.sub_domain_alias)?;
        validation::validate_non_empty_string("region", &self.region)?;
        Ok(())
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("btp_env_name", &self.btp_env_name)
            .field("user_name", &self.user_name)
            .field("password", &"********")
            .field("sub_domain", &self.sub_domain)
            .field("sub_domain_alias", &self.sub_domain_alias)
            .field("region", &self.region)
            .field("config", &self.config)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}
