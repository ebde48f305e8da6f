use crate::domain::model::BtpEnvironment;
use crate::utils::error::Result;

/// CLI server URL for an environment name (`live` or `canary`).
pub fn resolve_environment_url(name: &str) -> Result<&'static str> {
    let environment: BtpEnvironment = name.parse()?;
    Ok(environment.cli_url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ProvisionError;

    #[test]
    fn test_live_url() {
        assert_eq!(resolve_environment_url("live").unwrap(), "https://cli.btp.cloud.sap");
    }

    #[test]
    fn test_canary_url() {
        assert_eq!(
            resolve_environment_url("canary").unwrap(),
            "https://canary.cli.btp.int.sap"
        );
    }

    #[test]
    fn test_unknown_environment() {
        for name in ["", "prod", "LIVE", " live"] {
            let err = resolve_environment_url(name).unwrap_err();
            assert!(
                matches!(err, ProvisionError::InvalidEnvironment { name: ref n } if n == name),
                "unexpected error for {:?}: {}",
                name,
                err
            );
        }
    }
}
