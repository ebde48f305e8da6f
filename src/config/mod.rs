pub mod cli;
pub mod toml_config;

use clap::Parser;

#[derive(Clone, Parser)]
#[command(name = "btp-provision")]
#[command(about = "Provision a BTP subaccount with a cloud management service binding")]
pub struct CliConfig {
    #[arg(long = "btpEnvName", help = "BTP environment canary or live")]
    pub btp_env_name: String,

    #[arg(long = "userName", help = "Technical Username for BTP login")]
    pub user_name: String,

    #[arg(
        long = "password",
        env = "BTP_PASSWORD",
        hide_env_values = true,
        help = "Technical Password for BTP login"
    )]
    pub password: String,

    #[arg(long = "subDomain", help = "Subdomain for the global account")]
    pub sub_domain: String,

    #[arg(long = "subDomainAlias", help = "User friendly subdomain for the global account")]
    pub sub_domain_alias: String,

    #[arg(long, help = "Region for the subaccount")]
    pub region: String,

    /// Path to an optional TOML tuning file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print the commands that would run, without running them
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}
