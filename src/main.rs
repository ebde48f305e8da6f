use btp_provision::core::environment::resolve_environment_url;
use btp_provision::core::provisioner::render_handoff;
use btp_provision::utils::{logger, validation::Validate};
use btp_provision::{CliConfig, ProcessRunner, ProvisionConfig, ProvisionError, Provisioner};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting btp-provision");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Provisioning failed: {} (Category: {:?})",
            e,
            e.category()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(config: CliConfig) -> Result<(), ProvisionError> {
    let request = config.to_request()?;

    let file_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ProvisionConfig::from_file(path)?
        }
        None => ProvisionConfig::default(),
    };
    file_config.validate()?;

    let settings = file_config.to_settings();
    let execution_id = format!("prov_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
    let runner = Arc::new(ProcessRunner::new(file_config.binary()));
    let provisioner = Provisioner::new(runner, &settings, execution_id);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No commands will be executed");
        println!(
            "Environment: {} ({})",
            request.environment,
            resolve_environment_url(&config.btp_env_name)?
        );
        for (step, commands) in provisioner.plan(&request) {
            println!("[{}]", step);
            for command in commands {
                println!("  {}", command.render(file_config.binary()));
            }
        }
        return Ok(());
    }

    let outcome = provisioner.run(request).await?;
    tracing::info!(
        "✅ Provisioning completed for subaccount {} in {} steps",
        outcome.technical_name,
        outcome.steps.len()
    );

    println!("{}", render_handoff(&outcome.credentials)?);
    Ok(())
}
