use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use blurup::infrastructure::config::{AppConfig, CliArgs, Command, StorageManager};
use blurup::presentation::build_plan_report;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<(StorageManager, AppConfig)> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok((storage, config))
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let (storage, config) = load_config(&args)?;

    init_logging(&config)?;

    info!(version = blurup::VERSION, "Starting {}", blurup::NAME);

    match &args.command {
        Command::Plan(plan_args) => {
            let options = config.image_options(&plan_args.image);
            let report = build_plan_report(plan_args, options)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::InitConfig { force } => {
            let path = storage.write_default_config(args.config.as_deref(), *force)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
