mod cli;
mod host;
mod runner;
mod script;

use std::process::ExitCode;

use simplepay_config::CheckoutConfig;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::host::SimHost;
use crate::runner::Runner;
use crate::script::Script;

fn load_config(args: &cli::Args) -> CheckoutConfig {
    let loaded = match &args.config {
        Some(path) => {
            tracing::info!("Using config override: {}", path.display());
            simplepay_config::toml_loader::load_from_path(path)
        }
        None => simplepay_config::load_config(),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        CheckoutConfig::default()
    })
}

fn main() -> ExitCode {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("simplepay=info");
    let filter = match log_directive.parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(e) => {
            eprintln!("invalid log level {log_directive:?}: {e}");
            EnvFilter::from_default_env()
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("simplepay-sim v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args);
    tracing::debug!(
        "Effective config: {}",
        simplepay_config::config_to_json(&config)
    );
    let script = match &args.script {
        Some(path) => match Script::from_path(path) {
            Ok(script) => script,
            Err(e) => {
                tracing::error!("Failed to load {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Script::demo(),
    };

    let host = SimHost::new(
        args.family.into(),
        script.mobile,
        script.viewport(),
        !args.decline,
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let timeline = runtime.block_on(Runner::new(host, config).run(&script));
    for line in &timeline {
        println!("{line}");
    }
    ExitCode::SUCCESS
}
