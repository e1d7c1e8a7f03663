//! shared-state binary entry point.

use std::process::ExitCode;

use shared_state_store::cli::{self, Action, Args};
use shared_state_store::config::Config;
use shared_state_store::{logging, InitialState, SharedStateStore};
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Try 'shared-state --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::try_init_with(config.log_filter()).ok();
    debug!("shared-state v{}", env!("CARGO_PKG_VERSION"));

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(ref request) = args.request else {
        cli::print_help();
        return Ok(());
    };

    let template = match args.template {
        Some(ref json) => InitialState::from_json(json)?,
        None => InitialState::new(),
    };

    let store = SharedStateStore::from_config(request.namespace.as_str(), config, template)?;
    if !store.is_shared() {
        debug!(
            "No redis url configured; namespace {} is process-local",
            store.namespace()
        );
    }

    let record = match request.action {
        Action::Get => store.get(&request.id).await?,
        Action::Init => store.init(&request.id).await?,
        Action::Set { ref key, ref value } => {
            store.set(&request.id, key.as_str(), value.clone()).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
