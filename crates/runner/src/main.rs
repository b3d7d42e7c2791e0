use log::{error, info, warn};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tradecycle_clock::{SystemClock, shutdown_channel};
use tradecycle_core::Instrument;
use tradecycle_gateway::{RetryingVenue, SandboxInstrumentConfig, SandboxVenue};
use tradecycle_runner::{
    AccountMode, EngineConfig, EngineContext, EngineError, SharedVenue, StrategyLoop,
};

fn print_help() {
    eprintln!(
        r#"tradecycle - buy, watch and sell one position at a time

USAGE:
    tradecycle [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run against the sandbox venue with defaults
    tradecycle

    # Run with config file
    tradecycle --config tradecycle.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            EngineConfig::from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;

    if config.account_mode == AccountMode::Live {
        return Err(EngineError::Input(
            "account_mode \"live\" needs a live venue client; \
             this build only bundles the sandbox venue"
                .to_string(),
        )
        .into());
    }

    if config.sandbox.instruments.is_empty() {
        warn!(
            "No sandbox instruments configured; listing the selectable ones as random-walk shares"
        );
        config.sandbox.instruments = config
            .selection
            .instrument_ids()
            .into_iter()
            .map(|id| SandboxInstrumentConfig {
                instrument: Instrument::share(id, 1, "TQBR"),
                price: dec!(250),
                volatility: Some(dec!(0.002)),
                seed: None,
            })
            .collect();
    }

    info!(
        "Sandbox: pay-in {} {}, {} instruments",
        config.sandbox.pay_in,
        config.sandbox.currency,
        config.sandbox.instruments.len()
    );
    let (stop, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, finishing current wait");
            stop.trigger();
        }
    });

    let clock = Arc::new(SystemClock::new());
    let sandbox = Arc::new(SandboxVenue::from_config(&config.sandbox, clock).await);
    let venue: SharedVenue = Arc::new(
        RetryingVenue::new(sandbox, config.retry_policy()).with_shutdown(shutdown.clone()),
    );

    let ctx = EngineContext::connect(venue, shutdown).await?;
    let mut engine = StrategyLoop::new(ctx, &config);
    if let Err(e) = engine.run().await {
        error!("Engine stopped: {}", e);
        return Err(e.into());
    }

    info!("Engine stopped");
    Ok(())
}
