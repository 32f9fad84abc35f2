use banco_randotron::{Config, Engine};
use clap::{Arg, Command};
use commonware_runtime::{deterministic, Runner};
use std::str::FromStr;
use tracing::{error, info, Level};

fn main() {
    // Parse arguments
    let matches = Command::new("randotron")
        .about("Randomly wager against an in-memory banco ledger.")
        .arg(Arg::new("config").long("config").required(true))
        .get_matches();

    // Load from config file
    let config_file = matches.get_one::<String>("config").unwrap();
    let config_file = std::fs::read_to_string(config_file).expect("Could not read config file");
    let config: Config = serde_yaml::from_str(&config_file).expect("Could not parse config file");

    // Setup logging
    let level = Level::from_str(&config.log_level).expect("Invalid log level");
    tracing_subscriber::fmt().with_max_level(level).init();

    // Initialize runtime
    let cfg = deterministic::Config::default().with_seed(config.seed);
    let executor = deterministic::Runner::from(cfg);

    // Start runtime
    let result = executor.start(|context| async move {
        info!(
            seed = config.seed,
            num_players = config.num_players,
            blocks = config.blocks,
            "Starting randotron"
        );
        Engine::new(context, config).await?.run().await
    });
    match result {
        Ok(summary) => info!(
            height = summary.height,
            wagers = summary.tally.wagers,
            surplus = summary.report.surplus(),
            "Complete"
        ),
        Err(e) => {
            error!(?e, "Run failed");
            std::process::exit(1);
        }
    }
}
