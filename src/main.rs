//! doorman - Application entry point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doorman::{
    cli::{Cli, Commands},
    commands,
    config::Config,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, load_config()).await,
        Commands::Migrate(args) => commands::migrate::execute(args, load_config()).await,
        Commands::Tokens(args) => commands::tokens::execute(args, load_config()).await,
        Commands::Keygen => commands::keygen::execute(),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn load_config() -> Config {
    let config = Config::from_env();
    tracing::debug!(?config, "Configuration loaded");
    config
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
