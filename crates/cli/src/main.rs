use clap::{Parser, Subcommand};
use messenger::engine::{build_state_map, FsmEngine, MemoryStore};
use messenger::gateway::Dispatcher;
use std::sync::Arc;

mod demo;

#[derive(Parser)]
#[command(name = "messenger-bridge")]
#[command(about = "Messenger Platform bridge for state-machine conversations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: MESSENGER_CONFIG_PATH or ~/.messenger-bridge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook gateway with the built-in demo conversation. Tokens come from config or
    /// MESSENGER_VERIFY_TOKEN / MESSENGER_ACCESS_TOKEN.
    Gateway {
        /// Config file path (default: MESSENGER_CONFIG_PATH or ~/.messenger-bridge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("messenger-bridge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(messenger::config::default_config_path);
    let dir = messenger::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = messenger::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    let settings = Arc::new(messenger::config::resolve_messenger_settings(&config));

    // Built once; every dispatched step reads the same map.
    let states = build_state_map(&demo::DemoConversation);
    log::info!("loaded {} conversation state(s)", states.len());

    let dispatcher = Dispatcher::with_send_api(
        &settings,
        Arc::new(FsmEngine),
        Arc::new(MemoryStore::new()),
        states,
    );
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    messenger::gateway::run_gateway(&config, settings, dispatcher).await
}
