//! Advanced Relations server
//!
//! Serves relation queries over HTTP, or answers a single query from the
//! command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ha_api::{AppState, DataResponse, SnapshotLoader};
use ha_config::RelationsConfig;
use ha_core::ItemKind;
use ha_relations::{find_relations_with, Direction, TraversalOptions};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "advancedrelations")]
#[command(author, version, about = "Relations between Home Assistant entities, automations and scripts")]
struct Cli {
    /// Home Assistant configuration directory
    #[arg(long, env = "HA_CONFIG_DIR", default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "ADVANCED_RELATIONS_BIND", default_value = "0.0.0.0:8129")]
        bind: String,
    },

    /// Print the relation tree of one item as JSON
    Relations {
        /// Kind of the starting item (entity, automation or script)
        #[arg(long = "type")]
        kind: ItemKind,

        /// Id of the starting item
        #[arg(long)]
        id: String,

        /// Maximum depth, 0 for unbounded (defaults to the configured depth)
        #[arg(long, allow_negative_numbers = true)]
        depth: Option<i64>,

        /// Edges to follow (both, upstream or downstream)
        #[arg(long)]
        direction: Option<Direction>,
    },

    /// List the automations, scripts and entities found
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays machine readable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RelationsConfig::load(&cli.config_dir)
        .with_context(|| format!("loading settings from {}", cli.config_dir.display()))?;

    match cli.command {
        Commands::Serve { bind } => {
            info!("Starting Advanced Relations for {}", cli.config_dir.display());
            let state = AppState::new(cli.config_dir, config);
            tokio::select! {
                result = ha_api::start_server(state, &bind) => result?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down..."),
            }
        }
        Commands::Relations {
            kind,
            id,
            depth,
            direction,
        } => {
            let depth = depth.unwrap_or_else(|| i64::from(config.default_depth));
            let options = TraversalOptions::new(depth)?.with_direction(direction.unwrap_or_default());
            let snapshot = SnapshotLoader::new(&cli.config_dir).load()?;
            let tree = find_relations_with(&snapshot, kind, &id, &options);
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Commands::List => {
            let snapshot = SnapshotLoader::new(&cli.config_dir).load()?;
            let data = DataResponse::from_snapshot(&snapshot);
            for automation in &data.automations {
                println!("automation\t{}\t{}", automation.id, automation.alias);
            }
            for script in &data.scripts {
                println!("script\t{}\t{}", script.id, script.alias);
            }
            for entity in &data.entities {
                println!("entity\t{}\t{}", entity.entity_id, entity.friendly_name);
            }
        }
    }

    Ok(())
}
