//! Ticket relay - support-ticket intake with load-balanced owner assignment.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_assign::Assigner;
use relay_server::{server, AppState, AssignArgs, IntakeService, ServeArgs, StoreArgs};
use relay_store::{NotionStore, TicketStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ticket-relay")]
#[command(about = "Support-ticket intake relay with owner auto-assignment", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP intake server
    Serve {
        #[command(flatten)]
        serve: ServeArgs,
        #[command(flatten)]
        assign: AssignArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Show who would get the next ticket, without creating one
    Pick {
        #[command(flatten)]
        assign: AssignArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print the configured roster in rotation order
    Roster {
        #[command(flatten)]
        assign: AssignArgs,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn build_assigner(assign: &AssignArgs, store: Arc<dyn TicketStore>) -> Result<Assigner> {
    let roster = assign.roster().context("invalid RELAY_OWNERS")?;
    if roster.is_empty() {
        anyhow::bail!("no owners configured; set RELAY_OWNERS or --owners");
    }
    Ok(Assigner::new(store, roster).with_policy(assign.policy()))
}

fn build_store(store: &StoreArgs) -> Result<Arc<dyn TicketStore>> {
    let client = NotionStore::new(store.notion_config()).context("invalid store configuration")?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Serve {
            serve,
            assign,
            store,
        } => {
            let store = build_store(&store)?;
            let assigner = build_assigner(&assign, store.clone())?;
            info!(
                "Starting ticket relay with {} owners, cap {}, fallback {}",
                assigner.roster().len(),
                assigner.policy().cap,
                assigner.policy().fallback,
            );

            let intake = IntakeService::new(store, assigner)
                .with_assign_failure_policy(serve.on_assign_failure);
            let state = AppState::new(intake).with_api_key(serve.api_key);

            server::run(state, serve.bind).await?;
        }
        Commands::Pick { assign, store } => {
            let store = build_store(&store)?;
            let assigner = build_assigner(&assign, store)?;
            let selection = assigner.assign().await?;

            println!("Open tickets per owner (cap {}):", assigner.policy().cap);
            for (id, count) in &selection.loads {
                let name = assigner
                    .roster()
                    .get(id)
                    .map(|o| o.name.as_str())
                    .unwrap_or(id.as_str());
                println!("  {:<24} {:>3}", name, count);
            }
            println!("Next owner: {}", selection.owner);
            if selection.fallback {
                println!("  (everyone at cap, fallback: {})", assigner.policy().fallback);
            }
        }
        Commands::Roster { assign } => {
            let roster = assign.roster().context("invalid RELAY_OWNERS")?;
            if roster.is_empty() {
                println!("No owners configured");
                return Ok(());
            }
            println!("Roster ({}):", roster.len());
            for (i, owner) in roster.owners().iter().enumerate() {
                println!("  {}. {}", i + 1, owner);
            }
        }
    }

    Ok(())
}
