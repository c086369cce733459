//! Leadboard preview CLI
//!
//! Development surface over the in-memory store: seed operators and leads
//! from a JSON file, render the grouped board, optionally apply a stage
//! move first. The production board consumes the same engine through its
//! own store client.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use leadboard::pipeline::{filter_leads, group_by_stage};
use leadboard::store::seed::SeedFile;
use leadboard::store::{LeadStore, MockLeadStore, Stage};
use leadboard::LeadPipeline;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "leadboard")]
#[command(about = "Lead pipeline board preview")]
struct Cli {
    /// JSON seed file with operators and leads
    #[arg(short, long, env = "LEADBOARD_SEED", default_value = "seed.json")]
    seed: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the board for an operator
    Show {
        /// Operator whose leads to show
        #[arg(short, long)]
        operator: String,

        /// Filter term matched against display name and handle
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Move a lead to a stage, then render the refreshed board
    Move {
        #[arg(short, long)]
        operator: String,

        /// Lead id to move
        lead: String,

        /// Target stage (initial|contacted|proposal|won|lost)
        stage: Stage,
    },

    /// Resolve an operator from an access code
    Lookup { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,leadboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = Arc::new(MockLeadStore::new());
    SeedFile::load(&cli.seed)?.apply(&store).await;

    match cli.command {
        Commands::Show { operator, search } => {
            let pipeline = LeadPipeline::new(store);
            pipeline.set_operator(Some(&operator)).await?;
            render_board(&pipeline, &search);
            pipeline.shutdown().await;
        }
        Commands::Move {
            operator,
            lead,
            stage,
        } => {
            let pipeline = LeadPipeline::new(store);
            let mut view = pipeline.view();
            pipeline.set_operator(Some(&operator)).await?;
            view.mark_unchanged();

            pipeline.commit_transition(&lead, stage).await?;
            // The board reflects the move only once the store pushes the
            // resulting snapshot back through the subscription.
            view.changed().await.ok();
            render_board(&pipeline, "");
            pipeline.shutdown().await;
        }
        Commands::Lookup { code } => match store.find_operator_by_code(&code).await? {
            Some(operator) => println!("{} ({})", operator.name, operator.id),
            None => bail!("no operator matches that code"),
        },
    }

    Ok(())
}

fn render_board(pipeline: &LeadPipeline, search: &str) {
    let leads = pipeline.leads();
    let filtered = filter_leads(&leads, search);
    for column in group_by_stage(&filtered) {
        println!("== {} ({})", column.stage.label(), column.count());
        for lead in column.leads {
            let snippet = lead.last_message.as_deref().unwrap_or("-");
            println!("   {}  {}  {}", lead.display_name, lead.display_handle(), snippet);
        }
    }
}
