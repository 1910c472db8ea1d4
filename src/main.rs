use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use verdant::chat;
use verdant::session::export;
use verdant::store::Database;
use verdant::Config;

#[derive(Parser)]
#[command(name = "verdant", version, about = "Sustainable fashion advisor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat (the default)
    Chat,
    /// Create a user account
    Register,
    /// Inspect saved conversations
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show the effective configuration
    Status,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List saved conversations for a user
    List { username: String },
    /// Export one saved conversation as markdown
    Export {
        snapshot_id: String,
        /// Output path; stdout when omitted
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default so log lines don't interleave with the chat; raise
    // with RUST_LOG=verdant=debug.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::run(&config).await,
        Commands::Register => {
            let db = Database::open(&config.db_path())?;
            chat::register_prompt(&db)
        }
        Commands::History { command } => history(&config, command),
        Commands::Status => {
            println!("provider:  {}", config.provider_name());
            println!("model:     {}", config.model_name());
            println!(
                "api key:   {}",
                if config.api_key.is_some() { "configured" } else { "not set" }
            );
            println!("database:  {}", config.db_path().display());
            println!("config:    {}", config.config_path.display());
            Ok(())
        }
    }
}

fn history(config: &Config, command: HistoryCommands) -> Result<()> {
    let db = Database::open(&config.db_path())?;
    match command {
        HistoryCommands::List { username } => {
            let snapshots = db.list_snapshots(&username)?;
            if snapshots.is_empty() {
                println!("No saved chats for {username}.");
            }
            for meta in snapshots {
                println!("{}  {}", meta.id, meta.label());
            }
            Ok(())
        }
        HistoryCommands::Export { snapshot_id, out } => {
            let turns = db
                .load_snapshot(&snapshot_id)
                .with_context(|| format!("loading snapshot {snapshot_id}"))?;
            let markdown = export::markdown_transcript(&turns);
            match out {
                Some(path) => {
                    std::fs::write(&path, markdown)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{markdown}"),
            }
            Ok(())
        }
    }
}
