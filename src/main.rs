mod cli;
mod client;
mod logging;
mod models;
mod proxy;
mod settings;
mod store;
mod tui;

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};

use client::TaskClient;
use models::TaskStatus;
use proxy::notion::NotionClient;
use settings::Settings;

#[derive(Parser)]
#[command(name = "notion-tasks", about = "Task manager backed by a Notion database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the /api/notion proxy in front of the Notion API
    Serve {
        /// Listen address (default 127.0.0.1:3000)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Launch the terminal UI
    Tui {
        /// Origin of the proxy (default http://127.0.0.1:3000)
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Print all tasks
    List {
        #[arg(long)]
        api_url: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a task with status "Not Started"
    Add {
        title: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Change the status of a task
    SetStatus {
        task_id: String,
        /// "Not Started", "In Progress" or "Completed"
        status: TaskStatus,
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Save Notion credentials to .notion-tasks/setting.json
    Init {
        #[arg(long)]
        token: String,
        #[arg(long)]
        database: String,
    },
}

fn task_client(settings: &Settings, api_url: Option<String>) -> TaskClient {
    TaskClient::new(api_url.as_deref().unwrap_or(settings.api_url()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The task screen owns the terminal, so it logs to a file.
    let _log_guard = match cli.command {
        Commands::Tui { .. } => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            Some(logging::init_file(&Settings::dir_in(&cwd))?)
        }
        _ => {
            logging::init_stderr();
            None
        }
    };

    let settings = Settings::load();
    run_command(cli.command, &settings).await
}

/// The screen loop blocks, so it gets its own thread; requests still run on
/// the main runtime.
async fn run_tui(settings: &Settings, api_url: Option<String>) -> anyhow::Result<()> {
    let client = task_client(settings, api_url);
    let runtime = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || tui::run(client, runtime))
        .await
        .context("task screen panicked")?
}

async fn run_command(command: Commands, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Commands::Serve { bind } => {
            let bind = bind.as_deref().unwrap_or(settings.bind());
            let addr: SocketAddr = bind
                .parse()
                .with_context(|| format!("invalid listen address: {bind}"))?;
            let notion = NotionClient::new(settings.notion_config()?);
            proxy::serve(addr, notion).await
        }
        Commands::Tui { api_url } => run_tui(settings, api_url).await,
        Commands::List { api_url, json } => cli::list(&task_client(settings, api_url), json).await,
        Commands::Add {
            title,
            due,
            api_url,
        } => cli::add(&task_client(settings, api_url), title, due).await,
        Commands::SetStatus {
            task_id,
            status,
            api_url,
        } => cli::set_status(&task_client(settings, api_url), &task_id, status).await,
        Commands::Init { token, database } => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            cli::init(&cwd, token, database)
        }
    }
}
