mod config;

use std::path::Path;
use std::sync::Arc;

use agentflow_core::{Execution, ExecutionStatus, LogLevel, TaskStatus};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use events::{Event, EventBus, EventEnvelope};
use orchestrator::{AgentRegistry, ChatClient, ExecutionStore, Orchestrator, SqlStore};
use server::{create_router, state::AppState};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use config::{AgentflowConfig, Settings, AGENTFLOW_DIR, CONFIG_FILE, DEFAULT_DB_NAME};

const DEFAULT_LOG_FILTER: &str = "agentflow=info,orchestrator=info,server=info,tower_http=info";
const RUN_LOG_FILTER: &str = "agentflow=warn,orchestrator=warn";

#[derive(Parser)]
#[command(name = "agentflow")]
#[command(about = "Run goals through a pipeline of AI agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overrides DATABASE_URL and the project database
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .agentflow/ with a config file and a migrated database
    Init,
    /// Start the HTTP and WebSocket server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one goal in this process and stream its events
    Run {
        goal: String,

        #[arg(long)]
        model: Option<String>,
    },
    /// List recent executions
    Status {
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    let mut settings = Settings::load(&cwd)?;
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }

    match cli.command {
        Commands::Init => init_project(&cwd, &settings).await,
        Commands::Serve { port } => serve(settings, port).await,
        Commands::Run { goal, model } => {
            if let Some(model) = model {
                settings.config.llm.model = model;
            }
            run_goal(settings, &goal).await
        }
        Commands::Status { limit } => status(settings, limit).await,
    }
}

async fn open_pool(database_url: &str) -> Result<SqlitePool> {
    let pool = db::create_pool(database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(pool)
}

fn build_orchestrator(settings: &Settings, pool: SqlitePool) -> Orchestrator {
    let client = ChatClient::new(settings.llm_config());
    let registry = AgentRegistry::standard(Arc::new(client));
    let store: Arc<dyn ExecutionStore> = Arc::new(SqlStore::new(pool));
    Orchestrator::new(registry, store, EventBus::new())
}

async fn init_project(cwd: &Path, settings: &Settings) -> Result<()> {
    let agentflow_dir = config::agentflow_dir(cwd);

    if agentflow_dir.exists() {
        println!("Already initialized at {}", agentflow_dir.display());
        return Ok(());
    }

    println!("Initializing agentflow in {}", cwd.display());

    std::fs::create_dir_all(&agentflow_dir)
        .with_context(|| format!("Failed to create {}", agentflow_dir.display()))?;
    AgentflowConfig::default().write(&config::config_path(cwd))?;
    open_pool(&settings.database_url).await?;

    println!();
    println!("Created:");
    println!("  {}/", AGENTFLOW_DIR);
    println!("  ├── {}", CONFIG_FILE);
    println!("  └── {}", DEFAULT_DB_NAME);
    println!();
    println!("Next steps:");
    println!("  1. export OPENAI_API_KEY=...");
    println!("  2. agentflow run \"<your goal>\"  or  agentflow serve");

    Ok(())
}

async fn serve(settings: Settings, port: Option<u16>) -> Result<()> {
    init_tracing(DEFAULT_LOG_FILTER);

    let port = port.unwrap_or(settings.config.server.port);
    tracing::info!(database_url = %settings.database_url, model = %settings.config.llm.model, "Starting server");

    let pool = open_pool(&settings.database_url).await?;
    let state = AppState::new(build_orchestrator(&settings, pool));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    println!();
    println!("agentflow");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  OpenAPI:     http://localhost:{}/api/openapi.json", port);
    println!("  WebSocket:   ws://localhost:{}/ws", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_goal(settings: Settings, goal: &str) -> Result<()> {
    init_tracing(RUN_LOG_FILTER);

    let pool = open_pool(&settings.database_url).await?;
    let orchestrator = build_orchestrator(&settings, pool);

    Execution::validate_goal(goal)?;
    let execution = orchestrator
        .store()
        .create_execution(&Execution::new(goal))
        .await?;
    let execution_id = execution.id;

    println!("{} {}", "Goal:".bold(), goal);
    println!("{} {}", "Execution:".bold(), execution_id);
    println!();

    let mut rx = orchestrator.bus().subscribe();
    let runner = orchestrator.clone();
    let run_goal = goal.to_string();
    let mut handle =
        tokio::spawn(async move { runner.execute_goal(execution_id, &run_goal).await });

    let outcome = loop {
        tokio::select! {
            biased;

            received = rx.recv() => match received {
                Ok(envelope) => print_event(&envelope, execution_id),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    eprintln!("{}", format!("  … {} events skipped", n).dimmed());
                }
                Err(broadcast::error::RecvError::Closed) => {}
            },

            joined = &mut handle => {
                while let Ok(envelope) = rx.try_recv() {
                    print_event(&envelope, execution_id);
                }
                break joined.context("Execution task panicked")?;
            }
        }
    };

    println!();
    match outcome {
        Ok(execution) => {
            println!("{} {}", "✓".green().bold(), "Execution completed".green().bold());
            if let Some(result) = execution.result {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), "Execution failed".red().bold());
            Err(e.into())
        }
    }
}

async fn status(settings: Settings, limit: i64) -> Result<()> {
    let pool = open_pool(&settings.database_url).await?;
    let store = SqlStore::new(pool);
    let executions = store.list_executions(limit).await?;

    println!();
    if executions.is_empty() {
        println!("No executions yet.");
        println!();
        return Ok(());
    }

    println!("Executions ({}):", executions.len());
    for execution in &executions {
        let icon = match execution.status {
            ExecutionStatus::Pending => "○".normal(),
            ExecutionStatus::Planning => "◐".cyan(),
            ExecutionStatus::Executing => "◑".blue(),
            ExecutionStatus::Analyzing => "◕".magenta(),
            ExecutionStatus::Completed => "●".green(),
            ExecutionStatus::Failed => "✗".red(),
        };
        let duration = execution
            .completed_at
            .map(|done| format!(" ({}s)", (done - execution.created_at).num_seconds()))
            .unwrap_or_default();
        println!(
            "  {} [{}] {}{}  {}",
            icon,
            execution.status.as_str(),
            execution.goal,
            duration.dimmed(),
            execution.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        if let Some(error) = &execution.error {
            println!("      {}", error.red());
        }
    }
    println!();

    Ok(())
}

fn print_event(envelope: &EventEnvelope, execution_id: Uuid) {
    if let Some(id) = envelope.event.execution_id() {
        if id != execution_id {
            return;
        }
    }

    match &envelope.event {
        Event::ExecutionUpdate(update) => {
            let status = update.status.as_str().to_uppercase();
            let mut line = format!("▶ {}", status).bold().to_string();
            if let Some(agent) = update.current_agent {
                line.push_str(&format!("  {}", agent.as_str().cyan()));
            }
            if let Some(task) = &update.current_task {
                line.push_str(&format!("  {}", task));
            }
            if let Some(error) = &update.error {
                line.push_str(&format!("  {}", error.red()));
            }
            println!("{}", line);
        }
        Event::TaskUpdate(task) => {
            let status = match task.status {
                TaskStatus::Pending => "pending".normal(),
                TaskStatus::Running => "running".blue(),
                TaskStatus::Completed => "completed".green(),
                TaskStatus::Failed => "failed".red(),
                TaskStatus::Cancelled => "cancelled".yellow(),
            };
            println!(
                "  [{}] {:<10} {:<9} {}",
                task.order,
                task.agent_type.as_str().cyan(),
                status,
                task.description
            );
        }
        Event::Log(log) => {
            let action = match log.level {
                LogLevel::Info => log.action.normal(),
                LogLevel::Success => log.action.green(),
                LogLevel::Warning => log.action.yellow(),
                LogLevel::Error => log.action.red(),
            };
            println!("    {} {}", log.agent_type.as_str().dimmed(), action);
        }
        Event::AgentPerformance(update) => {
            let performance = update.performance;
            println!(
                "    {}",
                format!(
                    "{}: {} completed, {:.0}% success, avg {}ms",
                    update.agent_type,
                    performance.tasks_completed,
                    performance.success_rate,
                    performance.avg_duration
                )
                .dimmed()
            );
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
