use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use zest::backend::factory::create_backend;
use zest::config::Config;
use zest::constants::{ACTIVITY_MAX_LIMIT, ENV_API_TOKEN};
use zest::logger;
use zest::state::Outcome;
use zest::storage::LocalStorage;
use zest::sync::SyncService;
use zest::todoist::{AccessToken, ActivityEventType, ActivityObjectType, ActivityQuery};
use zest::workspace::{Routed, Workspace};
use zest::{Priority, Task, TaskChanges, TaskDraft};

#[derive(Parser, Debug)]
#[command(name = "zest", version, about = "Todoist-backed task list with an offline mode")]
struct Cli {
    /// Path to a configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a Todoist access token
    Login { token: String },
    /// Forget the stored access token
    Logout,
    /// Full sync of live tasks
    Sync,
    /// Show the live task list
    List {
        /// Show completed tasks instead
        #[arg(long)]
        completed: bool,
    },
    /// Create a task
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, default_value = "1")]
        priority: Priority,
    },
    /// Edit a task
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Complete a task
    Done { id: String },
    /// Reopen a completed task
    Reopen { id: String },
    /// Delete a task
    Delete { id: String },
    /// Fetch the completed-task history
    Completed,
    /// Fetch a single task
    Show { id: String },
    /// Fetch the activity log
    Activity {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        event_type: Option<ActivityEventType>,
        #[arg(long)]
        object_type: Option<ActivityObjectType>,
    },
    /// Write a default configuration file
    InitConfig {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn print_task(task: &Task) {
    let check = if task.completed { "x" } else { " " };
    let due = task
        .scheduled_date
        .map(|d| d.date().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("[{check}] {:<36}  p{}  {:<10}  {}", task.id, task.priority, due, task.name);
}

fn print_routed(routed: &Routed) {
    match routed {
        Routed::Local(task) => print_task(task),
        Routed::Remote(Outcome::Created(task)) | Routed::Remote(Outcome::Updated(task)) => print_task(task),
        Routed::Remote(outcome) => println!("✅ {}", outcome.operation()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig { path } => {
            let path = match path {
                Some(path) => path,
                None => Config::get_default_config_path()?,
            };
            Config::generate_default_config(path)
        }
        command => run(command, cli.config).await,
    }
}

async fn run(command: Command, config_path: Option<PathBuf>) -> Result<()> {
    let config = match &config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    logger::init(&config.logging)?;

    let storage = LocalStorage::new(config.database_path()?).await?;
    let backend = create_backend(&config.api)?;
    let sync = SyncService::new(Arc::from(backend), storage, config.sync.request_timeout()).await?;
    let mut workspace = Workspace::open(sync).await?;

    if let Ok(token) = std::env::var(ENV_API_TOKEN) {
        if !token.trim().is_empty() {
            workspace.login(&AccessToken::new(token)).await?;
        }
    }

    match command {
        Command::Login { token } => workspace.login(&AccessToken::new(token)).await?,
        Command::Logout => workspace.logout().await?,
        Command::Sync => {
            workspace.sync().full_sync().await?;
            workspace.sync().state().tasks.iter().for_each(print_task);
        }
        Command::List { completed } => {
            let tasks = match (completed, workspace.is_authenticated().await?) {
                (false, _) => workspace.visible_tasks().await?,
                (true, true) => workspace.sync().state().completed_tasks,
                (true, false) => workspace.local().completed_tasks().to_vec(),
            };
            tasks.iter().for_each(print_task);
        }
        Command::Add {
            name,
            description,
            due,
            priority,
        } => {
            let draft = TaskDraft {
                name,
                description,
                due_date: due,
                priority,
            };
            print_routed(&workspace.add_task(draft).await?);
        }
        Command::Edit {
            id,
            name,
            description,
            due,
            priority,
        } => {
            let changes = TaskChanges {
                name,
                description,
                due_date: due,
                priority,
            };
            print_routed(&workspace.update_task(&id, changes).await?);
        }
        Command::Done { id } => print_routed(&workspace.complete_task(&id).await?),
        Command::Reopen { id } => print_routed(&workspace.reopen_task(&id).await?),
        Command::Delete { id } => print_routed(&workspace.delete_task(&id).await?),
        Command::Completed => {
            workspace.sync().fetch_completed_tasks().await?;
            workspace.sync().state().completed_tasks.iter().for_each(print_task);
        }
        Command::Show { id } => {
            workspace.sync().fetch_task(&id).await?;
            let task = workspace
                .sync()
                .state()
                .selected_activity_task
                .context("No task returned")?;
            print_task(&task);
            if let Some(description) = task.description.filter(|d| !d.is_empty()) {
                println!("    {description}");
            }
        }
        Command::Activity {
            page,
            limit,
            event_type,
            object_type,
        } => {
            let query = ActivityQuery {
                page,
                limit: limit.unwrap_or(config.activity.page_size).min(ACTIVITY_MAX_LIMIT),
                event_type,
                object_type,
                ..Default::default()
            };
            workspace.sync().fetch_activity(query).await?;
            workspace.sync().state().productivity_tasks.iter().for_each(print_task);
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}
