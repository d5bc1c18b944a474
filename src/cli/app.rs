// ABOUTME: Main application orchestration for the taskmill CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};
use crate::engine::TaskManager;
use crate::store::PgTaskStore;
use crate::workflow::{default_workflow, WorkflowRegistry};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Build the task manager the commands operate through.
    async fn build_manager(&self) -> Result<TaskManager> {
        let database_url = self
            .config
            .database_url
            .as_deref()
            .context("no database_url configured; set it in taskmill.yaml or TASKMILL_DATABASE_URL")?;

        let store = PgTaskStore::connect(database_url)
            .await
            .context("could not connect to the task database")?;
        store.ensure_schema().await?;

        let mut registry = WorkflowRegistry::new();
        registry.register("default", default_workflow);

        Ok(TaskManager::new(Arc::new(store), registry))
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting taskmill v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        let manager = self.build_manager().await?;

        match args.command {
            Commands::Create {
                reference,
                group,
                task_type,
                recurring,
                timeout,
                properties,
            } => {
                commands::create_task(
                    &manager, reference, group, task_type, recurring, timeout, properties,
                )
                .await
            }
            Commands::Start { id } => commands::start_task(&manager, id).await,
            Commands::Notify {
                id,
                outcome,
                message,
            } => commands::notify_task(&manager, id, &outcome, message.as_deref()).await,
            Commands::Show { id } => commands::show_task(&manager, id).await,
            Commands::List {
                group,
                task_type,
                status,
                reference,
                limit,
                offset,
            } => {
                commands::list_tasks(&manager, group, task_type, status, reference, limit, offset)
                    .await
            }
            Commands::Delete { id } => commands::delete_task(&manager, id).await,
        }
    }
}
