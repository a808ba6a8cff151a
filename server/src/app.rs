//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::TimeDelta;

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, TOPIC_SAMPLES};
use crate::core::shutdown::ShutdownService;
use crate::core::topics::{Topic, TopicConfig};
use crate::data::registry::SampleRegistry;
use crate::domain::ingest::{InboundMessage, IngestPipeline, IngestStats, Janitor};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub registry: Arc<SampleRegistry>,
    pub stats: Arc<IngestStats>,
    pub samples_topic: Arc<Topic<InboundMessage>>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let app = Self::init(&cli_config)?;
        Self::start_server(app).await
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        tracing::debug!(
            default_ttl = ?config.ingest.default_ttl,
            sweep_interval = ?config.ingest.sweep_interval,
            "Configuration loaded"
        );

        let registry = Arc::new(SampleRegistry::new());
        let stats = Arc::new(IngestStats::new());
        let samples_topic = Arc::new(Topic::new(TOPIC_SAMPLES, TopicConfig::default()));
        let shutdown = ShutdownService::new();

        Ok(Self {
            shutdown,
            config,
            registry,
            stats,
            samples_topic,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await?;

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) -> Result<()> {
        let default_ttl = TimeDelta::from_std(self.config.ingest.default_ttl)
            .context("Default TTL out of range")?;

        let pipeline = IngestPipeline::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
            default_ttl,
        );
        self.shutdown
            .register(pipeline.start(&self.samples_topic, self.shutdown.subscribe()))
            .await;

        let janitor = Janitor::new(
            Arc::clone(&self.registry),
            self.config.ingest.sweep_interval,
        );
        self.shutdown
            .register(janitor.start(self.shutdown.subscribe()))
            .await;

        tracing::debug!("Background tasks started");
        Ok(())
    }
}
