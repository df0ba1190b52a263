//! Application wiring.
//!
//! Builds the shared registry and clients, then runs:
//! - the reconciliation loop (supervised, failures reported to the chat)
//! - the command loop (supervised)
//! - the `/metrics` endpoint, when configured
//!
//! until Ctrl-C.

use crate::commands::{CommandHandler, CommandLoop};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::monitor::Monitor;
use crate::supervisor::supervise;
use hlwatch_info::InfoClient;
use hlwatch_notify::{Dispatcher, MessageRenderer, TelegramClient};
use hlwatch_registry::AddressRegistry;
use hlwatch_telemetry::{serve_metrics, Metrics};
use hlwatch_tracker::Reconciler;
use std::sync::Arc;
use tracing::{error, info};

/// Main application.
pub struct Application {
    config: AppConfig,
    monitor: Monitor<InfoClient, TelegramClient, InfoClient>,
    commands: CommandLoop<TelegramClient>,
}

impl Application {
    /// Build every component from `config`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let registry = Arc::new(AddressRegistry::open(&config.addresses_path)?);
        Metrics::tracked_addresses(registry.len());

        let info = Arc::new(InfoClient::with_header_overrides(
            config.info_url.clone(),
            &config.info_header_overrides(),
        )?);
        let telegram = Arc::new(TelegramClient::new(config.telegram.client_config())?);
        let renderer =
            MessageRenderer::new(config.display_utc_offset_hours, config.profile_url_template.clone())?;

        let dispatcher = Dispatcher::new(
            Arc::clone(&telegram),
            Arc::clone(&info),
            renderer,
            config.telegram.chat_id,
            config.telegram.send_timeout(),
        );
        let monitor = Monitor::new(
            Reconciler::new(config.fetch_concurrency),
            info,
            Arc::clone(&registry),
            dispatcher,
            config.poll_interval(),
        );

        let handler = CommandHandler::new(registry, config.telegram.admins.iter().copied());
        let commands = CommandLoop::new(
            telegram,
            handler,
            config.telegram.command_poll_interval(),
            config.telegram.command_retry_delay(),
            config.telegram.send_timeout(),
        );

        Ok(Self {
            config,
            monitor,
            commands,
        })
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        info!(
            info_url = %self.config.info_url,
            addresses_path = %self.config.addresses_path.display(),
            poll_interval_secs = self.config.poll_interval_secs,
            "Starting application"
        );

        let retry_delay = self.config.error_retry_delay();

        let monitor = self.monitor.clone();
        let reporter = self.monitor.clone();
        let monitor_handle = tokio::spawn(supervise(
            "reconciliation",
            retry_delay,
            move || monitor.clone().run(),
            move |reason| {
                let reporter = reporter.clone();
                async move { reporter.report_failure(&reason, retry_delay).await }
            },
        ));

        let commands = self.commands.clone();
        let commands_handle = tokio::spawn(supervise(
            "commands",
            self.config.telegram.command_retry_delay(),
            move || commands.clone().run(),
            |_| async {},
        ));

        let metrics_handle = self.config.telemetry.metrics_port.map(|port| {
            tokio::spawn(async move {
                if let Err(e) = serve_metrics(port).await {
                    error!(port, error = %e, "Metrics server failed");
                }
            })
        });

        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");

        monitor_handle.abort();
        commands_handle.abort();
        if let Some(handle) = metrics_handle {
            handle.abort();
        }

        info!("Shutdown complete");
        Ok(())
    }
}
