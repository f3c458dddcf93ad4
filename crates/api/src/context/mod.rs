//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use carcare_core::{
    HandshakeManager, HandshakeSettings, MaintenanceRecordSource, MessageChannel, PopupLauncher,
};
use carcare_domain::{Config, Origin, Result};
use carcare_infra::{config, BackendClient, CallbackServer, ProcessPopupLauncher};
use tokio::task::JoinHandle;
use tracing::info;

/// Type alias for maintenance record source trait object
type DynRecordSource = dyn MaintenanceRecordSource + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub handshake: Arc<HandshakeManager>,
    pub records: Arc<DynRecordSource>,
    pub channel: MessageChannel,

    callback: CallbackServer,
    pump: JoinHandle<()>,
}

impl AppContext {
    /// Build the context from the environment or a probed config file.
    pub async fn new() -> Result<Self> {
        Self::new_with_config(config::load()?).await
    }

    /// Build the context with popups opened by the configured command.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        let launcher = Arc::new(ProcessPopupLauncher::new(&config.popup)?);
        Self::new_with_launcher(config, launcher).await
    }

    /// Build the context around a custom popup launcher.
    ///
    /// Binds the callback server first: its origin becomes the application
    /// origin the channel, the notifier and the handshake all agree on.
    pub async fn new_with_launcher(
        config: Config,
        launcher: Arc<dyn PopupLauncher>,
    ) -> Result<Self> {
        let binding = CallbackServer::bind(&config.callback).await?;
        let origin = binding.origin().clone();
        let channel = MessageChannel::new(origin.clone());

        let timing = &config.handshake;
        let settings = HandshakeSettings::new(origin, &config.calendar.time_zone)?
            .with_timeout(Duration::from_secs(timing.timeout_seconds))?
            .with_popup_poll_interval(Duration::from_millis(timing.popup_poll_interval_ms))?;

        let backend = Arc::new(BackendClient::new(&config.backend)?);
        let handshake = Arc::new(HandshakeManager::new(backend.clone(), launcher, settings));
        let pump = handshake.attach(&channel);

        let callback = binding.serve(
            channel.clone(),
            Duration::from_millis(config.handshake.notifier_close_delay_ms),
        );

        info!(
            origin = %callback.origin(),
            redirect_uri = %callback.redirect_uri(),
            backend = backend.base_url(),
            "application context ready"
        );

        Ok(Self { config, handshake, records: backend, channel, callback, pump })
    }

    pub fn app_origin(&self) -> &Origin {
        self.callback.origin()
    }

    /// Redirect URI the calendar provider must send the popup back to.
    pub fn redirect_uri(&self) -> String {
        self.callback.redirect_uri()
    }

    /// Stop the callback server and the message pump.
    pub async fn shutdown(self) -> Result<()> {
        self.pump.abort();
        self.callback.shutdown().await
    }
}
