use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use carcare_core::{CallbackParams, MessageChannel, NotifyReport, PopupNotifier};
use carcare_domain::{CallbackConfig, CarCareError, Origin, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::context::CallbackContext;
use crate::errors::InfraError;

/// A bound (not yet serving) callback listener.
///
/// Binding first lets the caller learn the application origin, build the
/// message channel for it, and only then start serving.
pub struct CallbackBinding {
    listener: TcpListener,
    local_addr: SocketAddr,
    origin: Origin,
    path: String,
}

impl CallbackBinding {
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start answering redirects, relaying them into `channel`.
    pub fn serve(self, channel: MessageChannel, close_delay: Duration) -> CallbackServer {
        let state = Arc::new(CallbackState {
            notifier: PopupNotifier::new(self.origin.clone()).with_close_delay(close_delay),
            channel,
        });

        let app = Router::new().route(&self.path, get(handle_callback)).with_state(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(self.listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!(error = %err, "callback server error");
            }
        });

        info!(
            addr = %self.local_addr,
            origin = %self.origin,
            path = %self.path,
            "callback server listening"
        );

        CallbackServer {
            local_addr: self.local_addr,
            origin: self.origin,
            path: self.path,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

/// Running loopback server for the callback route.
pub struct CallbackServer {
    local_addr: SocketAddr,
    origin: Origin,
    path: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind the configured address.
    ///
    /// The origin is `callback.public_origin` when set, otherwise derived
    /// from the bound address (so port 0 resolves to the real port).
    pub async fn bind(config: &CallbackConfig) -> Result<CallbackBinding> {
        let listener = TcpListener::bind(&config.bind_addr).await.map_err(|err| {
            CarCareError::Network(format!(
                "failed to bind callback server on {}: {err}",
                config.bind_addr
            ))
        })?;
        let local_addr =
            listener.local_addr().map_err(|err| CarCareError::from(InfraError::from(err)))?;

        let origin = match config.public_origin.as_deref().filter(|o| !o.trim().is_empty()) {
            Some(public) => Origin::parse(public)?,
            None => Origin::parse(&format!("http://{local_addr}"))?,
        };

        let path = if config.path.starts_with('/') {
            config.path.clone()
        } else {
            format!("/{}", config.path)
        };

        Ok(CallbackBinding { listener, local_addr, origin, path })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Redirect URI the third party has to be configured with.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.origin, self.path)
    }

    /// Shut down the loopback server gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(CarCareError::Internal(format!(
                        "callback server panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

struct CallbackState {
    notifier: PopupNotifier,
    channel: MessageChannel,
}

async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Html<String> {
    let params = CallbackParams::from_query(&query);
    let context = CallbackContext::new(state.channel.clone());
    let report = state.notifier.run(&context, &params);
    debug!(?report, "callback handled");

    let close_after = context.terminate_after().unwrap_or(state.notifier.close_delay());
    Html(render_page(report, params.outcome().is_granted(), close_after))
}

fn render_page(report: NotifyReport, granted: bool, close_after: Duration) -> String {
    let message = match (report, granted) {
        (NotifyReport::Relayed, true) => "Calendar access granted. This window will close.",
        (NotifyReport::Relayed, false) => {
            "Calendar access was not granted. This window will close."
        }
        (NotifyReport::NoOpener | NotifyReport::Undelivered, _) => {
            "No calendar authorization is waiting for this window. You can close it."
        }
    };

    format!(
        "<!doctype html><html><head><title>CarCare</title></head><body>\
         <p>{message}</p>\
         <script>setTimeout(function () {{ window.close(); }}, {});</script>\
         </body></html>",
        close_after.as_millis()
    )
}
