use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use interprocess::local_socket::{
    tokio::{prelude::*, Stream},
    GenericFilePath, ListenerOptions,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, instrument, warn};

use webtally_core::{DayKey, Settings, SettingsStore, UsageLedger};
use webtally_protocol::{encode_frame, ledger_days, Request, Response};

use crate::actors::{RefreshReason, RulesHandle, TrackerHandle};

/// Everything a connection needs to answer a request.
#[derive(Clone)]
pub struct ServerContext {
    pub tracker: TrackerHandle,
    pub rules: RulesHandle,
    pub ledger: Arc<dyn UsageLedger>,
    pub settings_store: Arc<dyn SettingsStore>,
}

pub struct Server {
    socket_path: PathBuf,
    context: ServerContext,
}

impl Server {
    pub fn new(socket_path: PathBuf, context: ServerContext) -> Self {
        Self {
            socket_path,
            context,
        }
    }

    fn cleanup_stale_socket(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).context("failed to remove stale socket")?;
            debug!("removed stale socket file");
        }
        Ok(())
    }

    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        self.cleanup_stale_socket()?;

        let listener = ListenerOptions::new()
            .name(self.socket_path.as_os_str().to_fs_name::<GenericFilePath>()?)
            .create_tokio()?;

        info!(path = %self.socket_path.display(), "server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok(stream) => {
                            let context = self.context.clone();
                            tokio::spawn(async move {
                                if let Err(error) = handle_connection(stream, context).await {
                                    error!(%error, "connection handler failed");
                                }
                            });
                        }
                        Err(error) => {
                            error!(%error, "failed to accept connection");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.cleanup_socket();
        Ok(())
    }

    fn cleanup_socket(&self) {
        if let Err(error) = std::fs::remove_file(&self.socket_path) {
            debug!(%error, "socket file already removed");
        } else {
            debug!("socket file cleaned up");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cleanup_socket();
    }
}

async fn handle_connection(mut stream: Stream, context: ServerContext) -> Result<()> {
    debug!("new connection accepted");

    let mut length_buffer = [0u8; 4];
    stream.read_exact(&mut length_buffer).await?;
    let length = u32::from_le_bytes(length_buffer) as usize;

    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload).await?;

    let request: Request =
        bincode::deserialize(&payload).context("failed to deserialize request")?;

    debug!(?request, "received request");

    let response = handle_request(request, &context).await;

    debug!(?response, "sending response");

    stream.write_all(&encode_frame(&response)?).await?;
    stream.flush().await?;

    Ok(())
}

async fn handle_request(request: Request, context: &ServerContext) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::ActiveUrlKnown { url } => {
            if context.tracker.focus_changed(url).await.is_ok() {
                Response::Ok
            } else {
                unavailable("tracker")
            }
        }

        Request::IdleStateChanged { state } => {
            if context.tracker.idle_state_changed(state).await.is_ok() {
                Response::Ok
            } else {
                unavailable("tracker")
            }
        }

        Request::SettingsChanged => {
            context.rules.state_changed(RefreshReason::SettingsChanged);
            Response::Ok
        }

        Request::GetStatus => status(context).await,

        Request::GetUsage { days } => {
            let mut keys = Vec::with_capacity(days.len());
            for value in &days {
                match DayKey::parse(value) {
                    Some(key) => keys.push(key),
                    None => {
                        return Response::Error {
                            message: format!("invalid day '{}', expected YYYY-MM-DD", value),
                        }
                    }
                }
            }

            match context.ledger.find_range(&keys) {
                Ok(usage) => {
                    let mut totals: Vec<(String, i64)> = usage
                        .iter()
                        .map(|(domain, seconds)| (domain.to_string(), seconds))
                        .collect();
                    totals.sort_by(|left, right| right.1.cmp(&left.1).then(left.0.cmp(&right.0)));
                    Response::Usage { totals }
                }
                Err(error) => Response::Error {
                    message: error.to_string(),
                },
            }
        }

        Request::ExportLedger => match context.ledger.export_all() {
            Ok(ledger) => Response::Ledger {
                days: ledger_days(ledger),
            },
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },

        Request::ClearLedger => match context.ledger.clear_all() {
            Ok(rows) => {
                info!(rows, "usage ledger cleared");
                let _ = context.rules.refresh(RefreshReason::LedgerCleared).await;
                Response::Cleared { rows }
            }
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },

        Request::GetRules => match context.rules.installed().await {
            Some(rules) => Response::Rules {
                rules: rules.rules().to_vec(),
            },
            None => unavailable("rule engine"),
        },
    }
}

async fn status(context: &ServerContext) -> Response {
    let Some(active_domain) = context.tracker.active_domain().await else {
        return unavailable("tracker");
    };

    let today_seconds = match context.ledger.find_day(&DayKey::today()) {
        Ok(usage) => usage.total_seconds(),
        Err(error) => {
            return Response::Error {
                message: error.to_string(),
            }
        }
    };

    let settings = context.settings_store.load().unwrap_or_else(|error| {
        warn!(%error, "failed to load settings, reporting defaults");
        Settings::default()
    });

    let blocked_hosts = context
        .rules
        .installed()
        .await
        .map(|rules| rules.hosts())
        .unwrap_or_default();

    Response::Status {
        active_domain,
        today_seconds,
        limit_enabled: settings.enable_limit,
        limit_minutes: settings.limit_minutes,
        blocked_hosts,
    }
}

fn unavailable(component: &str) -> Response {
    Response::Error {
        message: format!("{} unavailable", component),
    }
}
