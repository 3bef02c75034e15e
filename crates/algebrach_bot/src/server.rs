//! Long-polling bot server with the health endpoint alongside.

use crate::api::{HealthState, create_router};
use crate::routes::build_dispatcher;
use crate::Settings;
use algebrach_error::{AlgebrachResult, HttpError};
use algebrach_social::{ChatApi, Dispatcher, TelegramClient};
use algebrach_storage::{AirtableClient, KekStorage};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Long-poll timeout passed to `getUpdates`.
pub const POLL_TIMEOUT_SECS: u32 = 30;

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Polls Telegram, feeds every update to the dispatcher and serves the health API.
pub struct BotServer {
    settings: Settings,
    api: Arc<dyn ChatApi>,
    storage: Arc<KekStorage>,
}

impl BotServer {
    /// Server over an existing reply sink and storage.
    pub fn new(settings: Settings, api: Arc<dyn ChatApi>, storage: Arc<KekStorage>) -> Self {
        Self {
            settings,
            api,
            storage,
        }
    }

    /// Server talking to the Bot API and Airtable as configured.
    pub fn from_settings(settings: Settings) -> Self {
        let api = Arc::new(TelegramClient::new(settings.telegram_bot_token.clone()));
        let store = Arc::new(AirtableClient::new(
            settings.airtable_access_token.clone(),
            settings.airtable_base_id.clone(),
        ));
        let storage = Arc::new(KekStorage::new(store, settings.kek_storage_config()));
        Self::new(settings, api, storage)
    }

    /// Storage shared by handlers and the health API.
    pub fn storage(&self) -> &Arc<KekStorage> {
        &self.storage
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AlgebrachResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes, then stop the storage workers.
    #[instrument(skip_all, fields(app = %self.settings.app_name, environment = %self.settings.environment))]
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> AlgebrachResult<()> {
        info!("Starting bot server");

        let listener = TcpListener::bind(self.settings.health_addr())
            .await
            .map_err(|e| HttpError::new(format!("Failed to bind health endpoint: {}", e)))?;
        info!(addr = %self.settings.health_addr(), "Health endpoint listening");
        let router = create_router(HealthState::new(self.storage.clone()));
        let health = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "Health endpoint stopped");
            }
        });

        let dispatcher = Arc::new(self.dispatcher().await?);
        let mut offset = if self.settings.is_prod() {
            None
        } else {
            self.skip_pending().await
        };

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                polled = self.api.updates(offset, POLL_TIMEOUT_SECS) => match polled {
                    Ok(updates) => {
                        for update in updates {
                            offset = Some(update.update_id + 1);
                            let dispatcher = Arc::clone(&dispatcher);
                            tokio::spawn(async move {
                                dispatcher.feed_update(&update).await;
                            });
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Polling failed, pausing");
                        sleep(POLL_ERROR_PAUSE).await;
                    }
                },
            }
        }

        info!("Shutting down bot server");
        health.abort();
        self.storage.shutdown(true).await;
        info!("Bot server stopped");
        Ok(())
    }

    async fn dispatcher(&self) -> AlgebrachResult<Dispatcher> {
        let dispatcher = build_dispatcher(&self.settings, self.api.clone(), self.storage.clone())?;
        let me = self.api.me().await?;
        info!(bot_id = me.id, username = ?me.username, "Authorized");
        Ok(match me.username {
            Some(username) => dispatcher.with_bot_username(username),
            None => dispatcher,
        })
    }

    /// Offset just past whatever is queued, so old updates are dropped.
    async fn skip_pending(&self) -> Option<i64> {
        match self.api.updates(Some(-1), 0).await {
            Ok(updates) => {
                let offset = updates.last().map(|update| update.update_id + 1);
                info!(skipped_to = ?offset, "Dropped pending updates");
                offset
            }
            Err(e) => {
                warn!(error = %e, "Failed to drop pending updates");
                None
            }
        }
    }
}

impl std::fmt::Debug for BotServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotServer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
