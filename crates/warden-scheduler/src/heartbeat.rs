use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::info;
use warden_bus::MessageBus;
use warden_core::InboundMessage;

/// Publishes a templated inbound message onto the bus every
/// `interval_seconds`, on a single owned task.
pub struct HeartbeatService {
    bus: Arc<MessageBus>,
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatService {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            shutdown_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Spawns the heartbeat loop. No-op if already started.
    pub async fn start(self: &Arc<Self>, interval_seconds: u64, template: InboundMessage) {
        let mut task_guard = self.task.lock().await;
        if task_guard.is_some() {
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        *self.shutdown_tx.lock().await = Some(tx);

        let bus = Arc::clone(&self.bus);
        let handle = tokio::spawn(async move {
            info!(interval_seconds, "heartbeat service started");
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
            interval.tick().await; // first tick fires immediately; consume it

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let mut message = template.clone();
                        message.timestamp = chrono::Utc::now().timestamp() as f64;
                        bus.publish_inbound(message).await;
                    }
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            info!("heartbeat service shutting down");
                            break;
                        }
                    }
                }
            }
        });
        *task_guard = Some(handle);
    }

    /// Cancels the next wake. A publish already underway completes.
    pub async fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
        }
    }
}
