use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;
use warden_bus::MessageBus;
use warden_core::InboundMessage;

use crate::error::{Result, SchedulerError};
use crate::schedule::CronSchedule;
use crate::types::CronJob;

/// How long the loop sleeps when no job is scheduled.
const IDLE_POLL_SECS: u64 = 60;

struct Inner {
    bus: Arc<MessageBus>,
    jobs: Mutex<HashMap<String, CronJob>>,
}

/// Drives cron jobs from a single cooperative task: sleeps until the
/// earliest `next_fire` across jobs, publishes the due job's templated
/// inbound message, recomputes `next_fire`, repeats.
pub struct CronService {
    inner: Arc<Inner>,
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CronService {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            inner: Arc::new(Inner {
                bus,
                jobs: Mutex::new(HashMap::new()),
            }),
            shutdown_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Parses `schedule_expr`, rejecting invalid cron expressions here
    /// rather than at fire time.
    pub async fn add_job(&self, schedule_expr: &str, template: InboundMessage) -> Result<String> {
        let schedule = CronSchedule::parse(schedule_expr)?;
        let next_fire = schedule.next_fire(Utc::now());
        let id = Uuid::new_v4().to_string();
        self.inner.jobs.lock().await.insert(
            id.clone(),
            CronJob {
                id: id.clone(),
                schedule,
                template,
                next_fire,
            },
        );
        info!(job_id = %id, expression = schedule_expr, "cron job added");
        Ok(id)
    }

    /// Removes a job by id. Returns `SchedulerError::JobNotFound` if no job
    /// with that id is registered.
    pub async fn remove_job(&self, id: &str) -> Result<()> {
        match self.inner.jobs.lock().await.remove(id) {
            Some(_) => {
                info!(job_id = %id, "cron job removed");
                Ok(())
            }
            None => Err(SchedulerError::JobNotFound { id: id.to_string() }),
        }
    }

    pub async fn list_jobs(&self) -> Vec<CronJob> {
        self.inner.jobs.lock().await.values().cloned().collect()
    }

    /// Spawns the scheduler loop. No-op if already started.
    pub async fn start(self: &Arc<Self>) {
        let mut task_guard = self.task.lock().await;
        if task_guard.is_some() {
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        *self.shutdown_tx.lock().await = Some(tx);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            info!("cron service started");
            loop {
                let sleep_duration = next_sleep_duration(&inner).await;
                tokio::select! {
                    _ = tokio::time::sleep(sleep_duration) => {
                        fire_due_jobs(&inner).await;
                    }
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            info!("cron service shutting down");
                            break;
                        }
                    }
                }
            }
        });
        *task_guard = Some(handle);
    }

    /// Signals the loop to exit and waits for it. In-flight publishes are
    /// allowed to complete.
    pub async fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
        }
    }
}

async fn next_sleep_duration(inner: &Inner) -> std::time::Duration {
    let earliest = inner.jobs.lock().await.values().filter_map(|j| j.next_fire).min();

    match earliest {
        Some(next) => (next - Utc::now()).to_std().unwrap_or(std::time::Duration::ZERO),
        None => std::time::Duration::from_secs(IDLE_POLL_SECS),
    }
}

async fn fire_due_jobs(inner: &Inner) {
    let now = Utc::now();
    let due_ids: Vec<String> = inner
        .jobs
        .lock()
        .await
        .values()
        .filter(|j| j.next_fire.is_some_and(|n| n <= now))
        .map(|j| j.id.clone())
        .collect();

    for id in due_ids {
        let template = match inner.jobs.lock().await.get(&id) {
            Some(job) => job.template.clone(),
            None => continue,
        };
        let mut message = template;
        message.timestamp = now.timestamp() as f64;

        inner.bus.publish_inbound(message).await;

        if let Some(job) = inner.jobs.lock().await.get_mut(&id) {
            job.next_fire = job.schedule.next_fire(now);
        } else {
            error!(job_id = %id, "cron job vanished between fire and reschedule");
        }
    }
}
