use chrono::{DateTime, Utc};
use warden_core::InboundMessage;

use crate::schedule::CronSchedule;

/// A registered cron job: its parsed schedule, the inbound message template
/// it publishes on fire, and its next scheduled instant.
#[derive(Debug, Clone)]
pub struct CronJob {
    pub id: String,
    pub schedule: CronSchedule,
    pub template: InboundMessage,
    pub next_fire: Option<DateTime<Utc>>,
}
