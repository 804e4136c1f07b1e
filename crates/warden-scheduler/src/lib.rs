//! Cron-driven scheduled wakes and the periodic heartbeat: both publish
//! synthetic `InboundMessage`s onto a `MessageBus` from a single owned task.

pub mod engine;
pub mod error;
pub mod heartbeat;
pub mod schedule;
pub mod types;

pub use engine::CronService;
pub use error::{Result, SchedulerError};
pub use heartbeat::HeartbeatService;
pub use schedule::CronSchedule;
pub use types::CronJob;
