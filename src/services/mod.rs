// Business logic services

pub mod exercise_service;
pub mod notification_service;
pub mod plan_service;
pub mod profile_service;
pub mod reminder_poller;
pub mod session_clock;
pub mod session_registry;
pub mod workout_session;

pub use exercise_service::ExerciseService;
pub use notification_service::NotificationService;
pub use plan_service::PlanService;
pub use profile_service::ProfileService;
pub use reminder_poller::{ReminderHub, ReminderPoller, ReminderTracker};
pub use session_clock::SessionClock;
pub use session_registry::{SessionRegistry, SharedController};
pub use workout_session::{WorkoutError, WorkoutSessionController};

/// Input rejected before anything was written. Carried inside
/// `anyhow::Error` so handlers can tell it apart from storage failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl From<anyhow::Error> for ValidationError {
    fn from(error: anyhow::Error) -> Self {
        ValidationError(error.to_string())
    }
}
