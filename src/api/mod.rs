// API routes and handlers

pub mod auth;
pub mod error;
pub mod exercises;
pub mod health;
pub mod notifications;
pub mod plans;
pub mod profile;
pub mod reminders;
pub mod routes;
pub mod workouts;

pub use error::{ApiError, ApiResult};
pub use routes::{create_routes, AppState};
