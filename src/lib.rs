//! FitLife: exercise plans, live workout sessions and training reminders
//! served over HTTP on top of PostgreSQL.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod services;
pub mod store;
