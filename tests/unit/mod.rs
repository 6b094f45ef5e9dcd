// Unit tests for the services, run against the in-memory store

pub mod notification_service_test;
pub mod reminder_poller_test;
