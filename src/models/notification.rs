use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub scheduled_at: DateTime<Utc>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub title: String,
    pub message: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Unread notification scheduled for today
    Scheduled,
    /// Active plan whose notification time has come
    Training,
}

/// A notice surfaced to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub title: String,
    pub message: String,
    pub plan_id: Option<Uuid>,
    pub notification_id: Option<Uuid>,
    pub fired_at: DateTime<Utc>,
}

impl Reminder {
    pub fn scheduled(notification: &Notification) -> Self {
        Self {
            kind: ReminderKind::Scheduled,
            title: notification.title.clone(),
            message: notification.message.clone(),
            plan_id: None,
            notification_id: Some(notification.id),
            fired_at: Utc::now(),
        }
    }

    pub fn training(plan_id: Uuid, plan_name: &str) -> Self {
        Self {
            kind: ReminderKind::Training,
            title: "Time to train!".to_string(),
            message: format!("Time to train! Plan: {}", plan_name),
            plan_id: Some(plan_id),
            notification_id: None,
            fired_at: Utc::now(),
        }
    }
}
