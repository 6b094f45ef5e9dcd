use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{validate_notification, CreateNotificationRequest, Notification};
use crate::services::ValidationError;
use crate::store::DynFitnessStore;

#[derive(Clone)]
pub struct NotificationService {
    store: DynFitnessStore,
}

impl NotificationService {
    pub fn new(store: DynFitnessStore) -> Self {
        Self { store }
    }

    pub async fn create_notification(
        &self,
        user_id: Uuid,
        request: CreateNotificationRequest,
    ) -> Result<Notification> {
        validate_notification(&request).map_err(ValidationError::from)?;
        let notification = self.store.create_notification(user_id, &request).await?;
        tracing::info!(
            notification_id = %notification.id,
            user_id = %user_id,
            scheduled_at = %notification.scheduled_at,
            "Scheduled notification"
        );
        Ok(notification)
    }

    pub async fn list_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        self.store.list_notifications(user_id, unread_only).await
    }

    /// Unread notifications scheduled within the local calendar day of `today`.
    pub async fn pending_for_day(&self, user_id: Uuid, today: NaiveDate) -> Result<Vec<Notification>> {
        let (from, to) = local_day_bounds(today);
        self.store.list_unread_between(user_id, from, to).await
    }

    pub async fn pending_today(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        self.pending_for_day(user_id, Local::now().date_naive()).await
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool> {
        self.store.mark_notification_read(user_id, notification_id).await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let updated = self.store.mark_all_notifications_read(user_id).await?;
        tracing::debug!(user_id = %user_id, updated, "Marked notifications read");
        Ok(updated)
    }
}

/// `[00:00:00, 23:59:59.999]` of `day` in local time, as UTC instants.
pub fn local_day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN);
    let end = day.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN));

    let to_utc = |naive: chrono::NaiveDateTime| {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    };

    (to_utc(start), to_utc(end))
}
