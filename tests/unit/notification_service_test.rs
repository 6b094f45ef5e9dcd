use chrono::{Duration, Local, Utc};

use fitlife::models::CreateNotificationRequest;
use fitlife::services::{NotificationService, ValidationError};

use crate::common::MemoryStore;

#[cfg(test)]
mod notification_service_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(title: &str, offset: Duration) -> CreateNotificationRequest {
        CreateNotificationRequest {
            title: title.to_string(),
            message: format!("{} reminder", title),
            scheduled_at: Utc::now() + offset,
        }
    }

    #[tokio::test]
    async fn test_pending_for_day_only_returns_unread_of_that_day() {
        let store = MemoryStore::new();
        let user_id = store.add_user("notify@fitlife.app");
        let service = NotificationService::new(store.clone());

        let today = service
            .create_notification(user_id, request("Today", Duration::zero()))
            .await
            .unwrap();
        service
            .create_notification(user_id, request("Tomorrow", Duration::days(2)))
            .await
            .unwrap();
        let read = service
            .create_notification(user_id, request("Read", Duration::zero()))
            .await
            .unwrap();
        service.mark_read(user_id, read.id).await.unwrap();

        let pending = service
            .pending_for_day(user_id, Local::now().date_naive())
            .await
            .unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, today.id);
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_updates() {
        let store = MemoryStore::new();
        let user_id = store.add_user("notify@fitlife.app");
        let other = store.add_user("other@fitlife.app");
        let service = NotificationService::new(store.clone());

        for title in ["One", "Two", "Three"] {
            service
                .create_notification(user_id, request(title, Duration::hours(1)))
                .await
                .unwrap();
        }
        let foreign = service
            .create_notification(other, request("Foreign", Duration::hours(1)))
            .await
            .unwrap();

        assert!(!service.mark_read(user_id, foreign.id).await.unwrap());
        assert_eq!(service.mark_all_read(user_id).await.unwrap(), 3);
        assert_eq!(service.mark_all_read(user_id).await.unwrap(), 0);
        assert!(service.list_notifications(user_id, true).await.unwrap().is_empty());
        assert_eq!(service.list_notifications(other, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let store = MemoryStore::new();
        let user_id = store.add_user("notify@fitlife.app");
        let service = NotificationService::new(store.clone());

        let error = service
            .create_notification(user_id, request("  ", Duration::zero()))
            .await
            .unwrap_err();

        assert!(error.downcast_ref::<ValidationError>().is_some());
        assert!(service.list_notifications(user_id, false).await.unwrap().is_empty());
    }
}
