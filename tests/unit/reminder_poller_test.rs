use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use fitlife::models::{CreateNotificationRequest, ReminderKind};
use fitlife::services::{ReminderHub, ReminderPoller};
use fitlife::store::FitnessStore;

use crate::common::{MemoryStore, MockDataGenerator};

#[cfg(test)]
mod reminder_poller_tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_poller_fires_active_plan_once_per_day() {
        let store = MemoryStore::new();
        let user_id = store.add_user("early@fitlife.app");
        let now: NaiveDateTime = Local::now().naive_local();

        let plan = store
            .create_plan(user_id, &MockDataGenerator::plan_request("Morning Run", Vec::new()))
            .await
            .unwrap();
        store.set_notification_time(plan.id, Some(now.time()));
        store.activate_plan(user_id, plan.id).await.unwrap();

        let idle = store
            .create_plan(user_id, &MockDataGenerator::plan_request("Idle", Vec::new()))
            .await
            .unwrap();
        store.set_notification_time(idle.id, Some(now.time()));

        let notification = store
            .create_notification(
                user_id,
                &CreateNotificationRequest {
                    title: "Hydrate".to_string(),
                    message: "Drink water before training".to_string(),
                    scheduled_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let mut rx = ReminderPoller::new(store.clone(), user_id, PERIOD)
            .with_clock(Arc::new(move || now))
            .spawn(cancel.clone());

        let first = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.kind, ReminderKind::Scheduled);
        assert_eq!(first.notification_id, Some(notification.id));

        let second = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(second.kind, ReminderKind::Training);
        assert_eq!(second.plan_id, Some(plan.id));
        assert_eq!(second.message, "Time to train! Plan: Morning Run");

        // Several more periods at the same minute fire nothing new.
        assert!(timeout(PERIOD * 6, rx.recv()).await.is_err());

        cancel.cancel();
        let closed = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert!(closed.is_none());
    }

    #[tokio::test]
    async fn test_plan_outside_its_minute_stays_quiet() {
        let store = MemoryStore::new();
        let user_id = store.add_user("late@fitlife.app");
        let now = Local::now().naive_local();

        let plan = store
            .create_plan(user_id, &MockDataGenerator::plan_request("Evening Lift", Vec::new()))
            .await
            .unwrap();
        store.set_notification_time(plan.id, Some((now + ChronoDuration::minutes(1)).time()));
        store.activate_plan(user_id, plan.id).await.unwrap();

        let cancel = CancellationToken::new();
        let mut rx = ReminderPoller::new(store.clone(), user_id, PERIOD)
            .with_clock(Arc::new(move || now))
            .spawn(cancel.clone());

        assert!(timeout(PERIOD * 6, rx.recv()).await.is_err());
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_hub_stops_user_streams() {
        let store = MemoryStore::new();
        let user_id = store.add_user("hub@fitlife.app");
        let shutdown = CancellationToken::new();
        let hub = ReminderHub::new(store.clone(), PERIOD, shutdown.clone());

        let (mut first, _) = hub.open_stream(user_id);
        let (mut second, _) = hub.open_stream(user_id);
        assert_eq!(hub.open_streams(user_id), 2);

        assert_eq!(hub.cancel_user(user_id), 2);
        assert_eq!(hub.open_streams(user_id), 0);
        assert!(timeout(Duration::from_secs(2), first.recv()).await.unwrap().is_none());
        assert!(timeout(Duration::from_secs(2), second.recv()).await.unwrap().is_none());

        let (mut third, _) = hub.open_stream(user_id);
        shutdown.cancel();
        assert!(timeout(Duration::from_secs(2), third.recv()).await.unwrap().is_none());
    }
}
