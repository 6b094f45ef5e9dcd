//! Training reminders for connected clients.
//!
//! Each reminder stream owns one [`ReminderPoller`] task. On start it surfaces
//! the user's unread notifications for today, then checks the active plans
//! once per period and fires a plan whose notification time matches the
//! current local minute, at most once per plan per day.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::auth::AuthEvent;
use crate::models::{ExercisePlan, Reminder};
use crate::services::NotificationService;
use crate::store::DynFitnessStore;

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(60);
const REMINDER_BUFFER: usize = 32;

pub type LocalClock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Remembers which plans already fired on which local date.
#[derive(Debug, Default)]
pub struct ReminderTracker {
    fired: HashMap<Uuid, NaiveDate>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reminders for plans whose notification time is `now`'s minute and
    /// that have not fired yet on `now`'s date. Marks them fired.
    pub fn due(&mut self, plans: &[ExercisePlan], now: NaiveDateTime) -> Vec<Reminder> {
        let today = now.date();
        let mut reminders = Vec::new();

        for plan in plans.iter().filter(|p| p.is_active) {
            let Some(at) = plan.notification_time else {
                continue;
            };
            if at.hour() != now.hour() || at.minute() != now.minute() {
                continue;
            }
            if self.fired.get(&plan.id) == Some(&today) {
                continue;
            }

            self.fired.insert(plan.id, today);
            reminders.push(Reminder::training(plan.id, &plan.plan_name));
        }

        reminders
    }

    pub fn fired_on(&self, plan_id: Uuid) -> Option<NaiveDate> {
        self.fired.get(&plan_id).copied()
    }
}

pub struct ReminderPoller {
    store: DynFitnessStore,
    notifications: NotificationService,
    user_id: Uuid,
    period: Duration,
    clock: LocalClock,
}

impl ReminderPoller {
    pub fn new(store: DynFitnessStore, user_id: Uuid, period: Duration) -> Self {
        Self {
            notifications: NotificationService::new(store.clone()),
            store,
            user_id,
            period,
            clock: Arc::new(local_now),
        }
    }

    pub fn with_clock(mut self, clock: LocalClock) -> Self {
        self.clock = clock;
        self
    }

    /// Run until `cancel` fires or the receiver is dropped.
    pub fn spawn(self, cancel: CancellationToken) -> mpsc::Receiver<Reminder> {
        let (tx, rx) = mpsc::channel(REMINDER_BUFFER);
        tokio::spawn(self.run(tx, cancel));
        rx
    }

    async fn run(self, tx: mpsc::Sender<Reminder>, cancel: CancellationToken) {
        tracing::debug!(user_id = %self.user_id, "Reminder poller started");

        let today = (self.clock)().date();
        match self.notifications.pending_for_day(self.user_id, today).await {
            Ok(pending) => {
                for notification in &pending {
                    if tx.send(Reminder::scheduled(notification)).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(user_id = %self.user_id, "Failed to load today's notifications: {:#}", e),
        }

        let mut tracker = ReminderTracker::new();
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let plans = match self.store.list_active_plans(self.user_id).await {
                        Ok(plans) => plans,
                        Err(e) => {
                            tracing::warn!(user_id = %self.user_id, "Reminder check failed: {:#}", e);
                            continue;
                        }
                    };

                    for reminder in tracker.due(&plans, (self.clock)()) {
                        tracing::info!(
                            user_id = %self.user_id,
                            plan_id = ?reminder.plan_id,
                            "Training reminder fired"
                        );
                        if tx.send(reminder).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }

        tracing::debug!(user_id = %self.user_id, "Reminder poller stopped");
    }
}

/// Tracks the reminder streams open for each user so they can be torn down
/// on sign-out or shutdown.
#[derive(Clone)]
pub struct ReminderHub {
    store: DynFitnessStore,
    period: Duration,
    shutdown: CancellationToken,
    streams: Arc<Mutex<HashMap<Uuid, Vec<CancellationToken>>>>,
}

impl ReminderHub {
    pub fn new(store: DynFitnessStore, period: Duration, shutdown: CancellationToken) -> Self {
        Self {
            store,
            period,
            shutdown,
            streams: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start a poller for `user_id`. The returned token stops it.
    pub fn open_stream(&self, user_id: Uuid) -> (mpsc::Receiver<Reminder>, CancellationToken) {
        let token = self.shutdown.child_token();
        {
            let mut streams = self.streams.lock().unwrap_or_else(|e| e.into_inner());
            let tokens = streams.entry(user_id).or_default();
            tokens.retain(|t| !t.is_cancelled());
            tokens.push(token.clone());
        }

        let rx = ReminderPoller::new(self.store.clone(), user_id, self.period).spawn(token.clone());
        (rx, token)
    }

    /// Stop every poller of `user_id`; returns how many were running.
    pub fn cancel_user(&self, user_id: Uuid) -> usize {
        let tokens = self
            .streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&user_id)
            .unwrap_or_default();

        let live = tokens.iter().filter(|t| !t.is_cancelled()).count();
        for token in tokens {
            token.cancel();
        }
        live
    }

    pub fn open_streams(&self, user_id: Uuid) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .map(|tokens| tokens.iter().filter(|t| !t.is_cancelled()).count())
            .unwrap_or(0)
    }

    /// Follow auth events until shutdown, stopping a user's pollers when
    /// they sign out.
    pub fn spawn_listener(&self, mut events: broadcast::Receiver<AuthEvent>) -> JoinHandle<()> {
        let hub = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = hub.shutdown.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(AuthEvent::SignedOut { user_id }) => {
                            let stopped = hub.cancel_user(user_id);
                            tracing::info!(user_id = %user_id, stopped, "Stopped reminder streams after sign-out");
                        }
                        Ok(AuthEvent::SignedIn { user_id }) => {
                            tracing::debug!(user_id = %user_id, "User signed in");
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Auth event listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            tracing::debug!("Auth event listener stopped");
        })
    }
}
