use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::{ExerciseLogRecord, SessionPhase, SessionStatus, WorkoutSession};
use crate::services::workout_session::{WorkoutError, WorkoutSessionController};
use crate::store::DynFitnessStore;

pub type SharedController = Arc<Mutex<WorkoutSessionController>>;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
struct LiveSession {
    user_id: Uuid,
    plan_id: Uuid,
    controller: SharedController,
    last_access: Arc<std::sync::Mutex<Instant>>,
}

impl LiveSession {
    fn touch(&self) {
        if let Ok(mut last_access) = self.last_access.lock() {
            *last_access = Instant::now();
        }
    }

    fn idle_for(&self, now: Instant) -> Duration {
        self.last_access
            .lock()
            .map(|last_access| now.saturating_duration_since(*last_access))
            .unwrap_or_default()
    }
}

/// Live session controllers keyed by session id.
///
/// A controller leaves the registry once its session is finished or
/// cancelled, its plan is deleted, or it sits idle past the sweeper's
/// timeout. A session that is still `in_progress` in the store but not
/// live here (after a restart or an eviction) is resumed on first access.
#[derive(Clone)]
pub struct SessionRegistry {
    store: DynFitnessStore,
    live: Arc<RwLock<HashMap<Uuid, LiveSession>>>,
    // One gate per (user, plan) so concurrent opens cannot both create a session.
    opening: Arc<std::sync::Mutex<HashMap<(Uuid, Uuid), Arc<Mutex<()>>>>>,
}

impl SessionRegistry {
    pub fn new(store: DynFitnessStore) -> Self {
        Self {
            store,
            live: Arc::new(RwLock::new(HashMap::new())),
            opening: Arc::new(std::sync::Mutex::new(HashMap::new())),
        }
    }

    /// Resume or start the user's session for `plan_id`.
    pub async fn open(&self, user_id: Uuid, plan_id: Uuid) -> Result<(Uuid, SharedController), WorkoutError> {
        let gate = self.open_gate(user_id, plan_id);
        let opened = {
            let _guard = gate.lock().await;
            self.open_serialized(user_id, plan_id).await
        };
        drop(gate);
        self.release_gate(user_id, plan_id);
        opened
    }

    async fn open_serialized(&self, user_id: Uuid, plan_id: Uuid) -> Result<(Uuid, SharedController), WorkoutError> {
        if let Some((session_id, entry)) = self.find_live(user_id, plan_id).await {
            if entry.controller.lock().await.phase() == SessionPhase::Active {
                entry.touch();
                return Ok((session_id, entry.controller));
            }
            self.remove(session_id).await;
        }

        let controller = WorkoutSessionController::open(self.store.clone(), user_id, plan_id).await?;
        let session_id = controller
            .session()
            .map(|s| s.id)
            .ok_or(WorkoutError::SessionNotFound)?;

        let mut live = self.live.write().await;
        let entry = live.entry(session_id).or_insert_with(|| LiveSession {
            user_id,
            plan_id,
            controller: Arc::new(Mutex::new(controller)),
            last_access: Arc::new(std::sync::Mutex::new(Instant::now())),
        });
        entry.touch();

        Ok((session_id, entry.controller.clone()))
    }

    /// The live controller of `session_id`, resuming it from the store if needed.
    pub async fn get(&self, user_id: Uuid, session_id: Uuid) -> Result<SharedController, WorkoutError> {
        if let Some(entry) = self.live.read().await.get(&session_id) {
            if entry.user_id == user_id {
                entry.touch();
                return Ok(entry.controller.clone());
            }
            return Err(WorkoutError::SessionNotFound);
        }

        let session = self
            .store
            .get_session(user_id, session_id)
            .await?
            .ok_or(WorkoutError::SessionNotFound)?;

        if session.status != SessionStatus::InProgress {
            return Err(WorkoutError::NotActive);
        }

        let (resumed_id, shared) = self.open(user_id, session.plan_id).await?;
        if resumed_id != session_id {
            // An older in-progress session of the same plan; only the most
            // recent one is resumable.
            return Err(WorkoutError::NotActive);
        }

        tracing::info!(session_id = %session_id, "Rehydrated workout session");
        Ok(shared)
    }

    pub async fn remove(&self, session_id: Uuid) -> Option<SharedController> {
        self.live
            .write()
            .await
            .remove(&session_id)
            .map(|entry| entry.controller)
    }

    /// Drop the live controllers of a plan that no longer exists.
    pub async fn remove_plan(&self, user_id: Uuid, plan_id: Uuid) -> usize {
        let removed: Vec<LiveSession> = {
            let mut live = self.live.write().await;
            let ids: Vec<Uuid> = live
                .iter()
                .filter(|(_, entry)| entry.user_id == user_id && entry.plan_id == plan_id)
                .map(|(session_id, _)| *session_id)
                .collect();
            ids.iter().filter_map(|id| live.remove(id)).collect()
        };

        for entry in &removed {
            entry.controller.lock().await.stop_clock();
        }
        removed.len()
    }

    /// Drop controllers nobody touched for `max_idle`. A controller that is
    /// locked by a request right now is left for the next sweep.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut live = self.live.write().await;
        let idle: Vec<Uuid> = live
            .iter()
            .filter(|(_, entry)| entry.idle_for(now) >= max_idle)
            .map(|(session_id, _)| *session_id)
            .collect();

        let mut evicted = 0;
        for session_id in idle {
            let stopped = match live.get(&session_id) {
                Some(entry) => match entry.controller.try_lock() {
                    Ok(mut controller) => {
                        controller.stop_clock();
                        true
                    }
                    Err(_) => false,
                },
                None => false,
            };
            if stopped {
                live.remove(&session_id);
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::info!(evicted, remaining = live.len(), "Evicted idle workout sessions");
        }
        evicted
    }

    /// Evict idle controllers every `period` until `shutdown` fires.
    pub fn spawn_sweeper(&self, max_idle: Duration, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        registry.evict_idle(max_idle).await;
                    }
                }
            }
            tracing::debug!("Session sweeper stopped");
        })
    }

    /// Stored sessions of the user, newest first, optionally for one plan.
    pub async fn history(&self, user_id: Uuid, plan_id: Option<Uuid>) -> Result<Vec<WorkoutSession>, WorkoutError> {
        Ok(self.store.list_sessions(user_id, plan_id).await?)
    }

    /// A stored session and its persisted logs, whatever its status.
    pub async fn stored(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<(WorkoutSession, Vec<ExerciseLogRecord>), WorkoutError> {
        let session = self
            .store
            .get_session(user_id, session_id)
            .await?
            .ok_or(WorkoutError::SessionNotFound)?;
        let logs = self.store.list_session_logs(session.id).await?;
        Ok((session, logs))
    }

    /// Drop every live controller and stop its clock. Sessions stay
    /// `in_progress` in the store and resume on next access.
    pub async fn close_all(&self) {
        let drained: Vec<LiveSession> = self.live.write().await.drain().map(|(_, entry)| entry).collect();
        for entry in drained {
            entry.controller.lock().await.stop_clock();
        }
    }

    pub async fn live_count(&self) -> usize {
        self.live.read().await.len()
    }

    async fn find_live(&self, user_id: Uuid, plan_id: Uuid) -> Option<(Uuid, LiveSession)> {
        self.live
            .read()
            .await
            .iter()
            .find(|(_, entry)| entry.user_id == user_id && entry.plan_id == plan_id)
            .map(|(session_id, entry)| (*session_id, entry.clone()))
    }

    fn open_gate(&self, user_id: Uuid, plan_id: Uuid) -> Arc<Mutex<()>> {
        match self.opening.lock() {
            Ok(mut gates) => gates.entry((user_id, plan_id)).or_default().clone(),
            Err(_) => Arc::new(Mutex::new(())),
        }
    }

    fn release_gate(&self, user_id: Uuid, plan_id: Uuid) {
        if let Ok(mut gates) = self.opening.lock() {
            // Only the map still holds it: no open is waiting.
            if gates
                .get(&(user_id, plan_id))
                .map(|gate| Arc::strong_count(gate) == 1)
                .unwrap_or(false)
            {
                gates.remove(&(user_id, plan_id));
            }
        }
    }
}
