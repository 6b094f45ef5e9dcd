// Runs against a real PostgreSQL in Docker: `cargo test -- --ignored`

use assert_matches::assert_matches;
use std::sync::Arc;
use uuid::Uuid;

use fitlife::config::DatabaseSeeder;
use fitlife::models::*;
use fitlife::services::{PlanService, WorkoutError, WorkoutSessionController};
use fitlife::store::{AuthStore, DynFitnessStore, FitnessStore, PgStore};

use crate::common::{init_test_logging, DatabaseTestHelpers, MockDataGenerator, TestDatabase};

#[cfg(test)]
mod database_integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn seeded_store(test_db: &TestDatabase) -> Arc<PgStore> {
        DatabaseTestHelpers::clean_database(&test_db.pool).await.unwrap();
        DatabaseSeeder::new(test_db.pool.clone()).seed_all().await.unwrap();
        Arc::new(PgStore::new(test_db.pool.clone()))
    }

    async fn user(store: &PgStore) -> Uuid {
        let profile = NewProfile {
            full_name: "Ana Souza".to_string(),
            age: 31,
            weight_kg: 64.0,
            height_cm: 168.0,
            goal: "Weight loss".to_string(),
        };
        store
            .create_user(&format!("ana{}@fitlife.app", Uuid::new_v4()), "$2b$12$dummy_hash", &profile)
            .await
            .unwrap()
            .id
    }

    async fn first_exercises(store: &PgStore, count: usize) -> Vec<PlanExerciseInput> {
        store
            .list_exercises(&ExerciseFilter::default())
            .await
            .unwrap()
            .into_iter()
            .take(count)
            .map(|e| MockDataGenerator::plan_input(e.id))
            .collect()
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_seeding_is_idempotent() {
        init_test_logging();
        let test_db = TestDatabase::new().await;
        DatabaseTestHelpers::clean_database(&test_db.pool).await.unwrap();

        let seeder = DatabaseSeeder::new(test_db.pool.clone());
        let first = seeder.seed_exercises().await.unwrap();
        let second = seeder.seed_exercises().await.unwrap();

        assert!(first > 0);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_registration_creates_profile_row() {
        let test_db = TestDatabase::new().await;
        let store = seeded_store(&test_db).await;
        let user_id = user(&store).await;

        let profile = store.get_profile(user_id).await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Ana Souza");
        assert_eq!(profile.age, Some(31));
        assert_eq!(profile.goal.as_deref(), Some("Weight loss"));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_workout_session_round_trip() {
        init_test_logging();
        let test_db = TestDatabase::new().await;
        let store = seeded_store(&test_db).await;
        let user_id = user(&store).await;
        let inputs = first_exercises(&store, 3).await;

        let plans = PlanService::new(store.clone());
        let plan = plans
            .create_plan(user_id, MockDataGenerator::plan_request("HIIT Intensivo", inputs.clone()))
            .await
            .unwrap()
            .plan;

        let dyn_store: DynFitnessStore = store.clone();
        let mut controller = WorkoutSessionController::open(dyn_store.clone(), user_id, plan.id)
            .await
            .unwrap();
        let session_id = controller.session().unwrap().id;
        controller.complete_exercise(inputs[0].exercise_id).await.unwrap();
        controller.stop_clock();

        // A fresh controller picks up the same session and its log.
        let mut resumed = WorkoutSessionController::open(dyn_store.clone(), user_id, plan.id)
            .await
            .unwrap();
        assert_eq!(resumed.session().unwrap().id, session_id);
        assert_eq!(resumed.completed_count(), 1);
        assert_eq!(resumed.current_index(), 1);

        let finished = resumed.finish().await.unwrap();
        assert_eq!(finished.status, SessionStatus::Completed);
        assert_eq!(finished.completed_exercises, 1);

        let plan = store.get_plan(user_id, plan.id).await.unwrap().unwrap();
        assert_eq!(plan.completed_sessions, 1);

        let logs = store.list_session_logs(session_id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].exercise_id, inputs[0].exercise_id);

        // Finished sessions take no more logs.
        let late = NewExerciseLog {
            user_id,
            exercise_id: inputs[1].exercise_id,
            plan_id: plan.id,
            session_id,
            sets_completed: 1,
            reps_completed: 1,
            duration_minutes: 0,
            weight_kg: 0.0,
            notes: None,
        };
        assert!(store.insert_exercise_log(&late).await.is_err());

        let next = WorkoutSessionController::open(dyn_store, user_id, plan.id).await.unwrap();
        assert_eq!(next.session().unwrap().session_number, 2);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_activation_is_exclusive_per_user() {
        let test_db = TestDatabase::new().await;
        let store = seeded_store(&test_db).await;
        let user_id = user(&store).await;
        let inputs = first_exercises(&store, 2).await;

        let a = store
            .create_plan(user_id, &MockDataGenerator::plan_request("A", inputs.clone()))
            .await
            .unwrap();
        let b = store
            .create_plan(user_id, &MockDataGenerator::plan_request("B", inputs))
            .await
            .unwrap();

        store.activate_plan(user_id, a.id).await.unwrap();
        store.activate_plan(user_id, b.id).await.unwrap();

        let active = store.list_active_plans(user_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_deleting_plan_removes_its_sessions() {
        let test_db = TestDatabase::new().await;
        let store = seeded_store(&test_db).await;
        let user_id = user(&store).await;
        let inputs = first_exercises(&store, 1).await;

        let plan = store
            .create_plan(user_id, &MockDataGenerator::plan_request("Short", inputs))
            .await
            .unwrap();
        let session = store.create_session(user_id, plan.id, 1).await.unwrap();

        assert!(store.delete_plan(user_id, plan.id).await.unwrap());
        assert!(store.get_session(user_id, session.id).await.unwrap().is_none());

        let dyn_store: DynFitnessStore = store.clone();
        let reopened = WorkoutSessionController::open(dyn_store, user_id, plan.id).await;
        assert_matches!(reopened, Err(WorkoutError::PlanNotFound));
    }
}
