use axum::http::Method;
use chrono::Utc;
use serde_json::{json, Value};

use fitlife::models::Difficulty;

use crate::common::{ApiTestHelpers, TestApp};

#[cfg(test)]
mod api_endpoints_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exercise_body(id: &str, sets: i32) -> Value {
        json!({ "exercise_id": id, "sets": sets, "reps": 10, "weight_kg": 20.0 })
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/health", None, None).await;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["live_sessions"], 0);
    }

    #[tokio::test]
    async fn test_exercise_catalog_filters() {
        let app = TestApp::new();
        let (_, token) = app.sign_up().await;
        app.store.add_exercise("Burpee", "full_body", Difficulty::Intermediate);
        app.store.add_exercise("Plank", "core", Difficulty::Beginner);
        let squat = app.store.add_exercise("Squat", "legs", Difficulty::Beginner);

        let (status, all) = app.request(Method::GET, "/api/exercises", None, Some(&token)).await;
        assert_eq!(status, 200);
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, beginners) = app
            .request(Method::GET, "/api/exercises?difficulty=beginner", None, Some(&token))
            .await;
        let names: Vec<&str> = beginners
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Plank", "Squat"]);

        let (_, legs) = app
            .request(Method::GET, "/api/exercises?muscle_group=LEGS", None, Some(&token))
            .await;
        assert_eq!(legs.as_array().unwrap().len(), 1);

        let uri = format!("/api/exercises/{}", squat.id);
        let (status, found) = app.request(Method::GET, &uri, None, Some(&token)).await;
        assert_eq!(status, 200);
        assert_eq!(found["name"], "Squat");

        let uri = format!("/api/exercises/{}", uuid::Uuid::new_v4());
        let (status, missing) = app.request(Method::GET, &uri, None, Some(&token)).await;
        assert_eq!(status, 404);
        assert_eq!(missing["error_code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_plan_crud_and_activation() {
        let app = TestApp::new();
        let (_, token) = app.sign_up().await;
        let run = app.store.add_exercise("Run", "cardio", Difficulty::Beginner).id.to_string();
        let row = app.store.add_exercise("Row", "back", Difficulty::Intermediate).id.to_string();

        let (status, created) = app
            .request(
                Method::POST,
                "/api/plans",
                Some(json!({
                    "plan_name": "Cardio Base",
                    "goal": "Endurance",
                    "total_sessions": 10,
                    "notification_time": "07:30:00",
                    "exercises": [exercise_body(&run, 1), exercise_body(&row, 3)]
                })),
                Some(&token),
            )
            .await;
        assert_eq!(status, 201);
        assert_eq!(created["plan"]["is_active"], false);
        assert_eq!(created["exercises"][0]["exercise"]["name"], "Run");
        assert_eq!(created["exercises"][1]["order_in_plan"], 2);
        let plan_id = created["plan"]["id"].as_str().unwrap().to_string();

        let (status, updated) = app
            .request(
                Method::PUT,
                &format!("/api/plans/{}", plan_id),
                Some(json!({ "plan_name": "Cardio Base II" })),
                Some(&token),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(updated["plan_name"], "Cardio Base II");

        let (status, reordered) = app
            .request(
                Method::PUT,
                &format!("/api/plans/{}/exercises", plan_id),
                Some(json!([exercise_body(&row, 3)])),
                Some(&token),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(reordered.as_array().unwrap().len(), 1);

        let (status, active) = app.request(Method::GET, "/api/plans/active", None, Some(&token)).await;
        assert_eq!(status, 200);
        assert_eq!(active, Value::Null);

        let (status, activated) = app
            .request(Method::POST, &format!("/api/plans/{}/activate", plan_id), None, Some(&token))
            .await;
        assert_eq!(status, 200);
        assert_eq!(activated["is_active"], true);

        let (_, active) = app.request(Method::GET, "/api/plans/active", None, Some(&token)).await;
        assert_eq!(active["plan"]["id"], plan_id.as_str());

        let (status, deleted) = app
            .request(Method::DELETE, &format!("/api/plans/{}", plan_id), None, Some(&token))
            .await;
        assert_eq!(status, 200);
        assert_eq!(deleted["deleted"], true);

        let (status, _) = app
            .request(Method::GET, &format!("/api/plans/{}", plan_id), None, Some(&token))
            .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_plan_validation_errors_are_bad_requests() {
        let app = TestApp::new();
        let (_, token) = app.sign_up().await;

        let (status, body) = app
            .request(
                Method::POST,
                "/api/plans",
                Some(json!({ "plan_name": "", "goal": "Strength" })),
                Some(&token),
            )
            .await;
        assert_eq!(status, 400);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Plan name cannot be empty");

        let (status, body) = app
            .request(
                Method::POST,
                "/api/plans",
                Some(json!({
                    "plan_name": "Ghost",
                    "goal": "Strength",
                    "exercises": [exercise_body(&uuid::Uuid::new_v4().to_string(), 3)]
                })),
                Some(&token),
            )
            .await;
        assert_eq!(status, 400);
        assert!(body["message"].as_str().unwrap().starts_with("Unknown exercises"));
    }

    #[tokio::test]
    async fn test_plans_of_other_users_are_hidden() {
        let app = TestApp::new();
        let (_, owner) = app.sign_up().await;
        let (_, intruder) = app.sign_up().await;

        let (_, created) = app
            .request(
                Method::POST,
                "/api/plans",
                Some(json!({ "plan_name": "Mine", "goal": "Strength" })),
                Some(&owner),
            )
            .await;
        let plan_id = created["plan"]["id"].as_str().unwrap();

        let (status, _) = app
            .request(Method::GET, &format!("/api/plans/{}", plan_id), None, Some(&intruder))
            .await;
        assert_eq!(status, 404);

        let (status, _) = app
            .request(Method::POST, &format!("/api/plans/{}/activate", plan_id), None, Some(&intruder))
            .await;
        assert_eq!(status, 404);

        let (_, listed) = app.request(Method::GET, "/api/plans", None, Some(&intruder)).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_update() {
        let app = TestApp::new();
        let (user_id, token) = app.sign_up().await;

        let (status, profile) = app
            .request(
                Method::PUT,
                "/api/profile",
                Some(json!({ "weight_kg": 72.5, "goal": "Run a marathon" })),
                Some(&token),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(profile["id"], user_id.to_string().as_str());
        assert_eq!(profile["weight_kg"], 72.5);
        assert_eq!(profile["goal"], "Run a marathon");

        let (status, _) = app
            .request(Method::PUT, "/api/profile", Some(json!({ "age": 4 })), Some(&token))
            .await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_notifications_lifecycle() {
        let app = TestApp::new();
        let (_, token) = app.sign_up().await;

        let (status, created) = app
            .request(
                Method::POST,
                "/api/notifications",
                Some(json!({
                    "title": "Stretch",
                    "message": "Five minutes of stretching",
                    "scheduled_at": Utc::now()
                })),
                Some(&token),
            )
            .await;
        assert_eq!(status, 201);
        assert_eq!(created["is_read"], false);
        let id = created["id"].as_str().unwrap();

        let (_, today) = app.request(Method::GET, "/api/notifications/today", None, Some(&token)).await;
        assert_eq!(today.as_array().unwrap().len(), 1);

        let (status, marked) = app
            .request(Method::POST, &format!("/api/notifications/{}/read", id), None, Some(&token))
            .await;
        assert_eq!(status, 200);
        assert_eq!(marked["updated"], 1);

        let (_, unread) = app
            .request(Method::GET, "/api/notifications?unread_only=true", None, Some(&token))
            .await;
        assert!(unread.as_array().unwrap().is_empty());

        let (_, everything) = app.request(Method::GET, "/api/notifications", None, Some(&token)).await;
        assert_eq!(everything.as_array().unwrap().len(), 1);

        let (status, _) = app
            .request(
                Method::POST,
                &format!("/api/notifications/{}/read", uuid::Uuid::new_v4()),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_reminder_stream_sends_todays_notifications() {
        let app = TestApp::new();
        let (user_id, token) = app.sign_up().await;
        app.request(
            Method::POST,
            "/api/notifications",
            Some(json!({
                "title": "Hydrate",
                "message": "Drink water before training",
                "scheduled_at": Utc::now()
            })),
            Some(&token),
        )
        .await;

        let (status, event) = app.first_event("/api/reminders/stream", &token).await;
        assert_eq!(status, 200);
        assert!(event.contains("event: reminder"));
        assert!(event.contains("Drink water before training"));

        // The response was dropped with its stream, which stops the poller.
        assert_eq!(app.state.reminders.open_streams(user_id), 0);
    }

    #[tokio::test]
    async fn test_token_for_unknown_user_is_not_found() {
        let app = TestApp::new();
        let token = ApiTestHelpers::create_test_token(uuid::Uuid::new_v4(), "ghost@fitlife.app");

        let (status, body) = app.request(Method::GET, "/api/auth/me", None, Some(&token)).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "User not found");
    }
}
