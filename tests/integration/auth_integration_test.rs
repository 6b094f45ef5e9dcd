use axum::http::Method;
use serde_json::json;

use crate::common::{MockDataGenerator, TestApp};

#[cfg(test)]
mod auth_integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_register_returns_tokens_and_creates_profile() {
        let app = TestApp::new();
        let registration = MockDataGenerator::registration();

        let (status, body) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::to_value(&registration).unwrap()),
                None,
            )
            .await;

        assert_eq!(status, 201);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 900);
        assert_eq!(body["user"]["email"], registration.email.as_str());
        assert!(body["refresh_token"].as_str().is_some());

        let token = body["access_token"].as_str().unwrap();
        let (status, me) = app.request(Method::GET, "/api/auth/me", None, Some(token)).await;
        assert_eq!(status, 200);
        assert_eq!(me["profile"]["full_name"], registration.full_name.as_str());
        assert_eq!(me["profile"]["goal"], "Build endurance");
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords() {
        let app = TestApp::new();
        let mut registration = MockDataGenerator::registration();
        registration.confirm_password = "different1".to_string();

        let (status, body) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::to_value(&registration).unwrap()),
                None,
            )
            .await;

        assert_eq!(status, 400);
        assert_eq!(body["error"], "Passwords do not match");
    }

    #[tokio::test]
    async fn test_register_requires_every_field() {
        let app = TestApp::new();

        let (status, _) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(json!({ "email": "half@fitlife.app", "password": "abc12345" })),
                None,
            )
            .await;

        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let app = TestApp::new();
        let registration = serde_json::to_value(MockDataGenerator::registration()).unwrap();

        let (first, _) = app
            .request(Method::POST, "/api/auth/register", Some(registration.clone()), None)
            .await;
        let (second, body) = app
            .request(Method::POST, "/api/auth/register", Some(registration), None)
            .await;

        assert_eq!(first, 201);
        assert_eq!(second, 409);
        assert_eq!(body["error"], "Email already exists");
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let app = TestApp::new();
        let registration = MockDataGenerator::registration();
        app.request(
            Method::POST,
            "/api/auth/register",
            Some(serde_json::to_value(&registration).unwrap()),
            None,
        )
        .await;

        let (status, _) = app
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": registration.email, "password": "wrong-pass1" })),
                None,
            )
            .await;
        assert_eq!(status, 401);

        let (status, login) = app
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": registration.email, "password": registration.password })),
                None,
            )
            .await;
        assert_eq!(status, 200);

        let refresh_token = login["refresh_token"].as_str().unwrap();
        let (status, refreshed) = app
            .request(
                Method::POST,
                "/api/auth/refresh",
                Some(json!({ "refresh_token": refresh_token })),
                None,
            )
            .await;
        assert_eq!(status, 200);
        assert!(refreshed["access_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_logout_revokes_access_and_refresh_tokens() {
        let app = TestApp::new();
        let registration = MockDataGenerator::registration();
        let (_, body) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::to_value(&registration).unwrap()),
                None,
            )
            .await;
        let token = body["access_token"].as_str().unwrap().to_string();
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

        let (status, logout) = app.request(Method::POST, "/api/auth/logout", None, Some(&token)).await;
        assert_eq!(status, 200);
        assert_eq!(logout["message"], "Successfully logged out");

        let (status, _) = app.request(Method::GET, "/api/profile", None, Some(&token)).await;
        assert_eq!(status, 401);

        let (status, _) = app
            .request(
                Method::POST,
                "/api/auth/refresh",
                Some(json!({ "refresh_token": refresh_token })),
                None,
            )
            .await;
        assert_eq!(status, 401);

        let (status, _) = app.request(Method::GET, "/api/plans", None, Some(&refresh_token)).await;
        assert_eq!(status, 401);
        let (status, _) = app.request(Method::GET, "/api/auth/me", None, Some(&refresh_token)).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_a_bearer_token() {
        let app = TestApp::new();
        let (_, body) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::to_value(MockDataGenerator::registration()).unwrap()),
                None,
            )
            .await;
        let access_token = body["access_token"].as_str().unwrap().to_string();
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

        let (status, _) = app.request(Method::GET, "/api/plans", None, Some(&refresh_token)).await;
        assert_eq!(status, 401);

        let (status, _) = app
            .request(
                Method::POST,
                "/api/auth/refresh",
                Some(json!({ "refresh_token": access_token })),
                None,
            )
            .await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_email_is_matched_regardless_of_case_and_spacing() {
        let app = TestApp::new();
        let mut registration = MockDataGenerator::registration();
        registration.email = " Marta.Lima@FitLife.app".to_string();

        let (status, body) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::to_value(&registration).unwrap()),
                None,
            )
            .await;
        assert_eq!(status, 201);
        assert_eq!(body["user"]["email"], "marta.lima@fitlife.app");

        let (status, _) = app
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": registration.email, "password": registration.password })),
                None,
            )
            .await;
        assert_eq!(status, 200);

        registration.email = "MARTA.LIMA@fitlife.app".to_string();
        let (status, _) = app
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::to_value(&registration).unwrap()),
                None,
            )
            .await;
        assert_eq!(status, 409);
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer_token() {
        let app = TestApp::new();

        let (status, body) = app.request(Method::GET, "/api/plans", None, None).await;
        assert_eq!(status, 401);
        assert_eq!(body["error"], "Missing authorization header");

        let (status, _) = app.request(Method::GET, "/api/plans", None, Some("not-a-jwt")).await;
        assert_eq!(status, 401);
    }
}
