// Integration tests for API endpoints
// Complete request/response cycles through the router with authentication

pub mod api_endpoints_test;
pub mod auth_integration_test;
pub mod database_integration_test;
