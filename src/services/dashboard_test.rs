use super::*;
use crate::error::ErrorCode;

#[test]
fn validate_name_trims() {
    assert_eq!(validate_name("  Sales Q3 ").unwrap(), "Sales Q3");
}

#[test]
fn validate_name_rejects_blank() {
    for raw in ["", "   ", "\t\n"] {
        assert!(matches!(validate_name(raw), Err(DashboardError::Invalid(_))));
    }
}

#[test]
fn validate_image_data_accepts_data_urls() {
    assert!(validate_image_data("data:image/png;base64,iVBORw0KGgo=").is_ok());
    assert!(validate_image_data(" data:image/jpeg;base64,AAAA ").is_ok());
}

#[test]
fn validate_image_data_rejects_other_payloads() {
    assert!(matches!(validate_image_data(""), Err(DashboardError::Invalid(_))));
    assert!(matches!(validate_image_data("https://example.test/a.png"), Err(DashboardError::Invalid(_))));
    assert!(matches!(validate_image_data("data:text/plain,hi"), Err(DashboardError::Invalid(_))));
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(DashboardError::NotFound(Uuid::nil()).error_code(), "E_DASHBOARD_NOT_FOUND");
    assert_eq!(DashboardError::Invalid("x".into()).error_code(), "E_INVALID_INPUT");
    assert_eq!(DashboardError::Database(sqlx::Error::RowNotFound).error_code(), "E_DATABASE");
}

#[test]
fn only_transient_database_errors_are_retryable() {
    assert!(DashboardError::Database(sqlx::Error::PoolTimedOut).retryable());
    assert!(!DashboardError::Database(sqlx::Error::RowNotFound).retryable());
    assert!(!DashboardError::NotFound(Uuid::nil()).retryable());
}

#[tokio::test]
async fn queries_against_test_pool_fail_fast() {
    let state = crate::state::test_helpers::test_app_state();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), list_dashboards(&state.pool)).await;
    let Ok(query) = result else {
        panic!("query against the lazy test pool did not give up in time");
    };
    assert!(matches!(query, Err(DashboardError::Database(_))));
}
