//! Execute-path tests for the filter engine against a mock service.

mod common;

use common::{client_config, client_for, API_KEY};
use serde_json::json;
use warrant_client::{ErrorCategory, WarrantClient};
use warrant_core::{
    FilterBuilder, FilterCondition, FilterRequest, PaginationRequest, QueryState, ResourceKind,
    SortCondition, UserInfo,
};
use warrant_test_utils::{filter_page, identifier_page, user_row};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_users(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/userinfos/filter"))
        .and(header("x-api-key", API_KEY))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn sent_request(server: &MockServer) -> FilterRequest {
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    serde_json::from_slice(&requests[0].body).expect("request body is a FilterRequest")
}

// =============================================================================
// Success paths
// =============================================================================

#[tokio::test]
async fn execute_returns_rows_and_echoed_page() {
    let server = MockServer::start().await;
    let rows = vec![user_row("alice@x.com"), user_row("bob@x.com")];
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(filter_page(rows, 25, 2, 10)),
    )
    .await;

    let client = client_for(&server);
    let mut state = QueryState::new().with_page_size(10);
    state.set_page(2);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &state.to_request())
        .await;

    assert!(result.success, "unexpected failure: {:?}", result.message);
    assert_eq!(result.total, 25);
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.data[0].upn, "alice@x.com");
    let page = result.page.expect("page info");
    assert_eq!((page.page, page.page_size, page.total_pages), (2, 10, 3));

    let sent = sent_request(&server).await;
    assert!(sent.verbose);
    assert_eq!(sent.pagination, PaginationRequest::new(2, 10));
}

#[tokio::test]
async fn keyword_and_sort_are_sent_as_built() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(filter_page(vec![], 0, 1, 20)),
    )
    .await;

    let filter = FilterBuilder::new()
        .keyword("ops", &ResourceKind::Users.keyword_fields())
        .condition(FilterCondition::is_not_null("email"))
        .build();
    let mut state = QueryState::new();
    state.set_filter(filter.clone());
    state.set_sort(vec![SortCondition::asc("upn")]);

    let client = client_for(&server);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &state.to_request())
        .await;
    assert!(result.success);
    assert!(result.is_empty());

    let sent = sent_request(&server).await;
    assert_eq!(sent.filter, filter);
    assert_eq!(sent.sort, vec![SortCondition::asc("upn")]);
}

#[tokio::test]
async fn execute_identifiers_reads_identifier_list() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(identifier_page(
            vec!["alice@x.com", "bob@x.com", "carol@x.com"],
            3,
            1,
            20,
        )),
    )
    .await;

    let client = client_for(&server);
    let result = client
        .filters()
        .execute_identifiers(&ResourceKind::Users, &FilterRequest::default())
        .await;

    assert!(result.success);
    assert_eq!(result.data, vec!["alice@x.com", "bob@x.com", "carol@x.com"]);
    assert!(!sent_request(&server).await.verbose);
}

#[tokio::test]
async fn out_of_range_paging_is_clamped_before_sending() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(filter_page(vec![], 0, 1, 500)),
    )
    .await;

    let mut request = FilterRequest::default();
    request.pagination.page = 0;
    request.pagination.page_size = 1000;

    let client = client_for(&server);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &request)
        .await;
    assert!(result.success);

    let sent = sent_request(&server).await;
    assert_eq!(sent.pagination.page, 1);
    // Capped at the configured max_page_size.
    assert_eq!(sent.pagination.page_size, 500);
}

#[tokio::test]
async fn enveloped_success_is_unwrapped() {
    let server = MockServer::start().await;
    let page = filter_page(vec![user_row("alice@x.com")], 1, 1, 20);
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"code": 0, "message": "ok", "data": page})),
    )
    .await;

    let client = client_for(&server);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await;
    assert!(result.success);
    assert_eq!(result.total, 1);
}

// =============================================================================
// Failures fold into an empty result
// =============================================================================

#[tokio::test]
async fn missing_items_array_is_empty_failure() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "total": 5,
            "page": 1,
            "pageSize": 20,
            "totalPages": 1,
            "isAll": false
        })),
    )
    .await;

    let client = client_for(&server);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await;

    assert!(!result.success);
    assert_eq!(result.total, 0);
    assert!(result.data.is_empty());
}

#[tokio::test]
async fn server_error_is_empty_failure() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let client = client_for(&server);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await;
    assert!(!result.success);
    assert_eq!(result.total, 0);
    assert!(result.data.is_empty());

    let err = client
        .filters()
        .search::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn envelope_rejection_message_is_surfaced() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "code": 40003,
            "message": "unknown field: nickname",
            "data": null
        })),
    )
    .await;

    let client = client_for(&server);
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await;
    assert!(!result.success);
    assert_eq!(result.message.as_deref(), Some("unknown field: nickname"));
}

#[tokio::test]
async fn non_json_body_is_empty_failure() {
    let server = MockServer::start().await;
    mount_users(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>login</html>"),
    )
    .await;

    let client = client_for(&server);
    let err = client
        .filters()
        .search::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Shape);

    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::Users, &FilterRequest::default())
        .await;
    assert!(!result.success);
}

#[tokio::test]
async fn unreachable_service_is_empty_failure() {
    let client = WarrantClient::new(&client_config("http://127.0.0.1:1")).unwrap();
    let result = client
        .filters()
        .execute::<UserInfo>(&ResourceKind::I18n, &FilterRequest::default())
        .await;
    assert!(!result.success);
    assert!(result.data.is_empty());
}
