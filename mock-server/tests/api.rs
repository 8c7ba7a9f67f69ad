use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Import, Ticket, API_KEY};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app()
        .oneshot(empty_request("GET", "/companies/c1/imports"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app()
        .oneshot(empty_request("GET", "/companies/c1/imports?api_key=nope"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid api_key");
}

// --- imports ---

#[tokio::test]
async fn list_imports_empty() {
    let resp = app()
        .oneshot(empty_request("GET", &format!("/companies/c1/imports?api_key={API_KEY}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let imports: Vec<Import> = body_json(resp).await;
    assert!(imports.is_empty());
}

#[tokio::test]
async fn create_import_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            &format!("/imports?api_key={API_KEY}"),
            r#"{"title":"Spring fees","company_id":"c1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let import: Import = body_json(resp).await;
    assert_eq!(import.title.as_deref(), Some("Spring fees"));
    assert_eq!(import.company_id, "c1");
    assert!(!import.transmitted);
}

#[tokio::test]
async fn create_import_without_company_returns_422() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            &format!("/imports?api_key={API_KEY}"),
            r#"{"title":"Spring fees"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_import_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", &format!("/imports/missing?api_key={API_KEY}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn page_zero_is_rejected() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            &format!("/companies/c1/imports?api_key={API_KEY}&page=0"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- tickets ---

#[tokio::test]
async fn tickets_page_info_for_unknown_invoice_is_zero() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            &format!("/invoices/inv-1/tickets/page_info?api_key={API_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["total_pages"], 0);
}

#[tokio::test]
async fn ticket_lifecycle() {
    use tower::Service;

    let mut app = app_with(API_KEY, 1).into_service();

    for message in ["first", "second"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                &format!("/invoices/inv-1/ticket?api_key={API_KEY}"),
                &format!(r#"{{"message":"{message}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            &format!("/invoices/inv-1/tickets/page_info?api_key={API_KEY}"),
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["total_pages"], 2);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            &format!("/invoices/inv-1/tickets?api_key={API_KEY}&page=2"),
        ))
        .await
        .unwrap();
    let tickets: Vec<Value> = body_json(resp).await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["message"], "second");
    assert!(tickets[0].get("invoice_id").is_none());
    let _: Ticket = serde_json::from_value(tickets[0].clone()).unwrap();
}

// --- full import lifecycle ---

#[tokio::test]
async fn import_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/imports?api_key={API_KEY}"),
            r#"{"company_id":"c1","expected_invoices_count":4}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Import = body_json(resp).await;
    assert_eq!(created.title, None);
    assert_eq!(created.expected_invoices_count, Some(4));
    let id = created.import_id.clone();

    // page info and list for the company
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            &format!("/companies/c1/imports/page_info?api_key={API_KEY}"),
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["total_pages"], 1);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            &format!("/companies/c1/imports?api_key={API_KEY}&page=1"),
        ))
        .await
        .unwrap();
    let imports: Vec<Import> = body_json(resp).await;
    assert_eq!(imports, vec![created.clone()]);

    // another company sees nothing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            &format!("/companies/c2/imports?api_key={API_KEY}"),
        ))
        .await
        .unwrap();
    let imports: Vec<Import> = body_json(resp).await;
    assert!(imports.is_empty());

    // update with an empty body leaves the count alone
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &format!("/imports/{id}?api_key={API_KEY}"), "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Import = body_json(resp).await;
    assert_eq!(updated.expected_invoices_count, Some(4));

    // transmit, then transmit again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("PUT", &format!("/imports/{id}/transmit?api_key={API_KEY}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let transmitted: Import = body_json(resp).await;
    assert!(transmitted.transmitted);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("PUT", &format!("/imports/{id}/transmit?api_key={API_KEY}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/imports/{id}?api_key={API_KEY}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/imports/{id}?api_key={API_KEY}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
