//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{
    dashboard::dashboard_page,
    domains::{add_domain_form, api_add_domain, api_list_domains, api_remove_domain, remove_domain_form},
    files::{api_list_files, api_set_metadata, api_submit_files, metadata_form, upload_form},
    query::{api_query, query_form},
    results::{api_results, export_download},
    system::health,
};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.settings.static_dir.clone();
    let body_limit = state.settings.max_upload_bytes;
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Page and form actions
        .route("/",                       get(dashboard_page))
        .route("/domains",                post(add_domain_form))
        .route("/domains/{id}/remove",    post(remove_domain_form))
        .route("/domains/{id}/upload",    post(upload_form))
        .route("/files/{id}/metadata",    post(metadata_form))
        .route("/query",                  post(query_form))
        .route("/export",                 get(export_download))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/domains",            get(api_list_domains).post(api_add_domain))
        .route("/api/domains/{id}",       delete(api_remove_domain))
        .route("/api/domains/{id}/files", get(api_list_files).post(api_submit_files))
        .route("/api/files/{id}/metadata", put(api_set_metadata))
        .route("/api/query",              post(api_query))
        .route("/api/results",            get(api_results))
        .route("/api/health",             get(health))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crup_ingestion::registry::DomainSeed;
    use crup_ingestion::{IntakeConfig, IntakeSession};
    use crup_query::{QueryDispatcher, QuerySettings};

    use crate::state::WebSettings;

    fn app() -> Router {
        let session = IntakeSession::new(&DomainSeed::defaults(), IntakeConfig::default());
        let dispatcher = QueryDispatcher::new(QuerySettings { latency_ms: 0 });
        build_router(AppState::new(session, dispatcher, WebSettings::default()))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_add_domain_then_duplicate_conflicts() {
        let app = app();
        let res = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/domains", json!({ "name": "Chemistry" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(body_json(res).await, json!({ "id": "chemistry", "name": "Chemistry" }));

        let res = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/domains", json!({ "name": "chemistry" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert!(body_json(res).await["error"].is_string());

        let res = app.oneshot(get_request("/api/domains")).await.unwrap();
        assert_eq!(body_json(res).await.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_blank_domain_name_rejected() {
        let res = app()
            .oneshot(json_request(Method::POST, "/api/domains", json!({ "name": "   " })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_unknown_domain_is_not_found() {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/api/domains/astronomy")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_descriptors_are_queued() {
        let app = app();
        let body = json!({ "files": [
            { "name": "a.pdf", "size": 1024, "mimeType": "application/pdf" },
            { "name": "notes.txt", "size": 10 }
        ]});
        let res = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/domains/physics/files", body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let tracked = body_json(res).await;
        assert_eq!(tracked[0]["status"], "queued");
        assert_eq!(tracked[1]["mimeType"], "application/octet-stream");

        let res = app.oneshot(get_request("/api/domains/physics/files")).await.unwrap();
        assert_eq!(body_json(res).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_415() {
        let body = json!({ "files": [{ "name": "figure.png", "size": 5, "mimeType": "image/png" }] });
        let res = app()
            .oneshot(json_request(Method::POST, "/api/domains/physics/files", body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_multipart_upload_redirects_and_tracks() {
        let app = app();
        let boundary = "crupboundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"paper.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n%PDF-1.4 body\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/domains/biology/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = app.oneshot(get_request("/api/domains/biology/files")).await.unwrap();
        let files = body_json(res).await;
        assert_eq!(files[0]["name"], "paper.pdf");
        assert_eq!(files[0]["size"], 13);
    }

    #[tokio::test]
    async fn test_set_metadata_field() {
        let app = app();
        let body = json!({ "files": [{ "name": "a.pdf", "size": 1 }] });
        let res = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/domains/physics/files", body))
            .await
            .unwrap();
        let id = body_json(res).await[0]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/files/{id}/metadata");
        let res = app
            .clone()
            .oneshot(json_request(Method::PUT, &uri, json!({ "key": "year", "value": "2021" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["metadata"]["year"], "2021");

        let res = app
            .oneshot(json_request(Method::PUT, &uri, json!({ "key": "publisher", "value": "x" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_physics_and_export() {
        let app = app();
        let config = json!({ "text": "Novel energy storage solutions", "selectedDomainIds": ["physics"], "depth": 50 });
        let res = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/query", config))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let outcome = body_json(res).await;
        let results = outcome["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0]["id"].as_str().unwrap().starts_with("h2-"));

        let res = app.oneshot(get_request("/export")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"crup_results.json\""
        );
        let doc = body_json(res).await;
        assert_eq!(doc["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_depth_out_of_range() {
        let config = json!({ "selectedDomainIds": ["physics"], "depth": 0 });
        let res = app().oneshot(json_request(Method::POST, "/api/query", config)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_format_is_json_400() {
        let config = json!({ "selectedDomainIds": ["physics"], "format": "tabular" });
        let res = app().oneshot(json_request(Method::POST, "/api/query", config)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(res).await;
        assert!(body["error"].as_str().unwrap().contains("tabular"));
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_json_400() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/domains")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_rejected_query_keeps_previous_form() {
        let app = app();
        let config = json!({ "text": "zero depth question", "selectedDomainIds": ["physics"], "depth": 0 });
        let res = app.clone().oneshot(json_request(Method::POST, "/api/query", config)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let html = body_text(app.oneshot(get_request("/")).await.unwrap()).await;
        assert!(!html.contains("zero depth question"));
        assert!(html.contains(r#"value="50""#));
    }

    #[tokio::test]
    async fn test_domain_with_slash_can_be_removed_from_page() {
        let app = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/domains")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=AI%2FML"))
            .unwrap();
        app.clone().oneshot(req).await.unwrap();

        let html = body_text(app.clone().oneshot(get_request("/")).await.unwrap()).await;
        assert!(html.contains(r#"action="/domains/ai%2Fml/remove""#));
        assert!(html.contains(r#"action="/domains/ai%2Fml/upload""#));

        let req = Request::builder()
            .method(Method::POST)
            .uri("/domains/ai%2Fml/remove")
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = app.oneshot(get_request("/api/domains")).await.unwrap();
        let ids: Vec<Value> = body_json(res).await.as_array().unwrap().iter().map(|d| d["id"].clone()).collect();
        assert!(!ids.contains(&json!("ai/ml")));
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_multipart_sizes_every_part_and_skips_empty_input() {
        let app = app();
        let boundary = "crupboundary";
        let big = "x".repeat(100_000);
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"big.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n{big}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"small.doc\"\r\n\r\nabc\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/domains/engineering/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = app.oneshot(get_request("/api/domains/engineering/files")).await.unwrap();
        let files = body_json(res).await;
        let sizes: Vec<(Value, Value)> = files
            .as_array()
            .unwrap()
            .iter()
            .map(|f| (f["name"].clone(), f["size"].clone()))
            .collect();
        assert_eq!(sizes, vec![(json!("big.txt"), json!(100_000)), (json!("small.doc"), json!(3))]);
    }

    #[tokio::test]
    async fn test_empty_export() {
        let res = app().oneshot(get_request("/export")).await.unwrap();
        assert_eq!(body_text(res).await, "{\n  \"results\": []\n}");
    }

    #[tokio::test]
    async fn test_dashboard_renders_seeded_domains_and_empty_state() {
        let res = app().oneshot(get_request("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Cognitive Research Unification Platform"));
        assert!(html.contains("Materials Science"));
        assert!(html.contains("No hypotheses yet"));
        assert!(html.contains("Novel energy storage solutions"));
    }

    #[tokio::test]
    async fn test_form_error_becomes_notice() {
        let app = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/domains")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=Physics"))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let html = body_text(app.oneshot(get_request("/")).await.unwrap()).await;
        assert!(html.contains("alert-error"));
    }

    #[tokio::test]
    async fn test_health() {
        let res = app().oneshot(get_request("/api/health")).await.unwrap();
        let health = body_json(res).await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["domains"], json!(["physics", "biology", "engineering", "materials"]));
        assert_eq!(health["files"], 0);
    }
}
