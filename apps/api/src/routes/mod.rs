pub mod health;
pub mod json;
pub mod ollama;
pub mod providers;
pub mod resumes;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/providers", get(providers::handle_list_providers))
        // Resume API
        .route("/api/v1/resumes", post(resumes::handle_upload))
        .route("/api/v1/resumes/extract", post(resumes::handle_extract))
        .route("/api/v1/resumes/parse", post(resumes::handle_parse))
        .route("/api/v1/resumes/chunks", post(resumes::handle_chunks))
        .route("/api/v1/resumes/ask", post(resumes::handle_ask))
        .route("/api/v1/resumes/insights", post(resumes::handle_insights))
        .route("/api/v1/resumes/export", post(resumes::handle_export))
        // Local model server
        .route("/api/v1/ollama/models", get(ollama::handle_list_models))
        .route("/api/v1/ollama/models/pull", post(ollama::handle_pull_model))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Json;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmClient;
    use crate::providers::test_support::{dead_base_url, spawn_server};

    const RESUME: &str = "Jane Doe\njane@x.com\n555-123-4567\nEDUCATION\nMIT, BS 2016\nSKILLS\nPython, SQL";
    const BOUNDARY: &str = "resume-test-boundary";

    async fn app_with_ollama(ollama_base_url: String) -> Router {
        let config = Config {
            ollama_base_url,
            ..Config::default()
        };
        build_router(AppState::new(config, LlmClient::new().unwrap()))
    }

    async fn app() -> Router {
        app_with_ollama(dead_base_url().await).await
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_multipart(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\r\n"),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_body() {
        let response = app()
            .await
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_parse_offline_mode() {
        let response = app()
            .await
            .oneshot(post_json(
                "/api/v1/resumes/parse",
                json!({"text": RESUME, "mode": "offline"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["mode"], "offline");
        assert_eq!(body["result"]["status"], "parsed");
        assert_eq!(body["result"]["name"], "Jane Doe");
        assert_eq!(body["result"]["provenance"]["provider"], "offline");
        assert!(body["result"]["provenance"]["fallback_reason"].is_null());
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_parse_cloud_without_keys_falls_back() {
        let response = app()
            .await
            .oneshot(post_json("/api/v1/resumes/parse", json!({"text": RESUME})))
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(body["mode"], "cloud");
        assert_eq!(body["result"]["provenance"]["provider"], "offline");
        assert_eq!(
            body["result"]["provenance"]["fallback_reason"],
            "all_ai_providers_failed"
        );
        let attempts = body["attempts"].as_array().unwrap();
        let providers: Vec<_> = attempts.iter().map(|a| a["provider"].as_str().unwrap()).collect();
        assert_eq!(providers, vec!["openai", "google_gemini", "huggingface", "offline"]);
        assert_eq!(attempts[0]["outcome"], "skipped");
    }

    #[tokio::test]
    async fn test_parse_rejects_blank_text() {
        let response = app()
            .await
            .oneshot(post_json("/api/v1/resumes/parse", json!({"text": "  \n"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_rejects_unknown_mode_with_error_body() {
        let response = app()
            .await
            .oneshot(post_json("/api/v1/resumes/parse", json!({"text": "x", "mode": "hybrid"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("hybrid"));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_body() {
        let request = Request::post("/api/v1/resumes/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"text\":"))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chunks_rejects_unknown_strategy_with_error_body() {
        let response = app()
            .await
            .oneshot(post_json(
                "/api/v1/resumes/chunks",
                json!({"text": RESUME, "strategy": "paragraphs"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_pull_without_json_content_type_uses_error_body() {
        let request = Request::post("/api/v1/ollama/models/pull")
            .body(Body::from("{\"name\":\"llama3.2:3b\"}"))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chunks_by_section_with_stats() {
        let text = format!(
            "EDUCATION\n{}\nEXPERIENCE\n{}",
            "Massachusetts Institute of Technology, BS Computer Science, 2016, graduated with honors. ".repeat(2),
            "Acme Corp, Senior Engineer, 2018 - present, building Python services for payments. ".repeat(2),
        );
        let response = app()
            .await
            .oneshot(post_json("/api/v1/resumes/chunks", json!({"text": text})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let sections: Vec<_> = body["chunks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["section"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(sections, vec!["education", "experience"]);
        assert_eq!(body["stats"]["total_chunks"], 2);
        assert_eq!(body["stats"]["chunks_with_pages"], 0);
    }

    #[tokio::test]
    async fn test_export_is_an_attachment() {
        let record = json!({
            "status": "parsed",
            "name": "Jane Doe",
            "email": null,
            "phone": null,
            "provenance": {
                "provider": "offline",
                "model": null,
                "parsing_method": "offline_basic",
                "fallback_reason": null,
                "analysis": null,
                "parsed_at": "2024-05-01T12:00:00Z"
            }
        });
        let response = app()
            .await
            .oneshot(post_json("/api/v1/resumes/export", record))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"parsed_resume_jane_doe.json\""
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("\n  \"name\": \"Jane Doe\""));
    }

    #[tokio::test]
    async fn test_export_rejects_failures() {
        let failure = json!({"status": "failed", "provider": "openai", "kind": "status", "message": "429"});
        let response = app()
            .await
            .oneshot(post_json("/api/v1/resumes/export", failure))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_without_local_server_is_unavailable() {
        let response = app()
            .await
            .oneshot(post_json(
                "/api/v1/resumes/ask",
                json!({"question": "Which skills?", "text": RESUME}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "PROVIDER_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_list_models_reports_recommended() {
        let ollama = Router::new().route(
            "/api/tags",
            get(|| async { Json(json!({"models": [{"name": "codellama:7b"}, {"name": "mistral:7b"}]})) }),
        );
        let base = spawn_server(ollama).await;

        let response = app_with_ollama(base)
            .await
            .oneshot(Request::get("/api/v1/ollama/models").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["installed"], json!(["codellama:7b", "mistral:7b"]));
        assert_eq!(body["recommended"], json!(["mistral:7b"]));
    }

    #[tokio::test]
    async fn test_providers_status_and_chain() {
        let response = app()
            .await
            .oneshot(Request::get("/api/v1/providers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(
            body["chain"],
            json!(["openai", "google_gemini", "huggingface", "offline"])
        );
        let available: Vec<_> = body["providers"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["available"] == true)
            .map(|p| p["provider"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(available, vec!["offline"]);
    }

    #[tokio::test]
    async fn test_extract_requires_file_field() {
        let request = post_multipart("/api/v1/resumes/extract", &[("mode", None, "offline")]);
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_unreadable_pdf() {
        let request = post_multipart(
            "/api/v1/resumes",
            &[
                ("file", Some("resume.pdf"), "this is not a pdf"),
                ("mode", None, "offline"),
            ],
        );
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_mode() {
        let request = post_multipart(
            "/api/v1/resumes",
            &[("mode", None, "hybrid"), ("file", Some("resume.pdf"), "%PDF-1.4")],
        );
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"].as_str().unwrap().contains("hybrid"));
    }
}
