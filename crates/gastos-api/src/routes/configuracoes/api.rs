//! Health and cache endpoints

use crate::{is_htmx_request, toast, AppState, Toast};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

/// API: Liveness plus a live check of the backend
pub async fn api_health(state: axum::extract::State<AppState>) -> Json<serde_json::Value> {
    let backend = state.tracker.backend_status().await;
    Json(serde_json::json!({
        "status": "ok",
        "backend": backend,
    }))
}

/// API: Drop cached backend responses
pub async fn api_cache_clear(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Response {
    let cleared = state.tracker.clear_cache();

    if is_htmx_request(&headers) {
        Html(toast(
            Toast::Success,
            "Cache limpo",
            &format!("{} consultas descartadas", cleared),
        ))
        .into_response()
    } else {
        Json(serde_json::json!({ "cleared": cleared })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app, body_text, htmx_get, StubBackend};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cache_clear_json_and_htmx() {
        let backend = Arc::new(StubBackend::default());
        let router = app(backend.clone());

        router.clone().oneshot(htmx_get("/origens/lista")).await.unwrap();
        router.clone().oneshot(htmx_get("/origens/lista")).await.unwrap();
        assert_eq!(backend.calls().len(), 1);

        let response = router
            .clone()
            .oneshot(Request::builder().method("POST").uri("/api/cache/clear").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["cleared"], 1);

        router.clone().oneshot(htmx_get("/origens/lista")).await.unwrap();
        assert_eq!(backend.calls().len(), 2);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cache/clear")
                    .header("hx-request", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Cache limpo"));
    }

    #[tokio::test]
    async fn test_settings_page_reports_unreachable_backend() {
        let backend = Arc::new(StubBackend { down: true, ..Default::default() });
        let html = body_text(app(backend).oneshot(htmx_get("/configuracoes")).await.unwrap()).await;
        assert!(html.contains("Indisponível"));
        assert!(html.contains("connection refused"));
        assert!(html.contains("R$ 1.234,56"));
    }
}
