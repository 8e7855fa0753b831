//! Backend interface and its HTTP implementation
//!
//! Every call returns the raw JSON; typing happens in `Tracker`. Queries
//! are pre-encoded strings built by the `filter` module.

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Method, Request};
use std::time::Duration;

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};

/// Operations the REST backend exposes
#[async_trait]
pub trait ExpenseBackend: Send + Sync {
    async fn list_despesas(&self, query: &str) -> CoreResult<serde_json::Value>;
    async fn get_despesa(&self, id: &str) -> CoreResult<serde_json::Value>;
    async fn create_despesa(&self, payload: serde_json::Value) -> CoreResult<serde_json::Value>;
    async fn update_despesa(&self, id: &str, payload: serde_json::Value) -> CoreResult<serde_json::Value>;
    async fn list_origens(&self, query: &str) -> CoreResult<serde_json::Value>;
    async fn create_origem(&self, payload: serde_json::Value) -> CoreResult<serde_json::Value>;
    async fn list_pagadores(&self, query: &str) -> CoreResult<serde_json::Value>;
    async fn create_pagador(&self, payload: serde_json::Value) -> CoreResult<serde_json::Value>;
    async fn custo_total(&self, query: &str) -> CoreResult<serde_json::Value>;
    /// Cheap request used to report reachability
    async fn health(&self) -> CoreResult<serde_json::Value>;
}

/// JSON-over-HTTP client for the expense backend
pub struct HttpBackend {
    client: Client<HttpConnector>,
    base_url: String,
    timeout: Duration,
    logger: DefaultErrorLogger,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            timeout,
            logger: DefaultErrorLogger,
        }
    }

    pub fn from_config(config: &gastos_config::Config) -> Self {
        Self::new(
            config.backend_base_url(),
            Duration::from_secs(config.backend.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &str,
        payload: Option<serde_json::Value>,
    ) -> CoreResult<serde_json::Value> {
        let url = self.url(path, query);
        let context = ErrorContext::new(format!("{} {}", method, path))
            .with_data("url", serde_json::json!(url));

        let result = self.send(method.clone(), &url, payload).await;
        match &result {
            Ok(_) => log::debug!("Backend {} {} ok", method, url),
            Err(e) => self.logger.log_error(e, &context),
        }
        result
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Option<serde_json::Value>,
    ) -> CoreResult<serde_json::Value> {
        let uri: hyper::Uri = url.parse().map_err(|e| CoreError::InvalidRequest {
            message: format!("{}: {}", url, e),
        })?;

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(hyper::header::ACCEPT, "application/json");

        let body = match payload {
            Some(value) => {
                builder = builder.header(hyper::header::CONTENT_TYPE, "application/json");
                let bytes = serde_json::to_vec(&value).map_err(|e| CoreError::InvalidRequest {
                    message: e.to_string(),
                })?;
                Body::from(bytes)
            }
            None => Body::empty(),
        };

        let request = builder.body(body).map_err(|e| CoreError::InvalidRequest {
            message: e.to_string(),
        })?;

        let timed_out = || CoreError::BackendUnavailable {
            message: format!("no response within {}s", self.timeout.as_secs()),
        };

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| CoreError::BackendUnavailable { message: e.to_string() })?;

        let status = response.status();
        let bytes = tokio::time::timeout(self.timeout, hyper::body::to_bytes(response.into_body()))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| CoreError::BackendUnavailable { message: e.to_string() })?;

        if !status.is_success() {
            return Err(CoreError::BackendStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(CoreError::decode)
    }
}

fn despesa_path(id: &str) -> String {
    format!("/despesas/{}", urlencoding::encode(id))
}

#[async_trait]
impl ExpenseBackend for HttpBackend {
    async fn list_despesas(&self, query: &str) -> CoreResult<serde_json::Value> {
        self.request(Method::GET, "/despesas", query, None).await
    }

    async fn get_despesa(&self, id: &str) -> CoreResult<serde_json::Value> {
        self.request(Method::GET, &despesa_path(id), "", None).await
    }

    async fn create_despesa(&self, payload: serde_json::Value) -> CoreResult<serde_json::Value> {
        self.request(Method::POST, "/despesas", "", Some(payload)).await
    }

    async fn update_despesa(&self, id: &str, payload: serde_json::Value) -> CoreResult<serde_json::Value> {
        self.request(Method::PUT, &despesa_path(id), "", Some(payload)).await
    }

    async fn list_origens(&self, query: &str) -> CoreResult<serde_json::Value> {
        self.request(Method::GET, "/origem", query, None).await
    }

    async fn create_origem(&self, payload: serde_json::Value) -> CoreResult<serde_json::Value> {
        self.request(Method::POST, "/origem", "", Some(payload)).await
    }

    async fn list_pagadores(&self, query: &str) -> CoreResult<serde_json::Value> {
        self.request(Method::GET, "/pagador", query, None).await
    }

    async fn create_pagador(&self, payload: serde_json::Value) -> CoreResult<serde_json::Value> {
        self.request(Method::POST, "/pagador", "", Some(payload)).await
    }

    async fn custo_total(&self, query: &str) -> CoreResult<serde_json::Value> {
        self.request(Method::GET, "/relatorios/custo-total", query, None).await
    }

    async fn health(&self) -> CoreResult<serde_json::Value> {
        self.request(Method::GET, "/despesas", "page=0&size=1", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Response, Server, StatusCode};
    use std::convert::Infallible;
    use std::net::SocketAddr;

    async fn handle(req: Request<Body>) -> Result<Response<Body>, Infallible> {
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or("").to_string();
        let method = req.method().clone();

        let response = match (method, path.as_str()) {
            (Method::GET, "/despesas") => Response::new(Body::from(format!(
                r#"{{"content": [], "totalPages": 0, "totalElements": 0, "echo": "{}"}}"#,
                query
            ))),
            (Method::GET, "/relatorios/custo-total") => Response::new(Body::from("1234.5")),
            (Method::POST, "/origem") => {
                let body = hyper::body::to_bytes(req.into_body()).await.unwrap_or_default();
                Response::new(Body::from(body))
            }
            (Method::PUT, "/despesas/d-1") => Response::new(Body::empty()),
            (Method::GET, "/pagador") => Response::new(Body::from("not json")),
            _ => {
                let mut response = Response::new(Body::from("missing"));
                *response.status_mut() = StatusCode::NOT_FOUND;
                response
            }
        };
        Ok(response)
    }

    fn spawn_backend() -> SocketAddr {
        let make_svc = make_service_fn(|_conn| async { Ok::<_, Infallible>(service_fn(handle)) });
        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
        let addr = server.local_addr();
        tokio::spawn(server);
        addr
    }

    fn backend(addr: SocketAddr) -> HttpBackend {
        HttpBackend::new(format!("http://{}/", addr), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_get_with_query() {
        let backend = backend(spawn_backend());
        assert!(!backend.base_url().ends_with('/'));

        let value = backend.list_despesas("status=PAGO&page=0&size=11").await.unwrap();
        assert_eq!(value["echo"], "status=PAGO&page=0&size=11");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let backend = backend(spawn_backend());
        let payload = serde_json::json!({"nome": "Petz", "tipoOrigem": "PET"});
        let value = backend.create_origem(payload.clone()).await.unwrap();
        assert_eq!(value, payload);
    }

    #[tokio::test]
    async fn test_bare_number_and_empty_body() {
        let backend = backend(spawn_backend());
        assert_eq!(backend.custo_total("").await.unwrap(), serde_json::json!(1234.5));
        assert_eq!(
            backend.update_despesa("d-1", serde_json::json!({})).await.unwrap(),
            serde_json::Value::Null
        );
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let backend = backend(spawn_backend());

        match backend.get_despesa("nao-existe").await {
            Err(CoreError::BackendStatus { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("expected status error, got {:?}", other),
        }

        assert!(matches!(
            backend.list_pagadores("").await,
            Err(CoreError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let backend = HttpBackend::new("http://127.0.0.1:1", Duration::from_secs(2));
        assert!(matches!(
            backend.health().await,
            Err(CoreError::BackendUnavailable { .. })
        ));
    }
}
