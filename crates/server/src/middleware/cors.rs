//! CORS for browser front ends served from another origin.
//!
//! Sessions ride on a cookie, so allowed origins must be listed explicitly;
//! a wildcard origin cannot be combined with credentials.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;

/// Build the CORS layer from `ADMIN_CORS_ORIGINS`.
///
/// With no configured origins the layer adds no CORS headers, so only
/// same-origin callers (and non-browser clients) can use the API.
#[must_use]
pub fn create_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                })
                .ok()
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_config;

    fn config_with_origins(origins: &[&str]) -> ServerConfig {
        let mut config = test_config("http://localhost:3001");
        config.cors_origins = origins.iter().map(ToString::to_string).collect();
        config
    }

    async fn preflight(config: &ServerConfig, origin: &str) -> axum::http::Response<Body> {
        let app = Router::new()
            .route("/users", get(|| async { "ok" }))
            .layer(create_cors_layer(config));

        app.oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/users")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_credentials() {
        let config = config_with_origins(&["http://localhost:3000"]);
        let response = preflight(&config, "http://localhost:3000").await;

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_unknown_origin_not_allowed() {
        let config = config_with_origins(&["http://localhost:3000"]);
        let response = preflight(&config, "http://evil.example").await;
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_no_origins_adds_no_headers() {
        let config = config_with_origins(&[]);
        let response = preflight(&config, "http://localhost:3000").await;
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
