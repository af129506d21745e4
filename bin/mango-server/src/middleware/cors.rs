use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        // Wildcard, suitable for development; set MANGO_CORS_ORIGINS in production.
        // Browsers never send the admin cookie cross-origin under this policy.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any);
    }

    // Credentialed CORS forbids wildcards, so mirror the request instead.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_credentials(true)
}
