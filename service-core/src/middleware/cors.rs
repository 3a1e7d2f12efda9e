use tower_http::cors::{Any, CorsLayer};

/// CORS policy that admits cross-origin calls from any origin, with any
/// method and request header.
///
/// Credentials stay disallowed; browsers reject them alongside a wildcard origin.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
