use axum::{
    http::HeaderValue,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod routes;

/// Server state.
///
/// Only the database path is shared; every request opens its own store.
pub struct AppState {
    pub database_path: PathBuf,
}

/// Build the API router with CORS limited to `allowed_origins`
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/investors", get(routes::list_investors))
        .route("/investors/", get(routes::list_investors))
        .route("/investors/{investor_id}", get(routes::get_investor))
        .route("/investors/{investor_id}/commitments", get(routes::get_investor_commitments))
        .route("/commitments", get(routes::list_commitments))
        .route("/commitments/", get(routes::list_commitments))
        .route("/commitments/asset-classes", get(routes::list_asset_classes))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origin_values(allowed_origins)))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Configured origins as header values.
///
/// Credentialed CORS only works with explicit origins, so `*` is skipped
/// along with anything that is not a valid header value.
fn origin_values(allowed_origins: &[String]) -> Vec<HeaderValue> {
    allowed_origins
        .iter()
        .filter_map(|origin| {
            if origin.trim() == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; list explicit origins instead");
                return None;
            }
            match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                    None
                }
            }
        })
        .collect()
}

pub async fn start_server(port: u16, database_path: PathBuf, allowed_origins: &[String]) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        database_path: database_path.clone(),
    });

    let app = build_router(state, allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {} (database: {})", addr, database_path.display());
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_origin_is_skipped() {
        let origins = origin_values(&[
            "*".to_string(),
            " * ".to_string(),
            "http://localhost:5173".to_string(),
        ]);
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:5173")]);
    }

    #[test]
    fn test_invalid_origin_is_skipped() {
        let origins = origin_values(&["bad\norigin".to_string(), "http://localhost:3000".to_string()]);
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:3000")]);
    }

    #[test]
    fn test_router_builds_with_only_a_wildcard() {
        let state = Arc::new(AppState { database_path: PathBuf::from("unused.db") });
        let _router = build_router(state, &["*".to_string()]);
    }
}
