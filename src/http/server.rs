//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the routing middleware and forwarding handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Forward admitted requests to the upstream application

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, IdentityConfig};
use crate::http::middleware::tenant_routing_middleware;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::bad_gateway;
use crate::identity::{HttpIdentityProvider, IdentityProvider, StaticIdentityProvider};
use crate::observability::metrics;
use crate::routing::{RoutePolicy, RoutingEngine};

/// State of the forwarding handler.
#[derive(Clone)]
pub struct UpstreamState {
    pub client: Client<HttpConnector, Body>,
    pub address: Arc<str>,
}

/// HTTP server for the tenant gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server whose identity provider comes from the configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let identity = identity_from_config(&config.identity);
        Self::with_identity(config, identity)
    }

    /// Create a server with an explicit identity provider.
    pub fn with_identity(config: GatewayConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        let policy = Arc::new(RoutePolicy::from_config(&config.routes, &config.app));
        let engine = Arc::new(RoutingEngine::new(
            policy,
            identity,
            Duration::from_millis(config.identity.timeout_ms),
        ));

        let upstream = UpstreamState {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
            address: Arc::from(config.upstream.address.as_str()),
        };

        let router = Self::build_router(&config, engine, upstream);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, engine: Arc<RoutingEngine>, upstream: UpstreamState) -> Router {
        Router::new()
            .fallback(forward_handler)
            .with_state(upstream)
            .layer(middleware::from_fn_with_state(engine, tenant_routing_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Identity provider selected by configuration.
pub fn identity_from_config(config: &IdentityConfig) -> Arc<dyn IdentityProvider> {
    if config.enabled {
        Arc::new(HttpIdentityProvider::new(config))
    } else {
        tracing::warn!("Identity service disabled, every request is anonymous");
        Arc::new(StaticIdentityProvider::anonymous())
    }
}

/// Forwards the (possibly rewritten) request to the upstream application.
async fn forward_handler(State(upstream): State<UpstreamState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (mut parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri = match format!("http://{}{}", upstream.address, path_and_query).parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            metrics::record_upstream(502);
            return bad_gateway();
        }
    };
    parts.uri = uri;

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_upstream(status.as_u16());
            tracing::debug!(
                request_id = %request_id,
                status = %status,
                elapsed = ?start_time.elapsed(),
                "Upstream responded"
            );
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(502);
            bad_gateway()
        }
    }
}
