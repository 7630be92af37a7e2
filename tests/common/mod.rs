//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderName, Request},
    middleware,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use tenant_gateway::http::middleware::tenant_routing_middleware;
use tenant_gateway::http::request::{X_GATEWAY_ORIGINAL_PATH, X_GATEWAY_ROLE, X_GATEWAY_TENANT};
use tenant_gateway::identity::{
    IdentityError, IdentityProvider, Principal, ProfileLookup, SessionCredentials, SessionUser,
};
use tenant_gateway::routing::{RoutePolicy, RoutingEngine};

/// Identity provider that never answers in time.
#[allow(dead_code)]
pub struct SlowIdentityProvider(pub Duration);

#[async_trait]
impl IdentityProvider for SlowIdentityProvider {
    async fn current_user(
        &self,
        _credentials: &SessionCredentials,
    ) -> Result<Option<SessionUser>, IdentityError> {
        tokio::time::sleep(self.0).await;
        Ok(Some(SessionUser::new("slow")))
    }

    async fn profile_role(&self, _user_id: &str) -> ProfileLookup {
        tokio::time::sleep(self.0).await;
        ProfileLookup::NotFound
    }
}

/// Handler standing in for the application: echoes what it was asked for.
#[allow(dead_code)]
async fn echo(req: Request<Body>) -> String {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };
    let user = req
        .extensions()
        .get::<Principal>()
        .map(|p| p.user_id.clone())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} tenant={} role={} original={} user={}",
        req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/"),
        header(X_GATEWAY_TENANT),
        header(X_GATEWAY_ROLE),
        header(X_GATEWAY_ORIGINAL_PATH),
        user,
    )
}

/// Routing middleware in front of the echo handler.
#[allow(dead_code)]
pub fn echo_app(identity: Arc<dyn IdentityProvider>, policy: RoutePolicy) -> Router {
    let engine = Arc::new(RoutingEngine::new(
        Arc::new(policy),
        identity,
        Duration::from_millis(200),
    ));
    Router::new()
        .fallback(echo)
        .layer(middleware::from_fn_with_state(engine, tenant_routing_middleware))
}

/// Start a mock upstream that answers with its request target and the
/// gateway's tenant header. Returns the bound address.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let mut read = 0;
                        loop {
                            match socket.read(&mut buf[read..]).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    read += n;
                                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n")
                                        || read == buf.len()
                                    {
                                        break;
                                    }
                                }
                            }
                        }
                        let head = String::from_utf8_lossy(&buf[..read]).to_string();
                        let target = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("?")
                            .to_string();
                        let tenant = head
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                name.eq_ignore_ascii_case("x-gateway-tenant")
                                    .then(|| value.trim().to_string())
                            })
                            .unwrap_or_else(|| "-".to_string());
                        let body = format!("{target} {tenant}");
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
