//! Request-level routing scenarios, driven through the middleware.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use tenant_gateway::config::{AppConfig, RoutesConfig};
use tenant_gateway::identity::{ProfileLookup, StaticIdentityProvider};
use tenant_gateway::routing::{Role, RoutePolicy};

use common::{echo_app, SlowIdentityProvider};

fn get(host: &str, target: &str) -> Request<Body> {
    Request::builder()
        .uri(target)
        .header(header::HOST, host)
        .header(header::COOKIE, "sb-access-token=test")
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> Response {
    app.oneshot(req).await.unwrap()
}

async fn body_text(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(res: &Response) -> &str {
    res.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_anonymous_creator_root_redirects_to_sign_in() {
    let identity = Arc::new(StaticIdentityProvider::anonymous());
    let app = echo_app(identity, RoutePolicy::default());

    let res = send(app, get("creator.example.com", "/")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/sign-in?redirect=%2Fcreator%2Fdashboard");
}

#[tokio::test]
async fn test_sign_in_redirect_on_tenant_host_does_not_loop() {
    let identity = Arc::new(StaticIdentityProvider::anonymous());

    let first = send(
        echo_app(identity.clone(), RoutePolicy::default()),
        get("creator.example.com", "/"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::TEMPORARY_REDIRECT);
    let next = location(&first).to_string();

    let second = send(
        echo_app(identity, RoutePolicy::default()),
        get("creator.example.com", &next),
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        body_text(second).await,
        "/creator/sign-in?redirect=%2Fcreator%2Fdashboard tenant=creator role=- \
         original=/sign-in?redirect=%2Fcreator%2Fdashboard user=-"
    );
}

#[tokio::test]
async fn test_admin_on_tenant_sign_in_goes_to_admin_dashboard() {
    let identity = Arc::new(StaticIdentityProvider::signed_in("root", Role::Admin));
    let app = echo_app(identity, RoutePolicy::default());

    let res = send(app, get("creator.example.com", "/sign-in")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/admin/dashboard");
}

#[tokio::test]
async fn test_anonymous_cannot_reach_protected_pages() {
    for (host, target) in [
        ("creator.example.com", "/creator/dashboard"),
        ("admin.example.com", "/admin/users"),
        ("example.com", "/settings"),
    ] {
        let identity = Arc::new(StaticIdentityProvider::anonymous());
        let res = send(echo_app(identity, RoutePolicy::default()), get(host, target)).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{host}{target}");
        assert!(location(&res).starts_with("/sign-in?redirect="), "{host}{target}");
    }
}

#[tokio::test]
async fn test_business_user_reaches_business_dashboard() {
    let identity = Arc::new(StaticIdentityProvider::signed_in("u1", Role::Business));
    let app = echo_app(identity.clone(), RoutePolicy::default());

    let res = send(app, get("business.example.com", "/business/dashboard")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_text(res).await,
        "/business/dashboard tenant=business role=business original=- user=u1"
    );
    assert_eq!(identity.session_calls(), 1);
    assert_eq!(identity.profile_calls(), 1);
}

#[tokio::test]
async fn test_creator_on_business_host_is_sent_home() {
    let identity = Arc::new(StaticIdentityProvider::signed_in("u1", Role::Creator));
    let app = echo_app(identity, RoutePolicy::default());

    let res = send(app, get("business.example.com", "/business/dashboard")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/creator/dashboard");
}

#[tokio::test]
async fn test_admin_passes_on_admin_host() {
    let identity = Arc::new(StaticIdentityProvider::signed_in("root", Role::Admin));
    let app = echo_app(identity, RoutePolicy::default());

    let res = send(app, get("admin.example.com", "/admin/users")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_text(res).await,
        "/admin/users tenant=admin role=admin original=- user=root"
    );
}

#[tokio::test]
async fn test_static_asset_never_consults_identity() {
    let identity = Arc::new(StaticIdentityProvider::anonymous());
    let app = echo_app(identity.clone(), RoutePolicy::default());

    let res = send(app, get("creator.example.com", "/_next/static/chunk.js")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.starts_with("/_next/static/chunk.js tenant=creator"));
    assert_eq!(identity.total_calls(), 0);
}

#[tokio::test]
async fn test_profile_failure_fails_closed() {
    let identity = Arc::new(StaticIdentityProvider::with_profile(
        "u1",
        ProfileLookup::TransportError("connection refused".to_string()),
    ));
    let app = echo_app(identity.clone(), RoutePolicy::default());

    let res = send(app, get("creator.example.com", "/creator/dashboard")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/sign-in");
    assert_eq!(identity.profile_calls(), 1);
}

#[tokio::test]
async fn test_rewrite_keeps_query_and_records_original() {
    let identity = Arc::new(StaticIdentityProvider::signed_in("u1", Role::Creator));
    let app = echo_app(identity, RoutePolicy::default());

    let res = send(app, get("creator.example.com", "/campaigns?status=active")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_text(res).await,
        "/creator/campaigns?status=active tenant=creator role=creator \
         original=/campaigns?status=active user=u1"
    );
}

#[tokio::test]
async fn test_client_cannot_spoof_gateway_headers() {
    let identity = Arc::new(StaticIdentityProvider::anonymous());
    let app = echo_app(identity, RoutePolicy::default());

    let mut req = get("example.com", "/pricing");
    req.headers_mut().insert("x-gateway-role", "admin".parse().unwrap());
    req.headers_mut().insert("x-gateway-tenant", "admin".parse().unwrap());

    let res = send(app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, "/pricing tenant=main role=- original=- user=-");
}

#[tokio::test]
async fn test_signed_in_user_skips_sign_in_page() {
    let identity = Arc::new(StaticIdentityProvider::signed_in("u1", Role::Business));
    let app = echo_app(identity, RoutePolicy::default());

    let res = send(app, get("example.com", "/sign-in")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/business/dashboard");
}

#[tokio::test]
async fn test_slow_identity_service_fails_closed() {
    let app = echo_app(
        Arc::new(SlowIdentityProvider(Duration::from_secs(5))),
        RoutePolicy::default(),
    );

    let res = send(app, get("creator.example.com", "/creator/dashboard")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/sign-in");
}

#[tokio::test]
async fn test_configured_origins_make_redirects_absolute() {
    let mut app_config = AppConfig::default();
    app_config.base_url = Some("https://example.com".to_string());
    app_config.tenant_base_urls.creator = Some("https://creator.example.com".to_string());
    let policy = RoutePolicy::from_config(&RoutesConfig::default(), &app_config);

    let anonymous = echo_app(Arc::new(StaticIdentityProvider::anonymous()), policy.clone());
    let res = send(anonymous, get("creator.example.com", "/")).await;
    assert_eq!(
        location(&res),
        "https://example.com/sign-in?redirect=%2Fcreator%2Fdashboard"
    );

    let creator = echo_app(
        Arc::new(StaticIdentityProvider::signed_in("u1", Role::Creator)),
        policy,
    );
    let res = send(creator, get("business.example.com", "/business/dashboard")).await;
    assert_eq!(location(&res), "https://creator.example.com/creator/dashboard");
}
