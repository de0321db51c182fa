// tests/metrics.rs
#![cfg(feature = "strict-metrics")]

mod common;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt as _;

use common::{chain, Outcome};
use product_lookup::config::{Credentials, LookupConfig};
use product_lookup::metrics::Metrics;
use product_lookup::ProductResolver;

#[tokio::test]
async fn lookup_series_exposed_after_lookups() {
    let cfg = LookupConfig {
        timeout_secs: 5,
        credentials: Credentials {
            upc_database_key: Some("k".into()),
            ..Credentials::default()
        },
        ..LookupConfig::default()
    };
    let metrics = Metrics::init(&cfg).expect("recorder");

    let (_, providers) = chain([
        Outcome::Fail,
        Outcome::Miss,
        Outcome::Found("Granola"),
        Outcome::Miss,
        Outcome::Miss,
    ]);
    let resolver = ProductResolver::new(providers);
    let _ = resolver.lookup_product("012345678905").await;
    let _ = resolver.lookup_product("not a code").await;

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let out = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(out.contains("lookup_requests_total"));
    assert!(out.contains("lookup_validation_errors_total"));
    assert!(out.contains("lookup_provider_errors_total"));
    assert!(out.contains("lookup_provider_misses_total"));
    assert!(out.contains("lookup_resolved_total"));
    assert!(out.contains("lookup_provider_ms"));
    assert!(out.contains("lookup_provider_timeout_secs 5"));
    assert!(out.contains("lookup_providers_ordered 5"));
    assert!(out.contains("lookup_providers_credentialed 1"));
}
