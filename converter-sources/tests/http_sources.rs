//! Integration tests for the HTTP adapters against a local provider stub.
//!
//! Each test starts an axum server on an ephemeral port that imitates one
//! provider's endpoint and response shape.

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header::ACCEPT},
    routing::get,
};
use converter_sources::{
    ExchangeRateApi, ExchangeRateHost, Frankfurter, HttpSource, OpenErApi, SourceKind,
    SourcesConfig, build_sources,
};
use converter_types::{CurrencyCode, FetchError, RateSource};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Serves `app` on 127.0.0.1 and returns its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn open_er_latest(Path(base): Path<String>, headers: HeaderMap) -> Json<Value> {
    assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    Json(json!({
        "result": "success",
        "base_code": base,
        "rates": { "USD": 1, "EUR": 0.91, "JPY": 151.2, "XAU": 0.0004 }
    }))
}

#[tokio::test]
async fn test_open_er_api_round_trip() {
    let url = serve(Router::new().route("/v6/latest/{base}", get(open_er_latest))).await;
    let source = OpenErApi::new(HttpSource::new(url));

    let map = source.fetch(CurrencyCode::USD).await.unwrap();

    assert_eq!(map.base(), CurrencyCode::USD);
    assert_eq!(map.get(CurrencyCode::USD), Some(1.0));
    assert_eq!(map.get(CurrencyCode::EUR), Some(0.91));
    assert_eq!(map.get(CurrencyCode::JPY), Some(151.2));
    assert_eq!(map.len(), 3);
}

#[tokio::test]
async fn test_exchangerate_api_puts_key_in_path() {
    let app = Router::new().route(
        "/v6/{key}/latest/{base}",
        get(|Path((key, base)): Path<(String, String)>| async move {
            if key != "secret" {
                return Json(json!({ "result": "error", "error-type": "invalid-key" }));
            }
            Json(json!({
                "result": "success",
                "base_code": base,
                "conversion_rates": { "USD": 1, "GBP": 0.78 }
            }))
        }),
    );
    let url = serve(app).await;

    let good = ExchangeRateApi::new(HttpSource::new(url.clone()), "secret");
    let map = good.fetch(CurrencyCode::USD).await.unwrap();
    assert_eq!(map.get(CurrencyCode::GBP), Some(0.78));

    let bad = ExchangeRateApi::new(HttpSource::new(url), "wrong");
    let err = bad.fetch(CurrencyCode::USD).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Parse("provider reported error: invalid-key".into())
    );
}

#[tokio::test]
async fn test_exchangerate_host_sends_query() {
    let app = Router::new().route(
        "/live",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("access_key").map(String::as_str), Some("k"));
            let source = params.get("source").cloned().unwrap_or_default();
            Json(json!({
                "success": true,
                "source": source,
                "quotes": { "USDEUR": 0.85, "USDHUF": 360.0 }
            }))
        }),
    );
    let url = serve(app).await;
    let source = ExchangeRateHost::new(HttpSource::new(url), "k");

    let map = source.fetch(CurrencyCode::USD).await.unwrap();

    assert_eq!(map.get(CurrencyCode::EUR), Some(0.85));
    assert_eq!(map.get(CurrencyCode::HUF), Some(360.0));
}

#[tokio::test]
async fn test_frankfurter_injects_base() {
    let app = Router::new().route(
        "/latest",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!({
                "amount": 1.0,
                "base": params.get("from").cloned().unwrap_or_default(),
                "date": "2024-05-17",
                "rates": { "EUR": 0.92 }
            }))
        }),
    );
    let url = serve(app).await;
    let source = Frankfurter::new(HttpSource::new(url));

    let map = source.fetch(CurrencyCode::USD).await.unwrap();

    assert_eq!(map.get(CurrencyCode::USD), Some(1.0));
    assert_eq!(map.get(CurrencyCode::EUR), Some(0.92));
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let app = Router::new().route(
        "/latest",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
    );
    let url = serve(app).await;
    let source = Frankfurter::new(HttpSource::new(url));

    let err = source.fetch(CurrencyCode::USD).await.unwrap_err();

    assert_eq!(err, FetchError::Http(503));
}

#[tokio::test]
async fn test_garbage_body_is_parse_error() {
    let app = Router::new().route("/v6/latest/{base}", get(|| async { "<html>oops</html>" }));
    let url = serve(app).await;
    let source = OpenErApi::new(HttpSource::new(url));

    let err = source.fetch(CurrencyCode::USD).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = OpenErApi::new(HttpSource::new(format!("http://{}", addr)));
    let err = source.fetch(CurrencyCode::USD).await.unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_build_sources_honours_url_overrides() {
    let url = serve(Router::new().route("/v6/latest/{base}", get(open_er_latest))).await;
    let config = SourcesConfig {
        order: vec![SourceKind::OpenErApi],
        ..SourcesConfig::default()
    }
    .with_base_url(SourceKind::OpenErApi, url);

    let sources = build_sources(&config);
    assert_eq!(sources.len(), 1);

    let map = sources[0].fetch(CurrencyCode::USD).await.unwrap();
    assert_eq!(map.get(CurrencyCode::EUR), Some(0.91));
}
