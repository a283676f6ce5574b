/// Views REST API tests
///
/// Exercises the endpoint grammar and error taxonomy through the axum
/// router, the way a client SDK would see it.
/// Run with: cargo test --test views_api_tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use couchmock::{Bucket, ClusterConfig, MockCluster, ViewEngine, ViewOperation};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn cluster() -> MockCluster {
    let config = ClusterConfig::new()
        .num_nodes(2)
        .num_vbuckets(16)
        .default_bucket("default");
    MockCluster::new(config).unwrap()
}

async fn send(method: &str, path: &str) -> (StatusCode, Vec<u8>) {
    let router = cluster().router();
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn get_bucket_serves_routing_config() {
    let (status, body) = send("GET", "/default").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["name"], "default");
    assert_eq!(json["bucketType"], "membase");
    assert_eq!(json["uri"], "/pools/default/buckets/default");
    assert_eq!(json["vBucketServerMap"]["hashAlgorithm"], "CRC");
    assert_eq!(
        json["vBucketServerMap"]["vBucketMap"].as_array().unwrap().len(),
        16
    );
}

#[tokio::test]
async fn missing_bucket_is_404_with_reason() {
    let (status, body) = send("GET", "/missingBucket").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["reason"], "no_couchbase_bucket_exists");
}

#[tokio::test]
async fn missing_bucket_beats_bad_method() {
    // bucket resolution happens before method validation
    let (status, body) = send("TRACE", "/missingBucket").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["reason"], "no_couchbase_bucket_exists");
}

#[tokio::test]
async fn get_document_routes_return_empty_payloads() {
    for path in [
        "/default/_all_docs",
        "/default/_design/beers",
        "/default/_design/beers/_view/by_name",
    ] {
        let (status, body) = send("GET", path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert!(body.is_empty(), "{path}");
    }
}

#[tokio::test]
async fn put_design_doc_succeeds_with_empty_body() {
    let (status, body) = send("PUT", "/default/_design/doc1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn short_put_path_is_400() {
    let (status, body) = send("PUT", "/default/_design").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["error"],
        "Only reserved document ids may start with underscore"
    );
}

#[tokio::test]
async fn long_put_path_is_400() {
    let (status, _) = send("PUT", "/default/_design/doc1/extra").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// DELETE skips the segment-count check PUT performs. The original server
// has the same asymmetry and existing clients may rely on it.
#[tokio::test]
async fn delete_is_looser_than_put() {
    let (status, _) = send("DELETE", "/default/_design").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send("DELETE", "/default/_design/doc1/extra").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let (status, body) = send("TRACE", "/default").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "method_not_allowed");
    assert_eq!(json["reason"], "Only GET,PUT,DELETE allowed");
}

#[tokio::test]
async fn post_is_405() {
    let (status, _) = send("POST", "/default/_design/doc1").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn root_path_is_404() {
    let (status, _) = send("GET", "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

struct PanickingEngine;

impl ViewEngine for PanickingEngine {
    fn execute(
        &self,
        _bucket: &Bucket,
        _operation: &ViewOperation,
        _body: &[u8],
    ) -> couchmock::Result<Vec<u8>> {
        panic!("engine fault")
    }
}

// one request failing never affects others, and a panicking handler still
// answers a bare 500 with empty body instead of dropping the connection
#[tokio::test]
async fn handler_panic_is_a_bare_500() {
    let config = ClusterConfig::new().num_vbuckets(16);
    let cluster = MockCluster::with_engine(config, Arc::new(PanickingEngine)).unwrap();
    let router = cluster.router();

    let request = Request::builder()
        .method("GET")
        .uri("/default/_all_docs")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());

    // the config route never touches the engine and keeps working
    let request = Request::builder()
        .method("GET")
        .uri("/default")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
