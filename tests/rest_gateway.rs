use std::time::Duration;

use futures::StreamExt;
use serde_json::{Value, json};
use tracker::core::record::Fields;
use tracker::sync::blob::HttpBlobStore;
use tracker::sync::rest::RestGateway;
use tracker::sync::{BlobStore, GatewayError, SyncGateway};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

fn gateway(server: &MockServer) -> RestGateway {
    RestGateway::new(&server.uri(), Some("tok".into()), Duration::from_millis(10)).unwrap()
}

#[tokio::test]
async fn subscribe_yields_current_then_changes_only() {
    let server = MockServer::start().await;

    // Initial fetch plus one unchanged poll.
    Mock::given(method("GET"))
        .and(path("/goals"))
        .and(query_param("orderBy", "order"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "fields": { "name": "Read more", "order": 0 } }
        ])))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/goals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "fields": { "name": "Read more", "order": 0 } },
            { "id": "b", "fields": { "name": "Sleep early", "order": 1 } }
        ])))
        .mount(&server)
        .await;

    let gw = gateway(&server);
    let mut stream = gw.subscribe("goals", "order").await.unwrap();

    let first = stream.next().await.unwrap();
    assert_eq!(first.collection, "goals");
    assert_eq!(first.documents.len(), 1);
    assert_eq!(first.documents[0].id, "a");

    let second = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.documents.len(), 2);
    assert_eq!(second.documents[1].fields["name"], json!("Sleep early"));
}

#[tokio::test]
async fn subscribe_fails_when_collection_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moods"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = gateway(&server).subscribe("moods", "createdAt").await.err().unwrap();
    assert!(matches!(err, GatewayError::Status { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn add_returns_generated_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_json(json!({ "name": "New Project", "order": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p1" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = gateway(&server)
        .add_record("projects", fields(json!({ "name": "New Project", "order": 0 })))
        .await
        .unwrap();
    assert_eq!(id, "p1");
}

#[tokio::test]
async fn add_with_garbage_response_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .add_record("projects", Fields::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn update_sends_only_the_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/goals/g1"))
        .and(body_json(json!({ "status": "Completed", "image": null })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server)
        .update_record("goals", "g1", fields(json!({ "status": "Completed", "image": null })))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_documents_map_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/todoGroups/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/todoGroups/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gw = gateway(&server);
    let err = gw.delete_record("todoGroups", "gone").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { ref id, .. } if id == "gone"));
    let err = gw
        .update_record("todoGroups", "gone", Fields::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn blob_put_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/blobs/images/goals/g1/x.png"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/blobs/images/goals/g1/x.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base = format!("{}/blobs/", server.uri());
    let store = HttpBlobStore::new(&base, Some("tok".into())).unwrap();
    store
        .put_object("images/goals/g1/x.png", vec![1, 2, 3])
        .await
        .unwrap();
    assert_eq!(
        store.object_url("images/goals/g1/x.png").await.unwrap(),
        format!("{}/blobs/images/goals/g1/x.png", server.uri())
    );
    // Already gone counts as deleted.
    store.delete_object("images/goals/g1/x.png").await.unwrap();
}

#[tokio::test]
async fn blob_put_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&server)
        .await;

    let store = HttpBlobStore::new(&server.uri(), None).unwrap();
    let err = store.put_object("images/a.png", vec![0]).await.unwrap_err();
    match err {
        GatewayError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "disk full");
        }
        other => panic!("unexpected error: {other}"),
    }
}
