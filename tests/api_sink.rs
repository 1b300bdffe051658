//! REST API sink and end-to-end diff file replay against a mock server.
//!
//! The sink uses a blocking client, so each test builds, uses and drops it on
//! a blocking thread.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use diff_dispatch::error::SinkError;
use diff_dispatch::mapping::Registry;
use diff_dispatch::sink::{ApiSink, RecordSink};
use diff_dispatch::source::DiffFileSource;
use diff_dispatch::{Dispatcher, Record, Routine};

const TOKEN: &str = "identity-token";

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_record_posts_payload() {
    let server = MockServer::start().await;
    let payload = json!({
        "category_id": "cs.AI",
        "description": "Artificial Intelligence",
        "created_at": "2021-06-01 12:00:00"
    });

    Mock::given(method("POST"))
        .and(path("/category"))
        .and(header("authorization", "Bearer identity-token"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let sink = ApiSink::new(&base_url, TOKEN, Duration::from_secs(5))?;
        sink.create_record("/category", &record(payload))
    })
    .await
    .unwrap();

    assert!(result.is_ok(), "create should succeed: {:?}", result.err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_archive_record_patches_flag() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/jargon/group-1-jargon-2"))
        .and(body_json(json!({"archived": true})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = format!("{}/", server.uri());
    let result = tokio::task::spawn_blocking(move || {
        let sink = ApiSink::new(&base_url, TOKEN, Duration::from_secs(5))?;
        sink.archive_record("/jargon/group-1-jargon-2")
    })
    .await
    .unwrap();

    assert!(result.is_ok(), "archive should succeed: {:?}", result.err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jargon-group"))
        .respond_with(ResponseTemplate::new(422).set_body_string("group_id already exists"))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let sink = ApiSink::new(&base_url, TOKEN, Duration::from_secs(5))?;
        sink.create_record("/jargon-group", &record(json!({"group_id": "group-1"})))
    })
    .await
    .unwrap();

    match result {
        Err(SinkError::Api { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "group_id already exists");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_diff_file_replay() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jargon-group"))
        .and(body_partial_json(json!({
            "group_id": "group-2",
            "description": "Transformers",
            "archived": false
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/jargon"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/jargon/group-1-jargon-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("jargons.json");
    let diff_path = dir.path().join("jargons.diff");

    let data = json!([
        {"id": "group-1", "description": "CNNs", "archived": false, "terms": [
            {"id": "group-1-jargon-1", "name": "CNN", "regex": "\\bCNN\\b", "archived": true}
        ]},
        {"id": "group-2", "description": "Transformers", "archived": false, "terms": [
            {"id": "group-2-jargon-1", "name": "BERT", "regex": "\\bBERT\\b", "archived": false},
            {"id": "group-2-jargon-2", "name": "GPT", "regex": "\\bGPT\\b", "archived": false}
        ]}
    ]);
    std::fs::write(&data_path, data.to_string()).unwrap();
    std::fs::write(
        &diff_path,
        format!(
            "@ [0,\"terms\",0,\"archived\"]\n- false\n+ true\n@ [1]\n+ {}\n",
            data[1]
        ),
    )
    .unwrap();

    let base_url = server.uri();
    let report = tokio::task::spawn_blocking(move || {
        let source = DiffFileSource::open(&data_path, &diff_path).unwrap();
        let sink = ApiSink::new(&base_url, TOKEN, Duration::from_secs(5)).unwrap();
        let registry = Arc::new(Registry::dialect_map().unwrap());

        let mut routine = Routine::new(source, Dispatcher::new(registry, sink));
        routine.run(1).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(report.messages, 2);
    assert_eq!(report.created, 3);
    assert_eq!(report.archived, 1);
    assert_eq!(report.failed, 0);
}
