//! Firestore REST tests against a mock server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use shelter_core::{Location, ShelterRecord};
use shelter_gcp_auth::{
    CredentialConfig, CredentialSource, REMEDIATION, ResolvedCredentials, TokenProvider,
};
use shelter_sink_firestore::{
    AUTO_ID_LENGTH, DocumentStore, FirestoreConnector, FirestoreStore, SinkError, clear_collection,
    create_records,
};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/v1/projects/demo/databases/(default)/documents/places";
const COMMIT_PATH: &str = "/v1/projects/demo/databases/(default)/documents:commit";
const DOC_PREFIX: &str = "projects/demo/databases/(default)/documents/places/";

fn store(server: &MockServer) -> FirestoreStore {
    let credentials = ResolvedCredentials {
        project_id: "demo".to_string(),
        source: CredentialSource::InlineJson,
        tokens: TokenProvider::fixed("test-token"),
    };
    FirestoreStore::new(credentials, reqwest::Client::new())
        .with_base_url(format!("{}/v1", server.uri()))
}

fn hope_house() -> ShelterRecord {
    let mut record = ShelterRecord::new("Hope House", Utc::now());
    record.total_beds = 20;
    record.location = Some(Location {
        lat: 34.0,
        lng: -118.2,
    });
    record
}

async fn commit_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == COMMIT_PATH)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("mask.fieldPaths", "__name__"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"name": format!("{DOC_PREFIX}a")},
                {"name": format!("{DOC_PREFIX}b")}
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"name": format!("{DOC_PREFIX}c")}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let names = store(&server).list_document_names("places").await.unwrap();
    assert_eq!(
        names,
        vec![
            format!("{DOC_PREFIX}a"),
            format!("{DOC_PREFIX}b"),
            format!("{DOC_PREFIX}c")
        ]
    );
}

#[tokio::test]
async fn test_create_commit_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{}],
            "commitTime": "2025-12-01T06:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let saved = create_records(&store, "places", &[hope_house()]).await.unwrap();
    assert_eq!(saved, 1);

    let bodies = commit_bodies(&server).await;
    let write = &bodies[0]["writes"][0];

    let name = write["update"]["name"].as_str().unwrap();
    let id = name.strip_prefix(DOC_PREFIX).unwrap();
    assert_eq!(id.len(), AUTO_ID_LENGTH);

    let fields = &write["update"]["fields"];
    assert_eq!(fields["name"]["stringValue"], "Hope House");
    assert_eq!(fields["totalBeds"]["integerValue"], "20");
    assert_eq!(fields["location"]["mapValue"]["fields"]["lat"]["doubleValue"], 34.0);
    assert!(fields["last_verified_at"]["timestampValue"].is_string());
    assert_eq!(write["currentDocument"]["exists"], false);
}

#[tokio::test]
async fn test_create_splits_commits_at_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;

    let records: Vec<ShelterRecord> = (0..1001).map(|_| hope_house()).collect();
    create_records(&store(&server), "places", &records).await.unwrap();

    let sizes: Vec<usize> = commit_bodies(&server)
        .await
        .iter()
        .map(|b| b["writes"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![500, 500, 1]);
}

#[tokio::test]
async fn test_clear_deletes_listed_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"name": format!("{DOC_PREFIX}a")},
                {"name": format!("{DOC_PREFIX}b")}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = clear_collection(&store(&server), "places").await.unwrap();
    assert_eq!(deleted, 2);

    let bodies = commit_bodies(&server).await;
    assert_eq!(
        bodies[0],
        json!({"writes": [
            {"delete": format!("{DOC_PREFIX}a")},
            {"delete": format!("{DOC_PREFIX}b")}
        ]})
    );
}

#[tokio::test]
async fn test_clear_empty_collection_skips_commit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(clear_collection(&store(&server), "places").await.unwrap(), 0);
}

#[tokio::test]
async fn test_commit_rejection_maps_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMMIT_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Missing or insufficient permissions.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = create_records(&store(&server), "places", &[hope_house()])
        .await
        .unwrap_err();

    match err {
        SinkError::Status {
            operation,
            status,
            message,
        } => {
            assert_eq!(operation, "commit");
            assert_eq!(status, 403);
            assert!(message.starts_with("PERMISSION_DENIED"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_list_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = store(&server).list_document_names("places").await.unwrap_err();
    assert!(matches!(err, SinkError::Decode { operation: "list", .. }));
}

fn authorized_user_config() -> CredentialConfig {
    CredentialConfig {
        service_account_json: Some(
            json!({
                "type": "authorized_user",
                "client_id": "id",
                "client_secret": "secret",
                "refresh_token": "refresh",
                "quota_project_id": "demo"
            })
            .to_string(),
        ),
        ..CredentialConfig::default()
    }
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let connector = FirestoreConnector::new(authorized_user_config());
    assert!(!connector.is_connected());

    let first = connector.connect().await.unwrap();
    let second = connector.connect().await.unwrap();

    assert!(connector.is_connected());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.project_id(), "demo");
}

#[tokio::test]
async fn test_connect_without_credentials_lists_remediation() {
    let metadata = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&metadata)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = CredentialConfig {
        well_known_file: Some(dir.path().join("missing.json")),
        metadata_url: Some(metadata.uri()),
        ..CredentialConfig::default()
    };

    let connector = FirestoreConnector::new(config);
    let err = connector.connect().await.unwrap_err();

    assert!(matches!(err, SinkError::Auth(_)));
    assert!(err.to_string().contains(REMEDIATION));
    assert!(!connector.is_connected());
}
