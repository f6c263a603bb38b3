//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FEATURE_PATH: &str = "/arcgis/rest/services/Winter_Shelters/FeatureServer/0/query";

/// Feature collection with two valid shelters and one nameless feature.
pub fn feature_collection() -> Value {
    json!({
        "features": [
            {
                "attributes": {
                    "NAME": "Hope House",
                    "ADDRESS": "100 Hope St",
                    "CAPACITY": "20",
                    "AVAILABLE": "25",
                    "NOTES": "Wheelchair accessible"
                },
                "geometry": {"x": -118.2, "y": 34.0}
            },
            {
                "attributes": {
                    "SHELTER_NAME": "Harbor Light",
                    "TOTAL_BEDS": 40,
                    "BEDS_AVAILABLE": 12,
                    "HOURS": "6pm-7am, pets welcome"
                },
                "geometry": null
            },
            {
                "attributes": {"ADDRESS": "1 Nowhere Ln"},
                "geometry": {"x": 0, "y": 0}
            }
        ]
    })
}

/// Starts a feature service answering with `body`; returns the query URL.
pub async fn feature_service(body: Value) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEATURE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let url = format!("{}{FEATURE_PATH}?where=1%3D1&outFields=*&f=json", server.uri());
    (server, url)
}
