mod common;

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use fake::faker::address::en::CityName;
use fake::Fake;
use serde_json::json;

use rosemary_map::features::locations::clients::{
    sort_by_distance, ClientError, FeedState, LocationClient, LocationFeed, LocationSubmission,
    MISSING_COORDINATES_MESSAGE, SUBMIT_FAILED_MESSAGE,
};
use rosemary_map::features::locations::services::PhotoUpload;
use rosemary_map::shared::geo::{Coordinates, RadiusFilter};

use common::{serve, test_app};

async fn live_client() -> LocationClient {
    let addr = serve(test_app().await.router).await;
    LocationClient::new(format!("http://{}", addr))
}

fn submission(name: &str, latitude: f64, longitude: f64) -> LocationSubmission {
    LocationSubmission {
        name: name.to_string(),
        description: None,
        coordinates: Some(Coordinates::new(latitude, longitude)),
        photo: None,
    }
}

async fn wait_for_state(feed: &LocationFeed, predicate: impl Fn(&FeedState) -> bool) -> FeedState {
    let mut rx = feed.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| predicate(s)))
        .await
        .expect("feed state not reached in time")
        .expect("feed stopped")
        .clone();
    state
}

#[tokio::test]
async fn test_submit_and_list_round_trip() {
    let client = live_client().await;
    let name: String = CityName().fake();

    let created = client
        .submit(LocationSubmission {
            description: Some("Behind the bakery".to_string()),
            photo: Some(PhotoUpload {
                data: b"jpeg bytes".to_vec(),
                file_name: Some("spot.jpg".to_string()),
                content_type: Some("image/jpeg".to_string()),
            }),
            ..submission(&name, 48.8566, 2.3522)
        })
        .await
        .unwrap();

    assert_eq!(created.name, name);
    assert_eq!(created.description.as_deref(), Some("Behind the bakery"));
    assert_eq!(created.latitude, 48.8566);
    let photo_url = created.photo_url.clone().unwrap();
    assert!(photo_url.starts_with("/uploads/") && photo_url.ends_with(".jpg"));

    let photo = reqwest::get(format!("{}{}", client.base_url(), photo_url))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(photo.as_ref(), b"jpeg bytes");

    let listed = client.list_locations(None).await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn test_list_with_radius_and_sort_by_distance() {
    let client = live_client().await;
    let user = Coordinates::new(37.7749, -122.4194);

    client.submit(submission("Oakland", 37.8044, -122.2712)).await.unwrap();
    client.submit(submission("Los Angeles", 34.0522, -118.2437)).await.unwrap();
    client.submit(submission("Here", 37.7749, -122.4194)).await.unwrap();

    let everything = client.list_locations(None).await.unwrap();
    let sorted = sort_by_distance(everything, Some(user));
    let names: Vec<&str> = sorted.iter().map(|n| n.location.name.as_str()).collect();
    assert_eq!(names, vec!["Here", "Oakland", "Los Angeles"]);

    let nearby = client
        .list_locations(Some(RadiusFilter {
            center: user,
            radius_km: 50.0,
        }))
        .await
        .unwrap();
    let mut nearby_names: Vec<String> = nearby.into_iter().map(|l| l.name).collect();
    nearby_names.sort();
    assert_eq!(nearby_names, vec!["Here", "Oakland"]);
}

#[tokio::test]
async fn test_submit_without_coordinates_makes_no_request() {
    // Nothing listens here; any request would surface as ClientError::Http
    let client = LocationClient::new("http://127.0.0.1:1");

    let result = client
        .submit(LocationSubmission {
            name: "Hedge".to_string(),
            ..Default::default()
        })
        .await;

    match result {
        Err(ClientError::Form(errors)) => {
            assert_eq!(errors.form_error.as_deref(), Some(MISSING_COORDINATES_MESSAGE));
        }
        other => panic!("expected a form error, got {:?}", other.map(|l| l.id)),
    }
}

#[tokio::test]
async fn test_invalid_fields_rejected_locally() {
    let client = LocationClient::new("http://127.0.0.1:1");

    let result = client.submit(submission("", 10.0, 200.0)).await;

    match result {
        Err(ClientError::Form(errors)) => {
            assert_eq!(errors.get("name"), Some("Name is required"));
            assert_eq!(
                errors.get("longitude"),
                Some("Longitude must be between -180 and 180")
            );
        }
        other => panic!("expected a form error, got {:?}", other.map(|l| l.id)),
    }
}

#[tokio::test]
async fn test_server_errors_become_api_errors() {
    let router = Router::new().route(
        "/api/locations",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to store photo"})),
            )
        }),
    );
    let client = LocationClient::new(format!("http://{}", serve(router).await));

    match client.submit(submission("Hedge", 1.0, 2.0)).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to store photo");
        }
        other => panic!("expected an API error, got {:?}", other.map(|l| l.id)),
    }
}

#[tokio::test]
async fn test_unreadable_error_body_uses_default_message() {
    let router = Router::new().route(
        "/api/locations",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let client = LocationClient::new(format!("http://{}", serve(router).await));

    match client.submit(submission("Hedge", 1.0, 2.0)).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, SUBMIT_FAILED_MESSAGE);
        }
        other => panic!("expected an API error, got {:?}", other.map(|l| l.id)),
    }
}

#[tokio::test]
async fn test_feed_loads_and_refreshes_on_demand() {
    let client = live_client().await;
    client.submit(submission("First", 1.0, 1.0)).await.unwrap();

    let feed = LocationFeed::spawn(client.clone(), None, Duration::from_secs(3600));
    let loaded = wait_for_state(&feed, |s| matches!(s, FeedState::Loaded(_))).await;
    assert_eq!(loaded.locations().len(), 1);

    client.submit(submission("Second", 2.0, 2.0)).await.unwrap();
    feed.refresh();

    let refreshed = wait_for_state(&feed, |s| s.locations().len() == 2).await;
    assert_eq!(refreshed.locations()[0].name, "Second");
    assert!(refreshed.error().is_none());
}
