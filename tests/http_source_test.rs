use httpmock::prelude::*;
use rent_stats::domain::ports::ListingSource;
use rent_stats::{HttpListingSource, Region, SanityBounds, StatsOptions, StatsOrchestrator};
use std::time::Duration;

fn source(server: &MockServer, path: &str) -> HttpListingSource {
    HttpListingSource::new(server.url(path), SanityBounds::default(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_pushes_bounds_down_and_refilters() {
    let server = MockServer::start();
    let mock_data = serde_json::json!([
        {"total_rent": 500.0, "living_space": 50.0, "latitude": 52.50, "longitude": 13.40, "created_at": "2020-01-15"},
        {"total_rent": 1000.0, "living_space": 100.0, "latitude": 52.51, "longitude": 13.41, "created_at": "2020-01-20T10:00:00Z"},
        {"total_rent": 3500.0, "living_space": 100.0, "latitude": 52.51, "longitude": 13.41},
        {"total_rent": 700.0, "living_space": 70.0, "latitude": 48.14, "longitude": 11.58}
    ]);

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/ads")
            .query_param("max_total_rent", "3000")
            .query_param("max_living_space", "200")
            .query_param_exists("north")
            .query_param_exists("west");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data);
    });

    let listings = source(&server, "/ads")
        .fetch(&Region::circle(52.505, 13.405, 5.0))
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(listings.len(), 2);
    assert!(listings.iter().all(|l| l.created_at.is_some()));
}

#[tokio::test]
async fn test_whole_dataset_sends_no_bounding_box() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/ads").query_param("max_total_rent", "3000");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([{"total_rent": 640.0, "living_space": 64.0}]));
    });

    let orchestrator = StatsOrchestrator::new(source(&server, "/ads"), Default::default());
    let bundle = orchestrator
        .compute_stats(&Region::all(), StatsOptions::leaf())
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(bundle.count, 1);
    assert!((bundle.price_per_area.unwrap() - 10.0).abs() < 1e-9);
    assert!(bundle.standard_error.is_none());
}

#[tokio::test]
async fn test_server_error_is_a_fetch_error() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/ads");
        then.status(503);
    });

    let orchestrator = StatsOrchestrator::new(source(&server, "/ads"), Default::default());
    let err = orchestrator
        .compute_stats(&Region::circle(52.5, 13.4, 5.0), StatsOptions::full())
        .await
        .unwrap_err();

    api_mock.assert();
    assert!(err.is_fetch_error());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_body_is_a_fetch_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ads");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("{\"not\": \"a list\"}");
    });

    let err = source(&server, "/ads").fetch(&Region::all()).await.unwrap_err();
    assert!(err.is_fetch_error());
}
