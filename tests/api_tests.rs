use std::fs;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

use kdrama_insights::{
    api::{create_router, AppState},
    config::PipelineConfig,
    data::FileDatasetSource,
    services::PosterResolver,
};

const CATALOG: &str = "\
Name,Year,Genre,Main Cast,Sinopsis,Score,img url,Episode
Crash Landing on You,2019,\"Romance, Comedy\",\"Hyun Bin, Son Ye-jin\",A paraglider lands in the North.,9.1,http://img/cloy.jpg,16
Goblin,2016,\"Fantasy, Romance\",\"Gong Yoo, Kim Go-eun\",An immortal seeks his bride.,8.8,,16
Vincenzo,2021,\"Crime, Comedy\",\"Song Joong-ki, Jeon Yeo-been\",A consigliere returns.,9.0,http://img/vincenzo.jpg,20
Hotel del Luna,2019,\"Fantasy, Romance\",\"IU, Yeo Jin-goo\",A hotel for ghosts.,8.6,,16
Secret Garden,2010,\"Fantasy, Romance, Comedy\",\"Hyun Bin, Ha Ji-won\",A body swap romance.,8.4,,20
Unscored Show,2020,Drama,Someone,,,,
";

const RATINGS: &str = "\
title,rating
crash landing on you,9.5
Goblin!,9.0
The Hotel Del Luna,9.4
Unscored Show,8.0
Completely Unknown Title,
";

struct Fixture {
    dir: TempDir,
    server: TestServer,
}

fn create_test_server_with(catalog: &str, ratings: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("catalog.csv");
    let ratings_path = dir.path().join("ratings.csv");
    fs::write(&catalog_path, catalog).unwrap();
    fs::write(&ratings_path, ratings).unwrap();

    let poster_dir = dir.path().join("posters");
    fs::create_dir(&poster_dir).unwrap();
    fs::write(poster_dir.join("goblin.jpg"), b"").unwrap();

    let mut pipeline = PipelineConfig::default();
    pipeline.favorites.min_genre_count = 2;

    let state = AppState::new(
        Arc::new(FileDatasetSource::new(catalog_path, ratings_path)),
        PosterResolver::new(Some(poster_dir)),
        pipeline,
    );
    let server = TestServer::new(create_router(state)).unwrap();

    Fixture { dir, server }
}

fn create_test_server() -> Fixture {
    create_test_server_with(CATALOG, RATINGS)
}

#[tokio::test]
async fn test_health_check() {
    let fixture = create_test_server();
    let response = fixture.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let fixture = create_test_server();

    let response = fixture
        .server
        .get("/health")
        .add_header("x-request-id".parse::<axum::http::HeaderName>().unwrap(), "abc-123".parse::<axum::http::HeaderValue>().unwrap())
        .await;
    assert_eq!(response.header("x-request-id"), "abc-123");

    let response = fixture.server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_summary() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/summary").await;
    response.assert_status_ok();

    let summary: Value = response.json();
    assert_eq!(summary["catalog_size"], 6);
    assert_eq!(summary["catalog_missing_score"], 1);
    assert_eq!(summary["num_rated"], 5);
    assert_eq!(summary["num_matched"], 3);
    assert_eq!(summary["num_unmatched"], 2);
    let diff = summary["mean_diff"].as_f64().unwrap();
    assert!((diff - (0.4 + 0.2 + 0.8) / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_genre_stats_with_min_count() {
    let fixture = create_test_server();

    let response = fixture.server.get("/api/v1/stats/genres").await;
    response.assert_status_ok();
    let stats: Vec<Value> = response.json();
    let names: Vec<&str> = stats.iter().map(|s| s["category"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Romance", "Fantasy", "Comedy"]);
    assert_eq!(stats[0]["count"], 3);

    let response = fixture.server.get("/api/v1/stats/genres?min_count=3").await;
    let stats: Vec<Value> = response.json();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["category"], "Romance");
}

#[tokio::test]
async fn test_actor_stats() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/stats/actors").await;
    response.assert_status_ok();
    let stats: Vec<Value> = response.json();
    assert_eq!(stats.len(), 6);
    assert!(stats.iter().all(|s| s["count"] == 1));
}

#[tokio::test]
async fn test_favorites() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/favorites").await;
    response.assert_status_ok();
    let favorites: Value = response.json();
    assert_eq!(favorites["genres"], serde_json::json!(["Romance", "Fantasy"]));
    assert_eq!(favorites["actors"], serde_json::json!([]));
}

#[tokio::test]
async fn test_recommendations() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/recommendations").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total_candidates"], 2);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["title"], "Secret Garden");
    assert_eq!(recs[0]["genre_overlap"], 2);
    assert!(recs[0]["why_recommended"]
        .as_str()
        .unwrap()
        .starts_with("Matches your favorite genres: Fantasy, Romance"));
    assert_eq!(recs[1]["title"], "Vincenzo");
    assert_eq!(recs[1]["reasons"][0], "Strong global rating (9.0)");

    let response = fixture.server.get("/api/v1/recommendations?limit=1").await;
    let body: Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_recommendations_rejects_bad_limit() {
    let fixture = create_test_server();
    for query in ["limit=0", "limit=101"] {
        let response = fixture
            .server
            .get(&format!("/api/v1/recommendations?{}", query))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }
}

#[tokio::test]
async fn test_ratings_sorted_with_posters() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/ratings").await;
    response.assert_status_ok();

    let ratings: Vec<Value> = response.json();
    let titles: Vec<&str> = ratings.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(
        titles,
        vec![
            "crash landing on you",
            "The Hotel Del Luna",
            "Goblin!",
            "Unscored Show",
            "Completely Unknown Title",
        ]
    );

    assert_eq!(ratings[0]["matched_title"], "Crash Landing on You");
    assert_eq!(ratings[0]["poster"]["kind"], "remote");
    assert_eq!(ratings[0]["poster"]["url"], "http://img/cloy.jpg");
    assert_eq!(ratings[2]["poster"]["kind"], "local");
    assert_eq!(ratings[1]["poster"]["kind"], "missing");
    assert!(ratings[4]["rating"].is_null());
}

#[tokio::test]
async fn test_unmatched_ratings() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/ratings/unmatched").await;
    response.assert_status_ok();

    let unmatched: Vec<Value> = response.json();
    let titles: Vec<&str> = unmatched.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Unscored Show", "Completely Unknown Title"]);
    assert!(unmatched[1]["matched_title"].is_null());
}

#[tokio::test]
async fn test_new_poster_file_is_picked_up() {
    let fixture = create_test_server();
    let ratings: Vec<Value> = fixture.server.get("/api/v1/ratings").await.json();
    assert_eq!(ratings[1]["poster"]["kind"], "missing");

    fs::write(fixture.dir.path().join("posters").join("the_hotel_del_luna.jpg"), b"").unwrap();

    let ratings: Vec<Value> = fixture.server.get("/api/v1/ratings").await.json();
    assert_eq!(ratings[1]["title"], "The Hotel Del Luna");
    assert_eq!(ratings[1]["poster"]["kind"], "local");
}

#[tokio::test]
async fn test_ratings_file_change_is_picked_up() {
    let fixture = create_test_server();
    let response = fixture.server.get("/api/v1/summary").await;
    let summary: Value = response.json();
    assert_eq!(summary["num_rated"], 5);

    fs::write(fixture.dir.path().join("ratings.csv"), "title,rating\nGoblin,7.0\n").unwrap();

    let response = fixture.server.get("/api/v1/summary").await;
    let summary: Value = response.json();
    assert_eq!(summary["num_rated"], 1);
    assert_eq!(summary["num_matched"], 1);
}

#[tokio::test]
async fn test_schema_mismatch_is_server_error() {
    let fixture = create_test_server_with(CATALOG, "title,score\nGoblin,9\n");
    let response = fixture.server.get("/api/v1/summary").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("`rating`"));
}

#[tokio::test]
async fn test_missing_input_file_is_server_error() {
    let fixture = create_test_server();
    fs::remove_file(fixture.dir.path().join("catalog.csv")).unwrap();

    let response = fixture.server.get("/api/v1/favorites").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("catalog.csv"));
}
