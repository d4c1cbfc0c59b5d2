//! End-to-end board behavior against wiremock provider stubs.

use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stratus_app::CityBoard;
use stratus_weather::{Coordinates, WeatherIcon, WeatherProvider, WeatherRecord};

fn board_for(server: &MockServer, cities: Vec<WeatherRecord>) -> CityBoard {
    let provider = WeatherProvider::new(Url::parse(&server.uri()).unwrap(), "test-key").unwrap();
    CityBoard::with_cities(provider, cities)
}

fn saved_city(name: &str, lat: f64) -> WeatherRecord {
    let mut record = WeatherRecord::new(name);
    record.coordinates = Coordinates {
        latitude: lat,
        longitude: lat,
    };
    record
}

fn one_call_body(temp: f64) -> serde_json::Value {
    let hourly: Vec<_> = (0..8)
        .map(|i| {
            serde_json::json!({
                "dt": 1_700_000_000 + i * 3600,
                "temp": temp,
                "weather": [{"description": "few clouds", "icon": "02d"}]
            })
        })
        .collect();

    serde_json::json!({
        "timezone": "UTC",
        "timezone_offset": 0,
        "current": {
            "temp": temp,
            "humidity": 50,
            "uvi": 3.0,
            "wind_speed": 2.0,
            "weather": [{"description": "few clouds", "icon": "02d"}]
        },
        "hourly": hourly,
    })
}

#[tokio::test]
async fn search_returns_one_record_and_clears_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Toronto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Toronto",
            "main": {"temp": 5.2},
            "weather": [{"description": "clear sky", "icon": "01d"}],
            "timezone": -18000,
            "coord": {"lat": 43.7, "lon": -79.4}
        })))
        .mount(&server)
        .await;

    let board = board_for(&server, Vec::new());
    let results = board.search("Toronto").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].city_name, "Toronto");
    assert_eq!(results[0].temperature, 5.2);
    assert_eq!(results[0].icon, WeatherIcon::Sun);
    assert!(!board.is_loading());
    assert!(board.last_error().is_none());
}

#[tokio::test]
async fn search_miss_sets_city_not_found_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404", "message": "city not found"
        })))
        .mount(&server)
        .await;

    let board = board_for(&server, Vec::new());
    let results = board.search("Atlantis").await;

    assert!(results.is_empty());
    assert!(!board.is_loading());
    let message = board.last_error().unwrap();
    assert!(message.contains("City not found"), "{message}");
}

#[tokio::test]
async fn search_failure_sets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let board = board_for(&server, Vec::new());
    let results = board.search("Toronto").await;

    assert!(results.is_empty());
    let message = board.last_error().unwrap();
    assert!(!message.contains("City not found"), "{message}");
}

#[tokio::test]
async fn refresh_all_updates_every_city_in_order() {
    let server = MockServer::start().await;
    for (lat, temp) in [("1", 10.0), ("2", 20.0), ("3", 30.0)] {
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .and(query_param("lat", lat))
            .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body(temp)))
            .mount(&server)
            .await;
    }

    let cities = vec![
        saved_city("Ottawa", 1.0),
        saved_city("Lima", 2.0),
        saved_city("Oslo", 3.0),
    ];
    let ids: Vec<_> = cities.iter().map(|c| c.id).collect();
    let board = board_for(&server, cities);

    board.refresh_all().await.unwrap();

    let refreshed = board.cities();
    let names: Vec<&str> = refreshed.iter().map(|c| c.city_name.as_str()).collect();
    assert_eq!(names, ["Ottawa", "Lima", "Oslo"]);
    assert_eq!(
        refreshed.iter().map(|c| c.id).collect::<Vec<_>>(),
        ids,
        "refresh must preserve record identity"
    );
    assert_eq!(refreshed[0].temperature, 10.0);
    assert_eq!(refreshed[1].temperature, 20.0);
    assert_eq!(refreshed[2].temperature, 30.0);
    assert_eq!(refreshed[0].hourly_forecast.len(), 6);
    assert_eq!(refreshed[0].humidity_pct, 50.0);
    assert!(board.last_error().is_none());
    assert!(!board.is_loading());
}

#[tokio::test]
async fn refresh_all_failure_leaves_list_untouched() {
    let server = MockServer::start().await;
    for lat in ["1", "3"] {
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .and(query_param("lat", lat))
            .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body(99.0)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/onecall"))
        .and(query_param("lat", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cities = vec![
        saved_city("Ottawa", 1.0),
        saved_city("Lima", 2.0),
        saved_city("Oslo", 3.0),
    ];
    let before = cities.clone();
    let board = board_for(&server, cities);

    let err = board.refresh_all().await.unwrap_err();

    assert!(matches!(err, stratus_weather::WeatherError::Network(_)));
    assert_eq!(board.cities(), before, "failed batch must not change state");
    assert!(board.last_error().is_some());
    assert!(!board.is_loading());
}

#[tokio::test]
async fn fetch_detail_does_not_mutate_saved_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body(12.5)))
        .mount(&server)
        .await;

    let record = saved_city("Ottawa", 1.0);
    let id = record.id;
    let board = board_for(&server, vec![record.clone()]);

    let detailed = board.fetch_detail(id).await.unwrap();

    assert_eq!(detailed.id, id);
    assert_eq!(detailed.city_name, "Ottawa");
    assert_eq!(detailed.temperature, 12.5);
    assert_eq!(detailed.uv_index, 3.0);
    assert_eq!(detailed.hourly_forecast.len(), 6);

    // the saved list still holds the shallow record
    let saved = board.cities();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0], record);
    assert!(board.last_error().is_none());
}

#[tokio::test]
async fn fetch_detail_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    let board = board_for(&server, Vec::new());

    let err = board.fetch_detail(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, stratus_weather::WeatherError::NotFound(_)));
}
