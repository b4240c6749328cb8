// Black-box tests for the /dishes surface, driven through the full router.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use food_order_server::{AppState, api};

fn app() -> Router {
    api::create_router(AppState::new())
}

async fn send(app: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request builds"),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("request builds"),
    };

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, value)
}

fn valid_dish() -> Value {
    json!({
        "data": {
            "name": "Sweet potato empanadas",
            "description": "Flaky pastry filled with spiced sweet potato",
            "price": 9,
            "image_url": "https://images.example/empanadas.png"
        }
    })
}

#[tokio::test]
async fn post_then_get_round_trips_the_dish() {
    let app = app();

    let (status, body) = send(&app, "POST", "/dishes", Some(valid_dish())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("created dish has an id").to_string();
    assert_eq!(body["data"]["name"], "Sweet potato empanadas");
    assert_eq!(body["data"]["price"], json!(9));

    let (status, fetched) = send(&app, "GET", &format!("/dishes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);

    let (status, listed) = send(&app, "GET", "/dishes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().expect("list is an array").len(), 1);
}

#[tokio::test]
async fn list_starts_empty_and_grows_by_one_per_create() {
    let app = app();

    let (_, listed) = send(&app, "GET", "/dishes", None).await;
    assert_eq!(listed, json!({ "data": [] }));

    send(&app, "POST", "/dishes", Some(valid_dish())).await;
    send(&app, "POST", "/dishes", Some(valid_dish())).await;

    let (_, listed) = send(&app, "GET", "/dishes", None).await;
    assert_eq!(listed["data"].as_array().expect("list is an array").len(), 2);
}

#[tokio::test]
async fn create_rejects_each_missing_field_and_stores_nothing() {
    let app = app();
    let cases = [
        ("name", "Dish must include a name"),
        ("description", "Dish must include a description"),
        ("price", "Dish must include a price"),
        ("image_url", "Dish must include an image_url"),
    ];

    for (field, message) in cases {
        let mut payload = valid_dish();
        payload["data"]
            .as_object_mut()
            .expect("data is an object")
            .remove(field);

        let (status, body) = send(&app, "POST", "/dishes", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(body, json!({ "error": message }));
    }

    let (_, listed) = send(&app, "GET", "/dishes", None).await;
    assert_eq!(listed, json!({ "data": [] }));
}

#[tokio::test]
async fn create_rejects_non_positive_or_non_numeric_price() {
    let app = app();

    for bad in [json!(0), json!(-1), json!("9"), json!(null)] {
        let mut payload = valid_dish();
        payload["data"]["price"] = bad.clone();
        let (status, body) = send(&app, "POST", "/dishes", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {bad}");
        let expected = if bad.is_null() {
            "Dish must include a price"
        } else {
            "Dish must have a price that is an integer greater than 0"
        };
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn fractional_prices_are_accepted() {
    let app = app();
    let mut payload = valid_dish();
    payload["data"]["price"] = json!(6.49);

    let (status, body) = send(&app, "POST", "/dishes", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["price"], json!(6.49));
}

#[tokio::test]
async fn read_unknown_dish_is_a_404() {
    let app = app();
    let (status, body) = send(&app, "GET", "/dishes/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Dish does not exist: nope" }));
}

#[tokio::test]
async fn update_overwrites_every_field_and_keeps_the_id() {
    let app = app();
    let (_, created) = send(&app, "POST", "/dishes", Some(valid_dish())).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let replacement = json!({
        "data": {
            "name": "Plantain chips",
            "description": "Fried green plantains with lime",
            "price": 4.5,
            "image_url": "https://images.example/plantains.png"
        }
    });
    let (status, updated) = send(&app, "PUT", &format!("/dishes/{id}"), Some(replacement.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["id"], json!(id));
    assert_eq!(updated["data"]["name"], "Plantain chips");

    // Repeating the identical update leaves the stored record unchanged.
    let (status, repeated) = send(&app, "PUT", &format!("/dishes/{id}"), Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repeated, updated);

    let (_, fetched) = send(&app, "GET", &format!("/dishes/{id}"), None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_with_mismatched_body_id_names_both_ids() {
    let app = app();
    let (_, created) = send(&app, "POST", "/dishes", Some(valid_dish())).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let mut payload = valid_dish();
    payload["data"]["id"] = json!("impostor");
    let (status, body) = send(&app, "PUT", &format!("/dishes/{id}"), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        format!("Dish id does not match route id. Dish: impostor, Route: {id}")
    );
}

#[tokio::test]
async fn update_with_matching_body_id_passes() {
    let app = app();
    let (_, created) = send(&app, "POST", "/dishes", Some(valid_dish())).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let mut payload = valid_dish();
    payload["data"]["id"] = json!(id.clone());
    let (status, _) = send(&app, "PUT", &format!("/dishes/{id}"), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_of_unknown_dish_is_a_404_before_field_checks() {
    let app = app();
    let (status, body) = send(&app, "PUT", "/dishes/nope", Some(json!({ "data": {} }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Dish does not exist: nope" }));
}

#[tokio::test]
async fn there_is_no_delete_route_for_dishes() {
    let app = app();
    let (_, created) = send(&app, "POST", "/dishes", Some(valid_dish())).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = send(&app, "DELETE", &format!("/dishes/{id}"), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unmatched_paths_fall_back_to_a_404_body() {
    let app = app();
    let (status, body) = send(&app, "GET", "/menus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found: /menus" }));
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "food-order-server");
}
