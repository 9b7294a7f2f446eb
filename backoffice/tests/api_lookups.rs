mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_category_tree_and_subcategories() {
    let app = TestApp::empty().await;

    let (status, category) = app.post("/api/categories", json!({ "name": "Facial" })).await;
    assert_eq!(status, StatusCode::OK, "{category}");
    let category_id = category["id"].as_i64().unwrap();
    assert_eq!(category["subcategories"], json!([]));

    for name in ["Limpieza", "Sérums"] {
        let (status, sub) = app
            .post(
                "/api/subcategories",
                json!({ "name": name, "category_id": category_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{sub}");
    }

    let (_, tree) = app.get("/api/categories").await;
    assert_eq!(tree.as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["name"], "Facial");
    assert_eq!(tree[0]["subcategories"].as_array().unwrap().len(), 2);

    let (_, subs) = app
        .get(&format!("/api/subcategories?category_id={category_id}"))
        .await;
    assert_eq!(subs.as_array().unwrap().len(), 2);

    let (status, body) = app
        .post("/api/subcategories", json!({ "name": "Huérfana", "category_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6101);

    let (status, _) = app.delete(&format!("/api/categories/{category_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, subs) = app.get("/api/subcategories").await;
    assert!(subs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_names_are_unique_ignoring_case_and_accents() {
    let app = TestApp::empty().await;
    let (status, _) = app.post("/api/brands", json!({ "name": "Avène" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/api/brands", json!({ "name": "  AVENE " })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6202);

    let (status, body) = app.post("/api/labels", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7);
}

#[tokio::test]
async fn test_rename_cascades_to_products() {
    let app = TestApp::empty().await;
    let (_, brand) = app.post("/api/brands", json!({ "name": "Isdin" })).await;
    let (_, category) = app.post("/api/categories", json!({ "name": "Solar" })).await;
    let product = app
        .create_product(json!({
            "name": "Fotoprotector",
            "price": 20.0,
            "brand": "Isdin",
            "categories": ["Solar", "Facial"]
        }))
        .await;

    let (status, renamed) = app
        .put(&format!("/api/brands/{}", brand["id"]), json!({ "name": "ISDIN" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{renamed}");
    app.put(
        &format!("/api/categories/{}", category["id"]),
        json!({ "name": "Protección solar" }),
    )
    .await;

    let (_, product) = app.get(&format!("/api/products/{product}")).await;
    assert_eq!(product["brand"], "ISDIN");
    assert_eq!(product["categories"], json!(["Protección solar", "Facial"]));
}

#[tokio::test]
async fn test_carousel_state_crud() {
    let app = TestApp::empty().await;
    let (status, state) = app
        .post(
            "/api/carousel-states",
            json!({ "name": "Destacados", "kind": "featured", "color": "#6366f1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{state}");
    let uri = format!("/api/carousel-states/{}", state["id"]);

    let (_, fetched) = app.get(&uri).await;
    assert_eq!(fetched["kind"], "featured");

    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6401);
}

#[tokio::test]
async fn test_order_status_in_use_cannot_be_deleted() {
    let app = TestApp::seeded().await;
    let (_, status) = app
        .post("/api/order-statuses", json!({ "name": "Preparando", "color": "#000000" }))
        .await;
    let status_id = status["id"].as_i64().unwrap();
    let product = app.create_product(json!({ "name": "A", "price": 2.0 })).await;

    let (code, order) = app
        .post(
            "/api/orders",
            json!({
                "customer_name": "Ana",
                "status_id": status_id,
                "items": [{ "product_id": product, "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(code, StatusCode::OK, "{order}");

    let (code, body) = app.delete(&format!("/api/order-statuses/{status_id}")).await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4102);

    // Renames follow onto the order
    app.put(
        &format!("/api/order-statuses/{status_id}"),
        json!({ "name": "En preparación" }),
    )
    .await;
    let (_, order) = app.get(&format!("/api/orders/{}", order["id"])).await;
    assert_eq!(order["status"], "En preparación");

    app.delete(&format!("/api/orders/{}", order["id"])).await;
    let (code, _) = app.delete(&format!("/api/order-statuses/{status_id}")).await;
    assert_eq!(code, StatusCode::OK);
}
