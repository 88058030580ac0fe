mod common;

use axum::http::{Method, StatusCode};
use coffee_grinder::messages;
use common::{decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

const COMPLETED: i32 = 3;
const CANCELLED: i32 = 2;

struct Shop {
    app: TestApp,
    arabica: i32,
    robusta: i32,
}

async fn stocked_shop() -> Shop {
    let app = TestApp::new().await;
    let type_id = app.seed_type("Arabica").await;
    let arabica = app.seed_coffee("Brazil Santos", type_id, dec!(10), dec!(50)).await;
    let robusta = app.seed_coffee("Vietnam Dak Lak", type_id, dec!(5), dec!(80)).await;
    Shop {
        app,
        arabica,
        robusta,
    }
}

fn order_body(arabica: i32, robusta: i32, amount_paid: &str) -> Value {
    json!({
        "customer_name": "Ali Hassan",
        "phone_number": "01012345678",
        "amount_paid": amount_paid,
        "items": [
            { "coffee_id": arabica, "quantity": "2" },
            { "coffee_id": robusta, "quantity": "1.5" }
        ]
    })
}

async fn place_sample_order(shop: &Shop) -> i32 {
    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(order_body(shop.arabica, shop.robusta, "250")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    body["data"]["order_id"].as_i64().expect("order id") as i32
}

#[tokio::test]
async fn checkout_returns_receipt_and_decrements_stock() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(order_body(shop.arabica, shop.robusta, "250")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["message"], messages::ORDER_CREATED);
    let receipt = &body["data"];
    assert_eq!(decimal(&receipt["total"]), dec!(220));
    assert_eq!(decimal(&receipt["amount_paid"]), dec!(250));
    assert_eq!(decimal(&receipt["change"]), dec!(30));
    assert_eq!(receipt["status"], "مكتمل");
    assert_eq!(receipt["lines"].as_array().map(Vec::len), Some(2));
    assert_eq!(decimal(&receipt["lines"][1]["subtotal"]), dec!(120));

    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(8));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(3.5));

    let order_id = receipt["order_id"].as_i64().expect("order id") as i32;
    assert_eq!(shop.app.order_status_of(order_id).await, COMPLETED);
}

#[tokio::test]
async fn cancellation_restores_stock_exactly() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;

    let response = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel?confirm=true"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], messages::ORDER_CANCELLED);
    assert_eq!(body["data"]["outcome"], "updated");
    assert_eq!(body["data"]["restored"].as_array().map(Vec::len), Some(2));

    assert_eq!(shop.app.order_status_of(order_id).await, CANCELLED);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(10));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(5));
}

#[tokio::test]
async fn cancelling_twice_is_a_no_op() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;
    let uri = format!("/api/v1/orders/{order_id}/cancel?confirm=true");

    let first = shop.app.request(Method::POST, &uri, None).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = shop.app.request(Method::POST, &uri, None).await;
    assert_eq!(second.status(), StatusCode::OK);
    let body = response_json(second).await;
    assert_eq!(body["message"], messages::ORDER_ALREADY_CANCELLED);
    assert_eq!(body["data"]["outcome"], "already_cancelled");

    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(10));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(5));
}

#[tokio::test]
async fn unconfirmed_cancellation_changes_nothing() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;

    let response = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], messages::CANCELLATION_DECLINED);

    assert_eq!(shop.app.order_status_of(order_id).await, COMPLETED);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(8));
}

#[tokio::test]
async fn short_payment_is_rejected_without_side_effects() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(order_body(shop.arabica, shop.robusta, "200")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        messages::amount_paid_below_total(dec!(200), dec!(220))
    );

    assert_eq!(shop.app.order_count().await, 0);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(10));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(5));
}

#[tokio::test]
async fn overselling_is_rejected() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_name": "Ali Hassan",
                "amount_paid": 10000,
                "items": [{ "coffee_id": shop.robusta, "quantity": "5.001" }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["message"], messages::stock_exceeded(dec!(5)));

    assert_eq!(shop.app.order_count().await, 0);
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(5));
}

#[tokio::test]
async fn selling_the_whole_stock_leaves_zero() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_name": "سارة",
                "amount_paid": "400",
                "items": [{ "coffee_id": shop.robusta, "quantity": "5" }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(0));
}

#[tokio::test]
async fn sub_gram_quantities_do_not_create_empty_orders() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_name": "Ali Hassan",
                "amount_paid": "0",
                "items": [
                    { "coffee_id": shop.arabica, "quantity": "0.0004" },
                    { "coffee_id": shop.robusta, "quantity": "0.0001" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], messages::CART_EMPTY);

    assert_eq!(shop.app.order_count().await, 0);
    assert_eq!(shop.app.line_count_for_coffee(shop.arabica).await, 0);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(10));
}

#[tokio::test]
async fn receipt_lines_keep_request_order() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_name": "Ali Hassan",
                "amount_paid": "250",
                "items": [
                    { "coffee_id": shop.robusta, "quantity": "1.5" },
                    { "coffee_id": shop.arabica, "quantity": "2" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let lines = body["data"]["lines"].as_array().expect("lines");
    assert_eq!(lines[0]["coffee_name"], "Vietnam Dak Lak");
    assert_eq!(lines[1]["coffee_name"], "Brazil Santos");

    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(8));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(3.5));
}

#[tokio::test]
async fn unknown_coffee_is_not_found() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_name": "Ali Hassan",
                "amount_paid": "100",
                "items": [{ "coffee_id": 999, "quantity": "1" }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["message"], messages::coffee_id_not_found(999));
    assert_eq!(shop.app.order_count().await, 0);
}

#[tokio::test]
async fn checkout_input_is_validated() {
    let shop = stocked_shop().await;
    let cases = [
        (
            json!({ "customer_name": "", "amount_paid": "10", "items": [{ "coffee_id": shop.arabica, "quantity": "1" }] }),
            messages::CUSTOMER_NAME_REQUIRED,
        ),
        (
            json!({ "customer_name": "A", "amount_paid": "10", "items": [{ "coffee_id": shop.arabica, "quantity": "1" }] }),
            messages::CUSTOMER_NAME_LENGTH,
        ),
        (
            json!({ "customer_name": "Ali Hassan", "phone_number": "12345", "amount_paid": "100", "items": [{ "coffee_id": shop.arabica, "quantity": "1" }] }),
            messages::PHONE_FORMAT,
        ),
        (
            json!({ "customer_name": "Ali Hassan", "amount_paid": "100", "items": [] }),
            messages::CART_EMPTY,
        ),
        (
            json!({ "customer_name": "Ali Hassan", "amount_paid": "100", "items": [{ "coffee_id": shop.arabica, "quantity": "0" }] }),
            messages::CART_EMPTY,
        ),
        (
            json!({ "customer_name": "Ali Hassan", "amount_paid": "100", "items": [{ "coffee_id": shop.arabica, "quantity": "-1" }] }),
            messages::QUANTITY_NEGATIVE,
        ),
        (
            json!({ "customer_name": "Ali Hassan", "amount_paid": "abc", "items": [{ "coffee_id": shop.arabica, "quantity": "1" }] }),
            messages::AMOUNT_PAID_INVALID,
        ),
    ];

    for (body, expected) in cases {
        let response = shop
            .app
            .request(Method::POST, "/api/v1/orders", Some(body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["message"], expected);
    }

    assert_eq!(shop.app.order_count().await, 0);
}

#[tokio::test]
async fn quote_prices_without_writing() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(
            Method::POST,
            "/api/v1/cart/quote",
            Some(json!({
                "amount_paid": "250",
                "items": [
                    { "coffee_id": shop.arabica, "quantity": "2" },
                    { "coffee_id": shop.robusta, "quantity": "1.5" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(decimal(&body["data"]["total"]), dec!(220));
    assert_eq!(decimal(&body["data"]["change"]), dec!(30));

    assert_eq!(shop.app.order_count().await, 0);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(10));
}

#[tokio::test]
async fn cancellation_with_a_blank_quantity_rolls_back() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;
    let broken_line = shop
        .app
        .insert_order_line(order_id, shop.arabica, None)
        .await;

    let response = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel?confirm=true"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        messages::order_status_update_failed(&messages::invalid_order_line(broken_line))
    );

    assert_eq!(shop.app.order_status_of(order_id).await, COMPLETED);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(8));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(3.5));
}

#[tokio::test]
async fn cancellation_with_a_missing_coffee_rolls_back() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;

    shop.app.execute_sql("PRAGMA foreign_keys = OFF").await;
    let dangling_line = shop
        .app
        .insert_order_line(order_id, 4242, Some(dec!(1)))
        .await;
    shop.app.execute_sql("PRAGMA foreign_keys = ON").await;

    let response = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel?confirm=true"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        messages::order_status_update_failed(&messages::invalid_order_line(dangling_line))
    );

    assert_eq!(shop.app.order_status_of(order_id).await, COMPLETED);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(8));
    assert_eq!(shop.app.stock_of(shop.robusta).await, dec!(3.5));
}

#[tokio::test]
async fn cancellation_of_an_order_being_updated_conflicts() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;

    let permit = shop
        .app
        .services()
        .order_status
        .guard()
        .try_acquire(order_id)
        .expect("first permit");

    let response = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel?confirm=true"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["message"], messages::ORDER_UPDATE_IN_PROGRESS);
    assert_eq!(shop.app.order_status_of(order_id).await, COMPLETED);

    drop(permit);

    let retry = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel?confirm=true"),
            None,
        )
        .await;
    assert_eq!(retry.status(), StatusCode::OK);
    assert_eq!(shop.app.order_status_of(order_id).await, CANCELLED);
}

#[tokio::test]
async fn cancelling_a_missing_order_is_not_found() {
    let shop = stocked_shop().await;

    let response = shop
        .app
        .request(Method::POST, "/api/v1/orders/77/cancel?confirm=true", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        messages::order_status_update_failed(&messages::order_not_found(77))
    );
}

#[tokio::test]
async fn status_updates_respect_transitions() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;
    let uri = format!("/api/v1/orders/{order_id}/status");

    let backwards = shop
        .app
        .request(Method::PUT, &uri, Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(backwards.status(), StatusCode::BAD_REQUEST);
    let body = response_json(backwards).await;
    assert_eq!(
        body["message"],
        messages::order_status_update_failed(&messages::invalid_transition(
            "مكتمل",
            "قيد الانتظار"
        ))
    );

    let unknown = shop
        .app
        .request(Method::PUT, &uri, Some(json!({ "status_id": 99 })))
        .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    let body = response_json(unknown).await;
    assert_eq!(
        body["message"],
        messages::order_status_update_failed(&messages::unknown_status(99))
    );

    let same = shop
        .app
        .request(Method::PUT, &uri, Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(same.status(), StatusCode::OK);
    let body = response_json(same).await;
    assert_eq!(body["data"]["outcome"], "unchanged");

    for body in [json!({ "status_id": CANCELLED }), json!({ "status": "cancelled" })] {
        let unconfirmed = shop.app.request(Method::PUT, &uri, Some(body)).await;
        assert_eq!(unconfirmed.status(), StatusCode::BAD_REQUEST);
        let body = response_json(unconfirmed).await;
        assert_eq!(body["message"], messages::CANCEL_REQUIRES_CONFIRMATION);
    }
    assert_eq!(shop.app.order_status_of(order_id).await, COMPLETED);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(8));

    let cancel = shop
        .app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel?confirm=true"),
            None,
        )
        .await;
    assert_eq!(cancel.status(), StatusCode::OK);
    assert_eq!(shop.app.stock_of(shop.arabica).await, dec!(10));
    assert_eq!(shop.app.order_status_of(order_id).await, CANCELLED);
}

#[tokio::test]
async fn order_history_is_newest_first_and_paginated() {
    let shop = stocked_shop().await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = shop
            .app
            .request(
                Method::POST,
                "/api/v1/orders",
                Some(json!({
                    "customer_name": "Ali Hassan",
                    "amount_paid": "50",
                    "items": [{ "coffee_id": shop.arabica, "quantity": "1" }]
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        ids.push(body["data"]["order_id"].as_i64().expect("order id"));
    }

    let response = shop
        .app
        .request(Method::GET, "/api/v1/orders?page=1&per_page=2", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let page = &body["data"];
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);

    let listed: Vec<i64> = page["orders"]
        .as_array()
        .expect("orders array")
        .iter()
        .map(|order| order["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1]]);
}

#[tokio::test]
async fn order_details_show_lines_and_notes_placeholder() {
    let shop = stocked_shop().await;
    let order_id = place_sample_order(&shop).await;

    let response = shop
        .app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let details = &body["data"];
    assert_eq!(details["id"], order_id);
    assert_eq!(details["customer_name"], "Ali Hassan");
    assert_eq!(details["notes_display"], messages::NO_NOTES);
    assert_eq!(decimal(&details["total_price"]), dec!(220));

    let lines = details["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["coffee_name"], "Brazil Santos");
    assert_eq!(decimal(&lines[0]["quantity"]), dec!(2));
    assert_eq!(decimal(&lines[0]["unit_price"]), dec!(50));

    let missing = shop
        .app
        .request(Method::GET, "/api/v1/orders/4040", None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
