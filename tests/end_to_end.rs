//! Gateway and a mock upstream talking over real sockets.

mod common;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde_json::{Value, json};

#[tokio::test]
async fn test_issuance_round_trip_through_upstream() {
    let upstream = common::spawn_upstream().await;
    let addr = common::spawn_gateway(common::config_with_base(&upstream)).await;

    let response = Client::new()
        .post(format!("{addr}/api/qrcode/data"))
        .json(&json!({
            "fields": [
                {"ename": "name", "content": "Lee"},
                {"ename": "roc_birthday", "content": "1990-01-01"}
            ],
            "vcUid": "spoofed"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["token"], common::TOKEN);
    assert_eq!(body["received"]["vcUid"], "id_card_vc");
    assert_eq!(body["received"]["issuanceDate"], "20250201");
    assert_eq!(body["received"]["expiredDate"], "20260131");
    assert_eq!(body["received"]["fields"][1]["ename"], "roc_birthday");
}

#[tokio::test]
async fn test_poll_without_params_uses_defaults() {
    let upstream = common::spawn_upstream().await;
    let addr = common::spawn_gateway(common::config_with_base(&upstream)).await;

    let response = Client::new()
        .get(format!("{addr}/api/oidvp/qrcode"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["query"]["ref"], "default-ref");
    assert_eq!(body["query"]["transactionId"], "");
    assert_eq!(body["token"], common::TOKEN);
}

#[tokio::test]
async fn test_poll_passes_binary_image_through() {
    let upstream = common::spawn_upstream().await;
    let addr = common::spawn_gateway(common::config_with_base(&upstream)).await;

    let response = Client::new()
        .get(format!("{addr}/api/oidvp/qrcode?ref=png&transactionId=t1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
    assert_eq!(&response.bytes().await.unwrap()[..], common::PNG_BYTES);
}

#[tokio::test]
async fn test_poll_forwards_upstream_error_status() {
    let upstream = common::spawn_upstream().await;
    let addr = common::spawn_gateway(common::config_with_base(&upstream)).await;

    let response = Client::new()
        .get(format!("{addr}/api/oidvp/qrcode?ref=unknown"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    assert_eq!(response.text().await.unwrap(), "unknown ref");
}

#[tokio::test]
async fn test_result_round_trip_keeps_status() {
    let upstream = common::spawn_upstream().await;
    let addr = common::spawn_gateway(common::config_with_base(&upstream)).await;

    let response = Client::new()
        .post(format!("{addr}/api/oidvp/result"))
        .json(&json!({"transactionId": "tx-77"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["received"],
        json!({"transactionId": "tx-77", "vcUid": "default-vc"})
    );
}

#[tokio::test]
async fn test_unreachable_upstream_is_502() {
    // nothing listens on the discard port
    let addr = common::spawn_gateway(common::config_with_base("http://127.0.0.1:9")).await;

    let response = Client::new()
        .post(format!("{addr}/api/oidvp/result"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
}
