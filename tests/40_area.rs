mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn area_returns_only_cats_inside() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (_, token) = server.register("alice", "alice@example.com").await?;
    let inside = server.create_cat(&token, "inside", 16.0, 7.0).await?;
    server.create_cat(&token, "outside", 30.0, 30.0).await?;

    let res = server
        .client
        .get(server.url("/api/v1/cats/area"))
        .query(&[("topRight", "10.5,20.25"), ("bottomLeft", "5,15")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let cats = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0]["_id"], inside.to_string());
    Ok(())
}

#[tokio::test]
async fn empty_area_is_not_found() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/v1/cats/area"))
        .query(&[("topRight", "10.5,20.25"), ("bottomLeft", "5,15")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "No cats found");
    Ok(())
}

#[tokio::test]
async fn bad_corner_names_the_field() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/v1/cats/area"))
        .query(&[("topRight", "abc,20.25"), ("bottomLeft", "5,15")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"].get("topRight.lat").is_some());
    Ok(())
}

#[tokio::test]
async fn missing_corner_is_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/v1/cats/area"))
        .query(&[("topRight", "10.5,20.25")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"].get("bottomLeft").is_some());
    Ok(())
}

#[tokio::test]
async fn inverted_rectangle_is_bad_request() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/v1/cats/area"))
        .query(&[("topRight", "5,15"), ("bottomLeft", "10.5,20.25")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}
