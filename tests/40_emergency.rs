mod common;

use anyhow::Result;
use reqwest::multipart::Form;
use reqwest::StatusCode;

#[tokio::test]
async fn public_filing_requires_core_fields() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Missing description and location_text
    let form = Form::new().text("name", "Juan Dela Cruz");

    let res = client
        .post(format!("{}/emergency", server.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn unknown_incident_type_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text("name", "Juan Dela Cruz")
        .text("description", "Smoke coming from the warehouse")
        .text("location_text", "Near the covered court")
        .text("incident_type", "volcano");

    let res = client
        .post(format!("{}/emergency", server.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert!(
        body["field_errors"].get("incident_type").is_some(),
        "expected an incident_type field error: {}",
        body
    );
    Ok(())
}

#[tokio::test]
async fn management_surface_requires_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/emergency", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .delete(format!(
            "{}/api/emergency/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
