mod common;

use anyhow::Result;
use reqwest::multipart::Form;
use reqwest::StatusCode;

fn registration_form() -> Form {
    Form::new()
        .text("username", "resident1")
        .text("email", "resident@example.com")
        .text("password", "s3cret-pass")
        .text("confirm_password", "s3cret-pass")
        .text("name", "Juan Dela Cruz")
        .text("contact_number", "09171234567")
        .text("address", "123 Mabini St")
        .text("civil_status", "single")
        .text("birthdate", "1990-04-12")
}

#[tokio::test]
async fn mismatched_passwords_rejected_on_confirm_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = registration_form().text("confirm_password", "different-pass");

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(
        body["field_errors"].get("confirm_password").is_some(),
        "expected a confirm_password field error: {}",
        body
    );
    Ok(())
}

#[tokio::test]
async fn entirely_numeric_password_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = registration_form()
        .text("password", "123456789")
        .text("confirm_password", "123456789");

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert!(
        body["field_errors"].get("password").is_some(),
        "expected a password field error: {}",
        body
    );
    Ok(())
}

#[tokio::test]
async fn missing_required_field_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // No birthdate
    let form = Form::new()
        .text("username", "resident2")
        .text("email", "resident2@example.com")
        .text("password", "s3cret-pass")
        .text("confirm_password", "s3cret-pass")
        .text("name", "Maria Clara")
        .text("contact_number", "09171234567")
        .text("address", "456 Rizal Ave")
        .text("civil_status", "married");

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert!(
        body["field_errors"].get("birthdate").is_some(),
        "expected a birthdate field error: {}",
        body
    );
    Ok(())
}
