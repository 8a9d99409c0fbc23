use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::account::{Account, Profile, Role};
use crate::error::is_unique_violation;
use crate::storage;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{message}")]
    Validation { field: String, message: String },
    #[error("Account not found")]
    NotFound,
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Manager(#[from] DatabaseError),
}

impl AccountError {
    fn validation(field: &str, message: impl Into<String>) -> Self {
        AccountError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Registration input after multipart/JSON extraction, image handled
/// separately by the caller.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub contact_number: String,
    pub address: String,
    pub civil_status: String,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub contact_number: String,
    pub address: String,
    pub civil_status: String,
    pub birthdate: NaiveDate,
    pub role: Role,
    pub image: Option<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.name,
            contact_number: profile.contact_number,
            address: profile.address,
            civil_status: profile.civil_status,
            birthdate: profile.birthdate,
            role: profile.role,
            image: profile.image_path.as_deref().map(storage::media_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile: ProfileSummary,
}

impl UserSummary {
    pub fn new(account: Account, profile: Profile) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            profile: profile.into(),
        }
    }
}

/// Partial profile/account update; absent fields keep current values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub civil_status: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub role: Option<Role>,
}

pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub async fn new() -> Result<Self, AccountError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create the account row and its profile row in one transaction.
    /// Nothing persists if either insert fails.
    pub async fn register(&self, input: RegisterInput) -> Result<UserSummary, AccountError> {
        validate_registration(&input)?;

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)?;
        let role = input.role.unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        let account: Account = sqlx::query_as(
            "INSERT INTO accounts (username, email, password_hash) VALUES ($1, $2, $3)
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify_account_conflict(e))?;

        let profile: Profile = sqlx::query_as(
            "INSERT INTO profiles (account_id, name, contact_number, address, civil_status, birthdate, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, account_id, name, contact_number, address, civil_status, birthdate, role, image_path",
        )
        .bind(account.id)
        .bind(&input.name)
        .bind(&input.contact_number)
        .bind(&input.address)
        .bind(&input.civil_status)
        .bind(input.birthdate)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UserSummary::new(account, profile))
    }

    /// Resolve email to an account and verify the password hash
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(Account, Profile), AccountError> {
        let account: Account = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AccountError::validation("email", "No user found with this email."))?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(AccountError::validation("password", "Incorrect password."));
        }

        let profile = self.profile_of(account.id).await?;
        Ok((account, profile))
    }

    pub async fn get(&self, account_id: Uuid) -> Result<(Account, Profile), AccountError> {
        let account: Account = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AccountError::NotFound)?;

        let profile = self.profile_of(account_id).await?;
        Ok((account, profile))
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>, AccountError> {
        let accounts: Vec<Account> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(accounts.len());
        for account in accounts {
            let profile = self.profile_of(account.id).await?;
            users.push(UserSummary::new(account, profile));
        }
        Ok(users)
    }

    pub async fn update(&self, account_id: Uuid, input: UpdateUserInput) -> Result<UserSummary, AccountError> {
        let (account, profile) = self.get(account_id).await?;

        let username = input.username.unwrap_or(account.username);
        let email = input.email.unwrap_or(account.email);

        let account: Account = sqlx::query_as(
            "UPDATE accounts SET username = $2, email = $3 WHERE id = $1
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(account_id)
        .bind(&username)
        .bind(&email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_account_conflict(e))?;

        let profile: Profile = sqlx::query_as(
            "UPDATE profiles SET name = $2, contact_number = $3, address = $4, civil_status = $5,
                    birthdate = $6, role = $7
             WHERE account_id = $1
             RETURNING id, account_id, name, contact_number, address, civil_status, birthdate, role, image_path",
        )
        .bind(account_id)
        .bind(input.name.unwrap_or(profile.name))
        .bind(input.contact_number.unwrap_or(profile.contact_number))
        .bind(input.address.unwrap_or(profile.address))
        .bind(input.civil_status.unwrap_or(profile.civil_status))
        .bind(input.birthdate.unwrap_or(profile.birthdate))
        .bind(input.role.unwrap_or(profile.role))
        .fetch_one(&self.pool)
        .await?;

        Ok(UserSummary::new(account, profile))
    }

    /// Point the profile at a newly stored image, returning the previous
    /// path so the caller can remove the old file.
    pub async fn set_profile_image(
        &self,
        account_id: Uuid,
        image_path: &str,
    ) -> Result<Option<String>, AccountError> {
        let previous = self.profile_of(account_id).await?.image_path;

        sqlx::query("UPDATE profiles SET image_path = $2 WHERE account_id = $1")
            .bind(account_id)
            .bind(image_path)
            .execute(&self.pool)
            .await?;

        Ok(previous)
    }

    /// Delete the account; the profile row cascades. Returns the stored
    /// image path, if any, so the caller can remove the file.
    pub async fn delete(&self, account_id: Uuid) -> Result<Option<String>, AccountError> {
        let profile = self.profile_of(account_id).await?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }

        Ok(profile.image_path)
    }

    async fn profile_of(&self, account_id: Uuid) -> Result<Profile, AccountError> {
        sqlx::query_as(
            "SELECT id, account_id, name, contact_number, address, civil_status, birthdate, role, image_path
             FROM profiles WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AccountError::NotFound)
    }
}

fn classify_account_conflict(err: sqlx::Error) -> AccountError {
    if is_unique_violation(&err, "accounts_username_key") {
        return AccountError::validation("username", "A user with that username already exists.");
    }
    if is_unique_violation(&err, "accounts_email_key") {
        return AccountError::validation("email", "A user with that email already exists.");
    }
    AccountError::Database(err)
}

pub fn validate_registration(input: &RegisterInput) -> Result<(), AccountError> {
    validate_username_format(&input.username)
        .map_err(|msg| AccountError::validation("username", msg))?;
    validate_email_format(&input.email).map_err(|msg| AccountError::validation("email", msg))?;

    if input.password != input.confirm_password {
        return Err(AccountError::validation(
            "confirm_password",
            "Password fields didn't match.",
        ));
    }

    validate_password_strength(&input.password)
        .map_err(|msg| AccountError::validation("password", msg))?;

    if input.name.trim().is_empty() {
        return Err(AccountError::validation("name", "Name cannot be empty"));
    }

    Ok(())
}

pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if username.len() > 50 {
        return Err("Username must be less than 50 characters".to_string());
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    // Must start with alphanumeric
    if !username.chars().next().unwrap().is_alphanumeric() {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> RegisterInput {
        RegisterInput {
            username: "resident1".to_string(),
            email: "resident@example.com".to_string(),
            password: "s3cret-pass".to_string(),
            confirm_password: "s3cret-pass".to_string(),
            name: "Juan Dela Cruz".to_string(),
            contact_number: "09171234567".to_string(),
            address: "123 Mabini St".to_string(),
            civil_status: "single".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            role: None,
        }
    }

    #[test]
    fn mismatched_passwords_fail_on_confirm_password() {
        let mut input = sample_input();
        input.confirm_password = "different".to_string();
        match validate_registration(&input) {
            Err(AccountError::Validation { field, .. }) => assert_eq!(field, "confirm_password"),
            other => panic!("expected confirm_password validation error, got {:?}", other),
        }
    }

    #[test]
    fn weak_passwords_rejected() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("123456789").is_err());
        assert!(validate_password_strength("s3cret-pass").is_ok());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username_format("resident1").is_ok());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("_leading").is_err());
        assert!(validate_username_format("has space").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email_format("a@b.com").is_ok());
        assert!(validate_email_format("missing-at.com").is_err());
        assert!(validate_email_format("@nohost.com").is_err());
        assert!(validate_email_format("user@nodot").is_err());
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_registration(&sample_input()).is_ok());
    }
}
