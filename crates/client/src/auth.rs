//! Firebase Authentication and Firestore over their REST APIs.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use engine::Role;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_SECURETOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Used when the provider omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Clone, Debug)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub identity_url: String,
    pub securetoken_url: String,
    pub firestore_url: String,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            securetoken_url: DEFAULT_SECURETOKEN_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
        }
    }
}

/// Tokens of a signed-in user.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_at - Utc::now() <= margin
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    user_id: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    fields: UserFields,
}

#[derive(Default, Serialize, Deserialize)]
struct UserFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<FieldValue>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
}

fn expiry(expires_in: Option<&str>) -> DateTime<Utc> {
    let seconds = expires_in
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Utc::now() + Duration::seconds(seconds)
}

/// Reads the `email` claim out of an ID token without verifying it.
fn email_from_id_token(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<IdTokenClaims>(&bytes).ok()?.email
}

async fn provider_error(res: reqwest::Response) -> AuthError {
    let status = res.status();
    let body = match res.json::<ProviderErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => ProviderError {
            message: status.to_string(),
            status: None,
        },
    };
    // Messages look like `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this ...`.
    let code = body
        .message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_string();

    match code.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
        | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
        "USER_DISABLED" => AuthError::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" | "USER_NOT_FOUND" => {
            AuthError::TokenExpired
        }
        _ if status == StatusCode::FORBIDDEN
            || body.status.as_deref() == Some("PERMISSION_DENIED") =>
        {
            AuthError::PermissionDenied
        }
        _ if status == StatusCode::UNAUTHORIZED => AuthError::TokenExpired,
        _ => AuthError::Provider(body.message),
    }
}

#[derive(Clone, Debug)]
pub struct FirebaseAuth {
    http: reqwest::Client,
    config: FirebaseConfig,
}

impl FirebaseAuth {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    fn url(base: &str, path: &str) -> String {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn user_document_url(&self, uid: &str) -> String {
        Self::url(
            &self.config.firestore_url,
            &format!(
                "projects/{}/databases/(default)/documents/users/{uid}",
                self.config.project_id
            ),
        )
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Credentials, AuthError> {
        let res = self
            .http
            .post(Self::url(
                &self.config.identity_url,
                "accounts:signInWithPassword",
            ))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }

        let body = res.json::<SignInResponse>().await?;
        tracing::debug!(uid = %body.local_id, "signed in with password");
        Ok(Credentials {
            email: if body.email.is_empty() {
                email.to_string()
            } else {
                body.email
            },
            uid: body.local_id,
            expires_at: expiry(body.expires_in.as_deref()),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }

    /// Exchanges a refresh token for a fresh ID token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credentials, AuthError> {
        let res = self
            .http
            .post(Self::url(&self.config.securetoken_url, "token"))
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }

        let body = res.json::<RefreshResponse>().await?;
        tracing::debug!(uid = %body.user_id, "id token refreshed");
        Ok(Credentials {
            email: email_from_id_token(&body.id_token).unwrap_or_default(),
            uid: body.user_id,
            expires_at: expiry(body.expires_in.as_deref()),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }

    /// Reads the `role` field of `users/{uid}`. A missing document or field
    /// is no role.
    pub async fn get_role(&self, id_token: &str, uid: &str) -> Result<Option<Role>, AuthError> {
        let res = self
            .http
            .get(self.user_document_url(uid))
            .bearer_auth(id_token)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }

        let document = res.json::<UserDocument>().await?;
        Ok(document
            .fields
            .role
            .and_then(|value| value.string_value)
            .and_then(|raw| Role::parse(&raw)))
    }

    /// Writes the `role` field of `users/{uid}`, creating the document when
    /// needed and leaving other fields alone.
    pub async fn set_role(&self, id_token: &str, uid: &str, role: &str) -> Result<(), AuthError> {
        let document = UserDocument {
            fields: UserFields {
                role: Some(FieldValue {
                    string_value: Some(role.trim().to_string()),
                }),
            },
        };
        let res = self
            .http
            .patch(self.user_document_url(uid))
            .query(&[("updateMask.fieldPaths", "role")])
            .bearer_auth(id_token)
            .json(&document)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }
        tracing::info!(%uid, role = role.trim(), "role updated");
        Ok(())
    }
}
