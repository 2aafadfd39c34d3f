use std::env;
use std::future::Future;

use axum::{
    extract::{FromRequestParts, Json},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const AUTH_COOKIE_NAME: &str = "admin_token";

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    success: bool,
    admin: AdminProfile,
}

#[derive(Serialize, Clone)]
pub struct AdminProfile {
    pub username: String,
}

// Claims for the admin session JWT
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

// Claims for the short-lived quiz access token handed out after a correct
// password; the submit endpoint requires it and checks the quiz binding.
#[derive(Debug, Serialize, Deserialize)]
struct QuizAccessClaims {
    quiz_id: String,
    nonce: String,
    exp: usize,
}

pub struct AuthenticatedAdmin {
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync + 'static,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let token =
                extract_token(parts).ok_or(ApiError::Unauthorized("Missing auth token"))?;
            let secret = jwt_secret().map_err(ApiError::Internal)?;

            let mut validation = Validation::default();
            validation.validate_exp = true;

            let token_data = decode::<Claims>(
                &token,
                &DecodingKey::from_secret(secret.as_ref()),
                &validation,
            )
            .map_err(|e| {
                tracing::warn!("Admin token rejected: {}", e);
                ApiError::Unauthorized("Invalid token")
            })?;

            Ok(AuthenticatedAdmin {
                username: token_data.claims.sub,
            })
        }
    }
}

pub async fn login(Json(payload): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let admin_user = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let admin_pass = env::var("ADMIN_PASSWORD")
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("ADMIN_PASSWORD not set")))?;

    if admin_pass == "password" {
        tracing::warn!("Default ADMIN_PASSWORD is not allowed");
        return Err(ApiError::Unauthorized("Admin login misconfigured"));
    }

    if payload.username != admin_user || payload.password != admin_pass {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = create_admin_jwt(&payload.username).map_err(ApiError::Internal)?;
    let cookie = build_auth_cookie(&token);
    let mut response = Json(AuthResponse {
        success: true,
        admin: AdminProfile {
            username: payload.username,
        },
    })
    .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?,
    );
    Ok(response)
}

pub async fn logout() -> impl IntoResponse {
    let cookie = clear_auth_cookie();
    let mut response = (StatusCode::OK, "OK").into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

pub async fn status(admin: AuthenticatedAdmin) -> impl IntoResponse {
    Json(AuthResponse {
        success: true,
        admin: AdminProfile {
            username: admin.username,
        },
    })
}

fn jwt_secret() -> anyhow::Result<String> {
    env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))
}

fn create_admin_jwt(username: &str) -> anyhow::Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(1))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: username.to_string(),
        exp: expiration as usize,
    };

    let secret = jwt_secret()?;
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

/// Mint the access token returned by a successful quiz password check. Ten
/// minutes is enough to fill in the form; afterwards the participant has to
/// re-enter the password.
pub fn create_quiz_access_token(quiz_id: &str) -> anyhow::Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(10))
        .expect("valid timestamp")
        .timestamp();
    let claims = QuizAccessClaims {
        quiz_id: quiz_id.to_string(),
        nonce: uuid::Uuid::new_v4().to_string(),
        exp: expiration as usize,
    };
    let secret = jwt_secret()?;
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn validate_quiz_access_token(token: &str, quiz_id: &str) -> anyhow::Result<()> {
    let secret = jwt_secret()?;
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);
    let data = decode::<QuizAccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    if data.claims.quiz_id != quiz_id {
        return Err(anyhow::anyhow!("quiz mismatch"));
    }
    Ok(())
}

pub fn extract_token(parts: &Parts) -> Option<String> {
    extract_token_from_headers(&parts.headers)
}

pub fn extract_token_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|h| h.to_str().ok()) {
        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some((k, v)) = cookie.split_once('=') {
                if k == AUTH_COOKIE_NAME {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

fn build_auth_cookie(token: &str) -> String {
    let secure = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production";
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age=86400",
        AUTH_COOKIE_NAME, token
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_auth_cookie() -> String {
    let secure = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production";
    let mut cookie = format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        AUTH_COOKIE_NAME
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_secret() {
        std::env::set_var("JWT_SECRET", "test-secret-for-unit-tests");
    }

    #[test]
    fn quiz_access_token_round_trips() {
        set_secret();
        let token = create_quiz_access_token("quiz-1").expect("mint token");
        assert!(validate_quiz_access_token(&token, "quiz-1").is_ok());
    }

    #[test]
    fn quiz_access_token_is_bound_to_its_quiz() {
        set_secret();
        let token = create_quiz_access_token("quiz-1").expect("mint token");
        assert!(validate_quiz_access_token(&token, "quiz-2").is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        set_secret();
        assert!(validate_quiz_access_token("not-a-jwt", "quiz-1").is_err());
    }
}
