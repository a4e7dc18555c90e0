//! Bearer credential handling.
//!
//! Tokens are not verified here: the history store checks them on every
//! request, so only the `sub` claim is read to label results with a user id.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Invalid auth token")]
    Malformed,
    #[error("Invalid auth token type")]
    WrongScheme,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User ID not found in token")]
    MissingSubject,
}

/// Caller identity for history-aware operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub access_token: String,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
}

/// Extracts `<token>` from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let (scheme, token) = header.split_once(' ').ok_or(AuthError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::WrongScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(token)
}

/// Reads the `sub` claim of a JWT without checking its signature.
pub fn subject_from_jwt(token: &str) -> Result<String, AuthError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(AuthError::InvalidToken),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthError::InvalidToken)?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)?;

    claims
        .sub
        .filter(|sub| !sub.is_empty())
        .ok_or(AuthError::MissingSubject)
}

pub fn credentials_from_header(header: Option<&str>) -> Result<Credentials, AuthError> {
    let token = bearer_token(header)?;
    let user_id = subject_from_jwt(token)?;
    Ok(Credentials {
        user_id,
        access_token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingHeader));
        assert_eq!(bearer_token(Some("abc")), Err(AuthError::Malformed));
        assert_eq!(bearer_token(Some("Bearer  ")), Err(AuthError::Malformed));
        assert_eq!(bearer_token(Some("Basic abc")), Err(AuthError::WrongScheme));
    }

    #[test]
    fn test_subject_is_read_without_verification() {
        let token = jwt(r#"{"sub":"user-123","role":"authenticated"}"#);
        assert_eq!(subject_from_jwt(&token), Ok("user-123".to_string()));
    }

    #[test]
    fn test_missing_subject() {
        let token = jwt(r#"{"role":"anon"}"#);
        assert_eq!(subject_from_jwt(&token), Err(AuthError::MissingSubject));
        let token = jwt(r#"{"sub":""}"#);
        assert_eq!(subject_from_jwt(&token), Err(AuthError::MissingSubject));
    }

    #[test]
    fn test_garbage_tokens_are_invalid() {
        assert_eq!(subject_from_jwt("not-a-jwt"), Err(AuthError::InvalidToken));
        assert_eq!(subject_from_jwt("a.%%%.c"), Err(AuthError::InvalidToken));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("plain"));
        assert_eq!(subject_from_jwt(&not_json), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_credentials_keep_raw_token() {
        let token = jwt(r#"{"sub":"abc"}"#);
        let header = format!("Bearer {}", token);
        let credentials = credentials_from_header(Some(&header)).unwrap();
        assert_eq!(credentials.user_id, "abc");
        assert_eq!(credentials.access_token, token);
    }
}
