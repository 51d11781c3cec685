//! Signed-in applicant taken from a bearer token.
//!
//! Only the payload segment is decoded. Signature checks belong to the
//! server that issued the token and to the API that receives it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use sacco_core::StaticProfileSource;
use sacco_domain::{ApplicantProfile, IdentityClaims};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("expected three dot-separated segments")]
    Malformed,
    #[error("payload is not valid base64url: {0}")]
    Encoding(String),
    #[error("payload is not a valid claim set: {0}")]
    Claims(String),
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    profile: Option<ApplicantProfile>,
}

/// Claims and the optional embedded profile of one token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenIdentity {
    pub claims: IdentityClaims,
    pub profile: Option<ApplicantProfile>,
}

impl TokenIdentity {
    pub fn into_profile_source(self) -> StaticProfileSource {
        StaticProfileSource::new(Some(self.claims), self.profile)
    }
}

/// Decodes the payload of a JWT-shaped `token`.
pub fn decode_token(token: &str) -> Result<TokenIdentity, IdentityError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments[1].is_empty() {
        return Err(IdentityError::Malformed);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|err| IdentityError::Encoding(err.to_string()))?;
    let claims: IdentityClaims = serde_json::from_slice(&payload)
        .map_err(|err| IdentityError::Claims(err.to_string()))?;
    if claims.user_id.trim().is_empty() {
        return Err(IdentityError::Claims("missing subject".into()));
    }
    let envelope: Envelope = serde_json::from_slice(&payload)
        .map_err(|err| IdentityError::Claims(err.to_string()))?;
    if envelope
        .exp
        .is_some_and(|exp| exp <= Utc::now().timestamp())
    {
        return Err(IdentityError::Expired);
    }

    Ok(TokenIdentity {
        claims,
        profile: envelope.profile,
    })
}

/// Builds the profile source from an optional raw token. No token means an
/// anonymous session, which can browse products but not submit.
pub fn profile_source(token: Option<&str>) -> Result<StaticProfileSource, IdentityError> {
    match token.map(str::trim).filter(|token| !token.is_empty()) {
        Some(token) => Ok(decode_token(token)?.into_profile_source()),
        None => Ok(StaticProfileSource::anonymous()),
    }
}
