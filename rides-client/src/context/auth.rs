//! Session token handling
//!
//! The server issues a JWT on login. Its signature is never verified on the client side - the
//! token is treated as an opaque bearer credential, and its payload is only decoded to learn who
//! is logged in and with which role.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use color_eyre::Result;
use color_eyre::eyre::OptionExt;
use derivative::Derivative;
use rides::{Role, UserId};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
enum Error {
    #[error("Invalid token format")]
    InvalidTokenFormat,
    #[error("Token has no expiration time representable as a date")]
    InvalidExpiration,
}

/// JWT segments are unpadded base64url, but padded ones are accepted too
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Token payload as issued by the server
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    tipo: String,
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decoded session token payload
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    /// Email of the logged in user
    pub subject: String,
    pub role: Role,
    pub user_id: Option<UserId>,
    pub expires_at: Option<DateTime<Utc>>,
}

fn parse_token(token: &str) -> Result<TokenClaims> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Error::InvalidTokenFormat.into());
    };

    let payload = TOKEN_ENGINE.decode(payload)?;
    let raw: RawClaims = serde_json::from_slice(&payload)?;

    let expires_at = raw
        .exp
        .map(|exp| DateTime::from_timestamp(exp, 0).ok_or_eyre(Error::InvalidExpiration))
        .transpose()?;

    Ok(TokenClaims {
        subject: raw.sub,
        role: raw.tipo.parse()?,
        user_id: raw.id,
        expires_at,
    })
}

/// Decodes the token payload
///
/// Returns `None` for anything which is not a three segment token with a JSON payload carrying
/// the subject and a known role.
pub fn decode_token(token: &str) -> Option<TokenClaims> {
    parse_token(token)
        .inspect_err(|err| debug!(%err, "Cannot decode session token"))
        .ok()
}

/// Logged in user session
#[derive(Clone, PartialEq, Derivative)]
#[derivative(Debug)]
pub struct Session {
    #[derivative(Debug = "ignore")]
    token: String,
    claims: TokenClaims,
    user_id: Option<UserId>,
}

impl Session {
    /// Creates the session out of the server issued token
    pub fn from_token(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let claims = decode_token(&token)?;

        Some(Self {
            user_id: claims.user_id,
            token,
            claims,
        })
    }

    /// Overrides the user id, keeping the one from the token if `None` is given
    pub fn with_user_id(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id.or(self.user_id);
        self
    }

    /// Bearer token
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    /// Email of the logged in user
    pub fn subject(&self) -> &str {
        &self.claims.subject
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Tokens without expiration time never expire
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.claims
            .expires_at
            .is_some_and(|expires_at| expires_at <= now)
    }
}
