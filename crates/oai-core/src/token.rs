//! Resumption tokens.
//!
//! A token carries the complete continuation state of a listing: the verb it
//! was issued for, the validated query, the cursor of the next page and an
//! optional expiry. Nothing is kept server-side, so a token issued by one
//! process is honoured by any other process sharing the signing secret.
//!
//! ## Wire format
//!
//! ```text
//! base64url(json payload) "." base64url(HMAC-SHA256(json payload))
//! ```
//!
//! Every decoding failure (bad encoding, bad signature, unknown version,
//! wrong verb, expiry) is reported as `badResumptionToken`.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, OaiError};
use crate::types::{Datestamp, MetadataPrefix, SetSpec};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: u8 = 1;

/// Tokens longer than this are rejected before any decoding work.
const MAX_TOKEN_LEN: usize = 4096;

/// The listing operation a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    ListRecords,
    ListIdentifiers,
    ListSets,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::ListRecords => "ListRecords",
            Verb::ListIdentifiers => "ListIdentifiers",
            Verb::ListSets => "ListSets",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated listing query, as recovered from a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_prefix: Option<MetadataPrefix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Datestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<Datestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<SetSpec>,
}

/// Continuation state carried inside a resumption token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub verb: Verb,
    pub query: HarvestQuery,
    /// Offset of the first item of the page the token resumes at.
    pub cursor: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    v: u8,
    #[serde(flatten)]
    state: TokenState,
}

/// An opaque resumption token as handed to harvesters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumptionToken(String);

impl ResumptionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResumptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResumptionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Signs and verifies resumption tokens.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<[u8]>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec signing with the given secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// Create a codec with a random secret.
    ///
    /// Tokens signed this way are only valid within the current process.
    pub fn random() -> Self {
        Self::new(random_secret())
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| Error::Internal {
            message: "failed to initialize hmac".to_string(),
        })
    }

    /// Encode and sign continuation state.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the state cannot be serialized.
    pub fn encode(&self, state: &TokenState) -> Result<ResumptionToken, Error> {
        let payload = serde_json::to_vec(&Envelope {
            v: TOKEN_VERSION,
            state: state.clone(),
        })
        .map_err(|e| Error::Internal {
            message: format!("failed to encode resumption token: {e}"),
        })?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        Ok(ResumptionToken(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        )))
    }

    /// Verify and decode a token presented for `verb` at instant `now`.
    ///
    /// # Errors
    ///
    /// Returns `badResumptionToken` if the token is malformed, tampered with,
    /// issued for another verb, or expired.
    pub fn decode(&self, token: &str, verb: Verb, now: DateTime<Utc>) -> Result<TokenState, Error> {
        let state = self.verify(token)?;

        if state.verb != verb {
            debug!(issued_for = %state.verb, presented_to = %verb, "Token verb mismatch");
            return Err(OaiError::bad_resumption_token(format!(
                "token was issued for {}",
                state.verb
            ))
            .into());
        }

        if let Some(expires_at) = state.expires_at
            && expires_at <= now
        {
            return Err(OaiError::bad_resumption_token(format!(
                "token expired at {}",
                expires_at.to_rfc3339()
            ))
            .into());
        }

        Ok(state)
    }

    fn verify(&self, token: &str) -> Result<TokenState, Error> {
        let malformed = || OaiError::bad_resumption_token("malformed resumption token");

        if token.is_empty() || token.len() > MAX_TOKEN_LEN {
            return Err(malformed().into());
        }

        let (payload, signature) = token.split_once('.').ok_or_else(malformed)?;
        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| malformed())?;
        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| malformed())?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature).map_err(|_| {
            OaiError::bad_resumption_token("resumption token signature mismatch")
        })?;

        let envelope: Envelope = serde_json::from_slice(&payload).map_err(|_| malformed())?;
        if envelope.v != TOKEN_VERSION {
            return Err(OaiError::bad_resumption_token(format!(
                "unsupported token version {}",
                envelope.v
            ))
            .into());
        }

        Ok(envelope.state)
    }
}

fn random_secret() -> [u8; 32] {
    let a = Uuid::new_v4().as_bytes().to_owned();
    let b = Uuid::new_v4().as_bytes().to_owned();
    let mut out = [0_u8; 32];
    out[..16].copy_from_slice(&a);
    out[16..].copy_from_slice(&b);
    out
}
