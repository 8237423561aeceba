/// Webhook signature verification
///
/// The provider sends a `Stripe-Signature` header of the form
///
/// ```text
/// t=1700000000,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
/// ```
///
/// where `v1` is the hex HMAC-SHA256 of `"{t}.{raw_body}"` keyed with the
/// endpoint's signing secret. Several `v1` entries may appear while a secret
/// is being rotated; any one matching is enough. Comparison is constant-time.
///
/// # Example
///
/// ```
/// use codegrade_shared::billing::signature::{sign_header, verify_signature};
///
/// let secret = "whsec_test";
/// let payload = br#"{"type":"payment_intent.succeeded"}"#;
/// let now = 1_700_000_000;
///
/// let header = sign_header(secret, now, payload).unwrap();
/// assert!(verify_signature(payload, &header, secret, 300, now).is_ok());
/// ```

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the header carrying the signature
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Maximum accepted age of a signed event, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Error type for signature verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Header missing `t=` or any `v1=` entry
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    /// Signed timestamp is older than the tolerance
    #[error("Signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    /// No `v1` entry matched the payload
    #[error("No signature matches the payload")]
    NoMatchingSignature,

    /// Signing secret unusable as an HMAC key
    #[error("Invalid signing secret")]
    InvalidSecret,
}

/// Parsed `Stripe-Signature` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Signed timestamp (Unix seconds)
    pub timestamp: i64,

    /// Decoded `v1` signatures
    pub signatures: Vec<Vec<u8>>,
}

/// Parses a `Stripe-Signature` header
///
/// Unknown schemes (e.g. `v0`) are ignored; undecodable `v1` entries are
/// skipped.
pub fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };

        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    SignatureError::MalformedHeader(format!("invalid timestamp '{}'", value))
                })?);
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| SignatureError::MalformedHeader("missing timestamp".into()))?;

    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader("missing v1 signature".into()));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex-encoded `v1` signature for a payload
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a complete `Stripe-Signature` header value
///
/// Used by tests and local tooling to replay events.
pub fn sign_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    Ok(format!(
        "t={},v1={}",
        timestamp,
        compute_signature(secret, timestamp, payload)?
    ))
}

/// Verifies a webhook payload against its signature header
///
/// `now` is the current Unix time; events signed more than `tolerance_secs`
/// earlier are rejected.
///
/// # Errors
///
/// - `MalformedHeader` if the header cannot be parsed
/// - `TimestampOutOfTolerance` for stale events
/// - `NoMatchingSignature` if no `v1` entry matches
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    match now.checked_sub(parsed.timestamp) {
        Some(age) if age <= tolerance_secs => {}
        _ => return Err(SignatureError::TimestampOutOfTolerance),
    }

    let mac = signed_mac(secret, parsed.timestamp, payload)?;
    let matched = parsed
        .signatures
        .iter()
        .any(|sig| mac.clone().verify_slice(sig).is_ok());

    if matched {
        Ok(())
    } else {
        Err(SignatureError::NoMatchingSignature)
    }
}
