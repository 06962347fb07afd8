use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::error::AppError;
use crate::services::auth::identity::Principal;

// HS256 requires a key of at least 256 bits.
const MIN_SECRET_BYTES: usize = 32;

/// Claims carried inside an access token. Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally broken: wrong segment count, undecodable base64/JSON,
    /// missing claims, or an unexpected algorithm.
    #[error("malformed token")]
    Malformed,

    /// Signature verified, but `exp` is not strictly in the future.
    #[error("token expired")]
    Expired,

    /// The signature does not match the header+payload under our secret.
    #[error("invalid token signature")]
    SignatureInvalid,
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("signing secret is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("signing secret must decode to at least 32 bytes")]
    TooShort,
}

/// HS256 token issuer and verifier.
///
/// Read-only after construction; a single instance is shared across request
/// tasks without synchronization. Verification never performs I/O.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    /// `secret_base64` is the shared HMAC secret in its base64 transport
    /// encoding; it is decoded exactly once, here.
    pub fn new(secret_base64: &str, ttl_seconds: u64) -> Result<Self, SecretError> {
        let secret = BASE64.decode(secret_base64)?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(SecretError::TooShort);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked manually against the caller's clock in verify_at,
        // so verification stays a pure function of (token, secret, now).
        validation.validate_exp = false;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for this principal: `{sub, iat, exp}`, exp = now + ttl.
    pub fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, AppError> {
        let iat = now.timestamp().max(0) as u64;
        let claims = Claims {
            sub: principal.username.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_seconds),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign token");
            AppError::Internal
        })
    }

    /// Verify structure, signature, and expiry against the current clock.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verification core. A token is valid only while `exp` is strictly in
    /// the future; at `exp <= now` it is already `Expired`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;

        let now_ts = now.timestamp().max(0) as u64;
        if data.claims.exp <= now_ts {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Bind a token to a specific resolved identity: true iff verification
    /// succeeds and the subject names this principal.
    pub fn validate(&self, token: &str, principal: &Principal) -> bool {
        match self.verify(token) {
            Ok(claims) => claims.sub == principal.username,
            Err(_) => false,
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn test_service(ttl_seconds: u64) -> TokenService {
        let secret = BASE64.encode(b"0123456789abcdef0123456789abcdef");
        TokenService::new(&secret, ttl_seconds).unwrap()
    }

    fn principal(username: &str) -> Principal {
        Principal {
            id: 1,
            username: username.into(),
            password_hash: "unused".into(),
            roles: vec!["USER".into()],
        }
    }

    #[test]
    fn issue_then_verify_roundtrips_the_subject() {
        let svc = test_service(3600);
        let alice = principal("alice");

        let token = svc.issue(&alice).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn token_is_valid_strictly_before_exp_and_rejected_from_exp_onward() {
        let svc = test_service(1000);
        let t0 = Utc::now();
        let token = svc.issue_at(&principal("alice"), t0).unwrap();

        let exp = t0 + Duration::seconds(1000);
        assert!(svc.verify_at(&token, exp - Duration::seconds(1)).is_ok());
        assert_eq!(svc.verify_at(&token, exp), Err(TokenError::Expired));
        assert_eq!(
            svc.verify_at(&token, exp + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn zero_ttl_tokens_are_never_valid() {
        let svc = test_service(0);
        let token = svc.issue(&principal("alice")).unwrap();

        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn flipped_signature_char_fails_with_signature_invalid() {
        let svc = test_service(3600);
        let token = svc.issue(&principal("alice")).unwrap();

        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') {
            format!("{head}.B{}", &sig[1..])
        } else {
            format!("{head}.A{}", &sig[1..])
        };

        assert_eq!(svc.verify(&flipped), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn tampered_payload_fails_with_signature_invalid() {
        let svc = test_service(3600);
        let token = svc.issue(&principal("alice")).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let payload = parts[1];
        let tampered_payload = if payload.starts_with('A') {
            format!("B{}", &payload[1..])
        } else {
            format!("A{}", &payload[1..])
        };
        let tampered = format!("{}.{}.{}", parts[0], tampered_payload, parts[2]);

        assert_eq!(svc.verify(&tampered), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn wrong_secret_fails_with_signature_invalid() {
        let svc = test_service(3600);
        let other_secret = BASE64.encode(b"another-secret-of-32-bytes-here!");
        let other = TokenService::new(&other_secret, 3600).unwrap();

        let token = svc.issue(&principal("alice")).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn structural_damage_fails_with_malformed() {
        let svc = test_service(3600);

        assert_eq!(svc.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(svc.verify("only.two"), Err(TokenError::Malformed));
        assert_eq!(svc.verify("a.b.c"), Err(TokenError::Malformed));
        assert_eq!(svc.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn token_missing_required_claims_is_malformed() {
        let svc = test_service(3600);

        // Signed with our key, but the payload lacks iat/exp.
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "alice" }),
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .unwrap();

        assert_eq!(svc.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn validate_binds_token_to_principal() {
        let svc = test_service(3600);
        let alice = principal("alice");
        let bob = principal("bob");

        let token = svc.issue(&alice).unwrap();
        assert!(svc.verify(&token).is_ok());
        assert!(svc.validate(&token, &alice));
        assert!(!svc.validate(&token, &bob));
    }

    #[test]
    fn validate_rejects_expired_tokens_even_for_the_right_principal() {
        let svc = test_service(0);
        let alice = principal("alice");

        let token = svc.issue(&alice).unwrap();
        assert!(!svc.validate(&token, &alice));
    }

    #[test]
    fn secret_must_be_base64_and_long_enough() {
        assert!(matches!(
            TokenService::new("not base64!!", 3600),
            Err(SecretError::Decode(_))
        ));
        assert!(matches!(
            TokenService::new(&BASE64.encode(b"short"), 3600),
            Err(SecretError::TooShort)
        ));
        assert!(TokenService::new(&BASE64.encode(&[7u8; 32]), 3600).is_ok());
    }
}
