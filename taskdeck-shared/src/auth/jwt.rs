/// JWT token issuance and validation
///
/// Bearer tokens are signed with HS256 (HMAC-SHA256) using a symmetric secret
/// held in process-wide configuration. The subject claim carries the username
/// of the authenticated user; there is no server-side token state.
///
/// # Security
///
/// - **Algorithm**: HS256
/// - **Expiration**: configurable TTL, computed at issue time
/// - **Validation**: signature, expiration, not-before, and issuer checks
/// - **Secret Management**: secrets should be at least 32 bytes
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new("alice", Duration::minutes(30));
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim embedded in every token
const ISSUER: &str = "taskdeck";

/// Error type for JWT operations
///
/// Every validation failure kind collapses to a single 401 at the HTTP
/// boundary; the kind itself is only used for logging.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature does not verify against the current secret
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer claim does not match
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Token is structurally broken or missing a required claim
    #[error("Malformed token: {0}")]
    MalformedClaim(String),
}

impl JwtError {
    /// Short identifier for structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            JwtError::CreateError(_) => "create_error",
            JwtError::InvalidSignature => "invalid_signature",
            JwtError::Expired => "expired",
            JwtError::InvalidIssuer => "invalid_issuer",
            JwtError::MalformedClaim(_) => "malformed_claim",
        }
    }
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (username)
/// - `iss`: Issuer (always "taskdeck")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp (issue time + TTL)
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username of the authenticated user
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `subject` expiring `ttl` from now
    ///
    /// Two tokens issued for the same subject at different instants carry
    /// different `iat`/`exp` values, so both verify independently until
    /// their own expiry.
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new("alice", Duration::minutes(30));
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
/// assert!(!token.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts its claims
///
/// Verifies, in order:
/// - the signature against `secret`
/// - the expiration and not-before timestamps
/// - the issuer claim
///
/// # Errors
///
/// - `JwtError::InvalidSignature` if any byte of the token was tampered with
/// - `JwtError::Expired` at or after the `exp` timestamp
/// - `JwtError::InvalidIssuer` if the `iss` claim doesn't match
/// - `JwtError::MalformedClaim` if the token is not parseable or a required
///   claim is absent
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // No clock-skew grace: a token is invalid the moment `exp` passes
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::MalformedClaim(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("alice", Duration::minutes(30));

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, "taskdeck");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new("alice", Duration::minutes(30));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, "alice");
        assert_eq!(validated.iss, "taskdeck");
        assert_eq!(validated.exp, claims.exp);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new("alice", Duration::minutes(30));
        let token = create_token(&claims, "secret-number-one-32-bytes-long!").unwrap();

        let result = validate_token(&token, "secret-number-two-32-bytes-long!");
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let claims = Claims::new("alice", Duration::minutes(30));
        let token = create_token(&claims, SECRET).unwrap();

        // Flip one character in the signature segment
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let result = validate_token(&tampered, SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let claims = Claims::new("alice", Duration::minutes(30));
        let token = create_token(&claims, SECRET).unwrap();

        // Swap the payload segment for one claiming a different subject
        let forged_claims = Claims::new("mallory", Duration::minutes(30));
        let forged = create_token(&forged_claims, SECRET).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(validate_token(&spliced, SECRET).is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::new("alice", Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_rejected_immediately_after_expiry() {
        // A few seconds past `exp`, well inside the 60s leeway
        // jsonwebtoken would grant by default
        let claims = Claims::new("alice", Duration::seconds(-5));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let mut claims = Claims::new("alice", Duration::minutes(30));
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let result = validate_token("not-a-token", SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_tokens_with_different_ttls_differ() {
        let first = create_token(&Claims::new("alice", Duration::minutes(30)), SECRET).unwrap();
        let second = create_token(&Claims::new("alice", Duration::minutes(31)), SECRET).unwrap();

        assert_ne!(first, second);
        assert!(validate_token(&first, SECRET).is_ok());
        assert!(validate_token(&second, SECRET).is_ok());
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(JwtError::Expired.kind(), "expired");
        assert_eq!(JwtError::InvalidSignature.kind(), "invalid_signature");
    }
}
