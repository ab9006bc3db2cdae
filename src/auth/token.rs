//! Session Token Codec
//! Mission: Mint and validate signed, expiring session tokens

use crate::auth::models::{AdminUser, Claims};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Abstraction over the session token format.
///
/// Call sites depend on this trait rather than a concrete signing library,
/// so the algorithm can be swapped without touching middleware or handlers.
pub trait SessionTokenCodec: Send + Sync {
    /// Mint a signed token for an account. Returns the token and its
    /// lifetime in seconds.
    fn issue(&self, user: &AdminUser) -> Result<(String, usize)>;

    /// Verify a presented token and decode its claims.
    ///
    /// Any parse, signature, or expiry failure is an error; callers must
    /// not surface the distinction to clients.
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// HS256 JWT codec signed with a process-wide secret.
pub struct HmacJwtCodec {
    secret: String,
    lifetime_hours: i64,
}

impl HmacJwtCodec {
    /// Create a codec with the default 24-hour token lifetime.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            lifetime_hours: 24,
        }
    }

    /// Create a codec with an explicit token lifetime.
    pub fn with_lifetime(secret: String, lifetime_hours: i64) -> Self {
        Self {
            secret,
            lifetime_hours,
        }
    }
}

impl SessionTokenCodec for HmacJwtCodec {
    fn issue(&self, user: &AdminUser) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.lifetime_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.lifetime_hours * 3600) as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Issuing session token for {} ({}), expires in {}h",
            user.username, user.id, self.lifetime_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign session token")?;

        Ok((token, expires_in))
    }

    fn verify(&self, token: &str) -> Result<Claims> {
        // No leeway: a token one tick past its expiry is already invalid.
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .context("Invalid or expired token")?;

        debug!("Verified session token for {}", decoded.claims.username);

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use uuid::Uuid;

    fn create_test_user(role: Role) -> AdminUser {
        AdminUser {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = HmacJwtCodec::new("test-secret-key-12345".to_string());
        let user = create_test_user(Role::Admin);

        let (token, expires_in) = codec.issue(&user).unwrap();
        assert!(!token.is_empty());
        assert_eq!(expires_in, 24 * 3600);

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let codec = HmacJwtCodec::new("test-secret-key-12345".to_string());

        assert!(codec.verify("not.a.token").is_err());
        assert!(codec.verify("").is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let codec1 = HmacJwtCodec::new("secret1".to_string());
        let codec2 = HmacJwtCodec::new("secret2".to_string());
        let user = create_test_user(Role::Admin);

        let (token, _) = codec1.issue(&user).unwrap();

        assert!(codec2.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = HmacJwtCodec::new("test-secret-key-12345".to_string());
        let user = create_test_user(Role::User);

        let (token, _) = codec.issue(&user).unwrap();

        // Flip one character in the payload segment; the signature no
        // longer matches.
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let mut payload: Vec<u8> = parts[1].bytes().collect();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).unwrap(),
            parts[2]
        );

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = HmacJwtCodec::new("test-secret-key-12345".to_string());
        let user = create_test_user(Role::Admin);

        let (token, _) = codec.issue(&user).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let mut sig: Vec<u8> = parts[2].bytes().collect();
        let last = sig.len() - 1;
        sig[last] = if sig[last] == b'a' { b'b' } else { b'a' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            parts[1],
            String::from_utf8(sig).unwrap()
        );

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = HmacJwtCodec::new("test-secret-key-12345".to_string());

        // Encode claims that expired one second ago with the same secret.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "testuser".to_string(),
            role: Role::Admin,
            iat: now - 3600,
            exp: now - 1,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_role_claim_survives_roundtrip() {
        let codec = HmacJwtCodec::new("test-secret-key-12345".to_string());
        let user = create_test_user(Role::User);

        let (token, _) = codec.issue(&user).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.role, Role::User);
    }
}
