use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SESSION_TTL_HOURS: i64 = 24;

/// Stateless session tokens: `{expiry}.{signature}.{identity}`, signed with
/// HMAC-SHA256 over the server secret. Nothing is stored server side;
/// validity is signature plus expiry.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    pub fn issue(&self, identity: &str) -> String {
        let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
        self.issue_expiring_at(identity, expires_at.timestamp())
    }

    fn issue_expiring_at(&self, identity: &str, expires_at: i64) -> String {
        let signature = self.mac(identity, expires_at).finalize().into_bytes();
        format!("{}.{}.{}", expires_at, hex::encode(signature), identity)
    }

    /// All failure modes (malformed token, bad signature, foreign secret,
    /// expiry) collapse into the same `None`.
    pub fn verify(&self, token: &str) -> Option<String> {
        let mut parts = token.splitn(3, '.');
        let expires_at = parts.next()?.parse::<i64>().ok()?;
        let signature = hex::decode(parts.next()?).ok()?;
        let identity = parts.next()?;

        if self.mac(identity, expires_at).verify_slice(&signature).is_err() {
            return None;
        }
        if Utc::now().timestamp() >= expires_at {
            return None;
        }
        Some(identity.to_string())
    }

    fn mac(&self, identity: &str, expires_at: i64) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac key");
        mac.update(expires_at.to_string().as_bytes());
        mac.update(b".");
        mac.update(identity.as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_within_window() {
        let codec = TokenCodec::new("test-secret");
        let token = codec.issue("admin");
        assert_eq!(codec.verify(&token), Some("admin".to_string()));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = TokenCodec::new("test-secret");
        let token = codec.issue_expiring_at("admin", Utc::now().timestamp() - 1);
        assert_eq!(codec.verify(&token), None);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let codec = TokenCodec::new("test-secret");
        let other = TokenCodec::new("other-secret");
        let token = other.issue("admin");
        assert_eq!(codec.verify(&token), None);
    }

    #[test]
    fn tampered_identity_is_rejected() {
        let codec = TokenCodec::new("test-secret");
        let token = codec.issue("admin");
        let (prefix, _) = token.rsplit_once('.').expect("token has segments");
        let forged = format!("{}.root", prefix);
        assert_eq!(codec.verify(&forged), None);
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = TokenCodec::new("test-secret");
        assert_eq!(codec.verify(""), None);
        assert_eq!(codec.verify("not-a-token"), None);
        assert_eq!(codec.verify("123.zzzz.admin"), None);
    }

    #[test]
    fn identity_may_contain_dots() {
        let codec = TokenCodec::new("test-secret");
        let token = codec.issue("admin@portal.local");
        assert_eq!(codec.verify(&token), Some("admin@portal.local".to_string()));
    }
}
