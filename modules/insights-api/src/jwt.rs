use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use insights_store::User;

pub const ISSUER: &str = "insights-dashboard";

/// JWT Claims stored in the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// JWT service for creating and verifying bearer tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_secs: ttl_hours * 3600,
        }
    }

    /// Issue a token for a signed-in user.
    pub fn create_token(&self, user: &User) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.ttl_secs);

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a JWT token. Returns claims if valid and not expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("test-secret-key", ISSUER.to_string(), 24)
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn roundtrip_token() {
        let svc = test_service();
        let user = test_user();
        let token = svc.create_token(&user).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn rejects_invalid_token() {
        let svc = test_service();
        assert!(svc.verify_token("garbage").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let svc1 = JwtService::new("secret-a", ISSUER.to_string(), 24);
        let svc2 = JwtService::new("secret-b", ISSUER.to_string(), 24);
        let token = svc1.create_token(&test_user()).unwrap();
        assert!(svc2.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_other_issuer() {
        let svc1 = JwtService::new("secret", "someone-else".to_string(), 24);
        let token = svc1.create_token(&test_user()).unwrap();
        assert!(test_service().verify_token(&token).is_err());
    }

    #[test]
    fn token_expiry_follows_ttl() {
        let svc = JwtService::new("secret", ISSUER.to_string(), 48);
        let token = svc.create_token(&test_user()).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 48 * 3600);
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("bearer   abc"), Some("abc"));
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("abc"), None);
    }
}
