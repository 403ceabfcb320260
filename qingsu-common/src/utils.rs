use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// access 短票，refresh 长票；勾选"记住我"时 refresh 拉长到两周
pub const ACCESS_TTL_MINUTES: i64 = 60;
pub const REFRESH_TTL_DAYS: i64 = 1;
pub const REMEMBER_TTL_DAYS: i64 = 14;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub kind: String,
    pub exp: i64,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role).ok()
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind.to_string()
    }
}

pub fn create_token(
    sub: &str,
    role: Role,
    kind: TokenKind,
    ttl: Duration,
    secret: &str,
) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        sub: sub.to_string(),
        role: role.to_string(),
        kind: kind.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip() {
        let token =
            create_token("20230001", Role::User, TokenKind::Access, Duration::hours(1), SECRET)
                .unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "20230001");
        assert_eq!(claims.role(), Some(Role::User));
        assert!(claims.is_kind(TokenKind::Access));
        assert!(!claims.is_kind(TokenKind::Refresh));
    }

    #[test]
    fn expired_token_rejected() {
        let token = create_token(
            "20230001",
            Role::User,
            TokenKind::Access,
            Duration::minutes(-5),
            SECRET,
        )
        .unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token =
            create_token("20230001", Role::Admin, TokenKind::Refresh, Duration::days(1), SECRET)
                .unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn role_strings_round_trip() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("STAFF".parse::<Role>().is_err());
    }
}
