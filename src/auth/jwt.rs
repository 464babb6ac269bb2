use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    model::user::User,
    models::Claims,
};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_access_token(user: &User, secret: &str, ttl: usize) -> AppResult<String> {
    let claims = Claims {
        user_id: user.id,
        sub: user.email.clone(),
        role: user.role,
        exp: now().saturating_add(ttl),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("failed to sign token: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{role::Role, user::LeaveBalance};

    fn manager() -> User {
        User {
            id: 9,
            name: "Boss".into(),
            email: "boss@company.com".into(),
            password_hash: String::new(),
            role: Role::Manager,
            balance: LeaveBalance::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_carries_identity_and_role() {
        let token = generate_access_token(&manager(), "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 9);
        assert_eq!(claims.sub, "boss@company.com");
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(&manager(), "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn oversized_ttl_saturates() {
        let token = generate_access_token(&manager(), "secret", usize::MAX).unwrap();
        assert!(!token.is_empty());
    }
}
