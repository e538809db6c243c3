// src/services/auth.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, CurrentUser},
};

/// Valida os tokens emitidos pelo serviço de identidade (HS256, segredo compartilhado).
#[derive(Clone)]
pub struct TokenService {
    jwt_secret: String,
}

impl TokenService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.into())
    }

    /// Emite um token com as mesmas claims do serviço de identidade.
    /// Usado em ferramentas internas e nos testes.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        staff_id: Option<Uuid>,
        permissions: &[&str],
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(8);

        let claims = Claims {
            sub: user_id,
            staff_id,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| anyhow::anyhow!("Falha ao assinar token: {}", e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_round_trips_claims() {
        let service = TokenService::new("segredo-de-teste".into());
        let user_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();

        let token = service
            .issue_token(user_id, Some(staff_id), &["attendance:manage"])
            .unwrap();
        let user = service.validate_token(&token).unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.staff_id, Some(staff_id));
        assert!(user.has_permission("attendance:manage"));
        assert!(!user.has_permission("regularization:review"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = TokenService::new("um".into());
        let validator = TokenService::new("outro".into());

        let token = issuer.issue_token(Uuid::new_v4(), None, &[]).unwrap();
        assert!(matches!(validator.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(validator.validate_token("lixo"), Err(AppError::InvalidToken)));
    }
}
