use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::ROLE_SERVICE;

/// Caller identity taken from a verified bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Trusted backend caller
    pub fn is_service(&self) -> bool {
        self.has_role(ROLE_SERVICE)
    }

    /// Services may act for anyone; users only for themselves.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.is_service() || self.sub.parse::<Uuid>().is_ok_and(|sub| sub == user_id)
    }

    pub fn ensure_can_act_for(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.can_act_for(user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only access your own account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_act_for() {
        let id = Uuid::now_v7();
        let owner = AuthenticatedUser {
            sub: id.to_string(),
            roles: vec![],
        };
        assert!(owner.can_act_for(id));
        assert!(!owner.can_act_for(Uuid::now_v7()));
        assert!(!owner.is_service());

        let service = AuthenticatedUser {
            sub: "sign-in-frontend".to_string(),
            roles: vec![ROLE_SERVICE.to_string()],
        };
        assert!(service.can_act_for(id));
        assert!(service.ensure_can_act_for(id).is_ok());
        assert!(matches!(
            owner.ensure_can_act_for(Uuid::now_v7()),
            Err(AppError::Forbidden(_))
        ));
    }
}
