use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Therapist,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Therapist => "THERAPIST",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PATIENT" => Ok(Role::Patient),
            "THERAPIST" => Ok(Role::Therapist),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A caller whose role has already been checked at the HTTP boundary.
///
/// Services take `&Actor` and trust it; the only way to obtain one is
/// [`Actor::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: Uuid,
    role: Role,
}

impl Actor {
    pub fn authorize(user: &User, allowed: &[Role]) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&user.id)
            .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;

        let role = user
            .role
            .as_deref()
            .and_then(|r| r.parse::<Role>().ok())
            .ok_or_else(|| AppError::Forbidden("No application role assigned".to_string()))?;

        if !allowed.contains(&role) {
            return Err(AppError::Forbidden(format!(
                "Role {} is not allowed to perform this action",
                role
            )));
        }

        Ok(Self { user_id, role })
    }

    /// Any signed-in user with a known role.
    pub fn any(user: &User) -> Result<Self, AppError> {
        Self::authorize(user, &[Role::Patient, Role::Therapist, Role::Admin])
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
