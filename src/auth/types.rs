use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // internal user id
    pub email: String,
    pub iat: usize, // issued at (unix)
    pub exp: usize, // expiry (unix)
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_in: usize,
    pub refresh_expires_in: usize,
}

/// Outcome of a stateless access-token check. Access tokens carry their own
/// validity; no store lookup is involved.
#[derive(Debug, Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Claims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenValidation {
    pub fn valid(payload: Claims) -> Self {
        Self {
            valid: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            payload: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn role_string_roundtrip() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Superadmin.as_str(), "superadmin");

        assert_eq!(Role::try_from("user"), Ok(Role::User));
        assert_eq!(Role::try_from("admin"), Ok(Role::Admin));
        assert_eq!(Role::try_from("superadmin"), Ok(Role::Superadmin));
        assert!(Role::try_from("manager").is_err());
    }
}
