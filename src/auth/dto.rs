use serde::{Deserialize, Serialize};

/// Request body for account creation and account update (full overwrite).
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned after account creation.
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: i64,
    pub email: String,
}

/// Returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub access_token: String,
}

/// Public part of an account returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
}

impl From<crate::auth::repo_types::User> for PublicUser {
    fn from(user: crate::auth::repo_types::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_id_and_email_only() {
        let json = serde_json::to_value(PublicUser {
            id: 7,
            email: "test@example.com".into(),
        })
        .unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
