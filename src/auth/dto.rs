use serde::{Deserialize, Serialize};

use crate::auth::repo_types::Account;

/// Request body for signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub dob: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Plain acknowledgement shown by the form.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicAccount,
}

/// Account fields safe to return to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicAccount {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub dob: String,
}

impl From<&Account> for PublicAccount {
    fn from(a: &Account) -> Self {
        Self {
            email: a.email.clone(),
            name: a.name.clone(),
            phone: a.phone.clone(),
            dob: a.dob.clone(),
        }
    }
}

/// Answer to "who is logged in".
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub email: Option<String>,
}
