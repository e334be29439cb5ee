use serde::{Deserialize, Serialize};

/// Account record as kept in `users.json`, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(skip)]
    pub email: String, // map key in the accounts file
    pub name: String,
    pub phone: String,
    pub dob: String,      // ISO date, YYYY-MM-DD
    pub password: String, // plaintext, as the accounts file format requires
}
