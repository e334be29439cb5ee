use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};
use tracing::{info, warn};

use crate::{
    auth::{dto::SignupRequest, repo::UserStore, repo_types::Account},
    error::AppError,
    session::Session,
    storage::StorageClient,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        // no path separators: the email doubles as the per-user storage prefix
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s/\\]+@[^@\s/\\]+\.[^@\s/\\]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are keys exactly as entered, minus surrounding whitespace.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

/// Parse an ISO `YYYY-MM-DD` date of birth.
pub(crate) fn parse_dob(dob: &str) -> Result<Date, AppError> {
    Date::parse(dob.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::Validation("Date of birth must be YYYY-MM-DD".into()))
}

/// Signup and login against the accounts file.
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    storage: Arc<dyn StorageClient>,
}

impl AuthService {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            users: UserStore::new(storage.clone()),
            storage,
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Register a new account and give it an empty storage area.
    ///
    /// A taken email is reported before any other field is looked at.
    pub async fn signup(&self, req: SignupRequest) -> Result<(), AppError> {
        let email = normalize_email(&req.email);
        let mut accounts = self.users.load().await?;

        if accounts.contains_key(&email) {
            warn!(email = %email, "email already registered");
            return Err(AppError::AlreadyExists);
        }

        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AppError::Validation("Invalid email".into()));
        }
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if req.password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }
        let dob = parse_dob(&req.dob)?;

        let account = Account {
            email: email.clone(),
            name: name.to_string(),
            phone: req.phone.trim().to_string(),
            dob: dob.to_string(),
            password: req.password,
        };
        // the storage area must exist before the account does
        self.storage.create_prefix(&email).await?;
        accounts.insert(email.clone(), account);
        self.users.save(&accounts).await?;

        info!(email = %email, "user registered");
        Ok(())
    }

    /// Check credentials and, on success, mark the session authenticated.
    pub async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        let email = normalize_email(email);
        let account = match self.users.find(&email).await? {
            Some(a) => a,
            None => {
                warn!(email = %email, "login unknown email");
                return Err(AppError::UnknownUser);
            }
        };

        if account.password != password {
            warn!(email = %email, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        *session = Session::Authenticated { email };
        info!(email = %account.email, "user logged in");
        Ok(account)
    }

    pub fn logout(session: &mut Session) {
        if let Some(email) = session.email() {
            info!(email = %email, "user signed out");
        }
        *session = Session::Anonymous;
    }
}
