use std::{collections::BTreeMap, sync::Arc};

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::{
    auth::{
        dto::{PublicAccount, SignupRequest},
        services::AuthService,
    },
    error::AppError,
    marks::{
        repo::MarksStore,
        repo_types::{MarkSheet, Subject, MAX_MARKS},
    },
    reports::services::{build_report, Report},
    storage::StorageClient,
};

/// Who, if anyone, is logged in for this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        email: String,
    },
}

impl Session {
    pub fn email(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { email } => Some(email),
        }
    }
}

/// Slider shown for one subject on the marks form.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectField {
    pub subject: Subject,
    pub min: u8,
    pub max: u8,
}

/// Landing page shown after login.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub welcome: String,
    pub user: PublicAccount,
    pub subjects: Vec<SubjectField>,
    pub marks: Option<MarkSheet>,
}

/// Drives one interactive session: page actions in, views out.
pub struct SessionController {
    session: Session,
    auth: AuthService,
    marks: MarksStore,
}

impl SessionController {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            session: Session::Anonymous,
            auth: AuthService::new(storage.clone()),
            marks: MarksStore::new(storage),
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.session.email()
    }

    /// Signup leaves the session as it was; the user logs in separately.
    pub async fn signup(&mut self, req: SignupRequest) -> Result<(), AppError> {
        self.auth.signup(req).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<PublicAccount, AppError> {
        let account = self.auth.login(&mut self.session, email, password).await?;
        Ok(PublicAccount::from(&account))
    }

    pub fn signout(&mut self) {
        AuthService::logout(&mut self.session);
    }

    fn require_user(&self) -> Result<String, AppError> {
        self.session
            .email()
            .map(str::to_string)
            .ok_or(AppError::NotAuthenticated)
    }

    pub async fn dashboard(&self) -> Result<Dashboard, AppError> {
        let email = self.require_user()?;
        // the account may have been removed from disk behind our back
        let account = self
            .auth
            .users()
            .find(&email)
            .await?
            .ok_or(AppError::UnknownUser)?;
        let marks = self.marks.load(&email).await?;
        Ok(Dashboard {
            welcome: format!("Welcome {}!", account.name),
            user: PublicAccount::from(&account),
            subjects: Subject::ALL
                .iter()
                .map(|&subject| SubjectField {
                    subject,
                    min: 0,
                    max: MAX_MARKS,
                })
                .collect(),
            marks,
        })
    }

    /// Replace the user's marks; subjects left out score 0.
    pub async fn submit_marks(&self, scores: BTreeMap<Subject, i64>) -> Result<MarkSheet, AppError> {
        let email = self.require_user()?;
        let sheet = MarkSheet::from_scores(&scores)?;
        self.marks.save(&email, sheet.rows()).await?;
        info!(email = %email, "marks submitted");
        Ok(sheet)
    }

    pub async fn marks(&self) -> Result<Option<MarkSheet>, AppError> {
        let email = self.require_user()?;
        Ok(self.marks.load(&email).await?)
    }

    pub async fn marks_csv(&self) -> Result<Option<Bytes>, AppError> {
        let email = self.require_user()?;
        Ok(self.marks.raw_csv(&email).await?)
    }

    pub async fn report(&self) -> Result<Option<Report>, AppError> {
        Ok(self.marks().await?.map(|sheet| build_report(&sheet)))
    }
}
