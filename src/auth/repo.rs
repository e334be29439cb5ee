use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context;
use bytes::Bytes;

use crate::auth::repo_types::Account;
use crate::storage::StorageClient;

pub const ACCOUNTS_KEY: &str = "users.json";

pub type AccountMap = BTreeMap<String, Account>;

/// Owns the shared accounts file.
#[derive(Clone)]
pub struct UserStore {
    storage: Arc<dyn StorageClient>,
}

impl UserStore {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self { storage }
    }

    /// Load every account; a missing file is an empty mapping.
    pub async fn load(&self) -> anyhow::Result<AccountMap> {
        let Some(raw) = self.storage.get_object(ACCOUNTS_KEY).await? else {
            return Ok(AccountMap::new());
        };
        let mut accounts: AccountMap =
            serde_json::from_slice(&raw).context("parse accounts file")?;
        for (email, account) in accounts.iter_mut() {
            account.email = email.clone();
        }
        Ok(accounts)
    }

    /// Replace the whole accounts file.
    pub async fn save(&self, accounts: &AccountMap) -> anyhow::Result<()> {
        let body = serde_json::to_vec(accounts).context("encode accounts file")?;
        self.storage
            .put_object(ACCOUNTS_KEY, Bytes::from(body), "application/json")
            .await
            .context("write accounts file")
    }

    /// Find an account by email.
    pub async fn find(&self, email: &str) -> anyhow::Result<Option<Account>> {
        Ok(self.load().await?.remove(email))
    }
}
