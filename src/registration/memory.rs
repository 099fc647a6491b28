//! In-process stand-ins for the hosted auth and document services.

use super::{Account, AuthError, AuthProvider, ProfileStore, StoreError, UserProfile};
use std::collections::HashMap;

/// Auth provider keeping accounts in a map
#[derive(Debug, Default)]
pub struct MemoryAuth {
    // email -> (uid, password)
    accounts: HashMap<String, (String, String)>,
    display_names: HashMap<String, String>,
    next_uid: u64,
}

impl MemoryAuth {
    /// Number of accounts created
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Display name set for `uid`
    pub fn display_name(&self, uid: &str) -> Option<&str> {
        self.display_names.get(uid).map(String::as_str)
    }

    /// Whether `email`/`password` match a stored account
    pub fn check_password(&self, email: &str, password: &str) -> bool {
        self.accounts
            .get(&email.to_lowercase())
            .is_some_and(|(_, stored)| stored == password)
    }
}

impl AuthProvider for MemoryAuth {
    fn create_account(&mut self, email: &str, password: &str) -> Result<Account, AuthError> {
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }
        self.next_uid += 1;
        let uid = format!("uid-{:04}", self.next_uid);
        self.accounts
            .insert(key.clone(), (uid.clone(), password.to_string()));
        Ok(Account {
            uid,
            email: Some(key),
        })
    }

    fn set_display_name(&mut self, uid: &str, display_name: &str) -> Result<(), AuthError> {
        if !self.accounts.values().any(|(id, _)| id == uid) {
            return Err(AuthError::Other(format!("unknown user {uid}")));
        }
        self.display_names
            .insert(uid.to_string(), display_name.to_string());
        Ok(())
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<Account, AuthError> {
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
            && !email.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(AuthError::InvalidEmail);
        }
        let key = email.to_lowercase();
        match self.accounts.get(&key) {
            Some((uid, stored)) if stored == password => Ok(Account {
                uid: uid.clone(),
                email: Some(key),
            }),
            _ => Err(AuthError::InvalidCredential),
        }
    }
}

/// Document store keeping profiles in a map
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    documents: HashMap<(String, String), UserProfile>,
    failure: Option<String>,
}

impl MemoryProfileStore {
    /// Store whose writes always fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            documents: HashMap::new(),
            failure: Some(message.into()),
        }
    }

    /// Stored profile at `collection/id`
    pub fn get(&self, collection: &str, id: &str) -> Option<&UserProfile> {
        self.documents.get(&(collection.to_string(), id.to_string()))
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn merge_profile(
        &mut self,
        collection: &str,
        id: &str,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        if let Some(message) = &self.failure {
            return Err(StoreError(message.clone()));
        }
        // Profiles are flat, so merging is a full overwrite
        self.documents
            .insert((collection.to_string(), id.to_string()), profile.clone());
        Ok(())
    }
}
