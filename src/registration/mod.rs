//! Student accounts: registration, sign-in and the identity shown in the menu.
//!
//! The authentication provider and the document store are external; they are
//! reached through [`AuthProvider`] and [`ProfileStore`].

pub mod identity;
pub mod login;
pub mod memory;

pub use identity::{GUEST_LABEL, display_name_for, role_label, title_case};
pub use login::{LoginError, login};

use crate::config::ScanConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Collection that holds one profile document per account
pub const USERS_COLLECTION: &str = "users";

/// Why a registration was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// First name blank
    #[error("first name is required")]
    MissingFirstName,
    /// Last name blank
    #[error("last name is required")]
    MissingLastName,
    /// Email outside the institutional domain
    #[error("use your institutional {domain} address")]
    NonInstitutionalEmail {
        /// Required suffix
        domain: String,
    },
    /// Password shorter than the policy minimum
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length
        min: usize,
    },
    /// Password and confirmation differ
    #[error("passwords do not match")]
    PasswordMismatch,
    /// Study program not chosen
    #[error("select your program")]
    MissingProgram,
    /// An account already exists for the email
    #[error("an account already exists for this email")]
    EmailInUse,
    /// Auth provider or document store failed
    #[error("registration failed: {0}")]
    Backend(String),
}

/// Errors returned by an [`AuthProvider`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Email already registered
    #[error("email already in use")]
    EmailInUse,
    /// Email is not well formed
    #[error("invalid email")]
    InvalidEmail,
    /// Unknown account or wrong password
    #[error("invalid credential")]
    InvalidCredential,
    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Error returned by a [`ProfileStore`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("profile store: {0}")]
pub struct StoreError(pub String);

/// Account created by the auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Provider-assigned user id
    pub uid: String,
    /// Email as stored by the provider
    pub email: Option<String>,
}

/// Hosted authentication service
pub trait AuthProvider {
    /// Create an email/password account
    fn create_account(&mut self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// Set the account's display name
    fn set_display_name(&mut self, uid: &str, display_name: &str) -> Result<(), AuthError>;

    /// Sign in to an existing email/password account
    fn sign_in(&mut self, email: &str, password: &str) -> Result<Account, AuthError>;
}

/// Hosted document database
pub trait ProfileStore {
    /// Create or merge the document `collection/id`
    fn merge_profile(
        &mut self,
        collection: &str,
        id: &str,
        profile: &UserProfile,
    ) -> Result<(), StoreError>;
}

/// Registration form as entered by the student
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterForm {
    /// First name
    pub first_name: String,
    /// Optional middle name
    pub middle_name: Option<String>,
    /// Last name(s)
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Password confirmation
    pub confirm: String,
    /// Study program
    pub program: String,
}

/// Rules a form has to satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPolicy {
    /// Required email suffix, lowercase, starting with '@'
    pub email_domain: String,
    /// Minimum password length in characters
    pub min_password_len: usize,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for RegistrationPolicy {
    fn from(config: &ScanConfig) -> Self {
        Self {
            email_domain: config.email_domain.to_lowercase(),
            min_password_len: config.min_password_len,
        }
    }
}

impl RegisterForm {
    /// Check the form; the first failing rule wins
    pub fn validate(&self, policy: &RegistrationPolicy) -> Result<(), RegistrationError> {
        if self.first_name.trim().is_empty() {
            return Err(RegistrationError::MissingFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(RegistrationError::MissingLastName);
        }
        if !self.email.to_lowercase().ends_with(&policy.email_domain) {
            return Err(RegistrationError::NonInstitutionalEmail {
                domain: policy.email_domain.clone(),
            });
        }
        if self.password.chars().count() < policy.min_password_len {
            return Err(RegistrationError::PasswordTooShort {
                min: policy.min_password_len,
            });
        }
        if self.password != self.confirm {
            return Err(RegistrationError::PasswordMismatch);
        }
        if self.program.trim().is_empty() {
            return Err(RegistrationError::MissingProgram);
        }
        Ok(())
    }
}

/// Profile document written for every new student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account id
    pub uid: String,
    /// Lowercased email
    pub email: String,
    /// Trimmed first name
    pub first_name: String,
    /// Trimmed middle name, empty if none
    pub middle_name: String,
    /// Trimmed last name
    pub last_name: String,
    /// "First Last"
    pub display_name: String,
    /// Trimmed program
    pub program: String,
    /// Always "student" at registration
    pub role: String,
    /// Orientation not yet done
    pub onboarding_completed: bool,
    /// Game score
    pub score: u64,
    /// Ids of completed missions
    pub missions_completed: Vec<String>,
}

impl UserProfile {
    /// Fresh student profile for `form` and the created `account`
    pub fn new_student(form: &RegisterForm, account: &Account) -> Self {
        let email = account
            .email
            .as_deref()
            .unwrap_or(&form.email)
            .to_lowercase();
        Self {
            uid: account.uid.clone(),
            email,
            first_name: form.first_name.trim().to_string(),
            middle_name: form
                .middle_name
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string(),
            last_name: form.last_name.trim().to_string(),
            display_name: display_name(&form.first_name, &form.last_name),
            program: form.program.trim().to_string(),
            role: "student".to_string(),
            onboarding_completed: false,
            score: 0,
            missions_completed: Vec::new(),
        }
    }
}

/// Trimmed "first last" with runs of whitespace collapsed
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Register a new student
///
/// # Arguments
/// * `form` - The registration form as entered
/// * `policy` - Email domain and password rules to enforce
/// * `auth` - Authentication provider that owns the accounts
/// * `store` - Document store receiving the profile under `users/<uid>`
///
/// # Returns
/// The stored [`UserProfile`]. Form errors are returned before either service
/// is contacted; the account is created exactly once, with the lowercased
/// email.
pub fn register_user<A, S>(
    form: &RegisterForm,
    policy: &RegistrationPolicy,
    auth: &mut A,
    store: &mut S,
) -> Result<UserProfile, RegistrationError>
where
    A: AuthProvider + ?Sized,
    S: ProfileStore + ?Sized,
{
    form.validate(policy)?;

    let email = form.email.to_lowercase();
    let account = auth
        .create_account(&email, &form.password)
        .map_err(|err| match err {
            AuthError::EmailInUse => RegistrationError::EmailInUse,
            AuthError::Other(msg) => RegistrationError::Backend(msg),
            other => RegistrationError::Backend(other.to_string()),
        })?;
    debug!(uid = %account.uid, "account created");

    let profile = UserProfile::new_student(form, &account);
    auth.set_display_name(&account.uid, &profile.display_name)
        .map_err(|err| RegistrationError::Backend(err.to_string()))?;
    store
        .merge_profile(USERS_COLLECTION, &account.uid, &profile)
        .map_err(|err| RegistrationError::Backend(err.to_string()))?;

    info!(uid = %profile.uid, program = %profile.program, "student registered");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::memory::{MemoryAuth, MemoryProfileStore};
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            first_name: " Ana ".to_string(),
            middle_name: Some(" Maria ".to_string()),
            last_name: "  Gomez   Ruiz ".to_string(),
            email: "Ana.Gomez@EIA.edu.co".to_string(),
            password: "s3cretpass".to_string(),
            confirm: "s3cretpass".to_string(),
            program: " Systems Engineering ".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        assert_eq!(form().validate(&RegistrationPolicy::default()), Ok(()));
    }

    #[test]
    fn test_rules_in_order() {
        let policy = RegistrationPolicy::default();
        let cases: Vec<(Box<dyn Fn(&mut RegisterForm)>, RegistrationError)> = vec![
            (
                Box::new(|f: &mut RegisterForm| f.first_name = "  ".into()),
                RegistrationError::MissingFirstName,
            ),
            (
                Box::new(|f: &mut RegisterForm| f.last_name.clear()),
                RegistrationError::MissingLastName,
            ),
            (
                Box::new(|f: &mut RegisterForm| f.email = "ana@gmail.com".into()),
                RegistrationError::NonInstitutionalEmail {
                    domain: "@eia.edu.co".into(),
                },
            ),
            (
                Box::new(|f: &mut RegisterForm| {
                    f.password = "short".into();
                    f.confirm = "short".into();
                }),
                RegistrationError::PasswordTooShort { min: 8 },
            ),
            (
                Box::new(|f: &mut RegisterForm| f.confirm = "different1".into()),
                RegistrationError::PasswordMismatch,
            ),
            (
                Box::new(|f: &mut RegisterForm| f.program = "".into()),
                RegistrationError::MissingProgram,
            ),
        ];

        for (mutate, expected) in cases {
            let mut f = form();
            mutate(&mut f);
            assert_eq!(f.validate(&policy), Err(expected));
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let f = RegisterForm::default();
        assert_eq!(
            f.validate(&RegistrationPolicy::default()),
            Err(RegistrationError::MissingFirstName)
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(" Ana ", "Gomez   Ruiz"), "Ana Gomez Ruiz");
        assert_eq!(display_name("Ana", ""), "Ana");
    }

    #[test]
    fn test_register_writes_student_profile() {
        let mut auth = MemoryAuth::default();
        let mut store = MemoryProfileStore::default();
        let profile =
            register_user(&form(), &RegistrationPolicy::default(), &mut auth, &mut store).unwrap();

        assert_eq!(profile.email, "ana.gomez@eia.edu.co");
        assert_eq!(profile.display_name, "Ana Gomez Ruiz");
        assert_eq!(profile.middle_name, "Maria");
        assert_eq!(profile.role, "student");
        assert!(!profile.onboarding_completed);
        assert_eq!(profile.score, 0);

        assert_eq!(auth.account_count(), 1);
        assert_eq!(
            auth.display_name(&profile.uid),
            Some("Ana Gomez Ruiz")
        );
        assert_eq!(store.get(USERS_COLLECTION, &profile.uid), Some(&profile));
    }

    #[test]
    fn test_duplicate_email() {
        let mut auth = MemoryAuth::default();
        let mut store = MemoryProfileStore::default();
        let policy = RegistrationPolicy::default();
        register_user(&form(), &policy, &mut auth, &mut store).unwrap();

        let mut again = form();
        again.email = "ana.gomez@eia.edu.co".to_string();
        assert_eq!(
            register_user(&again, &policy, &mut auth, &mut store),
            Err(RegistrationError::EmailInUse)
        );
        assert_eq!(auth.account_count(), 1);
    }

    #[test]
    fn test_store_failure_is_backend_error() {
        let mut auth = MemoryAuth::default();
        let mut store = MemoryProfileStore::failing("quota exceeded");
        let err = register_user(&form(), &RegistrationPolicy::default(), &mut auth, &mut store)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Backend(msg) if msg.contains("quota exceeded")));
    }

    #[test]
    fn test_profile_document_field_names() {
        let account = Account {
            uid: "u1".into(),
            email: None,
        };
        let json = serde_json::to_value(UserProfile::new_student(&form(), &account)).unwrap();
        assert_eq!(json["onboardingCompleted"], false);
        assert_eq!(json["missionsCompleted"], serde_json::json!([]));
        assert_eq!(json["displayName"], "Ana Gomez Ruiz");
    }
}
