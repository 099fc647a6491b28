use super::{Account, AuthError, AuthProvider};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a sign-in was refused. `Display` is the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginError {
    /// Username or password left blank
    #[error("enter your username and password")]
    MissingCredentials,
    /// The provider rejected the email format
    #[error("invalid email")]
    InvalidEmail,
    /// Unknown account or wrong password
    #[error("invalid credentials")]
    InvalidCredential,
    /// Anything else the provider reported
    #[error("could not sign in")]
    Failed,
}

/// Sign in with the username (email) and password from the login form.
///
/// Blank fields are refused before the provider is contacted. Provider errors
/// other than a bad email or bad credentials collapse into [`LoginError::Failed`].
pub fn login<A>(auth: &mut A, username: &str, password: &str) -> Result<Account, LoginError>
where
    A: AuthProvider + ?Sized,
{
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(LoginError::MissingCredentials);
    }

    match auth.sign_in(username, password) {
        Ok(account) => {
            debug!(uid = %account.uid, "signed in");
            Ok(account)
        }
        Err(AuthError::InvalidEmail) => Err(LoginError::InvalidEmail),
        Err(AuthError::InvalidCredential) => Err(LoginError::InvalidCredential),
        Err(err) => {
            warn!(%err, "sign-in failed");
            Err(LoginError::Failed)
        }
    }
}
