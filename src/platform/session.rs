//! Session bootstrap — credential loading for the platform session.
//!
//! Failure here is fatal and unrecoverable for the run: nothing is
//! retried when the credentials are absent.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::SessionError;

/// Platform credentials and the session artifact location.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Serialized session artifact reused across runs.
    pub session_file: PathBuf,
}

impl Credentials {
    /// Load credentials from the environment.
    ///
    /// `LEADFLOW_USERNAME` and `LEADFLOW_PASSWORD` are required;
    /// `LEADFLOW_SESSION_FILE` defaults to `session.json`.
    pub fn from_env() -> Result<Self, SessionError> {
        let username = std::env::var("LEADFLOW_USERNAME")
            .map_err(|_| SessionError::MissingCredentials("LEADFLOW_USERNAME".into()))?;
        let password = std::env::var("LEADFLOW_PASSWORD")
            .map_err(|_| SessionError::MissingCredentials("LEADFLOW_PASSWORD".into()))?;

        let session_file = std::env::var("LEADFLOW_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("session.json"));

        Ok(Self {
            username,
            password: SecretString::from(password),
            session_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so they
    // cannot race each other.
    #[test]
    fn from_env_requires_both_credentials() {
        unsafe {
            std::env::remove_var("LEADFLOW_USERNAME");
            std::env::remove_var("LEADFLOW_PASSWORD");
        }
        assert!(matches!(
            Credentials::from_env(),
            Err(SessionError::MissingCredentials(_))
        ));

        unsafe {
            std::env::set_var("LEADFLOW_USERNAME", "user@example.com");
        }
        assert!(Credentials::from_env().is_err());

        unsafe {
            std::env::set_var("LEADFLOW_PASSWORD", "hunter2");
        }
        let creds = Credentials::from_env().unwrap();
        assert_eq!(creds.username, "user@example.com");
        assert_eq!(creds.session_file, PathBuf::from("session.json"));

        unsafe {
            std::env::remove_var("LEADFLOW_USERNAME");
            std::env::remove_var("LEADFLOW_PASSWORD");
        }
    }
}
