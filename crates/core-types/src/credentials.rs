//! Object-store credentials.
//!
//! Credentials are captured once from the environment and handed to replica
//! clients explicitly. The secret key redacts itself in `Debug` output so a
//! logged configuration never leaks it.

use std::fmt;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Exposes the secret key. Only replica clients should need this.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// True when neither half is set; the object-store client then falls back
    /// to its own credential chain.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_empty() && self.secret_access_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret_access_key.is_empty() {
            ""
        } else {
            "***REDACTED***"
        };
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &secret)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_key() {
        let creds = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("AKIDEXAMPLE"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn default_credentials_are_empty() {
        assert!(Credentials::default().is_empty());
        assert!(!Credentials::new("id", "").is_empty());
    }
}
