use serde::{Deserialize, Serialize};

/// Authenticated principal handed over by the authentication subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>, email: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            email,
        }
    }

    /// Creates an identity whose subject and email are one login string.
    #[must_use]
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            subject: email.clone(),
            email: Some(email),
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the login string used to attribute actions to this identity.
    ///
    /// Prefers a non-blank email and falls back to the subject claim.
    #[must_use]
    pub fn login(&self) -> &str {
        self.email()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| self.subject())
    }
}
