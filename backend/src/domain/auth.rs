//! Authentication primitives: password digests, login credentials and
//! account registration forms.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::text::normalize;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Hex-encoded SHA-256 digest of a password.
///
/// Stored accounts compare digests only; the plain password never leaves the
/// request that carried it.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Digest a plain password.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::domain::PasswordHash;
    ///
    /// let hash = PasswordHash::from_password("password123");
    /// assert!(hash.verify("password123"));
    /// assert!(!hash.verify("password124"));
    /// ```
    #[must_use]
    pub fn from_password(password: &str) -> Self {
        Self(hex::encode(Sha256::digest(password.as_bytes())))
    }

    /// Wrap a digest read back from storage.
    #[must_use]
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Whether `password` digests to this value.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let candidate = Sha256::digest(password.as_bytes());
        hex::decode(&self.0).is_ok_and(|stored| stored.as_slice() == candidate.as_slice())
    }

    /// Stored representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Identifier or password missing.
    MissingFields,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Username and password are required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `identifier` is normalised and non-empty; it matches a username or email.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use bookshelf::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Alice ", "password").unwrap();
/// assert_eq!(creds.identifier(), "alice");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw identifier/password inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let Some(identifier) = normalize(identifier) else {
            return Err(LoginValidationError::MissingFields);
        };
        if password.is_empty() {
            return Err(LoginValidationError::MissingFields);
        }

        Ok(Self {
            identifier,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username or email used for the lookup.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Reasons an account form is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// A required field was blank.
    MissingFields,
    /// Email lacks an `@`.
    InvalidEmail,
    /// Password shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort,
    /// Password and confirmation differ.
    PasswordMismatch,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "All fields are required"),
            Self::InvalidEmail => write!(f, "Please enter a valid email address"),
            Self::PasswordTooShort => write!(
                f,
                "Password must be at least {PASSWORD_MIN_LEN} characters long"
            ),
            Self::PasswordMismatch => write!(f, "Passwords do not match"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Validated registration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountForm {
    username: String,
    email: String,
    password: Zeroizing<String>,
}

impl AccountForm {
    /// Validate a self-service signup, which repeats the password.
    pub fn signup(
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, AccountValidationError> {
        if confirm_password.is_empty() {
            return Err(AccountValidationError::MissingFields);
        }
        let form = Self::try_from_parts(username, email, password)?;
        if password != confirm_password {
            return Err(AccountValidationError::PasswordMismatch);
        }
        Ok(form)
    }

    /// Validate an account created by an administrator.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AccountValidationError> {
        let (Some(username), Some(email)) = (normalize(username), normalize(email)) else {
            return Err(AccountValidationError::MissingFields);
        };
        if password.is_empty() {
            return Err(AccountValidationError::MissingFields);
        }
        validate_email(&email)?;
        validate_password(password)?;
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Normalised email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Digest of the submitted password.
    pub fn password_hash(&self) -> PasswordHash {
        PasswordHash::from_password(&self.password)
    }
}

/// Reject emails without an `@`.
pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(AccountValidationError::InvalidEmail)
    }
}

/// Reject passwords shorter than [`PASSWORD_MIN_LEN`].
pub fn validate_password(password: &str) -> Result<(), AccountValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        Err(AccountValidationError::PasswordTooShort)
    } else {
        Ok(())
    }
}
