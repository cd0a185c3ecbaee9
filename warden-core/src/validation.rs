use crate::error::{ValidationError, utilities::RequiredFieldExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Input validation for the login and password reset flows.
///
/// Validators return values, never panic: a rejected input is an `Err(ValidationError)`
/// carrying a message the caller can show to the user as-is.
///
/// Conservative email grammar, applied after trimming and lowercasing.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("Invalid email regex pattern")
});

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex pattern"));

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Three-tier password strength label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordStrength::Weak => write!(f, "weak"),
            PasswordStrength::Medium => write!(f, "medium"),
            PasswordStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Trim and lowercase an email so it can be used as a storage key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address and returns its normalized form
///
/// # Examples
///
/// ```rust
/// use warden_core::validation::validate_email;
///
/// assert_eq!(validate_email("  A.B@C.com ").unwrap(), "a.b@c.com");
/// assert!(validate_email("a..b@c.com").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let normalized = Some(normalize_email(email))
        .filter(|e| !e.is_empty())
        .require_field("Email")?;

    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if !EMAIL_REGEX.is_match(&normalized)
        || normalized.contains("..")
        || normalized.starts_with('.')
        || normalized.ends_with('.')
    {
        return Err(ValidationError::InvalidEmail(normalized));
    }

    Ok(normalized)
}

/// Validates a password and classifies its strength
///
/// Passwords shorter than six characters are rejected. Otherwise one point is
/// scored for each of: at least 8 characters, at least 12 characters, a lowercase
/// letter, an uppercase letter, a digit, a symbol. Five or more points is strong,
/// three or more is medium, anything less is weak.
///
/// # Examples
///
/// ```rust
/// use warden_core::validation::{validate_password, PasswordStrength};
///
/// assert_eq!(validate_password("Tr0ub4dor&3").unwrap(), PasswordStrength::Strong);
/// assert!(validate_password("abc").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<PasswordStrength, ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let checks = [
        length >= 8,
        length >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|&&passed| passed).count();

    Ok(match score {
        5.. => PasswordStrength::Strong,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Weak,
    })
}

/// Strips markup and unusual characters from a display name
///
/// HTML tags are removed first, then anything other than word characters,
/// whitespace, `.` and `-`. The result is trimmed and capped at 50 characters.
pub fn sanitize_username(username: &str) -> String {
    let without_tags = HTML_TAG_REGEX.replace_all(username, "");
    without_tags
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '.' || *c == '-'
        })
        .collect::<String>()
        .trim()
        .chars()
        .take(MAX_USERNAME_LENGTH)
        .collect()
}

/// Masks the local part of an email for display and logging
///
/// `alice@example.com` becomes `a***@example.com`; values without an `@` are
/// returned unchanged.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let local_len = local.chars().count();
    if local_len <= 2 {
        let first: String = local.chars().take(1).collect();
        return format!("{first}***@{domain}");
    }

    let visible = (local_len / 3).min(2);
    let prefix: String = local.chars().take(visible).collect();
    format!("{prefix}***@{domain}")
}
