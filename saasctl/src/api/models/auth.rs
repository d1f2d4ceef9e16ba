//! API request/response models for signup and signin.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::AuthOutcome,
    errors::{Error, ErrorKey},
    types::{Locale, UserId},
};

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Request body for creating an account
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "a@example.com")]
    pub email: Option<String>,
    /// At least 8 characters with an uppercase letter, a lowercase letter and a digit
    #[schema(example = "Passw0rd")]
    pub password: Option<String>,
    /// `en` (default) or `es`
    #[schema(example = "en")]
    pub locale: Option<String>,
}

/// Request body for signing in
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SigninRequest {
    #[schema(example = "a@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signup input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub email: String,
    pub password: String,
    pub locale: Locale,
}

/// Signin input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignin {
    pub email: String,
    pub password: String,
}

/// Token issued on signup and signin
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub user_id: UserId,
    pub email: String,
}

impl From<AuthOutcome> for AuthResponse {
    fn from(outcome: AuthOutcome) -> Self {
        Self {
            token: outcome.token,
            user_id: outcome.user_id,
            email: outcome.email,
        }
    }
}

fn invalid(key: ErrorKey) -> Error {
    Error::Validation { key }
}

/// Loose address check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn validate_email(email: Option<String>) -> Result<String, Error> {
    email
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| invalid(ErrorKey::InvalidEmail))
}

fn validate_new_password(password: Option<String>) -> Result<String, Error> {
    let password = password.ok_or_else(|| invalid(ErrorKey::PasswordTooShort))?;

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(invalid(ErrorKey::PasswordTooShort));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid(ErrorKey::PasswordUppercase));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(invalid(ErrorKey::PasswordLowercase));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid(ErrorKey::PasswordDigit));
    }

    Ok(password)
}

impl SignupRequest {
    /// Check fields in declaration order; the first failure wins.
    pub fn validate(self) -> Result<ValidSignup, Error> {
        let email = validate_email(self.email)?;
        let password = validate_new_password(self.password)?;
        let locale = match self.locale.as_deref() {
            None => Locale::default(),
            Some(raw) => raw.parse().map_err(|_| invalid(ErrorKey::InvalidLocale))?,
        };

        Ok(ValidSignup { email, password, locale })
    }
}

impl SigninRequest {
    pub fn validate(self) -> Result<ValidSignin, Error> {
        let email = validate_email(self.email)?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid(ErrorKey::PasswordRequired))?;

        Ok(ValidSignin { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str, password: &str, locale: Option<&str>) -> Result<ValidSignup, ErrorKey> {
        SignupRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            locale: locale.map(str::to_string),
        }
        .validate()
        .map_err(|e| e.key())
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));

        for bad in ["", "a", "a@", "@x.com", "a@x", "a@x.", "a@@x.com", "a b@x.com", "a@x..com"] {
            assert!(!is_valid_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_signup_password_rules_in_order() {
        assert_eq!(signup("a@x.com", "Sh0rt", None), Err(ErrorKey::PasswordTooShort));
        assert_eq!(signup("a@x.com", "passw0rd", None), Err(ErrorKey::PasswordUppercase));
        assert_eq!(signup("a@x.com", "PASSW0RD", None), Err(ErrorKey::PasswordLowercase));
        assert_eq!(signup("a@x.com", "Password", None), Err(ErrorKey::PasswordDigit));
    }

    #[test]
    fn test_signup_first_failing_field_wins() {
        assert_eq!(signup("not-an-email", "short", Some("fr")), Err(ErrorKey::InvalidEmail));
        assert_eq!(signup("a@x.com", "short", Some("fr")), Err(ErrorKey::PasswordTooShort));
        assert_eq!(signup("a@x.com", "Passw0rd", Some("fr")), Err(ErrorKey::InvalidLocale));
    }

    #[test]
    fn test_signup_locale_defaults_to_en() {
        let valid = signup("a@x.com", "Passw0rd", None).unwrap();
        assert_eq!(valid.locale, Locale::En);

        let valid = signup("a@x.com", "Passw0rd", Some("es")).unwrap();
        assert_eq!(valid.locale, Locale::Es);
    }

    #[test]
    fn test_signup_missing_fields() {
        let err = SignupRequest::default().validate().unwrap_err();
        assert_eq!(err.key(), ErrorKey::InvalidEmail);
    }

    #[test]
    fn test_signin_requires_password() {
        let err = SigninRequest {
            email: Some("a@x.com".to_string()),
            password: Some(String::new()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.key(), ErrorKey::PasswordRequired);

        // Signin does not re-apply the complexity rules
        let valid = SigninRequest {
            email: Some("a@x.com".to_string()),
            password: Some("x".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.password, "x");
    }

    #[test]
    fn test_auth_response_is_camel_case() {
        let json = serde_json::to_value(AuthResponse {
            token: "t".to_string(),
            user_id: 5,
            email: "a@x.com".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"token": "t", "userId": 5, "email": "a@x.com"}));
    }
}
