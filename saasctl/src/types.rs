//! Common type definitions.
//!
//! All entity ids are 64-bit database sequence values wrapped in type aliases:
//!
//! - [`UserId`]: account identifier
//! - [`PlanId`]: catalog entry identifier
//! - [`ProjectId`]: project identifier
//! - [`SubscriptionId`]: subscription identifier
//! - [`InvoiceId`]: invoice identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub type UserId = i64;
pub type PlanId = i64;
pub type ProjectId = i64;
pub type SubscriptionId = i64;
pub type InvoiceId = i64;

/// Preferred display language of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_locale", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("es".parse::<Locale>(), Ok(Locale::Es));
        assert!("fr".parse::<Locale>().is_err());
        assert!("EN".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_serde() {
        assert_eq!(serde_json::to_string(&Locale::Es).unwrap(), "\"es\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::En);
    }
}
