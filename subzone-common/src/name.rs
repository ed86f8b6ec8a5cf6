//! Splitting fully-qualified addresses into (subdomain, domain).
//!
//! An on-chain name is two labels (`example.id`); a subdomain address nests
//! one more label under it (`alice.example.id`). Only the three-label form
//! addresses the subdomain layer.

use core::fmt;
use core::str::FromStr;

// On-chain name rules: lowercase alphanumerics plus `-`, `_` and `+`,
// 37 characters end to end.
const MAX_FQA_LEN: usize = 37;

/// A fully-qualified subdomain address, e.g. `alice.example.id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fqa {
    subdomain: String,
    domain: String,
}

impl Fqa {
    /// The leading subdomain label.
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// The on-chain domain hosting the subdomain (`<name>.<namespace>`).
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether `value` addresses the subdomain layer at all.
    pub fn is_subdomain(value: &str) -> bool {
        value.parse::<Self>().is_ok()
    }
}

impl FromStr for Fqa {
    type Err = NameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() > MAX_FQA_LEN {
            return Err(NameError::TooLong(value.len()));
        }

        let labels: Vec<&str> = value.split('.').collect();
        if labels.len() != 3 {
            return Err(NameError::NotASubdomain);
        }

        for label in &labels {
            if label.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            if let Some(bad) = label
                .chars()
                .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || "-_+".contains(*c)))
            {
                return Err(NameError::InvalidCharacter(bad));
            }
        }

        Ok(Self {
            subdomain: labels[0].to_string(),
            domain: format!("{}.{}", labels[1], labels[2]),
        })
    }
}

impl TryFrom<&str> for Fqa {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Fqa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.subdomain, self.domain)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Error parsing a fully-qualified subdomain address.
pub enum NameError {
    #[error("name is {0} characters, longer than the {MAX_FQA_LEN} character cap")]
    /// Name exceeds the on-chain length cap
    TooLong(usize),
    #[error("expected exactly three labels: <subdomain>.<name>.<namespace>")]
    /// Not a three-label subdomain address
    NotASubdomain,
    #[error("name contains an empty label")]
    /// Name contains an empty label
    EmptyLabel,
    #[error("invalid character `{0}` in name")]
    /// Character outside the on-chain name charset
    InvalidCharacter(char),
}
