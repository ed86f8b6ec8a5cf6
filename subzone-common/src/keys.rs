//! Tagged wire form of a subdomain's owning public key.
//!
//! Owner keys travel inside `pub-key` TXT fields as `data:<type>:<data>`.
//! Only the `echex` type (compressed SEC1 hex of an ECDSA key) is understood
//! today; other type tags decode opaquely so future key schemes round-trip
//! through storage, but they cannot be encoded and cannot authorize
//! successors.

use crate::{
    constants::{KEY_ENTRY_PREFIX, KEY_TYPE_EC_HEX},
    crypto::{PublicKey, PublicKeyError},
};

/// A decoded `pub-key` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEntry {
    /// A compressed-hex ECDSA public key (`data:echex:<hex>`).
    Ec(PublicKey),
    /// A key type this implementation does not understand, carried opaquely.
    Unknown {
        /// The unrecognized type tag.
        scheme: String,
        /// The tag's payload, uninterpreted.
        data: String,
    },
}

impl KeyEntry {
    /// Encode this entry into its `data:<type>:<data>` wire form.
    ///
    /// Only the EC variant is encodable today; an [KeyEntry::Unknown] entry
    /// fails with [KeyEntryError::UnsupportedKeyType] rather than guessing
    /// at a representation.
    pub fn encode(&self) -> Result<String, KeyEntryError> {
        match self {
            KeyEntry::Ec(key) => Ok(format!("{KEY_ENTRY_PREFIX}{KEY_TYPE_EC_HEX}:{}", key.to_hex())),
            KeyEntry::Unknown { scheme, .. } => {
                Err(KeyEntryError::UnsupportedKeyType(scheme.clone()))
            }
        }
    }

    /// Decode a `data:<type>:<data>` wire entry.
    pub fn decode(value: &str) -> Result<Self, KeyEntryError> {
        let rest = value
            .strip_prefix(KEY_ENTRY_PREFIX)
            .ok_or(KeyEntryError::MissingPrefix)?;
        let (scheme, data) = rest.split_once(':').ok_or(KeyEntryError::MissingTypeTag)?;

        if scheme == KEY_TYPE_EC_HEX {
            Ok(KeyEntry::Ec(PublicKey::from_hex(data)?))
        } else {
            Ok(KeyEntry::Unknown {
                scheme: scheme.to_string(),
                data: data.to_string(),
            })
        }
    }

    /// The EC public key behind this entry, if it is the EC variant.
    pub fn as_ec(&self) -> Option<&PublicKey> {
        match self {
            KeyEntry::Ec(key) => Some(key),
            KeyEntry::Unknown { .. } => None,
        }
    }
}

impl From<PublicKey> for KeyEntry {
    fn from(key: PublicKey) -> Self {
        KeyEntry::Ec(key)
    }
}

impl TryFrom<&str> for KeyEntry {
    type Error = KeyEntryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::decode(value)
    }
}

#[derive(thiserror::Error, Debug, Clone)]
/// Error encoding or decoding a `pub-key` entry.
pub enum KeyEntryError {
    #[error("key entry should start with the `data:` prefix")]
    /// Key entry should start with the `data:` prefix
    MissingPrefix,
    #[error("key entry is missing its type tag")]
    /// Key entry is missing its type tag
    MissingTypeTag,
    #[error("no support for encoding `{0}` key entries")]
    /// No support for encoding this key type
    UnsupportedKeyType(String),
    #[error(transparent)]
    /// The `echex` payload is not a valid public key
    PublicKey(#[from] PublicKeyError),
}
