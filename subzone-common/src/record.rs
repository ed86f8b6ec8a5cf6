//! The subdomain record: identity, sequence, payload, and its TXT wire codec.
//!
//! A record is packed into an ordered list of `key=value` wire strings. The
//! order is fixed and canonical, because the signature chain commits to the
//! concatenation of exactly these strings:
//!
//! ```text
//! pub-key=data:echex:<hex>
//! sequence-n=<n>
//! zf-parts=<count>
//! zf0=<base64 chunk> .. zfN-1=<base64 chunk>
//! sig=<base64>            (only once signed)
//! ```
//!
//! The payload (the subdomain's own embedded zonefile document) is base64
//! encoded and split into 250-character chunks so each wire string stays
//! under the 255-character ceiling including its key prefix.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    constants::{
        zf_piece_key, TXT_PUB_KEY, TXT_SEQUENCE_N, TXT_SIG, TXT_ZF_PARTS, ZONEFILE_CHUNK_LEN,
    },
    crypto::{Keypair, PublicKey, SignatureError},
    keys::{KeyEntry, KeyEntryError},
    zonefile::{TxtRecord, TxtValue, Zonefile},
};

/// One subdomain's state at one point in its succession chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainRecord {
    name: String,
    key: KeyEntry,
    sequence: u64,
    payload: Vec<u8>,
    signature: Option<String>,
}

impl SubdomainRecord {
    /// Construct a fresh, unsigned record.
    ///
    /// The first record of a name (`sequence == 0`) stays unsigned by
    /// design; succession integrity begins at the second record.
    pub fn new(
        name: impl Into<String>,
        key: KeyEntry,
        sequence: u64,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            sequence,
            payload,
            signature: None,
        }
    }

    // === Getters ===

    /// The subdomain name this record belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner key entry embedded in this record.
    pub fn key(&self) -> &KeyEntry {
        &self.key
    }

    /// Position of this record in its subdomain's succession chain.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The embedded zonefile document, carried verbatim through chunking.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The base64 signature, if this record has been signed.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    // === Public Methods ===

    /// Pack this record into its ordered list of TXT wire strings.
    pub fn pack(&self) -> Result<Vec<String>, EncodeError> {
        let encoded = STANDARD.encode(&self.payload);
        let parts = chunk_count(encoded.len());

        let mut output = Vec::with_capacity(parts + 4);
        output.push(encode_key_value(TXT_PUB_KEY, &self.key.encode()?));
        output.push(encode_key_value(TXT_SEQUENCE_N, &self.sequence.to_string()));
        output.push(encode_key_value(TXT_ZF_PARTS, &parts.to_string()));

        for index in 0..parts {
            let start = index * ZONEFILE_CHUNK_LEN;
            let end = (start + ZONEFILE_CHUNK_LEN).min(encoded.len());
            let piece = &encoded[start..end];
            if piece.is_empty() {
                return Err(EncodeError::EmptyChunk { index });
            }
            output.push(encode_key_value(&zf_piece_key(index), piece));
        }

        if let Some(sig) = &self.signature {
            output.push(encode_key_value(TXT_SIG, sig));
        }

        Ok(output)
    }

    /// The canonical byte sequence this record's signature commits to:
    /// the packed wire strings, in order, excluding the `sig` entry itself.
    pub fn signable_plaintext(&self) -> Result<Vec<u8>, EncodeError> {
        let mut packed = self.pack()?;
        if self.signature.is_some() {
            packed.pop();
        }
        Ok(packed.concat().into_bytes())
    }

    /// Sign this record with the *predecessor's* keypair.
    ///
    /// The previous key holder signs off on the new state, including any new
    /// owner key embedded in it; that is what authorizes the transition.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), EncodeError> {
        let plaintext = self.signable_plaintext()?;
        self.signature = Some(keypair.sign(&plaintext));
        Ok(())
    }

    /// Verify this record's signature against `public_key` (the
    /// predecessor's owner key).
    ///
    /// `Ok(false)` means a structurally valid but wrong signature; malformed
    /// signature encoding or an unencodable record surface as errors.
    pub fn verify(&self, public_key: &PublicKey) -> Result<bool, VerifyError> {
        let sig = self.signature.as_deref().ok_or(VerifyError::MissingSignature)?;
        let plaintext = self.signable_plaintext()?;
        Ok(public_key.verify(&plaintext, sig)?)
    }

    /// Embed this record as a zonefile TXT entry under its own name.
    pub fn as_txt_record(&self) -> Result<TxtRecord, EncodeError> {
        Ok(TxtRecord {
            name: self.name.clone(),
            txt: TxtValue::List(self.pack()?),
        })
    }

    /// Parse a subdomain record out of a zonefile TXT entry.
    pub fn parse(record: &TxtRecord) -> Result<Self, ParseError> {
        let TxtValue::List(items) = &record.txt else {
            return Err(ParseError::SingleCharacterString);
        };

        let mut entries: HashMap<String, String> = HashMap::with_capacity(items.len());
        for item in items {
            let (item_key, value) = split_key_value(item)?;
            if entries.insert(item_key.to_string(), value).is_some() {
                return Err(ParseError::DuplicateKey(item_key.to_string()));
            }
        }

        let key = KeyEntry::decode(required(&entries, TXT_PUB_KEY)?)?;
        let sequence = parse_number(&entries, TXT_SEQUENCE_N)?;
        let parts = parse_number::<usize>(&entries, TXT_ZF_PARTS)?;

        let mut encoded = String::new();
        for index in 0..parts {
            let piece = entries
                .get(&zf_piece_key(index))
                .ok_or(ParseError::MissingChunk(index))?;
            encoded.push_str(piece);
        }
        let payload = STANDARD.decode(encoded)?;

        Ok(Self {
            name: record.name.clone(),
            key,
            sequence,
            payload,
            signature: entries.get(TXT_SIG).cloned(),
        })
    }
}

/// True iff `record` is shaped like a subdomain record: list-valued with a
/// `zf-parts` field. Filters ordinary TXT entries without a full parse.
pub fn is_subdomain_record(record: &TxtRecord) -> bool {
    let probe = [TXT_ZF_PARTS, "="].concat();
    match &record.txt {
        TxtValue::List(items) => items.iter().any(|entry| entry.starts_with(&probe)),
        TxtValue::Single(_) => false,
    }
}

/// The subdomain records of one zonefile snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecords {
    /// Records that parsed cleanly, in zonefile order.
    pub records: Vec<SubdomainRecord>,
    /// Entries that looked like subdomain records but failed to parse,
    /// keyed by their TXT name. Skipping them never loses their siblings.
    pub skipped: Vec<(String, ParseError)>,
}

/// Parse every subdomain-flavored TXT entry of one zonefile snapshot.
///
/// A wire error in one entry skips only that entry. A duplicate subdomain
/// *name* within the snapshot invalidates the snapshot as a whole: partial
/// application would make in-snapshot order load-bearing, which the wire
/// format does not define.
pub fn extract_from_zonefile(zonefile: &Zonefile) -> Result<SnapshotRecords, ParseError> {
    let mut snapshot = SnapshotRecords::default();

    for entry in zonefile.txt.iter().filter(|r| is_subdomain_record(r)) {
        match SubdomainRecord::parse(entry) {
            Ok(record) => {
                if snapshot.records.iter().any(|r| r.name == record.name) {
                    return Err(ParseError::DuplicateSubdomain(record.name));
                }
                snapshot.records.push(record);
            }
            Err(error) => snapshot.skipped.push((entry.name.clone(), error)),
        }
    }

    Ok(snapshot)
}

/// Chunks needed for `len` characters of base64 text. An exact multiple of
/// the chunk length produces no trailing empty chunk; empty text produces
/// zero chunks.
fn chunk_count(len: usize) -> usize {
    len.div_ceil(ZONEFILE_CHUNK_LEN)
}

fn encode_key_value(key: &str, value: &str) -> String {
    format!("{key}={}", value.replace('=', "\\="))
}

/// Split a wire string on its first unescaped `=`, unescaping the value.
fn split_key_value(entry: &str) -> Result<(&str, String), ParseError> {
    let mut escaped = false;
    for (index, byte) in entry.bytes().enumerate() {
        match byte {
            b'=' if !escaped => {
                let value = entry[index + 1..].replace("\\=", "=");
                return Ok((&entry[..index], value));
            }
            b'\\' => escaped = true,
            _ => escaped = false,
        }
    }
    Err(ParseError::MissingSeparator(entry.to_string()))
}

fn required<'a>(
    entries: &'a HashMap<String, String>,
    field: &'static str,
) -> Result<&'a str, ParseError> {
    entries
        .get(field)
        .map(String::as_str)
        .ok_or(ParseError::MissingField(field))
}

fn parse_number<T: std::str::FromStr>(
    entries: &HashMap<String, String>,
    field: &'static str,
) -> Result<T, ParseError> {
    let value = required(entries, field)?;
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[derive(thiserror::Error, Debug)]
/// Error packing a record into its wire strings.
pub enum EncodeError {
    #[error(transparent)]
    /// The owner key entry cannot be encoded
    Key(#[from] KeyEntryError),
    #[error("chunk {index} of the encoded payload is empty")]
    /// The chunking arithmetic produced a declared zero-length chunk
    EmptyChunk {
        /// Index of the offending chunk.
        index: usize,
    },
}

#[derive(thiserror::Error, Debug)]
/// Error verifying a record's signature.
pub enum VerifyError {
    #[error("record has no signature to verify")]
    /// Record has no signature to verify
    MissingSignature,
    #[error(transparent)]
    /// The record could not be packed into its canonical plaintext
    Encode(#[from] EncodeError),
    #[error(transparent)]
    /// The signature's wire encoding is malformed
    Signature(#[from] SignatureError),
}

#[derive(thiserror::Error, Debug, Clone)]
/// Wire-format error parsing a subdomain record out of a TXT entry.
pub enum ParseError {
    #[error("tried to parse a TXT record with only a single <character-string>")]
    /// The TXT entry carries a single string instead of a list
    SingleCharacterString,
    #[error("TXT entry has no key=value separator: `{0}`")]
    /// A wire string has no unescaped `=` separator
    MissingSeparator(String),
    #[error("duplicate key `{0}` in subdomain TXT entry")]
    /// The same key appears twice within one record
    DuplicateKey(String),
    #[error("missing required field `{0}`")]
    /// A required field is absent
    MissingField(&'static str),
    #[error("field `{field}` is not a valid number: `{value}`")]
    /// A numeric field does not parse
    InvalidNumber {
        /// The offending field name.
        field: &'static str,
        /// The value that failed to parse.
        value: String,
    },
    #[error("missing zonefile chunk {0}")]
    /// A declared chunk index is absent
    MissingChunk(usize),
    #[error("payload is not valid base64")]
    /// The reassembled payload is not valid base64
    Payload(#[from] base64::DecodeError),
    #[error(transparent)]
    /// The owner key entry is malformed
    Key(#[from] KeyEntryError),
    #[error("duplicate subdomain `{0}` in one zonefile snapshot")]
    /// Two TXT entries in one snapshot carry the same subdomain name
    DuplicateSubdomain(String),
}
