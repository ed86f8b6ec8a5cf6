//! Wire-level constants shared by the codec, the signature chain, and the SDK.

/// TXT field carrying the number of base64 payload chunks.
pub const TXT_ZF_PARTS: &str = "zf-parts";

/// Prefix of the zero-based chunk fields (`zf0`, `zf1`, ...).
pub const TXT_ZF_PIECE_PREFIX: &str = "zf";

/// TXT field carrying the base64 signature.
pub const TXT_SIG: &str = "sig";

/// TXT field carrying the tagged owner key entry.
pub const TXT_PUB_KEY: &str = "pub-key";

/// TXT field carrying the record's sequence number.
pub const TXT_SEQUENCE_N: &str = "sequence-n";

/// Prefix of every tagged key entry (`data:<type>:<data>`).
pub const KEY_ENTRY_PREFIX: &str = "data:";

/// Type tag of a compressed-hex ECDSA public key entry.
pub const KEY_TYPE_EC_HEX: &str = "echex";

/// Reserved TXT name prefix for subdomain bookkeeping entries.
pub const SUBDOMAIN_NAME_PREFIX: &str = "_subd.";

/// How many characters of base64 text go into one chunk field.
///
/// A `zf99=`-style key prefix costs 5 of the 255-character ceiling a single
/// TXT wire string may occupy.
pub const ZONEFILE_CHUNK_LEN: usize = 250;

/// Wire key of the chunk field at `index` (`zf0`, `zf1`, ...).
pub fn zf_piece_key(index: usize) -> String {
    format!("{TXT_ZF_PIECE_PREFIX}{index}")
}
