//! CB58: base58 over the payload followed by the last four bytes of its
//! SHA-256 digest. Binary values (transactions, UTXOs, genesis blobs) travel
//! in this form.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

const CHECKSUM_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum Cb58Error {
    #[error("invalid base58 text: {0}")]
    Base58(#[from] bs58::decode::Error),
    #[error("decoded {len} bytes, shorter than the {CHECKSUM_LEN}-byte checksum")]
    TooShort { len: usize },
    #[error("checksum mismatch")]
    ChecksumMismatch,
}

#[must_use]
pub fn encode(payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum(payload));
    bs58::encode(buf).into_string()
}

pub fn decode(text: &str) -> Result<Vec<u8>, Cb58Error> {
    let mut raw = bs58::decode(text).into_vec()?;
    if raw.len() < CHECKSUM_LEN {
        return Err(Cb58Error::TooShort { len: raw.len() });
    }
    let split = raw.len() - CHECKSUM_LEN;
    if raw[split..] != checksum(&raw[..split]) {
        return Err(Cb58Error::ChecksumMismatch);
    }
    raw.truncate(split);
    Ok(raw)
}

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

/// Raw bytes that serialize to and from CB58 text.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Cb58Bytes(pub Vec<u8>);

impl Cb58Bytes {
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Cb58Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cb58Bytes({})", encode(&self.0))
    }
}

impl Serialize for Cb58Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Cb58Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).map(Self).map_err(de::Error::custom)
    }
}
