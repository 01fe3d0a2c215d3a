//! Store-assigned 12-byte object identifiers.
//!
//! Layout: 4-byte big-endian unix seconds, 5 bytes unique to the process,
//! 3-byte big-endian counter. Rendered as 24 lowercase hex characters,
//! which is also the form used inside cache keys.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Length of an object id in bytes.
pub const OBJECT_ID_LEN: usize = 12;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Errors produced when parsing an object id from its hex form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("invalid id length: expected 24 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid id format: {0}")]
    InvalidHex(String),
}

/// A 12-byte identifier assigned when an entity is first stored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Generates a fresh id from the current time.
    pub fn new() -> Self {
        let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        Self::from_parts(seconds, *process_unique(), next_counter())
    }

    /// Builds an id from its components. Only the low 24 bits of `counter` are kept.
    pub fn from_parts(timestamp: u32, unique: [u8; 5], counter: u32) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&unique);
        bytes[9..].copy_from_slice(&(counter & COUNTER_MASK).to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Seconds since the unix epoch at which the id was generated.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the 24-character hex form.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasktrack_core::task::ObjectId;
    ///
    /// let id = ObjectId::parse_str("65f1c0de00112233445566aa").unwrap();
    /// assert_eq!(id.to_hex(), "65f1c0de00112233445566aa");
    ///
    /// assert!(ObjectId::parse_str("not-an-id").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(ObjectIdError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ObjectIdError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_str(&s).map_err(serde::de::Error::custom)
    }
}

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
        .fetch_add(1, Ordering::Relaxed)
        & COUNTER_MASK
}
