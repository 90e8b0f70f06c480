//! Content-addressable cache of computed sums
//!
//! Every distinct integer multiset gets exactly one [`ComputationRecord`]. Inputs are
//! normalized by sorting ascending, fingerprinted with SHA-256, and deduplicated on that
//! digest, so `[3, 1, 2]` and `[1, 2, 3]` resolve to the same id.
//!
//! Two indexes are kept:
//! - `by_id`: id → record
//! - `by_digest`: digest → id
//!
//! The check-then-insert in [`SumCache::submit`] runs while holding the `by_digest`
//! entry for the digest, so concurrent submissions of equal content serialize on that
//! entry and observe a single id. Submissions for different digests only contend when
//! they share a shard. Lock order is always `by_digest` before `by_id`; `lookup` only
//! touches `by_id`.
//!
//! Growth is unbounded; there is no eviction.

use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sums_common::uuid_utils;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const NOT_AN_INTEGER_ARRAY: &str = "`set` key must be an array of integers";

/// Cache failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Input is not an array of integers, or its sum leaves the i64 range
    #[error("{0}")]
    Validation(String),

    /// No record with this id
    #[error("sum {0} not found")]
    NotFound(String),

    /// `by_digest` points at an id that `by_id` does not hold
    #[error("digest {0} maps to a missing record")]
    Inconsistent(String),
}

/// SHA-256 fingerprint of a normalized (sorted) set
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetDigest([u8; 32]);

impl SetDigest {
    /// Fingerprint a normalized sequence
    ///
    /// Elements are fed as fixed-width little-endian bytes, so no two distinct
    /// sequences share an encoding.
    pub fn of(normalized: &[i64]) -> Self {
        let mut hasher = Sha256::new();
        for n in normalized {
            hasher.update(n.to_le_bytes());
        }
        Self(hasher.finalize().into())
    }

    /// First 8 hex chars, for logs
    pub fn short(&self) -> String {
        self.0[..4].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for SetDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0.iter().map(|b| format!("{:02x}", b)).collect();
        write!(f, "SetDigest({})", hex)
    }
}

/// Stored result for one distinct normalized set
#[derive(Debug, Clone)]
pub struct ComputationRecord {
    id: Uuid,
    normalized_set: Vec<i64>,
    sum: i64,
    digest: SetDigest,
}

impl ComputationRecord {
    /// Public projection (the digest stays internal)
    pub fn view(&self) -> SumView {
        SumView {
            set: self.normalized_set.clone(),
            sum: self.sum,
            id: self.id,
        }
    }
}

/// What callers get back: `{ set, sum, id }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SumView {
    pub set: Vec<i64>,
    pub sum: i64,
    pub id: Uuid,
}

/// Process-wide content-addressable store of sums
#[derive(Default)]
pub struct SumCache {
    by_id: DashMap<Uuid, ComputationRecord>,
    by_digest: DashMap<SetDigest, Uuid>,
}

impl SumCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, normalize and store `input`, or return the existing record for equal content
    ///
    /// `input` must be a JSON array whose elements are all integers.
    pub fn submit(&self, input: &Value) -> Result<SumView, CacheError> {
        let set = parse_integers(input)?;
        self.submit_integers(set)
    }

    /// Typed entry point for callers that already hold integers
    pub fn submit_integers(&self, mut set: Vec<i64>) -> Result<SumView, CacheError> {
        set.sort_unstable();
        let digest = SetDigest::of(&set);

        // Read-only fast path for hits; the Ref is released before `entry` below.
        let existing = self.by_digest.get(&digest).map(|r| *r.value());
        if let Some(id) = existing {
            debug!(digest = %digest.short(), %id, "sums cache HIT");
            return self.view_by_id(id, digest);
        }

        match self.by_digest.entry(digest) {
            Entry::Occupied(entry) => {
                // Lost the race to a concurrent submission of the same content
                let id = *entry.get();
                debug!(digest = %digest.short(), %id, "sums cache HIT (after race)");
                self.view_by_id(id, digest)
            }
            Entry::Vacant(entry) => {
                let sum = checked_sum(&set)?;
                let id = uuid_utils::generate();
                let record = ComputationRecord {
                    id,
                    normalized_set: set,
                    sum,
                    digest,
                };
                let view = record.view();

                self.by_id.insert(id, record);
                entry.insert(id);

                debug!(digest = %digest.short(), %id, sum, "sums cache MISS, record stored");
                Ok(view)
            }
        }
    }

    /// Look up a record by its id string
    ///
    /// Ids are opaque: only the exact string `submit` handed out matches. Other
    /// spellings of the same UUID are unknown.
    pub fn lookup(&self, id: &str) -> Result<SumView, CacheError> {
        let not_found = || CacheError::NotFound(id.to_string());
        let uuid = uuid_utils::parse_canonical(id).ok_or_else(not_found)?;

        self.by_id
            .get(&uuid)
            .map(|record| record.view())
            .ok_or_else(not_found)
    }

    /// Number of distinct records stored
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn view_by_id(&self, id: Uuid, digest: SetDigest) -> Result<SumView, CacheError> {
        self.by_id
            .get(&id)
            .map(|record| {
                debug_assert_eq!(record.digest, digest);
                record.view()
            })
            .ok_or_else(|| CacheError::Inconsistent(digest.short()))
    }
}

/// Accept a JSON array of integers
///
/// Floats with no fractional part count as integers (`2.0` is `2`).
pub fn parse_integers(input: &Value) -> Result<Vec<i64>, CacheError> {
    let items = input
        .as_array()
        .ok_or_else(|| CacheError::Validation(NOT_AN_INTEGER_ARRAY.to_string()))?;

    items
        .iter()
        .map(as_integer)
        .collect::<Option<Vec<i64>>>()
        .ok_or_else(|| CacheError::Validation(NOT_AN_INTEGER_ARRAY.to_string()))
}

fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }

    let f = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn checked_sum(set: &[i64]) -> Result<i64, CacheError> {
    let total: i128 = set.iter().map(|&n| i128::from(n)).sum();
    i64::try_from(total).map_err(|_| {
        CacheError::Validation("sum of `set` exceeds the supported integer range".to_string())
    })
}
