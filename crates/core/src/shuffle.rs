//! Seeded permutations for question and choice order.
//!
//! A seeded shuffle draws one Mulberry32 key per element and stable-sorts by
//! key, so the same `(sequence, seed)` pair yields the same order on every run.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Upper bound (exclusive) for generated seeds.
const GENERATED_SEED_RANGE: u32 = 1_000_000_000;

//
// ─── SEED ──────────────────────────────────────────────────────────────────────
//

/// 32-bit seed driving every permutation of a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Seed(u32);

impl Seed {
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Reduce an arbitrary integer to 32 bits (two's-complement wrap).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_i64_wrapping(value: i64) -> Self {
        Self(value as u32)
    }

    /// Draw a fresh seed in `[0, 1_000_000_000)`.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::rng().random_range(0..GENERATED_SEED_RANGE))
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for Seed {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self::from_i64_wrapping)
    }
}

// Older records stored the seed as a string.
impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Ok(Self::from_i64_wrapping(value)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.0)
    }
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// Mulberry32: a 32-bit state generator with good mixing for its size.
///
/// Not suitable for anything security related.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self { state: seed.0 }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

//
// ─── SUB-SEEDS ─────────────────────────────────────────────────────────────────
//

/// How a question's choice-order seed is derived from the session seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubSeed {
    /// Base seed plus the 32-bit FNV-1a hash of the question id.
    #[default]
    Fnv1a,
    /// Base seed plus the id length in UTF-16 units, added numerically. Ids of
    /// equal length share a choice order. Matches older sessions whose seed was
    /// generated, not ones started from an explicit seed parameter, which
    /// joined seed and length as text (`"42"` and 2 gave 422).
    IdLength,
}

impl SubSeed {
    #[must_use]
    pub fn derive(self, base: Seed, question_id: &str) -> Seed {
        let offset = match self {
            SubSeed::Fnv1a => fnv1a_32(question_id.as_bytes()),
            SubSeed::IdLength => {
                u32::try_from(question_id.encode_utf16().count()).unwrap_or(u32::MAX)
            }
        };
        Seed(base.0.wrapping_add(offset))
    }
}

fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811C_9DC5_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}

//
// ─── SHUFFLE ───────────────────────────────────────────────────────────────────
//

/// Permute `items`; reproducible when a seed is given.
///
/// Without a seed the thread RNG is used, which is only meant as a fallback.
#[must_use]
pub fn shuffle<T>(items: Vec<T>, seed: Option<Seed>) -> Vec<T> {
    let Some(seed) = seed else {
        let mut items = items;
        items.shuffle(&mut rand::rng());
        return items;
    };

    let mut rng = Mulberry32::new(seed);
    let mut keyed: Vec<(u32, T)> = items
        .into_iter()
        .map(|item| (rng.next_u32(), item))
        .collect();
    // `sort_by_key` is stable: equal keys keep input order.
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Seeded permutation of `0..len`.
#[must_use]
pub fn permutation(len: usize, seed: Seed) -> Vec<usize> {
    shuffle((0..len).collect(), Some(seed))
}
