//! Identity pool: the bounded set of customer identifiers
//!
//! Identifiers come from a CSV export (first column, header row skipped) when
//! one is available. A missing or unusable file is never fatal: the pool falls
//! back to sequential synthetic identifiers and logs a warning.
//!
//! # Invariants
//!
//! 1. `len() <= cap`, whatever the size of the source file
//! 2. No duplicate identifiers (first occurrence wins)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// First identifier handed out when the pool is synthesized
pub const SYNTHETIC_ID_BASE: i64 = 100_000;

/// Default population cap
pub const DEFAULT_POPULATION_CAP: usize = 30;

/// Customer identifier
///
/// Carried on the wire as a 64-bit integer `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl CustomerId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CustomerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Where the pool's identifiers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Read from the configured CSV file
    File,
    /// Synthesized sequentially from [`SYNTHETIC_ID_BASE`]
    Synthetic,
}

/// Ordered, deduplicated, capped list of customer identifiers
///
/// # Example
/// ```
/// use fraud_txgen_core::identity::{IdentityPool, IdentitySource, SYNTHETIC_ID_BASE};
///
/// let pool = IdentityPool::synthetic(3);
/// assert_eq!(pool.len(), 3);
/// assert_eq!(pool.source(), IdentitySource::Synthetic);
/// assert_eq!(pool.ids()[0].value(), SYNTHETIC_ID_BASE);
/// ```
#[derive(Debug, Clone)]
pub struct IdentityPool {
    ids: Vec<CustomerId>,
    source: IdentitySource,
}

impl IdentityPool {
    /// Load identifiers from `path`, falling back to synthetic ones
    ///
    /// Never fails. The fallback is taken when no path is configured, when
    /// the file cannot be read, or when it yields no usable identifier.
    pub fn load(path: Option<&Path>, cap: usize) -> Self {
        let Some(path) = path else {
            warn!(cap, "No identifier source configured, synthesizing identifiers");
            return Self::synthetic(cap);
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let pool = Self::from_csv(&contents, cap);
                if pool.is_empty() && cap > 0 {
                    warn!(
                        path = %path.display(),
                        cap,
                        "Identifier source has no usable rows, synthesizing identifiers"
                    );
                    return Self::synthetic(cap);
                }
                info!(path = %path.display(), count = pool.len(), "Loaded customer identifiers");
                pool
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    cap,
                    "Identifier source unreadable, synthesizing identifiers"
                );
                Self::synthetic(cap)
            }
        }
    }

    /// Parse CSV text: header skipped, first column taken, capped at `cap`
    pub fn from_csv(contents: &str, cap: usize) -> Self {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for (line_no, line) in contents.lines().enumerate().skip(1) {
            if ids.len() >= cap {
                break;
            }

            let field = first_field(line);
            let first = field.trim();
            if first.is_empty() {
                continue;
            }

            match first.parse::<i64>() {
                Ok(value) => {
                    if seen.insert(value) {
                        ids.push(CustomerId(value));
                    }
                }
                Err(_) => {
                    debug!(line = line_no + 1, value = first, "Skipping non-numeric identifier");
                }
            }
        }

        Self {
            ids,
            source: IdentitySource::File,
        }
    }

    /// `cap` sequential identifiers starting at [`SYNTHETIC_ID_BASE`]
    pub fn synthetic(cap: usize) -> Self {
        let ids = (0..cap as i64)
            .map(|offset| CustomerId(SYNTHETIC_ID_BASE + offset))
            .collect();

        Self {
            ids,
            source: IdentitySource::Synthetic,
        }
    }

    pub fn ids(&self) -> &[CustomerId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }
}

/// First field of a CSV record
///
/// A quoted field runs to its closing quote, so embedded commas stay in the
/// value and `""` unescapes to `"`.
fn first_field(line: &str) -> String {
    let line = line.trim_start();
    let Some(quoted) = line.strip_prefix('"') else {
        return line.split(',').next().unwrap_or("").to_string();
    };

    let mut field = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                break;
            }
        } else {
            field.push(c);
        }
    }
    field
}
