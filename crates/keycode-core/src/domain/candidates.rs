//! Candidate key code ranges and the bisection halving rule.
//!
//! A discovery session starts from a contiguous numeric interval of key
//! codes that all share one modifier template.  Each round the operator
//! watches both halves being typed and names the half that produced the
//! wanted character; the candidate set is then replaced by that half.
//!
//! # Halving rule
//!
//! ```text
//! len = 5, mid = 5 / 2 = 2
//!
//!   index:  0  1 | 2  3  4
//!           first | second
//! ```
//!
//! `mid` uses floor division, so for odd sizes the **first** half is the
//! smaller one.  The halves always partition the set exactly: every index
//! lands in one half and never in both.

use std::str::FromStr;

use thiserror::Error;

use super::keycode::KeyCode;

/// Upper bound (exclusive) used when no bound is supplied.
pub const DEFAULT_MAX_CODE: u32 = 0x60;

// ── Bounds ────────────────────────────────────────────────────────────────────

/// A half-open interval `[min, max)` of key codes.
///
/// Constructing bounds never fails: reversed bounds are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBounds {
    min: u32,
    max: u32,
}

impl CodeBounds {
    /// Creates `[min, max)`, swapping the two when `min > max`.
    pub fn new(min: u32, max: u32) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// Creates bounds from an operator-facing inclusive range `start..=end`.
    ///
    /// The exclusive upper bound saturates at `u32::MAX`, so an `end` of
    /// `u32::MAX` itself is never included.
    pub fn inclusive(start: u32, end: u32) -> Self {
        let (lo, hi) = if start > end { (end, start) } else { (start, end) };
        Self::new(lo, hi.saturating_add(1))
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Number of codes in the interval.
    pub fn len(&self) -> usize {
        (self.max - self.min) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }
}

impl Default for CodeBounds {
    /// `[0, 0x60)`.
    fn default() -> Self {
        Self::new(0, DEFAULT_MAX_CODE)
    }
}

impl From<u32> for CodeBounds {
    /// `[0, max)`.
    fn from(max: u32) -> Self {
        Self::new(0, max)
    }
}

impl From<(u32, u32)> for CodeBounds {
    fn from((min, max): (u32, u32)) -> Self {
        Self::new(min, max)
    }
}

/// Expands `template` over every code in `bounds`, in ascending order.
///
/// The template's own code is ignored; its four modifier flags are copied
/// onto every generated value.
///
/// # Example
///
/// ```rust
/// use keycode_core::{generate_with_template, KeyCode};
///
/// let codes = generate_with_template(KeyCode::shifted(0), (2, 5));
/// let raw: Vec<u32> = codes.iter().map(|k| k.code()).collect();
/// assert_eq!(raw, vec![2, 3, 4]);
/// assert!(codes.iter().all(|k| k.has_shift()));
/// ```
pub fn generate_with_template(template: KeyCode, bounds: impl Into<CodeBounds>) -> Vec<KeyCode> {
    let bounds = bounds.into();
    let mut result = Vec::with_capacity(bounds.len());
    result.extend((bounds.min..bounds.max).map(|code| template.with_code(code)));
    result
}

// ── Half selection ────────────────────────────────────────────────────────────

/// Which half of the current candidate set the operator picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    /// Indices `[0, mid)`; answered as `1`.
    First,
    /// Indices `[mid, len)`; answered as `2`.
    Second,
}

/// Returned when operator input does not name a half.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid number, must be 1 or 2")]
pub struct HalfParseError;

impl TryFrom<i8> for Half {
    type Error = HalfParseError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Half::First),
            2 => Ok(Half::Second),
            _ => Err(HalfParseError),
        }
    }
}

impl FromStr for Half {
    type Err = HalfParseError;

    /// Accepts `"1"` or `"2"` (surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i8 = s.trim().parse().map_err(|_| HalfParseError)?;
        Half::try_from(n)
    }
}

// ── Candidate set ─────────────────────────────────────────────────────────────

/// The ordered pool of key codes still consistent with the operator's answers.
///
/// Invariants: all members share one modifier template and their codes are
/// strictly increasing.  The only ways to obtain a `CandidateSet` are
/// [`CandidateSet::from_range`] and [`CandidateSet::narrow`], both of which
/// preserve the invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    codes: Vec<KeyCode>,
}

impl CandidateSet {
    /// Generates the initial set for one discovery session.
    pub fn from_range(template: KeyCode, bounds: impl Into<CodeBounds>) -> Self {
        Self {
            codes: generate_with_template(template, bounds),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Index where the second half begins: `len / 2`, rounded down.
    pub fn mid(&self) -> usize {
        self.codes.len() / 2
    }

    /// The two halves `[0, mid)` and `[mid, len)`.
    pub fn halves(&self) -> (&[KeyCode], &[KeyCode]) {
        self.codes.split_at(self.mid())
    }

    /// Every candidate in typing order.
    pub fn as_slice(&self) -> &[KeyCode] {
        &self.codes
    }

    pub fn first(&self) -> Option<&KeyCode> {
        self.codes.first()
    }

    pub fn last(&self) -> Option<&KeyCode> {
        self.codes.last()
    }

    /// Returns the remaining candidate when exactly one is left.
    pub fn sole(&self) -> Option<KeyCode> {
        match self.codes.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Replaces this set with the chosen half.
    pub fn narrow(mut self, half: Half) -> Self {
        let mid = self.mid();
        match half {
            Half::First => self.codes.truncate(mid),
            Half::Second => {
                self.codes.drain(..mid);
            }
        }
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
