use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A score in `[0.0, 1.0]`. `1.0` is full certainty, `0.0` no support at all.
///
/// The value is clamped on construction and NaN becomes `0.0`, so every
/// `Confidence` in circulation respects the bounds and has a total order.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub const NONE: Confidence = Confidence(0.0);
    pub const FULL: Confidence = Confidence(1.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::NONE;
        }
        Confidence(value.clamp(0.0, 1.0))
    }

    /// Ratio of `successes` over `total`, `0.0` when `total` is zero.
    pub fn ratio(successes: usize, total: usize) -> Self {
        if total == 0 {
            return Self::NONE;
        }
        Self::new(successes as f64 / total as f64)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0.0
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.0 * factor)
    }

    pub fn min(self, other: Confidence) -> Self {
        if other < self { other } else { self }
    }

    pub fn max(self, other: Confidence) -> Self {
        if other > self { other } else { self }
    }
}

impl PartialEq for Confidence {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Confidence {}

impl PartialOrd for Confidence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Confidence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Confidence::new(value)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A candidate value paired with how sure we are about it.
///
/// When `T: Ord`, a value is *greater* than another when it is more confident,
/// and for equal confidences when its value is *smaller*. Sorting with
/// [`rank`] therefore gives the most confident first and keeps ties in the
/// natural order of the values (column indexes for example).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueWithConfidence<T> {
    pub value: T,
    pub confidence: Confidence,
}

impl<T> ValueWithConfidence<T> {
    pub fn new(value: T, confidence: impl Into<Confidence>) -> Self {
        Self {
            value,
            confidence: confidence.into(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValueWithConfidence<U> {
        ValueWithConfidence {
            value: f(self.value),
            confidence: self.confidence,
        }
    }
}

impl<T: Ord> PartialOrd for ValueWithConfidence<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for ValueWithConfidence<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.confidence
            .cmp(&other.confidence)
            .then_with(|| other.value.cmp(&self.value))
    }
}

/// Sorts from the most to the least confident candidate.
pub fn rank<T: Ord>(values: &mut [ValueWithConfidence<T>]) {
    values.sort_by(|a, b| b.cmp(a));
}
