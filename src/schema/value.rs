//! Tagged parameter values and per-kind conversion/clamping
//!
//! All value handling (coercion, clamping, epsilon comparison) lives here,
//! once per kind, instead of being scattered across call sites.

use serde::{Deserialize, Serialize};

/// Comparison epsilon for float values. Changes smaller than this are
/// treated as "no change" and produce neither history nor notifications.
pub const VALUE_EPSILON: f64 = 1e-4;

/// Declared kind of a tunable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Float,
    Int,
    Bool,
    /// Enum-backed field; carried as an integer discriminant
    Enum,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Float => write!(f, "float"),
            ParamKind::Int => write!(f, "int"),
            ParamKind::Bool => write!(f, "bool"),
            ParamKind::Enum => write!(f, "enum"),
        }
    }
}

/// A parameter value: number, boolean, or the "unavailable" sentinel.
///
/// Serializes untagged so snapshots stay a plain mapping of numbers and
/// booleans; the sentinel becomes JSON `null` and round-trips as such.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Sentinel for entries whose binding never resolved
    Unavailable,
}

impl ParamValue {
    /// Numeric view (ints and enum discriminants widen to f64)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Bool(_) | ParamValue::Unavailable => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, ParamValue::Unavailable)
    }

    /// Convert this value to the given kind (numeric widening/narrowing,
    /// boolean passthrough). Returns `None` when no sensible conversion
    /// exists; callers drop the write and log.
    pub fn coerce(&self, kind: ParamKind) -> Option<ParamValue> {
        match (kind, self) {
            (ParamKind::Float, v) => v.as_f64().map(ParamValue::Float),
            (ParamKind::Int, ParamValue::Int(v)) => Some(ParamValue::Int(*v)),
            (ParamKind::Int, ParamValue::Float(v)) => Some(ParamValue::Int(v.round() as i64)),
            (ParamKind::Enum, ParamValue::Int(v)) => Some(ParamValue::Int(*v)),
            (ParamKind::Enum, ParamValue::Float(v)) => Some(ParamValue::Int(v.round() as i64)),
            (ParamKind::Bool, ParamValue::Bool(b)) => Some(ParamValue::Bool(*b)),
            _ => None,
        }
    }

    /// Equality with a small numeric epsilon for floats; exact otherwise.
    pub fn approx_eq(&self, other: &ParamValue, epsilon: f64) -> bool {
        match (self, other) {
            (ParamValue::Float(a), ParamValue::Float(b)) => (a - b).abs() <= epsilon,
            (ParamValue::Float(a), ParamValue::Int(b)) | (ParamValue::Int(b), ParamValue::Float(a)) => {
                (a - *b as f64).abs() <= epsilon
            },
            (a, b) => a == b,
        }
    }
}

impl ParamKind {
    /// Clamp `value` into `[min, max]` after coercing it to this kind.
    ///
    /// Out-of-range input is silently clamped, never rejected. Booleans
    /// pass through unclamped. Values that cannot be coerced come back as
    /// the sentinel so the caller can treat the write as a no-op.
    pub fn clamp(&self, value: ParamValue, min: f64, max: f64) -> ParamValue {
        let Some(coerced) = value.coerce(*self) else {
            return ParamValue::Unavailable;
        };
        match coerced {
            ParamValue::Float(v) => ParamValue::Float(v.clamp(min, max)),
            ParamValue::Int(v) => {
                let lo = min.ceil() as i64;
                let hi = max.floor() as i64;
                ParamValue::Int(v.clamp(lo, hi.max(lo)))
            },
            other => other,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Unavailable => write!(f, "(unavailable)"),
        }
    }
}
