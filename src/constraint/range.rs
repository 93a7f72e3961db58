use std::{cmp::Ordering, fmt};

use crate::value::Number;

/// Numeric interval; either bound may be absent.
///
/// Defaults to the half-open interval `[lower, upper)`. Inverted bounds are
/// accepted and simply match nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    lower: Option<Number>,
    upper: Option<Number>,
    lower_strict: bool,
    upper_strict: bool,
}

impl Range {
    /// `[lower, upper)`.
    #[must_use]
    pub fn new<L, U>(lower: L, upper: U) -> Self
    where
        L: Into<Number>,
        U: Into<Number>,
    {
        Self::from_bounds(Some(lower.into()), Some(upper.into()))
    }

    /// `[lower, ∞)`.
    #[must_use]
    pub fn at_least<L: Into<Number>>(lower: L) -> Self {
        Self::from_bounds(Some(lower.into()), None)
    }

    /// `(-∞, upper)`.
    #[must_use]
    pub fn below<U: Into<Number>>(upper: U) -> Self {
        Self::from_bounds(None, Some(upper.into()))
    }

    /// Matches every number.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::from_bounds(None, None)
    }

    /// Range from optional bounds with default strictness.
    #[must_use]
    pub fn from_bounds(lower: Option<Number>, upper: Option<Number>) -> Self {
        Self {
            lower,
            upper,
            lower_strict: false,
            upper_strict: true,
        }
    }

    /// Sets whether the lower bound excludes its endpoint.
    #[must_use]
    pub fn lower_strict(self, lower_strict: bool) -> Self {
        Self {
            lower_strict,
            ..self
        }
    }

    /// Sets whether the upper bound excludes its endpoint.
    #[must_use]
    pub fn upper_strict(self, upper_strict: bool) -> Self {
        Self {
            upper_strict,
            ..self
        }
    }

    /// Lower bound, if any.
    #[must_use]
    pub fn lower(&self) -> Option<Number> {
        self.lower
    }

    /// Upper bound, if any.
    #[must_use]
    pub fn upper(&self) -> Option<Number> {
        self.upper
    }

    /// Returns true when the lower bound is exclusive.
    #[must_use]
    pub fn is_lower_strict(&self) -> bool {
        self.lower_strict
    }

    /// Returns true when the upper bound is exclusive.
    #[must_use]
    pub fn is_upper_strict(&self) -> bool {
        self.upper_strict
    }

    /// Tests a number against both bounds.
    ///
    /// `NaN` fails every bound but still lies in an unbounded range.
    #[must_use]
    pub fn contains_number(&self, value: &Number) -> bool {
        let above = self.lower.map_or(true, |lower| match value.compare(&lower) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !self.lower_strict,
            _ => false,
        });
        let below = self.upper.map_or(true, |upper| match value.compare(&upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => !self.upper_strict,
            _ => false,
        });
        above && below
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.lower_strict { "(" } else { "[" })?;
        match &self.lower {
            Some(lower) => write!(f, "{lower}")?,
            None => f.write_str("-inf")?,
        }
        f.write_str(", ")?;
        match &self.upper {
            Some(upper) => write!(f, "{upper}")?,
            None => f.write_str("inf")?,
        }
        f.write_str(if self.upper_strict { ")" } else { "]" })
    }
}
