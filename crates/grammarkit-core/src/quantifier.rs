//! Repetition quantifiers attached to rule atoms.
//!
//! The suffix forms (`*`, `+`, `?` and their lazy variants) map to fixed
//! canonical instances. Brace forms (`{m}`, `{m,}`, `{,n}`, `{m,n}`) carry an
//! explicit range.

use std::fmt;

/// How many times an atom may repeat.
///
/// `min`/`max` are only set for brace forms. `max == None` with `min` set
/// means the range is unbounded above (`{m,}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantifier {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub optional: bool,
    pub greedy: bool,
    /// Parsed and displayed, but evaluation is always greedy-first.
    pub lazy: bool,
}

impl Quantifier {
    /// Exactly one occurrence (no suffix).
    pub const ONCE: Quantifier = Quantifier::suffix(false, false, false);
    /// `*`
    pub const ZERO_OR_MORE: Quantifier = Quantifier::suffix(true, true, false);
    /// `*?`
    pub const ZERO_OR_MORE_LAZY: Quantifier = Quantifier::suffix(true, true, true);
    /// `+`
    pub const ONE_OR_MORE: Quantifier = Quantifier::suffix(false, true, false);
    /// `+?`
    pub const ONE_OR_MORE_LAZY: Quantifier = Quantifier::suffix(false, true, true);
    /// `?`
    pub const OPTIONAL: Quantifier = Quantifier::suffix(true, false, false);
    /// `??`
    pub const OPTIONAL_LAZY: Quantifier = Quantifier::suffix(true, false, true);

    const fn suffix(optional: bool, greedy: bool, lazy: bool) -> Self {
        Self {
            min: None,
            max: None,
            optional,
            greedy,
            lazy,
        }
    }

    /// Brace range. `max` is clamped up to `min`.
    pub fn range(min: usize, max: Option<usize>, lazy: bool) -> Self {
        let max = max.map(|max| max.max(min));
        Self {
            min: Some(min),
            max,
            optional: min == 0,
            greedy: max.is_none_or(|max| max > 1),
            lazy,
        }
    }

    /// Parses quantifier text. Returns `None` for anything that is not a quantifier.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let quantifier = match text {
            "" => Self::ONCE,
            "*" => Self::ZERO_OR_MORE,
            "*?" => Self::ZERO_OR_MORE_LAZY,
            "+" => Self::ONE_OR_MORE,
            "+?" => Self::ONE_OR_MORE_LAZY,
            "?" => Self::OPTIONAL,
            "??" => Self::OPTIONAL_LAZY,
            _ => return Self::parse_range(text),
        };
        Some(quantifier)
    }

    fn parse_range(text: &str) -> Option<Self> {
        let (body, lazy) = match text.strip_suffix('?') {
            Some(body) => (body, true),
            None => (text, false),
        };
        let inner = body.strip_prefix('{')?.strip_suffix('}')?;

        let parse_bound = |s: &str| -> Option<Option<usize>> {
            let s = s.trim();
            if s.is_empty() {
                return Some(None);
            }
            s.parse().ok().map(Some)
        };

        match inner.split_once(',') {
            None => {
                let exact = parse_bound(inner)??;
                Some(Self::range(exact, Some(exact), lazy))
            }
            Some((lo, hi)) => {
                let lo = parse_bound(lo)?;
                let hi = parse_bound(hi)?;
                if lo.is_none() && hi.is_none() {
                    return None;
                }
                Some(Self::range(lo.unwrap_or(0), hi, lazy))
            }
        }
    }

    /// Whether a brace range was given.
    pub fn has_range(&self) -> bool {
        self.min.is_some()
    }

    /// Whether `count` repetitions satisfy this quantifier.
    pub fn matches(&self, count: usize) -> bool {
        match self.min {
            Some(min) => count >= min && self.max.is_none_or(|max| count <= max),
            None if self.optional => true,
            None => count > 0,
        }
    }

    /// Acceptance test used by the matching engine after a greedy run.
    pub fn accepts(&self, count: usize) -> bool {
        (!self.has_range() && count > 0) || self.optional || self.matches(count)
    }
}

impl Default for Quantifier {
    fn default() -> Self {
        Self::ONCE
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => write!(f, "{{{min}}}")?,
            (Some(min), Some(max)) => write!(f, "{{{min},{max}}}")?,
            (Some(min), None) => write!(f, "{{{min},}}")?,
            (None, _) => {
                let symbol = match (self.optional, self.greedy) {
                    (true, true) => "*",
                    (false, true) => "+",
                    (true, false) => "?",
                    (false, false) => return Ok(()),
                };
                f.write_str(symbol)?;
            }
        }
        if self.lazy {
            f.write_str("?")?;
        }
        Ok(())
    }
}
