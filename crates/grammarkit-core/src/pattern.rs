//! Compiled pattern table for literal and expression atoms.
//!
//! Patterns are compiled once when a grammar is built and addressed by
//! [`PatternId`]. Identical sources share one entry.

use std::collections::HashMap;
use std::ops::Range;

use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};

/// Handle into a [`PatternTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(u32);

impl PatternId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern `{pattern}`: {message}")]
    Invalid { pattern: String, message: String },
}

/// A compiled matcher.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Anchored regex; consumes what it matches.
    Regex(Regex),
    /// `(?!X)`: zero-width, succeeds where `X` does not match.
    NotFollowedBy(Regex),
}

impl Pattern {
    /// Byte length matched at the start of `haystack`.
    pub fn match_prefix(&self, haystack: &str) -> Option<usize> {
        self.match_at(haystack, 0..haystack.len())
    }

    /// End offset of a match anchored at `span.start` that stays within
    /// `span`. Text before the span is still visible to `\b` assertions.
    ///
    /// `span` must lie within `haystack`.
    pub fn match_at(&self, haystack: &str, span: Range<usize>) -> Option<usize> {
        let start = span.start;
        let input = Input::new(haystack).span(span).anchored(Anchored::Yes);
        match self {
            Pattern::Regex(re) => re.search(&input).map(|m| m.end()),
            Pattern::NotFollowedBy(re) => match re.search(&input) {
                Some(_) => None,
                None => Some(start),
            },
        }
    }

    /// Whether a successful match consumes nothing.
    pub fn is_zero_width(&self) -> bool {
        matches!(self, Pattern::NotFollowedBy(_))
    }

    /// Whether the pattern matches all of `haystack`.
    pub fn match_whole(&self, haystack: &str) -> bool {
        let input = Input::new(haystack).anchored(Anchored::Yes);
        match self {
            Pattern::Regex(re) => re
                .search(&input)
                .is_some_and(|m| m.end() == haystack.len()),
            Pattern::NotFollowedBy(re) => re.search(&input).is_none(),
        }
    }
}

/// How an atom's text turns into a regex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSource<'a> {
    /// Quoted literal. Bare words get word boundaries.
    Literal(&'a str),
    /// `'a'..'z'`
    LiteralRange(char, char),
    /// `[...]`, `.`, `(?!...)`, or any other raw regex.
    Expression(&'a str),
    /// Regex used verbatim, no literal treatment.
    Raw(&'a str),
}

impl PatternSource<'_> {
    /// Regex source plus whether it is a negative lookahead.
    fn to_regex(self) -> (String, bool) {
        match self {
            PatternSource::Literal(text) => {
                let escaped = regex_syntax::escape(text);
                if is_bare_word(text) {
                    (format!(r"\b{escaped}\b"), false)
                } else {
                    (escaped, false)
                }
            }
            PatternSource::LiteralRange(lo, hi) => {
                let lo = regex_syntax::escape(lo.encode_utf8(&mut [0; 4]));
                let hi = regex_syntax::escape(hi.encode_utf8(&mut [0; 4]));
                (format!("[{lo}-{hi}]"), false)
            }
            PatternSource::Expression(".") => ("(?s:.)".to_string(), false),
            PatternSource::Expression(source) => {
                match source
                    .strip_prefix("(?!")
                    .and_then(|rest| rest.strip_suffix(')'))
                {
                    Some(inner) => (inner.to_string(), true),
                    None => (source.to_string(), false),
                }
            }
            PatternSource::Raw(source) => (source.to_string(), false),
        }
    }
}

/// `^\w+$`
pub fn is_bare_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    lookup: HashMap<(String, bool), PatternId>,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    source: String,
    pattern: Pattern,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `source`, reusing an existing entry for the same regex.
    pub fn intern(&mut self, source: PatternSource<'_>) -> Result<PatternId, PatternError> {
        let (regex, negated) = source.to_regex();
        self.intern_regex(regex, negated)
    }

    fn intern_regex(&mut self, regex: String, negated: bool) -> Result<PatternId, PatternError> {
        let key = (regex, negated);
        if let Some(&id) = self.lookup.get(&key) {
            return Ok(id);
        }

        let compiled = Regex::new(&key.0).map_err(|e| PatternError::Invalid {
            pattern: key.0.clone(),
            message: e.to_string(),
        })?;
        let pattern = if negated {
            Pattern::NotFollowedBy(compiled)
        } else {
            Pattern::Regex(compiled)
        };

        let id = PatternId(self.entries.len() as u32);
        self.entries.push(Entry {
            source: key.0.clone(),
            pattern,
        });
        self.lookup.insert(key, id);
        Ok(id)
    }

    /// Copies an entry of another table into this one.
    pub fn import(&mut self, other: &PatternTable, id: PatternId) -> PatternId {
        let entry = &other.entries[id.0 as usize];
        let negated = matches!(entry.pattern, Pattern::NotFollowedBy(_));
        let key = (entry.source.clone(), negated);
        if let Some(&existing) = self.lookup.get(&key) {
            return existing;
        }
        let new_id = PatternId(self.entries.len() as u32);
        self.entries.push(entry.clone());
        self.lookup.insert(key, new_id);
        new_id
    }

    pub fn get(&self, id: PatternId) -> &Pattern {
        &self.entries[id.0 as usize].pattern
    }

    /// Regex source the entry was compiled from.
    pub fn source(&self, id: PatternId) -> &str {
        &self.entries[id.0 as usize].source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
