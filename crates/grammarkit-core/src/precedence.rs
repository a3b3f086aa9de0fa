//! Rule precedence declarations and rule metadata.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// Weight and relations used to order rule evaluation attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precedence {
    pub weight: Option<i64>,
    /// `self <relation> other`, in declaration order.
    pub relations: IndexMap<String, Ordering>,
}

/// Error for a precedence item that is neither a weight nor a relation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid precedence item `{0}`")]
pub struct PrecedenceError(pub String);

impl Precedence {
    /// Lowest possible weight (`min`).
    pub fn lowest() -> Self {
        Self {
            weight: Some(i64::MIN),
            relations: IndexMap::new(),
        }
    }

    pub fn with_weight(weight: i64) -> Self {
        Self {
            weight: Some(weight),
            relations: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.relations.is_empty()
    }

    /// Applies one item: an integer, `min`, `max`, or `<id`, `=id`, `>id`.
    pub fn push_item(&mut self, item: &str) -> Result<(), PrecedenceError> {
        let item = item.trim();
        match item {
            "min" => self.weight = Some(i64::MIN),
            "max" => self.weight = Some(i64::MAX),
            _ => {
                if let Ok(weight) = item.parse::<i64>() {
                    self.weight = Some(weight);
                    return Ok(());
                }
                let (relation, target) = match item.chars().next() {
                    Some('<') => (Ordering::Less, &item[1..]),
                    Some('=') => (Ordering::Equal, &item[1..]),
                    Some('>') => (Ordering::Greater, &item[1..]),
                    _ => return Err(PrecedenceError(item.to_string())),
                };
                let target = target.trim();
                if !is_rule_name(target) {
                    return Err(PrecedenceError(item.to_string()));
                }
                self.relations.insert(target.to_string(), relation);
            }
        }
        Ok(())
    }
}

impl FromStr for Precedence {
    type Err = PrecedenceError;

    /// Parses whitespace- or comma-separated items.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut precedence = Precedence::default();
        for item in s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
        {
            precedence.push_item(item)?;
        }
        Ok(precedence)
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = Vec::new();
        match self.weight {
            Some(i64::MIN) => items.push("min".to_string()),
            Some(i64::MAX) => items.push("max".to_string()),
            Some(weight) => items.push(weight.to_string()),
            None => {}
        }
        for (target, relation) in &self.relations {
            let symbol = match relation {
                Ordering::Less => '<',
                Ordering::Equal => '=',
                Ordering::Greater => '>',
            };
            items.push(format!("{symbol}{target}"));
        }
        f.write_str(&items.join(" "))
    }
}

/// Identifier syntax shared by rule names and capture group names.
pub fn is_rule_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Option flags a rule declaration may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataOption {
    /// Matches are consumed without producing a token or match chain.
    Skip,
    /// Only usable by reference; excluded from the lexer/parser rule sets.
    Fragment,
    /// Appends alternatives to an existing rule of the same name.
    Extend,
    /// The inner range of a match is lexed again.
    Nested,
    /// The body is a list of literal words.
    Dictionary,
    /// Excluded from the lexer/parser rule sets.
    Omit,
}

impl MetadataOption {
    pub const ALL: [MetadataOption; 6] = [
        Self::Skip,
        Self::Fragment,
        Self::Extend,
        Self::Nested,
        Self::Dictionary,
        Self::Omit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Fragment => "fragment",
            Self::Extend => "extend",
            Self::Nested => "nested",
            Self::Dictionary => "dictionary",
            Self::Omit => "omit",
        }
    }
}

impl FromStr for MetadataOption {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for MetadataOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option flags plus an optional capture group name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    options: Vec<MetadataOption>,
    pub group: Option<String>,
}

impl Metadata {
    pub fn has(&self, option: MetadataOption) -> bool {
        self.options.contains(&option)
    }

    pub fn insert(&mut self, option: MetadataOption) {
        if !self.has(option) {
            self.options.push(option);
        }
    }

    pub fn options(&self) -> &[MetadataOption] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.group.is_none()
    }
}
