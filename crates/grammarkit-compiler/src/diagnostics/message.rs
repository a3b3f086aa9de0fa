use rowan::TextRange;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When two diagnostics start at the same position, only the higher-priority
/// one is kept. Syntax problems come first, then problems that drop a rule,
/// then warnings about rules that still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Cascade into the rest of the file
    UnclosedGroup,
    UnclosedAttributes,

    // Something required is missing
    ExpectedHeader,
    ExpectedGrammarName,
    ExpectedRuleName,
    ExpectedColon,
    ExpectedSemicolon,
    ExpectedItem,
    ExpectedAttribute,

    // Something that doesn't belong
    UnmatchedParen,
    UnexpectedToken,
    MisplacedHeader,
    InvalidQuantifier,

    // Rule is dropped
    EmptyAlternative,
    InvalidPattern,
    InvalidDictionaryEntry,
    DuplicateDefinition,

    // Imports
    ImportNotFound,
    ImportCycle,

    // Rule loads, with a warning
    UnknownAttribute,
    InvalidPrecedence,
    UndefinedReference,
    UnknownCaptureGroup,
    ExtendUndefined,
    RecursionNoEscape,
    LeftRecursion,
    AmbiguousPrecedence,
    UndefinedPrecedenceTarget,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnknownAttribute
            | Self::InvalidPrecedence
            | Self::UndefinedReference
            | Self::UnknownCaptureGroup
            | Self::ExtendUndefined
            | Self::RecursionNoEscape
            | Self::LeftRecursion
            | Self::AmbiguousPrecedence
            | Self::UndefinedPrecedenceTarget => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this kind wins over `other` at the same position.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedGroup => "missing closing `)`",
            Self::UnclosedAttributes => "missing closing `}`",

            Self::ExpectedHeader => "missing `grammar Name;` header",
            Self::ExpectedGrammarName => "expected grammar name",
            Self::ExpectedRuleName => "expected rule name",
            Self::ExpectedColon => "expected `:`",
            Self::ExpectedSemicolon => "expected `;`",
            Self::ExpectedItem => "expected a rule item",
            Self::ExpectedAttribute => "expected attribute name",

            Self::UnmatchedParen => "unmatched `)`",
            Self::UnexpectedToken => "unexpected token",
            Self::MisplacedHeader => "`grammar` header must come first",
            Self::InvalidQuantifier => "invalid quantifier",

            Self::EmptyAlternative => "empty alternative",
            Self::InvalidPattern => "invalid pattern",
            Self::InvalidDictionaryEntry => "dictionary entries must be literals",
            Self::DuplicateDefinition => "duplicate definition",

            Self::ImportNotFound => "imported grammar not found",
            Self::ImportCycle => "import cycle",

            Self::UnknownAttribute => "unknown attribute",
            Self::InvalidPrecedence => "invalid precedence",
            Self::UndefinedReference => "undefined reference",
            Self::UnknownCaptureGroup => "unknown capture group",
            Self::ExtendUndefined => "nothing to extend",
            Self::RecursionNoEscape => "infinite recursion: no escape path",
            Self::LeftRecursion => "left recursion",
            Self::AmbiguousPrecedence => "ambiguous precedence",
            Self::UndefinedPrecedenceTarget => "precedence refers to an undefined rule",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateDefinition => "`{}` is already defined".to_string(),
            Self::UndefinedReference => "`{}` is not defined".to_string(),
            Self::UnknownCaptureGroup => "`${}` refers to no earlier capture group".to_string(),
            Self::UnknownAttribute => "unknown attribute `{}`".to_string(),
            Self::ImportNotFound => "grammar `{}` not found".to_string(),
            Self::ImportCycle => "import cycle: {}".to_string(),
            Self::ExtendUndefined => "`{}` extends nothing; defining it".to_string(),
            Self::RecursionNoEscape => "infinite recursion: `{}` has no escape path".to_string(),
            Self::LeftRecursion => "`{}` is left recursive".to_string(),
            Self::AmbiguousPrecedence => "ambiguous precedence between {}".to_string(),
            Self::UndefinedPrecedenceTarget => {
                "precedence refers to undefined rule `{}`".to_string()
            }

            Self::UnclosedGroup | Self::UnclosedAttributes => {
                format!("{}; {{}}", self.fallback_message())
            }

            // Standard pattern: fallback + context
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// The range shown to the user (underlined in output).
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}
