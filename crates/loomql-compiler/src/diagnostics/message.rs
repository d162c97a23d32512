use loomql_core::{Location, ModuleId, Span};

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// Priority rationale:
/// - Registry-shape errors poison every reference to the fragment
/// - Resolution errors assume a well-formed registry
/// - Shape errors are local to one call site's expression
/// - Binding ambiguity assumes a representable selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Registry shape
    DuplicateFragment,

    // Resolution
    UnresolvedFragment,
    CircularFragment,

    // Expression shape
    UnsupportedSelectionShape,
    UnsupportedArgumentShape,

    // Result mapping
    AmbiguousFieldBinding,
}

impl DiagnosticKind {
    /// Default severity for this kind.
    ///
    /// Every kind is fatal to its call site; none is recoverable at
    /// runtime.
    pub fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::CircularFragment => {
                Some("break the cycle or inline the shared fields directly")
            }
            Self::UnsupportedArgumentShape => {
                Some("bind the value to a local before passing it as an argument")
            }
            Self::UnsupportedSelectionShape => {
                Some("selections must be deterministic field accesses, without runtime control flow")
            }
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message
    /// is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::DuplicateFragment => "duplicate fragment declaration",
            Self::UnresolvedFragment => "unresolved fragment reference",
            Self::CircularFragment => "circular fragment reference",
            Self::UnsupportedSelectionShape => "selection expression cannot be represented",
            Self::UnsupportedArgumentShape => "argument cannot be evaluated before the request",
            Self::AmbiguousFieldBinding => "result binding is ambiguous",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for
    /// caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateFragment => "fragment `{}` is already declared".to_string(),
            Self::UnresolvedFragment => "fragment `{}` is not defined".to_string(),
            Self::CircularFragment => "fragment cycle {} can never be expanded".to_string(),
            Self::AmbiguousFieldBinding => "result slot `{}` is bound more than once".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` -> returns `fallback_message()`
    /// - `Some(detail)` -> returns `custom_message()` with `{}` replaced
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

/// Secondary span attached to a diagnostic (cycle chains, first
/// declaration sites).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) module: ModuleId,
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(module: ModuleId, span: Span, message: impl Into<String>) -> Self {
        Self {
            module,
            span,
            message: message.into(),
        }
    }
}

/// One compiler diagnostic: kind, location, human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) module: ModuleId,
    pub(crate) span: Span,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(
        kind: DiagnosticKind,
        module: ModuleId,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        let hints = kind.default_hint().map(str::to_string).into_iter().collect();
        Self {
            kind,
            module,
            span,
            message: message.into(),
            related: Vec::new(),
            hints,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn location(&self) -> Location {
        Location::new(self.module.clone(), self.span)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub(crate) fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.severity(),
            self.module,
            self.span,
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}:{})",
                related.message, related.module, related.span
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
