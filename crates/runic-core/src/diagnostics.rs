//! Diagnostic channel for encode-time and run-time faults.
//!
//! There is no process-wide logger or message callback: every operation that
//! can fault takes an explicit sink. The execution engine follows a
//! best-effort model, so run-time faults travel through this channel rather
//! than as returned errors; a `Fatal` diagnostic stops the operation that
//! raised it.

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// Stable codes identifying the fault class, independent of message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticCode {
    DivideByZero,
    TypeMismatch,
    UnknownVariable,
    UnsupportedType,
    TooManyVariables,
    OffsetOverflow,
    CorruptObject,
    CorruptArchive,
    DuplicateFunction,
    BadInstruction,
    StackUnderflow,
    InternalError,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DivideByZero => "divide-by-zero",
            Self::TypeMismatch => "type-mismatch",
            Self::UnknownVariable => "unknown-variable",
            Self::UnsupportedType => "unsupported-type",
            Self::TooManyVariables => "too-many-variables",
            Self::OffsetOverflow => "offset-overflow",
            Self::CorruptObject => "corrupt-object",
            Self::CorruptArchive => "corrupt-archive",
            Self::DuplicateFunction => "duplicate-function",
            Self::BadInstruction => "bad-instruction",
            Self::StackUnderflow => "stack-underflow",
            Self::InternalError => "internal-error",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fault was observed, when known. Encode-time faults carry a file
/// name, run-time faults an instruction index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub file: Option<String>,
    pub instruction: Option<u32>,
}

impl Position {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            file: Some(name.into()),
            instruction: None,
        }
    }

    pub fn instruction(index: u32) -> Self {
        Self {
            file: None,
            instruction: Some(index),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.instruction) {
            (Some(file), Some(ip)) => write!(f, "{file}, inst {ip}"),
            (Some(file), None) => f.write_str(file),
            (None, Some(ip)) => write!(f, "inst {ip}"),
            (None, None) => f.write_str("?"),
        }
    }
}

/// One reported fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub position: Option<Position>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            position: None,
            message: message.into(),
        }
    }

    pub fn fatal(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, code, message)
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.code, self.message)?;
        if let Some(position) = &self.position {
            write!(f, " ({position})")?;
        }
        Ok(())
    }
}

/// Receiver for diagnostics. Injected into `encode` and `run`, never global.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Collecting sink used by tests and the CLI.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity >= Severity::Error)
    }

    pub fn has_fatal(&self) -> bool {
        self.0.iter().any(Diagnostic::is_fatal)
    }

    pub fn error_count(&self) -> usize {
        self.0
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
