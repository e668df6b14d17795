//! Error types for reflection operations.

use std::fmt;

/// The primary error type for all reflection operations.
#[derive(Debug)]
pub enum Error {
    /// The target type of an association could not be resolved
    TargetTypeUnresolved(UnresolvedTypeError),
    /// Invalid association declaration
    Declaration(DeclarationError),
    /// Scope cannot be used the way the caller asked
    Scope(ScopeError),
    /// Configuration errors
    Config(ConfigError),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct UnresolvedTypeError {
    pub kind: UnresolvedTypeKind,
    /// Name of the type declaring the association.
    pub owner: String,
    /// Association name on the owning type.
    pub association: String,
    /// The type name that failed to resolve.
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedTypeKind {
    /// No type is registered under the target name
    UnknownType,
    /// The type exists but has no table
    MissingTable,
}

#[derive(Debug, Clone)]
pub struct DeclarationError {
    pub kind: DeclarationErrorKind,
    pub owner: String,
    pub association: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationErrorKind {
    /// Association name is not a valid identifier
    InvalidName,
    /// An association name was declared twice
    Duplicate,
    /// An enumeration and an ordinary association share a name
    Collision,
    /// Options that cannot be combined with the association kind
    InvalidOptions,
}

#[derive(Debug, Clone)]
pub struct ScopeError {
    pub owner: String,
    pub association: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Is this a failure to resolve an association's target type?
    pub fn is_unresolved_target(&self) -> bool {
        matches!(self, Error::TargetTypeUnresolved(_))
    }

    /// Is this a declaration-time configuration mistake?
    pub fn is_declaration_error(&self) -> bool {
        matches!(self, Error::Declaration(_))
    }

    /// The association this error is about, if any.
    pub fn association(&self) -> Option<&str> {
        match self {
            Error::TargetTypeUnresolved(e) => Some(&e.association),
            Error::Declaration(e) => Some(&e.association),
            Error::Scope(e) => Some(&e.association),
            Error::Config(_) | Error::Custom(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TargetTypeUnresolved(e) => write!(f, "Unresolved target type: {}", e),
            Error::Declaration(e) => write!(f, "Declaration error: {}", e),
            Error::Scope(e) => write!(f, "Scope error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for UnresolvedTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UnresolvedTypeKind::UnknownType => write!(
                f,
                "{}.{} refers to unknown type '{}'",
                self.owner, self.association, self.target
            ),
            UnresolvedTypeKind::MissingTable => write!(
                f,
                "{}.{} refers to type '{}' which has no table",
                self.owner, self.association, self.target
            ),
        }
    }
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.association, self.message)
    }
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.association, self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<UnresolvedTypeError> for Error {
    fn from(err: UnresolvedTypeError) -> Self {
        Error::TargetTypeUnresolved(err)
    }
}

impl From<DeclarationError> for Error {
    fn from(err: DeclarationError) -> Self {
        Error::Declaration(err)
    }
}

impl From<ScopeError> for Error {
    fn from(err: ScopeError) -> Self {
        Error::Scope(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// Result type alias for reflection operations.
pub type Result<T> = std::result::Result<T, Error>;
