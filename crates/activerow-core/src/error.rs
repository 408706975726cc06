//! Error taxonomy for the record value engine.
//!
//! Three families matter to callers:
//!
//! - [`ValidationError`]: one or more column-level symbolic codes produced by
//!   the coercion/validation path. Always recoverable; never fatal.
//! - [`IllegalState`]: the edit-session state machine was driven in the wrong
//!   order, or a provenance legality rule was violated. Programmer error,
//!   surfaced immediately and never silently ignored.
//! - Everything else: unknown names, unattached relations, bad format names,
//!   and pass-through gateway failures.
//!
//! Error codes are symbolic; human-readable text lives behind the swappable
//! message resolver in `activerow-coerce`, not here.

use std::fmt;

use crate::types::ColumnType;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Symbolic, non-localized validation error codes.
///
/// The engine reports these; message text is resolved by a separate lookup
/// so hosts can localize or rewrite wording without touching validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Null supplied for a non-nullable column.
    NullNotAllowed,
    /// Value is not coercible to a boolean.
    NotBoolean,
    /// Value is not an integer.
    NotInteger,
    /// Value is not a float (booleans are rejected here).
    NotFloat,
    /// Value is not textual.
    NotString,
    /// Value is not a recognizable calendar date.
    NotDate,
    /// Value is not a recognizable time of day.
    NotTime,
    /// Value is not a recognizable timestamp.
    NotTimestamp,
    /// Value is not a timezone offset.
    NotTimezoneOffset,
    /// Value is not a unix timestamp.
    NotUnixTimestamp,
    /// Value is not a dotted-quad IPv4 address.
    NotIpv4Address,
    /// Value is not an email address.
    NotEmail,
    /// Value is not syntactically valid JSON.
    NotJson,
    /// Value is not binary data.
    NotBinary,
    /// Value is outside the column's allowed-values set.
    NotInAllowedSet,
}

impl ErrorCode {
    /// Stable machine-readable code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorCode::NullNotAllowed => "null_not_allowed",
            ErrorCode::NotBoolean => "not_boolean",
            ErrorCode::NotInteger => "not_integer",
            ErrorCode::NotFloat => "not_float",
            ErrorCode::NotString => "not_string",
            ErrorCode::NotDate => "not_date",
            ErrorCode::NotTime => "not_time",
            ErrorCode::NotTimestamp => "not_timestamp",
            ErrorCode::NotTimezoneOffset => "not_timezone_offset",
            ErrorCode::NotUnixTimestamp => "not_unix_timestamp",
            ErrorCode::NotIpv4Address => "not_ipv4_address",
            ErrorCode::NotEmail => "not_email",
            ErrorCode::NotJson => "not_json",
            ErrorCode::NotBinary => "not_binary",
            ErrorCode::NotInAllowedSet => "not_in_allowed_set",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validation failure for a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    /// Column that failed validation.
    pub column: String,
    /// Symbolic codes describing why (at least one).
    pub codes: Vec<ErrorCode>,
}

impl FieldValidationError {
    /// Create a field error for one column.
    pub fn new(column: impl Into<String>, codes: Vec<ErrorCode>) -> Self {
        Self {
            column: column.into(),
            codes,
        }
    }
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.column)?;
        for (i, code) in self.codes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{code}")?;
        }
        Ok(())
    }
}

/// Aggregated validation failure across one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    /// Per-column failures, in the order they were detected.
    pub errors: Vec<FieldValidationError>,
}

impl ValidationError {
    /// Empty aggregate.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Aggregate holding a single column failure.
    pub fn single(column: impl Into<String>, codes: Vec<ErrorCode>) -> Self {
        Self {
            errors: vec![FieldValidationError::new(column, codes)],
        }
    }

    /// Append a column failure.
    pub fn push(&mut self, error: FieldValidationError) {
        self.errors.push(error);
    }

    /// True when no column failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All codes reported for a given column.
    #[must_use]
    pub fn codes_for(&self, column: &str) -> Vec<ErrorCode> {
        self.errors
            .iter()
            .filter(|e| e.column == column)
            .flat_map(|e| e.codes.iter().copied())
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for error in &self.errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

/// Edit-session and provenance legality violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IllegalState {
    /// `begin()` on a record with no storage-sourced primary key.
    NotPersisted,
    /// `begin()` while already collecting updates.
    AlreadyCollecting,
    /// `commit()`/`rollback()` outside an edit session.
    NotCollecting,
    /// `reset()`/`save()` while an edit session is open.
    EditInProgress,
    /// A storage-sourced write was attempted inside an edit session.
    ForbiddenDuringEdit,
    /// The primary key may only be written with storage-sourced values.
    PrimaryKeyRequiresStorage,
    /// Storage-sourced non-key writes require an existing storage-sourced key.
    RecordMustExistFirst,
    /// An operation needed a value the record does not hold.
    BadState(String),
}

impl fmt::Display for IllegalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalState::NotPersisted => {
                f.write_str("record has no storage-sourced primary key; cannot open edit session")
            }
            IllegalState::AlreadyCollecting => f.write_str("edit session already open"),
            IllegalState::NotCollecting => f.write_str("no edit session open"),
            IllegalState::EditInProgress => f.write_str("operation forbidden while collecting updates"),
            IllegalState::ForbiddenDuringEdit => {
                f.write_str("storage-sourced writes are forbidden inside an edit session")
            }
            IllegalState::PrimaryKeyRequiresStorage => {
                f.write_str("primary key may only be set from storage-sourced data")
            }
            IllegalState::RecordMustExistFirst => {
                f.write_str("storage-sourced write requires a record that exists in storage")
            }
            IllegalState::BadState(msg) => write!(f, "bad state: {msg}"),
        }
    }
}

/// Top-level error type for the record value engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Untrusted input failed coercion/validation.
    Validation(ValidationError),
    /// State-machine or provenance legality violation.
    IllegalState(IllegalState),
    /// Column name not present in the schema.
    UnknownColumn(String),
    /// Relation name not present in the schema.
    UnknownRelation(String),
    /// Relation accessed before being resolved or attached.
    RelatedNotAttached(String),
    /// Attached data does not match the relation's declared cardinality.
    RelationCardinality {
        /// Relation name.
        relation: String,
        /// What the descriptor declares ("one" or "many").
        expected: &'static str,
    },
    /// Requested a format name the column type does not support.
    InvalidFormat {
        /// The column type the format was requested for.
        column_type: ColumnType,
        /// The unsupported format name.
        format: String,
    },
    /// External collaborator failure, passed through unchanged.
    Gateway(String),
}

impl Error {
    /// Convenience constructor for unknown-column failures.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Error::UnknownColumn(name.into())
    }

    /// Convenience constructor for unknown-relation failures.
    pub fn unknown_relation(name: impl Into<String>) -> Self {
        Error::UnknownRelation(name.into())
    }

    /// Convenience constructor for gateway pass-through failures.
    pub fn gateway(message: impl Into<String>) -> Self {
        Error::Gateway(message.into())
    }

    /// True for validation failures (the only recoverable family).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "{e}"),
            Error::IllegalState(e) => write!(f, "illegal state transition: {e}"),
            Error::UnknownColumn(name) => write!(f, "unknown column: {name}"),
            Error::UnknownRelation(name) => write!(f, "unknown relation: {name}"),
            Error::RelatedNotAttached(name) => {
                write!(f, "relation not attached: {name} (autoload disabled)")
            }
            Error::RelationCardinality { relation, expected } => {
                write!(f, "relation {relation} expects {expected} related record(s)")
            }
            Error::InvalidFormat {
                column_type,
                format,
            } => write!(f, "type {} has no format {format:?}", column_type.name()),
            Error::Gateway(msg) => write!(f, "gateway error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<IllegalState> for Error {
    fn from(e: IllegalState) -> Self {
        Error::IllegalState(e)
    }
}
