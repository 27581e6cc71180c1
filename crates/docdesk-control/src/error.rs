//! Control-plane error taxonomy and numeric result codes

use docdesk_auth::DenyReason;
use serde::Serialize;
use thiserror::Error;

/// Result code reported for successful operations
pub const SUCCESS_CODE: i32 = 0;

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Forbidden,
    NotFound,
    Conflict,
    StorageFailure,
    Timeout,
}

/// Malformed input, fixable by the caller
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Account must be 3-50 letters or digits")]
    InvalidAccount,

    #[error("Password must be between 6 and 50 characters")]
    PasswordLength,

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Description cannot exceed 500 characters")]
    DescriptionTooLong,

    #[error("At most 10 labels are allowed")]
    TooManyLabels,

    #[error("Invalid {0} id")]
    InvalidId(&'static str),

    #[error("Recipient account cannot be empty")]
    MissingRecipient,

    #[error("Book identifier cannot be empty")]
    MissingIdentify,

    #[error("Book name cannot be empty")]
    MissingBookName,

    #[error("Unknown visibility '{0}'")]
    InvalidVisibility(String),

    #[error("Role {0} is not assignable (expected administrator or general)")]
    InvalidRole(i32),

    #[error("Book identifier '{0}' must start with a lowercase letter and use only letters, digits, '_' or '-'")]
    InvalidIdentify(String),

    #[error("Unknown token action '{0}' (expected create or delete)")]
    InvalidTokenAction(String),
}

impl ValidationError {
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidAccount => 6001,
            Self::PasswordLength => 6002,
            Self::PasswordMismatch => 6003,
            Self::InvalidEmail => 6004,
            Self::DescriptionTooLong => 6005,
            Self::TooManyLabels => 6006,
            Self::InvalidId(_) => 6007,
            Self::MissingRecipient => 6008,
            Self::MissingIdentify => 6009,
            Self::MissingBookName => 6010,
            Self::InvalidVisibility(_) => 6011,
            Self::InvalidRole(_) => 6012,
            Self::InvalidIdentify(_) => 6013,
            Self::InvalidTokenAction(_) => 6014,
        }
    }
}

/// Entity a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Member,
    Book,
    Comment,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Member => "Member",
            Entity::Book => "Book",
            Entity::Comment => "Comment",
        };
        f.write_str(name)
    }
}

/// Errors returned by control-plane operations
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Permission denied: {0}")]
    Forbidden(DenyReason),

    #[error("Public books cannot have an access token")]
    PublicBookToken,

    /// Unknown account, wrong password or disabled account
    #[error("Invalid account or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("Recipient account not found")]
    RecipientNotFound,

    #[error("Account '{0}' already exists")]
    DuplicateAccount(String),

    #[error("Book identifier '{0}' already exists")]
    DuplicateIdentify(String),

    #[error("Recipient account is disabled")]
    RecipientDisabled,

    #[error("Cannot transfer a book to its current founder")]
    SelfTransfer,

    #[error("Member is not the current founder of this book")]
    NotFounder,

    /// A book with zero or several founder rows
    #[error("Book ownership records are inconsistent")]
    IntegrityViolation { book_id: i32, founders: usize },

    /// Backend failure; detail is logged where it happened, never surfaced
    #[error("Storage operation failed")]
    Storage { operation: &'static str },

    #[error("Storage operation timed out")]
    Timeout,
}

impl ControlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) | Self::PublicBookToken | Self::InvalidCredentials => {
                ErrorKind::Forbidden
            }
            Self::NotFound(_) | Self::RecipientNotFound => ErrorKind::NotFound,
            Self::DuplicateAccount(_)
            | Self::DuplicateIdentify(_)
            | Self::RecipientDisabled
            | Self::SelfTransfer
            | Self::NotFounder => ErrorKind::Conflict,
            Self::IntegrityViolation { .. } | Self::Storage { .. } => ErrorKind::StorageFailure,
            Self::Timeout => ErrorKind::Timeout,
        }
    }

    /// Numeric result code; distinct per failure, never [`SUCCESS_CODE`]
    pub fn code(&self) -> i32 {
        match self {
            Self::Validation(e) => e.code(),
            Self::Forbidden(_) => 6100,
            Self::PublicBookToken => 6101,
            Self::InvalidCredentials => 6102,
            Self::NotFound(Entity::Member) => 6201,
            Self::NotFound(Entity::Book) => 6202,
            Self::NotFound(Entity::Comment) => 6203,
            Self::RecipientNotFound => 6204,
            Self::DuplicateAccount(_) => 6301,
            Self::DuplicateIdentify(_) => 6302,
            Self::RecipientDisabled => 6303,
            Self::SelfTransfer => 6304,
            Self::NotFounder => 6305,
            Self::Storage { .. } => 6500,
            Self::IntegrityViolation { .. } => 6501,
            Self::Timeout => 6504,
        }
    }
}
