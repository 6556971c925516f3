use crate::record::ValidationErrors;

/// Errors from form operations that are not validation outcomes.
///
/// Field-level validation failures are data ([`ValidationErrors`]), never this type.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("unknown form: {0}")]
    UnknownForm(String),
    #[error("field {field} is not declared by form {form}")]
    UnknownField { form: String, field: String },
    #[error("step {step} is outside 1..={steps}")]
    StepOutOfRange { step: usize, steps: usize },
    #[error("form has already been submitted")]
    Submitted,
    #[error("field {field} expects {expected}")]
    WrongKind { field: String, expected: &'static str },
    #[error("field {0} does not accept uploads")]
    NotAFileField(String),
    #[error("upload rejected for {field}: {message}")]
    UploadRejected { field: String, message: String },
    #[error("state storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type FormResult<T> = std::result::Result<T, FormError>;

/// Errors from the persisted client-state store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid slot name: {0}")]
    InvalidSlot(String),
    #[error("invalid state configuration: {0}")]
    InvalidConfig(String),
    #[error("state directory is not usable: {0}")]
    InvalidDirectory(String),
    #[error("failed to read slot: {0}")]
    Read(std::io::Error),
    #[error("failed to write slot: {0}")]
    Write(std::io::Error),
    #[error("failed to remove slot: {0}")]
    Remove(std::io::Error),
    #[error("failed to serialize slot: {0}")]
    Serialization(serde_json::Error),
    #[error("malformed slot contents at {path}: {message}")]
    Malformed { path: String, message: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Why a submission attempt did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Validation of the final step (or every step, for section forms) failed.
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),
    /// A submission is already in flight.
    #[error("a submission is already in progress")]
    InFlight,
    #[error("form has already been submitted")]
    AlreadySubmitted,
    /// `finish_submit` was called without a matching `begin_submit`.
    #[error("no submission is in progress")]
    NotSubmitting,
    /// The sink could not be reached or rejected the request.
    #[error("submission failed: {0}")]
    Transport(String),
}
