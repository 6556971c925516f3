//! Constants used throughout the camp core crate.
//!
//! Storage slot names match the keys the registration site has always used, so
//! persisted progress stays readable across releases.

/// Slot holding the landing page's city / date / category preselection.
pub const SELECTION_SLOT: &str = "fcfCampsSelection";

/// Slot holding the in-progress registration record.
pub const REGISTRATION_SLOT: &str = "fcfCampsFormData";

/// Slot holding the post-payment supplemental information record.
pub const SUPPLEMENTAL_SLOT: &str = "fcfCampsAdditionalData";

/// Slot holding the short pre-registration record.
pub const PRE_REGISTRATION_SLOT: &str = "fcfCampsPreRegistration";

/// Every slot the site writes; used when clearing local state.
pub const ALL_SLOTS: [&str; 4] = [
    SELECTION_SLOT,
    REGISTRATION_SLOT,
    SUPPLEMENTAL_SLOT,
    PRE_REGISTRATION_SLOT,
];

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Media types accepted for document uploads.
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/png", "image/jpg"];

/// Persisted state older than this is discarded on read.
pub const DEFAULT_STATE_TTL_DAYS: i64 = 30;

/// Directory used for persisted state when none is configured.
pub const DEFAULT_STATE_DIR: &str = ".camp-state";

/// File extension used by the directory-backed state store.
pub const SLOT_FILE_EXTENSION: &str = "json";

/// Error-map key used for submission transport failures.
pub const SUBMIT_ERROR_FIELD: &str = "submit";

/// Banner message shown when the submission sink could not be reached.
pub const SUBMIT_ERROR_MESSAGE: &str =
    "Hubo un error al enviar el formulario. Por favor intenta de nuevo.";

/// Default country for birth and residence fields.
pub const DEFAULT_COUNTRY: &str = "Colombia";
