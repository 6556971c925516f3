//! # Camp Core
//!
//! Form engine for the football camp registration site.
//!
//! This crate holds the pure logic behind the multi-step forms:
//! - the form record and its field values
//! - declarative validation rules and the three form variants built from them
//! - the form state controller (step navigation, uploads, submission lifecycle)
//! - persisted client state with expiry
//! - the camp catalogue and price
//!
//! **No transport concerns**: sending a submission anywhere belongs in `camp-sinks`,
//! HTTP serving in `api-rest`.

pub mod catalogue;
pub mod config;
pub mod constants;
pub mod controller;
pub mod definition;
pub mod error;
pub mod forms;
pub mod record;
pub mod rules;
pub mod sink;
pub mod storage;
pub mod upload;
pub mod value;

pub use config::StateConfig;
pub use controller::{FormController, Phase};
pub use definition::{FieldDef, FieldKind, FormDefinition, FormId, StepDefinition};
pub use error::{FormError, FormResult, StorageError, StorageResult, SubmitError};
pub use record::{FormRecord, ValidationErrors};
pub use sink::{Receipt, Submission, SubmissionSink};
pub use storage::{DirStore, FormSnapshot, MemoryStore, PersistedState, Selection, StateStore};
pub use upload::Upload;
pub use value::{FieldValue, FileRef};
