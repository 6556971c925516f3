//! The boundary between a completed form and wherever it is recorded.

use crate::definition::FormId;
use crate::record::FormRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;

/// A validated record on its way to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub form: FormId,
    pub record: FormRecord,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(form: FormId, record: FormRecord) -> Self {
        Self {
            form,
            record,
            submitted_at: Utc::now(),
        }
    }
}

/// What the sink handed back for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Receipt {
    /// A row was appended to the spreadsheet.
    Appended,
    /// An order was created and awaits payment at `payment_url`.
    Order { order_id: u64, payment_url: String },
}

/// Destination for completed forms.
///
/// A sink makes a single attempt; retrying is left to the person filling the form.
pub trait SubmissionSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn submit(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<Receipt, Self::Error>> + Send;
}
