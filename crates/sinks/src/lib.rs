//! # Camp Sinks
//!
//! Destinations for completed camp forms.
//!
//! The spreadsheet sink is the system of record. The commerce sink creates payable
//! orders in a WooCommerce-style store and is deprecated. [`Sink`] dispatches to
//! whichever one the configuration selects.

pub mod commerce;
pub mod config;
pub mod error;
mod http;
pub mod sheet;

pub use commerce::{CommerceSink, OrderStatus, PaymentState};
pub use config::{CommerceConfig, SheetConfig, SinkConfig, SinkEnv};
pub use error::{SinkError, SinkResult};
pub use sheet::SheetSink;

use camp_core::{Receipt, Submission, SubmissionSink};

/// The configured submission sink.
#[derive(Debug, Clone)]
pub enum Sink {
    Sheet(SheetSink),
    Commerce(CommerceSink),
}

impl Sink {
    pub fn from_config(config: SinkConfig) -> SinkResult<Self> {
        match config {
            SinkConfig::Sheet(sheet) => Ok(Sink::Sheet(SheetSink::new(sheet)?)),
            SinkConfig::Commerce(commerce) => {
                tracing::warn!("Commerce sink is deprecated; prefer the sheet sink");
                Ok(Sink::Commerce(CommerceSink::new(commerce)?))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Sink::Sheet(_) => "sheet",
            Sink::Commerce(_) => "commerce",
        }
    }

    /// The commerce sink, when it is the one configured.
    pub fn commerce(&self) -> Option<&CommerceSink> {
        match self {
            Sink::Commerce(commerce) => Some(commerce),
            Sink::Sheet(_) => None,
        }
    }
}

impl SubmissionSink for Sink {
    type Error = SinkError;

    async fn submit(&self, submission: &Submission) -> SinkResult<Receipt> {
        match self {
            Sink::Sheet(sheet) => sheet.submit(submission).await,
            Sink::Commerce(commerce) => commerce.submit(submission).await,
        }
    }
}
