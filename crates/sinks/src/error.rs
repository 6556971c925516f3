#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("invalid sink configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("HTTP request failed (status {status:?}): {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },
    #[error("unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },
    #[error("no product matches city {0}")]
    ProductNotFound(String),
    #[error("order {order_id} payment {status}")]
    PaymentFailed { order_id: u64, status: String },
    #[error("order {order_id} still unpaid after {attempts} checks")]
    PaymentTimeout { order_id: u64, attempts: usize },
    #[error("{0} submissions are not accepted by this sink")]
    Unsupported(&'static str),
}

pub type SinkResult<T> = std::result::Result<T, SinkError>;

impl SinkError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        SinkError::Http {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
