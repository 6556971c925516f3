//! Sink selection and credentials.
//!
//! Values are read from the environment once at startup ([`SinkEnv::from_process`]) and
//! parsed by [`SinkConfig::from_env_values`], which never touches the environment itself.

use crate::error::{SinkError, SinkResult};
use camp_types::NonEmptyText;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEET_RANGE: &str = "A1";

/// Raw values of the sink environment variables.
#[derive(Debug, Clone, Default)]
pub struct SinkEnv {
    /// `CAMP_SINK`: `sheet` (default) or `commerce`.
    pub sink: Option<String>,
    pub sheet_id: Option<String>,
    pub sheet_range: Option<String>,
    pub sheets_token: Option<String>,
    pub sheets_base_url: Option<String>,
    pub woo_base_url: Option<String>,
    pub woo_consumer_key: Option<String>,
    pub woo_consumer_secret: Option<String>,
}

impl SinkEnv {
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            sink: var("CAMP_SINK"),
            sheet_id: var("GOOGLE_SHEET_ID"),
            sheet_range: var("GOOGLE_SHEET_RANGE"),
            sheets_token: var("GOOGLE_SHEETS_TOKEN"),
            sheets_base_url: var("GOOGLE_SHEETS_BASE_URL"),
            woo_base_url: var("WOO_BASE_URL"),
            woo_consumer_key: var("WOO_CONSUMER_KEY"),
            woo_consumer_secret: var("WOO_CONSUMER_SECRET"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub base_url: String,
    pub sheet_id: String,
    /// A1 range the row is appended after, e.g. `A1` or `Preinscripciones!A1`.
    pub range: String,
    /// Already-issued OAuth bearer token.
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommerceConfig {
    /// Store root, e.g. `https://tienda.example.com`; the REST prefix is appended.
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Sheet(SheetConfig),
    Commerce(CommerceConfig),
}

fn non_empty(value: Option<String>) -> Option<String> {
    NonEmptyText::from_optional(value).map(NonEmptyText::into_string)
}

fn required(value: Option<String>, name: &str) -> SinkResult<String> {
    non_empty(value).ok_or_else(|| SinkError::InvalidConfig(format!("{name} is required")))
}

impl SinkConfig {
    pub fn from_env_values(env: SinkEnv) -> SinkResult<Self> {
        let kind = non_empty(env.sink).unwrap_or_else(|| "sheet".into());
        match kind.to_ascii_lowercase().as_str() {
            "sheet" => Ok(SinkConfig::Sheet(SheetConfig {
                base_url: non_empty(env.sheets_base_url)
                    .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.into()),
                sheet_id: required(env.sheet_id, "GOOGLE_SHEET_ID")?,
                range: non_empty(env.sheet_range).unwrap_or_else(|| DEFAULT_SHEET_RANGE.into()),
                token: required(env.sheets_token, "GOOGLE_SHEETS_TOKEN")?,
            })),
            "commerce" => Ok(SinkConfig::Commerce(CommerceConfig {
                base_url: required(env.woo_base_url, "WOO_BASE_URL")?,
                consumer_key: required(env.woo_consumer_key, "WOO_CONSUMER_KEY")?,
                consumer_secret: required(env.woo_consumer_secret, "WOO_CONSUMER_SECRET")?,
            })),
            other => Err(SinkError::InvalidConfig(format!(
                "CAMP_SINK must be 'sheet' or 'commerce', got '{other}'"
            ))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SinkConfig::Sheet(_) => "sheet",
            SinkConfig::Commerce(_) => "commerce",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_env() -> SinkEnv {
        SinkEnv {
            sheet_id: Some("abc123".into()),
            sheets_token: Some("token".into()),
            ..SinkEnv::default()
        }
    }

    #[test]
    fn test_sheet_is_default_with_defaults_filled() {
        let config = SinkConfig::from_env_values(sheet_env()).unwrap();
        assert_eq!(
            config,
            SinkConfig::Sheet(SheetConfig {
                base_url: DEFAULT_SHEETS_BASE_URL.into(),
                sheet_id: "abc123".into(),
                range: "A1".into(),
                token: "token".into(),
            })
        );
        assert_eq!(config.kind(), "sheet");
    }

    #[test]
    fn test_sheet_requires_id_and_token() {
        let err = SinkConfig::from_env_values(SinkEnv::default()).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_SHEET_ID"));

        let env = SinkEnv {
            sheets_token: Some("  ".into()),
            ..sheet_env()
        };
        let err = SinkConfig::from_env_values(env).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_SHEETS_TOKEN"));
    }

    #[test]
    fn test_commerce_selection() {
        let env = SinkEnv {
            sink: Some("Commerce".into()),
            woo_base_url: Some("https://tienda.example.com".into()),
            woo_consumer_key: Some("ck".into()),
            woo_consumer_secret: Some("cs".into()),
            ..SinkEnv::default()
        };
        let config = SinkConfig::from_env_values(env).unwrap();
        assert_eq!(config.kind(), "commerce");
    }

    #[test]
    fn test_unknown_sink_rejected() {
        let env = SinkEnv {
            sink: Some("email".into()),
            ..sheet_env()
        };
        assert!(matches!(
            SinkConfig::from_env_values(env),
            Err(SinkError::InvalidConfig(_))
        ));
    }
}
