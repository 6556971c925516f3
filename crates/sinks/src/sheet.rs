//! Append-only spreadsheet sink.
//!
//! Each submission becomes one row appended through the Sheets `values:append`
//! endpoint. Pre-registrations use the fixed column layout the sheet has always had;
//! other forms write the submission time followed by one cell per declared field.

use crate::config::SheetConfig;
use crate::error::{SinkError, SinkResult};
use crate::http;
use camp_core::catalogue;
use camp_core::forms;
use camp_core::{FormId, Receipt, Submission, SubmissionSink};
use chrono::SecondsFormat;
use reqwest::{Client, Url};
use serde_json::json;

/// Column order of the pre-registration sheet.
pub const PRE_REGISTRATION_COLUMNS: [&str; 8] = [
    "Timestamp",
    "Categoría",
    "Rango de Edad",
    "Nombre",
    "Email",
    "Teléfono",
    "Ciudad",
    "Fecha Preferida",
];

#[derive(Debug, Clone)]
pub struct SheetSink {
    config: SheetConfig,
    client: Client,
}

impl SheetSink {
    pub fn new(config: SheetConfig) -> SinkResult<Self> {
        Ok(Self {
            config,
            client: http::client()?,
        })
    }

    /// Header names matching [`row`](Self::row) for `form`.
    pub fn columns(form: FormId) -> Vec<&'static str> {
        match form {
            FormId::PreRegistration => PRE_REGISTRATION_COLUMNS.to_vec(),
            _ => std::iter::once("Timestamp")
                .chain(forms::definition(form).fields().map(|f| f.name))
                .collect(),
        }
    }

    /// The cells written for `submission`.
    pub fn row(submission: &Submission) -> Vec<String> {
        let timestamp = submission
            .submitted_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let record = &submission.record;

        match submission.form {
            FormId::PreRegistration => {
                let category_id = record.text("category").trim();
                let category = catalogue::category(category_id);
                let city_id = record.text("city").trim();
                let date_id = record.text("date").trim();
                vec![
                    timestamp,
                    category.map_or(category_id, |c| c.title).to_string(),
                    category.map_or("", |c| c.age_range).to_string(),
                    record.get("name").to_cell(),
                    record.get("email").to_cell(),
                    record.get("phone").to_cell(),
                    catalogue::city(city_id).map_or(city_id, |c| c.name).to_string(),
                    catalogue::camp_date(date_id).map_or(date_id, |d| d.label).to_string(),
                ]
            }
            form => std::iter::once(timestamp)
                .chain(
                    forms::definition(form)
                        .fields()
                        .map(|f| record.get(f.name).to_cell()),
                )
                .collect(),
        }
    }

    fn append_url(&self) -> SinkResult<Url> {
        let invalid = |message: String| SinkError::InvalidConfig(message);
        let range = format!("{}:append", self.config.range);
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| invalid(format!("GOOGLE_SHEETS_BASE_URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| invalid("GOOGLE_SHEETS_BASE_URL cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.config.sheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }

    /// Appends one row. A single attempt is made.
    pub async fn append(&self, row: Vec<String>) -> SinkResult<()> {
        let url = self.append_url()?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(SinkError::transport)?;
        http::ensure_success(response).await?;
        Ok(())
    }
}

impl SubmissionSink for SheetSink {
    type Error = SinkError;

    async fn submit(&self, submission: &Submission) -> SinkResult<Receipt> {
        self.append(Self::row(submission)).await?;
        tracing::info!("Appended {} submission to sheet", submission.form);
        Ok(Receipt::Appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use camp_core::FormRecord;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(String, HashMap<String, String>, Option<String>, Value)>>>,
        fail: bool,
    }

    async fn append(
        State(captured): State<Captured>,
        Path((sheet_id, range)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured
            .requests
            .lock()
            .unwrap()
            .push((format!("{sheet_id}/{range}"), query, auth, body));
        if captured.fail {
            (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"message": "The caller does not have permission"}})),
            )
        } else {
            (StatusCode::OK, Json(json!({"updates": {"updatedRows": 1}})))
        }
    }

    async fn fake_sheets(fail: bool) -> (String, Captured) {
        let captured = Captured {
            fail,
            ..Captured::default()
        };
        let app = Router::new()
            .route("/v4/spreadsheets/:id/values/:range", post(append))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    fn sink(base_url: String) -> SheetSink {
        SheetSink::new(SheetConfig {
            base_url,
            sheet_id: "sheet-1".into(),
            range: "A1".into(),
            token: "ya29.token".into(),
        })
        .unwrap()
    }

    fn pre_registration() -> Submission {
        Submission {
            form: FormId::PreRegistration,
            record: FormRecord::new()
                .with("city", "bogota")
                .with("date", "bog-1")
                .with("category", "infantil")
                .with("name", "Valentina Ortiz")
                .with("email", "vale@example.com")
                .with("phone", "+57 300 123 4567"),
            submitted_at: Utc.with_ymd_and_hms(2025, 5, 2, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_pre_registration_row_layout() {
        let row = SheetSink::row(&pre_registration());
        assert_eq!(
            row,
            vec![
                "2025-05-02T14:30:00.000Z",
                "Infantil",
                "12 a 13 años",
                "Valentina Ortiz",
                "vale@example.com",
                "+57 300 123 4567",
                "Bogotá",
                "16 AL 21 JUNIO - SEMANA 1",
            ]
        );
        assert_eq!(row.len(), PRE_REGISTRATION_COLUMNS.len());
    }

    #[test]
    fn test_other_forms_write_one_cell_per_field() {
        let definition = forms::definition(FormId::Supplemental);
        let submission = Submission::new(
            FormId::Supplemental,
            definition.empty_record().with("usaLentes", true),
        );
        let row = SheetSink::row(&submission);
        let columns = SheetSink::columns(FormId::Supplemental);
        assert_eq!(row.len(), columns.len());
        let lentes = columns.iter().position(|c| *c == "usaLentes").unwrap();
        assert_eq!(row[lentes], "Sí");
    }

    #[tokio::test]
    async fn test_append_posts_row_with_bearer_token() {
        let (base_url, captured) = fake_sheets(false).await;
        let receipt = sink(base_url).submit(&pre_registration()).await.unwrap();
        assert_eq!(receipt, Receipt::Appended);

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (target, query, auth, body) = &requests[0];
        assert_eq!(target, "sheet-1/A1:append");
        assert_eq!(query.get("valueInputOption").map(String::as_str), Some("USER_ENTERED"));
        assert_eq!(auth.as_deref(), Some("Bearer ya29.token"));
        assert_eq!(body["values"][0][3], "Valentina Ortiz");
    }

    #[tokio::test]
    async fn test_http_error_maps_to_sink_error_without_retry() {
        let (base_url, captured) = fake_sheets(true).await;
        let err = sink(base_url).submit(&pre_registration()).await.unwrap_err();
        assert!(matches!(err, SinkError::Http { status: Some(403), .. }));
        assert_eq!(captured.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let err = sink("http://127.0.0.1:9".into())
            .submit(&pre_registration())
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Http { status: None, .. }));
    }
}
