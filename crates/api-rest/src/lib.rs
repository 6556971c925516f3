//! # Camp REST API
//!
//! HTTP surface over the form engine:
//! - the landing page's pre-registration submit route
//! - per-step validation and full submission of any form
//! - the camp catalogue
//! - order status polling when the commerce sink is active
//!
//! Handlers build a [`FormController`] per request, so every rule the interactive
//! clients see is applied here as well. OpenAPI is served at `/api-docs/openapi.json`
//! with Swagger UI at `/swagger-ui`.

pub mod dto;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use camp_core::{
    FormController, FormError, FormId, FormRecord, Receipt, SubmitError, SubmissionSink,
    ValidationErrors,
};
use camp_sinks::{Sink, SinkConfig, SinkEnv, SinkError, SinkResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{
    CampDateRes, CatalogueRes, CategoryRes, CityRes, ErrorRes, ErrorsRes, FormSubmitRes,
    HealthRes, OrderStatusRes, PreRegistrationReq, PriceRes, RecordReq, StepValidationRes,
    SubmitRes,
};

/// Message returned when a pre-registration cannot be forwarded.
pub const PROCESSING_ERROR: &str = "Error al procesar el formulario";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    sink: Arc<Sink>,
}

impl AppState {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// State with the sink selected by the process environment.
    pub fn from_env() -> SinkResult<Self> {
        let config = SinkConfig::from_env_values(SinkEnv::from_process())?;
        tracing::info!("Using {} sink", config.kind());
        Ok(Self::new(Sink::from_config(config)?))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        catalogue,
        submit_pre_registration,
        validate_step,
        submit_form,
        order_status,
    ),
    components(schemas(
        HealthRes,
        CatalogueRes,
        CityRes,
        CampDateRes,
        CategoryRes,
        PriceRes,
        PreRegistrationReq,
        RecordReq,
        SubmitRes,
        FormSubmitRes,
        StepValidationRes,
        ErrorsRes,
        ErrorRes,
        OrderStatusRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalogue", get(catalogue))
        .route("/api/submit-form", post(submit_pre_registration))
        .route("/api/forms/:form/steps/:step/validate", post(validate_step))
        .route("/api/forms/:form/submit", post(submit_form))
        .route("/api/orders/:id", get(order_status))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler failures and the status each maps to.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with the per-field messages.
    Invalid(ValidationErrors),
    BadRequest(String),
    NotFound(String),
    /// 502: the sink answered with an error.
    Upstream(String),
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = |status: StatusCode, error: String| (status, Json(ErrorRes { error }));
        match self {
            ApiError::Invalid(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorsRes {
                    errors: dto::error_map(&errors),
                }),
            )
                .into_response(),
            ApiError::BadRequest(message) => {
                error(StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::NotFound(message) => error(StatusCode::NOT_FOUND, message).into_response(),
            ApiError::Upstream(message) => error(StatusCode::BAD_GATEWAY, message).into_response(),
            ApiError::Internal(message) => {
                error(StatusCode::INTERNAL_SERVER_ERROR, message.into()).into_response()
            }
        }
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::UnknownForm(_) | FormError::StepOutOfRange { .. } => {
                ApiError::NotFound(err.to_string())
            }
            FormError::UnknownField { .. } | FormError::WrongKind { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => {
                tracing::error!("Form error: {}", other);
                ApiError::Internal("Internal error")
            }
        }
    }
}

fn parse_form(form: &str) -> Result<FormId, ApiError> {
    Ok(form.parse::<FormId>()?)
}

/// A controller for `form` holding `record`.
///
/// Undeclared fields, values of the wrong kind and file references are rejected;
/// uploads are not accepted over this API.
fn load(form: FormId, record: FormRecord) -> Result<FormController, ApiError> {
    let mut controller = FormController::for_form(form);
    for (name, value) in record.iter() {
        controller.update_field(name, value.clone())?;
    }
    Ok(controller)
}

fn validate_all(controller: &FormController) -> Result<(), ApiError> {
    let errors = controller.definition().validate_all(controller.record());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Invalid(errors))
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "API funcionando correctamente".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/catalogue",
    responses(
        (
            status = 200,
            description = "Cities, camp weeks, categories and price",
            body = CatalogueRes
        )
    )
)]
#[axum::debug_handler]
async fn catalogue(State(_state): State<AppState>) -> Json<CatalogueRes> {
    Json(CatalogueRes::current())
}

#[utoipa::path(
    post,
    path = "/api/submit-form",
    request_body = PreRegistrationReq,
    responses(
        (status = 200, description = "Pre-registration recorded", body = SubmitRes),
        (status = 400, description = "Validation failed", body = ErrorsRes),
        (status = 500, description = "Sink unavailable", body = ErrorRes)
    )
)]
/// Validates a pre-registration and appends it through the configured sink.
#[axum::debug_handler]
async fn submit_pre_registration(
    State(state): State<AppState>,
    Json(req): Json<PreRegistrationReq>,
) -> Result<Json<SubmitRes>, ApiError> {
    let mut controller = load(FormId::PreRegistration, req.to_record())?;
    validate_all(&controller)?;

    let mut submission = controller.begin_submit().map_err(|e| {
        tracing::error!("Pre-registration could not start: {}", e);
        ApiError::Internal(PROCESSING_ERROR)
    })?;
    if let Some(at) = req
        .timestamp
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
    {
        submission.submitted_at = at.with_timezone(&Utc);
    }

    let outcome = state
        .sink
        .submit(&submission)
        .await
        .map_err(|e| e.to_string());
    match controller.finish_submit(outcome) {
        Ok(_) => Ok(Json(SubmitRes { success: true })),
        Err(e) => {
            tracing::error!("Pre-registration submit error: {}", e);
            Err(ApiError::Internal(PROCESSING_ERROR))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/forms/{form}/steps/{step}/validate",
    params(
        ("form" = String, Path, description = "registration, supplemental or pre-registration"),
        ("step" = usize, Path, description = "1-based step index")
    ),
    request_body = RecordReq,
    responses(
        (status = 200, description = "Per-field errors for the step", body = StepValidationRes),
        (status = 400, description = "Undeclared field or wrong value kind", body = ErrorRes),
        (status = 404, description = "Unknown form or step", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn validate_step(
    State(_state): State<AppState>,
    Path((form, step)): Path<(String, usize)>,
    Json(RecordReq(record)): Json<RecordReq>,
) -> Result<Json<StepValidationRes>, ApiError> {
    let mut controller = load(parse_form(&form)?, record)?;
    let errors = controller.validate_step(step)?;
    Ok(Json(StepValidationRes {
        valid: errors.is_empty(),
        errors: dto::error_map(&errors),
    }))
}

#[utoipa::path(
    post,
    path = "/api/forms/{form}/submit",
    params(
        ("form" = String, Path, description = "registration, supplemental or pre-registration")
    ),
    request_body = RecordReq,
    responses(
        (status = 200, description = "Submission accepted", body = FormSubmitRes),
        (status = 400, description = "Validation failed", body = ErrorsRes),
        (status = 404, description = "Unknown form", body = ErrorRes),
        (status = 500, description = "Sink unavailable", body = ErrorRes)
    )
)]
/// Validates every step of the record and forwards it to the configured sink.
#[axum::debug_handler]
async fn submit_form(
    State(state): State<AppState>,
    Path(form): Path<String>,
    Json(RecordReq(record)): Json<RecordReq>,
) -> Result<Json<FormSubmitRes>, ApiError> {
    let mut controller = load(parse_form(&form)?, record)?;
    validate_all(&controller)?;

    match controller.submit(state.sink.as_ref()).await {
        Ok(Receipt::Appended) => Ok(Json(FormSubmitRes {
            success: true,
            order_id: None,
            payment_url: None,
        })),
        Ok(Receipt::Order {
            order_id,
            payment_url,
        }) => Ok(Json(FormSubmitRes {
            success: true,
            order_id: Some(order_id),
            payment_url: Some(payment_url),
        })),
        Err(SubmitError::Invalid(errors)) => Err(ApiError::Invalid(errors)),
        Err(e) => {
            tracing::error!("Submit {} error: {}", form, e);
            Err(ApiError::Internal(PROCESSING_ERROR))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = u64, Path, description = "Store order id")
    ),
    responses(
        (status = 200, description = "Order payment status", body = OrderStatusRes),
        (status = 404, description = "No commerce sink or unknown order", body = ErrorRes),
        (status = 502, description = "Store error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn order_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<OrderStatusRes>, ApiError> {
    let commerce = state
        .sink
        .commerce()
        .ok_or_else(|| ApiError::NotFound("Orders are not available with the sheet sink".into()))?;

    match commerce.order_status(id).await {
        Ok(status) => Ok(Json(OrderStatusRes {
            order_id: status.order_id,
            status: status.status,
            payment: status.payment.as_str().into(),
        })),
        Err(SinkError::Http {
            status: Some(404), ..
        }) => Err(ApiError::NotFound(format!("Order {id} not found"))),
        Err(e) => {
            tracing::error!("Order status error: {}", e);
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}
