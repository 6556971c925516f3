//! Commerce-order sink (WooCommerce REST shape).
//!
//! Deprecated in favour of the spreadsheet sink; kept for stores that still take
//! payment through a hosted checkout. Submitting looks up the product for the selected
//! city, then creates an unpaid order whose `payment_url` the family opens to pay.

use crate::config::CommerceConfig;
use crate::error::{SinkError, SinkResult};
use crate::http;
use camp_core::catalogue;
use camp_core::{FormId, FormRecord, Receipt, Submission, SubmissionSink};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_PREFIX: &str = "wp-json/wc/v3";

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
struct Billing<'a> {
    first_name: &'a str,
    email: &'a str,
    phone: &'a str,
    address_1: &'a str,
    city: &'a str,
    country: &'a str,
}

#[derive(Debug, Serialize)]
struct LineItem {
    product_id: u64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct MetaEntry {
    key: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct NewOrder<'a> {
    set_paid: bool,
    billing: Billing<'a>,
    line_items: Vec<LineItem>,
    meta_data: Vec<MetaEntry>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: u64,
    status: String,
    #[serde(default)]
    payment_url: String,
}

/// Payment state derived from the order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Paid,
    Failed,
}

impl PaymentState {
    pub fn from_status(status: &str) -> Self {
        match status {
            "processing" | "completed" => PaymentState::Paid,
            "failed" | "cancelled" | "refunded" => PaymentState::Failed,
            _ => PaymentState::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentState::Pending => "pending",
            PaymentState::Paid => "paid",
            PaymentState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatus {
    pub order_id: u64,
    pub status: String,
    pub payment: PaymentState,
}

#[derive(Debug, Clone)]
pub struct CommerceSink {
    config: CommerceConfig,
    client: Client,
}

impl CommerceSink {
    pub fn new(config: CommerceConfig) -> SinkResult<Self> {
        Ok(Self {
            config,
            client: http::client()?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        http::join(&http::join(&self.config.base_url, API_PREFIX), path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.endpoint(path))
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: String,
        response: reqwest::Response,
    ) -> SinkResult<T> {
        let response = http::ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| SinkError::UnexpectedResponse {
                endpoint,
                message: e.to_string(),
            })
    }

    /// Finds the camp product whose name matches `city` (a catalogue id or display name).
    pub async fn find_product(&self, city: &str) -> SinkResult<Product> {
        let term = catalogue::city(city).map_or(city, |c| c.name);
        let response = self
            .get("products")
            .query(&[("search", term)])
            .send()
            .await
            .map_err(SinkError::transport)?;
        let products: Vec<Product> = Self::decode(self.endpoint("products"), response).await?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| SinkError::ProductNotFound(term.to_string()))
    }

    /// Creates an unpaid order for the submission's payer and participant.
    pub async fn create_order(&self, submission: &Submission) -> SinkResult<Receipt> {
        let record = &submission.record;
        let product = self.find_product(record.text("city").trim()).await?;
        let order = NewOrder {
            set_paid: false,
            billing: billing(record),
            line_items: vec![LineItem {
                product_id: product.id,
                quantity: 1,
            }],
            meta_data: metadata(record),
        };

        let response = self
            .client
            .post(self.endpoint("orders"))
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .json(&order)
            .send()
            .await
            .map_err(SinkError::transport)?;
        let created: OrderResponse = Self::decode(self.endpoint("orders"), response).await?;

        if created.payment_url.is_empty() {
            return Err(SinkError::UnexpectedResponse {
                endpoint: self.endpoint("orders"),
                message: format!("order {} has no payment_url", created.id),
            });
        }
        tracing::info!(
            "Created order {} for {} ({})",
            created.id,
            product.name,
            created.status
        );
        Ok(Receipt::Order {
            order_id: created.id,
            payment_url: created.payment_url,
        })
    }

    pub async fn order_status(&self, order_id: u64) -> SinkResult<OrderStatus> {
        let path = format!("orders/{order_id}");
        let response = self
            .get(&path)
            .send()
            .await
            .map_err(SinkError::transport)?;
        let order: OrderResponse = Self::decode(self.endpoint(&path), response).await?;
        Ok(OrderStatus {
            order_id: order.id,
            payment: PaymentState::from_status(&order.status),
            status: order.status,
        })
    }

    /// Polls the order every `interval` until it is paid or has failed.
    ///
    /// # Errors
    ///
    /// [`SinkError::PaymentFailed`] when the order is failed, cancelled or refunded and
    /// [`SinkError::PaymentTimeout`] when `attempts` checks pass without payment.
    pub async fn wait_for_payment(
        &self,
        order_id: u64,
        interval: Duration,
        attempts: usize,
    ) -> SinkResult<OrderStatus> {
        for attempt in 1..=attempts {
            let status = self.order_status(order_id).await?;
            match status.payment {
                PaymentState::Paid => return Ok(status),
                PaymentState::Failed => {
                    return Err(SinkError::PaymentFailed {
                        order_id,
                        status: status.status,
                    });
                }
                PaymentState::Pending => {
                    tracing::debug!(
                        "Order {} still {} (check {})",
                        order_id,
                        status.status,
                        attempt
                    );
                }
            }
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Err(SinkError::PaymentTimeout { order_id, attempts })
    }
}

fn billing(record: &FormRecord) -> Billing<'_> {
    let pick = |primary: &'static str, fallback: &'static str| {
        let value = record.text(primary).trim();
        if value.is_empty() {
            record.text(fallback).trim()
        } else {
            value
        }
    };
    Billing {
        first_name: pick("payerName", "name"),
        email: pick("payerEmail", "email"),
        phone: pick("payerPhone", "phone"),
        address_1: record.text("payerAddress").trim(),
        city: record.text("payerCity").trim(),
        country: record.text("payerCountry").trim(),
    }
}

fn metadata(record: &FormRecord) -> Vec<MetaEntry> {
    let participant = [record.text("childName"), record.text("childLastName")]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let participant = if participant.is_empty() {
        record.text("name").trim().to_string()
    } else {
        participant
    };

    let city = record.text("city").trim();
    let category = record.text("category").trim();
    let date = match record.text("campDate").trim() {
        "" => record.text("date").trim(),
        date => date,
    };

    vec![
        MetaEntry {
            key: "Participante",
            value: participant,
        },
        MetaEntry {
            key: "Ciudad",
            value: catalogue::city(city).map_or(city, |c| c.name).to_string(),
        },
        MetaEntry {
            key: "Categoría",
            value: catalogue::category(category)
                .map_or(category, |c| c.title)
                .to_string(),
        },
        MetaEntry {
            key: "Fecha",
            value: catalogue::camp_date(date).map_or(date, |d| d.label).to_string(),
        },
    ]
}

impl SubmissionSink for CommerceSink {
    type Error = SinkError;

    /// Only registrations become orders; the other forms have nothing to pay for.
    async fn submit(&self, submission: &Submission) -> SinkResult<Receipt> {
        if submission.form != FormId::Registration {
            tracing::warn!("Commerce sink refused a {} submission", submission.form);
            return Err(SinkError::Unsupported(submission.form.as_str()));
        }
        self.create_order(submission).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Store {
        orders: Arc<Mutex<Vec<Value>>>,
        status_checks: Arc<AtomicUsize>,
        /// Statuses returned by successive order lookups; the last one repeats.
        statuses: Arc<Vec<&'static str>>,
    }

    async fn products(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
        match query.get("search").map(String::as_str) {
            Some("Bogotá") => Json(json!([{"id": 77, "name": "FCF Camps Bogotá"}])),
            _ => Json(json!([])),
        }
    }

    async fn create_order(State(store): State<Store>, Json(body): Json<Value>) -> Json<Value> {
        store.orders.lock().unwrap().push(body);
        Json(json!({
            "id": 5012,
            "status": "pending",
            "payment_url": "https://tienda.example.com/checkout/order-pay/5012/?key=wc_order_x"
        }))
    }

    async fn order(State(store): State<Store>, Path(id): Path<u64>) -> Json<Value> {
        let n = store.status_checks.fetch_add(1, Ordering::SeqCst);
        let status = store
            .statuses
            .get(n)
            .or(store.statuses.last())
            .copied()
            .unwrap_or("pending");
        Json(json!({"id": id, "status": status}))
    }

    async fn fake_store(statuses: Vec<&'static str>) -> (CommerceSink, Store) {
        let store = Store {
            statuses: Arc::new(statuses),
            ..Store::default()
        };
        let app = Router::new()
            .route("/wp-json/wc/v3/products", get(products))
            .route("/wp-json/wc/v3/orders", post(create_order))
            .route("/wp-json/wc/v3/orders/:id", get(order))
            .with_state(store.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let sink = CommerceSink::new(CommerceConfig {
            base_url: format!("http://{addr}/"),
            consumer_key: "ck_test".into(),
            consumer_secret: "cs_test".into(),
        })
        .unwrap();
        (sink, store)
    }

    fn registration(city: &str) -> Submission {
        Submission::new(
            FormId::Registration,
            FormRecord::new()
                .with("city", city)
                .with("campDate", "bog-2")
                .with("category", "infantil")
                .with("childName", "Sofía")
                .with("childLastName", "Ramírez")
                .with("payerName", "Laura Peña")
                .with("payerEmail", "laura@example.com")
                .with("payerPhone", "3105551234"),
        )
    }

    #[test]
    fn test_payment_state_mapping() {
        assert_eq!(PaymentState::from_status("completed"), PaymentState::Paid);
        assert_eq!(PaymentState::from_status("processing"), PaymentState::Paid);
        assert_eq!(PaymentState::from_status("refunded"), PaymentState::Failed);
        assert_eq!(PaymentState::from_status("on-hold"), PaymentState::Pending);
    }

    #[tokio::test]
    async fn test_submit_creates_order_with_metadata() {
        let (sink, store) = fake_store(vec!["pending"]).await;
        let receipt = sink.submit(&registration("bogota")).await.unwrap();

        assert_eq!(
            receipt,
            Receipt::Order {
                order_id: 5012,
                payment_url: "https://tienda.example.com/checkout/order-pay/5012/?key=wc_order_x"
                    .into(),
            }
        );

        let orders = store.orders.lock().unwrap();
        let order = &orders[0];
        assert_eq!(order["line_items"][0]["product_id"], 77);
        assert_eq!(order["billing"]["first_name"], "Laura Peña");
        assert_eq!(order["meta_data"][0]["value"], "Sofía Ramírez");
        assert_eq!(order["meta_data"][2]["value"], "Infantil");
        assert_eq!(order["set_paid"], false);
    }

    #[tokio::test]
    async fn test_only_registrations_become_orders() {
        let (sink, store) = fake_store(vec!["pending"]).await;
        for form in [FormId::Supplemental, FormId::PreRegistration] {
            let submission = Submission::new(form, registration("bogota").record);
            let err = sink.submit(&submission).await.unwrap_err();
            assert!(matches!(err, SinkError::Unsupported(name) if name == form.as_str()));
        }
        assert!(store.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_city_has_no_product() {
        let (sink, store) = fake_store(vec!["pending"]).await;
        let err = sink.submit(&registration("medellin")).await.unwrap_err();
        assert!(matches!(err, SinkError::ProductNotFound(ref city) if city == "medellin"));
        assert!(store.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_payment_polls_until_paid() {
        let (sink, store) = fake_store(vec!["pending", "on-hold", "processing"]).await;
        let status = sink
            .wait_for_payment(5012, Duration::from_millis(1), 5)
            .await
            .unwrap();
        assert_eq!(status.payment, PaymentState::Paid);
        assert_eq!(store.status_checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_for_payment_reports_failure() {
        let (sink, _store) = fake_store(vec!["cancelled"]).await;
        let err = sink
            .wait_for_payment(5012, Duration::from_millis(1), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::PaymentFailed { order_id: 5012, .. }));
    }

    #[tokio::test]
    async fn test_wait_for_payment_times_out() {
        let (sink, store) = fake_store(vec!["pending"]).await;
        let err = sink
            .wait_for_payment(5012, Duration::from_millis(1), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::PaymentTimeout { attempts: 2, .. }));
        assert_eq!(store.status_checks.load(Ordering::SeqCst), 2);
    }
}
