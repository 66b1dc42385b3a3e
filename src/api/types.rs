//! Wire types for the clinic backend and schema checks at the boundary.
//!
//! Every response goes through [`decode_body`]: the HTTP status and the
//! `status` field are checked first, then the body is deserialized into
//! the endpoint's envelope. A 2xx body that does not deserialize is a
//! [`ApiError::Malformed`], never a silently defaulted value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::models::{AppointmentStatus, PatientId, PaymentMethod};

/// Whether an endpoint signals success through `"status": "success"`
/// in addition to the HTTP code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only the HTTP code matters (`GET /patients`).
    HttpOnly,
    /// HTTP 2xx and `status == "success"` are both required.
    RequireSuccess,
    /// HTTP 2xx and `ok == true` are both required (`/api/bot/*`).
    RequireOk,
}

// ═══════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentRequest {
    pub appointment_id: u64,
    pub symptom: String,
    pub diagnosis: String,
    pub advice: String,
}

/// Query for `GET /appointments`. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAppointmentRequest {
    pub patient_id: PatientId,
    pub doctor_id: u64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
}

/// Body of `PUT /appointments/{id}`. Only the fields being changed are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RescheduleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl RescheduleRequest {
    pub fn is_empty(&self) -> bool {
        self.appointment_date.is_none()
            && self.appointment_time.is_none()
            && self.doctor_id.is_none()
            && self.status.is_none()
    }
}

/// Body of `POST /api/bot/validate_appointment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCheckRequest {
    pub patient_id: PatientId,
    pub doctor_id: u64,
    /// `YYYY-MM-DD HH:MM`
    pub appointment_time: String,
}

/// Body of `POST /api/bot/suggest_slots`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotQuery {
    pub doctor_id: u64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayRequest {
    pub amount: f64,
    pub payment_method: PaymentMethod,
}

// ═══════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════

/// `{status?, message?, data?}` — the common response shape.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Account row returned by `POST /login`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginUser {
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginReply {
    pub user: LoginUser,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentReceipt {
    pub treatment_id: u64,
    pub appointment_id: u64,
    pub payment_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedAppointment {
    pub appointment_id: u64,
    pub patient_id: PatientId,
    pub doctor_id: u64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlotSuggestions {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub available_slots: Vec<String>,
}

/// The `patient` row of a summary. The server sends the whole table row;
/// only the columns shown are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryPatient {
    pub patient_id: PatientId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

impl SummaryPatient {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTreatment {
    pub treatment_date: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub advice: Option<String>,
}

/// `GET /api/bot/patient_summary`: the patient plus up to five latest
/// treatments, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient: SummaryPatient,
    #[serde(default)]
    pub recent_treatments: Vec<RecentTreatment>,
}

// ═══════════════════════════════════════════════════════════
// Decoding
// ═══════════════════════════════════════════════════════════

/// Check status and decode a response body into `T`.
pub fn decode_body<T: DeserializeOwned>(
    endpoint: &'static str,
    http_status: u16,
    body: &str,
    policy: StatusPolicy,
) -> Result<T, ApiError> {
    let ok = (200..300).contains(&http_status);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) if ok => {
            return Err(ApiError::Malformed {
                endpoint,
                detail: format!("body is not JSON: {e}"),
            })
        }
        Err(_) => {
            return Err(ApiError::Rejected {
                endpoint,
                status: http_status,
                message: None,
            })
        }
    };

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| joined_errors(&value));

    if !ok {
        return Err(ApiError::Rejected {
            endpoint,
            status: http_status,
            message,
        });
    }

    let accepted = match policy {
        StatusPolicy::HttpOnly => true,
        StatusPolicy::RequireSuccess => {
            value.get("status").and_then(Value::as_str) == Some("success")
        }
        StatusPolicy::RequireOk => value.get("ok").and_then(Value::as_bool) == Some(true),
    };
    if !accepted {
        return Err(ApiError::Rejected {
            endpoint,
            status: http_status,
            message,
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::Malformed {
        endpoint,
        detail: e.to_string(),
    })
}

/// The bot routes report failures as `"errors": [..]` instead of `message`.
fn joined_errors(value: &Value) -> Option<String> {
    let errors: Vec<&str> = value
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.join(", "))
    }
}
