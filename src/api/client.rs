//! `reqwest` implementation of [`ClinicBackend`].

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::types::{
    decode_body, AppointmentQuery, CreatedAppointment, Credentials, Envelope, LoginReply,
    NewAppointmentRequest, PatientSummary, PayRequest, RescheduleRequest, SlotCheckRequest,
    SlotQuery, SlotSuggestions, StatusPolicy, TreatmentReceipt, TreatmentRequest,
};
use super::ClinicBackend;
use crate::config::ClientConfig;
use crate::models::{MedicalRecord, Patient, PatientId, ServerAppointment, UnpaidPayment};

/// HTTP client for the clinic backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, endpoint: &'static str, e: reqwest::Error) -> ApiError {
        let detail = if e.is_connect() {
            format!("cannot connect to {}", self.base_url)
        } else if e.is_timeout() {
            format!("request timed out after {}s", self.timeout_secs)
        } else {
            e.to_string()
        };
        ApiError::Transport { endpoint, detail }
    }

    /// Send, read the body, then hand it to the schema check.
    async fn exchange<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
        policy: StatusPolicy,
    ) -> Result<T, ApiError> {
        tracing::debug!(endpoint, "Backend request");

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        tracing::debug!(endpoint, status, bytes = body.len(), "Backend response");

        let decoded = decode_body(endpoint, status, &body, policy);
        if let Err(ref e) = decoded {
            tracing::warn!(endpoint, error = %e, "Backend call failed");
        }
        decoded
    }

    /// For endpoints whose success body carries nothing the client needs.
    async fn exchange_ack(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<(), ApiError> {
        let _: Envelope<Value> = self
            .exchange(endpoint, request, StatusPolicy::RequireSuccess)
            .await?;
        Ok(())
    }

    /// For endpoints whose `data` is required on success.
    async fn exchange_data<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self
            .exchange(endpoint, request, StatusPolicy::RequireSuccess)
            .await?;
        envelope.data.ok_or(ApiError::Malformed {
            endpoint,
            detail: "missing `data`".into(),
        })
    }
}

impl ClinicBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginReply, ApiError> {
        tracing::info!(username = %credentials.username, "Login attempt");
        let request = self.client.post(self.url("/login")).json(credentials);
        self.exchange("login", request, StatusPolicy::RequireSuccess)
            .await
    }

    async fn list_patients(&self, query: Option<&str>) -> Result<Vec<Patient>, ApiError> {
        let mut request = self.client.get(self.url("/patients"));
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("q", q)]);
        }
        let envelope: Envelope<Vec<Patient>> = self
            .exchange("patients", request, StatusPolicy::HttpOnly)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn patient_records(&self, patient_id: PatientId) -> Result<Vec<MedicalRecord>, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/patients/{patient_id}/records")));
        let envelope: Envelope<Vec<MedicalRecord>> = self
            .exchange("records", request, StatusPolicy::RequireSuccess)
            .await?;

        let mut records = envelope.data.unwrap_or_default();
        for record in &mut records {
            record.patient_id = patient_id;
        }
        Ok(records)
    }

    async fn create_treatment(&self, request: &TreatmentRequest) -> Result<TreatmentReceipt, ApiError> {
        let builder = self.client.post(self.url("/treatments")).json(request);
        self.exchange_data("treatments", builder).await
    }

    async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<ServerAppointment>, ApiError> {
        let builder = self.client.get(self.url("/appointments")).query(query);
        let envelope: Envelope<Vec<ServerAppointment>> = self
            .exchange("appointments", builder, StatusPolicy::RequireSuccess)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> Result<CreatedAppointment, ApiError> {
        let builder = self.client.post(self.url("/appointments")).json(request);
        self.exchange_data("appointment_create", builder).await
    }

    async fn update_appointment(
        &self,
        appointment_id: u64,
        request: &RescheduleRequest,
    ) -> Result<(), ApiError> {
        let builder = self
            .client
            .put(self.url(&format!("/appointments/{appointment_id}")))
            .json(request);
        self.exchange_ack("appointment_update", builder).await
    }

    async fn cancel_appointment(&self, appointment_id: u64) -> Result<(), ApiError> {
        let builder = self
            .client
            .put(self.url(&format!("/appointments/{appointment_id}/cancel")));
        self.exchange_ack("appointment_cancel", builder).await
    }

    async fn mark_no_show(&self, appointment_id: u64) -> Result<(), ApiError> {
        let builder = self
            .client
            .put(self.url(&format!("/appointments/{appointment_id}/no-show")));
        self.exchange_ack("appointment_no_show", builder).await
    }

    async fn list_unpaid_payments(&self) -> Result<Vec<UnpaidPayment>, ApiError> {
        let builder = self.client.get(self.url("/payments/unpaid"));
        let envelope: Envelope<Vec<UnpaidPayment>> = self
            .exchange("payments_unpaid", builder, StatusPolicy::RequireSuccess)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn pay_payment(&self, payment_id: u64, request: &PayRequest) -> Result<(), ApiError> {
        let builder = self
            .client
            .put(self.url(&format!("/payments/{payment_id}/pay")))
            .json(request);
        self.exchange_ack("payment_pay", builder).await
    }

    async fn validate_appointment(&self, request: &SlotCheckRequest) -> Result<(), ApiError> {
        let builder = self
            .client
            .post(self.url("/api/bot/validate_appointment"))
            .json(request);
        let _: Value = self
            .exchange("bot_validate", builder, StatusPolicy::RequireOk)
            .await?;
        Ok(())
    }

    async fn suggest_slots(&self, query: &SlotQuery) -> Result<Vec<String>, ApiError> {
        let builder = self.client.post(self.url("/api/bot/suggest_slots")).json(query);
        let reply: SlotSuggestions = self
            .exchange("bot_slots", builder, StatusPolicy::RequireOk)
            .await?;
        Ok(reply.available_slots)
    }

    async fn patient_summary(&self, patient_id: PatientId) -> Result<PatientSummary, ApiError> {
        let builder = self
            .client
            .get(self.url("/api/bot/patient_summary"))
            .query(&[("patient_id", patient_id)]);
        self.exchange("bot_patient_summary", builder, StatusPolicy::RequireOk)
            .await
    }
}

// ═══════════════════════════════════════════════════════════
// Tests — stub backend over real HTTP
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::models::{AppointmentStatus, PaymentMethod};

    type Reply = (StatusCode, Json<Value>);

    async fn login(Json(body): Json<Value>) -> Reply {
        let user = body["username"].as_str().unwrap_or_default();
        let pass = body["password"].as_str().unwrap_or_default();
        if user == "doctor1" && pass == "1234" {
            (
                StatusCode::OK,
                Json(json!({"status":"success","user":{"id":1,"name":"Dr. Somchai","username":"doctor1"},"role":"doctor"})),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"status":"error","message":"ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง"})),
            )
        }
    }

    async fn patients(Query(params): Query<HashMap<String, String>>) -> Reply {
        let all = vec![
            json!({"id":2,"name":"สมหญิง รักสุข","hn":"HN002","age":38,"tel":"089-765-4321","lastVisit":"2025-10-16"}),
            json!({"id":1,"name":"สมชาย ใจดี","hn":"HN001","age":45,"tel":"081-234-5678","lastVisit":"2025-10-15"}),
        ];
        let q = params.get("q").cloned().unwrap_or_default();
        let rows: Vec<Value> = all
            .into_iter()
            .filter(|p| q.is_empty() || p["hn"].as_str().unwrap_or_default().contains(&q))
            .collect();
        (StatusCode::OK, Json(json!({"status":"success","data":rows})))
    }

    async fn records(Path(id): Path<u64>) -> Reply {
        match id {
            1 => (
                StatusCode::OK,
                Json(json!({"status":"success","data":[
                    {"id":11,"date":"2025-10-15","diagnosis":"ไข้หวัด","treatment":"พาราเซตามอล","doctor":"Dr. Somchai"}
                ]})),
            ),
            7 => (StatusCode::OK, Json(json!({"status":"success","data":[]}))),
            9 => (StatusCode::OK, Json(json!({"status":"error","message":"ไม่พบผู้ป่วย"}))),
            _ => (StatusCode::OK, Json(json!({"status":"success","data":[{"id":"x"}]}))),
        }
    }

    async fn treatments(Json(body): Json<Value>) -> Reply {
        if body["diagnosis"].as_str().unwrap_or_default().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status":"error","message":"ต้องส่ง appointment_id, diagnosis, advice มาครบ"})),
            );
        }
        (
            StatusCode::CREATED,
            Json(json!({"status":"success","message":"ok","data":{
                "treatment_id":31,"appointment_id":body["appointment_id"],"payment_id":41
            }})),
        )
    }

    async fn appointments(Query(params): Query<HashMap<String, String>>) -> Reply {
        let status = params.get("status").cloned().unwrap_or_else(|| "scheduled".into());
        (
            StatusCode::OK,
            Json(json!({"status":"success","data":[{
                "id":5,"date":params.get("date").cloned().unwrap_or_else(|| "2025-11-13".into()),
                "time":"09:00","status":status,"patient_id":1,"patient_name":"สมชาย ใจดี",
                "doctor_id":2,"doctor_name":"Dr. Somchai"
            }]})),
        )
    }

    async fn create_appointment(Json(body): Json<Value>) -> Reply {
        if body["appointment_time"] == "09:05" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status":"error","message":"มีคิวของหมอคนนี้ในช่วงเวลาใกล้กันแล้ว (ต้องห่างอย่างน้อย 15 นาที)"})),
            );
        }
        (
            StatusCode::CREATED,
            Json(json!({"status":"success","data":{
                "appointment_id":6,"patient_id":body["patient_id"],"doctor_id":body["doctor_id"],
                "appointment_date":body["appointment_date"],"appointment_time":body["appointment_time"],
                "status":body["status"]
            }})),
        )
    }

    async fn cancel(Path(id): Path<u64>) -> Reply {
        if id == 404 {
            (StatusCode::NOT_FOUND, Json(json!({"status":"error","message":"ไม่พบใบนัดนี้"})))
        } else {
            (StatusCode::OK, Json(json!({"status":"success","message":"ยกเลิกใบนัดเรียบร้อย"})))
        }
    }

    async fn no_show(Path(_id): Path<u64>) -> Reply {
        (StatusCode::OK, Json(json!({"status":"success"})))
    }

    async fn update_appointment(Path(id): Path<u64>, Json(body): Json<Value>) -> Reply {
        let fields = body.as_object().map_or(0, |o| o.len());
        if fields == 0 {
            return (StatusCode::BAD_REQUEST, Json(json!({"status":"error","message":"ไม่มีข้อมูลให้แก้ไข"})));
        }
        if id == 404 {
            return (StatusCode::NOT_FOUND, Json(json!({"status":"error","message":"ไม่พบใบนัดนี้"})));
        }
        if body["appointment_time"] == "09:10" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status":"error","message":"มีคิวของหมอคนนี้ในช่วงเวลาใกล้กันแล้ว (ต้องห่างอย่างน้อย 15 นาที)"})),
            );
        }
        (StatusCode::OK, Json(json!({"status":"success","message":"อัปเดตใบนัดเรียบร้อย"})))
    }

    // Amounts come straight from a DECIMAL column, so one row is a string.
    async fn unpaid() -> Reply {
        (
            StatusCode::OK,
            Json(json!({"status":"success","data":[
                {"payment_id":41,"amount":0.0,"status":"unpaid","appointment_id":5,
                 "patient_id":1,"patient_name":"สมชาย ใจดี"},
                {"payment_id":42,"amount":"500.00","status":"unpaid","appointment_id":6,
                 "appointment_date":"2025-11-13","appointment_time":"10:00",
                 "patient_id":2,"patient_name":"สมหญิง รักสุข"}
            ]})),
        )
    }

    async fn validate(Json(body): Json<Value>) -> Reply {
        if body["patient_id"] == 99 {
            return (StatusCode::BAD_REQUEST, Json(json!({"ok":false,"errors":["ไม่พบข้อมูลผู้ป่วยในระบบ"]})));
        }
        if body["appointment_time"] == "2025-11-13 09:10" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok":false,"errors":["ช่วงเวลาดังกล่าวมีนัดของแพทย์ท่านนี้อยู่แล้ว กรุณาเลือกเวลาอื่นที่ห่างอย่างน้อย 15 นาที"]})),
            );
        }
        (StatusCode::OK, Json(json!({"ok":true,"message":"ข้อมูลการนัดหมายผ่านการตรวจสอบ สามารถบันทึกได้"})))
    }

    async fn slots(Json(body): Json<Value>) -> Reply {
        if body["date"].as_str().unwrap_or_default().is_empty() {
            return (StatusCode::BAD_REQUEST, Json(json!({"ok":false,"errors":["กรุณาเลือกแพทย์และวันที่"]})));
        }
        (
            StatusCode::OK,
            Json(json!({"ok":true,"doctor_id":body["doctor_id"],"date":body["date"],
                "available_slots":["09:15","09:30","09:45"]})),
        )
    }

    async fn summary(Query(params): Query<HashMap<String, String>>) -> Reply {
        if params.get("patient_id").map(String::as_str) != Some("1") {
            return (StatusCode::NOT_FOUND, Json(json!({"ok":false,"errors":["ไม่พบข้อมูลผู้ป่วย"]})));
        }
        (
            StatusCode::OK,
            Json(json!({"ok":true,
                "patient":{"patient_id":1,"first_name":"สมชาย","last_name":"ใจดี","phone":"081-234-5678","gender":"M"},
                "recent_treatments":[
                    {"treatment_date":"2025-10-15","diagnosis":"ไข้หวัด","advice":"พักผ่อน"},
                    {"treatment_date":"2025-09-02","diagnosis":"ปวดหัว","advice":null}
                ]})),
        )
    }

    async fn pay(Path(_id): Path<u64>, Json(body): Json<Value>) -> Reply {
        if body["amount"].as_f64().unwrap_or(0.0) <= 0.0 {
            return (StatusCode::BAD_REQUEST, Json(json!({"status":"error","message":"amount ต้องมากกว่า 0"})));
        }
        (StatusCode::OK, Json(json!({"status":"success"})))
    }

    fn stub_router() -> Router {
        Router::new()
            .route("/login", post(login))
            .route("/patients", get(patients))
            .route("/patients/:id/records", get(records))
            .route("/treatments", post(treatments))
            .route("/appointments", get(appointments).post(create_appointment))
            .route("/appointments/:id", put(update_appointment))
            .route("/appointments/:id/cancel", put(cancel))
            .route("/appointments/:id/no-show", put(no_show))
            .route("/payments/unpaid", get(unpaid))
            .route("/payments/:id/pay", put(pay))
            .route("/api/bot/validate_appointment", post(validate))
            .route("/api/bot/suggest_slots", post(slots))
            .route("/api/bot/patient_summary", get(summary))
    }

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    async fn backend() -> HttpBackend {
        let base = spawn_stub(stub_router()).await;
        HttpBackend::new(&ClientConfig::new(&base, 5)).unwrap()
    }

    #[tokio::test]
    async fn login_success_returns_user_and_role() {
        let api = backend().await;
        let reply = api.login(&Credentials::new("doctor1", "1234")).await.unwrap();
        assert_eq!(reply.user.name, "Dr. Somchai");
        assert_eq!(reply.role, "doctor");
    }

    #[tokio::test]
    async fn login_failure_carries_server_message() {
        let api = backend().await;
        let err = api.login(&Credentials::new("doctor1", "wrong")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message("x"), "ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง");
    }

    #[tokio::test]
    async fn list_patients_keeps_server_order() {
        let api = backend().await;
        let patients = api.list_patients(None).await.unwrap();
        let ids: Vec<_> = patients.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn list_patients_forwards_query() {
        let api = backend().await;
        let patients = api.list_patients(Some("HN001")).await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "สมชาย ใจดี");
    }

    #[tokio::test]
    async fn records_are_tagged_with_patient_id() {
        let api = backend().await;
        let records = api.patient_records(1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].patient_id, 1);
    }

    #[tokio::test]
    async fn empty_records_are_ok() {
        let api = backend().await;
        assert!(api.patient_records(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_error_status_is_rejected() {
        let api = backend().await;
        let err = api.patient_records(9).await.unwrap_err();
        assert_eq!(err.user_message("โหลดเวชระเบียนไม่สำเร็จ"), "ไม่พบผู้ป่วย");
    }

    #[tokio::test]
    async fn records_with_bad_rows_are_malformed() {
        let api = backend().await;
        let err = api.patient_records(13).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed { endpoint: "records", .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpBackend::new(&ClientConfig::new(&format!("http://{addr}"), 2)).unwrap();
        let err = api.list_patients(None).await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
    }

    #[tokio::test]
    async fn create_treatment_returns_receipt() {
        let api = backend().await;
        let receipt = api
            .create_treatment(&TreatmentRequest {
                appointment_id: 5,
                symptom: "ไอ".into(),
                diagnosis: "หลอดลมอักเสบ".into(),
                advice: "ยาแก้ไอ".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.appointment_id, 5);
        assert_eq!(receipt.payment_id, 41);
    }

    #[tokio::test]
    async fn appointments_round_trip_filter() {
        let api = backend().await;
        let rows = api
            .list_appointments(&AppointmentQuery {
                date: Some("2025-11-20".into()),
                status: Some(AppointmentStatus::NoShow),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows[0].date, "2025-11-20");
        assert_eq!(rows[0].status, AppointmentStatus::NoShow);
    }

    #[tokio::test]
    async fn create_appointment_clash_is_rejected() {
        let api = backend().await;
        let mut request = NewAppointmentRequest {
            patient_id: 1,
            doctor_id: 2,
            appointment_date: "2025-11-13".into(),
            appointment_time: "10:00".into(),
            status: AppointmentStatus::Scheduled,
        };
        let created = api.create_appointment(&request).await.unwrap();
        assert_eq!(created.appointment_id, 6);
        assert_eq!(created.status, AppointmentStatus::Scheduled);

        request.appointment_time = "09:05".into();
        let err = api.create_appointment(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn cancel_and_no_show() {
        let api = backend().await;
        api.cancel_appointment(5).await.unwrap();
        api.mark_no_show(5).await.unwrap();
        let err = api.cancel_appointment(404).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn unpaid_then_pay() {
        let api = backend().await;
        let unpaid = api.list_unpaid_payments().await.unwrap();
        assert_eq!(unpaid[0].payment_id, 41);
        assert!(unpaid[0].appointment_date.is_none());
        assert_eq!(unpaid[1].amount, 500.0);

        api.pay_payment(
            41,
            &PayRequest {
                amount: 500.0,
                payment_method: PaymentMethod::Cash,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unpaid_decimal_string_amount_decodes() {
        let api = backend().await;
        let unpaid = api.list_unpaid_payments().await.unwrap();
        let row = unpaid.iter().find(|p| p.payment_id == 42).unwrap();
        assert_eq!(row.amount, 500.0);
        assert_eq!(row.appointment_time.as_deref(), Some("10:00"));
    }

    #[tokio::test]
    async fn reschedule_sends_changes_and_surfaces_rejections() {
        let api = backend().await;
        let mut request = RescheduleRequest {
            appointment_time: Some("11:00".into()),
            status: Some(AppointmentStatus::Rescheduled),
            ..Default::default()
        };
        api.update_appointment(5, &request).await.unwrap();

        let err = api.update_appointment(404, &request).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        request.appointment_time = Some("09:10".into());
        let err = api.update_appointment(5, &request).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.user_message("x").contains("15 นาที"));

        let err = api
            .update_appointment(5, &RescheduleRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.user_message("x"), "ไม่มีข้อมูลให้แก้ไข");
    }

    #[tokio::test]
    async fn validate_appointment_reports_bot_errors() {
        let api = backend().await;
        let mut request = SlotCheckRequest {
            patient_id: 1,
            doctor_id: 2,
            appointment_time: "2025-11-13 10:00".into(),
        };
        api.validate_appointment(&request).await.unwrap();

        request.appointment_time = "2025-11-13 09:10".into();
        let err = api.validate_appointment(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.user_message("x").starts_with("ช่วงเวลาดังกล่าว"));

        request.patient_id = 99;
        let err = api.validate_appointment(&request).await.unwrap_err();
        assert_eq!(err.user_message("x"), "ไม่พบข้อมูลผู้ป่วยในระบบ");
    }

    #[tokio::test]
    async fn suggest_slots_returns_free_times() {
        let api = backend().await;
        let slots = api
            .suggest_slots(&SlotQuery {
                doctor_id: 2,
                date: "2025-11-13".into(),
            })
            .await
            .unwrap();
        assert_eq!(slots, vec!["09:15", "09:30", "09:45"]);

        let err = api
            .suggest_slots(&SlotQuery {
                doctor_id: 2,
                date: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message("x"), "กรุณาเลือกแพทย์และวันที่");
    }

    #[tokio::test]
    async fn patient_summary_by_query_param() {
        let api = backend().await;
        let summary = api.patient_summary(1).await.unwrap();
        assert_eq!(summary.patient.full_name(), "สมชาย ใจดี");
        assert_eq!(summary.recent_treatments.len(), 2);
        assert_eq!(summary.recent_treatments[1].advice, None);

        let err = api.patient_summary(8).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message("x"), "ไม่พบข้อมูลผู้ป่วย");
    }
}
