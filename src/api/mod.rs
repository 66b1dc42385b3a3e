//! Clinic backend access.
//!
//! `ClinicBackend` is the seam between dashboard state and the network.
//! `HttpBackend` talks to the real server over `reqwest`; `MockBackend`
//! is a scripted in-memory stand-in used by tests and the offline shell.

pub mod client;
pub mod error;
pub mod mock;
pub mod types;

use std::future::Future;

pub use client::HttpBackend;
pub use error::ApiError;
pub use mock::MockBackend;
pub use types::{
    AppointmentQuery, CreatedAppointment, Credentials, LoginReply, LoginUser,
    NewAppointmentRequest, PatientSummary, PayRequest, RecentTreatment, RescheduleRequest,
    SlotCheckRequest, SlotQuery, SummaryPatient, TreatmentReceipt, TreatmentRequest,
};

use crate::models::{MedicalRecord, Patient, PatientId, ServerAppointment, UnpaidPayment};

/// Every backend operation the dashboards use.
pub trait ClinicBackend: Send + Sync {
    /// `POST /login`
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginReply, ApiError>> + Send;

    /// `GET /patients`, optionally narrowed server-side by `q`.
    fn list_patients(
        &self,
        query: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Patient>, ApiError>> + Send;

    /// `GET /patients/{id}/records`. Records come back tagged with `patient_id`.
    fn patient_records(
        &self,
        patient_id: PatientId,
    ) -> impl Future<Output = Result<Vec<MedicalRecord>, ApiError>> + Send;

    /// `POST /treatments`
    fn create_treatment(
        &self,
        request: &TreatmentRequest,
    ) -> impl Future<Output = Result<TreatmentReceipt, ApiError>> + Send;

    /// `GET /appointments`
    fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> impl Future<Output = Result<Vec<ServerAppointment>, ApiError>> + Send;

    /// `POST /appointments`
    fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> impl Future<Output = Result<CreatedAppointment, ApiError>> + Send;

    /// `PUT /appointments/{id}`: move an appointment or change its doctor.
    fn update_appointment(
        &self,
        appointment_id: u64,
        request: &RescheduleRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /appointments/{id}/cancel`
    fn cancel_appointment(&self, appointment_id: u64)
        -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /appointments/{id}/no-show`
    fn mark_no_show(&self, appointment_id: u64)
        -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /payments/unpaid`
    fn list_unpaid_payments(
        &self,
    ) -> impl Future<Output = Result<Vec<UnpaidPayment>, ApiError>> + Send;

    /// `PUT /payments/{id}/pay`
    fn pay_payment(
        &self,
        payment_id: u64,
        request: &PayRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /api/bot/validate_appointment`: checks the patient exists and
    /// the doctor has nothing booked within 15 minutes.
    fn validate_appointment(
        &self,
        request: &SlotCheckRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /api/bot/suggest_slots`: free quarter-hour slots, 09:00 to 17:00.
    fn suggest_slots(
        &self,
        query: &SlotQuery,
    ) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// `GET /api/bot/patient_summary`
    fn patient_summary(
        &self,
        patient_id: PatientId,
    ) -> impl Future<Output = Result<PatientSummary, ApiError>> + Send;
}
