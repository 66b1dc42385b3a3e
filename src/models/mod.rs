pub mod appointment;
pub mod certificate;
pub mod enums;
pub mod lab;
pub mod patient;
pub mod payment;
pub mod referral;
pub mod staff;
pub mod treatment;

pub use appointment::{Appointment, ServerAppointment};
pub use certificate::Certificate;
pub use enums::*;
pub use lab::{BloodPanel, LabResult};
pub use patient::{MedicalRecord, Patient, PatientId};
pub use payment::{Payment, UnpaidPayment};
pub use referral::Referral;
pub use staff::{RevenueEntry, StaffMember};
pub use treatment::TreatmentNote;

/// Today's date in the `YYYY-MM-DD` form every record carries.
pub fn today_string() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
