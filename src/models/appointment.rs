use serde::{Deserialize, Serialize};

use super::enums::{AppointmentStatus, AppointmentType, VisitStatus};
use super::patient::PatientId;

/// Front-desk appointment kept in the staff dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u32,
    pub patient_name: String,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    pub appointment_type: AppointmentType,
    pub status: VisitStatus,
}

/// Appointment row from `GET /appointments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerAppointment {
    pub id: u64,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub doctor_id: u64,
    pub doctor_name: String,
}
