//! Form drafts and their required-field checks.
//!
//! A draft holds raw input exactly as typed. `validate` runs before any
//! state changes; a failing draft produces one [`ValidationError`] whose
//! `alert_message` is the single blocking alert shown to the user.

use std::str::FromStr;

use serde::Deserialize;

use crate::api::{
    NewAppointmentRequest, PayRequest, RescheduleRequest, SlotCheckRequest, SlotQuery,
    TreatmentRequest,
};
use crate::models::{
    lab::BloodPanel, Appointment, AppointmentStatus, AppointmentType, Certificate,
    CertificateType, LabResult, LabTestType, Patient, PatientId, Payment, PaymentMethod,
    ServiceType, StaffMember, TreatmentNote, VisitStatus,
};

pub const MSG_INCOMPLETE: &str = "กรุณากรอกข้อมูลให้ครบถ้วน";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Field {field} is not a valid number: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Field {field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("Field {field} does not accept {value}")]
    Unsupported { field: &'static str, value: String },
}

impl ValidationError {
    /// Text of the blocking alert.
    pub fn alert_message(&self) -> String {
        match self {
            ValidationError::MissingFields(_) => MSG_INCOMPLETE.to_string(),
            ValidationError::InvalidNumber { .. } => "กรุณากรอกตัวเลขให้ถูกต้อง".to_string(),
            ValidationError::NotPositive { .. } => "จำนวนเงินต้องมากกว่า 0".to_string(),
            ValidationError::Unsupported { value, .. } => format!("ไม่รองรับ {value}"),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────

fn require(fields: &[(&'static str, bool)]) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn non_empty(value: &str) -> Option<String> {
    filled(value).then(|| value.trim().to_string())
}

// ═══════════════════════════════════════════════════════════
// Doctor forms
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreatmentDraft {
    pub patient_id: Option<PatientId>,
    pub symptoms: String,
    pub diagnosis: String,
    pub plan: String,
}

impl TreatmentDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("patient", self.patient_id.is_some()),
            ("diagnosis", filled(&self.diagnosis)),
            ("plan", filled(&self.plan)),
        ])
    }

    pub fn into_note(self, id: u32, patient: &Patient, date: String, doctor: &str) -> TreatmentNote {
        TreatmentNote {
            id,
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            date,
            symptoms: self.symptoms.trim().to_string(),
            diagnosis: self.diagnosis.trim().to_string(),
            treatment: self.plan.trim().to_string(),
            doctor: doctor.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CertificateDraft {
    pub patient_id: Option<PatientId>,
    pub certificate_type: CertificateType,
    pub details: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for CertificateDraft {
    fn default() -> Self {
        Self {
            patient_id: None,
            certificate_type: CertificateType::General,
            details: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

impl CertificateDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("patient", self.patient_id.is_some()),
            ("details", filled(&self.details)),
        ])
    }

    /// Leave dates are kept only for sick-leave certificates.
    pub fn into_certificate(self, id: u32, patient: &Patient, issued_on: String, doctor: &str) -> Certificate {
        let sick_leave = self.certificate_type == CertificateType::SickLeave;
        Certificate {
            id,
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            certificate_type: self.certificate_type,
            details: self.details.trim().to_string(),
            start_date: sick_leave.then(|| non_empty(&self.start_date)).flatten(),
            end_date: sick_leave.then(|| non_empty(&self.end_date)).flatten(),
            issued_on,
            doctor: doctor.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabDraft {
    pub patient_id: Option<PatientId>,
    pub test_type: LabTestType,
    pub result: String,
}

impl Default for LabDraft {
    fn default() -> Self {
        Self {
            patient_id: None,
            test_type: LabTestType::Blood,
            result: String::new(),
        }
    }
}

/// Panel attached to newly entered lab results.
pub fn default_panel() -> BloodPanel {
    BloodPanel {
        wbc: Some(7500),
        rbc: Some(4.9),
        hb: Some(14.0),
        platelet: Some(260_000),
    }
}

impl LabDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("patient", self.patient_id.is_some()),
            ("result", filled(&self.result)),
        ])
    }

    pub fn into_lab(self, id: u32, patient: &Patient, date: String) -> LabResult {
        LabResult {
            id,
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            date,
            test_type: self.test_type,
            result: self.result.trim().to_string(),
            panel: default_panel(),
        }
    }
}

/// Treatment sent to `POST /treatments` for a server-side appointment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteTreatmentDraft {
    pub appointment_id: Option<u64>,
    pub symptom: String,
    pub diagnosis: String,
    pub advice: String,
}

impl RemoteTreatmentDraft {
    pub fn into_request(self) -> Result<TreatmentRequest, ValidationError> {
        require(&[
            ("appointment_id", self.appointment_id.is_some()),
            ("diagnosis", filled(&self.diagnosis)),
            ("advice", filled(&self.advice)),
        ])?;
        Ok(TreatmentRequest {
            appointment_id: self.appointment_id.unwrap_or_default(),
            symptom: self.symptom.trim().to_string(),
            diagnosis: self.diagnosis.trim().to_string(),
            advice: self.advice.trim().to_string(),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Staff forms
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PatientDraft {
    pub name: String,
    pub age: String,
    pub hn: String,
    pub tel: String,
}

impl PatientDraft {
    pub fn validate(&self) -> Result<u32, ValidationError> {
        require(&[
            ("name", filled(&self.name)),
            ("age", filled(&self.age)),
            ("hn", filled(&self.hn)),
            ("tel", filled(&self.tel)),
        ])?;
        parse_number("age", &self.age)
    }

    pub fn into_patient(self, id: PatientId, age: u32, last_visit: String) -> Patient {
        Patient {
            id,
            name: self.name.trim().to_string(),
            hn: self.hn.trim().to_string(),
            age: Some(age),
            tel: Some(self.tel.trim().to_string()),
            last_visit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppointmentDraft {
    pub patient_name: String,
    pub date: String,
    pub time: String,
    pub appointment_type: AppointmentType,
}

impl Default for AppointmentDraft {
    fn default() -> Self {
        Self {
            patient_name: String::new(),
            date: String::new(),
            time: String::new(),
            appointment_type: AppointmentType::General,
        }
    }
}

impl AppointmentDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("patient", filled(&self.patient_name)),
            ("date", filled(&self.date)),
            ("time", filled(&self.time)),
        ])
    }

    pub fn into_appointment(self, id: u32) -> Appointment {
        Appointment {
            id,
            patient_name: self.patient_name.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            appointment_type: self.appointment_type,
            status: VisitStatus::Waiting,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaymentDraft {
    pub patient_name: String,
    pub amount: String,
    pub service: ServiceType,
    pub method: PaymentMethod,
}

impl Default for PaymentDraft {
    fn default() -> Self {
        Self {
            patient_name: String::new(),
            amount: String::new(),
            service: ServiceType::General,
            method: PaymentMethod::Cash,
        }
    }
}

impl PaymentDraft {
    pub fn validate(&self) -> Result<u64, ValidationError> {
        require(&[
            ("patient", filled(&self.patient_name)),
            ("amount", filled(&self.amount)),
        ])?;
        parse_number("amount", &self.amount)
    }

    pub fn into_payment(self, id: u32, amount: u64, date: String) -> Payment {
        Payment {
            id,
            patient_name: self.patient_name.trim().to_string(),
            date,
            service: self.service,
            amount,
            method: self.method,
        }
    }
}

/// Booking sent to `POST /appointments`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookingDraft {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<u64>,
    pub date: String,
    pub time: String,
}

impl BookingDraft {
    pub fn into_request(self) -> Result<NewAppointmentRequest, ValidationError> {
        require(&[
            ("patient_id", self.patient_id.is_some()),
            ("doctor_id", self.doctor_id.is_some()),
            ("appointment_date", filled(&self.date)),
            ("appointment_time", filled(&self.time)),
        ])?;
        Ok(NewAppointmentRequest {
            patient_id: self.patient_id.unwrap_or_default(),
            doctor_id: self.doctor_id.unwrap_or_default(),
            appointment_date: self.date.trim().to_string(),
            appointment_time: self.time.trim().to_string(),
            status: AppointmentStatus::Scheduled,
        })
    }

    /// The same booking as `POST /api/bot/validate_appointment` expects it.
    pub fn to_check(&self) -> Result<SlotCheckRequest, ValidationError> {
        let request = self.clone().into_request()?;
        Ok(SlotCheckRequest {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_time: format!("{} {}", request.appointment_date, request.appointment_time),
        })
    }
}

/// Changes sent to `PUT /appointments/{id}`. Blank fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RescheduleDraft {
    pub date: String,
    pub time: String,
    pub doctor_id: Option<u64>,
}

impl RescheduleDraft {
    pub fn into_request(self) -> Result<RescheduleRequest, ValidationError> {
        let changes = RescheduleRequest {
            appointment_date: non_empty(&self.date),
            appointment_time: non_empty(&self.time),
            doctor_id: self.doctor_id,
            status: None,
        };
        if changes.is_empty() {
            return Err(ValidationError::MissingFields(vec![
                "appointment_date",
                "appointment_time",
                "doctor_id",
            ]));
        }
        Ok(RescheduleRequest {
            status: Some(AppointmentStatus::Rescheduled),
            ..changes
        })
    }
}

/// Free-slot lookup for one doctor and day.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlotDraft {
    pub doctor_id: Option<u64>,
    pub date: String,
}

impl SlotDraft {
    pub fn into_query(self) -> Result<SlotQuery, ValidationError> {
        require(&[
            ("doctor_id", self.doctor_id.is_some()),
            ("date", filled(&self.date)),
        ])?;
        Ok(SlotQuery {
            doctor_id: self.doctor_id.unwrap_or_default(),
            date: self.date.trim().to_string(),
        })
    }
}

/// Settlement sent to `PUT /payments/{id}/pay`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettlementDraft {
    pub amount: String,
    pub method: PaymentMethod,
}

impl SettlementDraft {
    pub fn into_request(self) -> Result<PayRequest, ValidationError> {
        require(&[("amount", filled(&self.amount))])?;
        let amount: f64 = parse_number("amount", &self.amount)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::NotPositive { field: "amount" });
        }
        if !self.method.accepted_by_server() {
            return Err(ValidationError::Unsupported {
                field: "payment_method",
                value: self.method.label().to_string(),
            });
        }
        Ok(PayRequest {
            amount,
            payment_method: self.method,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Owner forms
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaffDraft {
    pub name: String,
    pub position: String,
    pub tel: String,
    pub salary: String,
}

impl StaffDraft {
    pub fn validate(&self) -> Result<u64, ValidationError> {
        require(&[
            ("name", filled(&self.name)),
            ("position", filled(&self.position)),
            ("tel", filled(&self.tel)),
            ("salary", filled(&self.salary)),
        ])?;
        parse_number("salary", &self.salary)
    }

    pub fn into_member(self, id: u32, salary: u64, start_date: String) -> StaffMember {
        StaffMember {
            id,
            name: self.name.trim().to_string(),
            position: self.position.trim().to_string(),
            tel: self.tel.trim().to_string(),
            start_date,
            salary,
        }
    }
}
