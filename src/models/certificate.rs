use serde::{Deserialize, Serialize};

use super::enums::CertificateType;
use super::patient::PatientId;

/// Issued medical certificate. Leave dates only apply to sick-leave certificates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: u32,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub certificate_type: CertificateType,
    pub details: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub issued_on: String,
    pub doctor: String,
}
