use serde::{Deserialize, Serialize};

use super::patient::PatientId;

/// Treatment note written on the doctor dashboard. Kept in a local list,
/// separate from the fetched medical records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentNote {
    pub id: u32,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub date: String,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment: String,
    pub doctor: String,
}
