use serde::{Deserialize, Serialize};

use super::enums::LabTestType;
use super::patient::PatientId;

/// Blood panel values. `None` renders as `-` while a result is pending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodPanel {
    pub wbc: Option<u32>,
    pub rbc: Option<f64>,
    pub hb: Option<f64>,
    pub platelet: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub id: u32,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub date: String,
    pub test_type: LabTestType,
    pub result: String,
    pub panel: BloodPanel,
}
