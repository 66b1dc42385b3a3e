use serde::{Deserialize, Serialize};

use super::enums::ReferralStatus;
use super::patient::PatientId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: u32,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub date: String,
    pub hospital: String,
    pub reason: String,
    pub status: ReferralStatus,
    pub doctor: String,
}
