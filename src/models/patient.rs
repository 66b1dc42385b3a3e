use serde::{Deserialize, Serialize};

/// Backend patient key. Also the record-cache key.
pub type PatientId = u64;

/// Directory row as served by `GET /patients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    /// Hospital number, e.g. `HN007`.
    #[serde(default)]
    pub hn: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub last_visit: String,
}

impl Patient {
    pub fn tel_or_empty(&self) -> &str {
        self.tel.as_deref().unwrap_or("")
    }
}

/// One treatment entry from a patient's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: u64,
    /// Not part of the records payload; filled in from the request key.
    #[serde(default)]
    pub patient_id: PatientId,
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub doctor: String,
}
