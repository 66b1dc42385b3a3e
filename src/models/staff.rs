use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub tel: String,
    pub start_date: String,
    /// Monthly salary in baht.
    pub salary: u64,
}

/// One day of clinic revenue on the owner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub date: String,
    pub amount: u64,
    pub services: u32,
    pub service_type: String,
}
