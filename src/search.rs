//! Free-text filters for the dashboard tables.
//!
//! Matching is a case-insensitive substring test over a fixed set of
//! fields per row type. Phone fields are additionally compared as typed,
//! so a query matches a phone number whether or not case folding changes it.
//! An empty query keeps every row.

use crate::models::{
    Appointment, LabResult, MedicalRecord, Patient, Payment, Referral, RevenueEntry,
    ServerAppointment, StaffMember, TreatmentNote, UnpaidPayment,
};

/// A row that can be matched by the search box.
pub trait Searchable {
    /// Fields compared after lower-casing both sides.
    fn text_fields(&self) -> Vec<&str>;

    /// Phone-number fields.
    fn phone_fields(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Pre-processed query.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    folded: String,
}

impl Query {
    pub fn new(text: &str) -> Self {
        Self {
            raw: text.to_string(),
            folded: text.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches<T: Searchable + ?Sized>(&self, row: &T) -> bool {
        if self.is_empty() {
            return true;
        }
        row.text_fields()
            .iter()
            .any(|f| f.to_lowercase().contains(&self.folded))
            || row
                .phone_fields()
                .iter()
                .any(|f| f.contains(&self.raw) || f.to_lowercase().contains(&self.folded))
    }
}

/// Rows of `items` that match `query`, in their original order.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let query = Query::new(query);
    items.iter().filter(|row| query.matches(*row)).collect()
}

// ── Row types ────────────────────────────────────────────

impl Searchable for Patient {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.hn.as_str()]
    }

    fn phone_fields(&self) -> Vec<&str> {
        vec![self.tel_or_empty()]
    }
}

impl Searchable for MedicalRecord {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.diagnosis.as_str(), self.treatment.as_str()]
    }
}

impl Searchable for TreatmentNote {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.diagnosis.as_str()]
    }
}

impl Searchable for LabResult {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.test_type.label()]
    }
}

impl Searchable for Referral {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.hospital.as_str()]
    }
}

impl Searchable for Appointment {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.appointment_type.label()]
    }
}

impl Searchable for ServerAppointment {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.doctor_name.as_str()]
    }
}

impl Searchable for Payment {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.service.label()]
    }
}

impl Searchable for UnpaidPayment {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str()]
    }
}

impl Searchable for StaffMember {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.position.as_str()]
    }
}

impl Searchable for RevenueEntry {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.service_type.as_str()]
    }
}
