//! Staff (front desk) dashboard.
//!
//! Two kinds of data live side by side here. Patients, local appointments
//! and local payments follow the append-only draft model. The server
//! appointment book and the unpaid queue are remote views: every write
//! goes to the backend and the view reloads on success.

use std::sync::{Arc, Mutex};

use crate::api::{AppointmentQuery, ClinicBackend, CreatedAppointment};
use crate::app_state::{lock, StateError};
use crate::auth::Session;
use crate::collections::LocalCollection;
use crate::directory::LoadState;
use crate::forms::{
    AppointmentDraft, BookingDraft, PatientDraft, PaymentDraft, RescheduleDraft, SettlementDraft,
    SlotDraft,
};
use crate::models::{
    today_string, Appointment, AppointmentType, Patient, PatientId, Payment, PaymentMethod,
    ServerAppointment, ServiceType, StaffTab, UnpaidPayment, VisitStatus,
};
use crate::report::{self, PrintReceipt, PrintSurface};
use crate::search;

use super::{ActionError, PatientDesk, RecordPanel, TabState};

pub const MSG_PATIENT_ADDED: &str = "เพิ่มผู้ป่วยสำเร็จ";
pub const MSG_APPOINTMENT_ADDED: &str = "สร้างนัดหมายสำเร็จ";
pub const MSG_PAYMENT_ADDED: &str = "บันทึกการชำระเงินสำเร็จ";
pub const MSG_BOOK_FAILED: &str = "โหลดรายการนัดหมายไม่สำเร็จ";
pub const MSG_BOOKING_FAILED: &str = "สร้างนัดหมายไม่สำเร็จ";
pub const MSG_CANCEL_FAILED: &str = "ยกเลิกนัดหมายไม่สำเร็จ";
pub const MSG_RESCHEDULED: &str = "เลื่อนนัดหมายสำเร็จ";
pub const MSG_RESCHEDULE_FAILED: &str = "เลื่อนนัดหมายไม่สำเร็จ";
pub const MSG_SLOT_FREE: &str = "ข้อมูลการนัดหมายผ่านการตรวจสอบ สามารถบันทึกได้";
pub const MSG_CHECK_FAILED: &str = "ตรวจสอบเวลานัดไม่สำเร็จ";
pub const MSG_SLOTS_FAILED: &str = "โหลดเวลาว่างของแพทย์ไม่สำเร็จ";
pub const MSG_NO_SHOW_FAILED: &str = "บันทึกไม่มาตามนัดไม่สำเร็จ";
pub const MSG_UNPAID_FAILED: &str = "โหลดรายการค้างชำระไม่สำเร็จ";
pub const MSG_SETTLE_FAILED: &str = "ชำระเงินไม่สำเร็จ";

// ═══════════════════════════════════════════════════════════
// Remote views
// ═══════════════════════════════════════════════════════════

/// Server appointments under the last applied filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerAppointmentBook {
    pub filter: AppointmentQuery,
    pub state: LoadState<Vec<ServerAppointment>>,
}

/// Payments the backend still reports as unpaid.
pub type UnpaidQueue = LoadState<Vec<UnpaidPayment>>;

// ═══════════════════════════════════════════════════════════
// Dashboard
// ═══════════════════════════════════════════════════════════

struct StaffState {
    tabs: TabState<StaffTab>,
    appointments: LocalCollection<Appointment>,
    payments: LocalCollection<Payment>,
}

pub struct StaffDashboard<B> {
    session: Session,
    desk: PatientDesk<B>,
    state: Mutex<StaffState>,
    book: Mutex<ServerAppointmentBook>,
    unpaid: Mutex<UnpaidQueue>,
}

impl<B: ClinicBackend> StaffDashboard<B> {
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        let state = StaffState {
            tabs: TabState::new(StaffTab::Patients),
            appointments: LocalCollection::seeded("appointments", seed_appointments()),
            payments: LocalCollection::seeded("payments", seed_payments()),
        };
        Self {
            session,
            desk: PatientDesk::new(backend),
            state: Mutex::new(state),
            book: Mutex::new(ServerAppointmentBook::default()),
            unpaid: Mutex::new(UnpaidQueue::default()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn desk(&self) -> &PatientDesk<B> {
        &self.desk
    }

    pub async fn mount(&self) -> Result<(), StateError> {
        self.desk.load_patients().await
    }

    // ── Tabs & search ────────────────────────────────────

    pub fn active_tab(&self) -> Result<StaffTab, StateError> {
        Ok(lock(&self.state)?.tabs.active())
    }

    pub fn switch_tab(&self, tab: StaffTab) -> Result<(), StateError> {
        lock(&self.state)?.tabs.switch(tab);
        Ok(())
    }

    pub fn set_query(&self, text: &str) -> Result<(), StateError> {
        lock(&self.state)?.tabs.set_query(text);
        Ok(())
    }

    // ── Patients tab ─────────────────────────────────────

    pub fn visible_patients(&self) -> Result<Vec<Patient>, StateError> {
        let query = lock(&self.state)?.tabs.query().to_string();
        self.desk.patients_matching(&query)
    }

    /// Register a patient locally. The backend never sees it.
    pub fn add_patient(&self, draft: PatientDraft) -> Result<Patient, ActionError> {
        let age = draft.validate()?;
        let patient = self
            .desk
            .append_patient(|id| draft.into_patient(id, age, today_string()))?;
        tracing::info!(patient_id = patient.id, hn = %patient.hn, "Patient registered locally");
        Ok(patient)
    }

    pub async fn records(&self, patient_id: PatientId) -> Result<RecordPanel, StateError> {
        self.desk.get_records(patient_id).await
    }

    // ── Appointments tab (local) ─────────────────────────

    pub fn add_appointment(&self, draft: AppointmentDraft) -> Result<Appointment, ActionError> {
        draft.validate()?;
        let mut state = lock(&self.state)?;
        let appointment = state.appointments.append_with(|id| draft.into_appointment(id));
        Ok(appointment.clone())
    }

    pub fn visible_appointments(&self) -> Result<Vec<Appointment>, StateError> {
        let state = lock(&self.state)?;
        Ok(search::filter(state.appointments.items(), state.tabs.query())
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn print_appointment(
        &self,
        appointment_id: u32,
        surface: &dyn PrintSurface,
    ) -> Result<PrintReceipt, ActionError> {
        let appointment = lock(&self.state)?
            .appointments
            .items()
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned()
            .ok_or(StateError::NotFound {
                kind: "appointment",
                id: u64::from(appointment_id),
            })?;
        let doc = report::appointment_slip(&appointment)?;
        Ok(surface.present(&doc)?)
    }

    // ── Appointments tab (server book) ───────────────────

    /// Apply `filter` and reload the server appointment book.
    pub async fn refresh_book(
        &self,
        filter: AppointmentQuery,
    ) -> Result<ServerAppointmentBook, StateError> {
        {
            let mut book = lock(&self.book)?;
            book.filter = filter.clone();
            book.state = LoadState::Loading;
        }

        let result = self.desk.backend().list_appointments(&filter).await;

        let mut book = lock(&self.book)?;
        // A newer filter owns the book now; drop this reply.
        if book.filter == filter {
            book.state = LoadState::from_result(result, MSG_BOOK_FAILED);
        }
        Ok(book.clone())
    }

    pub fn book(&self) -> Result<ServerAppointmentBook, StateError> {
        Ok(lock(&self.book)?.clone())
    }

    async fn reload_book(&self) -> Result<ServerAppointmentBook, StateError> {
        let filter = lock(&self.book)?.filter.clone();
        self.refresh_book(filter).await
    }

    pub async fn book_appointment(
        &self,
        draft: BookingDraft,
    ) -> Result<CreatedAppointment, ActionError> {
        let request = draft.into_request()?;
        let created = self.desk.backend().create_appointment(&request).await?;
        tracing::info!(
            appointment_id = created.appointment_id,
            patient_id = created.patient_id,
            "Appointment booked"
        );
        self.reload_book().await?;
        Ok(created)
    }

    /// Move an appointment. The server marks it `rescheduled` and refuses a
    /// time within 15 minutes of the doctor's other bookings.
    pub async fn reschedule(
        &self,
        appointment_id: u64,
        draft: RescheduleDraft,
    ) -> Result<(), ActionError> {
        let request = draft.into_request()?;
        self.desk
            .backend()
            .update_appointment(appointment_id, &request)
            .await?;
        tracing::info!(appointment_id, "Appointment rescheduled");
        self.reload_book().await?;
        Ok(())
    }

    /// Ask the backend whether `draft` could be booked. Nothing is written.
    pub async fn check_booking(&self, draft: &BookingDraft) -> Result<(), ActionError> {
        let request = draft.to_check()?;
        self.desk.backend().validate_appointment(&request).await?;
        Ok(())
    }

    pub async fn suggest_slots(&self, draft: SlotDraft) -> Result<Vec<String>, ActionError> {
        let query = draft.into_query()?;
        let slots = self.desk.backend().suggest_slots(&query).await?;
        tracing::debug!(doctor_id = query.doctor_id, date = %query.date, free = slots.len(), "Slots loaded");
        Ok(slots)
    }

    pub async fn cancel(&self, appointment_id: u64) -> Result<(), ActionError> {
        self.desk.backend().cancel_appointment(appointment_id).await?;
        tracing::info!(appointment_id, "Appointment cancelled");
        self.reload_book().await?;
        Ok(())
    }

    pub async fn mark_no_show(&self, appointment_id: u64) -> Result<(), ActionError> {
        self.desk.backend().mark_no_show(appointment_id).await?;
        tracing::info!(appointment_id, "Appointment marked no-show");
        self.reload_book().await?;
        Ok(())
    }

    // ── Payment tab ──────────────────────────────────────

    pub fn add_payment(&self, draft: PaymentDraft) -> Result<Payment, ActionError> {
        let amount = draft.validate()?;
        let mut state = lock(&self.state)?;
        let payment = state
            .payments
            .append_with(|id| draft.into_payment(id, amount, today_string()));
        Ok(payment.clone())
    }

    pub fn visible_payments(&self) -> Result<Vec<Payment>, StateError> {
        let state = lock(&self.state)?;
        Ok(search::filter(state.payments.items(), state.tabs.query())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Sum over every local payment, regardless of the search box.
    pub fn payment_total(&self) -> Result<u64, StateError> {
        Ok(lock(&self.state)?.payments.items().iter().map(|p| p.amount).sum())
    }

    pub async fn refresh_unpaid(&self) -> Result<UnpaidQueue, StateError> {
        *lock(&self.unpaid)? = LoadState::Loading;

        let result = self.desk.backend().list_unpaid_payments().await;

        let mut unpaid = lock(&self.unpaid)?;
        *unpaid = LoadState::from_result(result, MSG_UNPAID_FAILED);
        Ok(unpaid.clone())
    }

    pub fn unpaid(&self) -> Result<UnpaidQueue, StateError> {
        Ok(lock(&self.unpaid)?.clone())
    }

    pub async fn settle_payment(
        &self,
        payment_id: u64,
        draft: SettlementDraft,
    ) -> Result<(), ActionError> {
        let request = draft.into_request()?;
        self.desk.backend().pay_payment(payment_id, &request).await?;
        tracing::info!(payment_id, method = request.payment_method.as_str(), "Payment settled");
        self.refresh_unpaid().await?;
        Ok(())
    }
}

fn seed_appointments() -> Vec<Appointment> {
    let row = |id, name: &str, date: &str, time: &str, kind, status| Appointment {
        id,
        patient_name: name.into(),
        date: date.into(),
        time: time.into(),
        appointment_type: kind,
        status,
    };
    vec![
        row(1, "สมชาย ใจดี", "2025-10-20", "09:00", AppointmentType::General, VisitStatus::Waiting),
        row(2, "สมหญิง รักสุข", "2025-10-20", "10:30", AppointmentType::AnnualCheckup, VisitStatus::Waiting),
        row(3, "วิชัย มีสุข", "2025-10-21", "14:00", AppointmentType::FollowUp, VisitStatus::Confirmed),
    ]
}

fn seed_payments() -> Vec<Payment> {
    vec![
        Payment {
            id: 1,
            patient_name: "สมชาย ใจดี".into(),
            date: "2025-10-15".into(),
            service: ServiceType::General,
            amount: 500,
            method: PaymentMethod::Cash,
        },
        Payment {
            id: 2,
            patient_name: "สมหญิง รักสุข".into(),
            date: "2025-10-16".into(),
            service: ServiceType::BloodTest,
            amount: 800,
            method: PaymentMethod::Transfer,
        },
    ]
}
