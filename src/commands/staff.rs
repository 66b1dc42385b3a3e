//! Staff dashboard commands.

use serde::Serialize;

use crate::api::{AppointmentQuery, ClinicBackend, CreatedAppointment};
use crate::app_state::AppState;
use crate::dashboard::staff::{
    MSG_APPOINTMENT_ADDED, MSG_BOOKING_FAILED, MSG_CANCEL_FAILED, MSG_CHECK_FAILED,
    MSG_NO_SHOW_FAILED, MSG_PATIENT_ADDED, MSG_PAYMENT_ADDED, MSG_RESCHEDULED,
    MSG_RESCHEDULE_FAILED, MSG_SETTLE_FAILED, MSG_SLOTS_FAILED, MSG_SLOT_FREE,
};
use crate::dashboard::RecordPanel;
use crate::forms::{
    AppointmentDraft, BookingDraft, PatientDraft, PaymentDraft, RescheduleDraft, SettlementDraft,
    SlotDraft,
};
use crate::models::{
    Appointment, Patient, PatientId, Payment, ServerAppointment, StaffTab, UnpaidPayment,
};
use crate::report::PrintReceipt;

use super::{parse_arg, ListView, Saved};

/// Payment tab: filtered rows plus the total over all payments.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentsView {
    pub rows: Vec<Payment>,
    pub total: u64,
}

pub fn switch_staff_tab<B: ClinicBackend>(state: &AppState<B>, tab: &str) -> Result<StaffTab, String> {
    let tab: StaffTab = parse_arg("แท็บ", tab)?;
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.switch_tab(tab).map_err(|e| e.user_message())?;
    Ok(tab)
}

pub fn search_staff<B: ClinicBackend>(state: &AppState<B>, text: &str) -> Result<(), String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.set_query(text).map_err(|e| e.user_message())
}

// ── Patients ─────────────────────────────────────────────

pub fn staff_patients<B: ClinicBackend>(state: &AppState<B>) -> Result<ListView<Patient>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let directory = dash.desk().directory_state().map_err(|e| e.user_message())?;
    let rows = dash.visible_patients().map_err(|e| e.user_message())?;
    Ok(ListView::with_rows(&directory, rows))
}

pub fn add_patient<B: ClinicBackend>(
    state: &AppState<B>,
    draft: PatientDraft,
) -> Result<Saved<Patient>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let patient = dash.add_patient(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_PATIENT_ADDED, patient))
}

pub async fn staff_records<B: ClinicBackend>(
    state: &AppState<B>,
    patient_id: PatientId,
) -> Result<RecordPanel, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.records(patient_id).await.map_err(|e| e.user_message())
}

// ── Local appointments ───────────────────────────────────

pub fn add_appointment<B: ClinicBackend>(
    state: &AppState<B>,
    draft: AppointmentDraft,
) -> Result<Saved<Appointment>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let apt = dash.add_appointment(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_APPOINTMENT_ADDED, apt))
}

pub fn staff_appointments<B: ClinicBackend>(state: &AppState<B>) -> Result<Vec<Appointment>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.visible_appointments().map_err(|e| e.user_message())
}

pub fn print_appointment<B: ClinicBackend>(
    state: &AppState<B>,
    appointment_id: u32,
) -> Result<PrintReceipt, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.print_appointment(appointment_id, state.surface())
        .map_err(|e| e.user_message(""))
}

// ── Server appointment book ──────────────────────────────

pub async fn refresh_appointment_book<B: ClinicBackend>(
    state: &AppState<B>,
    filter: AppointmentQuery,
) -> Result<ListView<ServerAppointment>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let book = dash.refresh_book(filter).await.map_err(|e| e.user_message())?;
    Ok(ListView::from_state(&book.state))
}

pub async fn book_appointment<B: ClinicBackend>(
    state: &AppState<B>,
    draft: BookingDraft,
) -> Result<Saved<CreatedAppointment>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let created = dash
        .book_appointment(draft)
        .await
        .map_err(|e| e.user_message(MSG_BOOKING_FAILED))?;
    Ok(Saved::new(MSG_APPOINTMENT_ADDED, created))
}

/// Validate a booking against the doctor's schedule without saving it.
pub async fn check_booking<B: ClinicBackend>(
    state: &AppState<B>,
    draft: BookingDraft,
) -> Result<&'static str, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.check_booking(&draft)
        .await
        .map_err(|e| e.user_message(MSG_CHECK_FAILED))?;
    Ok(MSG_SLOT_FREE)
}

pub async fn suggest_slots<B: ClinicBackend>(
    state: &AppState<B>,
    draft: SlotDraft,
) -> Result<Vec<String>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.suggest_slots(draft)
        .await
        .map_err(|e| e.user_message(MSG_SLOTS_FAILED))
}

pub async fn reschedule_appointment<B: ClinicBackend>(
    state: &AppState<B>,
    appointment_id: u64,
    draft: RescheduleDraft,
) -> Result<Saved<u64>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.reschedule(appointment_id, draft)
        .await
        .map_err(|e| e.user_message(MSG_RESCHEDULE_FAILED))?;
    Ok(Saved::new(MSG_RESCHEDULED, appointment_id))
}

pub async fn cancel_appointment<B: ClinicBackend>(
    state: &AppState<B>,
    appointment_id: u64,
) -> Result<(), String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.cancel(appointment_id)
        .await
        .map_err(|e| e.user_message(MSG_CANCEL_FAILED))
}

pub async fn mark_no_show<B: ClinicBackend>(
    state: &AppState<B>,
    appointment_id: u64,
) -> Result<(), String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.mark_no_show(appointment_id)
        .await
        .map_err(|e| e.user_message(MSG_NO_SHOW_FAILED))
}

// ── Payments ─────────────────────────────────────────────

pub fn add_payment<B: ClinicBackend>(
    state: &AppState<B>,
    draft: PaymentDraft,
) -> Result<Saved<Payment>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let payment = dash.add_payment(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_PAYMENT_ADDED, payment))
}

pub fn staff_payments<B: ClinicBackend>(state: &AppState<B>) -> Result<PaymentsView, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    Ok(PaymentsView {
        rows: dash.visible_payments().map_err(|e| e.user_message())?,
        total: dash.payment_total().map_err(|e| e.user_message())?,
    })
}

pub async fn refresh_unpaid<B: ClinicBackend>(
    state: &AppState<B>,
) -> Result<ListView<UnpaidPayment>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    let queue = dash.refresh_unpaid().await.map_err(|e| e.user_message())?;
    Ok(ListView::from_state(&queue))
}

pub async fn settle_payment<B: ClinicBackend>(
    state: &AppState<B>,
    payment_id: u64,
    draft: SettlementDraft,
) -> Result<Saved<u64>, String> {
    let dash = state.staff().map_err(|e| e.user_message())?;
    dash.settle_payment(payment_id, draft)
        .await
        .map_err(|e| e.user_message(MSG_SETTLE_FAILED))?;
    Ok(Saved::new(MSG_PAYMENT_ADDED, payment_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::mock::EP_UNPAID;
    use crate::api::{ApiError, MockBackend};
    use crate::commands::session::login;
    use crate::models::PaymentMethod;
    use crate::report::FilePrintSurface;

    async fn staff_app(backend: Arc<MockBackend>) -> AppState<MockBackend> {
        let state = AppState::new(
            backend,
            Arc::new(FilePrintSurface::new(std::env::temp_dir().join("clinic-desk-staff"))),
        );
        login(&state, "staff1", "1234").await.unwrap();
        state
    }

    #[tokio::test]
    async fn add_patient_reports_success() {
        let state = staff_app(Arc::new(MockBackend::demo())).await;
        let saved = add_patient(
            &state,
            PatientDraft {
                name: "มานี มีนา".into(),
                age: "29".into(),
                hn: "HN004".into(),
                tel: "087-000-1111".into(),
            },
        )
        .unwrap();
        assert_eq!(saved.message, MSG_PATIENT_ADDED);
        assert_eq!(staff_patients(&state).unwrap().rows.len(), 4);
    }

    #[tokio::test]
    async fn payment_view_carries_total() {
        let state = staff_app(Arc::new(MockBackend::demo())).await;
        switch_staff_tab(&state, "payment").unwrap();
        search_staff(&state, "สมหญิง").unwrap();
        let view = staff_payments(&state).unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.total, 1300);
    }

    #[tokio::test]
    async fn unpaid_failure_uses_fallback() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(
            EP_UNPAID,
            ApiError::Rejected {
                endpoint: "payments_unpaid",
                status: 500,
                message: None,
            },
        );
        let state = staff_app(backend).await;
        let view = refresh_unpaid(&state).await.unwrap();
        assert_eq!(
            view.error.as_deref(),
            Some(crate::dashboard::staff::MSG_UNPAID_FAILED)
        );
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn settle_with_zero_amount_is_refused() {
        let state = staff_app(Arc::new(MockBackend::demo())).await;
        let err = settle_payment(
            &state,
            1,
            SettlementDraft {
                amount: "0".into(),
                method: PaymentMethod::Cash,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, "จำนวนเงินต้องมากกว่า 0");
    }

    #[tokio::test]
    async fn book_view_after_cancel() {
        let state = staff_app(Arc::new(MockBackend::demo())).await;
        let filter = AppointmentQuery {
            status: Some(crate::models::AppointmentStatus::Scheduled),
            ..Default::default()
        };
        assert_eq!(refresh_appointment_book(&state, filter).await.unwrap().rows.len(), 2);
        cancel_appointment(&state, 2).await.unwrap();
        let rows = refresh_appointment_book(
            &state,
            AppointmentQuery {
                status: Some(crate::models::AppointmentStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[tokio::test]
    async fn reschedule_through_command_updates_book() {
        let state = staff_app(Arc::new(MockBackend::demo())).await;
        let filter = AppointmentQuery {
            status: Some(crate::models::AppointmentStatus::Rescheduled),
            ..Default::default()
        };
        assert!(refresh_appointment_book(&state, filter).await.unwrap().rows.is_empty());

        let saved = reschedule_appointment(
            &state,
            1,
            RescheduleDraft {
                time: "15:00".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(saved.message, MSG_RESCHEDULED);

        let view = refresh_appointment_book(
            &state,
            AppointmentQuery {
                status: Some(crate::models::AppointmentStatus::Rescheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].time, "15:00");
    }

    #[tokio::test]
    async fn slot_lookup_and_booking_check() {
        let state = staff_app(Arc::new(MockBackend::demo())).await;
        let slots = suggest_slots(
            &state,
            SlotDraft {
                doctor_id: Some(1),
                date: "2025-10-20".into(),
            },
        )
        .await
        .unwrap();
        assert!(!slots.contains(&"09:00".to_string()));

        let draft = BookingDraft {
            patient_id: Some(2),
            doctor_id: Some(1),
            date: "2025-10-20".into(),
            time: "09:15".into(),
        };
        let err = check_booking(&state, draft.clone()).await.unwrap_err();
        assert!(err.starts_with("ช่วงเวลาดังกล่าว"));

        let ok = check_booking(
            &state,
            BookingDraft {
                time: "09:30".into(),
                ..draft
            },
        )
        .await
        .unwrap();
        assert_eq!(ok, MSG_SLOT_FREE);
    }
}
