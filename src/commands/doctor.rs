//! Doctor dashboard commands.

use crate::api::{ClinicBackend, PatientSummary, TreatmentReceipt};
use crate::app_state::AppState;
use crate::dashboard::doctor::{
    LabRow, MSG_CERTIFICATE_ISSUED, MSG_LAB_SAVED, MSG_SUMMARY_FAILED, MSG_TREATMENT_SAVED,
    MSG_TREATMENT_SUBMIT_FAILED,
};
use crate::dashboard::RecordPanel;
use crate::forms::{CertificateDraft, LabDraft, RemoteTreatmentDraft, TreatmentDraft};
use crate::models::{
    Certificate, DoctorTab, LabResult, Patient, PatientId, Referral, ServerAppointment,
    TreatmentNote,
};
use crate::report::PrintReceipt;

use super::{parse_arg, ListView, Saved};

pub fn switch_doctor_tab<B: ClinicBackend>(state: &AppState<B>, tab: &str) -> Result<DoctorTab, String> {
    let tab: DoctorTab = parse_arg("แท็บ", tab)?;
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.switch_tab(tab).map_err(|e| e.user_message())?;
    Ok(tab)
}

pub fn search_doctor<B: ClinicBackend>(state: &AppState<B>, text: &str) -> Result<(), String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.set_query(text).map_err(|e| e.user_message())
}

pub fn doctor_patients<B: ClinicBackend>(state: &AppState<B>) -> Result<ListView<Patient>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    let directory = dash.desk().directory_state().map_err(|e| e.user_message())?;
    let rows = dash.visible_patients().map_err(|e| e.user_message())?;
    Ok(ListView::with_rows(&directory, rows))
}

/// Open or close the records panel of one patient.
pub async fn toggle_patient_records<B: ClinicBackend>(
    state: &AppState<B>,
    patient_id: PatientId,
) -> Result<Option<RecordPanel>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.select_patient(patient_id)
        .await
        .map_err(|e| e.user_message())
}

pub fn add_treatment<B: ClinicBackend>(
    state: &AppState<B>,
    draft: TreatmentDraft,
) -> Result<Saved<TreatmentNote>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    let note = dash.add_treatment(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_TREATMENT_SAVED, note))
}

pub fn doctor_treatments<B: ClinicBackend>(state: &AppState<B>) -> Result<Vec<TreatmentNote>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.treatments().map_err(|e| e.user_message())
}

pub async fn doctor_queue<B: ClinicBackend>(
    state: &AppState<B>,
) -> Result<ListView<ServerAppointment>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    let queue = dash.load_queue().await.map_err(|e| e.user_message())?;
    Ok(ListView::from_state(&queue))
}

pub async fn submit_treatment<B: ClinicBackend>(
    state: &AppState<B>,
    draft: RemoteTreatmentDraft,
) -> Result<Saved<TreatmentReceipt>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    let receipt = dash
        .submit_treatment(draft)
        .await
        .map_err(|e| e.user_message(MSG_TREATMENT_SUBMIT_FAILED))?;
    Ok(Saved::new(MSG_TREATMENT_SAVED, receipt))
}

pub async fn patient_summary<B: ClinicBackend>(
    state: &AppState<B>,
    patient_id: PatientId,
) -> Result<PatientSummary, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.patient_summary(patient_id)
        .await
        .map_err(|e| e.user_message(MSG_SUMMARY_FAILED))
}

pub fn issue_certificate<B: ClinicBackend>(
    state: &AppState<B>,
    draft: CertificateDraft,
) -> Result<Saved<Certificate>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    let cert = dash.issue_certificate(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_CERTIFICATE_ISSUED, cert))
}

pub fn doctor_certificates<B: ClinicBackend>(state: &AppState<B>) -> Result<Vec<Certificate>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.certificates().map_err(|e| e.user_message())
}

pub fn print_certificate<B: ClinicBackend>(
    state: &AppState<B>,
    certificate_id: u32,
) -> Result<PrintReceipt, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.print_certificate(certificate_id, state.surface())
        .map_err(|e| e.user_message(""))
}

pub fn add_lab<B: ClinicBackend>(state: &AppState<B>, draft: LabDraft) -> Result<Saved<LabResult>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    let lab = dash.add_lab(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_LAB_SAVED, lab))
}

pub fn doctor_labs<B: ClinicBackend>(state: &AppState<B>) -> Result<Vec<LabRow>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.visible_labs().map_err(|e| e.user_message())
}

pub fn doctor_referrals<B: ClinicBackend>(state: &AppState<B>) -> Result<Vec<Referral>, String> {
    let dash = state.doctor().map_err(|e| e.user_message())?;
    dash.visible_referrals().map_err(|e| e.user_message())
}
