//! Doctor dashboard: records, treatment notes, certificates, labs, referrals.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::api::{AppointmentQuery, ClinicBackend, PatientSummary, TreatmentReceipt};
use crate::app_state::{lock, StateError};
use crate::auth::Session;
use crate::collections::LocalCollection;
use crate::directory::LoadState;
use crate::forms::{CertificateDraft, LabDraft, RemoteTreatmentDraft, TreatmentDraft};
use crate::models::{
    today_string, AppointmentStatus, BloodPanel, Certificate, DoctorTab, LabResult, LabTestType,
    Patient, PatientId, Referral, ReferralStatus, ServerAppointment, TreatmentNote,
};
use crate::report::{self, PrintReceipt, PrintSurface};
use crate::search;

use super::{ActionError, PatientDesk, RecordPanel, TabState};

pub const MSG_TREATMENT_SAVED: &str = "บันทึกการรักษาสำเร็จ";
pub const MSG_CERTIFICATE_ISSUED: &str = "ออกใบรับรองแพทย์สำเร็จ";
pub const MSG_LAB_SAVED: &str = "บันทึกผลการตรวจสำเร็จ";
pub const MSG_TREATMENT_SUBMIT_FAILED: &str = "บันทึกการรักษาไม่สำเร็จ";
pub const MSG_QUEUE_FAILED: &str = "โหลดรายการนัดไม่สำเร็จ";
pub const MSG_SUMMARY_FAILED: &str = "โหลดสรุปประวัติผู้ป่วยไม่สำเร็จ";

/// Lab row as the lab tab shows it, with the HN looked up in the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabRow {
    pub lab: LabResult,
    pub hn: String,
}

struct DoctorState {
    tabs: TabState<DoctorTab>,
    selected: Option<PatientId>,
    treatments: LocalCollection<TreatmentNote>,
    certificates: LocalCollection<Certificate>,
    labs: LocalCollection<LabResult>,
    referrals: LocalCollection<Referral>,
}

pub struct DoctorDashboard<B> {
    session: Session,
    desk: PatientDesk<B>,
    state: Mutex<DoctorState>,
    queue: Mutex<LoadState<Vec<ServerAppointment>>>,
}

impl<B: ClinicBackend> DoctorDashboard<B> {
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        let state = DoctorState {
            tabs: TabState::new(DoctorTab::Records),
            selected: None,
            treatments: LocalCollection::new("treatments"),
            certificates: LocalCollection::new("certificates"),
            labs: LocalCollection::seeded("labs", seed_labs()),
            referrals: LocalCollection::seeded("referrals", seed_referrals(&session.name)),
        };
        Self {
            session,
            desk: PatientDesk::new(backend),
            state: Mutex::new(state),
            queue: Mutex::new(LoadState::Loading),
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

    pub fn active_tab(&self) -> Result<DoctorTab, StateError> {
        Ok(lock(&self.state)?.tabs.active())
    }

    pub fn switch_tab(&self, tab: DoctorTab) -> Result<(), StateError> {
        lock(&self.state)?.tabs.switch(tab);
        Ok(())
    }

    pub fn set_query(&self, text: &str) -> Result<(), StateError> {
        lock(&self.state)?.tabs.set_query(text);
        Ok(())
    }

    fn query(&self) -> Result<String, StateError> {
        Ok(lock(&self.state)?.tabs.query().to_string())
    }

    // ── Records tab ──────────────────────────────────────

    pub fn visible_patients(&self) -> Result<Vec<Patient>, StateError> {
        let query = self.query()?;
        self.desk.patients_matching(&query)
    }

    /// Toggle the records panel of `patient_id`.
    ///
    /// Selecting the open patient closes the panel and returns `None`.
    /// Selecting another patient loads its records first, then opens it.
    pub async fn select_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Option<RecordPanel>, StateError> {
        let already_open = lock(&self.state)?.selected == Some(patient_id);
        if already_open {
            lock(&self.state)?.selected = None;
            return Ok(None);
        }

        let panel = self.desk.get_records(patient_id).await?;
        lock(&self.state)?.selected = Some(patient_id);
        Ok(Some(panel))
    }

    pub fn selected_patient(&self) -> Result<Option<PatientId>, StateError> {
        Ok(lock(&self.state)?.selected)
    }

    /// Panel of the open patient, if any.
    pub fn selected_panel(&self) -> Result<Option<RecordPanel>, StateError> {
        match self.selected_patient()? {
            Some(id) => self.desk.record_panel(id).map(Some),
            None => Ok(None),
        }
    }

    // ── Treatment tab ────────────────────────────────────

    /// Local treatment note. Never merged into the fetched records.
    pub fn add_treatment(&self, draft: TreatmentDraft) -> Result<TreatmentNote, ActionError> {
        draft.validate()?;
        let patient = self.lookup(draft.patient_id)?;
        let doctor = self.session.name.clone();

        let mut state = lock(&self.state)?;
        let note = state
            .treatments
            .append_with(|id| draft.into_note(id, &patient, today_string(), &doctor));
        Ok(note.clone())
    }

    pub fn treatments(&self) -> Result<Vec<TreatmentNote>, StateError> {
        let state = lock(&self.state)?;
        Ok(search::filter(state.treatments.items(), state.tabs.query())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Scheduled server appointments of this doctor, for `submit_treatment`.
    pub async fn load_queue(&self) -> Result<LoadState<Vec<ServerAppointment>>, StateError> {
        *lock(&self.queue)? = LoadState::Loading;
        let query = AppointmentQuery {
            doctor_id: self.session.user_id,
            status: Some(AppointmentStatus::Scheduled),
            ..Default::default()
        };

        let result = self.desk.backend().list_appointments(&query).await;

        let mut queue = lock(&self.queue)?;
        *queue = LoadState::from_result(result, MSG_QUEUE_FAILED);
        Ok(queue.clone())
    }

    pub fn queue(&self) -> Result<LoadState<Vec<ServerAppointment>>, StateError> {
        Ok(lock(&self.queue)?.clone())
    }

    /// Post a treatment for a server appointment. The backend marks the
    /// appointment completed and opens an unpaid payment for it.
    pub async fn submit_treatment(
        &self,
        draft: RemoteTreatmentDraft,
    ) -> Result<TreatmentReceipt, ActionError> {
        let request = draft.into_request()?;
        let receipt = self.desk.backend().create_treatment(&request).await?;
        tracing::info!(
            appointment_id = receipt.appointment_id,
            treatment_id = receipt.treatment_id,
            payment_id = receipt.payment_id,
            "Treatment submitted"
        );
        Ok(receipt)
    }

    /// Server-side summary: the patient row and the five latest treatments.
    pub async fn patient_summary(&self, patient_id: PatientId) -> Result<PatientSummary, ActionError> {
        Ok(self.desk.backend().patient_summary(patient_id).await?)
    }

    // ── Certificate tab ──────────────────────────────────

    pub fn issue_certificate(&self, draft: CertificateDraft) -> Result<Certificate, ActionError> {
        draft.validate()?;
        let patient = self.lookup(draft.patient_id)?;
        let doctor = self.session.name.clone();

        let mut state = lock(&self.state)?;
        let cert = state
            .certificates
            .append_with(|id| draft.into_certificate(id, &patient, today_string(), &doctor));
        Ok(cert.clone())
    }

    pub fn certificates(&self) -> Result<Vec<Certificate>, StateError> {
        Ok(lock(&self.state)?.certificates.items().to_vec())
    }

    pub fn print_certificate(
        &self,
        certificate_id: u32,
        surface: &dyn PrintSurface,
    ) -> Result<PrintReceipt, ActionError> {
        let cert = lock(&self.state)?
            .certificates
            .items()
            .iter()
            .find(|c| c.id == certificate_id)
            .cloned()
            .ok_or(StateError::NotFound {
                kind: "certificate",
                id: u64::from(certificate_id),
            })?;
        let doc = report::medical_certificate(&cert)?;
        Ok(surface.present(&doc)?)
    }

    // ── Lab tab ──────────────────────────────────────────

    pub fn add_lab(&self, draft: LabDraft) -> Result<LabResult, ActionError> {
        draft.validate()?;
        let patient = self.lookup(draft.patient_id)?;

        let mut state = lock(&self.state)?;
        let lab = state
            .labs
            .append_with(|id| draft.into_lab(id, &patient, today_string()));
        Ok(lab.clone())
    }

    pub fn visible_labs(&self) -> Result<Vec<LabRow>, StateError> {
        let labs: Vec<LabResult> = {
            let state = lock(&self.state)?;
            search::filter(state.labs.items(), state.tabs.query())
                .into_iter()
                .cloned()
                .collect()
        };
        labs.into_iter()
            .map(|lab| {
                let hn = self.desk.hn_of(lab.patient_id)?;
                Ok(LabRow { lab, hn })
            })
            .collect()
    }

    // ── Referral tab ─────────────────────────────────────

    pub fn visible_referrals(&self) -> Result<Vec<Referral>, StateError> {
        let state = lock(&self.state)?;
        Ok(search::filter(state.referrals.items(), state.tabs.query())
            .into_iter()
            .cloned()
            .collect())
    }

    fn lookup(&self, patient_id: Option<PatientId>) -> Result<Patient, StateError> {
        // Drafts are validated first, so a missing id never gets here.
        let id = patient_id.ok_or(StateError::NotFound { kind: "patient", id: 0 })?;
        self.desk.patient(id)
    }
}

fn seed_labs() -> Vec<LabResult> {
    vec![
        LabResult {
            id: 1,
            patient_id: 1,
            patient_name: "สมชาย ใจดี".into(),
            date: "2025-10-15".into(),
            test_type: LabTestType::Blood,
            result: "ปกติ".into(),
            panel: BloodPanel {
                wbc: Some(7200),
                rbc: Some(4.8),
                hb: Some(13.5),
                platelet: Some(250_000),
            },
        },
        LabResult {
            id: 2,
            patient_id: 2,
            patient_name: "สมหญิง รักสุข".into(),
            date: "2025-10-16".into(),
            test_type: LabTestType::Urine,
            result: "รอผล".into(),
            panel: BloodPanel::default(),
        },
    ]
}

fn seed_referrals(doctor: &str) -> Vec<Referral> {
    vec![Referral {
        id: 1,
        patient_id: 1,
        patient_name: "สมชาย ใจดี".into(),
        date: "2025-10-10".into(),
        hospital: "โรงพยาบาลกลาง".into(),
        reason: "สงสัยโรคหัวใจ".into(),
        status: ReferralStatus::Pending,
        doctor: doctor.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{EP_RECORDS, EP_SUMMARY, EP_TREATMENTS};
    use crate::api::MockBackend;
    use crate::forms::{ValidationError, MSG_INCOMPLETE};
    use crate::models::{CertificateType, Role};
    use crate::report::FilePrintSurface;

    fn session() -> Session {
        Session {
            name: "Dr. Somchai".into(),
            role: Role::Doctor,
            user_id: Some(1),
            username: "doctor1".into(),
        }
    }

    async fn mounted() -> (Arc<MockBackend>, DoctorDashboard<MockBackend>) {
        let backend = Arc::new(MockBackend::demo());
        let dash = DoctorDashboard::new(backend.clone(), session());
        dash.mount().await.unwrap();
        (backend, dash)
    }

    #[tokio::test]
    async fn seeded_collections_present() {
        let (_, dash) = mounted().await;
        let labs = dash.visible_labs().unwrap();
        assert_eq!(labs.len(), 2);
        assert_eq!(labs[0].hn, "HN001");
        assert_eq!(labs[1].hn, "HN002");

        let referrals = dash.visible_referrals().unwrap();
        assert_eq!(referrals.len(), 1);
        assert_eq!(referrals[0].doctor, "Dr. Somchai");
    }

    #[tokio::test]
    async fn selecting_toggles_panel() {
        let (backend, dash) = mounted().await;

        let panel = dash.select_patient(1).await.unwrap();
        assert!(matches!(panel, Some(RecordPanel::Records(ref rows)) if rows.len() == 1));
        assert_eq!(dash.selected_patient().unwrap(), Some(1));

        assert_eq!(dash.select_patient(1).await.unwrap(), None);
        assert_eq!(dash.selected_panel().unwrap(), None);

        // Reopening hits the cache.
        dash.select_patient(1).await.unwrap();
        assert_eq!(backend.calls(EP_RECORDS), 1);
    }

    #[tokio::test]
    async fn patient_without_records_shows_empty() {
        let (_, dash) = mounted().await;
        assert_eq!(dash.select_patient(2).await.unwrap(), Some(RecordPanel::Empty));
    }

    #[tokio::test]
    async fn add_treatment_appends_one_note() {
        let (_, dash) = mounted().await;
        let note = dash
            .add_treatment(TreatmentDraft {
                patient_id: Some(1),
                symptoms: "ไอ".into(),
                diagnosis: "หลอดลมอักเสบ".into(),
                plan: "ยาแก้ไอ".into(),
            })
            .unwrap();

        assert_eq!(note.id, 1);
        assert_eq!(note.patient_name, "สมชาย ใจดี");
        assert_eq!(note.doctor, "Dr. Somchai");
        assert_eq!(dash.treatments().unwrap().len(), 1);
        assert_eq!(dash.visible_labs().unwrap().len(), 2, "Other collections untouched");
    }

    #[tokio::test]
    async fn incomplete_lab_leaves_collection_unchanged() {
        let (_, dash) = mounted().await;
        let err = dash
            .add_lab(LabDraft {
                patient_id: Some(1),
                test_type: LabTestType::Blood,
                result: "  ".into(),
            })
            .unwrap_err();

        assert!(matches!(err, ActionError::Validation(ValidationError::MissingFields(_))));
        assert_eq!(err.user_message(""), MSG_INCOMPLETE);
        assert_eq!(dash.visible_labs().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn new_lab_gets_default_panel() {
        let (_, dash) = mounted().await;
        let lab = dash
            .add_lab(LabDraft {
                patient_id: Some(3),
                test_type: LabTestType::XRay,
                result: "ปกติ".into(),
            })
            .unwrap();
        assert_eq!(lab.id, 3);
        assert_eq!(lab.panel.wbc, Some(7500));
    }

    #[tokio::test]
    async fn unknown_patient_is_not_found() {
        let (_, dash) = mounted().await;
        let err = dash
            .add_treatment(TreatmentDraft {
                patient_id: Some(99),
                symptoms: String::new(),
                diagnosis: "x".into(),
                plan: "y".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::State(StateError::NotFound { kind: "patient", id: 99 })
        ));
    }

    #[tokio::test]
    async fn lab_search_by_test_type_and_tab_switch_resets() {
        let (_, dash) = mounted().await;
        dash.switch_tab(DoctorTab::Lab).unwrap();
        dash.set_query("ปัสสาวะ").unwrap();
        let rows = dash.visible_labs().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lab.patient_id, 2);

        dash.switch_tab(DoctorTab::Records).unwrap();
        assert_eq!(dash.visible_patients().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn certificate_is_issued_and_printed() {
        let (_, dash) = mounted().await;
        let cert = dash
            .issue_certificate(CertificateDraft {
                patient_id: Some(2),
                certificate_type: CertificateType::SickLeave,
                details: "พักผ่อน 2 วัน".into(),
                start_date: "2025-10-20".into(),
                end_date: "2025-10-21".into(),
            })
            .unwrap();
        assert_eq!(cert.start_date.as_deref(), Some("2025-10-20"));

        let dir = tempfile::tempdir().unwrap();
        let surface = FilePrintSurface::new(dir.path());
        let receipt = dash.print_certificate(cert.id, &surface).unwrap();
        assert!(receipt.pdf_path.unwrap().exists());

        let missing = dash.print_certificate(42, &surface).unwrap_err();
        assert!(matches!(missing, ActionError::State(StateError::NotFound { .. })));
    }

    #[tokio::test]
    async fn submit_treatment_posts_to_backend() {
        let (backend, dash) = mounted().await;
        let queue = dash.load_queue().await.unwrap();
        assert_eq!(queue.items().len(), 2);

        let receipt = dash
            .submit_treatment(RemoteTreatmentDraft {
                appointment_id: Some(1),
                symptom: "ไข้".into(),
                diagnosis: "ไข้หวัด".into(),
                advice: "พักผ่อน".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.appointment_id, 1);
        assert_eq!(backend.appointment_status(1), Some(AppointmentStatus::Completed));
        assert_eq!(dash.load_queue().await.unwrap().items().len(), 1);
    }

    #[tokio::test]
    async fn invalid_remote_treatment_never_reaches_backend() {
        let (backend, dash) = mounted().await;
        let err = dash
            .submit_treatment(RemoteTreatmentDraft {
                appointment_id: None,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
        assert_eq!(backend.calls(EP_TREATMENTS), 0);
    }

    #[tokio::test]
    async fn summary_comes_from_backend() {
        let (backend, dash) = mounted().await;
        let summary = dash.patient_summary(1).await.unwrap();
        assert_eq!(summary.patient.full_name(), "สมชาย ใจดี");
        assert_eq!(summary.recent_treatments[0].advice.as_deref(), Some("ให้ยาลดไข้ พักผ่อน"));

        let err = dash.patient_summary(40).await.unwrap_err();
        assert_eq!(err.user_message(MSG_SUMMARY_FAILED), "ไม่พบข้อมูลผู้ป่วย");
        assert_eq!(backend.calls(EP_SUMMARY), 2);
    }

    #[tokio::test]
    async fn seeded_urine_lab_has_empty_panel() {
        let (_, dash) = mounted().await;
        let labs = dash.visible_labs().unwrap();
        let urine = labs.iter().find(|row| row.lab.test_type == LabTestType::Urine).unwrap();
        assert_eq!(urine.lab.panel, BloodPanel::default());
        assert_eq!(labs[0].lab.panel.platelet, Some(250_000));
    }
}
