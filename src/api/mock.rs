//! In-memory [`ClinicBackend`] with scripted data.
//!
//! Used by the loader/cache tests and by the shell's `--offline` mode.
//! Every call is counted per endpoint. An endpoint can be made to fail
//! (`fail`) or to park each request until released (`hold`).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveTime, Timelike};
use tokio::sync::Notify;

use super::error::ApiError;
use super::types::{
    AppointmentQuery, CreatedAppointment, Credentials, LoginReply, LoginUser,
    NewAppointmentRequest, PatientSummary, PayRequest, RecentTreatment, RescheduleRequest,
    SlotCheckRequest, SlotQuery, SummaryPatient, TreatmentReceipt, TreatmentRequest,
};
use super::ClinicBackend;
use crate::models::{
    AppointmentStatus, MedicalRecord, Patient, PatientId, ServerAppointment, UnpaidPayment,
};

pub const EP_LOGIN: &str = "login";
pub const EP_PATIENTS: &str = "patients";
pub const EP_RECORDS: &str = "records";
pub const EP_TREATMENTS: &str = "treatments";
pub const EP_APPOINTMENTS: &str = "appointments";
pub const EP_CREATE_APPOINTMENT: &str = "appointment_create";
pub const EP_CANCEL: &str = "appointment_cancel";
pub const EP_NO_SHOW: &str = "appointment_no_show";
pub const EP_UNPAID: &str = "payments_unpaid";
pub const EP_PAY: &str = "payment_pay";
pub const EP_UPDATE_APPOINTMENT: &str = "appointment_update";
pub const EP_VALIDATE: &str = "bot_validate";
pub const EP_SLOTS: &str = "bot_slots";
pub const EP_SUMMARY: &str = "bot_patient_summary";

/// Minimum distance between two live bookings of one doctor.
const SLOT_GAP_MINUTES: u32 = 15;
const MSG_DOCTOR_BUSY: &str = "มีคิวของหมอคนนี้ในช่วงเวลาใกล้กันแล้ว (ต้องห่างอย่างน้อย 15 นาที)";
const MSG_SLOT_TAKEN: &str =
    "ช่วงเวลาดังกล่าวมีนัดของแพทย์ท่านนี้อยู่แล้ว กรุณาเลือกเวลาอื่นที่ห่างอย่างน้อย 15 นาที";

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: LoginUser,
    role: String,
}

#[derive(Debug, Default)]
struct MockData {
    accounts: HashMap<String, Account>,
    patients: Vec<Patient>,
    records: HashMap<PatientId, Vec<MedicalRecord>>,
    appointments: Vec<ServerAppointment>,
    unpaid: Vec<UnpaidPayment>,
    next_id: u64,
}

impl MockData {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Whether `doctor_id` already has a live booking on `date` closer to
    /// `time` than the slot gap. `inclusive` also counts a gap of exactly
    /// 15 minutes, as the booking check does.
    fn doctor_busy(
        &self,
        doctor_id: u64,
        date: &str,
        time: &str,
        except: Option<u64>,
        inclusive: bool,
    ) -> bool {
        self.appointments
            .iter()
            .filter(|a| Some(a.id) != except)
            .filter(|a| a.doctor_id == doctor_id && a.date == date && holds_slot(a.status))
            .any(|a| match (minute_of_day(&a.time), minute_of_day(time)) {
                (Some(x), Some(y)) => {
                    let gap = x.abs_diff(y);
                    gap < SLOT_GAP_MINUTES || (inclusive && gap == SLOT_GAP_MINUTES)
                }
                _ => a.time == time,
            })
    }
}

fn holds_slot(status: AppointmentStatus) -> bool {
    matches!(status, AppointmentStatus::Scheduled | AppointmentStatus::Rescheduled)
}

fn minute_of_day(time: &str) -> Option<u32> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// Quarter-hour slots from 09:00 to 17:00 inclusive.
fn day_slots() -> impl Iterator<Item = String> {
    (9 * 60..=17 * 60)
        .step_by(SLOT_GAP_MINUTES as usize)
        .map(|m| format!("{:02}:{:02}", m / 60, m % 60))
}

/// Scripted backend. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MockBackend {
    data: Mutex<MockData>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn rejected(endpoint: &'static str, status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        endpoint,
        status,
        message: Some(message.to_string()),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(MockData {
                next_id: 100,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Demo clinic: three accounts (`doctor1`, `staff1`, `owner1`, password
    /// `1234`), three patients and a small appointment book.
    pub fn demo() -> Self {
        let mock = Self::new()
            .with_account("doctor1", "1234", "Dr. Somchai", "doctor")
            .with_account("staff1", "1234", "สมศรี พนักงานดี", "staff")
            .with_account("owner1", "1234", "เจ้าของคลินิก", "owner")
            .with_patients(vec![
                demo_patient(1, "สมชาย ใจดี", "HN001", 45, "081-234-5678", "2025-10-15"),
                demo_patient(2, "สมหญิง รักสุข", "HN002", 38, "089-765-4321", "2025-10-16"),
                demo_patient(3, "วิชัย มีสุข", "HN003", 52, "086-555-1234", "2025-10-12"),
            ])
            .with_records(
                1,
                vec![MedicalRecord {
                    id: 1,
                    patient_id: 1,
                    date: "2025-10-15".into(),
                    diagnosis: "ไข้หวัด".into(),
                    treatment: "ให้ยาลดไข้ พักผ่อน".into(),
                    doctor: "Dr. Somchai".into(),
                }],
            );

        {
            let mut data = lock(&mock.data);
            data.appointments = vec![
                demo_appointment(1, "2025-10-20", "09:00", 1, "สมชาย ใจดี"),
                demo_appointment(2, "2025-10-20", "10:30", 2, "สมหญิง รักสุข"),
            ];
            data.unpaid = vec![UnpaidPayment {
                payment_id: 1,
                amount: 0.0,
                status: "unpaid".into(),
                appointment_id: 1,
                appointment_date: Some("2025-10-20".into()),
                appointment_time: Some("09:00".into()),
                patient_id: 1,
                patient_name: "สมชาย ใจดี".into(),
            }];
        }
        mock
    }

    // ── Scripting ────────────────────────────────────────

    pub fn with_account(self, username: &str, password: &str, name: &str, role: &str) -> Self {
        lock(&self.data).accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                user: LoginUser {
                    name: name.to_string(),
                    id: None,
                    username: Some(username.to_string()),
                    position: None,
                },
                role: role.to_string(),
            },
        );
        self
    }

    pub fn with_patients(self, patients: Vec<Patient>) -> Self {
        lock(&self.data).patients = patients;
        self
    }

    pub fn with_records(self, patient_id: PatientId, records: Vec<MedicalRecord>) -> Self {
        lock(&self.data).records.insert(patient_id, records);
        self
    }

    /// Every call to `endpoint` fails with `error` until [`clear_failure`](Self::clear_failure).
    pub fn fail(&self, endpoint: &'static str, error: ApiError) {
        lock(&self.failures).insert(endpoint, error);
    }

    pub fn clear_failure(&self, endpoint: &'static str) {
        lock(&self.failures).remove(endpoint);
    }

    /// Park calls to `endpoint` until the returned handle is notified.
    /// Each `notify_one` releases one request.
    pub fn hold(&self, endpoint: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        lock(&self.gates).insert(endpoint, gate.clone());
        gate
    }

    /// Calls received for `endpoint`, including ones still parked.
    pub fn calls(&self, endpoint: &str) -> usize {
        lock(&self.calls).get(endpoint).copied().unwrap_or(0)
    }

    pub fn appointment_status(&self, appointment_id: u64) -> Option<AppointmentStatus> {
        lock(&self.data)
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .map(|a| a.status)
    }

    // ── Call plumbing ────────────────────────────────────

    async fn enter(&self, endpoint: &'static str) -> Result<(), ApiError> {
        {
            let mut calls = lock(&self.calls);
            *calls.entry(endpoint).or_insert(0) += 1;
        }

        let gate = {
            let gates = lock(&self.gates);
            gates.get(endpoint).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = {
            let failures = lock(&self.failures);
            failures.get(endpoint).cloned()
        };
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn demo_patient(id: PatientId, name: &str, hn: &str, age: u32, tel: &str, last: &str) -> Patient {
    Patient {
        id,
        name: name.into(),
        hn: hn.into(),
        age: Some(age),
        tel: Some(tel.into()),
        last_visit: last.into(),
    }
}

fn demo_appointment(id: u64, date: &str, time: &str, patient_id: PatientId, name: &str) -> ServerAppointment {
    ServerAppointment {
        id,
        date: date.into(),
        time: time.into(),
        status: AppointmentStatus::Scheduled,
        patient_id,
        patient_name: name.into(),
        doctor_id: 1,
        doctor_name: "Dr. Somchai".into(),
    }
}

impl ClinicBackend for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginReply, ApiError> {
        self.enter(EP_LOGIN).await?;
        let data = lock(&self.data);
        match data.accounts.get(&credentials.username) {
            Some(acct) if acct.password == credentials.password => Ok(LoginReply {
                user: acct.user.clone(),
                role: acct.role.clone(),
            }),
            _ => Err(rejected(EP_LOGIN, 401, "ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง")),
        }
    }

    async fn list_patients(&self, query: Option<&str>) -> Result<Vec<Patient>, ApiError> {
        self.enter(EP_PATIENTS).await?;
        let data = lock(&self.data);
        let q = query.map(str::trim).unwrap_or_default();
        Ok(data
            .patients
            .iter()
            .filter(|p| q.is_empty() || p.name.contains(q) || p.hn.contains(q))
            .cloned()
            .collect())
    }

    async fn patient_records(&self, patient_id: PatientId) -> Result<Vec<MedicalRecord>, ApiError> {
        self.enter(EP_RECORDS).await?;
        let data = lock(&self.data);
        Ok(data.records.get(&patient_id).cloned().unwrap_or_default())
    }

    async fn create_treatment(&self, request: &TreatmentRequest) -> Result<TreatmentReceipt, ApiError> {
        self.enter(EP_TREATMENTS).await?;
        let mut data = lock(&self.data);
        let Some(appt) = data
            .appointments
            .iter_mut()
            .find(|a| a.id == request.appointment_id)
        else {
            return Err(rejected(EP_TREATMENTS, 404, "ไม่พบใบนัดนี้"));
        };
        appt.status = AppointmentStatus::Completed;
        let appt = appt.clone();

        let treatment_id = data.next_id();
        let payment_id = data.next_id();
        data.unpaid.push(UnpaidPayment {
            payment_id,
            amount: 0.0,
            status: "unpaid".into(),
            appointment_id: appt.id,
            appointment_date: Some(appt.date.clone()),
            appointment_time: Some(appt.time.clone()),
            patient_id: appt.patient_id,
            patient_name: appt.patient_name.clone(),
        });
        Ok(TreatmentReceipt {
            treatment_id,
            appointment_id: appt.id,
            payment_id,
        })
    }

    async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<ServerAppointment>, ApiError> {
        self.enter(EP_APPOINTMENTS).await?;
        let data = lock(&self.data);
        Ok(data
            .appointments
            .iter()
            .filter(|a| query.date.as_ref().map_or(true, |d| &a.date == d))
            .filter(|a| query.doctor_id.map_or(true, |d| a.doctor_id == d))
            .filter(|a| query.status.map_or(true, |s| a.status == s))
            .cloned()
            .collect())
    }

    async fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> Result<CreatedAppointment, ApiError> {
        self.enter(EP_CREATE_APPOINTMENT).await?;
        let mut data = lock(&self.data);
        let Some(patient_name) = data
            .patients
            .iter()
            .find(|p| p.id == request.patient_id)
            .map(|p| p.name.clone())
        else {
            return Err(rejected(EP_CREATE_APPOINTMENT, 404, "ไม่พบผู้ป่วย"));
        };
        if data.doctor_busy(
            request.doctor_id,
            &request.appointment_date,
            &request.appointment_time,
            None,
            false,
        ) {
            return Err(rejected(EP_CREATE_APPOINTMENT, 400, MSG_DOCTOR_BUSY));
        }

        let id = data.next_id();
        data.appointments.push(ServerAppointment {
            id,
            date: request.appointment_date.clone(),
            time: request.appointment_time.clone(),
            status: request.status,
            patient_id: request.patient_id,
            patient_name,
            doctor_id: request.doctor_id,
            doctor_name: String::new(),
        });
        Ok(CreatedAppointment {
            appointment_id: id,
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_date: request.appointment_date.clone(),
            appointment_time: request.appointment_time.clone(),
            status: request.status,
        })
    }

    async fn update_appointment(
        &self,
        appointment_id: u64,
        request: &RescheduleRequest,
    ) -> Result<(), ApiError> {
        self.enter(EP_UPDATE_APPOINTMENT).await?;
        if request.is_empty() {
            return Err(rejected(EP_UPDATE_APPOINTMENT, 400, "ไม่มีข้อมูลให้แก้ไข"));
        }
        let mut data = lock(&self.data);
        let Some(current) = data
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned()
        else {
            return Err(rejected(EP_UPDATE_APPOINTMENT, 404, "ไม่พบใบนัดนี้"));
        };

        let date = request.appointment_date.clone().unwrap_or(current.date);
        let time = request.appointment_time.clone().unwrap_or(current.time);
        let doctor_id = request.doctor_id.unwrap_or(current.doctor_id);
        if data.doctor_busy(doctor_id, &date, &time, Some(appointment_id), false) {
            return Err(rejected(EP_UPDATE_APPOINTMENT, 400, MSG_DOCTOR_BUSY));
        }

        if let Some(appt) = data.appointments.iter_mut().find(|a| a.id == appointment_id) {
            appt.date = date;
            appt.time = time;
            appt.doctor_id = doctor_id;
            if let Some(status) = request.status {
                appt.status = status;
            }
        }
        Ok(())
    }

    async fn cancel_appointment(&self, appointment_id: u64) -> Result<(), ApiError> {
        self.enter(EP_CANCEL).await?;
        set_status(&self.data, EP_CANCEL, appointment_id, AppointmentStatus::Cancelled)
    }

    async fn mark_no_show(&self, appointment_id: u64) -> Result<(), ApiError> {
        self.enter(EP_NO_SHOW).await?;
        set_status(&self.data, EP_NO_SHOW, appointment_id, AppointmentStatus::NoShow)
    }

    async fn list_unpaid_payments(&self) -> Result<Vec<UnpaidPayment>, ApiError> {
        self.enter(EP_UNPAID).await?;
        Ok(lock(&self.data).unpaid.clone())
    }

    async fn pay_payment(&self, payment_id: u64, request: &PayRequest) -> Result<(), ApiError> {
        self.enter(EP_PAY).await?;
        if request.amount <= 0.0 {
            return Err(rejected(EP_PAY, 400, "amount ต้องมากกว่า 0"));
        }
        let mut data = lock(&self.data);
        let before = data.unpaid.len();
        data.unpaid.retain(|p| p.payment_id != payment_id);
        if data.unpaid.len() == before {
            return Err(rejected(EP_PAY, 404, "ไม่พบรายการชำระเงินนี้"));
        }
        Ok(())
    }

    async fn validate_appointment(&self, request: &SlotCheckRequest) -> Result<(), ApiError> {
        self.enter(EP_VALIDATE).await?;
        let data = lock(&self.data);
        let (date, time) = request
            .appointment_time
            .trim()
            .split_once(' ')
            .unwrap_or((request.appointment_time.as_str(), ""));

        let mut errors = Vec::new();
        if !data.patients.iter().any(|p| p.id == request.patient_id) {
            errors.push("ไม่พบข้อมูลผู้ป่วยในระบบ");
        }
        if errors.is_empty() && data.doctor_busy(request.doctor_id, date, time, None, true) {
            errors.push(MSG_SLOT_TAKEN);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(rejected(EP_VALIDATE, 400, &errors.join(", ")))
        }
    }

    async fn suggest_slots(&self, query: &SlotQuery) -> Result<Vec<String>, ApiError> {
        self.enter(EP_SLOTS).await?;
        if query.date.trim().is_empty() {
            return Err(rejected(EP_SLOTS, 400, "กรุณาเลือกแพทย์และวันที่"));
        }
        let data = lock(&self.data);
        let busy: HashSet<&str> = data
            .appointments
            .iter()
            .filter(|a| a.doctor_id == query.doctor_id && a.date == query.date && holds_slot(a.status))
            .map(|a| a.time.as_str())
            .collect();
        Ok(day_slots().filter(|slot| !busy.contains(slot.as_str())).collect())
    }

    async fn patient_summary(&self, patient_id: PatientId) -> Result<PatientSummary, ApiError> {
        self.enter(EP_SUMMARY).await?;
        let data = lock(&self.data);
        let patient = data
            .patients
            .iter()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| rejected(EP_SUMMARY, 404, "ไม่พบข้อมูลผู้ป่วย"))?;
        let (first, last) = match patient.name.split_once(' ') {
            Some((first, last)) => (first, Some(last.to_string())),
            None => (patient.name.as_str(), None),
        };

        let mut history = data.records.get(&patient_id).cloned().unwrap_or_default();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history.truncate(5);

        Ok(PatientSummary {
            patient: SummaryPatient {
                patient_id,
                first_name: Some(first.to_string()),
                last_name: last,
                phone: patient.tel.clone(),
                birth_date: None,
            },
            recent_treatments: history
                .into_iter()
                .map(|r| RecentTreatment {
                    treatment_date: r.date,
                    diagnosis: r.diagnosis,
                    advice: Some(r.treatment),
                })
                .collect(),
        })
    }
}

fn set_status(
    data: &Mutex<MockData>,
    endpoint: &'static str,
    appointment_id: u64,
    status: AppointmentStatus,
) -> Result<(), ApiError> {
    let mut data = lock(data);
    let appt = data
        .appointments
        .iter_mut()
        .find(|a| a.id == appointment_id)
        .ok_or_else(|| rejected(endpoint, 404, "ไม่พบใบนัดนี้"))?;
    appt.status = status;
    Ok(())
}
