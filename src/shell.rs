//! Line-oriented terminal front-end over the command layer.
//!
//! One command per line. Output is plain text; errors are the same
//! localized messages any other front-end would show.
//!
//! Write commands take `key=value` fields named after the form fields,
//! e.g. `add patient name=มานี มีนา age=29 hn=HN004 tel=087-000-1111`.
//! A word without `=` belongs to the previous value.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::api::ClinicBackend;
use crate::app_state::{AppState, Dashboard};
use crate::commands::{self, doctor, owner, session, staff, ListView, Saved};
use crate::dashboard::RecordPanel;
use crate::models::{
    DoctorTab, Keyed, MedicalRecord, OwnerTab, PatientId, ServerAppointment, StaffTab,
    UnpaidPayment,
};
use crate::report::{format_baht, PrintReceipt};

/// Fields sent as numbers; everything else is passed as text.
const ID_FIELDS: &[&str] = &["patient_id", "doctor_id", "appointment_id"];

pub const HELP: &str = "\
login <user> <pass>        เข้าสู่ระบบ
logout                     ออกจากระบบ
tab [name]                 เปลี่ยนแท็บ (ล้างคำค้นหา) หรือแสดงแท็บทั้งหมด
search <text>              ค้นหาในแท็บปัจจุบัน
list                       แสดงรายการของแท็บปัจจุบัน
records <id>               เวชระเบียนของผู้ป่วย
add <kind> key=value...    เพิ่มข้อมูล (patient | appointment | payment |
                           treatment | certificate | lab | staff)
print <kind> <id>          พิมพ์เอกสาร (appointment | certificate | revenue)
totals                     สรุปรายได้และเงินเดือน
แพทย์:
queue                      นัดที่รอตรวจ
treat appointment_id= symptom= diagnosis= advice=
summary <patient_id>       สรุปประวัติผู้ป่วยจากเซิร์ฟเวอร์
พนักงาน:
schedule [date= doctor_id= status=]
book patient_id= doctor_id= date= time=
check patient_id= doctor_id= date= time=
slots doctor_id= date=     เวลาว่างของแพทย์
reschedule <id> [date= time= doctor_id=]
cancel <id>                ยกเลิกนัด
noshow <id>                ไม่มาตามนัด
unpaid                     รายการค้างชำระ
pay <id> amount= method=   ชำระเงิน (cash | credit | transfer)
help                       แสดงคำสั่ง
quit                       ออกจากโปรแกรม";

/// What the loop does after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Shell<B> {
    state: Arc<AppState<B>>,
}

impl<B: ClinicBackend> Shell<B> {
    pub fn new(state: Arc<AppState<B>>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState<B> {
        &self.state
    }

    /// Run one line. Errors are rendered into the output text.
    pub async fn execute(&self, line: &str) -> Outcome {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        let result = match cmd {
            "" => Ok(String::new()),
            "quit" | "exit" => return Outcome::Quit,
            "help" => Ok(HELP.to_string()),
            "login" => self.login(rest).await,
            "logout" => session::logout(&self.state).map(|_| "ออกจากระบบแล้ว".to_string()),
            "tab" => self.switch_tab(rest),
            "search" => self.search(rest),
            "list" => self.list(),
            "records" => self.records(rest).await,
            "print" => self.print(rest),
            "totals" => self.totals(),
            "add" => self.add(rest),
            "queue" => self.queue().await,
            "treat" => self.treat(rest).await,
            "summary" => self.summary(rest).await,
            "schedule" => self.schedule(rest).await,
            "book" => self.book(rest).await,
            "check" => self.check(rest).await,
            "slots" => self.slots(rest).await,
            "reschedule" => self.reschedule(rest).await,
            "cancel" => self.cancel(rest).await,
            "noshow" => self.no_show(rest).await,
            "unpaid" => self.unpaid().await,
            "pay" => self.pay(rest).await,
            other => Err(format!("ไม่รู้จักคำสั่ง: {other} (พิมพ์ help)")),
        };

        Outcome::Continue(result.unwrap_or_else(|message| format!("! {message}")))
    }

    async fn login(&self, args: &str) -> Result<String, String> {
        let mut parts = args.split_whitespace();
        let username = parts.next().unwrap_or_default();
        let password = parts.next().unwrap_or_default();
        let user = session::login(&self.state, username, password).await?;
        Ok(format!("สวัสดี {} ({})", user.name, user.role.label()))
    }

    fn dashboard(&self) -> Result<Dashboard<B>, String> {
        self.state.dashboard().map_err(|e| e.user_message())
    }

    fn switch_tab(&self, name: &str) -> Result<String, String> {
        if name.is_empty() {
            let keys = match self.dashboard()? {
                Dashboard::Doctor(_) => DoctorTab::keys(),
                Dashboard::Staff(_) => StaffTab::keys(),
                Dashboard::Owner(_) => OwnerTab::keys(),
            };
            return Ok(format!("แท็บ: {keys}"));
        }
        let label = match self.dashboard()? {
            Dashboard::Doctor(_) => doctor::switch_doctor_tab(&self.state, name)?.label(),
            Dashboard::Staff(_) => staff::switch_staff_tab(&self.state, name)?.label(),
            Dashboard::Owner(_) => owner::switch_owner_tab(&self.state, name)?.label(),
        };
        Ok(format!("แท็บ: {label}"))
    }

    fn search(&self, text: &str) -> Result<String, String> {
        match self.dashboard()? {
            Dashboard::Doctor(_) => doctor::search_doctor(&self.state, text)?,
            Dashboard::Staff(_) => staff::search_staff(&self.state, text)?,
            Dashboard::Owner(_) => owner::search_owner(&self.state, text)?,
        }
        self.list()
    }

    fn list(&self) -> Result<String, String> {
        match self.dashboard()? {
            Dashboard::Doctor(d) => {
                let tab = d.active_tab().map_err(|e| e.user_message())?;
                self.list_doctor(tab)
            }
            Dashboard::Staff(d) => {
                let tab = d.active_tab().map_err(|e| e.user_message())?;
                self.list_staff(tab)
            }
            Dashboard::Owner(d) => {
                let tab = d.active_tab().map_err(|e| e.user_message())?;
                self.list_owner(tab)
            }
        }
    }

    fn list_doctor(&self, tab: DoctorTab) -> Result<String, String> {
        let lines: Vec<String> = match tab {
            DoctorTab::Records => return patient_lines(doctor::doctor_patients(&self.state)?),
            DoctorTab::Treatment => doctor::doctor_treatments(&self.state)?
                .iter()
                .map(|t| format!("{}. {} {} | {} | {}", t.id, t.date, t.patient_name, t.diagnosis, t.treatment))
                .collect(),
            DoctorTab::Certificate => doctor::doctor_certificates(&self.state)?
                .iter()
                .map(|c| format!("{}. {} {} | {}", c.id, c.issued_on, c.patient_name, c.certificate_type.label()))
                .collect(),
            DoctorTab::Lab => doctor::doctor_labs(&self.state)?
                .iter()
                .map(|row| {
                    format!(
                        "{}. {} {} ({}) | {} | {}",
                        row.lab.id,
                        row.lab.date,
                        row.lab.patient_name,
                        row.hn,
                        row.lab.test_type.label(),
                        row.lab.result
                    )
                })
                .collect(),
            DoctorTab::Referral => doctor::doctor_referrals(&self.state)?
                .iter()
                .map(|r| format!("{}. {} {} → {} | {} | {}", r.id, r.date, r.patient_name, r.hospital, r.reason, r.status.label()))
                .collect(),
        };
        Ok(join_or_empty(lines))
    }

    fn list_staff(&self, tab: StaffTab) -> Result<String, String> {
        match tab {
            StaffTab::Patients => patient_lines(staff::staff_patients(&self.state)?),
            StaffTab::Appointments => Ok(join_or_empty(
                staff::staff_appointments(&self.state)?
                    .iter()
                    .map(|a| {
                        format!(
                            "{}. {} {} {} | {} | {}",
                            a.id,
                            a.date,
                            a.time,
                            a.patient_name,
                            a.appointment_type.label(),
                            a.status.label()
                        )
                    })
                    .collect(),
            )),
            StaffTab::Payment => {
                let view = staff::staff_payments(&self.state)?;
                let mut lines: Vec<String> = view
                    .rows
                    .iter()
                    .map(|p| {
                        format!(
                            "{}. {} {} | {} | {} บาท | {}",
                            p.id,
                            p.date,
                            p.patient_name,
                            p.service.label(),
                            format_baht(p.amount),
                            p.method.label()
                        )
                    })
                    .collect();
                lines.push(format!("รวม {} บาท", format_baht(view.total)));
                Ok(lines.join("\n"))
            }
        }
    }

    fn list_owner(&self, tab: OwnerTab) -> Result<String, String> {
        let lines: Vec<String> = match tab {
            OwnerTab::Staff => owner::owner_staff(&self.state)?
                .iter()
                .map(|s| {
                    format!(
                        "{}. {} | {} | {} | เริ่มงาน {} | {} บาท/เดือน",
                        s.id,
                        s.name,
                        s.position,
                        s.tel,
                        s.start_date,
                        format_baht(s.salary)
                    )
                })
                .collect(),
            OwnerTab::Revenue => {
                let view = owner::owner_revenue(&self.state)?;
                view.rows
                    .iter()
                    .map(|r| format!("{} | {} | {} ครั้ง | {} บาท", r.date, r.service_type, r.services, format_baht(r.amount)))
                    .chain(view.chart.iter().map(|bar| {
                        format!("{:>6} {} {}", bar.label, "█".repeat((bar.height_pct / 5.0).round() as usize), format_baht(bar.amount))
                    }))
                    .collect()
            }
        };
        Ok(join_or_empty(lines))
    }

    async fn records(&self, arg: &str) -> Result<String, String> {
        let id: PatientId = arg.trim().parse().map_err(|_| format!("รหัสผู้ป่วยไม่ถูกต้อง: {arg}"))?;
        let panel = match self.dashboard()? {
            Dashboard::Doctor(_) => match doctor::toggle_patient_records(&self.state, id).await? {
                Some(panel) => panel,
                None => return Ok("ซ่อนเวชระเบียน".to_string()),
            },
            Dashboard::Staff(_) => staff::staff_records(&self.state, id).await?,
            Dashboard::Owner(_) => return Err("คำสั่งนี้ใช้ได้เฉพาะแพทย์หรือพนักงาน".to_string()),
        };
        Ok(render_panel(&panel))
    }

    fn print(&self, args: &str) -> Result<String, String> {
        let mut parts = args.split_whitespace();
        let kind = parts.next().unwrap_or_default();
        let id = parts.next().map(str::parse::<u32>);

        let receipt = match (kind, id) {
            ("revenue", _) => owner::print_revenue_report(&self.state)?,
            ("appointment", Some(Ok(id))) => staff::print_appointment(&self.state, id)?,
            ("certificate", Some(Ok(id))) => doctor::print_certificate(&self.state, id)?,
            _ => return Err("ใช้: print <appointment|certificate> <id> หรือ print revenue".to_string()),
        };
        Ok(render_receipt(&receipt))
    }

    // ── Writes ───────────────────────────────────────────

    fn add(&self, args: &str) -> Result<String, String> {
        let (kind, fields) = split_first(args);
        match kind {
            "patient" => Ok(confirm(staff::add_patient(&self.state, draft(fields)?)?, |p| p.id)),
            "appointment" => Ok(confirm(staff::add_appointment(&self.state, draft(fields)?)?, |a| a.id)),
            "payment" => Ok(confirm(staff::add_payment(&self.state, draft(fields)?)?, |p| p.id)),
            "treatment" => Ok(confirm(doctor::add_treatment(&self.state, draft(fields)?)?, |t| t.id)),
            "certificate" => Ok(confirm(doctor::issue_certificate(&self.state, draft(fields)?)?, |c| c.id)),
            "lab" => Ok(confirm(doctor::add_lab(&self.state, draft(fields)?)?, |l| l.id)),
            "staff" => Ok(confirm(owner::add_staff(&self.state, draft(fields)?)?, |s| s.id)),
            _ => Err(
                "ใช้: add <patient|appointment|payment|treatment|certificate|lab|staff> key=value..."
                    .to_string(),
            ),
        }
    }

    async fn queue(&self) -> Result<String, String> {
        let view = doctor::doctor_queue(&self.state).await?;
        Ok(view_lines(view, render_server_appointment))
    }

    async fn treat(&self, args: &str) -> Result<String, String> {
        let saved = doctor::submit_treatment(&self.state, draft(args)?).await?;
        Ok(format!("{} (ใบชำระเงิน #{})", saved.message, saved.item.payment_id))
    }

    async fn summary(&self, arg: &str) -> Result<String, String> {
        let id = parse_id(arg)?;
        let summary = doctor::patient_summary(&self.state, id).await?;
        let mut lines = vec![format!(
            "{}. {} | โทร: {}",
            summary.patient.patient_id,
            summary.patient.full_name(),
            summary.patient.phone.as_deref().unwrap_or("-")
        )];
        if summary.recent_treatments.is_empty() {
            lines.push("ยังไม่มีประวัติการรักษา".to_string());
        }
        lines.extend(summary.recent_treatments.iter().map(|t| {
            format!(
                "{} | การวินิจฉัย: {} | คำแนะนำ: {}",
                t.treatment_date,
                t.diagnosis,
                t.advice.as_deref().unwrap_or("-")
            )
        }));
        Ok(lines.join("\n"))
    }

    async fn schedule(&self, args: &str) -> Result<String, String> {
        let view = staff::refresh_appointment_book(&self.state, draft(args)?).await?;
        Ok(view_lines(view, render_server_appointment))
    }

    async fn book(&self, args: &str) -> Result<String, String> {
        let saved = staff::book_appointment(&self.state, draft(args)?).await?;
        Ok(confirm(saved, |a| a.appointment_id))
    }

    async fn check(&self, args: &str) -> Result<String, String> {
        Ok(staff::check_booking(&self.state, draft(args)?).await?.to_string())
    }

    async fn slots(&self, args: &str) -> Result<String, String> {
        let slots = staff::suggest_slots(&self.state, draft(args)?).await?;
        if slots.is_empty() {
            Ok("คิวเต็มแล้ว".to_string())
        } else {
            Ok(slots.join(" "))
        }
    }

    async fn reschedule(&self, args: &str) -> Result<String, String> {
        let (id, fields) = split_first(args);
        let saved = staff::reschedule_appointment(&self.state, parse_id(id)?, draft(fields)?).await?;
        Ok(confirm(saved, |id| *id))
    }

    async fn cancel(&self, arg: &str) -> Result<String, String> {
        staff::cancel_appointment(&self.state, parse_id(arg)?).await?;
        Ok("ยกเลิกนัดหมายแล้ว".to_string())
    }

    async fn no_show(&self, arg: &str) -> Result<String, String> {
        staff::mark_no_show(&self.state, parse_id(arg)?).await?;
        Ok("บันทึกไม่มาตามนัดแล้ว".to_string())
    }

    async fn unpaid(&self) -> Result<String, String> {
        let view = staff::refresh_unpaid(&self.state).await?;
        Ok(view_lines(view, render_unpaid))
    }

    async fn pay(&self, args: &str) -> Result<String, String> {
        let (id, fields) = split_first(args);
        let saved = staff::settle_payment(&self.state, parse_id(id)?, draft(fields)?).await?;
        Ok(confirm(saved, |id| *id))
    }

    fn totals(&self) -> Result<String, String> {
        let t = owner::owner_totals(&self.state)?;
        Ok(format!(
            "รายได้รวม {} บาท\nจำนวนบริการ {} ครั้ง\nเฉลี่ยต่อบริการ {} บาท\nเงินเดือนรวม {} บาท ({} คน)",
            format_baht(t.total_revenue),
            t.total_services,
            format_baht(t.average_per_service),
            format_baht(t.total_salary),
            t.staff_count
        ))
    }
}

// ── Argument parsing ─────────────────────────────────────

fn split_first(args: &str) -> (&str, &str) {
    match args.trim().split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (args.trim(), ""),
    }
}

fn parse_id(arg: &str) -> Result<u64, String> {
    arg.trim()
        .parse()
        .map_err(|_| format!("รหัสไม่ถูกต้อง: {arg}"))
}

fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Split `key=value` fields. A word without a field name is appended to
/// the previous value.
fn parse_fields(args: &str) -> Result<Vec<(String, String)>, String> {
    let mut fields: Vec<(String, String)> = Vec::new();
    for word in args.split_whitespace() {
        match word.split_once('=') {
            Some((name, value)) if is_field_name(name) => {
                fields.push((name.to_string(), value.to_string()));
            }
            _ => match fields.last_mut() {
                Some((_, value)) => {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(word);
                }
                None => return Err(format!("ใช้รูปแบบ key=value: {word}")),
            },
        }
    }
    Ok(fields)
}

/// Build a form draft from `key=value` fields through its serde shape.
fn draft<T: DeserializeOwned>(args: &str) -> Result<T, String> {
    let mut object = Map::new();
    for (name, value) in parse_fields(args)? {
        let value = if ID_FIELDS.contains(&name.as_str()) {
            let id = parse_id(&value).map_err(|_| format!("รหัสไม่ถูกต้อง: {name}={value}"))?;
            Value::from(id)
        } else {
            Value::String(value)
        };
        object.insert(name, value);
    }
    serde_json::from_value(Value::Object(object)).map_err(|e| format!("ข้อมูลไม่ถูกต้อง: {e}"))
}

// ── Rendering ────────────────────────────────────────────

fn confirm<T, I: std::fmt::Display>(saved: Saved<T>, id: impl Fn(&T) -> I) -> String {
    format!("{} (#{})", saved.message, id(&saved.item))
}

fn view_lines<T>(view: ListView<T>, render: impl Fn(&T) -> String) -> String {
    if view.loading {
        return "กำลังโหลด...".to_string();
    }
    let mut lines: Vec<String> = view.error.into_iter().map(|e| format!("! {e}")).collect();
    lines.extend(view.rows.iter().map(render));
    join_or_empty(lines)
}

fn render_server_appointment(a: &ServerAppointment) -> String {
    format!(
        "{}. {} {} {} | {} | {}",
        a.id,
        a.date,
        a.time,
        a.patient_name,
        a.doctor_name,
        a.status.label()
    )
}

fn render_unpaid(p: &UnpaidPayment) -> String {
    format!(
        "{}. {} | นัด #{} {} {} | {} บาท",
        p.payment_id,
        p.patient_name,
        p.appointment_id,
        p.appointment_date.as_deref().unwrap_or("-"),
        p.appointment_time.as_deref().unwrap_or(""),
        format_baht(p.amount.round() as u64)
    )
}

fn patient_lines(view: commands::ListView<crate::models::Patient>) -> Result<String, String> {
    if view.loading {
        return Ok("กำลังโหลดข้อมูลผู้ป่วย...".to_string());
    }
    let mut lines: Vec<String> = view.error.into_iter().map(|e| format!("! {e}")).collect();
    lines.extend(view.rows.iter().map(|p| {
        format!(
            "{}. {} | HN: {} | อายุ: {} | โทร: {} | มาล่าสุด: {}",
            p.id,
            p.name,
            p.hn,
            p.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            p.tel_or_empty(),
            p.last_visit
        )
    }));
    Ok(join_or_empty(lines))
}

fn render_panel(panel: &RecordPanel) -> String {
    match panel {
        RecordPanel::NotRequested => String::new(),
        RecordPanel::Loading => "กำลังโหลดเวชระเบียน...".to_string(),
        RecordPanel::Failed(message) => format!("! {message}"),
        RecordPanel::Empty => "ยังไม่มีเวชระเบียน".to_string(),
        RecordPanel::Records(rows) => rows.iter().map(render_record).collect::<Vec<_>>().join("\n"),
    }
}

fn render_record(r: &MedicalRecord) -> String {
    format!("{} | การวินิจฉัย: {} | การรักษา: {} | โดย: {}", r.date, r.diagnosis, r.treatment, r.doctor)
}

fn render_receipt(receipt: &PrintReceipt) -> String {
    [&receipt.html_path, &receipt.pdf_path]
        .iter()
        .filter_map(|p| p.as_ref())
        .map(|p| format!("บันทึกแล้ว: {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_or_empty(lines: Vec<String>) -> String {
    if lines.is_empty() {
        "(ไม่พบข้อมูล)".to_string()
    } else {
        lines.join("\n")
    }
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run<B, R, W>(shell: &Shell<B>, input: R, mut output: W) -> std::io::Result<()>
where
    B: ClinicBackend,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"> ").await?;
    output.flush().await?;
    while let Some(line) = lines.next_line().await? {
        match shell.execute(&line).await {
            Outcome::Quit => break,
            Outcome::Continue(text) => {
                if !text.is_empty() {
                    output.write_all(text.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
            }
        }
        output.write_all(b"> ").await?;
        output.flush().await?;
    }
    tracing::debug!("Shell input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::report::FilePrintSurface;

    fn shell(dir: &std::path::Path) -> Shell<MockBackend> {
        let state = AppState::new(
            Arc::new(MockBackend::demo()),
            Arc::new(FilePrintSurface::new(dir)),
        );
        Shell::new(Arc::new(state))
    }

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Continue(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn commands_require_login() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        assert_eq!(text(sh.execute("list").await), "! กรุณาเข้าสู่ระบบ");
        assert_eq!(sh.execute("quit").await, Outcome::Quit);
    }

    #[tokio::test]
    async fn doctor_session_lists_and_toggles_records() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        assert!(text(sh.execute("login doctor1 1234").await).contains("Dr. Somchai"));

        let list = text(sh.execute("list").await);
        assert_eq!(list.lines().count(), 3);
        assert!(list.contains("HN001"));

        assert!(text(sh.execute("records 1").await).contains("ไข้หวัด"));
        assert_eq!(text(sh.execute("records 1").await), "ซ่อนเวชระเบียน");
        assert_eq!(text(sh.execute("records 2").await), "ยังไม่มีเวชระเบียน");

        assert!(text(sh.execute("search สมหญิง").await).contains("HN002"));
        assert!(text(sh.execute("tab lab").await).contains("ผลแล็บ"));
    }

    #[tokio::test]
    async fn staff_prints_appointment_slip() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login staff1 1234").await);
        text(sh.execute("tab appointments").await);
        assert_eq!(text(sh.execute("list").await).lines().count(), 3);

        let out = text(sh.execute("print appointment 1").await);
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains(".pdf"));
    }

    #[tokio::test]
    async fn owner_totals_and_wrong_role_errors() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login owner1 1234").await);
        let totals = text(sh.execute("totals").await);
        assert!(totals.contains("55,000"));
        assert!(totals.contains("1,833"));

        assert!(text(sh.execute("records 1").await).starts_with("! "));
        assert!(text(sh.execute("tab lab").await).starts_with("! "));
    }

    #[tokio::test]
    async fn run_loop_stops_at_quit() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        let input = b"help\nquit\nlist\n".as_slice();
        let mut output = Vec::new();
        run(&sh, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("login <user> <pass>"));
        assert!(!printed.contains("กรุณาเข้าสู่ระบบ"));
    }

    #[test]
    fn fields_keep_spaces_inside_values() {
        let fields = parse_fields("name=มานี มีนา age=29 tel=").unwrap();
        assert_eq!(
            fields,
            vec![
                ("name".to_string(), "มานี มีนา".to_string()),
                ("age".to_string(), "29".to_string()),
                ("tel".to_string(), String::new()),
            ]
        );
        assert!(parse_fields("มานี").is_err());
        assert!(draft::<crate::forms::BookingDraft>("patient_id=abc").is_err());
    }

    #[tokio::test]
    async fn incomplete_add_alerts_and_valid_add_grows_list() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login staff1 1234").await);

        assert_eq!(
            text(sh.execute("add patient name=มานี มีนา").await),
            "! กรุณากรอกข้อมูลให้ครบถ้วน"
        );
        assert_eq!(text(sh.execute("list").await).lines().count(), 3);

        let out = text(sh.execute("add patient name=มานี มีนา age=29 hn=HN004 tel=087-000-1111").await);
        assert_eq!(out, "เพิ่มผู้ป่วยสำเร็จ (#4)");
        let list = text(sh.execute("list").await);
        assert_eq!(list.lines().count(), 4);
        assert!(list.contains("มานี มีนา | HN: HN004"));

        assert_eq!(text(sh.execute("add lab patient_id=1 result=ปกติ").await), "! คำสั่งนี้ใช้ได้เฉพาะแพทย์");
    }

    #[tokio::test]
    async fn doctor_adds_certificate_then_prints_it() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login doctor1 1234").await);

        let out = text(sh.execute("add certificate patient_id=1 details=มีไข้ ควรพักผ่อน").await);
        assert!(out.starts_with("ออกใบรับรองแพทย์สำเร็จ (#"), "{out}");
        let id = out
            .trim_end_matches(')')
            .rsplit('#')
            .next()
            .unwrap()
            .to_string();

        let printed = text(sh.execute(&format!("print certificate {id}")).await);
        assert!(printed.contains(".html"));
        assert!(printed.contains(".pdf"));
    }

    #[tokio::test]
    async fn doctor_treats_queued_appointment() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login doctor1 1234").await);
        assert_eq!(text(sh.execute("queue").await).lines().count(), 2);

        let out = text(sh.execute("treat appointment_id=1 diagnosis=ไข้หวัด advice=พักผ่อน ดื่มน้ำมากๆ").await);
        assert!(out.starts_with("บันทึกการรักษาสำเร็จ (ใบชำระเงิน #"), "{out}");
        assert_eq!(text(sh.execute("queue").await).lines().count(), 1);

        let summary = text(sh.execute("summary 1").await);
        assert!(summary.starts_with("1. สมชาย ใจดี"));
        assert!(summary.contains("ไข้หวัด"));
    }

    #[tokio::test]
    async fn staff_books_checks_reschedules_and_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login staff1 1234").await);

        let booked = text(sh.execute("book patient_id=3 doctor_id=1 date=2025-10-20 time=13:00").await);
        assert!(booked.starts_with("สร้างนัดหมายสำเร็จ (#"), "{booked}");
        assert_eq!(text(sh.execute("schedule date=2025-10-20").await).lines().count(), 3);

        let clash = text(sh.execute("check patient_id=2 doctor_id=1 date=2025-10-20 time=13:10").await);
        assert!(clash.starts_with("! ช่วงเวลาดังกล่าว"), "{clash}");
        let slots = text(sh.execute("slots doctor_id=1 date=2025-10-20").await);
        assert!(slots.contains("13:15"));
        assert!(!slots.contains("13:00"));

        assert_eq!(
            text(sh.execute("reschedule 1 time=15:00").await),
            "เลื่อนนัดหมายสำเร็จ (#1)"
        );
        assert_eq!(text(sh.execute("cancel 2").await), "ยกเลิกนัดหมายแล้ว");
        assert!(text(sh.execute("cancel 999").await).starts_with("! "));

        let book = text(sh.execute("schedule date=2025-10-20").await);
        assert!(book.contains("1. 2025-10-20 15:00"));
        assert!(book.contains("เลื่อนนัด"));
        assert!(book.contains("ยกเลิก"));
    }

    #[tokio::test]
    async fn staff_settles_unpaid_payment() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login staff1 1234").await);
        assert!(text(sh.execute("unpaid").await).contains("สมชาย ใจดี"));

        assert_eq!(
            text(sh.execute("pay 1 amount=abc method=cash").await),
            "! กรุณากรอกตัวเลขให้ถูกต้อง"
        );
        assert_eq!(
            text(sh.execute("pay 1 amount=500 method=cash").await),
            "บันทึกการชำระเงินสำเร็จ (#1)"
        );
        assert_eq!(text(sh.execute("unpaid").await), "(ไม่พบข้อมูล)");
    }

    #[tokio::test]
    async fn bare_tab_lists_keys() {
        let dir = tempfile::tempdir().unwrap();
        let sh = shell(dir.path());
        text(sh.execute("login staff1 1234").await);
        assert_eq!(
            text(sh.execute("tab").await),
            "แท็บ: patients, appointments, payment"
        );
    }
}
