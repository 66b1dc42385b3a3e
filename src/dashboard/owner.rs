//! Owner dashboard: staff register and revenue summary. Purely local.

use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::app_state::{lock, StateError};
use crate::auth::Session;
use crate::collections::LocalCollection;
use crate::forms::StaffDraft;
use crate::models::{today_string, OwnerTab, RevenueEntry, StaffMember};
use crate::report::{self, PrintReceipt, PrintSurface};
use crate::search;

use super::{ActionError, TabState};

pub const MSG_STAFF_ADDED: &str = "เพิ่มพนักงานสำเร็จ";

/// Summary cards of the owner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerTotals {
    pub total_revenue: u64,
    pub total_services: u32,
    /// Rounded; zero when there were no services.
    pub average_per_service: u64,
    pub total_salary: u64,
    pub staff_count: usize,
}

/// One day of the revenue chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    /// Day and month, `d/m`.
    pub label: String,
    pub amount: u64,
    /// Height as a percentage of the best day.
    pub height_pct: f64,
}

struct OwnerState {
    tabs: TabState<OwnerTab>,
    staff: LocalCollection<StaffMember>,
    revenue: Vec<RevenueEntry>,
}

pub struct OwnerDashboard {
    session: Session,
    state: Mutex<OwnerState>,
}

impl OwnerDashboard {
    pub fn new(session: Session) -> Self {
        Self::with_data(session, seed_staff(), seed_revenue())
    }

    pub fn with_data(session: Session, staff: Vec<StaffMember>, revenue: Vec<RevenueEntry>) -> Self {
        Self {
            session,
            state: Mutex::new(OwnerState {
                tabs: TabState::new(OwnerTab::Staff),
                staff: LocalCollection::seeded("staff", staff),
                revenue,
            }),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn active_tab(&self) -> Result<OwnerTab, StateError> {
        Ok(lock(&self.state)?.tabs.active())
    }

    pub fn switch_tab(&self, tab: OwnerTab) -> Result<(), StateError> {
        lock(&self.state)?.tabs.switch(tab);
        Ok(())
    }

    pub fn set_query(&self, text: &str) -> Result<(), StateError> {
        lock(&self.state)?.tabs.set_query(text);
        Ok(())
    }

    // ── Staff tab ────────────────────────────────────────

    pub fn add_staff(&self, draft: StaffDraft) -> Result<StaffMember, ActionError> {
        let salary = draft.validate()?;
        let mut state = lock(&self.state)?;
        let member = state
            .staff
            .append_with(|id| draft.into_member(id, salary, today_string()));
        Ok(member.clone())
    }

    pub fn visible_staff(&self) -> Result<Vec<StaffMember>, StateError> {
        let state = lock(&self.state)?;
        Ok(search::filter(state.staff.items(), state.tabs.query())
            .into_iter()
            .cloned()
            .collect())
    }

    // ── Revenue tab ──────────────────────────────────────

    pub fn visible_revenue(&self) -> Result<Vec<RevenueEntry>, StateError> {
        let state = lock(&self.state)?;
        Ok(search::filter(&state.revenue, state.tabs.query())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Totals over everything, not just the filtered rows.
    pub fn totals(&self) -> Result<OwnerTotals, StateError> {
        let state = lock(&self.state)?;
        let total_revenue: u64 = state.revenue.iter().map(|r| r.amount).sum();
        let total_services: u32 = state.revenue.iter().map(|r| r.services).sum();
        let average_per_service = if total_services == 0 {
            0
        } else {
            (total_revenue as f64 / f64::from(total_services)).round() as u64
        };
        Ok(OwnerTotals {
            total_revenue,
            total_services,
            average_per_service,
            total_salary: state.staff.items().iter().map(|s| s.salary).sum(),
            staff_count: state.staff.len(),
        })
    }

    pub fn chart(&self) -> Result<Vec<ChartBar>, StateError> {
        let state = lock(&self.state)?;
        let max = state.revenue.iter().map(|r| r.amount).max().unwrap_or(0);
        Ok(state
            .revenue
            .iter()
            .map(|r| ChartBar {
                label: day_month(&r.date),
                amount: r.amount,
                height_pct: if max == 0 {
                    0.0
                } else {
                    r.amount as f64 * 100.0 / max as f64
                },
            })
            .collect())
    }

    pub fn print_revenue_report(&self, surface: &dyn PrintSurface) -> Result<PrintReceipt, ActionError> {
        let rows = lock(&self.state)?.revenue.clone();
        let doc = report::revenue_report(&rows, &today_string())?;
        Ok(surface.present(&doc)?)
    }
}

/// `2025-10-05` → `5/10`. Unparseable dates are shown as stored.
fn day_month(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{}/{}", d.day(), d.month()),
        Err(_) => date.to_string(),
    }
}

fn seed_staff() -> Vec<StaffMember> {
    vec![
        StaffMember {
            id: 1,
            name: "สมศรี พนักงานดี".into(),
            position: "พนักงานต้อนรับ".into(),
            tel: "081-111-2222".into(),
            start_date: "2023-01-15".into(),
            salary: 15_000,
        },
        StaffMember {
            id: 2,
            name: "วิไล ช่วยเหลือ".into(),
            position: "เจ้าหน้าที่การเงิน".into(),
            tel: "082-222-3333".into(),
            start_date: "2023-03-20".into(),
            salary: 18_000,
        },
    ]
}

fn seed_revenue() -> Vec<RevenueEntry> {
    [("2025-10-15", 15_000, 8), ("2025-10-16", 22_000, 12), ("2025-10-17", 18_000, 10)]
        .into_iter()
        .map(|(date, amount, services)| RevenueEntry {
            date: date.into(),
            amount,
            services,
            service_type: "ตรวจรักษา".into(),
        })
        .collect()
}
