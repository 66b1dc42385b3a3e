//! Owner dashboard commands.

use serde::Serialize;

use crate::api::ClinicBackend;
use crate::app_state::AppState;
use crate::dashboard::owner::{ChartBar, OwnerTotals, MSG_STAFF_ADDED};
use crate::forms::StaffDraft;
use crate::models::{OwnerTab, RevenueEntry, StaffMember};
use crate::report::PrintReceipt;

use super::{parse_arg, Saved};

/// Revenue tab: filtered table, summary cards and chart.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueView {
    pub rows: Vec<RevenueEntry>,
    pub totals: OwnerTotals,
    pub chart: Vec<ChartBar>,
}

pub fn switch_owner_tab<B: ClinicBackend>(state: &AppState<B>, tab: &str) -> Result<OwnerTab, String> {
    let tab: OwnerTab = parse_arg("แท็บ", tab)?;
    let dash = state.owner().map_err(|e| e.user_message())?;
    dash.switch_tab(tab).map_err(|e| e.user_message())?;
    Ok(tab)
}

pub fn search_owner<B: ClinicBackend>(state: &AppState<B>, text: &str) -> Result<(), String> {
    let dash = state.owner().map_err(|e| e.user_message())?;
    dash.set_query(text).map_err(|e| e.user_message())
}

pub fn owner_staff<B: ClinicBackend>(state: &AppState<B>) -> Result<Vec<StaffMember>, String> {
    let dash = state.owner().map_err(|e| e.user_message())?;
    dash.visible_staff().map_err(|e| e.user_message())
}

pub fn add_staff<B: ClinicBackend>(
    state: &AppState<B>,
    draft: StaffDraft,
) -> Result<Saved<StaffMember>, String> {
    let dash = state.owner().map_err(|e| e.user_message())?;
    let member = dash.add_staff(draft).map_err(|e| e.user_message(""))?;
    Ok(Saved::new(MSG_STAFF_ADDED, member))
}

pub fn owner_totals<B: ClinicBackend>(state: &AppState<B>) -> Result<OwnerTotals, String> {
    let dash = state.owner().map_err(|e| e.user_message())?;
    dash.totals().map_err(|e| e.user_message())
}

pub fn owner_revenue<B: ClinicBackend>(state: &AppState<B>) -> Result<RevenueView, String> {
    let dash = state.owner().map_err(|e| e.user_message())?;
    Ok(RevenueView {
        rows: dash.visible_revenue().map_err(|e| e.user_message())?,
        totals: dash.totals().map_err(|e| e.user_message())?,
        chart: dash.chart().map_err(|e| e.user_message())?,
    })
}

pub fn print_revenue_report<B: ClinicBackend>(state: &AppState<B>) -> Result<PrintReceipt, String> {
    let dash = state.owner().map_err(|e| e.user_message())?;
    dash.print_revenue_report(state.surface())
        .map_err(|e| e.user_message(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::MockBackend;
    use crate::commands::session::login;
    use crate::report::FilePrintSurface;

    #[tokio::test]
    async fn revenue_view_combines_table_totals_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(
            Arc::new(MockBackend::demo()),
            Arc::new(FilePrintSurface::new(dir.path())),
        );
        login(&state, "owner1", "1234").await.unwrap();

        switch_owner_tab(&state, "revenue").unwrap();
        let view = owner_revenue(&state).unwrap();
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.chart.len(), 3);
        assert_eq!(view.totals.total_revenue, 55_000);

        let receipt = print_revenue_report(&state).unwrap();
        assert!(receipt.pdf_path.unwrap().exists());
    }

    #[tokio::test]
    async fn add_staff_then_list() {
        let state = AppState::new(
            Arc::new(MockBackend::demo()),
            Arc::new(FilePrintSurface::new(std::env::temp_dir())),
        );
        login(&state, "owner1", "1234").await.unwrap();
        let saved = add_staff(
            &state,
            StaffDraft {
                name: "ประภา ใจงาม".into(),
                position: "พยาบาล".into(),
                tel: "083-333-4444".into(),
                salary: "20000".into(),
            },
        )
        .unwrap();
        assert_eq!(saved.message, MSG_STAFF_ADDED);
        assert_eq!(owner_staff(&state).unwrap().len(), 3);
        assert_eq!(owner_totals(&state).unwrap().total_salary, 53_000);
    }
}
