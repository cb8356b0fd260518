//! Console and JSON rendering of a [`RunSummary`].

use crate::core::errors::SimError;
use crate::core::station::stats::RunSummary;
use std::fmt;

/// Console layout of a run summary
pub struct TextReport<'a>(pub &'a RunSummary);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "--- Simulation Results ---")?;
        writeln!(f, "Total cars served: {}", summary.total_completed)?;
        match summary.average_wait() {
            Ok(wait) => writeln!(f, "Average waiting time: {:.2} minutes", wait)?,
            Err(_) => writeln!(f, "Average waiting time: n/a (no car reached a pump)")?,
        }
        writeln!(f, "Cashier utilization: {:.2}%", summary.till_utilization * 100.0)?;
        let pumps = summary
            .per_pump_utilization
            .iter()
            .zip(&summary.per_pump_services);
        for (i, (usage, served)) in pumps.enumerate() {
            writeln!(
                f,
                "Pump {} utilization: {:.2}% ({} cars)",
                i + 1,
                usage * 100.0,
                served
            )?;
        }
        if summary.cars_in_flight > 0 {
            writeln!(
                f,
                "Cars still in the station at close: {}",
                summary.cars_in_flight
            )?;
        }
        Ok(())
    }
}

pub fn render_text(summary: &RunSummary) -> String {
    TextReport(summary).to_string()
}

pub fn to_json(summary: &RunSummary) -> Result<String, SimError> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| SimError::Execution(format!("failed to serialize summary: {}", e)))
}
