//! Report generation port trait.

use crate::domain::error::TitansimError;
use crate::domain::summary::SimulationSummary;
use chrono::NaiveDate;

/// Everything the rendering collaborator needs from a completed run.
pub struct SimulationReport<'a> {
    pub trajectory: &'a [f64],
    pub summary: &'a SimulationSummary,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Port for writing simulation results.
pub trait ReportPort {
    fn write(&self, report: &SimulationReport<'_>, output_path: &str)
        -> Result<(), TitansimError>;
}
