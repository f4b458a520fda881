//! CSV report adapter: writes the balance trajectory for external rendering.

use crate::domain::error::TitansimError;
use crate::ports::report_port::{ReportPort, SimulationReport};
use std::fs::File;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &SimulationReport<'_>,
        output_path: &str,
    ) -> Result<(), TitansimError> {
        let file = File::create(output_path)?;
        let mut wtr = csv::Writer::from_writer(file);

        wtr.write_record(["trade_index", "balance"])
            .map_err(|e| TitansimError::Data {
                reason: format!("failed to write report header: {}", e),
            })?;

        for (index, balance) in report.trajectory.iter().enumerate() {
            wtr.write_record([index.to_string(), format!("{:.2}", balance)])
                .map_err(|e| TitansimError::Data {
                    reason: format!("failed to write report row: {}", e),
                })?;
        }

        wtr.flush()?;
        Ok(())
    }
}
