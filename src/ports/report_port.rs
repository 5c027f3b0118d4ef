//! Report generation port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::TickerscopeError;

/// Port for rendering a finished analysis.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), TickerscopeError>;
}
