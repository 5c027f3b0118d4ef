//! Plain-text rendering of an analysis, for the console and `.txt` reports.

use crate::adapters::html_report_adapter::latest_rows;
use crate::domain::analysis::AnalysisReport;
use crate::domain::error::TickerscopeError;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn fetching_line(ticker: &str, interval: &str, period: &str) -> String {
    format!(
        "Fetching data for {} at {} intervals over the past {}.",
        ticker, interval, period
    )
}

pub fn render(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Data Fetched: {} rows.", report.series.bar_count());
    let _ = writeln!(out);
    let _ = writeln!(out, "Technical Analysis Insights");
    for insight in &report.insights {
        let _ = writeln!(out, "- {}", insight);
    }

    let rows = latest_rows(&report.displayed());
    if !rows.is_empty() {
        let width = rows.iter().map(|r| r.indicator.len()).max().unwrap_or(0);
        let _ = writeln!(out);
        let _ = writeln!(out, "Latest Values");
        for row in rows {
            let _ = writeln!(
                out,
                "  {:<width$}  {:<9}  {:>12}",
                row.indicator,
                row.component,
                row.value,
                width = width
            );
        }
    }
    out
}

pub struct TextReportAdapter;

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), TickerscopeError> {
        let request = &report.request;
        let mut text = fetching_line(
            &request.ticker,
            request.interval.as_str(),
            request.period.as_str(),
        );
        text.push('\n');
        text.push_str(&render(report));

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        tracing::info!(path = output_path, "wrote text report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{run_analysis, AnalysisRequest};
    use crate::domain::indicator_set::IndicatorSet;
    use crate::domain::interpreter::InterpreterConfig;
    use crate::domain::market::{Interval, Period};
    use crate::domain::ohlcv::OhlcvBar;
    use crate::ports::data_port::DataPort;
    use chrono::NaiveDate;

    struct Ramp;

    impl DataPort for Ramp {
        fn fetch_ohlcv(
            &self,
            ticker: &str,
            _interval: Interval,
            _period: Period,
        ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
            let start = NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            Ok((0..30)
                .map(|i| {
                    let close = if i < 29 { 50.0 } else { 60.0 };
                    OhlcvBar {
                        ticker: ticker.to_string(),
                        timestamp: start + chrono::Duration::days(i),
                        open: close,
                        high: close,
                        low: close,
                        close,
                        volume: 500,
                    }
                })
                .collect())
        }
    }

    fn report() -> AnalysisReport {
        let request = AnalysisRequest::new("tsla", Interval::OneDay, Period::OneMonth)
            .unwrap()
            .with_set(IndicatorSet::Volume);
        run_analysis(&Ramp, &request, &InterpreterConfig::default()).unwrap()
    }

    #[test]
    fn fetching_line_matches_console_format() {
        assert_eq!(
            fetching_line("AAPL", "1d", "1mo"),
            "Fetching data for AAPL at 1d intervals over the past 1mo."
        );
    }

    #[test]
    fn render_lists_insights_as_bullets() {
        let text = render(&report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Data Fetched: 30 rows.");
        assert_eq!(lines[2], "Technical Analysis Insights");
        // flat history then a jump: no losses, close breaks the upper band
        assert_eq!(
            lines[3],
            "- RSI is 100.00 (Overbought). Price might reverse or consolidate."
        );
        assert!(lines[4].starts_with("- Price is above the upper Bollinger Band ($"));
    }

    #[test]
    fn render_includes_latest_values() {
        let text = render(&report());
        assert!(text.contains("Latest Values"));
        assert!(text.contains("OBV"));
        assert!(text.contains("RSI(14)"));
    }

    #[test]
    fn text_report_adapter_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.txt");
        TextReportAdapter
            .write(&report(), path.to_str().unwrap())
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Fetching data for TSLA at 1d intervals over the past 1mo."));
        assert!(contents.contains("Technical Analysis Insights"));
    }
}
