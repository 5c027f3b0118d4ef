//! HTML report adapter implementing ReportPort.
//!
//! Renders an analysis through an Askama template with inline SVG charts.

use std::fs;
use std::path::Path;

use crate::adapters::chart_svg::{generate_panel_svg, generate_price_svg, guides_for};
use crate::domain::analysis::AnalysisReport;
use crate::domain::error::TickerscopeError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::interpreter::Insight;
use crate::ports::report_port::ReportPort;

use askama::Template;

struct Panel {
    title: String,
    svg: String,
}

/// One row of the latest-values table.
pub(crate) struct LatestRow {
    pub indicator: String,
    pub component: String,
    pub value: String,
}

/// Latest value of every component, or a warm-up marker while undefined.
pub(crate) fn latest_rows(displayed: &[&IndicatorSeries]) -> Vec<LatestRow> {
    let mut rows = Vec::new();
    for series in displayed {
        let indicator = series.indicator_type.to_string();
        match series.latest_valid() {
            Some(point) => {
                for (component, value) in point.value.components() {
                    rows.push(LatestRow {
                        indicator: indicator.clone(),
                        component: component.to_string(),
                        value: format!("{:.2}", value),
                    });
                }
            }
            None => rows.push(LatestRow {
                indicator,
                component: "-".to_string(),
                value: "n/a (warming up)".to_string(),
            }),
        }
    }
    rows
}

#[derive(Template)]
#[template(path = "analysis.html")]
struct AnalysisTemplate<'a> {
    ticker: &'a str,
    interval: &'a str,
    period: &'a str,
    rows: usize,
    first: String,
    last: String,
    latest_close: String,
    insights: &'a [Insight],
    price_svg: String,
    panels: Vec<Panel>,
    latest_values: Vec<LatestRow>,
}

pub struct HtmlReportAdapter {
    rsi_levels: (f64, f64),
}

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self {
            rsi_levels: (70.0, 30.0),
        }
    }

    /// Overbought and oversold levels drawn on the RSI panel.
    pub fn with_rsi_levels(overbought: f64, oversold: f64) -> Self {
        Self {
            rsi_levels: (overbought, oversold),
        }
    }

    pub fn render(&self, report: &AnalysisReport) -> Result<String, TickerscopeError> {
        let displayed = report.displayed();
        let overlays: Vec<&IndicatorSeries> = displayed
            .iter()
            .copied()
            .filter(|s| s.indicator_type.is_price_overlay())
            .collect();

        let panels = displayed
            .iter()
            .filter(|s| !s.indicator_type.is_price_overlay())
            .map(|s| Panel {
                title: s.indicator_type.to_string(),
                svg: generate_panel_svg(s, &guides_for(s.indicator_type, self.rsi_levels)),
            })
            .filter(|p| !p.svg.is_empty())
            .collect();

        let (first, last) = report.series.time_range();
        let template = AnalysisTemplate {
            ticker: &report.request.ticker,
            interval: report.request.interval.as_str(),
            period: report.request.period.as_str(),
            rows: report.series.bar_count(),
            first: first.to_string(),
            last: last.to_string(),
            latest_close: format!("{:.2}", report.series.latest().close),
            insights: &report.insights,
            price_svg: generate_price_svg(&report.series, &overlays),
            panels,
            latest_values: latest_rows(&displayed),
        };

        template.render().map_err(|e| TickerscopeError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), TickerscopeError> {
        let html = self.render(report)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;
        tracing::info!(path = output_path, "wrote html report");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{run_analysis, AnalysisRequest};
    use crate::domain::indicator::IndicatorType;
    use crate::domain::indicator_set::IndicatorSet;
    use crate::domain::interpreter::InterpreterConfig;
    use crate::domain::market::{Interval, Period};
    use crate::domain::ohlcv::OhlcvBar;
    use crate::ports::data_port::DataPort;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    struct Wave;

    impl DataPort for Wave {
        fn fetch_ohlcv(
            &self,
            ticker: &str,
            _interval: Interval,
            _period: Period,
        ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
            let start = NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            Ok((0..60)
                .map(|i| {
                    let close = 150.0 + (i as f64 * 0.3).sin() * 8.0;
                    OhlcvBar {
                        ticker: ticker.to_string(),
                        timestamp: start + chrono::Duration::days(i),
                        open: close,
                        high: close + 2.0,
                        low: close - 2.0,
                        close,
                        volume: 10_000 + i,
                    }
                })
                .collect())
        }
    }

    fn sample_report(set: IndicatorSet, selection: Vec<IndicatorType>) -> AnalysisReport {
        let request = AnalysisRequest::new("MSFT", Interval::OneDay, Period::ThreeMonths)
            .unwrap()
            .with_set(set)
            .with_selection(selection);
        run_analysis(&Wave, &request, &InterpreterConfig::default()).unwrap()
    }

    #[test]
    fn html_report_adapter_write_creates_file() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("report.html");
        let output_str = output_path.to_str().unwrap();

        HtmlReportAdapter::new()
            .write(&sample_report(IndicatorSet::All, Vec::new()), output_str)
            .unwrap();

        assert!(output_path.exists());
        let contents = fs::read_to_string(&output_path).unwrap();
        assert!(contents.contains("Technical Analysis: MSFT"));
        assert!(contents.contains("<svg"));
        assert!(contents.contains("Technical Analysis Insights"));
    }

    #[test]
    fn html_report_includes_insights_and_summary() {
        let report = sample_report(IndicatorSet::Momentum, Vec::new());
        let html = HtmlReportAdapter::new().render(&report).unwrap();

        assert!(html.contains("1d"));
        assert!(html.contains("3mo"));
        assert!(html.contains("Data Fetched: 60 rows."));
        for insight in &report.insights {
            assert!(html.contains(insight.as_str()));
        }
    }

    #[test]
    fn html_report_separates_overlays_and_panels() {
        let report = sample_report(IndicatorSet::All, Vec::new());
        let html = HtmlReportAdapter::new().render(&report).unwrap();

        assert!(html.contains("<h3>RSI(14)</h3>"));
        assert!(html.contains("<h3>MACD(12,26,9)</h3>"));
        assert!(html.contains("<h3>OBV</h3>"));
        assert!(!html.contains("<h3>SMA(20)</h3>"));
        assert!(!html.contains("<h3>BOLLINGER(20,2)</h3>"));
    }

    #[test]
    fn html_report_latest_values_follow_selection() {
        let report = sample_report(
            IndicatorSet::Trend,
            vec![IndicatorType::Sma(20), IndicatorType::Rsi(14)],
        );
        let html = HtmlReportAdapter::new().render(&report).unwrap();

        assert!(html.contains("Latest Values"));
        assert!(html.contains("<td>SMA(20)</td>"));
        assert!(html.contains("<td>RSI(14)</td>"));
        assert!(!html.contains("<td>EMA(20)</td>"));
    }

    #[test]
    fn latest_rows_mark_warming_up_series() {
        let report = sample_report(IndicatorSet::Volume, Vec::new());
        let mut short = report.indicators[&IndicatorType::Rsi(14)].clone();
        for point in &mut short.values {
            point.valid = false;
        }
        let rows = latest_rows(&[&short]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "n/a (warming up)");
    }

    #[test]
    fn html_report_adapter_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("nested/deep/path/report.html");
        let output_str = output_path.to_str().unwrap();

        HtmlReportAdapter::new()
            .write(&sample_report(IndicatorSet::Volume, Vec::new()), output_str)
            .unwrap();

        assert!(output_path.exists());
    }
}
