//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::adapters::text_report::{self, TextReportAdapter};
use crate::domain::analysis::{run_analysis, AnalysisReport, AnalysisRequest, DEFAULT_TICKER};
use crate::domain::config_validation::{
    build_interpreter_config, data_source, validate_analysis_config, DataSource,
};
use crate::domain::error::TickerscopeError;
use crate::domain::indicator_parser;
use crate::domain::indicator_set::IndicatorSet;
use crate::domain::interpreter::InterpreterConfig;
use crate::domain::market::{Interval, Period};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CSV_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(
    name = "tickerscope",
    version,
    about = "Technical analysis insights for a ticker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch price history and interpret RSI and Bollinger Bands
    Analyze {
        #[arg(short, long, default_value = DEFAULT_TICKER)]
        ticker: String,
        /// 1m, 5m, 15m, 1h, 1d, 1wk or 1mo
        #[arg(short, long, default_value = "1d")]
        interval: String,
        /// 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y or 10y
        #[arg(short, long, default_value = "1mo")]
        period: String,
        /// Extra indicators to compute: momentum, volatility, trend, volume or all
        #[arg(long)]
        set: Option<String>,
        /// Comma-separated indicators to display, e.g. "RSI,SMA(20)"
        #[arg(long)]
        indicators: Option<String>,
        /// yahoo or csv (overrides [data] source)
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Report file; .html renders charts, anything else plain text
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the indicators in each bundled set
    Indicators {
        #[arg(long)]
        set: Option<String>,
    },
    /// List tickers stored in a CSV directory
    ListSymbols {
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        #[arg(short, long, default_value = "1d")]
        interval: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Arguments of the `analyze` command, before validation.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub ticker: String,
    pub interval: String,
    pub period: String,
    pub set: Option<String>,
    pub indicators: Option<String>,
    pub source: Option<String>,
    pub csv_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            ticker,
            interval,
            period,
            set,
            indicators,
            source,
            csv_dir,
            config,
            output,
        } => {
            let config = match load_optional_config(config.as_ref()) {
                Ok(c) => c,
                Err(code) => return code,
            };
            let args = AnalyzeArgs {
                ticker,
                interval,
                period,
                set,
                indicators,
                source,
                csv_dir,
                output,
            };
            run_analyze(&args, &config)
        }
        Command::Indicators { set } => run_indicators(set.as_deref()),
        Command::ListSymbols {
            csv_dir,
            interval,
            config,
        } => run_list_symbols(csv_dir.as_ref(), &interval, config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &TickerscopeError) -> ExitCode {
    eprintln!("Error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => load_config(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Builds a validated request from raw arguments.
pub fn build_request(args: &AnalyzeArgs) -> Result<AnalysisRequest, TickerscopeError> {
    let interval: Interval = args.interval.parse()?;
    let period: Period = args.period.parse()?;
    let mut request = AnalysisRequest::new(&args.ticker, interval, period)?;

    if let Some(set) = &args.set {
        request = request.with_set(set.parse::<IndicatorSet>()?);
    }
    if let Some(list) = &args.indicators {
        request = request.with_selection(indicator_parser::parse_list(list)?);
    }
    Ok(request)
}

/// CLI flag first, then `[data] source`, then Yahoo.
pub fn resolve_source(
    flag: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<DataSource, TickerscopeError> {
    match flag {
        Some(s) => DataSource::parse(s).ok_or_else(|| TickerscopeError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}', expected yahoo or csv", s),
        }),
        None => data_source(config),
    }
}

pub fn resolve_csv_dir(flag: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    flag.cloned()
        .or_else(|| config.get_string("data", "csv_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR))
}

fn build_data_port(
    source: DataSource,
    args: &AnalyzeArgs,
    config: &dyn ConfigPort,
) -> Result<Box<dyn DataPort>, TickerscopeError> {
    match source {
        DataSource::Csv => Ok(Box::new(CsvAdapter::new(resolve_csv_dir(
            args.csv_dir.as_ref(),
            config,
        )))),
        #[cfg(feature = "yahoo")]
        DataSource::Yahoo => {
            use crate::adapters::yahoo_adapter::{YahooAdapter, YahooSettings};
            Ok(Box::new(YahooAdapter::new(YahooSettings::from_config(config))?))
        }
        #[cfg(not(feature = "yahoo"))]
        DataSource::Yahoo => Err(TickerscopeError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: "built without the yahoo feature; use source = csv".to_string(),
        }),
    }
}

/// HTML for `.html`/`.htm` paths, plain text otherwise.
pub fn reporter_for(path: &Path, config: &InterpreterConfig) -> Box<dyn ReportPort> {
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    if is_html {
        Box::new(HtmlReportAdapter::with_rsi_levels(
            config.rsi_overbought,
            config.rsi_oversold,
        ))
    } else {
        Box::new(TextReportAdapter)
    }
}

/// Fetch, compute, interpret, print the insights and optionally write a report.
pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    config: &InterpreterConfig,
    output_path: Option<&Path>,
) -> Result<AnalysisReport, TickerscopeError> {
    println!(
        "{}",
        text_report::fetching_line(
            &request.ticker,
            request.interval.as_str(),
            request.period.as_str()
        )
    );

    let report = run_analysis(data_port, request, config)?;
    print!("{}", text_report::render(&report));

    if let Some(path) = output_path {
        let path_str = path.to_str().ok_or_else(|| TickerscopeError::Report {
            reason: format!("output path is not valid UTF-8: {}", path.display()),
        })?;
        reporter_for(path, config).write(&report, path_str)?;
        eprintln!("Report written to {}", path.display());
    }

    Ok(report)
}

pub fn run_analyze(args: &AnalyzeArgs, config: &dyn ConfigPort) -> ExitCode {
    let interp = match build_interpreter_config(config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let request = match build_request(args) {
        Ok(r) => r,
        Err(TickerscopeError::IndicatorParse(e)) => {
            let input = args.indicators.as_deref().unwrap_or_default();
            eprintln!("Error: invalid indicator list:\n{}", e.display_with_context(input));
            return (&TickerscopeError::IndicatorParse(e)).into();
        }
        Err(e) => return fail(&e),
    };

    let source = match resolve_source(args.source.as_deref(), config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(source, args, config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let output = args
        .output
        .clone()
        .or_else(|| config.get_string("report", "output").map(PathBuf::from));

    match run_analysis_pipeline(data_port.as_ref(), &request, &interp, output.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_indicators(set: Option<&str>) -> ExitCode {
    let sets: Vec<IndicatorSet> = match set {
        Some(s) => match s.parse() {
            Ok(set) => vec![set],
            Err(e) => return fail(&e),
        },
        None => IndicatorSet::ALL.to_vec(),
    };

    for set in sets {
        let names: Vec<String> = set.indicators().iter().map(|i| i.to_string()).collect();
        println!("{:<10} {}", set.as_str(), names.join(", "));
    }
    let interp = InterpreterConfig::default();
    eprintln!(
        "Always computed: {}, {}",
        interp.rsi_indicator(),
        interp.bollinger_indicator()
    );
    ExitCode::SUCCESS
}

fn run_list_symbols(
    csv_dir: Option<&PathBuf>,
    interval: &str,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let interval: Interval = match interval.parse() {
        Ok(i) => i,
        Err(e) => return fail(&e),
    };

    let dir = resolve_csv_dir(csv_dir, &config);
    let adapter = CsvAdapter::new(dir.clone());
    let symbols = match adapter.list_symbols(interval) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found for interval {} in {}", interval, dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_analysis_config(&config) {
        return fail(&e);
    }
    let interp = match build_interpreter_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let source = match data_source(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("\nInterpreter:");
    eprintln!("  {}", interp.rsi_indicator());
    eprintln!(
        "  overbought > {}, oversold < {}",
        interp.rsi_overbought, interp.rsi_oversold
    );
    eprintln!("  {}", interp.bollinger_indicator());
    eprintln!("Data source: {:?}", source);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
