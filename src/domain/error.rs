//! Domain error types.

/// A parse error with position information for indicator names.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for tickerscope.
#[derive(Debug, thiserror::Error)]
pub enum TickerscopeError {
    #[error("failed to fetch data for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("invalid ticker symbol '{ticker}': {reason}")]
    InvalidTicker { ticker: String, reason: String },

    #[error("invalid interval '{0}' (expected one of 1m, 5m, 15m, 1h, 1d, 1wk, 1mo)")]
    InvalidInterval(String),

    #[error("invalid period '{0}' (expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y)")]
    InvalidPeriod(String),

    #[error(transparent)]
    IndicatorParse(#[from] ParseError),

    #[error("unknown indicator set '{0}' (expected momentum, volatility, trend, volume or all)")]
    UnknownIndicatorSet(String),

    #[error("indicator {indicator} was not computed for this analysis")]
    UnknownIndicator { indicator: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no price data to analyse")]
    EmptySeries,

    #[error("price series is not in time order at row {index}")]
    UnorderedSeries { index: usize },

    #[error("non-finite {field} price at row {index}")]
    NonFinitePrice { index: usize, field: String },

    #[error("insufficient data for {indicator}: have {bars} bars, need {minimum}")]
    InsufficientData {
        indicator: String,
        bars: usize,
        minimum: usize,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TickerscopeError {
    /// True for the failures caused by too little (or malformed) price history.
    pub fn is_data_insufficiency(&self) -> bool {
        matches!(
            self,
            TickerscopeError::EmptySeries
                | TickerscopeError::UnorderedSeries { .. }
                | TickerscopeError::NonFinitePrice { .. }
                | TickerscopeError::InsufficientData { .. }
        )
    }
}

impl From<&TickerscopeError> for std::process::ExitCode {
    fn from(err: &TickerscopeError) -> Self {
        let code: u8 = match err {
            TickerscopeError::Io(_) | TickerscopeError::Report { .. } => 1,
            TickerscopeError::ConfigParse { .. }
            | TickerscopeError::ConfigMissing { .. }
            | TickerscopeError::ConfigInvalid { .. } => 2,
            TickerscopeError::Fetch { .. } => 3,
            TickerscopeError::InvalidTicker { .. }
            | TickerscopeError::InvalidInterval(_)
            | TickerscopeError::InvalidPeriod(_)
            | TickerscopeError::IndicatorParse(_)
            | TickerscopeError::UnknownIndicatorSet(_)
            | TickerscopeError::UnknownIndicator { .. } => 4,
            TickerscopeError::EmptySeries
            | TickerscopeError::UnorderedSeries { .. }
            | TickerscopeError::NonFinitePrice { .. }
            | TickerscopeError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
