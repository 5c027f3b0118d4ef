//! Indicator name parser.
//!
//! Recursive descent over `NAME[(args)]` terms separated by commas, for example
//! `RSI, SMA(50), BOLLINGER(20,2.5), MACD(12,26,9)`. Names are case-insensitive
//! and bare names take the conventional default parameters.

use crate::domain::error::ParseError;
use crate::domain::indicator::bollinger::{mult_to_x100, DEFAULT_STDDEV_MULT_X100};
use crate::domain::indicator::{bollinger, macd, roc, rsi, IndicatorType};
use std::str::FromStr;

pub const DEFAULT_MA_PERIOD: usize = 20;
pub const DEFAULT_ATR_PERIOD: usize = 14;

struct Parser {
    input: String,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_ascii_uppercase(),
            pos: 0,
        }
    }

    fn remaining(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn consume_char(&mut self, ch: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_word(&mut self) -> String {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_integer(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if start == self.pos {
            return Err(self.error("expected integer".to_string()));
        }
        let value: usize = self.input[start..self.pos]
            .parse()
            .map_err(|_| ParseError {
                message: "integer out of range".to_string(),
                position: start,
            })?;
        if value == 0 {
            return Err(ParseError {
                message: "period must be positive".to_string(),
                position: start,
            });
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        match text.parse::<f64>() {
            Ok(v) if v > 0.0 => Ok(v),
            Ok(_) => Err(ParseError {
                message: "multiplier must be positive".to_string(),
                position: start,
            }),
            Err(_) => Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            }),
        }
    }

    /// `(n)` if present, otherwise the default.
    fn optional_period(&mut self, default: usize) -> Result<usize, ParseError> {
        if !self.consume_char('(') {
            return Ok(default);
        }
        let period = self.parse_integer()?;
        self.expect_char(')')?;
        Ok(period)
    }

    fn parse_indicator(&mut self) -> Result<IndicatorType, ParseError> {
        let start = self.pos;
        let name = self.parse_word();
        let indicator = match name.as_str() {
            "SMA" => IndicatorType::Sma(self.optional_period(DEFAULT_MA_PERIOD)?),
            "EMA" => IndicatorType::Ema(self.optional_period(DEFAULT_MA_PERIOD)?),
            "RSI" => IndicatorType::Rsi(self.optional_period(rsi::DEFAULT_PERIOD)?),
            "ROC" => IndicatorType::Roc(self.optional_period(roc::DEFAULT_PERIOD)?),
            "ATR" => IndicatorType::Atr(self.optional_period(DEFAULT_ATR_PERIOD)?),
            "STDDEV" => IndicatorType::Stddev(self.optional_period(DEFAULT_MA_PERIOD)?),
            "OBV" => IndicatorType::Obv,
            "MACD" => {
                if self.consume_char('(') {
                    let fast = self.parse_integer()?;
                    self.expect_char(',')?;
                    let slow = self.parse_integer()?;
                    self.expect_char(',')?;
                    let signal = self.parse_integer()?;
                    self.expect_char(')')?;
                    IndicatorType::Macd { fast, slow, signal }
                } else {
                    IndicatorType::Macd {
                        fast: macd::DEFAULT_FAST,
                        slow: macd::DEFAULT_SLOW,
                        signal: macd::DEFAULT_SIGNAL,
                    }
                }
            }
            "BOLLINGER" => {
                if self.consume_char('(') {
                    let period = self.parse_integer()?;
                    let stddev_mult_x100 = if self.consume_char(',') {
                        mult_to_x100(self.parse_number()?)
                    } else {
                        DEFAULT_STDDEV_MULT_X100
                    };
                    self.expect_char(')')?;
                    IndicatorType::Bollinger {
                        period,
                        stddev_mult_x100,
                    }
                } else {
                    IndicatorType::Bollinger {
                        period: bollinger::DEFAULT_PERIOD,
                        stddev_mult_x100: DEFAULT_STDDEV_MULT_X100,
                    }
                }
            }
            "" => {
                return Err(ParseError {
                    message: "expected indicator name".to_string(),
                    position: start,
                })
            }
            other => {
                return Err(ParseError {
                    message: format!("unknown indicator '{}'", other),
                    position: start,
                })
            }
        };
        Ok(indicator)
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(ch) => Err(self.error(format!("unexpected '{}' after indicator", ch))),
        }
    }
}

/// Parse a single indicator name such as `RSI(14)`.
pub fn parse(input: &str) -> Result<IndicatorType, ParseError> {
    let mut parser = Parser::new(input);
    let indicator = parser.parse_indicator()?;
    parser.expect_end()?;
    Ok(indicator)
}

/// Parse a comma-separated list of indicator names. An empty input yields an empty list.
pub fn parse_list(input: &str) -> Result<Vec<IndicatorType>, ParseError> {
    let mut parser = Parser::new(input);
    let mut out = Vec::new();
    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Ok(out);
    }
    loop {
        out.push(parser.parse_indicator()?);
        if !parser.consume_char(',') {
            break;
        }
    }
    parser.expect_end()?;
    Ok(out)
}

impl FromStr for IndicatorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
