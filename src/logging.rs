//! Logging vocabulary and structured exception views.
//!
//! This crate does not own a logging sink. It provides:
//!
//! - [`LogLevel`] and [`LogContext`]: the vocabulary an external logger
//!   consumes
//! - [`ExceptionLog`]: a borrowed, field-by-field view of an exception
//! - [`Exception::emit`]: forwards an exception to `tracing` at a given level
//!
//! `ExceptionLog` borrows from the exception and cannot outlive it. Fields
//! are truncated when written so a single oversized message cannot flood a
//! log line.

use crate::{Category, Exception};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::Level;
use tracing::level_filters::LevelFilter;

/// Maximum length for any individual field in formatted output.
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

// ============================================================================
// Log Level
// ============================================================================

/// Log verbosity, totally ordered from `None` to `FunctionDebug`.
///
/// A logger configured at level `L` shows every line whose level is `<= L`
/// (excluding `None`, which silences everything).
///
/// ```rust
/// use module_exceptions::LogLevel;
///
/// assert!(LogLevel::Error < LogLevel::Warning);
/// assert_eq!(LogLevel::Debug.as_u8(), 3);
/// assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum LogLevel {
    /// Nothing is logged.
    None = 0,
    /// Failures only.
    Error = 1,
    /// Failures and warnings.
    Warning = 2,
    /// Debug output.
    Debug = 3,
    /// Debug output including per-function tracing.
    FunctionDebug = 4,
}

impl LogLevel {
    /// Every level, least verbose first.
    pub const ALL: [LogLevel; 5] = [
        Self::None,
        Self::Error,
        Self::Warning,
        Self::Debug,
        Self::FunctionDebug,
    ];

    /// Numeric form.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the numeric form.
    ///
    /// # Errors
    ///
    /// Returns `Err` for values above 4.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self, ParseLevelError> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Error),
            2 => Ok(Self::Warning),
            3 => Ok(Self::Debug),
            4 => Ok(Self::FunctionDebug),
            _ => Err(ParseLevelError::OutOfRange { value }),
        }
    }

    /// Upper-case name.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Debug => "DEBUG",
            Self::FunctionDebug => "FUNCTION_DEBUG",
        }
    }

    /// Whether a line at `line_level` passes a logger set to `self`.
    #[inline]
    pub const fn permits(self, line_level: LogLevel) -> bool {
        !matches!(line_level, Self::None) && line_level.as_u8() <= self.as_u8()
    }

    /// Matching `tracing` level. `None` has no counterpart.
    #[inline]
    pub const fn as_tracing_level(self) -> Option<Level> {
        match self {
            Self::None => None,
            Self::Error => Some(Level::ERROR),
            Self::Warning => Some(Level::WARN),
            Self::Debug => Some(Level::DEBUG),
            Self::FunctionDebug => Some(Level::TRACE),
        }
    }

    /// Matching `tracing` filter, for subscribers configured from a
    /// `LogLevel`.
    #[inline]
    pub const fn level_filter(self) -> LevelFilter {
        match self {
            Self::None => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warning => LevelFilter::WARN,
            Self::Debug => LevelFilter::DEBUG,
            Self::FunctionDebug => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    /// Case-insensitive; accepts the upper-case names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLevelError::UnknownLevel {
                value: wanted.to_owned(),
            })
    }
}

// ============================================================================
// Log Context
// ============================================================================

/// Execution environment a log line originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogContext {
    /// A terminal / server process.
    Terminal,
    /// A web browser.
    Browser,
}

impl LogContext {
    /// Upper-case name.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "TERMINAL",
            Self::Browser => "BROWSER",
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogContext {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        [Self::Terminal, Self::Browser]
            .into_iter()
            .find(|ctx| ctx.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLevelError::UnknownContext {
                value: wanted.to_owned(),
            })
    }
}

/// Parse failure for [`LogLevel`] and [`LogContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseLevelError {
    /// Name is not a known log level.
    UnknownLevel {
        /// Rejected input.
        value: String,
    },
    /// Name is not a known log context.
    UnknownContext {
        /// Rejected input.
        value: String,
    },
    /// Numeric level above 4.
    OutOfRange {
        /// Rejected input.
        value: u8,
    },
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { value } => write!(f, "Unknown log level '{}'", value),
            Self::UnknownContext { value } => write!(f, "Unknown log context '{}'", value),
            Self::OutOfRange { value } => {
                write!(f, "Log level {} is out of range (must be 0-4)", value)
            }
        }
    }
}

impl std::error::Error for ParseLevelError {}

// ============================================================================
// Exception Log View
// ============================================================================

/// Structured log entry borrowing from an [`Exception`].
///
/// ```rust
/// use module_exceptions::init;
///
/// let err = init("LOG", "Logger").create_not_found("E1", "missing", None);
/// let mut line = String::new();
/// err.log_view().write_to(&mut line).unwrap();
/// assert!(line.starts_with("[LOG_E1] NOT_FOUND"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExceptionLog<'a> {
    /// Short module identifier.
    pub module_code: &'a str,
    /// Human-readable module name.
    pub module_name: &'a str,
    /// Error code within the module.
    pub error_code: &'a str,
    /// Category tag.
    pub category: Category,
    /// Composed message.
    pub message: &'a str,
    /// Construction time.
    pub timestamp: DateTime<Utc>,
    /// Whether a cause is attached.
    pub cause_present: bool,
}

impl<'a> ExceptionLog<'a> {
    /// Write a single `key='value'` line without intermediate allocation
    /// for untruncated fields.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}_{}] {} module='{}' message='{}' at={}",
            self.module_code,
            self.error_code,
            self.category,
            truncate_with_indicator(self.module_name),
            truncate_with_indicator(self.message),
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;

        if self.cause_present {
            f.write_str(" [CAUSED]")?;
        }

        Ok(())
    }

    /// Category tag.
    #[inline]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Composed message, untruncated.
    #[inline]
    pub const fn message(&self) -> &str {
        self.message
    }

    /// Whether a cause is attached.
    #[inline]
    pub const fn has_cause(&self) -> bool {
        self.cause_present
    }
}

impl fmt::Display for ExceptionLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl Exception {
    /// Borrowed structured view for logging.
    #[inline]
    pub fn log_view(&self) -> ExceptionLog<'_> {
        ExceptionLog {
            module_code: self.module_code(),
            module_name: self.module_name(),
            error_code: self.error_code(),
            category: self.category(),
            message: self.message(),
            timestamp: self.timestamp(),
            cause_present: self.cause().is_some(),
        }
    }

    /// Emit this exception as a `tracing` event at `level`.
    ///
    /// `LogLevel::None` emits nothing. Construction never logs; this is the
    /// only place the crate produces log output, and only when called.
    pub fn emit(&self, level: LogLevel) {
        let view = self.log_view();
        let message = truncate_with_indicator(view.message);
        let timestamp = view.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

        match level {
            LogLevel::None => {}
            LogLevel::Error => tracing::error!(
                module = view.module_code,
                error_code = view.error_code,
                category = %view.category,
                timestamp = %timestamp,
                caused = view.cause_present,
                "{}", message
            ),
            LogLevel::Warning => tracing::warn!(
                module = view.module_code,
                error_code = view.error_code,
                category = %view.category,
                timestamp = %timestamp,
                caused = view.cause_present,
                "{}", message
            ),
            LogLevel::Debug => tracing::debug!(
                module = view.module_code,
                error_code = view.error_code,
                category = %view.category,
                timestamp = %timestamp,
                caused = view.cause_present,
                "{}", message
            ),
            LogLevel::FunctionDebug => tracing::trace!(
                module = view.module_code,
                error_code = view.error_code,
                category = %view.category,
                timestamp = %timestamp,
                caused = view.cause_present,
                "{}", message
            ),
        }
    }
}

/// Truncate a string for display.
///
/// If the string exceeds MAX_FIELD_OUTPUT_LEN, it's truncated with an indicator
/// to make the truncation visible to operators.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    // Last char boundary at or before the limit
    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
