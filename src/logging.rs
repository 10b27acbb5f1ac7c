use std::fmt;

use chrono::Local;
use serde_json::{json, Map, Value as JsonValue};

/// Environment variable holding a filter spec, e.g. `info,pisscript::interpreter=trace`
pub const LOG_ENV: &str = "PISS_LOG";
/// Fallback environment variable holding a bare level
pub const LOG_LEVEL_ENV: &str = "PISS_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn parse_level(s: &str) -> Option<LogLevel> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Off => "OFF",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
    Compact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogFilter {
    pub default: LogLevel,
    pub rules: Vec<(String, LogLevel)>,
}

impl LogFilter {
    pub fn new(default: LogLevel) -> Self {
        LogFilter {
            default,
            rules: Vec::new(),
        }
    }

    /// Longest matching target prefix wins, otherwise the default
    pub fn level_for_target(&self, target: &str) -> LogLevel {
        let mut best: Option<(usize, LogLevel)> = None;
        for (rule_target, level) in &self.rules {
            if rule_target.is_empty() {
                continue;
            }
            if target.starts_with(rule_target.as_str()) {
                let len = rule_target.len();
                if best.map(|(best_len, _)| len > best_len).unwrap_or(true) {
                    best = Some((len, *level));
                }
            }
        }
        best.map(|(_, level)| level).unwrap_or(self.default)
    }

    pub fn enabled(&self, level: LogLevel, target: &str) -> bool {
        level != LogLevel::Off && level <= self.level_for_target(target)
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        LogFilter::new(LogLevel::Error)
    }
}

pub fn parse_filter(spec: &str) -> Result<LogFilter, String> {
    let mut default = None;
    let mut rules = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some((target, level_str)) = part.split_once('=') {
            let level = LogLevel::parse_level(level_str.trim())
                .ok_or_else(|| format!("Invalid log level '{}'", level_str.trim()))?;
            rules.push((target.trim().to_string(), level));
        } else {
            let level = LogLevel::parse_level(part)
                .ok_or_else(|| format!("Invalid log level '{}'", part))?;
            default = Some(level);
        }
    }

    Ok(LogFilter {
        default: default.unwrap_or(LogLevel::Error),
        rules,
    })
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub target: &'static str,
    /// Source line of the Pisscript program, 0 when there isn't one
    pub line: usize,
    pub fields: Vec<(&'static str, String)>,
}

impl LogRecord {
    pub fn new(level: LogLevel, target: &'static str, message: impl Into<String>) -> Self {
        LogRecord {
            level,
            message: message.into(),
            target,
            line: 0,
            fields: Vec::new(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }
}

#[derive(Debug)]
pub enum LogSink {
    Stderr,
    Memory { entries: Vec<String>, max: usize },
}

impl LogSink {
    pub fn memory(max: usize) -> Self {
        LogSink::Memory {
            entries: Vec::new(),
            max,
        }
    }
}

#[derive(Debug)]
pub struct LoggerCore {
    pub format: LogFormat,
    pub timestamps: bool,
    pub filter: LogFilter,
    pub sinks: Vec<LogSink>,
}

impl LoggerCore {
    pub fn new() -> Self {
        LoggerCore {
            format: LogFormat::Text,
            timestamps: true,
            filter: LogFilter::default(),
            sinks: vec![LogSink::Stderr],
        }
    }

    /// A logger configured from `PISS_LOG`, or `PISS_LOG_LEVEL` when that's unset
    pub fn from_env() -> Self {
        let mut logger = LoggerCore::new();
        if let Ok(spec) = std::env::var(LOG_ENV) {
            match parse_filter(&spec) {
                Ok(filter) => logger.filter = filter,
                Err(err) => eprintln!("Warning: Invalid {} filter '{}': {}", LOG_ENV, spec, err),
            }
        } else if let Ok(level_str) = std::env::var(LOG_LEVEL_ENV) {
            if let Some(level) = LogLevel::parse_level(&level_str) {
                logger.filter = LogFilter::new(level);
            }
        }
        logger
    }

    /// A quiet logger that only keeps records in memory
    pub fn in_memory(filter: LogFilter) -> Self {
        LoggerCore {
            format: LogFormat::Compact,
            timestamps: false,
            filter,
            sinks: vec![LogSink::memory(1024)],
        }
    }

    pub fn enabled(&self, level: LogLevel, target: &str) -> bool {
        self.filter.enabled(level, target)
    }

    pub fn log(&mut self, record: &LogRecord) {
        if !self.enabled(record.level, record.target) {
            return;
        }
        let formatted = self.format_record(record);
        for sink in &mut self.sinks {
            match sink {
                LogSink::Stderr => {
                    eprintln!("{}", formatted);
                }
                LogSink::Memory { entries, max } => {
                    entries.push(formatted.clone());
                    if entries.len() > *max {
                        let drain = entries.len() - *max;
                        entries.drain(0..drain);
                    }
                }
            }
        }
    }

    /// Everything held by memory sinks, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.sinks
            .iter()
            .filter_map(|sink| match sink {
                LogSink::Memory { entries, .. } => Some(entries.iter().cloned()),
                LogSink::Stderr => None,
            })
            .flatten()
            .collect()
    }

    fn format_record(&self, record: &LogRecord) -> String {
        match self.format {
            LogFormat::Json => self.format_json(record),
            LogFormat::Compact => self.format_compact(record),
            LogFormat::Text => self.format_text(record),
        }
    }

    fn format_text(&self, record: &LogRecord) -> String {
        let mut parts = Vec::new();
        parts.push(format!("[{:5}]", record.level.name()));
        if self.timestamps {
            parts.push(timestamp_string());
        }
        parts.push(record.target.to_string());
        if record.line > 0 {
            parts.push(format!("line:{}", record.line));
        }

        let mut msg = record.message.clone();
        if !record.fields.is_empty() {
            msg = format!("{} {}", msg, format_fields(&record.fields));
        }

        format!("{} | {}", parts.join(" "), msg)
    }

    fn format_compact(&self, record: &LogRecord) -> String {
        let mut msg = record.message.clone();
        if !record.fields.is_empty() {
            msg = format!("{} {}", msg, format_fields(&record.fields));
        }
        format!("[{}] {}", record.level.name(), msg)
    }

    fn format_json(&self, record: &LogRecord) -> String {
        let mut obj = Map::new();
        if self.timestamps {
            obj.insert("ts".to_string(), JsonValue::String(timestamp_string()));
        }
        obj.insert(
            "level".to_string(),
            JsonValue::String(record.level.name().to_string()),
        );
        obj.insert(
            "target".to_string(),
            JsonValue::String(record.target.to_string()),
        );
        obj.insert("line".to_string(), json!(record.line));
        obj.insert("msg".to_string(), JsonValue::String(record.message.clone()));

        let mut fields = Map::new();
        for (k, v) in &record.fields {
            fields.insert(k.to_string(), JsonValue::String(v.clone()));
        }
        obj.insert("fields".to_string(), JsonValue::Object(fields));

        JsonValue::Object(obj).to_string()
    }
}

impl Default for LoggerCore {
    fn default() -> Self {
        Self::new()
    }
}

fn format_fields(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn timestamp_string() -> String {
    format!("{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
}
