use std::fmt::{Display, Write};
use std::sync::Arc;

use chrono::Month;
use tracing::warn;

use crate::config::{DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT, FilterConfig, is_valid_format};
use crate::localization::{EnglishTranslator, Tag, Translator};
use crate::models::FilterValue;
use crate::models::value::format_duration;

/// Turns raw values into popup labels
#[derive(Clone)]
pub struct ValueLabeler {
    date_format: String,
    time_format: String,
    translator: Arc<dyn Translator>,
}

impl ValueLabeler {
    pub fn new(config: &FilterConfig, translator: Arc<dyn Translator>) -> Self {
        Self {
            date_format: checked_format("date_format", &config.date_format, DEFAULT_DATE_FORMAT),
            time_format: checked_format("time_format", &config.time_format, DEFAULT_TIME_FORMAT),
            translator,
        }
    }

    pub fn translate(&self, tag: Tag) -> String {
        self.translator.translate(tag)
    }

    pub fn label(&self, value: &FilterValue) -> String {
        match value {
            FilterValue::Blank => self.translate(Tag::Empty),
            FilterValue::Bool(true) => self.translate(Tag::True),
            FilterValue::Bool(false) => self.translate(Tag::False),
            FilterValue::DateTime(dt) => {
                render(dt.format(&self.date_format)).unwrap_or_else(|| dt.format(DEFAULT_DATE_FORMAT).to_string())
            }
            FilterValue::Date(d) => {
                render(d.format(&self.date_format)).unwrap_or_else(|| d.format(DEFAULT_DATE_FORMAT).to_string())
            }
            FilterValue::Time(t) => {
                render(t.format(&self.time_format)).unwrap_or_else(|| t.format(DEFAULT_TIME_FORMAT).to_string())
            }
            FilterValue::Duration(d) => format_duration(*d),
            other => other.to_string(),
        }
    }

    pub fn month_name(&self, month: u32) -> String {
        u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| month.to_string())
    }
}

fn checked_format(name: &str, format: &str, default: &str) -> String {
    if is_valid_format(format) {
        return format.to_string();
    }
    warn!(setting = name, format, "invalid label format, using default");
    default.to_string()
}

/// A format can still fail on a value lacking the fields it asks for (`%H` on a date)
fn render(formatted: impl Display) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", formatted).ok()?;
    Some(out)
}

impl Default for ValueLabeler {
    fn default() -> Self {
        Self::new(&FilterConfig::default(), Arc::new(EnglishTranslator))
    }
}
