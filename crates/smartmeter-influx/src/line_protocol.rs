//! Minimal InfluxDB line protocol writer: one float field, nanosecond
//! timestamps.
//!
//! `measurement[,tag=value...] field=value timestamp`

use std::collections::BTreeMap;
use std::io::{self, Write};

use chrono::{DateTime, Utc};

/// One metric with a single float field.
#[derive(Debug, Clone)]
pub struct Point<'a> {
    pub measurement: &'a str,
    /// Sorted by key on output; empty values are left out.
    pub tags: BTreeMap<&'a str, &'a str>,
    pub field: &'a str,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Point<'_> {
    /// Write the point as one line. Returns `false` (and writes nothing) if
    /// the value cannot be represented in line protocol.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<bool> {
        if !self.value.is_finite() {
            return Ok(false);
        }
        let nanos = self.timestamp.timestamp_nanos_opt().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("timestamp {} out of range", self.timestamp),
            )
        })?;

        let mut line = escape(self.measurement, &[',', ' ']);
        for (key, value) in self.tags.iter().filter(|(_, v)| !v.is_empty()) {
            line.push(',');
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(value, &[',', '=', ' ']));
        }
        line.push(' ');
        line.push_str(&escape(self.field, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&self.value.to_string());
        line.push(' ');
        line.push_str(&nanos.to_string());
        line.push('\n');

        out.write_all(line.as_bytes())?;
        Ok(true)
    }
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\\' => escaped.push_str("\\\\"),
            c if special.contains(&c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}
