use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ParamValue {
    Count(u32),
    Ratio(f32),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Count(n) => write!(f, "{n}"),
            ParamValue::Ratio(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum ParamKind {
    Count,
    ScaledCount,
    Ratio,
}

// The engine's AI parameter table: qthink, cache and max_depth are u32
// counters on the engine side, C is the f32 exploration constant.
// qthink and cache are usually given in binary K/M units.
const PARAM_TABLE: [(&str, ParamKind); 4] = [
    ("qthink", ParamKind::ScaledCount),
    ("cache", ParamKind::ScaledCount),
    ("max_depth", ParamKind::Count),
    ("C", ParamKind::Ratio),
];

lazy_static! {
    static ref SCALED_RE: Regex =
        Regex::new(r"^(?<num>[0-9]+(?:\.[0-9]+)?)(?<suffix>[KkMm])$").unwrap();
}

fn parse_count(value: &str) -> Option<u32> {
    value.parse::<u32>().ok()
}

fn parse_scaled_count(value: &str) -> Option<u32> {
    let Some(captures) = SCALED_RE.captures(value) else {
        return parse_count(value);
    };
    let num = captures["num"].parse::<f64>().ok()?;
    let scale = match &captures["suffix"] {
        "K" | "k" => 1024.0,
        _ => 1024.0 * 1024.0,
    };
    let scaled = num * scale;
    if scaled > u32::MAX as f64 {
        return None;
    }
    Some(scaled.round() as u32)
}

fn parse_ratio(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|x| x.is_finite())
}

/// Ordered engine parameter set. Order is preserved because the handshake
/// replays these as `set ai.<name> <value>` and engines may be
/// order-sensitive.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct AiParams {
    entries: Vec<(String, ParamValue)>,
}

impl AiParams {
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        let Some((_, kind)) = PARAM_TABLE.iter().find(|(n, _)| *n == name) else {
            return Err(format!("unknown ai parameter {name}"));
        };
        let parsed = match kind {
            ParamKind::Count => parse_count(value).map(ParamValue::Count),
            ParamKind::ScaledCount => parse_scaled_count(value).map(ParamValue::Count),
            ParamKind::Ratio => parse_ratio(value).map(ParamValue::Ratio),
        };
        let Some(parsed) = parsed else {
            return Err(format!("invalid value {value} for ai parameter {name}"));
        };
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = parsed,
            None => self.entries.push((name.to_string(), parsed)),
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for AiParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.entries
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .join(" ")
        )
    }
}
