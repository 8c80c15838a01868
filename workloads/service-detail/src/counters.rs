//! Animated statistic counters.

use std::time::Duration;

use edge_dom::{DomError, InMemoryDocument, NodeId};

use crate::timer::Delay;

/// Selector for the counters animated on a service page.
pub const COUNTER_SELECTOR: &str = ".stat-card h3";

/// Number of animation frames per counter.
pub const FRAME_COUNT: i64 = 60;

/// How a counter is written around its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterSuffix {
    /// `98%`
    Percent,
    /// `500+`
    Plus,
    /// `24/7`
    PerWeek,
    /// `10TB+`
    Terabytes,
    /// `42`
    Plain,
}

/// A counter's target number and display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterFormat {
    pub target: i64,
    pub suffix: CounterSuffix,
}

impl CounterFormat {
    /// Parse counter text. Returns `None` when no number can be read.
    ///
    /// `%` takes precedence over `TB`, which takes precedence over `+`
    /// and `/`.
    pub fn parse(text: &str) -> Option<Self> {
        let (suffix, number) = if text.contains('%') {
            (CounterSuffix::Percent, text.replacen('%', "", 1))
        } else if text.contains("TB") {
            (CounterSuffix::Terabytes, text.replacen("TB+", "", 1))
        } else if text.contains('+') {
            (CounterSuffix::Plus, text.replacen('+', "", 1))
        } else if text.contains('/') {
            let numerator = text.split('/').next().unwrap_or_default();
            (CounterSuffix::PerWeek, numerator.to_string())
        } else {
            (CounterSuffix::Plain, text.to_string())
        };

        Some(Self {
            target: leading_integer(&number)?,
            suffix,
        })
    }

    /// Display text for `value`.
    pub fn render(&self, value: i64) -> String {
        match self.suffix {
            CounterSuffix::Percent => format!("{}%", value),
            CounterSuffix::Plus => format!("{}+", value),
            CounterSuffix::PerWeek => format!("{}/7", value),
            CounterSuffix::Terabytes => format!("{}TB+", value),
            CounterSuffix::Plain => value.to_string(),
        }
    }

    /// Display sequence from just above zero up to the target.
    ///
    /// Positive targets take `FRAME_COUNT` frames; zero and negative targets
    /// jump straight to the final text.
    pub fn frames(&self) -> Vec<String> {
        if self.target <= 0 {
            return vec![self.render(self.target)];
        }
        (1..=FRAME_COUNT)
            .map(|step| self.render(scaled(self.target, step)))
            .collect()
    }
}

/// `target * step / FRAME_COUNT` without overflow. Never exceeds `target`
/// for `step <= FRAME_COUNT`.
fn scaled(target: i64, step: i64) -> i64 {
    let value = i128::from(target) * i128::from(step) / i128::from(FRAME_COUNT);
    i64::try_from(value).unwrap_or(target)
}

/// Integer at the start of `s` after leading whitespace, with optional sign.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Count every `.stat-card h3` up from zero, one frame per `tick`.
///
/// Counters whose text is not numeric are left alone. Returns how many
/// counters were animated.
pub async fn animate_counters(
    dom: &InMemoryDocument,
    delay: &dyn Delay,
    tick: Duration,
) -> Result<usize, DomError> {
    let mut counters: Vec<(NodeId, Vec<String>)> = Vec::new();
    for node in dom.query_selector_all(COUNTER_SELECTOR)? {
        if let Some(format) = CounterFormat::parse(dom.text_content(node)?.trim()) {
            counters.push((node, format.frames()));
        }
    }

    let longest = counters.iter().map(|(_, f)| f.len()).max().unwrap_or(0);
    for frame in 0..longest {
        delay.sleep(tick).await;
        for (node, frames) in &counters {
            if let Some(text) = frames.get(frame) {
                dom.set_text_content(*node, text)?;
            }
        }
    }

    Ok(counters.len())
}
