//! Plain-English to DSL normalizer.
//!
//! Best-effort rewrite of an informal rule such as
//! `"Buy when close is above the 20-day moving average. Sell when close drops below 10."`
//! into DSL clauses (`CLOSE GT SMA(CLOSE, 20)` / `CLOSE LT 10`). It never fails:
//! text it does not understand is passed through and left for the parser to
//! reject.
//!
//! Each clause goes through a fixed sequence of passes. The order is part of
//! the contract; later passes must not see text earlier passes still need:
//!
//! 1. lowercase
//! 2. indicator phrases (`20-day moving average`, `rsi(14)`) → `SMA(CLOSE, 20)`
//! 3. field phrases, most specific first (`close price` before `close`)
//! 4. comparison phrases → padded word operators (` GT `, ` LTE `, ...)
//! 5. logic connectors → ` AND ` / ` OR `
//! 6. magnitudes (`1 million` → `1000000`, `1,000` → `1000`)
//! 7. filler words (`the`, `when`, `drops`, `day`, `average`, ...)
//! 8. uppercase, strip periods, collapse whitespace, tighten parentheses
//!
//! Passes 2-5 emit uppercase text and every pattern is lowercase, so a
//! rewritten token is never matched again by a later pass.

use regex::{Captures, Regex};

/// Exit clause used when the input names no exit condition.
pub const NEVER_EXIT: &str = "0 > 1";

/// The two DSL clauses extracted from a natural-language rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRules {
    pub entry: String,
    pub exit: String,
    /// True when no exit clause was found and `NEVER_EXIT` was substituted.
    pub exit_synthesized: bool,
}

impl NormalizedRules {
    pub fn entry_dsl(&self) -> String {
        format!("ENTRY: {}", self.entry)
    }

    pub fn exit_dsl(&self) -> String {
        format!("EXIT: {}", self.exit)
    }

    /// The full `ENTRY: ... EXIT: ...` text accepted by the DSL parser.
    pub fn to_dsl(&self) -> String {
        format!("{} {}", self.entry_dsl(), self.exit_dsl())
    }
}

/// Compiled rewrite passes. Construct once and reuse, or call [`normalize`]
/// which builds a fresh instance per call.
pub struct Normalizer {
    entry_and_exit: Regex,
    entry_only: Regex,
    indicators: Vec<(Regex, &'static str)>,
    fields: Vec<(Regex, &'static str)>,
    comparisons: Vec<(Regex, &'static str)>,
    logic: Vec<(Regex, &'static str)>,
    magnitude: Regex,
    digit_groups: Regex,
    filler: Regex,
    whitespace: Regex,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalizer patterns are static and valid")
}

fn rules(pairs: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    pairs.iter().map(|(p, r)| (re(p), *r)).collect()
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            entry_and_exit: re(r"(?s)\b(?:buy|enter)\s+when\s+(.*?)\s+(?:exit|sell)\s+when\s+(.*)"),
            entry_only: re(r"(?s)\b(?:buy|enter)\s+when\s+(.*)"),
            indicators: rules(&[
                (
                    r"(\d+)\s*(?:-\s*)?(?:days?\s*)?(?:simple\s+)?moving\s*average",
                    "SMA(CLOSE, $1)",
                ),
                (r"\bsma\s*\(\s*(\d+)\s*\)", "SMA(CLOSE, $1)"),
                (r"\brsi\s*\(\s*(\d+)\s*\)", "RSI(CLOSE, $1)"),
            ]),
            fields: rules(&[
                (r"\bclos(?:e|ing)\s+price\b", "CLOSE"),
                (r"\bopen(?:ing)?\s+price\b", "OPEN"),
                (r"\bhigh\s+price\b", "HIGH"),
                (r"\blow\s+price\b", "LOW"),
                (r"\btrading\s+volume\b", "VOLUME"),
                (r"\bclose\b", "CLOSE"),
                (r"\bvolume\b", "VOLUME"),
                (r"\bhigh\b", "HIGH"),
                (r"\blow\b", "LOW"),
                (r"\bopen\b", "OPEN"),
                (r"\bprice\b", "CLOSE"),
            ]),
            comparisons: rules(&[
                (r"\b(?:is\s+)?greater\s+than\s+or\s+equal\s+to\b", " GTE "),
                (r"\b(?:is\s+)?less\s+than\s+or\s+equal\s+to\b", " LTE "),
                (r"\b(?:is\s+)?at\s+least\b", " GTE "),
                (r"\b(?:is\s+)?at\s+most\b", " LTE "),
                (r"\b(?:is\s+)?not\s+equal\s+to\b", " NEQ "),
                (r"\b(?:is\s+)?above\b", " GT "),
                (r"\b(?:is\s+)?(?:greater|higher|more)\s+than\b", " GT "),
                (r"\b(?:is\s+)?below\b", " LT "),
                (r"\b(?:is\s+)?(?:less|lower)\s+than\b", " LT "),
                (r"\b(?:is\s+)?equal\s+to\b", " EQ "),
                (r"\bequals\b", " EQ "),
            ]),
            logic: rules(&[(r"\band\b", " AND "), (r"\bor\b", " OR ")]),
            magnitude: re(r"(\d+(?:\.\d+)?)\s*(thousand|million|billion)\b"),
            digit_groups: re(r"\b\d{1,3}(?:,\d{3})+\b"),
            filler: re(
                r"\b(?:the|a|an|is|are|it|its|when|if|than|of|by|drops|drop|falls|fall|goes|go|moves|move|gets|get|rises|rise|day|days|average)\b",
            ),
            whitespace: re(r"\s+"),
        }
    }

    /// Split `text` into entry/exit segments and rewrite each into DSL.
    pub fn normalize(&self, text: &str) -> NormalizedRules {
        let lowered = text.to_lowercase();

        let (entry_text, exit_text) = if let Some(caps) = self.entry_and_exit.captures(&lowered) {
            (capture(&caps, 1), capture(&caps, 2))
        } else if let Some(caps) = self.entry_only.captures(&lowered) {
            (capture(&caps, 1), String::new())
        } else {
            (lowered.trim().to_string(), String::new())
        };

        let entry = self.rewrite_clause(&entry_text);
        let exit = self.rewrite_clause(&exit_text);
        let exit_synthesized = exit.is_empty();

        NormalizedRules {
            entry,
            exit: if exit_synthesized {
                NEVER_EXIT.to_string()
            } else {
                exit
            },
            exit_synthesized,
        }
    }

    /// Apply passes 1-8 to a single clause.
    pub fn rewrite_clause(&self, clause: &str) -> String {
        let mut text = clause.to_lowercase();

        for (pattern, replacement) in &self.indicators {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
        for (pattern, replacement) in &self.fields {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
        for (pattern, replacement) in &self.comparisons {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
        for (pattern, replacement) in &self.logic {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }

        text = self
            .digit_groups
            .replace_all(&text, |caps: &Captures| caps[0].replace(',', ""))
            .into_owned();
        text = self
            .magnitude
            .replace_all(&text, |caps: &Captures| expand_magnitude(&caps[1], &caps[2]))
            .into_owned();

        text = self.filler.replace_all(&text, " ").into_owned();

        let text = strip_periods(&text.to_uppercase());
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().replace("( ", "(").replace(" )", ")")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with a freshly compiled [`Normalizer`].
pub fn normalize(text: &str) -> NormalizedRules {
    Normalizer::new().normalize(text)
}

fn capture(caps: &Captures, group: usize) -> String {
    caps.get(group)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn expand_magnitude(number: &str, unit: &str) -> String {
    let multiplier = match unit {
        "thousand" => 1e3,
        "million" => 1e6,
        _ => 1e9,
    };
    match number.parse::<f64>() {
        Ok(n) => format!("{}", n * multiplier),
        Err(_) => format!("{} {}", number, unit),
    }
}

/// Drop periods except a decimal point between two digits.
fn strip_periods(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|(i, ch)| {
            **ch != '.'
                || (*i > 0
                    && chars[i - 1].is_ascii_digit()
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()))
        })
        .map(|(_, ch)| *ch)
        .collect()
}
