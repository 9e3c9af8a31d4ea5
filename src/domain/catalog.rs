//! Built-in example strategies and the phrases the normalizer understands.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleStrategy {
    pub name: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseGroup {
    pub title: &'static str,
    pub phrases: &'static [&'static str],
}

pub const EXAMPLE_STRATEGIES: &[ExampleStrategy] = &[
    ExampleStrategy {
        name: "Moving Average",
        text: "Buy when close is above 20-day moving average and volume is above 1 million. \
               Sell when close drops below 50-day moving average.",
    },
    ExampleStrategy {
        name: "Breakout",
        text: "Enter when close is above 30-day moving average. \
               Exit when close falls below 10-day moving average.",
    },
    ExampleStrategy {
        name: "Volume Breakout",
        text: "Buy when volume is greater than 2 million and close price is above the 20-day moving average. \
               Sell when volume drops below 500000.",
    },
];

pub const SUPPORTED_PHRASES: &[PhraseGroup] = &[
    PhraseGroup {
        title: "Price Fields",
        phrases: &["close price", "volume", "high", "low", "open"],
    },
    PhraseGroup {
        title: "Comparison Operators",
        phrases: &["above", "below", "greater than", "less than", "equal to"],
    },
    PhraseGroup {
        title: "Indicators",
        phrases: &[
            "20-day moving average",
            "50 day moving average",
            "RSI(14), RSI(21) (recognized, not yet computable)",
        ],
    },
    PhraseGroup {
        title: "Logic",
        phrases: &["and", "or (with any amount of parentheses)"],
    },
    PhraseGroup {
        title: "Numbers",
        phrases: &["1 million", "2 million", "500000", "1,200,000"],
    },
    PhraseGroup {
        title: "Entry/Exit",
        phrases: &["buy when", "enter when", "sell when", "exit when"],
    },
];

pub fn find_example(name: &str) -> Option<&'static ExampleStrategy> {
    EXAMPLE_STRATEGIES
        .iter()
        .find(|example| example.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pipeline::compile_text;

    #[test]
    fn every_example_compiles() {
        for example in EXAMPLE_STRATEGIES {
            let compiled = compile_text(example.text);
            assert!(compiled.is_ok(), "{}: {:?}", example.name, compiled.err());
        }
    }

    #[test]
    fn examples_have_explicit_exits() {
        for example in EXAMPLE_STRATEGIES {
            let compiled = compile_text(example.text).unwrap();
            assert!(!compiled.normalized.exit_synthesized, "{}", example.name);
        }
    }

    #[test]
    fn find_example_ignores_case() {
        assert_eq!(find_example("breakout").unwrap().name, "Breakout");
        assert!(find_example("momentum").is_none());
    }

    #[test]
    fn phrase_groups_are_non_empty() {
        assert!(SUPPORTED_PHRASES.iter().all(|g| !g.phrases.is_empty()));
    }
}
