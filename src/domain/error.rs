//! Domain error types.

/// A DSL syntax error with the offending token and its byte offset.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("syntax error at position {position} near '{token}': {message}")]
pub struct ParseError {
    pub message: String,
    pub token: String,
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

/// Top-level error type for phrasetrader.
#[derive(Debug, thiserror::Error)]
pub enum PhraseTraderError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("unknown indicator '{name}'")]
    UnknownIndicator { name: String },

    #[error("malformed rule tree: {reason}")]
    MalformedAst { reason: String },

    #[error("invalid price data: {reason}")]
    Data { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PhraseTraderError> for std::process::ExitCode {
    fn from(err: &PhraseTraderError) -> Self {
        let code: u8 = match err {
            PhraseTraderError::Io(_) => 1,
            PhraseTraderError::ConfigParse { .. }
            | PhraseTraderError::ConfigMissing { .. }
            | PhraseTraderError::ConfigInvalid { .. } => 2,
            PhraseTraderError::Data { .. } => 3,
            PhraseTraderError::Syntax(_)
            | PhraseTraderError::UnknownIndicator { .. }
            | PhraseTraderError::MalformedAst { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
