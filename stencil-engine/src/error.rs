use miette::Diagnostic;
use thiserror::Error;

/// Result type for derivation assembly and generation (boxed to keep the Ok
/// path small).
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Engine errors. Both kinds propagate verbatim to the invoking tool; the
/// core never retries, recovers, or emits partial output.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A reflection failure. Detected only at the validation boundary, never
    /// during generation proper; always fatal to the whole batch.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Reflect(Box<stencil_reflect::Error>),

    /// A concrete derivation omitted a case-generation callback its batch
    /// needs. An assembly mistake, not a data error.
    #[error("derivation '{derivation}' has no '{hook}' callback")]
    #[diagnostic(
        code(stencil::callback_not_provided),
        help("supply the '{hook}' callback when assembling the derivation")
    )]
    CallbackNotProvided {
        derivation: String,
        hook: &'static str,
    },
}

impl Error {
    pub fn callback(derivation: &str, hook: &'static str) -> Box<Self> {
        Box::new(Error::CallbackNotProvided {
            derivation: derivation.to_string(),
            hook,
        })
    }

    /// Source location, when the failure carries one.
    pub fn location(&self) -> Option<String> {
        match self {
            Error::Reflect(err) => Some(err.loc().to_string()),
            Error::CallbackNotProvided { .. } => None,
        }
    }
}

impl From<Box<stencil_reflect::Error>> for Box<Error> {
    fn from(err: Box<stencil_reflect::Error>) -> Self {
        Box::new(Error::Reflect(err))
    }
}
