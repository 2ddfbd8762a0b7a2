//! Loading a grammar into a usable [`Language`] handle, and checking that it
//! loads.
//!
//! A grammar artifact reaches Rust as a builder function that returns a raw
//! pointer to the generated language tables. [`load`] turns a
//! [`GrammarSource`] into a [`Language`], rejecting null tables and tables
//! built for an ABI the linked runtime cannot read. [`verify`] folds that
//! outcome into a [`Verdict`] for callers that only want pass or fail.

use thiserror::Error;
use tracing::{debug, debug_span, warn};
use tree_sitter::{
    ffi, Language, LanguageError, Parser, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION,
};
use tree_sitter_language::LanguageFn;

/// Diagnostic reported whenever the ucode grammar fails to load.
pub const LOAD_FAILURE_MESSAGE: &str = "Error loading ucode grammar";

/// Errors that can occur when loading a grammar.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The grammar constructor returned a null language.
    #[error("Error loading ucode grammar")]
    LoadFailure,

    /// The language tables were generated for an ABI outside the range the
    /// linked runtime understands.
    #[error("Error loading ucode grammar: ABI version {version} is outside {min}..={max}")]
    IncompatibleVersion { version: usize, min: usize, max: usize },

    /// The parser refused to install the language.
    #[error("Error loading ucode grammar: {0}")]
    Rejected(#[source] LanguageError),
}

/// A grammar artifact together with the constructor that turns it into a
/// [`Language`].
pub trait GrammarSource {
    /// Name of the grammar, for diagnostics.
    fn name(&self) -> &str;

    /// Invokes the constructor. `None` means the constructor produced no
    /// language tables.
    fn construct(&self) -> Option<Language>;
}

/// A grammar compiled into the binary and exposed through its C builder
/// function.
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    name: &'static str,
    builder: unsafe extern "C" fn() -> *const (),
}

impl Builtin {
    pub const fn new(name: &'static str, language: LanguageFn) -> Self {
        Self {
            name,
            builder: language.into_raw(),
        }
    }
}

impl GrammarSource for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn construct(&self) -> Option<Language> {
        // SAFETY: `builder` came from a `LanguageFn`, whose contract is that
        // calling it returns either null or a pointer to static language tables.
        let raw = unsafe { (self.builder)() };
        if raw.is_null() {
            return None;
        }
        // SAFETY: non-null and static for the lifetime of the program.
        Some(unsafe { Language::from_raw(raw.cast::<ffi::TSLanguage>()) })
    }
}

/// Checks an ABI version against the range the linked runtime can read.
pub fn check_abi_version(version: usize) -> Result<(), LoadError> {
    if (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
        Ok(())
    } else {
        Err(LoadError::IncompatibleVersion {
            version,
            min: MIN_COMPATIBLE_LANGUAGE_VERSION,
            max: LANGUAGE_VERSION,
        })
    }
}

/// Constructs the language from `source` and installs it into a parser.
///
/// A single attempt is made. Grammar construction is deterministic, so a
/// retry with the same source would fail the same way.
pub fn load<S: GrammarSource + ?Sized>(source: &S) -> Result<Language, LoadError> {
    let _span = debug_span!("load_grammar", grammar = source.name()).entered();

    let result = source
        .construct()
        .ok_or(LoadError::LoadFailure)
        .and_then(|language| {
            check_abi_version(language.abi_version())?;
            Parser::new()
                .set_language(&language)
                .map_err(LoadError::Rejected)?;
            Ok(language)
        });

    match &result {
        Ok(language) => debug!(
            abi_version = language.abi_version(),
            node_kinds = language.node_kind_count(),
            "grammar loaded"
        ),
        Err(e) => warn!(error = %e, "grammar failed to load"),
    }
    result
}

/// Outcome of verifying that a grammar loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// The failure message, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(message) => Some(message),
        }
    }
}

impl From<Result<Language, LoadError>> for Verdict {
    fn from(result: Result<Language, LoadError>) -> Self {
        match result {
            Ok(_) => Verdict::Pass,
            Err(e) => Verdict::Fail(e.to_string()),
        }
    }
}

/// Loads `source` once and reports whether it produced a usable language.
pub fn verify<S: GrammarSource + ?Sized>(source: &S) -> Verdict {
    load(source).into()
}
