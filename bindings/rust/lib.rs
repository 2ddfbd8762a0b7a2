//! Rust bindings for the `tree-sitter-ucode` grammar.
//!
//! This follows the standard layout used by Tree-sitter grammars: the build
//! script links the generated parser and [`LANGUAGE`] exposes it as a
//! [`LanguageFn`] that converts into a `tree_sitter::Language`. The [`load`]
//! module checks that a grammar actually yields a usable language.
//!
//! The parser is generated from `grammar.js` at build time when the
//! `tree-sitter` CLI is on `PATH` (or named by `$TREE_SITTER_CLI`), unless a
//! pre-generated `parser.c` sits in `src/` or `$TREE_SITTER_UCODE_SRC`.
//! Without either, the grammar items below are absent from the build.
//!
//! ```ignore
//! let mut parser = tree_sitter::Parser::new();
//! parser
//!     .set_language(&tree_sitter_ucode::LANGUAGE.into())
//!     .expect("Error loading ucode grammar");
//! let tree = parser.parse("let x = 1;", None).unwrap();
//! assert!(!tree.root_node().has_error());
//! ```

pub mod load;

pub use load::{
    check_abi_version, verify, Builtin, GrammarSource, LoadError, Verdict, LOAD_FAILURE_MESSAGE,
};
pub use tree_sitter_language::LanguageFn;

#[cfg(ucode_parser)]
extern "C" {
    fn tree_sitter_ucode() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for this grammar.
#[cfg(ucode_parser)]
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_ucode) };

/// The embedded ucode grammar as a [`GrammarSource`].
#[cfg(ucode_parser)]
pub const fn ucode() -> Builtin {
    Builtin::new("ucode", LANGUAGE)
}

/// Verifies that the embedded ucode grammar loads.
#[cfg(ucode_parser)]
pub fn verify_builtin() -> Verdict {
    verify(&ucode())
}

/// The content of the [`node-types.json`][] file for this grammar.
///
/// [`node-types.json`]: https://tree-sitter.github.io/tree-sitter/using-parsers/6-static-node-types
#[cfg(all(ucode_parser, ucode_node_types))]
pub const NODE_TYPES: &str = include_str!(env!("TREE_SITTER_UCODE_NODE_TYPES"));

/// The syntax highlighting query for this language.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../queries/highlights.scm");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_query_is_bundled() {
        assert!(HIGHLIGHTS_QUERY.contains("@comment"));
        assert!(HIGHLIGHTS_QUERY.contains("@keyword"));
    }

    #[cfg(ucode_parser)]
    mod grammar {
        use super::super::*;
        use tree_sitter::{Language, Parser, Query};

        const SAMPLE: &str = r#"
let greeting = "hello";
function greet(name, punct = "!") {
    if (length(name) == 0)
        return null;
    return `${greeting}, ${name}${punct}`;
}
for (let i = 0; i < 3; i++)
    print(greet("world"), "\n");
"#;

        #[test]
        fn grammar_can_be_loaded() {
            let verdict = verify_builtin();
            assert!(verdict.is_pass(), "{:?}", verdict.diagnostic());
            assert_eq!(verdict.diagnostic(), None);
        }

        #[test]
        fn grammar_loads_the_same_every_time() {
            let first = load::load(&ucode()).expect(LOAD_FAILURE_MESSAGE);
            let second = load::load(&ucode()).expect(LOAD_FAILURE_MESSAGE);
            assert_eq!(first.abi_version(), second.abi_version());
            assert_eq!(first.node_kind_count(), second.node_kind_count());
            assert_eq!(verify_builtin(), verify_builtin());
        }

        #[test]
        fn parses_ucode_source() {
            let mut parser = Parser::new();
            parser
                .set_language(&LANGUAGE.into())
                .expect(LOAD_FAILURE_MESSAGE);
            let tree = parser.parse(SAMPLE, None).unwrap();
            let root = tree.root_node();
            assert_eq!(root.kind(), "program");
            assert!(!root.has_error(), "{}", root.to_sexp());
        }

        #[test]
        fn external_scanner_is_linked() {
            let mut parser = Parser::new();
            parser
                .set_language(&LANGUAGE.into())
                .expect(LOAD_FAILURE_MESSAGE);
            let source = "<!-- legacy\nlet a = 1\nlet b = a ? `${a}` : 3\n";
            let tree = parser.parse(source, None).unwrap();
            let root = tree.root_node();
            assert!(!root.has_error(), "{}", root.to_sexp());
            let sexp = root.to_sexp();
            assert!(sexp.contains("ternary_expression"), "{sexp}");
            assert!(sexp.contains("template_string"), "{sexp}");
            assert!(sexp.contains("html_comment"), "{sexp}");
        }

        #[test]
        fn highlights_query_compiles() {
            let language: Language = LANGUAGE.into();
            Query::new(&language, HIGHLIGHTS_QUERY).unwrap();
        }

        #[cfg(ucode_node_types)]
        #[test]
        fn node_types_describe_program() {
            assert!(NODE_TYPES.contains("\"program\""));
        }
    }
}
