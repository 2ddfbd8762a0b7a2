use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Overrides the directory holding the output of `tree-sitter generate`.
const SRC_DIR_VAR: &str = "TREE_SITTER_UCODE_SRC";

/// Overrides the tree-sitter CLI used to generate the parser from `grammar.js`.
const CLI_VAR: &str = "TREE_SITTER_CLI";

/// `reserved` word sets in `grammar.js` need ABI 15.
const ABI_VERSION: &str = "15";

fn main() {
    println!("cargo:rustc-check-cfg=cfg(ucode_parser)");
    println!("cargo:rustc-check-cfg=cfg(ucode_node_types)");
    println!("cargo:rerun-if-env-changed={SRC_DIR_VAR}");
    println!("cargo:rerun-if-env-changed={CLI_VAR}");

    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let src_dir = env::var_os(SRC_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| manifest_dir.join("src"));
    let grammar_path = manifest_dir.join("grammar.js");

    println!("cargo:rerun-if-changed={}", grammar_path.display());
    println!("cargo:rerun-if-changed={}", src_dir.join("parser.c").display());
    println!("cargo:rerun-if-changed={}", src_dir.join("scanner.c").display());

    let generated_dir = if src_dir.join("parser.c").exists() {
        src_dir.clone()
    } else {
        match generate_parser(&manifest_dir, &grammar_path) {
            Ok(dir) => dir,
            Err(reason) => {
                println!(
                    "cargo:warning=ucode grammar not embedded: {reason}; \
                     run `tree-sitter generate` or set {SRC_DIR_VAR}"
                );
                return;
            }
        }
    };

    // The grammar declares `externals`, so the parser cannot link without its scanner.
    let scanner_path = [&src_dir, &generated_dir, &manifest_dir.join("src")]
        .into_iter()
        .map(|dir| dir.join("scanner.c"))
        .find(|path| path.exists())
        .unwrap_or_else(|| {
            panic!(
                "ucode grammar needs src/scanner.c to link {}",
                generated_dir.join("parser.c").display()
            )
        });

    compile_grammar(&generated_dir, &src_dir, &scanner_path);
    println!("cargo:rustc-cfg=ucode_parser");

    let node_types_path = generated_dir.join("node-types.json");
    if node_types_path.exists() {
        println!("cargo:rerun-if-changed={}", node_types_path.display());
        println!(
            "cargo:rustc-env=TREE_SITTER_UCODE_NODE_TYPES={}",
            node_types_path.display()
        );
        println!("cargo:rustc-cfg=ucode_node_types");
    }
}

/// Runs `tree-sitter generate` on a copy of `grammar.js` under `OUT_DIR` and
/// returns the directory holding the generated `parser.c`.
fn generate_parser(manifest_dir: &Path, grammar_path: &Path) -> Result<PathBuf, String> {
    if !grammar_path.exists() {
        return Err(format!("{} is missing", grammar_path.display()));
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("set by cargo"));
    let work_dir = out_dir.join("grammar");
    fs::create_dir_all(&work_dir).map_err(|e| e.to_string())?;
    fs::copy(grammar_path, work_dir.join("grammar.js")).map_err(|e| e.to_string())?;
    let config_path = manifest_dir.join("tree-sitter.json");
    if config_path.exists() {
        fs::copy(&config_path, work_dir.join("tree-sitter.json")).map_err(|e| e.to_string())?;
    }

    let cli = env::var_os(CLI_VAR).unwrap_or_else(|| "tree-sitter".into());
    let output = Command::new(&cli)
        .args(["generate", "--abi", ABI_VERSION])
        .current_dir(&work_dir)
        .output()
        .map_err(|e| format!("cannot run {}: {e}", cli.to_string_lossy()))?;
    if !output.status.success() {
        return Err(format!(
            "`tree-sitter generate` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let generated_dir = work_dir.join("src");
    if !generated_dir.join("parser.c").exists() {
        return Err(format!("no parser.c produced in {}", generated_dir.display()));
    }
    Ok(generated_dir)
}

fn compile_grammar(generated_dir: &Path, src_dir: &Path, scanner_path: &Path) {
    let mut c_config = cc::Build::new();
    c_config
        .std("c11")
        .include(generated_dir)
        .include(src_dir)
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable")
        .flag_if_supported("-Wno-trigraphs");

    #[cfg(target_env = "msvc")]
    c_config.flag("-utf-8");

    c_config.file(generated_dir.join("parser.c"));
    c_config.file(scanner_path);

    c_config.compile("tree-sitter-ucode");
}
