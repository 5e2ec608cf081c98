use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

mod rewrite;

use rewrite::{
    Rewriter, DEFAULT_FONT_STYLESHEET_URL, DEFAULT_PACKAGE_NAME, DEFAULT_PRETTIFY_CSS,
    DEFAULT_PRETTIFY_JS,
};

/// Config for optional YAML (`doctweak.yml` / `doctweak.yaml`); unset keys
/// fall back to the built-in defaults.
#[derive(Debug, Default, Deserialize)]
struct DoctweakConfig {
    /// Fully-qualified package name to linkify in the breadcrumb bar.
    #[serde(default)]
    package_name: Option<String>,
    /// External font stylesheet URL injected into <head>.
    #[serde(default)]
    font_stylesheet_url: Option<String>,
    /// Root-relative path of the prettify stylesheet.
    #[serde(default)]
    prettify_css: Option<String>,
    /// Root-relative path of the prettify script.
    #[serde(default)]
    prettify_js: Option<String>,
}

fn main() -> Result<()> {
    let matches = Command::new("doctweak")
        .version("0.1.0")
        .about("doctweak: rewrites generated javadoc HTML in place, wiring in prettify, a home link, and mobile-friendly head tags.")
        .arg(
            Arg::new("root")
                .help("Root directory of the generated HTML tree")
                .required(true),
        )
        .arg(
            Arg::new("index-dest")
                .long("index-dest")
                .value_name("DIR")
                .help("Directory to copy index.html into (default: the root itself)")
                .required(false),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let root = PathBuf::from(matches.get_one::<String>("root").unwrap());
    let index_dest = matches
        .get_one::<String>("index-dest")
        .map(PathBuf::from)
        .unwrap_or_else(|| root.clone());
    let debug_mode = matches.get_flag("debug");

    // Load optional YAML config
    let config = load_config_file()?.unwrap_or_default();
    let rewriter = Rewriter::new(
        config.package_name.as_deref().unwrap_or(DEFAULT_PACKAGE_NAME),
        config
            .font_stylesheet_url
            .as_deref()
            .unwrap_or(DEFAULT_FONT_STYLESHEET_URL),
        config.prettify_css.as_deref().unwrap_or(DEFAULT_PRETTIFY_CSS),
        config.prettify_js.as_deref().unwrap_or(DEFAULT_PRETTIFY_JS),
    )?;

    run(
        &root,
        Path::new("index.html"),
        &index_dest,
        &rewriter,
        debug_mode,
    )
}

/// Attempt to load config from doctweak.yml or doctweak.yaml, returning None if not found.
fn load_config_file() -> Result<Option<DoctweakConfig>> {
    for candidate in &["doctweak.yml", "doctweak.yaml"] {
        if Path::new(candidate).exists() {
            let text = fs::read_to_string(candidate)?;
            let config: DoctweakConfig = serde_yaml::from_str(&text)?;
            eprintln!("Loaded config from {}", candidate);
            return Ok(Some(config));
        }
    }
    Ok(None)
}

/// Walk `root`, rewrite every `.html` file in place, then copy
/// `index_source` into `index_dest`. Any filesystem error aborts the run;
/// files already rewritten stay rewritten (no rollback).
fn run(
    root: &Path,
    index_source: &Path,
    index_dest: &Path,
    rewriter: &Rewriter,
    debug: bool,
) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry =
            entry.with_context(|| format!("failed to walk directory {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".html") {
            continue;
        }

        let path = entry.path();
        // entry.depth() counts from the root dir itself, so the file's
        // directory sits depth-1 levels below the root.
        let toroot = relative_root_prefix(entry.depth().saturating_sub(1));
        if debug {
            eprintln!("Rewriting {} (root prefix {})", path.display(), toroot);
        }

        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut html = rewriter.rewrite(&toroot, &html);
        if name.ends_with("package-summary.html") {
            html = rewriter.rewrite_package_summary(&toroot, html);
        }
        fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let target = index_dest.join("index.html");
    fs::copy(index_source, &target).with_context(|| {
        format!(
            "failed to copy {} to {}",
            index_source.display(),
            target.display()
        )
    })?;
    Ok(())
}

/// Prefix that references the root from `depth` directories below it.
/// Zero depth (file directly under the root) yields "./".
fn relative_root_prefix(depth: usize) -> String {
    if depth == 0 {
        "./".to_string()
    } else {
        "../".repeat(depth)
    }
}
