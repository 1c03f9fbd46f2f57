//! `trellis create`: scaffold a cargo project with a counter app.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args as ClapArgs;
use color_eyre::eyre::{bail, Result, WrapErr};
use heck::{ToKebabCase, ToUpperCamelCase};
use tracing::info;

const CARGO_TOML: &str = r#"[package]
name = "__CRATE_NAME__"
version = "0.1.0"
edition = "2021"

[dependencies]
trellis-core = __CORE_DEPENDENCY__
"#;

const MAIN_RS: &str = r#"use trellis_core::{App, AppMeta, Observable, State, Widget};

struct __APP_NAME__ {
    count: State<i64>,
}

impl App for __APP_NAME__ {
    fn build(&self) -> Widget {
        let inc = self.count.clone();
        let dec = self.count.clone();

        Widget::center(
            Widget::column()
                .spacing(24)
                .align("center")
                .child(Widget::heading("__DISPLAY_NAME__", 1))
                .child(Widget::text(format!("Count: {}", self.count.get())).size("2xl"))
                .child(
                    Widget::row()
                        .spacing(12)
                        .child(Widget::button("-").on_click(move || {
                            dec.update(|n| n - 1);
                        }))
                        .child(Widget::button("+").on_click(move || {
                            inc.update(|n| n + 1);
                        })),
                ),
        )
    }

    fn states(&self) -> Vec<&dyn Observable> {
        vec![&self.count]
    }

    fn meta(&self) -> AppMeta {
        AppMeta::new("__DISPLAY_NAME__")
    }
}

fn main() -> trellis_core::Result<()> {
    trellis_core::run(__APP_NAME__ { count: State::new(0) })
}
"#;

const GITIGNORE: &str = "/target\n/build\n";

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Project name (e.g. "My App" creates folder "my-app")
    name: String,

    /// Directory to create the project in (defaults to ./<name>)
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Path to a local trellis-core checkout
    #[arg(long)]
    core_path: Option<PathBuf>,
}

pub fn run(args: Args) -> Result<()> {
    let crate_name = crate_name(&args.name);
    if crate_name.is_empty() {
        bail!("`{}` does not make a valid crate name", args.name);
    }

    let dir = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?.join(&crate_name),
    };
    let core = match &args.core_path {
        Some(path) => format!("{{ path = \"{}\" }}", path.display()),
        None => format!("\"{}\"", env!("CARGO_PKG_VERSION")),
    };

    let files = scaffold(&dir, &args.name, &core)?;
    info!("created {} ({} files)", dir.display(), files.len());
    info!("next: cd {} && trellis dev", dir.display());
    Ok(())
}

/// Write the project files into `dir`, which must not exist or be empty.
pub fn scaffold(dir: &Path, display_name: &str, core_dependency: &str) -> Result<Vec<PathBuf>> {
    if dir.exists() && fs::read_dir(dir)?.next().is_some() {
        bail!("{} already exists and is not empty", dir.display());
    }

    let context = HashMap::from([
        ("CRATE_NAME", crate_name(display_name)),
        ("APP_NAME", type_name(display_name)),
        ("DISPLAY_NAME", display_name.replace('"', "\\\"")),
        ("CORE_DEPENDENCY", core_dependency.to_string()),
    ]);

    let mut written = Vec::new();
    for (name, template) in [("Cargo.toml", CARGO_TOML), ("src/main.rs", MAIN_RS), (".gitignore", GITIGNORE)] {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, render(template, &context)).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Names cargo rejects as packages and Rust rejects as identifiers.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "static",
    "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
];

/// Kebab-case package name, ASCII only. Prefixed with `app-` when it would
/// start with a digit or be a keyword.
fn crate_name(name: &str) -> String {
    let kebab = name
        .to_kebab_case()
        .split('-')
        .map(|word| word.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if kebab.starts_with(|c: char| c.is_ascii_digit()) || KEYWORDS.contains(&kebab.as_str()) {
        format!("app-{kebab}")
    } else {
        kebab
    }
}

/// UpperCamelCase type name for the app struct. Prefixed with `App` unless it
/// already starts with a letter.
fn type_name(name: &str) -> String {
    let camel = name.to_upper_camel_case();
    if camel.starts_with(char::is_alphabetic) && camel != "Self" {
        camel
    } else {
        format!("App{camel}")
    }
}

fn render(template: &str, context: &HashMap<&str, String>) -> String {
    let mut content = template.to_string();
    for (key, value) in context {
        content = content.replace(&format!("__{key}__"), value);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trellis-create-{name}-{}", std::process::id()))
    }

    #[test]
    fn scaffolds_a_counter_project() {
        let dir = scratch("counter");
        let _ = fs::remove_dir_all(&dir);

        let files = scaffold(&dir, "My Counter", "\"0.1.0\"").unwrap();
        assert_eq!(files.len(), 3);

        let manifest = fs::read_to_string(dir.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("name = \"my-counter\""));
        assert!(manifest.contains("trellis-core = \"0.1.0\""));

        let main = fs::read_to_string(dir.join("src/main.rs")).unwrap();
        assert!(main.contains("struct MyCounter"));
        assert!(main.contains("AppMeta::new(\"My Counter\")"));
        assert!(!main.contains("__"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn names_starting_with_digits_get_a_prefix() {
        assert_eq!(type_name("2048 game"), "App2048Game");
        assert_eq!(crate_name("2048 game"), "app-2048-game");
        assert_eq!(type_name("self"), "AppSelf");
        assert_eq!(crate_name("match"), "app-match");
        assert_eq!(type_name("todo list"), "TodoList");
        assert_eq!(crate_name("Todo List!"), "todo-list");

        let dir = scratch("digits");
        let _ = fs::remove_dir_all(&dir);
        scaffold(&dir, "2048 game", "\"0.1.0\"").unwrap();
        let manifest = fs::read_to_string(dir.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("name = \"app-2048-game\""));
        let main = fs::read_to_string(dir.join("src/main.rs")).unwrap();
        assert!(main.contains("struct App2048Game {"));
        assert!(main.contains("AppMeta::new(\"2048 game\")"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn refuses_non_empty_directories() {
        let dir = scratch("busy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("keep.txt"), "x").unwrap();

        assert!(scaffold(&dir, "Busy", "\"0.1.0\"").is_err());
        assert!(!dir.join("Cargo.toml").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
