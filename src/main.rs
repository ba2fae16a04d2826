//! tpl CLI
//!
//! Usage:
//!   tpl [OPTIONS] <TEMPLATE>
//!
//! Options:
//!   -d, --dir <DIR>          Template directory (default: .)
//!   -c, --context <FILE>     JSON context file (default: {})
//!       --config <FILE>      Engine configuration (TOML format)
//!       --tokens             Dump the token stream instead of rendering
//!   -h, --help               Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use tpl::syntax::tokenize;
use tpl::{Engine, EngineConfig, Error};

#[derive(Parser)]
#[command(name = "tpl")]
#[command(about = "Render text templates against a JSON context")]
struct Cli {
    /// Template name, relative to the template directory
    template: String,

    /// Directory whose files are loaded as templates
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// JSON file used as the render context
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Engine configuration file (TOML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the token stream of the template and exit
    #[arg(long)]
    tokens: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let mut engine = Engine::with_config(config);
    if let Err(e) = load_templates(&mut engine, &cli.dir) {
        eprintln!("Error reading templates from '{}': {}", cli.dir.display(), e);
        std::process::exit(1);
    }

    let Some(source) = engine.get(&cli.template) else {
        eprintln!(
            "Error: template '{}' not found in '{}'",
            cli.template,
            cli.dir.display()
        );
        std::process::exit(1);
    };

    if cli.tokens {
        match tokenize(source) {
            Ok(tokens) => {
                for token in tokens {
                    println!("{:?}\t{}", token.span, token.node);
                }
            }
            Err(e) => {
                eprint!("{}", e.format(source, &cli.template));
                std::process::exit(1);
            }
        }
        return;
    }

    let context = match &cli.context {
        Some(path) => match read_context(path) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Error reading context '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Value::Object(Default::default()),
    };

    match engine.render(&cli.template, &context) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            report(&engine, &cli.template, &e);
            std::process::exit(1);
        }
    }
}

/// Register every file under `dir`, named by its `/`-separated relative path
fn load_templates(engine: &mut Engine, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for entry in WalkDir::new(dir).sort_by_file_name().follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = template_name(dir, entry.path())?;

        // Binary files are not templates
        let Ok(text) = fs::read_to_string(entry.path()) else {
            debug!(name = %name, "skipping non-UTF-8 file");
            continue;
        };
        debug!(name = %name, "loaded template");
        engine.set(name, text);
    }
    Ok(())
}

/// Registry name of `path`: its path below `root`, joined with `/`
fn template_name(root: &Path, path: &Path) -> Result<String, std::path::StripPrefixError> {
    let relative = path.strip_prefix(root)?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn read_context(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Print errors with a source location as diagnostics, everything else as one line
fn report(engine: &Engine, template: &str, error: &Error) {
    match engine.diagnostic(template, error) {
        Some(diagnostic) => eprint!("{}", diagnostic),
        None => eprintln!("Error: {}", error),
    }
}
