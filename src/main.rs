use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use vellum::{ViewConfig, ViewEngine, ViewError};

/// Renders a vellum view to standard output.
#[derive(Parser, Debug)]
#[command(name = "vellum", version, about)]
struct Cli {
    /// View name relative to the views folder, e.g. `pages/home`.
    view: String,

    /// Folder containing the views. Overrides the config file.
    #[arg(long)]
    views: Option<PathBuf>,

    /// File extension appended to view names, e.g. `.tpl`. Overrides the config file.
    #[arg(long)]
    ext: Option<String>,

    /// JSON object whose keys become session variables.
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pass the view file through verbatim instead of compiling it.
    #[arg(long)]
    direct: bool,

    /// Print the generated code unit instead of rendering.
    #[arg(long, conflicts_with = "direct")]
    dump: bool,
}

fn main() -> Result<(), ViewError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewConfig::from_json_file(path)?,
        None => ViewConfig::default(),
    };
    if let Some(views) = cli.views {
        config.view_folder = views;
    }
    if let Some(ext) = cli.ext {
        config.extension = ext;
    }
    if cli.direct {
        config.compile_templates = false;
    }

    let engine = ViewEngine::new(config)?;

    if cli.dump {
        let unit = engine.compile_view(&cli.view)?;
        print!("{}", unit);
        return Ok(());
    }

    let mut session = engine.session();
    if let Some(path) = &cli.data {
        log::info!("Loading variables from {}", path.display());
        match serde_json::from_str::<Value>(&fs::read_to_string(path)?)? {
            Value::Object(variables) => session.set_vars(variables),
            _ => {
                return Err(ViewError::Config(format!(
                    "'{}' must contain a JSON object",
                    path.display()
                )));
            }
        }
    }

    let output = session.load_view(&cli.view, Default::default())?;
    print!("{}", output);
    Ok(())
}
