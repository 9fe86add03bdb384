//! Config command handlers: path, list, init.

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use adxview_config::Profile;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &adxview_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
        ConfigCommand::List => list(global),
        ConfigCommand::Init {
            name,
            backend,
            username,
            default,
        } => init(&name, backend, username, default, global),
    }
}

#[derive(Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = adxview_config::load_config_or_default();
    let default = cfg.default_profile.clone().unwrap_or_default();

    let mut rows: Vec<ProfileRow> = cfg
        .profiles
        .iter()
        .map(|(name, profile)| ProfileRow {
            name: name.clone(),
            backend: profile.backend.clone(),
            username: profile.username.clone().unwrap_or_default(),
            default: if *name == default { "*" } else { "" },
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    if rows.is_empty() {
        if !global.quiet {
            eprintln!(
                "No profiles configured. Create one with: adxview config init --backend <URL>"
            );
        }
        return Ok(());
    }

    let rendered = match global.output {
        OutputFormat::Table => Table::new(&rows).with(Style::rounded()).to_string(),
        OutputFormat::Json => output::render_json(&rows, false),
        OutputFormat::JsonCompact => output::render_json(&rows, true),
        OutputFormat::Yaml => output::render_yaml(&rows),
        OutputFormat::Plain => rows
            .iter()
            .map(|r| r.name.clone())
            .collect::<Vec<_>>()
            .join("\n"),
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn init(
    name: &str,
    backend: String,
    username: Option<String>,
    default: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Validate before persisting anything.
    adxview_core::BackendConfig::parse_url(&backend)?;

    let mut cfg = adxview_config::load_config_or_default();
    let entry = cfg.profiles.entry(name.to_owned()).or_insert_with(|| Profile {
        backend: backend.clone(),
        ..Profile::default()
    });
    entry.backend = backend;
    if username.is_some() {
        entry.username = username;
    }
    if default || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(name.to_owned());
    }
    adxview_config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!(
            "Profile '{name}' saved to {}",
            adxview_config::config_path().display()
        );
        eprintln!("Store credentials with: adxview login --profile {name}");
    }
    Ok(())
}
