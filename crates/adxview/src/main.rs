mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use adxview_core::ReportService;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config, presets and auth bootstrap don't need a live connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Presets => commands::presets::handle(&cli.global),
        Command::Login(args) => commands::auth::login(args, &cli.global).await,
        Command::Logout => commands::auth::logout(&cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "adxview", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require a backend connection
        cmd => {
            commands::validate(&cmd)?;
            let refresh = commands::refresh_interval(&cmd);
            let backend_config = build_backend_config(&cli.global, refresh)?;
            let service = ReportService::new(backend_config)?;
            service.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &service, &cli.global).await;
            service.disconnect().await;
            result
        }
    }
}

/// Build a `BackendConfig` from the config file, profile, and CLI overrides.
fn build_backend_config(
    global: &GlobalOpts,
    refresh_interval_secs: u64,
) -> Result<adxview_core::BackendConfig, CliError> {
    let cfg = adxview_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let profile = apply_overrides(profile.clone(), global);
        let config = adxview_config::profile_to_backend_config(&profile, &profile_name)?;
        return Ok(config.with_refresh_interval(refresh_interval_secs));
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let url = global.backend.clone().ok_or_else(|| CliError::NoConfig {
        path: adxview_config::config_path().display().to_string(),
    })?;

    let profile = apply_overrides(
        adxview_config::Profile {
            backend: url,
            ..adxview_config::Profile::default()
        },
        global,
    );
    let config = adxview_config::profile_to_backend_config(&profile, &profile_name)?;
    Ok(config.with_refresh_interval(refresh_interval_secs))
}

pub(crate) fn active_profile_name(global: &GlobalOpts, cfg: &adxview_config::Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

fn apply_overrides(
    mut profile: adxview_config::Profile,
    global: &GlobalOpts,
) -> adxview_config::Profile {
    if let Some(ref backend) = global.backend {
        profile.backend = backend.clone();
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if profile.timeout.is_none() {
        profile.timeout = Some(global.timeout);
    }
    profile
}
