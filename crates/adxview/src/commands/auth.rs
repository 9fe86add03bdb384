//! Auth command handlers: login, logout, whoami.

use secrecy::SecretString;
use serde::Serialize;

use adxview_core::models::User;
use adxview_core::{AuthCredentials, BackendConfig, ReportService, Session};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

/// Authenticate with username + password and store the issued token in the
/// system keyring for later invocations.
pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = adxview_config::load_config_or_default();
    let profile_name = crate::active_profile_name(global, &cfg);

    let backend = global
        .backend
        .clone()
        .or_else(|| cfg.profiles.get(&profile_name).map(|p| p.backend.clone()))
        .ok_or_else(|| CliError::NoConfig {
            path: adxview_config::config_path().display().to_string(),
        })?;
    let username = args
        .username
        .or_else(|| global.username.clone())
        .or_else(|| {
            cfg.profiles
                .get(&profile_name)
                .and_then(|p| p.username.clone())
        })
        .ok_or_else(|| CliError::Validation {
            field: "username".into(),
            reason: "pass a username: adxview login <USERNAME>".into(),
        })?;

    let password = match std::env::var("ADXVIEW_PASSWORD") {
        Ok(pw) => SecretString::from(pw),
        Err(_) => SecretString::from(
            rpassword::prompt_password(format!("Password for {username}: "))?,
        ),
    };

    let url = BackendConfig::parse_url(&backend)?;
    let config = BackendConfig::new(
        url,
        AuthCredentials::Credentials {
            username: username.clone(),
            password,
        },
    )
    .with_timeout(std::time::Duration::from_secs(global.timeout))
    .with_refresh_interval(0);
    let config = if global.insecure {
        config.with_tls(adxview_core::TlsVerification::DangerAcceptInvalid)
    } else {
        config
    };

    let service = ReportService::new(config)?;
    service.connect().await?;
    let Some(session) = service.session() else {
        return Err(CliError::AuthFailed {
            message: "no session after connect".into(),
        });
    };
    adxview_config::store_token(&profile_name, &session.token)?;
    // No disconnect here: it would revoke the token just stored.

    if !global.quiet {
        eprintln!(
            "Logged in as {} ({:?}) on profile '{profile_name}'",
            session.user.username, session.user.role
        );
    }
    Ok(())
}

/// Discard the stored token. Best effort: the keyring entry is always
/// cleared even when the backend can't be reached to revoke the session.
pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = adxview_config::load_config_or_default();
    let profile_name = crate::active_profile_name(global, &cfg);

    adxview_config::clear_token(&profile_name)?;
    if !global.quiet {
        eprintln!("Logged out of profile '{profile_name}'");
    }
    Ok(())
}

#[derive(Serialize)]
struct WhoamiView<'a> {
    user: &'a User,
    connected_at: String,
}

/// Show the authenticated user for the active session.
pub fn whoami(service: &ReportService, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(session) = service.session() else {
        return Err(CliError::SessionExpired);
    };
    let rendered = render_session(&session, global);
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn render_session(session: &Session, global: &GlobalOpts) -> String {
    let view = WhoamiView {
        user: &session.user,
        connected_at: session.started_at.to_rfc3339(),
    };
    output::render_single(
        &global.output,
        &view,
        |v| {
            format!(
                "{} ({:?})\nUser ID:   {}\nConnected: {}",
                v.user.username, v.user.role, v.user.id, v.connected_at
            )
        },
        |v| v.user.username.clone(),
    )
}
