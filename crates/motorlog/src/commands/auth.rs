//! Sign-in, sign-out and guest-mode handlers.

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use motorlog_core::{Garage, Registration, User};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

#[derive(Serialize)]
struct SessionStatus {
    authenticated: bool,
    guest: bool,
    online: bool,
    last_sync: Option<String>,
    pending_changes: usize,
}

fn status_detail(s: &SessionStatus) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();
    output::detail_block(&[
        ("Signed in", yes_no(s.authenticated)),
        ("Guest mode", yes_no(s.guest)),
        ("Online", yes_no(s.online)),
        ("Last sync", s.last_sync.clone().unwrap_or_else(|| "never".into())),
        ("Pending", s.pending_changes.to_string()),
    ])
}

fn read_password(flag: Option<String>, prompt: &str) -> Result<SecretString, CliError> {
    let password = match flag {
        Some(p) => p,
        None => rpassword::prompt_password(prompt).map_err(prompt_err)?,
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

fn signed_in(global: &GlobalOpts, user: &User) {
    let who = if user.name.is_empty() {
        &user.email
    } else {
        &user.name
    };
    output::print_done(global, &format!("Signed in as {who}"));
}

pub async fn handle(garage: &Garage, args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => Input::new()
                    .with_prompt("Email")
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            let password = read_password(password, "Password: ")?;
            let user = garage.login(&email, &password).await?;
            signed_in(global, &user);
            Ok(())
        }

        AuthCommand::Register {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let first = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
                    let second =
                        rpassword::prompt_password("Repeat password: ").map_err(prompt_err)?;
                    if first != second {
                        return Err(CliError::Validation {
                            field: "password".into(),
                            reason: "passwords do not match".into(),
                        });
                    }
                    first
                }
            };
            let registration = Registration {
                name,
                email,
                password_confirmation: password.clone(),
                password,
            };
            let user = garage.register(&registration).await?;
            signed_in(global, &user);
            Ok(())
        }

        AuthCommand::Social { provider, token } => {
            let user = garage
                .social_login(provider, &SecretString::from(token))
                .await?;
            signed_in(global, &user);
            Ok(())
        }

        AuthCommand::Logout => {
            garage.logout().await?;
            output::print_done(global, "Signed out");
            Ok(())
        }

        AuthCommand::Guest { off } => {
            if off {
                garage.exit_guest_mode()?;
                output::print_done(global, "Guest mode off");
            } else {
                garage.enter_guest_mode()?;
                output::print_done(global, "Guest mode on: private data stays hidden");
            }
            Ok(())
        }

        AuthCommand::Status => {
            let status = SessionStatus {
                authenticated: garage.is_authenticated(),
                guest: garage.is_guest(),
                online: garage.is_online(),
                last_sync: garage.last_sync().map(|t| t.to_rfc3339()),
                pending_changes: garage.pending_changes()?.len(),
            };
            let out = output::render_single(&global.output, &status, status_detail, |s| {
                if s.authenticated {
                    "authenticated".into()
                } else if s.guest {
                    "guest".into()
                } else {
                    "signed-out".into()
                }
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
