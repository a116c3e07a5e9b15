use std::process::{Child, Command, Stdio};

use super::SplitTunnelingApplication;
use crate::error::LaunchError;

/// Program that runs its arguments outside the tunnel.
pub const EXCLUDE_LAUNCHER: &str = "mullvad-exclude";

/// Split an `Exec` value into arguments.
///
/// Double quotes group words and `\` escapes the next character inside them.
/// Field codes such as `%U` are dropped, `%%` becomes `%`.
pub fn launch_args(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            '\\' if quoted => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    push_arg(&mut args, &mut current);
                    in_arg = false;
                }
            }
            '%' if !quoted => match chars.next() {
                Some('%') => {
                    current.push('%');
                    in_arg = true;
                }
                // Field code, expands to nothing here
                Some(_) | None => {}
            },
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        push_arg(&mut args, &mut current);
    }

    args
}

fn push_arg(args: &mut Vec<String>, current: &mut String) {
    args.push(std::mem::take(current));
}

/// Launch an application outside the tunnel.
pub fn launch(app: &SplitTunnelingApplication) -> Result<Child, LaunchError> {
    let args = app.exec.as_deref().map(launch_args).unwrap_or_default();
    if args.is_empty() {
        return Err(LaunchError::NoCommand(app.name.clone()));
    }

    if let Some(warning) = app.warning {
        tracing::warn!(app = %app.name, ?warning, "Launching app that may bypass exclusion");
    }

    Command::new(EXCLUDE_LAUNCHER)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: EXCLUDE_LAUNCHER.to_owned(),
            source,
        })
}
