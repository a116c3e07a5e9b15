//! Which applications are offered for split tunneling, and how they are shown.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use super::{Warning, index::AppData, launch::launch_args};

/// Executables that hand their arguments over to an already running instance
/// and exit. Excluding the new process from the tunnel does nothing for these.
pub const SINGLETON_LAUNCHERS: &[&str] = &[
    "brave-browser",
    "chromium",
    "chromium-browser",
    "firefox",
    "firefox-esr",
    "flatpak",
    "gnome-terminal",
    "google-chrome",
    "google-chrome-stable",
    "microsoft-edge",
    "opera",
    "tilix",
    "vivaldi-stable",
    "xfce4-terminal",
];

/// The parts of the running system that decide which apps are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterContext {
    /// Desktop environments of the current session, e.g. `["ubuntu", "GNOME"]`.
    /// Empty if unknown.
    pub current_desktops: Vec<String>,
    /// Active locale, e.g. `sv_SE`.
    pub locale: Option<String>,
    /// Directories searched for a bare `TryExec` name.
    pub search_path: Vec<PathBuf>,
}

impl FilterContext {
    /// Read the filter context from the process environment.
    pub fn from_env() -> Self {
        let desktops = env::var("XDG_CURRENT_DESKTOP").unwrap_or_default();
        let locale = ["LANGUAGE", "LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .filter_map(|key| env::var(key).ok())
            .find(|value| !value.is_empty());
        Self::new(&desktops, locale.as_deref(), env::var_os("PATH"))
    }

    /// Build a context from raw environment values.
    ///
    /// `desktops` is `:`-separated like `XDG_CURRENT_DESKTOP`. `locale` is a
    /// POSIX locale; `LANGUAGE`-style lists use their first entry, and the
    /// encoding and modifier are stripped (`sv_SE.UTF-8@euro` -> `sv_SE`).
    pub fn new(desktops: &str, locale: Option<&str>, path: Option<OsString>) -> Self {
        let current_desktops = desktops
            .split(':')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned)
            .collect();

        let locale = locale
            .and_then(|l| l.split(':').next())
            .map(|l| l.split(['.', '@']).next().unwrap_or(l))
            .filter(|l| !l.is_empty() && *l != "C" && *l != "POSIX")
            .map(str::to_owned);

        let search_path = path
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default();

        Self {
            current_desktops,
            locale,
            search_path,
        }
    }

    /// Decide whether a record is offered at all. Checks run in order:
    /// visibility flags, `TryExec`, then desktop environment scoping.
    pub fn is_candidate(&self, app: &AppData) -> bool {
        if app.is_hidden() || app.is_no_display() {
            return false;
        }

        if let Some(try_exec) = app.try_exec.as_deref() {
            if !self.try_exec(try_exec) {
                tracing::debug!(app = %app.absolute_path, try_exec, "TryExec not found");
                return false;
            }
        }

        self.shown_in_current_desktop(app)
    }

    /// Check that `TryExec` names an existing executable file.
    pub fn try_exec(&self, program: &str) -> bool {
        let program = program.trim();
        if program.is_empty() {
            return false;
        }

        let path = Path::new(program);
        if path.is_absolute() {
            return is_executable(path);
        }
        if path.components().count() > 1 {
            return false;
        }

        self.search_path
            .iter()
            .any(|dir| is_executable(&dir.join(program)))
    }

    fn shown_in_current_desktop(&self, app: &AppData) -> bool {
        if self.current_desktops.is_empty() {
            return true;
        }
        let is_current = |desktop: &str| {
            self.current_desktops
                .iter()
                .any(|current| current.eq_ignore_ascii_case(desktop))
        };

        if let Some(only) = &app.only_show_in {
            if !only.items().into_iter().any(is_current) {
                return false;
            }
        }
        if let Some(not) = &app.not_show_in {
            if not.items().into_iter().any(is_current) {
                return false;
            }
        }
        true
    }

    /// Pick the name and icon for the active locale.
    ///
    /// Overrides are looked up for the full locale first (`sv_SE`), then for
    /// the language alone (`sv`).
    pub fn localize<'a>(&self, app: &'a AppData) -> (&'a str, Option<&'a str>) {
        let mut name = app.name.as_str();
        let mut icon = app.icon.as_deref();

        let Some(locale) = self.locale.as_deref() else {
            return (name, icon);
        };
        let language = locale.split('_').next().unwrap_or(locale);

        let overrides = [locale, language]
            .into_iter()
            .filter_map(|key| app.localized.get(key));

        // Later entries are less specific, so only fill in what is still unset.
        let mut name_set = false;
        let mut icon_set = false;
        for o in overrides {
            if let (false, Some(n)) = (name_set, o.name.as_deref()) {
                name = n;
                name_set = true;
            }
            if let (false, Some(i)) = (icon_set, o.icon.as_deref()) {
                icon = Some(i);
                icon_set = true;
            }
        }

        (name, icon)
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt as _;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Name of the program an `Exec` command runs, without its directory.
///
/// An `env` wrapper is looked through: its options, the arguments of
/// `-u`/`-C`, and `VAR=value` assignments are skipped, and a `-S` string is
/// read as more `env` arguments.
pub fn executable_name(exec: &str) -> Option<String> {
    let args = launch_args(exec);
    let mut args = args.iter().map(String::as_str);

    let program = args.next()?;
    if base_name(program) != "env" {
        return Some(base_name(program).to_owned());
    }

    while let Some(arg) = args.next() {
        match arg {
            "--" => {
                let program = args.find(|a| !is_assignment(a))?;
                return Some(base_name(program).to_owned());
            }
            "-u" | "--unset" | "-C" | "--chdir" => {
                args.next();
            }
            "-S" | "--split-string" => return executable_name(&format!("env {}", args.next()?)),
            _ => {
                if let Some(split) = arg
                    .strip_prefix("--split-string=")
                    .or_else(|| arg.strip_prefix("-S"))
                {
                    return executable_name(&format!("env {split}"));
                }
                if !arg.starts_with('-') && !is_assignment(arg) {
                    return Some(base_name(arg).to_owned());
                }
            }
        }
    }
    None
}

fn is_assignment(arg: &str) -> bool {
    arg.split_once('=')
        .is_some_and(|(key, _)| !key.is_empty() && !key.contains('/'))
}

fn base_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program)
}

/// Classify an `Exec` command.
pub fn warning_for(exec: Option<&str>) -> Option<Warning> {
    let name = executable_name(exec?)?;
    SINGLETON_LAUNCHERS
        .contains(&name.as_str())
        .then_some(Warning::LaunchesInExistingProcess)
}
