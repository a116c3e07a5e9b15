//! Application index backed by the desktop entries installed on the system.

use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use freedesktop_desktop_entry::{DesktopEntry, IconSource};

use super::index::{AppData, ApplicationIndex, LocalizedOverride, StringList};

// TODO: let the caller pass the icon size the view actually renders at
const ICON_SIZE: u16 = 128;

/// Scans the `applications` directories on the first [`ApplicationIndex::list`].
pub struct DesktopEntryIndex {
    dirs: Vec<PathBuf>,
    entries: OnceLock<Vec<AppData>>,
}

impl Default for DesktopEntryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopEntryIndex {
    /// Index `$XDG_DATA_HOME/applications` and `$XDG_DATA_DIRS/*/applications`.
    pub fn new() -> Self {
        Self::with_dirs(freedesktop_desktop_entry::default_paths().into_iter().collect())
    }

    /// Index the `.desktop` files below `dirs`, earlier dirs first.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            entries: OnceLock::new(),
        }
    }

    fn scan(&self) -> io::Result<Vec<AppData>> {
        let mut entries = Vec::new();
        for dir in &self.dirs {
            match scan_dir(dir, &mut entries) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(dir = %dir.display(), "No applications directory");
                }
                result => result?,
            }
        }
        tracing::debug!(count = entries.len(), "Scanned desktop entries");
        Ok(entries)
    }
}

fn scan_dir(dir: &Path, entries: &mut Vec<AppData>) -> io::Result<()> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            scan_dir(&path, entries)?;
            continue;
        }
        if path.extension() != Some(OsStr::new("desktop")) {
            continue;
        }

        // No locale filter, so every `Name[xx]` and `Icon[xx]` is kept.
        match DesktopEntry::from_path(&path, None::<&[&str]>) {
            Ok(entry) => entries.push(app_data(&entry)),
            Err(error) => {
                tracing::warn!(path = %path.display(), ?error, "Failed to parse desktop entry");
            }
        }
    }
    Ok(())
}

impl ApplicationIndex for DesktopEntryIndex {
    fn list(&self) -> io::Result<Vec<String>> {
        let entries = match self.entries.get() {
            Some(entries) => entries,
            None => {
                let scanned = self.scan()?;
                self.entries.get_or_init(|| scanned)
            }
        };
        Ok((0..entries.len()).map(|i| i.to_string()).collect())
    }

    fn data(&self, id: &str) -> io::Result<Option<AppData>> {
        let Ok(i) = id.parse::<usize>() else {
            return Ok(None);
        };
        Ok(self.entries.get().and_then(|entries| entries.get(i)).cloned())
    }
}

fn app_data(entry: &DesktopEntry) -> AppData {
    let raw = |key: &str| entry.desktop_entry(key).map(str::to_owned);

    let mut localized: BTreeMap<String, LocalizedOverride> = BTreeMap::new();
    if let Some(group) = entry.groups.desktop_entry() {
        if let Some((_, names)) = group.0.get("Name") {
            for (locale, name) in names {
                localized.entry(locale.clone()).or_default().name = Some(name.clone());
            }
        }
        if let Some((_, icons)) = group.0.get("Icon") {
            for (locale, icon) in icons {
                localized.entry(locale.clone()).or_default().icon = Some(resolve_icon(icon));
            }
        }
    }

    AppData {
        absolute_path: entry.path.to_string_lossy().into_owned(),
        name: raw("Name").unwrap_or_else(|| entry.appid.clone()),
        icon: entry.icon().map(resolve_icon),
        exec: entry.exec().map(str::to_owned),
        localized,
        terminal: raw("Terminal"),
        no_display: raw("NoDisplay"),
        hidden: raw("Hidden"),
        only_show_in: raw("OnlyShowIn").map(StringList::Raw),
        not_show_in: raw("NotShowIn").map(StringList::Raw),
        try_exec: raw("TryExec"),
    }
}

/// Turn an `Icon` value into a file path if the icon theme has it.
/// Unresolvable names are kept as they are.
fn resolve_icon(icon: &str) -> String {
    let path: Option<PathBuf> = match IconSource::from_unknown(icon) {
        IconSource::Name(name) => freedesktop_icons::lookup(&name).with_size(ICON_SIZE).find(),
        IconSource::Path(path) => Some(path),
    };
    path.map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| icon.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::IndexUnavailableError,
        split_tunneling::{FilterContext, build_applications},
    };

    fn write_entry(dir: &Path, file: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(file), contents).unwrap();
    }

    #[test]
    fn all_locales_are_indexed() {
        let data = tempfile::tempdir().unwrap();
        let applications = data.path().join("applications");
        write_entry(
            &applications,
            "files.desktop",
            "[Desktop Entry]\nType=Application\nName=Files\nName[sv]=Filer\nName[de]=Dateien\nExec=files %U\n",
        );

        let index = DesktopEntryIndex::with_dirs(vec![applications]);

        let sv = FilterContext::new("", Some("sv_SE.UTF-8"), None);
        let apps = build_applications(&index, &sv).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "Filer");

        let de = FilterContext::new("", Some("de_DE"), None);
        assert_eq!(build_applications(&index, &de).unwrap()[0].name, "Dateien");

        let en = FilterContext::new("", Some("en_US.UTF-8"), None);
        assert_eq!(build_applications(&index, &en).unwrap()[0].name, "Files");
    }

    #[test]
    fn scans_subdirectories_and_skips_other_files() {
        let data = tempfile::tempdir().unwrap();
        let applications = data.path().join("applications");
        write_entry(
            &applications.join("kde"),
            "konsole.desktop",
            "[Desktop Entry]\nType=Application\nName=Konsole\nExec=konsole\n",
        );
        write_entry(&applications, "README", "not a desktop entry");

        let index = DesktopEntryIndex::with_dirs(vec![applications]);
        let apps = build_applications(&index, &FilterContext::default()).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "Konsole");
        assert_eq!(apps[0].exec.as_deref(), Some("konsole"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let data = tempfile::tempdir().unwrap();
        let index = DesktopEntryIndex::with_dirs(vec![data.path().join("applications")]);
        let apps = build_applications(&index, &FilterContext::default()).unwrap();
        assert!(apps.is_empty());
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        let data = tempfile::tempdir().unwrap();
        // A file where a directory is expected can't be listed, even as root
        let applications = data.path().join("applications");
        fs::write(&applications, "").unwrap();

        let index = DesktopEntryIndex::with_dirs(vec![applications]);
        let err = build_applications(&index, &FilterContext::default()).unwrap_err();
        assert!(matches!(err, IndexUnavailableError::Enumerate(_)));
    }
}
