//! Where raw application records come from.
//!
//! Field names follow the freedesktop desktop-entry specification:
//! <https://specifications.freedesktop.org/desktop-entry-spec/desktop-entry-spec-latest.html>

use std::{collections::BTreeMap, fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{IndexUnavailableError, InventoryError};

/// Raw metadata for one installed application.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppData {
    #[serde(rename = "absolutepath")]
    pub absolute_path: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Icon", default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "Exec", default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,
    /// Locale-specific overrides, keyed by locale (`sv`, `sv_SE`, ...)
    #[serde(rename = "lang", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localized: BTreeMap<String, LocalizedOverride>,
    #[serde(rename = "Terminal", default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(rename = "NoDisplay", default, skip_serializing_if = "Option::is_none")]
    pub no_display: Option<String>,
    #[serde(rename = "Hidden", default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<String>,
    #[serde(rename = "OnlyShowIn", default, skip_serializing_if = "Option::is_none")]
    pub only_show_in: Option<StringList>,
    #[serde(rename = "NotShowIn", default, skip_serializing_if = "Option::is_none")]
    pub not_show_in: Option<StringList>,
    #[serde(rename = "TryExec", default, skip_serializing_if = "Option::is_none")]
    pub try_exec: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedOverride {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Icon", default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A desktop-entry list value: either the raw `;`-separated string or an
/// already split list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringList {
    Raw(String),
    List(Vec<String>),
}

impl StringList {
    pub fn items(&self) -> Vec<&str> {
        match self {
            StringList::Raw(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            StringList::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// Parse a desktop-entry boolean. Anything but `true` is false.
pub(crate) fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim() == "true")
}

impl AppData {
    pub fn is_hidden(&self) -> bool {
        is_true(self.hidden.as_deref())
    }

    pub fn is_no_display(&self) -> bool {
        is_true(self.no_display.as_deref())
    }
}

/// A source of installed applications.
///
/// Implementations do the parsing and I/O. The split tunneling policy only
/// ever sees [`AppData`].
pub trait ApplicationIndex {
    /// List the ids of all installed applications, in a stable order.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Look up the metadata of one application. `Ok(None)` if the id is unknown.
    fn data(&self, id: &str) -> io::Result<Option<AppData>>;
}

/// Enumerate the whole index, failing on the first error.
pub fn read_all(index: &impl ApplicationIndex) -> Result<Vec<AppData>, IndexUnavailableError> {
    let ids = index.list().map_err(IndexUnavailableError::Enumerate)?;
    ids.into_iter()
        .map(|id| match index.data(&id) {
            Ok(Some(data)) => Ok(data),
            Ok(None) => Err(IndexUnavailableError::Missing(id)),
            Err(source) => Err(IndexUnavailableError::Lookup { id, source }),
        })
        .collect()
}

/// An in-memory index. Ids are the positions of the records.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    apps: Vec<AppData>,
}

impl StaticIndex {
    pub fn new(apps: Vec<AppData>) -> Self {
        Self { apps }
    }

    /// Load a JSON array of [`AppData`] records.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let json = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self::new(serde_json::from_str(&json)?))
    }
}

impl ApplicationIndex for StaticIndex {
    fn list(&self) -> io::Result<Vec<String>> {
        Ok((0..self.apps.len()).map(|i| i.to_string()).collect())
    }

    fn data(&self, id: &str) -> io::Result<Option<AppData>> {
        let Ok(i) = id.parse::<usize>() else {
            return Ok(None);
        };
        Ok(self.apps.get(i).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_forms() {
        let raw = StringList::Raw("GNOME;KDE;".into());
        assert_eq!(raw.items(), ["GNOME", "KDE"]);
        let list = StringList::List(vec!["XFCE".into()]);
        assert_eq!(list.items(), ["XFCE"]);
    }

    #[test]
    fn parse_record() {
        let json = r#"{
            "absolutepath": "/usr/share/applications/foo.desktop",
            "Name": "Foo",
            "Exec": "foo %U",
            "Hidden": "true",
            "OnlyShowIn": ["GNOME", "Unity"],
            "lang": { "sv": { "Name": "Fu" } }
        }"#;
        let data: AppData = serde_json::from_str(json).unwrap();
        assert!(data.is_hidden());
        assert!(!data.is_no_display());
        assert_eq!(data.only_show_in.unwrap().items(), ["GNOME", "Unity"]);
        assert_eq!(data.localized["sv"].name.as_deref(), Some("Fu"));
        assert_eq!(data.localized["sv"].icon, None);
    }

    #[test]
    fn booleans() {
        assert!(is_true(Some("true")));
        assert!(!is_true(Some("false")));
        assert!(!is_true(Some("yes")));
        assert!(!is_true(None));
    }

    struct BrokenIndex;

    impl ApplicationIndex for BrokenIndex {
        fn list(&self) -> io::Result<Vec<String>> {
            Ok(vec!["a".into()])
        }

        fn data(&self, _id: &str) -> io::Result<Option<AppData>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    #[test]
    fn read_all_fails_on_lookup_error() {
        let err = read_all(&BrokenIndex).unwrap_err();
        assert!(matches!(err, IndexUnavailableError::Lookup { ref id, .. } if id == "a"));
    }

    #[test]
    fn static_index_unknown_id() {
        let index = StaticIndex::new(vec![AppData::default()]);
        assert_eq!(index.list().unwrap(), ["0"]);
        assert!(index.data("1").unwrap().is_none());
        assert!(index.data("nope").unwrap().is_none());
    }
}
