//! Catalog of installed applications that can be excluded from the tunnel.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::IndexUnavailableError;

#[cfg(target_os = "linux")]
pub mod desktop;
pub mod index;
pub mod launch;
pub mod policy;

pub use index::{AppData, ApplicationIndex, StaticIndex};
pub use policy::FilterContext;

/// Why excluding an app might not work.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Warning {
    /// Launching the app hands over to an already running process, which is
    /// not excluded.
    LaunchesInExistingProcess,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SplitTunnelingApplication {
    pub absolute_path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,
}

/// Build the list of apps to show in the split tunneling view.
///
/// Apps are deduplicated by absolute path, keeping the first one the index
/// lists, and sorted by name.
///
/// # Errors
/// Returns `Err` if the index can't be read. Partial results are never
/// returned.
pub fn build_applications(
    index: &impl ApplicationIndex,
    ctx: &FilterContext,
) -> Result<Vec<SplitTunnelingApplication>, IndexUnavailableError> {
    let records = index::read_all(index)?;
    let total = records.len();

    let mut seen = HashSet::new();
    let mut apps: Vec<_> = records
        .iter()
        .filter(|data| ctx.is_candidate(data))
        .filter(|data| {
            let first = seen.insert(data.absolute_path.as_str());
            if !first {
                tracing::debug!(app = %data.absolute_path, "Duplicate app, skipping");
            }
            first
        })
        .map(|data| {
            let (name, icon) = ctx.localize(data);
            SplitTunnelingApplication {
                absolute_path: data.absolute_path.clone(),
                name: name.to_owned(),
                exec: data.exec.clone(),
                icon: icon.map(str::to_owned),
                warning: policy::warning_for(data.exec.as_deref()),
            }
        })
        .collect();

    apps.sort_by_cached_key(|app| (app.name.to_lowercase(), app.absolute_path.clone()));

    tracing::debug!(total, shown = apps.len(), "Loaded split tunneling apps");

    Ok(apps)
}

/// Apps whose name contains `query`, ignoring case.
pub fn filter_applications<'a>(
    apps: &'a [SplitTunnelingApplication],
    query: &str,
) -> Vec<&'a SplitTunnelingApplication> {
    let query = query.to_lowercase();
    apps.iter()
        .filter(|app| app.name.to_lowercase().contains(query.as_str()))
        .collect()
}
