//! Latest relay list and app list, shared with the UI.
//!
//! Every refresh builds a complete new snapshot and swaps it in. Readers
//! holding an older `Arc` keep seeing the old snapshot. A failed refresh
//! leaves the previous snapshot in place.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;

use crate::{
    inventory::RelayInventory,
    relay_list::RelayList,
    split_tunneling::{self, ApplicationIndex, FilterContext, SplitTunnelingApplication},
};

pub type AppList = Arc<Vec<SplitTunnelingApplication>>;

pub struct Catalog {
    relays: watch::Sender<Option<Arc<RelayList>>>,
    apps: watch::Sender<Option<AppList>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            relays: watch::Sender::new(None),
            apps: watch::Sender::new(None),
        }
    }

    pub fn relay_list(&self) -> Option<Arc<RelayList>> {
        self.relays.borrow().clone()
    }

    pub fn app_list(&self) -> Option<AppList> {
        self.apps.borrow().clone()
    }

    pub fn subscribe_relays(&self) -> watch::Receiver<Option<Arc<RelayList>>> {
        self.relays.subscribe()
    }

    pub fn subscribe_apps(&self) -> watch::Receiver<Option<AppList>> {
        self.apps.subscribe()
    }

    /// Rebuild the relay tree from a new inventory.
    pub fn refresh_relays(&self, inventory: &RelayInventory) -> anyhow::Result<Arc<RelayList>> {
        let relay_list = RelayList::build(inventory)
            .inspect_err(|e| tracing::warn!("Keeping previous relay list: {e}"))
            .context("Failed to build relay list")?;
        let relay_list = Arc::new(relay_list);
        self.relays.send_replace(Some(relay_list.clone()));
        Ok(relay_list)
    }

    /// Rescan installed apps on a blocking thread and publish the result.
    pub async fn refresh_apps<I>(&self, index: I, ctx: FilterContext) -> anyhow::Result<AppList>
    where
        I: ApplicationIndex + Send + 'static,
    {
        let apps = tokio::task::spawn_blocking(move || {
            split_tunneling::build_applications(&index, &ctx)
        })
        .await
        .context("App scanning task panicked")?
        .inspect_err(|e| tracing::warn!("Keeping previous app list: {e}"))
        .context("Failed to load installed apps")?;

        let apps = Arc::new(apps);
        self.apps.send_replace(Some(apps.clone()));
        Ok(apps)
    }
}
