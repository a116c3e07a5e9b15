//! Relay location tree and split tunneling app catalog for Mullvad VPN frontends.
//!
//! - [`relay_list`] turns a nested relay inventory into the
//!   country/city/relay tree shown in the location picker.
//! - [`split_tunneling`] builds the list of installed apps that can be
//!   launched outside the tunnel.
//! - [`catalog`] holds the latest snapshot of both for a UI to read.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod expansion;
pub mod inventory;
pub mod relay_list;
pub mod split_tunneling;

pub use error::{DuplicateIdentifierError, IndexUnavailableError};
pub use inventory::RelayInventory;
pub use relay_list::RelayList;
pub use split_tunneling::{SplitTunnelingApplication, Warning};
