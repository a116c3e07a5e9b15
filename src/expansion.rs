//! Which nodes of the location tree the user has expanded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::relay_list::{RelayCity, RelayCountry, RelayList};

/// Identity of a node in a [`RelayList`].
///
/// Survives rebuilds of the tree, as long as the node still exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationId {
    Country {
        country_code: String,
    },
    City {
        country_code: String,
        city_code: String,
    },
    Relay {
        country_code: String,
        city_code: String,
        hostname: String,
    },
}

impl LocationId {
    pub fn country(country_code: impl Into<String>) -> Self {
        LocationId::Country {
            country_code: country_code.into(),
        }
    }

    pub fn city(country_code: impl Into<String>, city_code: impl Into<String>) -> Self {
        LocationId::City {
            country_code: country_code.into(),
            city_code: city_code.into(),
        }
    }
}

impl From<&RelayCountry> for LocationId {
    fn from(country: &RelayCountry) -> Self {
        LocationId::country(&country.country_code)
    }
}

impl From<&RelayCity> for LocationId {
    fn from(city: &RelayCity) -> Self {
        LocationId::city(&city.country_code, &city.city_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<LocationId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, id: LocationId) {
        self.expanded.insert(id);
    }

    pub fn collapse(&mut self, id: &LocationId) {
        self.expanded.remove(id);
    }

    /// Flip the state of a node. Returns whether it is now expanded.
    pub fn toggle(&mut self, id: LocationId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn is_expanded(&self, id: &LocationId) -> bool {
        self.expanded.contains(id)
    }

    /// Forget nodes that no longer exist in `relay_list`.
    pub fn retain_existing(&mut self, relay_list: &RelayList) {
        self.expanded.retain(|id| relay_list.contains(id));
    }
}

impl RelayList {
    /// Produce a copy of this tree with `expanded` set from `state`.
    pub fn with_expansion(&self, state: &ExpansionState) -> RelayList {
        let countries = self
            .countries
            .iter()
            .map(|country| RelayCountry {
                expanded: state.is_expanded(&country.into()),
                cities: country
                    .cities
                    .iter()
                    .map(|city| RelayCity {
                        expanded: state.is_expanded(&city.into()),
                        ..city.clone()
                    })
                    .collect(),
                ..country.clone()
            })
            .collect();

        RelayList { countries }
    }
}
