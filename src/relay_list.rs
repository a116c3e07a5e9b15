//! Display-ready tree of relay locations.
//!
//! A [`RelayList`] is built wholesale from a [`RelayInventory`] and never
//! mutated afterwards. UI state such as which nodes are expanded is kept in
//! [`crate::expansion::ExpansionState`] and projected onto a fresh tree.

use std::collections::HashSet;

use serde::Serialize;

use crate::{error::DuplicateIdentifierError, expansion::LocationId, inventory::RelayInventory};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayList {
    pub countries: Vec<RelayCountry>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayCountry {
    pub name: String,
    pub country_code: String,
    pub expanded: bool,
    pub cities: Vec<RelayCity>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayCity {
    pub name: String,
    pub country_code: String,
    pub city_code: String,
    pub expanded: bool,
    pub relays: Vec<Relay>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relay {
    pub country_code: String,
    pub city_code: String,
    pub hostname: String,
}

impl RelayList {
    /// Transform the inventory into a tree of Country/City/Relay.
    ///
    /// Order is kept exactly as in the inventory, and no node starts expanded.
    ///
    /// # Errors
    /// Returns `Err` if a country code, a city code within a country, or a
    /// hostname within a city occurs more than once.
    pub fn build(inventory: &RelayInventory) -> Result<Self, DuplicateIdentifierError> {
        let mut country_codes = HashSet::new();

        let countries = inventory
            .countries
            .iter()
            .map(|country| {
                if !country_codes.insert(country.code.as_str()) {
                    return Err(DuplicateIdentifierError::Country(country.code.clone()));
                }

                let mut city_codes = HashSet::new();
                let cities = country
                    .cities
                    .iter()
                    .map(|city| {
                        if !city_codes.insert(city.code.as_str()) {
                            return Err(DuplicateIdentifierError::City {
                                country_code: country.code.clone(),
                                city_code: city.code.clone(),
                            });
                        }

                        let mut hostnames = HashSet::new();
                        let relays = city
                            .relays
                            .iter()
                            .map(|relay| {
                                if !hostnames.insert(relay.hostname.as_str()) {
                                    return Err(DuplicateIdentifierError::Relay {
                                        country_code: country.code.clone(),
                                        city_code: city.code.clone(),
                                        hostname: relay.hostname.clone(),
                                    });
                                }
                                Ok(Relay {
                                    country_code: country.code.clone(),
                                    city_code: city.code.clone(),
                                    hostname: relay.hostname.clone(),
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;

                        Ok(RelayCity {
                            name: city.name.clone(),
                            country_code: country.code.clone(),
                            city_code: city.code.clone(),
                            expanded: false,
                            relays,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(RelayCountry {
                    name: country.name.clone(),
                    country_code: country.code.clone(),
                    expanded: false,
                    cities,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(countries = countries.len(), "Built relay list");

        Ok(Self { countries })
    }

    pub fn relay_count(&self) -> usize {
        self.countries
            .iter()
            .flat_map(|country| &country.cities)
            .map(|city| city.relays.len())
            .sum()
    }

    pub fn find_country(&self, country_code: &str) -> Option<&RelayCountry> {
        self.countries
            .iter()
            .find(|country| country.country_code == country_code)
    }

    pub fn find_city(&self, country_code: &str, city_code: &str) -> Option<&RelayCity> {
        self.find_country(country_code)?
            .cities
            .iter()
            .find(|city| city.city_code == city_code)
    }

    pub fn find_relay(&self, country_code: &str, city_code: &str, hostname: &str) -> Option<&Relay> {
        self.find_city(country_code, city_code)?
            .relays
            .iter()
            .find(|relay| relay.hostname == hostname)
    }

    /// Check whether a node with this id exists in the tree.
    pub fn contains(&self, id: &LocationId) -> bool {
        match id {
            LocationId::Country { country_code } => self.find_country(country_code).is_some(),
            LocationId::City {
                country_code,
                city_code,
            } => self.find_city(country_code, city_code).is_some(),
            LocationId::Relay {
                country_code,
                city_code,
                hostname,
            } => self.find_relay(country_code, city_code, hostname).is_some(),
        }
    }

    /// Prune the tree to nodes matching `query`, case-insensitively.
    ///
    /// A matching country keeps all of its cities, a matching city keeps all
    /// of its relays. Ancestors of a match are always kept.
    pub fn search(&self, query: &str) -> Self {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.clone();
        }
        let matches = |s: &str| s.to_lowercase().contains(&query);

        let countries = self
            .countries
            .iter()
            .filter_map(|country| {
                if matches(&country.name) {
                    return Some(country.clone());
                }

                let cities: Vec<_> = country
                    .cities
                    .iter()
                    .filter_map(|city| {
                        if matches(&city.name) {
                            return Some(city.clone());
                        }
                        let relays: Vec<_> = city
                            .relays
                            .iter()
                            .filter(|relay| matches(&relay.hostname))
                            .cloned()
                            .collect();
                        (!relays.is_empty()).then(|| RelayCity {
                            relays,
                            ..city.clone()
                        })
                    })
                    .collect();

                (!cities.is_empty()).then(|| RelayCountry {
                    cities,
                    ..country.clone()
                })
            })
            .collect();

        Self { countries }
    }
}
