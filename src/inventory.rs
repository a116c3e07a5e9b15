//! The nested relay inventory: countries containing cities containing relays.

use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{api, error::InventoryError};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayInventory {
    #[serde(default)]
    pub countries: Vec<Country>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub cities: Vec<City>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub relays: Vec<Relay>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    pub hostname: String,
}

impl RelayInventory {
    pub fn from_json(json: &str) -> Result<Self, InventoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read an inventory from a JSON file.
    ///
    /// With `api_format` set, the file is parsed as the flat API relay list
    /// and converted with [`Self::from_api`].
    pub fn load(path: &Path, api_format: bool) -> Result<Self, InventoryError> {
        let json = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_owned(),
            source,
        })?;

        if api_format {
            let relay_list: api::RelayList = serde_json::from_str(&json)?;
            Ok(Self::from_api(&relay_list))
        } else {
            Self::from_json(&json)
        }
    }

    /// Group a flat API relay list into an inventory.
    ///
    /// Countries, cities and relays appear in the order their first relay
    /// appears in the API list.
    pub fn from_api(relay_list: &api::RelayList) -> Self {
        let mut countries: Vec<Country> = Vec::new();
        let mut country_index: HashMap<&str, usize> = HashMap::new();
        let mut city_index: HashMap<(&str, &str), usize> = HashMap::new();

        for relay in &relay_list.wireguard.relays {
            let Some(location) = relay_list.locations.get(&relay.location) else {
                tracing::warn!(
                    hostname = %relay.hostname,
                    location = %relay.location,
                    "Relay has unknown location, skipping"
                );
                continue;
            };
            let Some((country_code, city_code)) = api::split_location_key(&relay.location) else {
                tracing::warn!(location = %relay.location, "Malformed location key, skipping");
                continue;
            };

            let ci = *country_index.entry(country_code).or_insert_with(|| {
                countries.push(Country {
                    name: location.country.clone(),
                    code: country_code.to_owned(),
                    cities: vec![],
                });
                countries.len() - 1
            });
            let country = &mut countries[ci];

            let ti = *city_index
                .entry((country_code, city_code))
                .or_insert_with(|| {
                    country.cities.push(City {
                        name: location.city.clone(),
                        code: city_code.to_owned(),
                        relays: vec![],
                    });
                    country.cities.len() - 1
                });

            country.cities[ti].relays.push(Relay {
                hostname: relay.hostname.clone(),
            });
        }

        Self { countries }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn api_relay(hostname: &str, location: &str) -> api::Relay {
        api::Relay {
            hostname: hostname.into(),
            location: location.into(),
        }
    }

    fn api_location(country: &str, city: &str) -> api::Location {
        api::Location {
            country: country.into(),
            city: city.into(),
        }
    }

    #[test]
    fn from_api_groups_in_first_seen_order() {
        let locations = BTreeMap::from([
            ("se-got".to_owned(), api_location("Sweden", "Gothenburg")),
            ("se-sto".to_owned(), api_location("Sweden", "Stockholm")),
            ("de-ber".to_owned(), api_location("Germany", "Berlin")),
        ]);
        let relays = vec![
            api_relay("se-sto-wg-001", "se-sto"),
            api_relay("de-ber-wg-001", "de-ber"),
            api_relay("se-got-wg-001", "se-got"),
            api_relay("se-sto-wg-002", "se-sto"),
            api_relay("xx-nop-wg-001", "xx-nop"),
        ];
        let list = api::RelayList {
            locations,
            wireguard: api::WireguardList { relays },
        };

        let inventory = RelayInventory::from_api(&list);

        let codes: Vec<_> = inventory.countries.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, ["se", "de"]);

        let sweden = &inventory.countries[0];
        assert_eq!(sweden.name, "Sweden");
        let cities: Vec<_> = sweden.cities.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(cities, ["sto", "got"]);
        let sto: Vec<_> = sweden.cities[0]
            .relays
            .iter()
            .map(|r| r.hostname.as_str())
            .collect();
        assert_eq!(sto, ["se-sto-wg-001", "se-sto-wg-002"]);
    }

    #[test]
    fn nested_json_ignores_unknown_fields() {
        let json = r#"{
            "countries": [{
                "name": "Sweden", "code": "se",
                "cities": [{
                    "name": "Gothenburg", "code": "got", "latitude": 57.7, "longitude": 11.9,
                    "relays": [{ "hostname": "se-got-001", "active": true }]
                }]
            }]
        }"#;
        let inventory = RelayInventory::from_json(json).unwrap();
        assert_eq!(inventory.countries[0].cities[0].relays[0].hostname, "se-got-001");
    }

    #[test]
    fn load_missing_file() {
        let err = RelayInventory::load(Path::new("/nonexistent/relays.json"), false).unwrap_err();
        assert!(matches!(err, InventoryError::Read { .. }));
    }
}
