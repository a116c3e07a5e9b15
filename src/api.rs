//! Flat relay list, as served by the Mullvad API.
//!
//! Relays point at a location key (e.g. `"se-got"`) and the `locations` map
//! holds the country and city names for each key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Location {
    pub country: String,
    pub city: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RelayList {
    pub locations: BTreeMap<String, Location>,
    pub wireguard: WireguardList,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WireguardList {
    pub relays: Vec<Relay>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Relay {
    pub hostname: String,
    pub location: String,
}

/// Split a location key like `"se-got"` into its country and city codes.
pub fn split_location_key(key: &str) -> Option<(&str, &str)> {
    let (country, city) = key.split_once('-')?;
    if country.is_empty() || city.is_empty() {
        return None;
    }
    Some((country, city))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_key() {
        assert_eq!(split_location_key("se-got"), Some(("se", "got")));
        assert_eq!(split_location_key("us-nyc"), Some(("us", "nyc")));
        assert_eq!(split_location_key("se"), None);
        assert_eq!(split_location_key("-got"), None);
    }

    #[test]
    fn parse_api_relay_list() {
        let json = r#"{
            "locations": { "se-got": { "country": "Sweden", "city": "Gothenburg" } },
            "wireguard": { "relays": [ { "hostname": "se-got-wg-001", "location": "se-got" } ] }
        }"#;
        let list: RelayList = serde_json::from_str(json).unwrap();
        assert_eq!(list.locations["se-got"].city, "Gothenburg");
        assert_eq!(list.wireguard.relays[0].hostname, "se-got-wg-001");
    }
}
