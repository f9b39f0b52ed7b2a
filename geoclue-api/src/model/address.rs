use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::Accuracy;

/// Wire keys for the address mapping
pub const STREET: &str = "street";
pub const AREA: &str = "area";
pub const LOCALITY: &str = "locality";
pub const REGION: &str = "region";
pub const COUNTRY: &str = "country";
pub const COUNTRY_CODE: &str = "countrycode";

/// Every key an address mapping may carry
pub const ADDRESS_KEYS: [&str; 6] = [STREET, AREA, LOCALITY, REGION, COUNTRY, COUNTRY_CODE];

/// A postal address as reported by a provider
///
/// Providers fill in as much as they know, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub area: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl Address {
    /// Build from a key/value mapping. Keys outside [`ADDRESS_KEYS`] are ignored.
    pub fn from_map<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut address = Address::default();
        for (key, value) in entries {
            if let Some(slot) = address.field_mut(key.as_ref()) {
                *slot = Some(value.into());
            }
        }
        address
    }

    /// Mapping holding only the fields that are present
    pub fn to_map(&self) -> HashMap<String, String> {
        ADDRESS_KEYS
            .iter()
            .filter_map(|key| {
                self.field(key)
                    .map(|value| ((*key).to_string(), value.to_string()))
            })
            .collect()
    }

    /// Overwrite the fields that `other` carries, keep the rest
    pub fn merge(&mut self, other: &Address) {
        for key in ADDRESS_KEYS {
            if let Some(value) = other.field(key) {
                if let Some(slot) = self.field_mut(key) {
                    *slot = Some(value.to_string());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        ADDRESS_KEYS.iter().all(|key| self.field(key).is_none())
    }

    /// Look up a field by its wire key
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            STREET => &self.street,
            AREA => &self.area,
            LOCALITY => &self.locality,
            REGION => &self.region,
            COUNTRY => &self.country,
            COUNTRY_CODE => &self.country_code,
            _ => return None,
        };
        value.as_deref()
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            STREET => Some(&mut self.street),
            AREA => Some(&mut self.area),
            LOCALITY => Some(&mut self.locality),
            REGION => Some(&mut self.region),
            COUNTRY => Some(&mut self.country),
            COUNTRY_CODE => Some(&mut self.country_code),
            _ => None,
        }
    }

    /// Fill every absent field with an empty string
    pub fn canonicalize(&self) -> CanonicalAddress {
        let get = |value: &Option<String>| value.clone().unwrap_or_default();
        CanonicalAddress {
            street: get(&self.street),
            area: get(&self.area),
            locality: get(&self.locality),
            region: get(&self.region),
            country: get(&self.country),
            country_code: get(&self.country_code),
        }
    }
}

/// An address with all six fields present, empty where unknown
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalAddress {
    pub street: String,
    pub area: String,
    pub locality: String,
    pub region: String,
    pub country: String,
    pub country_code: String,
}

impl CanonicalAddress {
    /// Mapping with exactly the six address keys
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (STREET, self.street.clone()),
            (AREA, self.area.clone()),
            (LOCALITY, self.locality.clone()),
            (REGION, self.region.clone()),
            (COUNTRY, self.country.clone()),
            (COUNTRY_CODE, self.country_code.clone()),
        ])
    }
}

impl From<CanonicalAddress> for Address {
    fn from(canonical: CanonicalAddress) -> Self {
        Address {
            street: Some(canonical.street),
            area: Some(canonical.area),
            locality: Some(canonical.locality),
            region: Some(canonical.region),
            country: Some(canonical.country),
            country_code: Some(canonical.country_code),
        }
    }
}

/// One `GetAddress` reply or `AddressChanged` notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressUpdate {
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub address: Address,
    pub accuracy: Accuracy,
}

impl AddressUpdate {
    pub fn from_wire(
        timestamp: i32,
        fields: HashMap<String, String>,
        accuracy: (i32, f64, f64),
    ) -> Self {
        Self {
            timestamp: i64::from(timestamp),
            address: Address::from_map(fields),
            accuracy: Accuracy::from_wire(accuracy),
        }
    }
}
