use std::collections::BTreeMap;

use geoclue_api::{Address, CanonicalAddress};

/// Normalise an address to all six fields, empty where absent
pub fn validate_address(address: &Address) -> CanonicalAddress {
    address.canonicalize()
}

/// [`validate_address`] over a loose key/value mapping
///
/// Unknown keys are dropped; the result always has exactly the six address
/// keys.
pub fn validate_address_map<K, V, I>(entries: I) -> BTreeMap<&'static str, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    validate_address(&Address::from_map(entries)).to_map()
}
