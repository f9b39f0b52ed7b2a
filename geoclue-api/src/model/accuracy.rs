use serde::{Deserialize, Serialize};

/// Coarse accuracy levels, from nothing known to a street-level fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum AccuracyLevel {
    #[default]
    None = 0,
    Country = 1,
    Region = 2,
    Locality = 3,
    PostalCode = 4,
    Street = 5,
    Detailed = 6,
}

impl AccuracyLevel {
    /// Map a wire value to a level. Values outside the known range yield `None`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => AccuracyLevel::Country,
            2 => AccuracyLevel::Region,
            3 => AccuracyLevel::Locality,
            4 => AccuracyLevel::PostalCode,
            5 => AccuracyLevel::Street,
            6 => AccuracyLevel::Detailed,
            _ => AccuracyLevel::None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Parse a level name such as `"locality"` or `"postal-code"`
    pub fn from_name(name: &str) -> Option<Self> {
        let level = match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => AccuracyLevel::None,
            "country" => AccuracyLevel::Country,
            "region" => AccuracyLevel::Region,
            "locality" => AccuracyLevel::Locality,
            "postal-code" | "postalcode" => AccuracyLevel::PostalCode,
            "street" => AccuracyLevel::Street,
            "detailed" => AccuracyLevel::Detailed,
            _ => return None,
        };
        Some(level)
    }
}

/// Accuracy attached to every address or position reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Accuracy {
    pub level: AccuracyLevel,
    /// Horizontal accuracy in meters
    pub horizontal: f64,
    /// Vertical accuracy in meters
    pub vertical: f64,
}

impl Accuracy {
    pub fn new(level: AccuracyLevel, horizontal: f64, vertical: f64) -> Self {
        Self {
            level,
            horizontal,
            vertical,
        }
    }

    /// Build from the `(idd)` struct carried on the bus
    pub fn from_wire((level, horizontal, vertical): (i32, f64, f64)) -> Self {
        Self::new(AccuracyLevel::from_raw(level), horizontal, vertical)
    }

    pub fn to_wire(&self) -> (i32, f64, f64) {
        (self.level.as_raw(), self.horizontal, self.vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, AccuracyLevel::None)]
    #[case(3, AccuracyLevel::Locality)]
    #[case(6, AccuracyLevel::Detailed)]
    #[case(7, AccuracyLevel::None)]
    #[case(-1, AccuracyLevel::None)]
    fn test_level_from_raw(#[case] raw: i32, #[case] expected: AccuracyLevel) {
        assert_eq!(AccuracyLevel::from_raw(raw), expected);
    }

    #[rstest]
    #[case("Locality", Some(AccuracyLevel::Locality))]
    #[case("postal_code", Some(AccuracyLevel::PostalCode))]
    #[case(" street ", Some(AccuracyLevel::Street))]
    #[case("planet", None)]
    fn test_level_from_name(#[case] name: &str, #[case] expected: Option<AccuracyLevel>) {
        assert_eq!(AccuracyLevel::from_name(name), expected);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(AccuracyLevel::Country < AccuracyLevel::Street);
        assert!(AccuracyLevel::Detailed > AccuracyLevel::PostalCode);
    }

    #[test]
    fn test_accuracy_wire_form() {
        let acc = Accuracy::from_wire((5, 12.5, 0.0));
        assert_eq!(acc.level, AccuracyLevel::Street);
        assert_eq!(acc.to_wire(), (5, 12.5, 0.0));
    }
}
