//! Key type for the `locationSubnets` map (spec §3, §4.3.1).

use ferrous_dns_domain::location::Country;

/// Countries large enough that ECS answers are tailored down to the
/// subdivision, not just the country (spec §3: "for a small set of
/// large countries (e.g., RU, US, CN, IN)").
const SUBDIVISION_TRACKED_COUNTRIES: &[&str] = &["RU", "US", "CN", "IN"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub asn: u32,
    pub country: Country,
    pub subdivision: String,
}

/// Builds a `locationSubnets` key: subdivision is retained only for the
/// closed small set of large countries, else collapsed to
/// `(asn, CountryNone, "")` (spec §4.3 `SubnetByLocation`, §4.3.1).
pub fn new_location_key(asn: u32, country: Country, subdivision: &str) -> LocationKey {
    if SUBDIVISION_TRACKED_COUNTRIES.contains(&country.as_str()) {
        LocationKey {
            asn,
            country,
            subdivision: subdivision.to_string(),
        }
    } else {
        LocationKey {
            asn,
            country: Country::None,
            subdivision: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_subdivision_for_large_countries() {
        let key = new_location_key(7922, Country::parse("US").unwrap(), "CA");
        assert_eq!(key.subdivision, "CA");
        assert_eq!(key.country, Country::parse("US").unwrap());
    }

    #[test]
    fn collapses_subdivision_for_other_countries() {
        let key = new_location_key(3209, Country::parse("DE").unwrap(), "BY");
        assert_eq!(key.subdivision, "");
        assert_eq!(key.country, Country::None);
    }
}
