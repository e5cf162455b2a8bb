use crate::errors::CoreError;

/// ISO-3166-1 alpha-2 country code, closed over a representative set plus
/// the two sentinels spec §3 calls for. Not exhaustive over the full
/// registry — unknown-but-plausible two-letter codes are rejected the
/// same as garbage input, per "validate... via closed enumerations
/// (unknown → typed error)" (spec §4.3). See DESIGN.md for why the set
/// below, not all ~249 ISO entries, was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
    Code([u8; 2]),
    /// GeoIP had nothing for this IP.
    None,
    /// Not meaningful in context (e.g. response rcode != NOERROR).
    NotApplicable,
}

const KNOWN_COUNTRIES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AR", "AT", "AU", "AZ", "BA", "BB", "BD", "BE",
    "BG", "BH", "BN", "BO", "BR", "BS", "BY", "BZ", "CA", "CH", "CL", "CN", "CO", "CR", "CU", "CY",
    "CZ", "DE", "DK", "DO", "DZ", "EC", "EE", "EG", "ES", "ET", "FI", "FJ", "FR", "GB", "GE", "GH",
    "GR", "GT", "HK", "HN", "HR", "HU", "ID", "IE", "IL", "IN", "IQ", "IR", "IS", "IT", "JM", "JO",
    "JP", "KE", "KG", "KH", "KR", "KW", "KZ", "LA", "LB", "LK", "LT", "LU", "LV", "LY", "MA", "MC",
    "MD", "MX", "MY", "NG", "NI", "NL", "NO", "NP", "NZ", "OM", "PA", "PE", "PH", "PK", "PL", "PT",
    "PY", "QA", "RO", "RS", "RU", "SA", "SE", "SG", "SI", "SK", "SV", "SY", "TH", "TN", "TR", "TW",
    "TZ", "UA", "UG", "US", "UY", "UZ", "VE", "VN", "YE", "ZA", "ZM", "ZW",
];

impl Country {
    /// Parses a two-letter ISO code, rejecting anything not in the known
    /// set. Case-insensitive; result is always upper-cased bytes.
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        if code.is_empty() {
            return Ok(Country::None);
        }
        let upper = code.to_ascii_uppercase();
        if upper.len() != 2 || !upper.is_ascii() {
            return Err(CoreError::InvalidCountryCode(code.to_string()));
        }
        if !KNOWN_COUNTRIES.contains(&upper.as_str()) {
            return Err(CoreError::InvalidCountryCode(code.to_string()));
        }
        let bytes = upper.as_bytes();
        Ok(Country::Code([bytes[0], bytes[1]]))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Country::Code(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
            Country::None | Country::NotApplicable => "",
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Country::Code(_))
    }
}

impl Default for Country {
    fn default() -> Self {
        Country::None
    }
}

/// Closed continent-code enumeration (seven continents, two-letter
/// MaxMind-style codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continent {
    Af,
    An,
    As,
    Eu,
    Na,
    Oc,
    Sa,
    None,
}

impl Continent {
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        if code.is_empty() {
            return Ok(Continent::None);
        }
        match code.to_ascii_uppercase().as_str() {
            "AF" => Ok(Continent::Af),
            "AN" => Ok(Continent::An),
            "AS" => Ok(Continent::As),
            "EU" => Ok(Continent::Eu),
            "NA" => Ok(Continent::Na),
            "OC" => Ok(Continent::Oc),
            "SA" => Ok(Continent::Sa),
            _ => Err(CoreError::InvalidContinentCode(code.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Af => "AF",
            Continent::An => "AN",
            Continent::As => "AS",
            Continent::Eu => "EU",
            Continent::Na => "NA",
            Continent::Oc => "OC",
            Continent::Sa => "SA",
            Continent::None => "",
        }
    }
}

impl Default for Continent {
    fn default() -> Self {
        Continent::None
    }
}

/// `{Country, Continent, ASN, TopSubdivision}` per spec §3. `asn == 0` is
/// the "unknown ASN" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub country: Country,
    pub continent: Continent,
    pub asn: u32,
    pub top_subdivision: String,
}

impl Location {
    pub fn not_applicable() -> Self {
        Self {
            country: Country::NotApplicable,
            ..Default::default()
        }
    }

    pub fn has_asn(&self) -> bool {
        self.asn != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_country() {
        assert_eq!(Country::parse("us").unwrap(), Country::Code(*b"US"));
    }

    #[test]
    fn rejects_unknown_country() {
        assert!(Country::parse("zz").is_err());
    }

    #[test]
    fn empty_country_is_none() {
        assert_eq!(Country::parse("").unwrap(), Country::None);
    }

    #[test]
    fn continent_roundtrip() {
        let c = Continent::parse("eu").unwrap();
        assert_eq!(c.as_str(), "EU");
    }

    #[test]
    fn location_not_applicable_has_no_asn() {
        let loc = Location::not_applicable();
        assert!(!loc.has_asn());
        assert_eq!(loc.country, Country::NotApplicable);
    }
}
