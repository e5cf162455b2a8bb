//! GeoIP resolver (spec §4.3): ASN + city MMDB readers, the two pairs
//! of subnet maps built by [`crate::geoip::subnet_map`], and the
//! host/IP LRU caches that keep `Data` off the MMDB hot path.

use crate::geoip::location_key::new_location_key;
use crate::geoip::subnet_map::{
    desired_bits, truncate_to, zero_prefix, CountrySubnets, LocationSubnets, SubnetMapBuilder,
};
use ferrous_dns_application::ports::geoip_port::{AddressFamily, GeoIpPort};
use ferrous_dns_application::ports::metrics_sink::MetricsSinkPort;
use ferrous_dns_domain::config::GeoIpConfig;
use ferrous_dns_domain::errors::CoreError;
use ferrous_dns_domain::location::{Continent, Country, Location};
use ipnetwork::IpNetwork;
use lru::LruCache;
use maxminddb::Reader;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Deserialize, Default)]
struct AsnRecord {
    autonomous_system_number: Option<u32>,
}

#[derive(Deserialize, Default)]
struct IsoCode {
    iso_code: Option<String>,
}

#[derive(Deserialize, Default)]
struct CityRecord {
    country: Option<IsoCode>,
    continent: Option<IsoCode>,
    subdivisions: Option<Vec<IsoCode>>,
}

/// ASN that patches look up instead of the regular selection (spec
/// §4.3 `resetLocationSubnets`: "patch fixed entries, e.g. force
/// AS25159 -> 178.176.72.0/24"). AS25159 (Stack Telecom) announces
/// plenty of transit that otherwise wins a wider, less specific subnet.
const FORCED_LOCATION_PATCHES: &[(u32, &str)] = &[(25159, "178.176.72.0/24")];

struct Readers {
    asn: Reader<Vec<u8>>,
    country: Reader<Vec<u8>>,
}

#[derive(Default)]
struct SubnetMaps {
    location_v4: LocationSubnets,
    location_v6: LocationSubnets,
    country_v4: CountrySubnets,
    country_v6: CountrySubnets,
}

struct Databases {
    readers: Option<Readers>,
    maps: SubnetMaps,
}

impl Default for Databases {
    fn default() -> Self {
        Self {
            readers: None,
            maps: SubnetMaps::default(),
        }
    }
}

pub struct GeoIpResolver {
    config: GeoIpConfig,
    metrics: Arc<dyn MetricsSinkPort>,
    db: RwLock<Databases>,
    host_cache: Mutex<LruCache<String, Location>>,
    ip_cache: Mutex<LruCache<IpNetwork, Location>>,
    country_top_asns: HashMap<String, u32>,
}

impl GeoIpResolver {
    pub fn new(config: GeoIpConfig, metrics: Arc<dyn MetricsSinkPort>) -> Self {
        let host_cap = NonZeroUsize::new(config.host_cache_size.max(1)).unwrap();
        let ip_cap = NonZeroUsize::new(config.ip_cache_size.max(1)).unwrap();
        let country_top_asns = config
            .country_top_asns
            .iter()
            .map(|(country, asn)| (country.clone(), *asn))
            .collect();
        Self {
            config,
            metrics,
            db: RwLock::new(Databases::default()),
            host_cache: Mutex::new(LruCache::new(host_cap)),
            ip_cache: Mutex::new(LruCache::new(ip_cap)),
            country_top_asns,
        }
    }

    /// Spec §4.3 `Refresh`: reads both MMDB files, sanity-checks each
    /// reader, builds both subnet-map pairs concurrently, then swaps
    /// everything in under a single write-lock hold. All-or-nothing:
    /// a failure at any stage leaves prior state untouched.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let start = Instant::now();
        let result = self.refresh_inner().await;
        match &result {
            Ok(()) => {
                self.metrics.observe_geoip_refresh_success(start.elapsed());
                info!(elapsed = ?start.elapsed(), "geoip refresh completed");
            }
            Err(err) => {
                self.metrics.observe_geoip_refresh_failure();
                warn!(error = %err, "geoip refresh failed");
            }
        }
        result
    }

    async fn refresh_inner(&self) -> Result<(), CoreError> {
        let asn_path = self.config.asn_db_path.clone();
        let country_path = self.config.country_db_path.clone();

        let asn_reader = tokio::task::spawn_blocking(move || Reader::open_readfile(&asn_path))
            .await
            .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?
            .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;
        let country_reader =
            tokio::task::spawn_blocking(move || Reader::open_readfile(&country_path))
                .await
                .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?
                .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;

        sanity_check(&asn_reader)?;
        sanity_check(&country_reader)?;

        let all_top_asns: std::collections::HashSet<u32> =
            self.config.all_top_asns.iter().copied().collect();

        let (location_maps, country_maps) = tokio::join!(
            reset_location_subnets(&asn_reader, &country_reader, &all_top_asns),
            reset_country_subnets(&country_reader)
        );
        let (location_v4, location_v6) = location_maps?;
        let (country_v4, country_v6) = country_maps?;

        let mut db = self.db.write().unwrap_or_else(|e| e.into_inner());
        db.readers = Some(Readers {
            asn: asn_reader,
            country: country_reader,
        });
        db.maps = SubnetMaps {
            location_v4,
            location_v6,
            country_v4,
            country_v6,
        };
        drop(db);

        self.host_cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.ip_cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }
}

/// Spec §4.3 `Refresh`: "sanity-check each reader with a lookup on
/// 0.0.0.0" — a malformed database fails to decode even the
/// placeholder record.
fn sanity_check(reader: &Reader<Vec<u8>>) -> Result<(), CoreError> {
    reader
        .lookup::<AsnRecord>(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;
    Ok(())
}

async fn reset_location_subnets(
    asn_reader: &Reader<Vec<u8>>,
    country_reader: &Reader<Vec<u8>>,
    all_top_asns: &std::collections::HashSet<u32>,
) -> Result<(LocationSubnets, LocationSubnets), CoreError> {
    let mut v4 = SubnetMapBuilder::new(desired_bits(false));
    let mut v6 = SubnetMapBuilder::new(desired_bits(true));

    for family_is_v6 in [false, true] {
        let cidr = if family_is_v6 {
            "::/0".parse().unwrap()
        } else {
            "0.0.0.0/0".parse().unwrap()
        };
        let within = asn_reader
            .within::<AsnRecord>(cidr)
            .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;
        for item in within {
            let item = item.map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;
            let Some(asn) = item.info.autonomous_system_number else {
                continue;
            };
            if !all_top_asns.contains(&asn) {
                continue;
            }
            let network = item.ip_net;
            let bits = network.prefix();

            let ip = network.ip();
            let (country, subdivision) = lookup_country_and_subdivision(country_reader, ip);
            let key = new_location_key(asn, country, &subdivision);
            if family_is_v6 {
                v6.offer(key, network, bits);
            } else {
                v4.offer(key, network, bits);
            }
        }
    }

    let mut location_v4 = v4.build();
    let mut location_v6 = v6.build();
    apply_forced_patches(&mut location_v4);
    apply_forced_patches(&mut location_v6);
    Ok((location_v4, location_v6))
}

fn apply_forced_patches(map: &mut LocationSubnets) {
    for (asn, cidr) in FORCED_LOCATION_PATCHES {
        let Ok(forced): Result<IpNetwork, _> = cidr.parse() else {
            continue;
        };
        for (key, network) in map.iter_mut() {
            if key.asn == *asn {
                *network = forced;
            }
        }
    }
}

async fn reset_country_subnets(
    country_reader: &Reader<Vec<u8>>,
) -> Result<(CountrySubnets, CountrySubnets), CoreError> {
    let mut v4 = SubnetMapBuilder::new(desired_bits(false));
    let mut v6 = SubnetMapBuilder::new(desired_bits(true));

    for family_is_v6 in [false, true] {
        let cidr = if family_is_v6 {
            "::/0".parse().unwrap()
        } else {
            "0.0.0.0/0".parse().unwrap()
        };
        let within = country_reader
            .within::<CityRecord>(cidr)
            .map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;
        for item in within {
            let item = item.map_err(|e| CoreError::GeoIpRefresh(e.to_string()))?;
            let Some(iso) = item.info.country.as_ref().and_then(|c| c.iso_code.clone()) else {
                continue;
            };
            let Ok(country) = Country::parse(&iso) else {
                continue;
            };
            let network = item.ip_net;
            let bits = network.prefix();
            if family_is_v6 {
                v6.offer(country, network, bits);
            } else {
                v4.offer(country, network, bits);
            }
        }
    }

    Ok((v4.build(), v6.build()))
}

fn lookup_country_and_subdivision(
    country_reader: &Reader<Vec<u8>>,
    ip: IpAddr,
) -> (Country, String) {
    match country_reader.lookup::<CityRecord>(ip) {
        Ok(Some(record)) => {
            let country = record
                .country
                .as_ref()
                .and_then(|c| c.iso_code.as_deref())
                .and_then(|code| Country::parse(code).ok())
                .unwrap_or(Country::None);
            let subdivision = record
                .subdivisions
                .as_ref()
                .and_then(|subs| subs.first())
                .and_then(|s| s.iso_code.clone())
                .unwrap_or_default();
            (country, subdivision)
        }
        _ => (Country::None, String::new()),
    }
}

fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

fn ip_cache_key(ip: IpAddr) -> IpNetwork {
    let is_v6 = matches!(ip, IpAddr::V6(_));
    let net = IpNetwork::new(ip, if is_v6 { 128 } else { 32 }).unwrap();
    truncate_to(net, desired_bits(is_v6))
}

fn is_zero(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4 == Ipv4Addr::UNSPECIFIED,
        IpAddr::V6(v6) => v6 == Ipv6Addr::UNSPECIFIED,
    }
}

impl GeoIpPort for GeoIpResolver {
    fn data(&self, host: &str, ip: IpAddr) -> Result<Option<Location>, CoreError> {
        if is_zero(ip) {
            let mut cache = self.host_cache.lock().unwrap_or_else(|e| e.into_inner());
            return Ok(cache.get(host).cloned());
        }

        let ip = normalize(ip);
        let key = ip_cache_key(ip);
        {
            let mut cache = self.ip_cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(&key) {
                return Ok(Some(hit.clone()));
            }
        }

        let db = self.db.read().unwrap_or_else(|e| e.into_inner());
        let Some(readers) = db.readers.as_ref() else {
            return Ok(None);
        };

        let asn = readers
            .asn
            .lookup::<AsnRecord>(ip)
            .map_err(|e| CoreError::GeoIpLookup(e.to_string()))?
            .and_then(|r| r.autonomous_system_number)
            .unwrap_or(0);

        let city = readers
            .country
            .lookup::<CityRecord>(ip)
            .map_err(|e| CoreError::GeoIpLookup(e.to_string()))?;

        let (country, continent, subdivision) = match city {
            Some(record) => {
                let country_code = record
                    .country
                    .as_ref()
                    .and_then(|c| c.iso_code.as_deref())
                    .unwrap_or("");
                let continent_code = record
                    .continent
                    .as_ref()
                    .and_then(|c| c.iso_code.as_deref())
                    .unwrap_or("");
                let subdivision = record
                    .subdivisions
                    .as_ref()
                    .and_then(|s| s.first())
                    .and_then(|s| s.iso_code.clone())
                    .unwrap_or_default();
                let country = Country::parse(country_code)
                    .map_err(|e| CoreError::GeoIpLookup(e.to_string()))?;
                let continent = Continent::parse(continent_code)
                    .map_err(|e| CoreError::GeoIpLookup(e.to_string()))?;
                (country, continent, subdivision)
            }
            None => (Country::None, Continent::None, String::new()),
        };
        drop(db);

        let location = Location {
            country,
            continent,
            asn,
            top_subdivision: subdivision,
        };

        {
            let mut cache = self.ip_cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.put(key, location.clone());
        }
        if !host.is_empty() {
            let mut cache = self.host_cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.put(host.to_string(), location.clone());
        }

        Ok(Some(location))
    }

    fn subnet_by_location(&self, location: &Location, family: AddressFamily) -> IpNetwork {
        let is_v6 = matches!(family, AddressFamily::V6);
        let db = self.db.read().unwrap_or_else(|e| e.into_inner());
        let (location_map, country_map) = if is_v6 {
            (&db.maps.location_v6, &db.maps.country_v6)
        } else {
            (&db.maps.location_v4, &db.maps.country_v4)
        };

        let key = new_location_key(location.asn, location.country, &location.top_subdivision);
        if let Some(net) = location_map.get(&key) {
            return *net;
        }

        if let Some(&top_asn) = self.country_top_asns.get(location.country.as_str()) {
            let fallback_key = new_location_key(top_asn, Country::None, "");
            if let Some(net) = location_map.get(&fallback_key) {
                return *net;
            }
        }

        if let Some(net) = country_map.get(&location.country) {
            return *net;
        }

        zero_prefix(is_v6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopMetrics;
    impl MetricsSinkPort for NoopMetrics {
        fn observe_request(&self, _metrics: &ferrous_dns_application::ports::metrics_sink::RequestMetrics) {}
        fn set_dnsdb_record_count(&self, _count: usize) {}
        fn observe_dnsdb_rotation(&self, _duration: std::time::Duration) {}
        fn observe_geoip_refresh_failure(&self) {}
        fn observe_geoip_refresh_success(&self, _duration: std::time::Duration) {}
        fn observe_query_log_bytes_written(&self, _bytes: usize) {}
    }

    fn resolver() -> GeoIpResolver {
        GeoIpResolver::new(GeoIpConfig::default(), Arc::new(NoopMetrics))
    }

    #[test]
    fn zero_ip_with_empty_host_cache_returns_none() {
        let r = resolver();
        assert!(r.data("unseen.example.com", Ipv4Addr::UNSPECIFIED.into()).unwrap().is_none());
    }

    #[test]
    fn missing_readers_return_none_for_nonzero_ip() {
        let r = resolver();
        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        assert!(r.data("dns.google", ip).unwrap().is_none());
    }

    #[test]
    fn subnet_by_location_falls_back_to_zero_prefix() {
        let r = resolver();
        let location = Location {
            country: Country::parse("US").unwrap(),
            continent: Continent::None,
            asn: 15169,
            top_subdivision: String::new(),
        };
        let net = r.subnet_by_location(&location, AddressFamily::V4);
        assert_eq!(net.prefix(), 0);
    }

    #[test]
    fn ip_cache_key_truncates_v4_to_slash_24() {
        let ip: IpAddr = "203.0.113.77".parse().unwrap();
        let key = ip_cache_key(ip);
        assert_eq!(key.prefix(), 24);
        assert_eq!(key.ip(), "203.0.113.0".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn normalize_maps_v4_in_v6_down_to_v4() {
        let mapped: IpAddr = "::ffff:1.2.3.4".parse().unwrap();
        assert_eq!(normalize(mapped), "1.2.3.4".parse::<IpAddr>().unwrap());
    }
}
