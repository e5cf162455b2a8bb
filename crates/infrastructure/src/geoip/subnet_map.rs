//! Subnet-selection tie-break (spec §4.3.1) and the two subnet-map
//! shapes (spec §3 "GeoIP Subnet Maps") it builds: `countrySubnets`
//! (keyed by [`Country`]) and `locationSubnets` (keyed by
//! [`LocationKey`]).

use crate::geoip::location_key::LocationKey;
use ferrous_dns_domain::location::Country;
use ipnetwork::IpNetwork;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// Desired ECS prefix length per address family (spec §3).
pub fn desired_bits(is_v6: bool) -> u8 {
    if is_v6 {
        56
    } else {
        24
    }
}

/// Tracks, for a single map key, the best candidate subnet seen so far
/// by its *original* prefix length (before the final widen/truncate
/// step) so later candidates can be compared against it.
struct Candidate {
    network: IpNetwork,
    bits: u8,
}

/// Builder shared by `resetLocationSubnets` and `resetCountrySubnets`
/// (spec §4.3 `Refresh`): accumulates the best candidate per key, then
/// renders every winner to exactly `desired_bits` wide.
pub struct SubnetMapBuilder<K> {
    desired: u8,
    candidates: FxHashMap<K, Candidate>,
}

impl<K: std::hash::Hash + Eq> SubnetMapBuilder<K> {
    pub fn new(desired: u8) -> Self {
        Self {
            desired,
            candidates: FxHashMap::default(),
        }
    }

    /// Spec §4.3.1 tie-break: with no previous entry, accept iff
    /// `bits <= desired` ("broad enough to be widened"); with a
    /// previous entry, accept iff the candidate is strictly closer to
    /// `desired`.
    pub fn offer(&mut self, key: K, network: IpNetwork, bits: u8) {
        match self.candidates.entry(key) {
            Entry::Vacant(slot) => {
                if bits <= self.desired {
                    slot.insert(Candidate { network, bits });
                }
            }
            Entry::Occupied(mut slot) => {
                let previous_distance = abs_diff(slot.get().bits, self.desired);
                let candidate_distance = abs_diff(bits, self.desired);
                if candidate_distance < previous_distance {
                    slot.insert(Candidate { network, bits });
                }
            }
        }
    }

    /// Renders every accepted candidate to exactly `desired` bits: the
    /// network's address already has zero tail bits beyond its actual
    /// prefix length for `bits <= desired` (so extending the mask to
    /// `desired` is free), and for `bits > desired` the tail bits
    /// between `desired` and `bits` are explicitly zeroed (spec §4.3.1
    /// "widen any subnet narrower than desired to the desired length
    /// zeroing the tail bits").
    pub fn build(self) -> FxHashMap<K, IpNetwork> {
        self.candidates
            .into_iter()
            .map(|(key, candidate)| (key, truncate_to(candidate.network, self.desired)))
            .collect()
    }
}

fn abs_diff(a: u8, b: u8) -> u8 {
    a.abs_diff(b)
}

/// Masks `network`'s address down to its first `desired` bits and
/// reports the network at that prefix length, regardless of whether
/// the original prefix was broader or narrower than `desired`.
pub fn truncate_to(network: IpNetwork, desired: u8) -> IpNetwork {
    match network {
        IpNetwork::V4(v4) => {
            let bits = u32::from(v4.ip());
            let mask: u32 = if desired == 0 {
                0
            } else {
                u32::MAX << (32 - desired as u32)
            };
            let masked = std::net::Ipv4Addr::from(bits & mask);
            IpNetwork::new(std::net::IpAddr::V4(masked), desired)
                .unwrap_or(IpNetwork::V4(v4))
        }
        IpNetwork::V6(v6) => {
            let bits = u128::from(v6.ip());
            let mask: u128 = if desired == 0 {
                0
            } else {
                u128::MAX << (128 - desired as u32)
            };
            let masked = std::net::Ipv6Addr::from(bits & mask);
            IpNetwork::new(std::net::IpAddr::V6(masked), desired)
                .unwrap_or(IpNetwork::V6(v6))
        }
    }
}

/// Zero prefix of the requested family (spec §4.3 `SubnetByLocation`
/// "else the zero prefix of the family").
pub fn zero_prefix(is_v6: bool) -> IpNetwork {
    if is_v6 {
        IpNetwork::new(std::net::IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED), 0).unwrap()
    } else {
        IpNetwork::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 0).unwrap()
    }
}

pub type CountrySubnets = FxHashMap<Country, IpNetwork>;
pub type LocationSubnets = FxHashMap<LocationKey, IpNetwork>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_broad_candidate_seeds_the_key() {
        let mut builder: SubnetMapBuilder<u32> = SubnetMapBuilder::new(24);
        let net: IpNetwork = "10.0.0.0/16".parse().unwrap();
        builder.offer(1, net, 16);
        let map = builder.build();
        let result = map[&1];
        assert_eq!(result.prefix(), 24);
        assert_eq!(result.ip(), "10.0.0.0".parse::<std::net::IpAddr>().unwrap());
    }

    #[test]
    fn narrower_than_desired_is_rejected_as_seed() {
        let mut builder: SubnetMapBuilder<u32> = SubnetMapBuilder::new(24);
        let net: IpNetwork = "10.0.0.0/30".parse().unwrap();
        builder.offer(1, net, 30);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn closer_candidate_replaces_previous() {
        let mut builder: SubnetMapBuilder<u32> = SubnetMapBuilder::new(24);
        builder.offer(1, "10.0.0.0/16".parse().unwrap(), 16);
        builder.offer(1, "10.0.5.0/20".parse().unwrap(), 20);
        let map = builder.build();
        assert_eq!(map[&1].prefix(), 24);
        assert_eq!(map[&1].ip(), "10.0.5.0".parse::<std::net::IpAddr>().unwrap());
    }

    #[test]
    fn farther_candidate_does_not_replace() {
        let mut builder: SubnetMapBuilder<u32> = SubnetMapBuilder::new(24);
        builder.offer(1, "10.0.5.0/20".parse().unwrap(), 20);
        builder.offer(1, "10.0.0.0/16".parse().unwrap(), 16);
        let map = builder.build();
        assert_eq!(map[&1].ip(), "10.0.5.0".parse::<std::net::IpAddr>().unwrap());
    }

    #[test]
    fn truncate_narrower_than_desired_zeroes_tail_bits() {
        let net: IpNetwork = "10.0.0.123/30".parse().unwrap();
        let result = truncate_to(net, 24);
        assert_eq!(result.prefix(), 24);
        assert_eq!(result.ip(), "10.0.0.0".parse::<std::net::IpAddr>().unwrap());
    }
}
