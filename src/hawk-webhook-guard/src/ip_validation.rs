//! Private and reserved IP address classification.
//!
//! Every rule is a base address plus a prefix length. Membership is tested by
//! masking the 32-bit (IPv4) or 128-bit (IPv6) integer form of the candidate,
//! so shorthand and zero-padded notations can never slip past a rule.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// An IPv4 CIDR block of non-public addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Range {
    pub base: Ipv4Addr,
    pub prefix: u8,
    pub label: &'static str,
}

impl Ipv4Range {
    const fn new(base: Ipv4Addr, prefix: u8, label: &'static str) -> Self {
        Self {
            base,
            prefix,
            label,
        }
    }

    fn mask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix))
        }
    }

    /// Check if the range contains an address.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = self.mask();
        (ip.to_bits() & mask) == (self.base.to_bits() & mask)
    }

    /// Lowest address in the range.
    pub fn first(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.base.to_bits() & self.mask())
    }

    /// Highest address in the range.
    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits((self.base.to_bits() & self.mask()) | !self.mask())
    }
}

impl std::fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.base, self.prefix, self.label)
    }
}

/// An IPv6 CIDR block of non-public addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Range {
    pub base: Ipv6Addr,
    pub prefix: u8,
    pub label: &'static str,
}

impl Ipv6Range {
    const fn new(base: Ipv6Addr, prefix: u8, label: &'static str) -> Self {
        Self {
            base,
            prefix,
            label,
        }
    }

    fn mask(&self) -> u128 {
        if self.prefix == 0 {
            0
        } else {
            u128::MAX << (128 - u32::from(self.prefix))
        }
    }

    /// Check if the range contains an address.
    pub fn contains(&self, ip: Ipv6Addr) -> bool {
        let mask = self.mask();
        (ip.to_bits() & mask) == (self.base.to_bits() & mask)
    }

    /// Lowest address in the range.
    pub fn first(&self) -> Ipv6Addr {
        Ipv6Addr::from_bits(self.base.to_bits() & self.mask())
    }

    /// Highest address in the range.
    pub fn last(&self) -> Ipv6Addr {
        Ipv6Addr::from_bits((self.base.to_bits() & self.mask()) | !self.mask())
    }
}

impl std::fmt::Display for Ipv6Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.base, self.prefix, self.label)
    }
}

/// Non-public IPv4 ranges.
pub static IPV4_RULES: &[Ipv4Range] = &[
    Ipv4Range::new(Ipv4Addr::new(0, 0, 0, 0), 8, "this network"), // RFC 1122
    Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 0), 8, "private"),      // RFC 1918
    Ipv4Range::new(Ipv4Addr::new(127, 0, 0, 0), 8, "loopback"),    // RFC 1122
    Ipv4Range::new(Ipv4Addr::new(169, 254, 0, 0), 16, "link-local"), // RFC 3927, cloud metadata
    Ipv4Range::new(Ipv4Addr::new(172, 16, 0, 0), 12, "private"),   // RFC 1918
    Ipv4Range::new(Ipv4Addr::new(192, 168, 0, 0), 16, "private"),  // RFC 1918
    Ipv4Range::new(Ipv4Addr::new(100, 64, 0, 0), 10, "carrier-grade NAT"), // RFC 6598
    Ipv4Range::new(Ipv4Addr::new(255, 255, 255, 255), 32, "broadcast"),
    Ipv4Range::new(Ipv4Addr::new(224, 0, 0, 0), 4, "multicast"), // RFC 5771
    Ipv4Range::new(Ipv4Addr::new(192, 0, 2, 0), 24, "documentation"), // TEST-NET-1
    Ipv4Range::new(Ipv4Addr::new(198, 51, 100, 0), 24, "documentation"), // TEST-NET-2
    Ipv4Range::new(Ipv4Addr::new(203, 0, 113, 0), 24, "documentation"), // TEST-NET-3
    Ipv4Range::new(Ipv4Addr::new(198, 18, 0, 0), 15, "benchmarking"), // RFC 2544
    Ipv4Range::new(Ipv4Addr::new(192, 0, 0, 0), 24, "protocol assignments"), // RFC 6890
    Ipv4Range::new(Ipv4Addr::new(240, 0, 0, 0), 4, "reserved"),  // RFC 1112
];

/// Non-public IPv6 ranges. Addresses carrying an IPv4 address are checked
/// against the IPv4 rules before these are consulted.
pub static IPV6_RULES: &[Ipv6Range] = &[
    Ipv6Range::new(Ipv6Addr::LOCALHOST, 128, "loopback"),
    Ipv6Range::new(Ipv6Addr::UNSPECIFIED, 128, "unspecified"),
    Ipv6Range::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10, "link-local"),
    Ipv6Range::new(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7, "unique local"), // RFC 4193
    Ipv6Range::new(Ipv6Addr::new(0xff00, 0, 0, 0, 0, 0, 0, 0), 8, "multicast"),
    Ipv6Range::new(Ipv6Addr::new(0xfec0, 0, 0, 0, 0, 0, 0, 0), 10, "site-local"), // RFC 3879
    Ipv6Range::new(Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, 0), 32, "documentation"), // RFC 3849
    Ipv6Range::new(Ipv6Addr::new(0x0100, 0, 0, 0, 0, 0, 0, 0), 64, "discard-only"), // RFC 6666
];

/// Strip an IPv6 zone identifier (`%eth0`) from an address string.
pub fn strip_zone_id(address: &str) -> &str {
    address
        .split_once('%')
        .map(|(ip, _)| ip)
        .unwrap_or(address)
}

/// Find the label of the rule an address falls under, `None` if public.
pub fn classify(ip: IpAddr) -> Option<&'static str> {
    match ip {
        IpAddr::V4(v4) => classify_ipv4(v4),
        IpAddr::V6(v6) => classify_ipv6(v6),
    }
}

fn classify_ipv4(ip: Ipv4Addr) -> Option<&'static str> {
    IPV4_RULES
        .iter()
        .find(|rule| rule.contains(ip))
        .map(|rule| rule.label)
}

fn classify_ipv6(ip: Ipv6Addr) -> Option<&'static str> {
    // ::ffff:a.b.c.d and ::a.b.c.d are judged by the IPv4 address alone
    if let Some(v4) = ip.to_ipv4_mapped() {
        return classify_ipv4(v4);
    }
    if let Some(v4) = ipv4_compatible(ip) {
        return classify_ipv4(v4);
    }

    // NAT64 and 6to4 inherit the class of the IPv4 address they carry
    if let Some(label) = tunneled_ipv4(ip).and_then(classify_ipv4) {
        return Some(label);
    }

    IPV6_RULES
        .iter()
        .find(|rule| rule.contains(ip))
        .map(|rule| rule.label)
}

/// Deprecated IPv4-compatible form `::a.b.c.d` (RFC 4291). `::` and `::1`
/// keep their IPv6 meaning.
fn ipv4_compatible(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    let bits = ip.to_bits();
    if bits >> 32 != 0 || bits <= 1 {
        return None;
    }
    let [.., a, b, c, d] = ip.octets();
    Some(Ipv4Addr::new(a, b, c, d))
}

/// IPv4 address carried by a NAT64 (`64:ff9b::/96`, RFC 6052) or 6to4
/// (`2002::/16`, RFC 3056) address.
fn tunneled_ipv4(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    let octets = ip.octets();
    match ip.segments() {
        [0x0064, 0xff9b, 0, 0, 0, 0, _, _] => {
            let [.., a, b, c, d] = octets;
            Some(Ipv4Addr::new(a, b, c, d))
        }
        [0x2002, ..] => Some(Ipv4Addr::new(octets[2], octets[3], octets[4], octets[5])),
        _ => None,
    }
}

/// Check if an IP address is private, reserved or otherwise non-public.
pub fn is_private_ip(ip: IpAddr) -> bool {
    classify(ip).is_some()
}

/// Check if an address string is a private or reserved IP literal.
///
/// Strings that are not IP addresses at all classify as not private.
pub fn is_private(address: &str) -> bool {
    strip_zone_id(address.trim())
        .parse::<IpAddr>()
        .map(is_private_ip)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(s: &str) -> IpAddr {
        IpAddr::V4(s.parse().unwrap())
    }

    #[test]
    fn test_every_rule_covers_both_ends() {
        for rule in IPV4_RULES {
            assert!(is_private_ip(IpAddr::V4(rule.first())), "{rule} first");
            assert!(is_private_ip(IpAddr::V4(rule.last())), "{rule} last");
        }
        for rule in IPV6_RULES {
            assert!(is_private_ip(IpAddr::V6(rule.first())), "{rule} first");
            assert!(is_private_ip(IpAddr::V6(rule.last())), "{rule} last");
        }
    }

    #[test]
    fn test_range_endpoints() {
        let rule = Ipv4Range::new(Ipv4Addr::new(172, 16, 0, 0), 12, "private");
        assert_eq!(rule.first(), Ipv4Addr::new(172, 16, 0, 0));
        assert_eq!(rule.last(), Ipv4Addr::new(172, 31, 255, 255));

        let rule = Ipv6Range::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10, "link-local");
        assert_eq!(rule.last(), "febf:ffff:ffff:ffff:ffff:ffff:ffff:ffff".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn test_ipv4_boundaries() {
        // 172.16.0.0/12
        assert!(!is_private_ip(v4("172.15.255.255")));
        assert!(is_private_ip(v4("172.16.0.0")));
        assert!(is_private_ip(v4("172.31.255.255")));
        assert!(!is_private_ip(v4("172.32.0.0")));

        // 10.0.0.0/8
        assert!(!is_private_ip(v4("9.255.255.255")));
        assert!(is_private_ip(v4("10.0.0.0")));
        assert!(is_private_ip(v4("10.255.255.255")));
        assert!(!is_private_ip(v4("11.0.0.0")));

        // 0.0.0.0/8 and 127.0.0.0/8
        assert!(is_private_ip(v4("0.255.255.255")));
        assert!(!is_private_ip(v4("1.0.0.0")));
        assert!(!is_private_ip(v4("126.255.255.255")));
        assert!(is_private_ip(v4("127.0.0.0")));
        assert!(is_private_ip(v4("127.255.255.255")));
        assert!(!is_private_ip(v4("128.0.0.0")));

        // 169.254.0.0/16
        assert!(!is_private_ip(v4("169.253.255.255")));
        assert!(is_private_ip(v4("169.254.169.254")));
        assert!(!is_private_ip(v4("169.255.0.0")));

        // 192.168.0.0/16
        assert!(!is_private_ip(v4("192.167.255.255")));
        assert!(is_private_ip(v4("192.168.0.0")));
        assert!(!is_private_ip(v4("192.169.0.0")));

        // 100.64.0.0/10
        assert!(!is_private_ip(v4("100.63.255.255")));
        assert!(is_private_ip(v4("100.64.0.0")));
        assert!(is_private_ip(v4("100.127.255.255")));
        assert!(!is_private_ip(v4("100.128.0.0")));

        // 224.0.0.0/4 through 240.0.0.0/4
        assert!(!is_private_ip(v4("223.255.255.255")));
        assert!(is_private_ip(v4("224.0.0.0")));
        assert!(is_private_ip(v4("239.255.255.255")));
        assert!(is_private_ip(v4("255.255.255.255")));

        // Documentation and benchmarking
        assert!(!is_private_ip(v4("192.0.1.255")));
        assert!(is_private_ip(v4("192.0.2.0")));
        assert!(!is_private_ip(v4("192.0.3.0")));
        assert!(!is_private_ip(v4("198.51.99.255")));
        assert!(is_private_ip(v4("198.51.100.255")));
        assert!(!is_private_ip(v4("198.51.101.0")));
        assert!(!is_private_ip(v4("203.0.112.255")));
        assert!(is_private_ip(v4("203.0.113.0")));
        assert!(!is_private_ip(v4("203.0.114.0")));
        assert!(!is_private_ip(v4("198.17.255.255")));
        assert!(is_private_ip(v4("198.18.0.0")));
        assert!(is_private_ip(v4("198.19.255.255")));
        assert!(!is_private_ip(v4("198.20.0.0")));

        // 192.0.0.0/24
        assert!(!is_private_ip(v4("191.255.255.255")));
        assert!(is_private_ip(v4("192.0.0.255")));
        assert!(!is_private_ip(v4("192.0.1.0")));
    }

    #[test]
    fn test_public_ipv4() {
        assert!(!is_private_ip(v4("8.8.8.8")));
        assert!(!is_private_ip(v4("1.1.1.1")));
        assert!(!is_private_ip(v4("93.184.216.34")));
    }

    #[test]
    fn test_ipv6() {
        assert!(is_private("::1"));
        assert!(is_private("::"));
        assert!(is_private("fe80::1"));
        assert!(is_private("febf:ffff::1"));
        assert!(is_private("fc00::1"));
        assert!(is_private("fd12:3456::1"));
        assert!(is_private("ff02::1"));
        assert!(is_private("2001:db8::1"));

        assert!(!is_private("2606:4700:4700::1111"));
        assert!(!is_private("2001:4860:4860::8888"));
        assert!(!is_private("fbff:ffff::1"));
    }

    #[test]
    fn test_ipv4_mapped_ipv6() {
        assert!(is_private("::ffff:127.0.0.1"));
        assert!(is_private("::ffff:10.0.0.1"));
        assert!(is_private("::ffff:169.254.169.254"));
        assert!(!is_private("::ffff:8.8.8.8"));
    }

    #[test]
    fn test_ipv4_compatible_ipv6() {
        assert!(is_private("::127.0.0.1"));
        assert!(is_private("::10.0.0.1"));
        assert!(is_private("::169.254.169.254"));
        assert!(!is_private("::8.8.8.8"));
        assert_eq!(classify("::1".parse().unwrap()), Some("loopback"));
        assert_eq!(classify("::".parse().unwrap()), Some("unspecified"));
    }

    #[test]
    fn test_tunneled_ipv4() {
        // NAT64
        assert!(is_private("64:ff9b::a9fe:a9fe"));
        assert!(is_private("64:ff9b::127.0.0.1"));
        assert!(is_private("64:ff9b::c0a8:101"));
        assert!(!is_private("64:ff9b::808:808"));

        // 6to4
        assert!(is_private("2002:7f00:1::1"));
        assert!(is_private("2002:a9fe:a9fe::"));
        assert!(is_private("2002::1"));
        assert!(!is_private("2002:808:808::1"));

        assert_eq!(classify("2002:c0a8:0101::1".parse().unwrap()), Some("private"));
    }

    #[test]
    fn test_zone_id_stripped() {
        assert_eq!(strip_zone_id("fe80::1%lo0"), "fe80::1");
        assert_eq!(strip_zone_id("10.0.0.1"), "10.0.0.1");
        assert!(is_private("fe80::1%lo0"));
        assert!(is_private("fe80::1%eth0"));
        assert!(!is_private("2001:4860:4860::8888%eth0"));
    }

    #[test]
    fn test_non_addresses_are_not_private() {
        assert!(!is_private("example.com"));
        assert!(!is_private("localhost"));
        assert!(!is_private(""));
        assert!(!is_private("999.1.1.1"));
    }

    #[test]
    fn test_classify_labels() {
        assert_eq!(classify(v4("169.254.169.254")), Some("link-local"));
        assert_eq!(classify(v4("100.100.100.100")), Some("carrier-grade NAT"));
        assert_eq!(classify("::ffff:192.168.1.1".parse().unwrap()), Some("private"));
        assert_eq!(classify(v4("8.8.8.8")), None);
    }
}
