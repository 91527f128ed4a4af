//! Name-based classification of network interfaces and block devices.
//!
//! Virtual interfaces (loopback, container veth pairs, bridges, overlay
//! tunnels) and pseudo block devices (loop, ram, device-mapper, partitions)
//! are excluded from host totals so traffic is not double counted.
//! Classification looks at nothing but the resource name.

/// Which resource family a classifier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Network,
    Disk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Pattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(exact) => name == exact,
            Pattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

const NETWORK_EXACT_DENY: &[&str] = &["lo"];

const NETWORK_PREFIX_DENY: &[&str] = &[
    "veth",
    "cali",
    "br-",
    "cni",
    "flannel",
    "tun",
    "tap",
    "vlan",
    "vxlan",
    "virbr",
    "kube-ipvs",
    "docker",
    "dummy",
];

const NETWORK_PHYSICAL: &[&str] = &["eth", "en", "em", "wl", "ww", "ib"];

const DISK_PREFIX_DENY: &[&str] = &["loop", "ram", "zram", "dm-", "sr", "fd"];

/// Decides whether a resource counts towards host totals.
#[derive(Debug, Clone)]
pub struct ResourceClassifier {
    kind: ResourceKind,
    deny: Vec<Pattern>,
    physical: Vec<String>,
}

impl ResourceClassifier {
    /// Classifier for network interfaces with the built-in deny and
    /// physical lists.
    pub fn network() -> Self {
        let deny = NETWORK_EXACT_DENY
            .iter()
            .map(|s| Pattern::Exact(s.to_string()))
            .chain(NETWORK_PREFIX_DENY.iter().map(|s| Pattern::Prefix(s.to_string())))
            .collect();
        Self {
            kind: ResourceKind::Network,
            deny,
            physical: NETWORK_PHYSICAL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Classifier for block devices.
    pub fn disk() -> Self {
        Self {
            kind: ResourceKind::Disk,
            deny: DISK_PREFIX_DENY
                .iter()
                .map(|s| Pattern::Prefix(s.to_string()))
                .collect(),
            physical: Vec::new(),
        }
    }

    /// Add prefixes to the deny list, e.g. from configuration.
    pub fn with_denied_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(
            prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .map(Pattern::Prefix),
        );
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// True if the resource contributes to host totals.
    ///
    /// Unknown names are countable.
    pub fn is_countable(&self, name: &str) -> bool {
        if name.is_empty() || self.deny.iter().any(|p| p.matches(name)) {
            return false;
        }
        match self.kind {
            ResourceKind::Network => true,
            ResourceKind::Disk => !is_partition(name),
        }
    }

    /// True if the resource looks like real hardware.
    ///
    /// For network interfaces this requires an allow-list match; unknown
    /// interfaces are countable but not physical. For disks it is the same as
    /// [`is_countable`](Self::is_countable).
    pub fn is_physical(&self, name: &str) -> bool {
        if !self.is_countable(name) {
            return false;
        }
        match self.kind {
            ResourceKind::Network => self.physical.iter().any(|p| name.starts_with(p.as_str())),
            ResourceKind::Disk => true,
        }
    }
}

/// Recognise partition names of common whole-disk naming schemes.
///
/// `sda1`, `vdb2`, `xvda1`, `hdc3` (letters then digits) and
/// `nvme0n1p2`, `mmcblk0p1` (a `p<digits>` suffix after a digit).
fn is_partition(name: &str) -> bool {
    const LETTER_SCHEMES: &[&str] = &["sd", "hd", "vd", "xvd"];
    const NUMBERED_SCHEMES: &[&str] = &["nvme", "mmcblk"];

    if let Some(rest) = LETTER_SCHEMES.iter().find_map(|p| name.strip_prefix(p)) {
        let letters = rest.trim_end_matches(|c: char| c.is_ascii_digit());
        return letters.len() < rest.len()
            && !letters.is_empty()
            && letters.chars().all(|c| c.is_ascii_lowercase());
    }

    if NUMBERED_SCHEMES.iter().any(|p| name.starts_with(p)) {
        let digits = name.trim_end_matches(|c: char| c.is_ascii_digit());
        if digits.len() == name.len() {
            return false;
        }
        if let Some(base) = digits.strip_suffix('p') {
            return base.ends_with(|c: char| c.is_ascii_digit());
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_and_container_interfaces_are_not_countable() {
        let net = ResourceClassifier::network();
        assert!(!net.is_countable("lo"));
        assert!(!net.is_countable("veth1234"));
        assert!(!net.is_countable("docker0"));
        assert!(!net.is_countable("br-3f2a"));
        assert!(!net.is_countable("cali9a8b"));
        assert!(!net.is_countable("flannel.1"));
        assert!(!net.is_countable("kube-ipvs0"));
        assert!(!net.is_countable("vxlan.calico"));
    }

    #[test]
    fn tunnel_interfaces_are_not_countable() {
        let net = ResourceClassifier::network();
        for name in ["tun0", "tunl0", "tap0", "calico.vxlan"] {
            assert!(!net.is_countable(name), "{name}");
        }
    }

    #[test]
    fn default_prefixes_do_not_shadow_each_other() {
        for (i, a) in NETWORK_PREFIX_DENY.iter().enumerate() {
            for b in &NETWORK_PREFIX_DENY[i + 1..] {
                assert!(!a.starts_with(b) && !b.starts_with(a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn physical_interfaces_are_countable() {
        let net = ResourceClassifier::network();
        for name in ["eth0", "ens5", "enp0s3", "em1", "wlan0", "wwan0", "ib0"] {
            assert!(net.is_countable(name), "{name}");
            assert!(net.is_physical(name), "{name}");
        }
    }

    #[test]
    fn lo_is_exact_match_only() {
        let net = ResourceClassifier::network();
        assert!(net.is_countable("lowpan0"));
        assert!(!net.is_physical("lowpan0"));
    }

    #[test]
    fn unknown_interface_is_countable_not_physical() {
        let net = ResourceClassifier::network();
        assert!(net.is_countable("bond0"));
        assert!(!net.is_physical("bond0"));
        assert!(!net.is_countable(""));
    }

    #[test]
    fn configured_prefixes_extend_deny_list() {
        let net = ResourceClassifier::network().with_denied_prefixes(["bond", ""]);
        assert!(!net.is_countable("bond0"));
        assert!(net.is_countable("eth0"));
    }

    #[test]
    fn pseudo_block_devices_are_not_countable() {
        let disk = ResourceClassifier::disk();
        for name in ["loop0", "ram1", "zram0", "dm-0", "sr0", "fd0"] {
            assert!(!disk.is_countable(name), "{name}");
        }
    }

    #[test]
    fn whole_disks_are_countable_partitions_are_not() {
        let disk = ResourceClassifier::disk();
        for name in ["sda", "vdb", "xvda", "nvme0n1", "mmcblk0", "md0"] {
            assert!(disk.is_countable(name), "{name}");
            assert!(disk.is_physical(name), "{name}");
        }
        for name in ["sda1", "vdb12", "xvda1", "nvme0n1p2", "mmcblk0p1"] {
            assert!(!disk.is_countable(name), "{name}");
        }
    }

    #[test]
    fn unknown_disk_is_countable() {
        let disk = ResourceClassifier::disk();
        assert!(disk.is_countable("rbd0"));
        assert_eq!(disk.kind(), ResourceKind::Disk);
    }
}
