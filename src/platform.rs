//! Platform classification for per-host dispatch decisions
//!
//! Host descriptors arrive as opaque strings like "el-7-x86_64-server".
//! Classification happens once per call site and produces a closed
//! (family, major version) pair that downstream consumers match on
//! exhaustively, instead of re-running ad hoc string patterns.

use crate::types::PlatformFamily;

/// Normalized (family, major version) pair for one host
///
/// `version` is None when the descriptor's version field is non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedPlatform {
    pub family: PlatformFamily,
    pub version: Option<u32>,
}

/// Classify a raw platform descriptor.
///
/// The descriptor has four dash-separated fields; only the family and
/// version fields matter for dispatch (architecture and variant are
/// irrelevant). Unrecognized families map to [`PlatformFamily::Other`];
/// consumers are expected to warn and skip, never fail the run.
pub fn classify(descriptor: &str) -> ClassifiedPlatform {
    let mut fields = descriptor.splitn(4, '-');
    let family = match fields.next().unwrap_or("") {
        "fedora" => PlatformFamily::Fedora,
        "el" | "centos" => PlatformFamily::El,
        "debian" => PlatformFamily::Debian,
        "ubuntu" => PlatformFamily::Ubuntu,
        _ => PlatformFamily::Other,
    };
    let version = fields.next().and_then(|v| v.parse::<u32>().ok());
    ClassifiedPlatform { family, version }
}

/// QuarryDB development packages cover fewer platforms than Quarry Server's.
/// This gates both installing the QuarryDB package repository and running the
/// QuarryDB tests.
pub fn quarrydb_supported(platform: &ClassifiedPlatform) -> bool {
    match (platform.family, platform.version) {
        (PlatformFamily::El, _) => true,
        (PlatformFamily::Debian, Some(7 | 8)) => true,
        (PlatformFamily::Ubuntu, Some(12 | 14)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_el() {
        let p = classify("el-7-x86_64-foo");
        assert_eq!(p.family, PlatformFamily::El);
        assert_eq!(p.version, Some(7));
    }

    #[test]
    fn test_classify_centos_maps_to_el() {
        let p = classify("centos-6-i386-server");
        assert_eq!(p.family, PlatformFamily::El);
        assert_eq!(p.version, Some(6));
    }

    #[test]
    fn test_classify_ubuntu() {
        let p = classify("ubuntu-14-amd64-x");
        assert_eq!(p.family, PlatformFamily::Ubuntu);
        assert_eq!(p.version, Some(14));
    }

    #[test]
    fn test_classify_unknown_family() {
        let p = classify("windows-2016-x64-x");
        assert_eq!(p.family, PlatformFamily::Other);
        assert_eq!(p.version, Some(2016));
    }

    #[test]
    fn test_classify_non_numeric_version() {
        let p = classify("debian-sid-amd64-x");
        assert_eq!(p.family, PlatformFamily::Debian);
        assert_eq!(p.version, None);
    }

    #[test]
    fn test_classify_short_descriptor() {
        let p = classify("fedora");
        assert_eq!(p.family, PlatformFamily::Fedora);
        assert_eq!(p.version, None);

        let p = classify("");
        assert_eq!(p.family, PlatformFamily::Other);
        assert_eq!(p.version, None);
    }

    #[test]
    fn test_quarrydb_platform_gate() {
        assert!(quarrydb_supported(&classify("el-6-x86_64-x")));
        assert!(quarrydb_supported(&classify("el-7-x86_64-x")));
        assert!(quarrydb_supported(&classify("debian-8-amd64-x")));
        assert!(quarrydb_supported(&classify("ubuntu-14-amd64-x")));
        assert!(!quarrydb_supported(&classify("ubuntu-16-amd64-x")));
        assert!(!quarrydb_supported(&classify("debian-9-amd64-x")));
        assert!(!quarrydb_supported(&classify("fedora-23-x86_64-x")));
        assert!(!quarrydb_supported(&classify("windows-2016-x64-x")));
    }
}
