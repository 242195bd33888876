use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Describes the machine a session was registered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub browser: String,
    pub os: String,
    pub device_name: String,
    pub device_type: String,
    pub device_model: String,
    pub fingerprint: String,
}

impl DeviceInfo {
    /// Describe the current host.
    pub fn detect() -> Self {
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| "Unknown".to_string());
        Self::from_parts(
            std::env::consts::OS,
            std::env::consts::ARCH,
            &host,
        )
    }

    pub fn from_parts(os: &str, arch: &str, host: &str) -> Self {
        let browser = format!("namecard/{}", env!("CARGO_PKG_VERSION"));
        let fingerprint = fingerprint(&[os, arch, host]);
        Self {
            browser,
            os: os.to_string(),
            device_name: host.to_string(),
            device_type: "desktop".to_string(),
            device_model: arch.to_string(),
            fingerprint,
        }
    }
}

/// Stable 32-hex-char identifier derived from the given parts.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_sized() {
        let a = fingerprint(&["linux", "x86_64", "box"]);
        let b = fingerprint(&["linux", "x86_64", "box"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_separates_parts() {
        assert_ne!(fingerprint(&["ab", "c"]), fingerprint(&["a", "bc"]));
    }

    #[test]
    fn from_parts_fills_fields() {
        let info = DeviceInfo::from_parts("macos", "aarch64", "studio");
        assert_eq!(info.os, "macos");
        assert_eq!(info.device_name, "studio");
        assert_eq!(info.device_model, "aarch64");
        assert_eq!(info.device_type, "desktop");
        assert!(info.browser.starts_with("namecard/"));
        assert_eq!(info.fingerprint, fingerprint(&["macos", "aarch64", "studio"]));
    }

    #[test]
    fn detect_uses_host_os() {
        assert_eq!(DeviceInfo::detect().os, std::env::consts::OS);
    }
}
