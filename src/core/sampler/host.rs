use sysinfo::System;

/// Static identification of the running OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsIdentity {
    pub os_type: String,
    pub release: String,
    pub arch: String,
}

pub fn sample_uptime() -> u64 {
    System::uptime()
}

pub fn sample_os_identity() -> OsIdentity {
    let release = System::kernel_version().unwrap_or_else(|| {
        log::warn!("Kernel release not reported by the OS");
        "Unknown".to_string()
    });

    OsIdentity {
        os_type: os_type_name(std::env::consts::OS),
        release,
        arch: std::env::consts::ARCH.to_string(),
    }
}

/// Kernel family name in the style of `uname -s`.
pub fn os_type_name(os: &str) -> String {
    match os {
        "linux" | "android" => "Linux".to_string(),
        "windows" => "Windows_NT".to_string(),
        "macos" | "ios" => "Darwin".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Unknown".to_string(),
            }
        }
    }
}
