//! Static host identity read once through `sysinfo`.

use sysinfo::System;

use crate::{NOT_AVAILABLE, SystemInfo};

impl SystemInfo {
    /// Query the running host. Fields that cannot be read are `N/A`.
    pub fn from_host() -> Self {
        let sysname = System::name();
        Self {
            hostname: or_not_available(System::host_name()),
            uptime_secs: System::uptime() as f64,
            os: or_not_available(System::long_os_version().or_else(|| sysname.clone())),
            kernel: or_not_available(System::kernel_version()),
            machine: or_not_available(System::cpu_arch()),
            sysname: or_not_available(sysname),
        }
    }
}

/// Unwrap a host reading, substituting `N/A` for missing or blank values.
fn or_not_available(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
