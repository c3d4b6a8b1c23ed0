//! Collection of the machine attributes that feed the fingerprint.

use serde::{Deserialize, Serialize};
use std::env;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::probe;

/// A flat snapshot of the attributes that identify this machine.
///
/// The field set is deliberately wide: no single attribute is reliable
/// on every platform, but their combination is stable in practice.
/// Volatile-looking attributes (total RAM, logical CPU count) are
/// assumed constant per machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Human-readable platform descriptor, e.g. `"Ubuntu 24.04.1 LTS"`.
    pub platform: String,
    /// OS family, e.g. `"linux"`.
    pub system: String,
    /// Node name as reported by the hostname facility.
    pub node: String,
    /// Kernel release.
    pub release: String,
    /// OS version.
    pub version: String,
    /// CPU architecture, e.g. `"x86_64"`.
    pub machine: String,
    /// CPU brand string.
    pub processor: String,
    /// Logical CPU count.
    pub cpu_count: usize,
    /// Total RAM in bytes.
    pub total_ram: u64,
    /// MAC address of a network interface, or a derived pseudo-MAC.
    pub mac_address: String,
    /// CPU serial or platform identifier, or a derived digest.
    pub cpu_id: String,
    /// Primary disk serial; random (process-cached) when the probe fails.
    pub disk_serial: String,
    /// Machine hostname.
    pub hostname: String,
    /// Fully-qualified domain name, falling back to the bare hostname.
    pub fqdn: String,
}

impl SystemInfo {
    /// Collects the current machine's attributes.
    ///
    /// Every probe is best-effort: a failing platform command degrades
    /// to a fallback value rather than an error, so collection always
    /// succeeds.
    #[must_use]
    pub fn collect() -> Self {
        let refresh = RefreshKind::new()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());
        let sys = System::new_with_specifics(refresh);

        let processor = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();
        let cpu_count = sys.cpus().len();
        let hostname = get_hostname();

        Self {
            platform: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            system: env::consts::OS.to_string(),
            node: hostname.clone(),
            release: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            machine: env::consts::ARCH.to_string(),
            cpu_count,
            total_ram: sys.total_memory(),
            mac_address: probe::probe_mac_address(),
            cpu_id: probe::probe_cpu_id(&processor, cpu_count),
            disk_serial: probe::probe_disk_serial(),
            fqdn: probe::probe_fqdn(&hostname),
            processor,
            hostname,
        }
    }
}

/// Gets the machine hostname.
fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
