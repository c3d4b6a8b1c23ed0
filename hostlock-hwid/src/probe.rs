//! Probe strategies for machine-identifying attributes.
//!
//! Each attribute (MAC address, CPU identifier, disk serial, FQDN) is
//! read through an ordered list of strategies assembled for the current
//! platform; the first strategy that yields a value wins. A failing
//! command, an unreadable file, or unparseable output moves the chain
//! along to the next strategy, and every chain ends in a fallback that
//! always produces a value.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Upper bound on how long a single probe command may run.
///
/// Hardware queries can hang outright on misbehaving systems (a wedged
/// network stack, a stuck WMI service); a command that has not answered
/// by the deadline is killed and treated as a failed probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

static MAC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}").expect("valid MAC regex"));

/// Disk-serial fallback, generated once per process.
///
/// A machine whose disk-serial probe fails cannot get a deterministic
/// serial, so it gets a random one. Caching it for the process lifetime
/// keeps repeated fingerprint computations in agreement; across restarts
/// the fingerprint will differ, which is an accepted limitation of
/// best-effort probing.
static FALLBACK_DISK_SERIAL: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// One way of reading a single hardware attribute.
trait Probe {
    /// Where the value comes from, for logging.
    fn source(&self) -> &'static str;

    /// Attempts to read the attribute. `None` on any failure.
    fn read(&self) -> Option<String>;
}

/// Runs an external command and parses its stdout.
struct CommandProbe {
    name: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    parse: fn(&str) -> Option<String>,
}

impl Probe for CommandProbe {
    fn source(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> Option<String> {
        let output = run_with_timeout(self.program, self.args, PROBE_TIMEOUT)?;
        (self.parse)(&output)
    }
}

/// Reads and parses a pseudo-file such as `/proc/cpuinfo`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
struct FileProbe {
    name: &'static str,
    path: &'static str,
    parse: fn(&str) -> Option<String>,
}

impl Probe for FileProbe {
    fn source(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> Option<String> {
        let contents = std::fs::read_to_string(self.path).ok()?;
        (self.parse)(&contents)
    }
}

/// Runs the strategies in order and returns the first value produced.
fn first_success(attribute: &'static str, probes: &[Box<dyn Probe>]) -> Option<String> {
    for probe in probes {
        match probe.read() {
            Some(value) if !value.is_empty() => {
                debug!(attribute, source = probe.source(), "probe succeeded");
                return Some(value);
            }
            _ => debug!(attribute, source = probe.source(), "probe failed, trying next"),
        }
    }
    None
}

/// Runs a command with a bounded deadline, returning its stdout.
///
/// The child is polled rather than waited on so a hung utility cannot
/// stall fingerprint collection; at the deadline it is killed and the
/// probe reports failure. Output from the utilities probed here is far
/// below the OS pipe buffer size, so the child cannot block on a full
/// pipe before exiting.
fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                let mut out = String::new();
                child.stdout.take()?.read_to_string(&mut out).ok()?;
                return Some(out);
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(20)),
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}

// ── MAC address ──────────────────────────────────────────────────

/// Reads the MAC address of a network interface, falling back to a
/// pseudo-MAC derived from a stable node identifier.
pub(crate) fn probe_mac_address() -> String {
    first_success("mac_address", &mac_probes()).unwrap_or_else(pseudo_mac)
}

#[cfg(target_os = "windows")]
fn mac_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "getmac",
        program: "getmac",
        args: &[],
        parse: parse_mac,
    })]
}

#[cfg(target_os = "linux")]
fn mac_probes() -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(CommandProbe {
            name: "ip-link",
            program: "ip",
            args: &["link"],
            parse: parse_mac,
        }),
        Box::new(CommandProbe {
            name: "ifconfig",
            program: "ifconfig",
            args: &[],
            parse: parse_mac,
        }),
    ]
}

#[cfg(target_os = "macos")]
fn mac_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "ifconfig",
        program: "ifconfig",
        args: &[],
        parse: parse_mac,
    })]
}

#[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
fn mac_probes() -> Vec<Box<dyn Probe>> {
    Vec::new()
}

/// Extracts the first usable MAC address from command output.
///
/// The all-zero address (loopback on `ip link`) is skipped. Windows
/// `getmac` separates octets with dashes; output is normalized to
/// lowercase colon-separated form.
fn parse_mac(output: &str) -> Option<String> {
    MAC_RE
        .find_iter(output)
        .map(|m| m.as_str().replace('-', ":").to_lowercase())
        .find(|mac| mac != "00:00:00:00:00:00")
}

/// Builds a pseudo-MAC from a stable node identifier: six colon-separated
/// hex octets taken from a digest of the machine id (or, failing that,
/// the hostname and user). Deterministic wherever the identifier is.
fn pseudo_mac() -> String {
    let node = node_identifier();
    let digest = Sha256::digest(node.as_bytes());
    digest[..6]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// A stable identifier for this node, independent of network hardware.
fn node_identifier() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(id) = std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
        {
            let id = id.trim();
            if !id.is_empty() {
                return id.to_string();
            }
        }
    }

    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    format!("{host}-{user}")
}

// ── CPU identifier ───────────────────────────────────────────────

/// Reads a CPU serial or platform identifier, falling back to a digest
/// of the processor brand string and logical core count.
pub(crate) fn probe_cpu_id(processor: &str, cpu_count: usize) -> String {
    first_success("cpu_id", &cpu_id_probes())
        .unwrap_or_else(|| fallback_cpu_id(processor, cpu_count))
}

#[cfg(target_os = "windows")]
fn cpu_id_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "wmic-cpu",
        program: "wmic",
        args: &["cpu", "get", "ProcessorId"],
        parse: parse_wmic_value,
    })]
}

#[cfg(target_os = "linux")]
fn cpu_id_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(FileProbe {
        name: "cpuinfo-serial",
        path: "/proc/cpuinfo",
        parse: parse_cpuinfo_serial,
    })]
}

#[cfg(target_os = "macos")]
fn cpu_id_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "ioreg-platform-uuid",
        program: "ioreg",
        args: &["-rd1", "-c", "IOPlatformExpertDevice"],
        parse: parse_ioreg_platform_uuid,
    })]
}

#[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
fn cpu_id_probes() -> Vec<Box<dyn Probe>> {
    Vec::new()
}

/// Finds the `Serial` line in `/proc/cpuinfo` (present on ARM boards,
/// absent on most x86 machines).
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cpuinfo_serial(contents: &str) -> Option<String> {
    contents
        .lines()
        .find(|line| line.to_lowercase().starts_with("serial"))
        .and_then(|line| line.split(':').nth(1))
        .map(|serial| serial.trim().to_string())
        .filter(|serial| !serial.is_empty())
}

fn fallback_cpu_id(processor: &str, cpu_count: usize) -> String {
    hex::encode(Sha256::digest(format!("{processor}{cpu_count}").as_bytes()))
}

// ── Disk serial ──────────────────────────────────────────────────

/// Reads the primary disk serial number.
///
/// When every probe fails the serial falls back to a random identifier
/// that is cached for the process lifetime; see [`FALLBACK_DISK_SERIAL`].
pub(crate) fn probe_disk_serial() -> String {
    first_success("disk_serial", &disk_serial_probes())
        .unwrap_or_else(|| FALLBACK_DISK_SERIAL.clone())
}

#[cfg(target_os = "windows")]
fn disk_serial_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "wmic-diskdrive",
        program: "wmic",
        args: &["diskdrive", "get", "SerialNumber"],
        parse: parse_wmic_value,
    })]
}

#[cfg(target_os = "linux")]
fn disk_serial_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "lsblk",
        program: "lsblk",
        args: &["-d", "-o", "SERIAL", "-n"],
        parse: parse_first_line,
    })]
}

#[cfg(target_os = "macos")]
fn disk_serial_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "ioreg-platform-serial",
        program: "ioreg",
        args: &["-rd1", "-c", "IOPlatformExpertDevice"],
        parse: parse_ioreg_platform_serial,
    })]
}

#[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
fn disk_serial_probes() -> Vec<Box<dyn Probe>> {
    Vec::new()
}

// ── FQDN ─────────────────────────────────────────────────────────

/// Resolves the fully-qualified domain name, falling back to the bare
/// hostname when the resolver has nothing better.
pub(crate) fn probe_fqdn(hostname: &str) -> String {
    first_success("fqdn", &fqdn_probes()).unwrap_or_else(|| hostname.to_string())
}

#[cfg(unix)]
fn fqdn_probes() -> Vec<Box<dyn Probe>> {
    vec![Box::new(CommandProbe {
        name: "hostname-fqdn",
        program: "hostname",
        args: &["-f"],
        parse: parse_first_line,
    })]
}

#[cfg(not(unix))]
fn fqdn_probes() -> Vec<Box<dyn Probe>> {
    Vec::new()
}

// ── Shared parsers ───────────────────────────────────────────────

/// First non-empty line, trimmed.
#[cfg_attr(not(unix), allow(dead_code))]
fn parse_first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Value row of `wmic <class> get <property>` output: a header line
/// followed by the value.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_wmic_value(output: &str) -> Option<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// `IOPlatformUUID` value from `ioreg -rd1 -c IOPlatformExpertDevice`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg_platform_uuid(output: &str) -> Option<String> {
    parse_ioreg_quoted(output, "IOPlatformUUID")
}

/// `IOPlatformSerialNumber` value from the same ioreg query.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg_platform_serial(output: &str) -> Option<String> {
    parse_ioreg_quoted(output, "IOPlatformSerialNumber")
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg_quoted(output: &str, key: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains(key))
        .and_then(|line| line.split('"').nth(3))
        .map(String::from)
        .filter(|value| !value.is_empty())
}
