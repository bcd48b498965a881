//! Metric snapshot types shared between the metric collectors and the configuration engine.
//!
//! A [`MetricsSnapshot`] is produced once per update tick by the platform collectors and is
//! treated as an immutable value by everything downstream. All structs deserialize with
//! defaults for missing fields so partial snapshots (for example hand-written JSON fixtures)
//! are accepted.

use serde::{Deserialize, Serialize};

mod datetime;
mod host;

pub use datetime::{DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT, DEFAULT_TIME_FORMAT, DateTimeFormats};

/// Placeholder used by collectors for readings that are not available.
pub const NOT_AVAILABLE: &str = "N/A";

/// One immutable bag of current system readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsSnapshot {
    /// Processor usage, temperature and load.
    pub cpu: CpuMetrics,
    /// Physical memory and swap.
    pub memory: MemoryMetrics,
    /// GPU utilization.
    pub gpu: GpuMetrics,
    /// Boot volume capacity and throughput.
    pub disk: DiskMetrics,
    /// Interface addresses and throughput.
    pub network: NetworkMetrics,
    /// Current wireless association.
    pub wifi: WifiInfo,
    /// Pre-formatted clock strings.
    pub datetime: DateTimeInfo,
    /// Host identity and uptime.
    pub system: SystemInfo,
    /// Processes sorted by CPU usage, highest first.
    pub top_cpu: Vec<ProcessSample>,
    /// Processes sorted by resident memory, highest first.
    pub top_memory: Vec<ProcessSample>,
    /// Process table counts.
    pub processes: ProcessCounts,
    /// Power source state.
    pub battery: BatteryInfo,
    /// Default output device.
    pub audio: AudioInfo,
    /// Bluetooth controller and connected peripherals.
    pub bluetooth: BluetoothInfo,
}

/// Usage of a single logical core.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreUsage {
    /// Zero-based core index.
    pub core: usize,
    /// Usage percentage in `0..=100`.
    pub usage: f64,
}

/// Load averages over 1, 5 and 15 minutes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadAverages {
    /// One minute average.
    pub one: f64,
    /// Five minute average.
    pub five: f64,
    /// Fifteen minute average.
    pub fifteen: f64,
}

/// Processor readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CpuMetrics {
    /// Aggregate usage percentage.
    pub usage: f64,
    /// Package temperature in Celsius, `0` when no sensor is readable.
    pub temperature: f64,
    /// Nominal frequency in MHz, `0` when unknown.
    pub frequency_mhz: u32,
    /// Per-core usage in core order.
    pub per_core: Vec<CoreUsage>,
    /// Load averages.
    pub load: LoadAverages,
}

/// Memory and swap readings. Sizes are in gigabytes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryMetrics {
    /// Memory in use.
    pub used_gb: f64,
    /// Installed memory.
    pub total_gb: f64,
    /// Used share of total.
    pub percent: f64,
    /// Swap in use.
    pub swap_used_gb: f64,
    /// Swap size.
    pub swap_total_gb: f64,
    /// Used share of swap.
    pub swap_percent: f64,
}

/// GPU readings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GpuMetrics {
    /// Marketing name of the GPU.
    pub name: String,
    /// Utilization percentage.
    pub utilization: f64,
    /// Temperature in Celsius, `0` when no sensor is readable.
    pub temperature: f64,
}

impl Default for GpuMetrics {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            utilization: 0.0,
            temperature: 0.0,
        }
    }
}

/// Boot volume readings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiskMetrics {
    /// Volume capacity.
    pub total_gb: f64,
    /// Space in use.
    pub used_gb: f64,
    /// Space available.
    pub free_gb: f64,
    /// Used share of capacity.
    pub percent: f64,
    /// Read throughput.
    pub read_bytes_per_sec: f64,
    /// Write throughput.
    pub write_bytes_per_sec: f64,
    /// Filesystem type name (e.g. `apfs`).
    pub fs_type: String,
}

impl Default for DiskMetrics {
    fn default() -> Self {
        Self {
            total_gb: 0.0,
            used_gb: 0.0,
            free_gb: 0.0,
            percent: 0.0,
            read_bytes_per_sec: 0.0,
            write_bytes_per_sec: 0.0,
            fs_type: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Network readings, optionally filtered to one interface by the collector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkMetrics {
    /// Primary interface address.
    pub local_ip: String,
    /// Public address, or `Disabled` when public IP lookups are off.
    pub public_ip: String,
    /// Total bytes received since boot.
    pub bytes_in: u64,
    /// Total bytes sent since boot.
    pub bytes_out: u64,
    /// Receive rate.
    pub bytes_in_per_sec: f64,
    /// Send rate.
    pub bytes_out_per_sec: f64,
}

impl Default for NetworkMetrics {
    fn default() -> Self {
        Self {
            local_ip: NOT_AVAILABLE.to_string(),
            public_ip: "Disabled".to_string(),
            bytes_in: 0,
            bytes_out: 0,
            bytes_in_per_sec: 0.0,
            bytes_out_per_sec: 0.0,
        }
    }
}

/// Wireless association.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WifiInfo {
    /// Network name.
    pub ssid: String,
    /// RSSI in dBm.
    pub signal: i32,
    /// Access point hardware address.
    pub bssid: String,
}

impl Default for WifiInfo {
    fn default() -> Self {
        Self {
            ssid: NOT_AVAILABLE.to_string(),
            signal: 0,
            bssid: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Clock strings, already formatted with the configured patterns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DateTimeInfo {
    /// Full date and time (`datetimeFormat`).
    pub formatted: String,
    /// Date only (`dateFormat`).
    pub date: String,
    /// Time only (`timeFormat`).
    pub time: String,
    /// Full weekday name.
    pub weekday: String,
}

/// Host identity. Everything but `uptime_secs` is static for the life of the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemInfo {
    /// Host name.
    pub hostname: String,
    /// Seconds since boot.
    pub uptime_secs: f64,
    /// Product name and version, e.g. `macOS 15.1`.
    pub os: String,
    /// Kernel release.
    pub kernel: String,
    /// Hardware identifier, e.g. `arm64`.
    pub machine: String,
    /// Kernel name, e.g. `Darwin`.
    pub sysname: String,
}

/// One row of a top-processes list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessSample {
    /// Process id.
    pub pid: i32,
    /// Executable name.
    pub name: String,
    /// CPU usage percentage.
    pub cpu_percent: f64,
    /// Resident memory in megabytes.
    pub memory_mb: f64,
}

/// Process table counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessCounts {
    /// All processes.
    pub total: u32,
    /// Processes currently running.
    pub running: u32,
}

/// Power source state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatteryInfo {
    /// Charge level in `0..=100`.
    pub percent: i32,
    /// `Charging`, `Discharging`, `Full`, `Not Charging`, `No Battery` or `N/A`.
    pub status: String,
    /// `H:MM`, `Calculating...` or `N/A`.
    pub time_remaining: String,
    /// Watts; positive while charging, negative while discharging.
    pub power_draw_watts: f64,
    /// Whether a battery is installed.
    pub present: bool,
    /// Charge cycles.
    pub cycle_count: u32,
    /// Percentage of design capacity.
    pub health: i32,
}

impl Default for BatteryInfo {
    fn default() -> Self {
        Self {
            percent: 0,
            status: NOT_AVAILABLE.to_string(),
            time_remaining: NOT_AVAILABLE.to_string(),
            power_draw_watts: 0.0,
            present: false,
            cycle_count: 0,
            health: 0,
        }
    }
}

/// Default output device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AudioInfo {
    /// Output device name.
    pub device: String,
    /// Volume in `0..=100`.
    pub volume: i32,
    /// Whether output is muted.
    pub muted: bool,
}

impl Default for AudioInfo {
    fn default() -> Self {
        Self {
            device: "Unknown".to_string(),
            volume: 0,
            muted: false,
        }
    }
}

/// A paired Bluetooth peripheral.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BluetoothDevice {
    /// Display name.
    pub name: String,
    /// Hardware address.
    pub address: String,
    /// Whether the device is connected.
    pub connected: bool,
}

/// Bluetooth controller state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BluetoothInfo {
    /// Number of connected devices.
    pub connected_count: u32,
    /// Whether the controller is on.
    pub powered_on: bool,
    /// Connected devices, in controller order.
    pub devices: Vec<BluetoothDevice>,
}
