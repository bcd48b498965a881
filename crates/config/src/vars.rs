//! The variable dictionary: every `${name}` a widget can reference, rendered as strings.

use std::collections::BTreeMap;

use hud_metrics::{MetricsSnapshot, NOT_AVAILABLE};

/// Flat map from dotted variable name (`cpu.usage`, `top.mem1.name`, ...) to display value.
///
/// Rebuilt from a snapshot on every tick; never cached.
pub type VariableDictionary = BTreeMap<String, String>;

/// Rows exposed for each top-processes list and for Bluetooth devices.
const LIST_LIMIT: usize = 5;

/// Placeholder for names that have no reading.
const UNKNOWN: &str = "Unknown";

/// Render every known variable from `metrics`.
///
/// Values are never empty: missing readings render as `N/A` or `Unknown`.
pub fn build_variable_dictionary(metrics: &MetricsSnapshot) -> VariableDictionary {
    let mut vars = Vars::default();

    let cpu = &metrics.cpu;
    vars.set("cpu.usage", format!("{:.1}", cpu.usage));
    vars.set("cpu.temp", positive(cpu.temperature, |t| format!("{t:.0}")));
    vars.set("cpu.cores", cpu.per_core.len().to_string());
    if cpu.frequency_mhz > 0 {
        vars.set("cpu.freq", cpu.frequency_mhz.to_string());
        vars.set(
            "cpu.freq_ghz",
            format!("{:.2}", f64::from(cpu.frequency_mhz) / 1000.0),
        );
    } else {
        vars.set("cpu.freq", NOT_AVAILABLE);
        vars.set("cpu.freq_ghz", NOT_AVAILABLE);
    }
    for core in &cpu.per_core {
        vars.set(format!("cpu.core{}", core.core), format!("{:.0}", core.usage));
    }
    vars.set("load.1", format!("{:.2}", cpu.load.one));
    vars.set("load.5", format!("{:.2}", cpu.load.five));
    vars.set("load.15", format!("{:.2}", cpu.load.fifteen));

    let mem = &metrics.memory;
    vars.set("memory.used", format!("{:.1} GB", mem.used_gb));
    vars.set("memory.total", format!("{:.1} GB", mem.total_gb));
    vars.set("memory.percent", format!("{:.0}", mem.percent));
    vars.set("swap.used", format!("{:.1} GB", mem.swap_used_gb));
    vars.set("swap.total", format!("{:.1} GB", mem.swap_total_gb));
    vars.set("swap.percent", format!("{:.0}", mem.swap_percent));

    let gpu = &metrics.gpu;
    vars.text("gpu.name", &gpu.name, UNKNOWN);
    vars.set("gpu.usage", format!("{:.0}", gpu.utilization));
    vars.set("gpu.temp", positive(gpu.temperature, |t| format!("{t:.0}")));

    let disk = &metrics.disk;
    vars.set("disk.used", format!("{:.0} GB", disk.used_gb));
    vars.set("disk.total", format!("{:.0} GB", disk.total_gb));
    vars.set("disk.free", format!("{:.0} GB", disk.free_gb));
    vars.set("disk.percent", format!("{:.0}", disk.percent));
    vars.set("disk.read", format_bytes(disk.read_bytes_per_sec));
    vars.set("disk.write", format_bytes(disk.write_bytes_per_sec));
    vars.text("disk.type", &disk.fs_type, NOT_AVAILABLE);

    let net = &metrics.network;
    vars.text("network.local_ip", &net.local_ip, NOT_AVAILABLE);
    vars.text("network.public_ip", &net.public_ip, NOT_AVAILABLE);
    vars.set("network.down", format_bytes(net.bytes_in_per_sec));
    vars.set("network.up", format_bytes(net.bytes_out_per_sec));
    vars.set("network.total_down", format_bytes(net.bytes_in as f64));
    vars.set("network.total_up", format_bytes(net.bytes_out as f64));

    let wifi = &metrics.wifi;
    vars.text("wifi.ssid", &wifi.ssid, NOT_AVAILABLE);
    vars.set("wifi.signal", wifi.signal.to_string());
    vars.text("wifi.bssid", &wifi.bssid, NOT_AVAILABLE);

    let dt = &metrics.datetime;
    vars.text("time", &dt.time, NOT_AVAILABLE);
    vars.text("date", &dt.date, NOT_AVAILABLE);
    vars.text("datetime", &dt.formatted, NOT_AVAILABLE);
    vars.text("weekday", &dt.weekday, NOT_AVAILABLE);

    let sys = &metrics.system;
    vars.text("hostname", &sys.hostname, UNKNOWN);
    vars.set("uptime", format_uptime(sys.uptime_secs));
    vars.text("os", &sys.os, UNKNOWN);
    vars.text("kernel", &sys.kernel, UNKNOWN);
    vars.text("machine", &sys.machine, UNKNOWN);
    vars.text("sysname", &sys.sysname, UNKNOWN);

    for (i, proc) in metrics.top_cpu.iter().take(LIST_LIMIT).enumerate() {
        let n = i + 1;
        vars.text(format!("top.cpu{n}.name"), &proc.name, UNKNOWN);
        vars.set(format!("top.cpu{n}.percent"), format!("{:.1}", proc.cpu_percent));
        vars.set(format!("top.cpu{n}.pid"), proc.pid.to_string());
    }
    for (i, proc) in metrics.top_memory.iter().take(LIST_LIMIT).enumerate() {
        let n = i + 1;
        vars.text(format!("top.mem{n}.name"), &proc.name, UNKNOWN);
        vars.set(format!("top.mem{n}.mb"), format!("{:.0}", proc.memory_mb));
        vars.set(format!("top.mem{n}.pid"), proc.pid.to_string());
    }

    vars.set("processes.total", metrics.processes.total.to_string());
    vars.set("processes.running", metrics.processes.running.to_string());

    let bat = &metrics.battery;
    vars.set("battery.percent", bat.percent.to_string());
    vars.text("battery.status", &bat.status, NOT_AVAILABLE);
    vars.text("battery.time", &bat.time_remaining, NOT_AVAILABLE);
    vars.set("battery.power", format!("{:.1} W", bat.power_draw_watts.abs()));
    vars.set("battery.cycles", bat.cycle_count.to_string());
    vars.set("battery.health", bat.health.to_string());

    let audio = &metrics.audio;
    vars.text("audio.device", &audio.device, UNKNOWN);
    vars.set("audio.volume", audio.volume.to_string());
    vars.set("audio.muted", if audio.muted { "true" } else { "false" });

    let bt = &metrics.bluetooth;
    vars.set("bluetooth.connected", bt.connected_count.to_string());
    vars.set("bluetooth.powered", if bt.powered_on { "On" } else { "Off" });
    for (i, dev) in bt.devices.iter().take(LIST_LIMIT).enumerate() {
        let n = i + 1;
        vars.text(format!("bluetooth.device{n}.name"), &dev.name, UNKNOWN);
        vars.text(format!("bluetooth.device{n}.address"), &dev.address, NOT_AVAILABLE);
    }

    vars.0
}

/// Human-readable byte count: `B` with no decimals, `KB`/`MB` with one, `GB` with two.
pub fn format_bytes(bytes: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    if bytes < KB {
        format!("{bytes:.0} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes / KB)
    } else if bytes < GB {
        format!("{:.1} MB", bytes / MB)
    } else {
        format!("{:.2} GB", bytes / GB)
    }
}

/// Render an uptime as `Xd Xh Xm`, `Xh Xm` or `Xm`, dropping leading zero units.
pub fn format_uptime(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Format a positive reading, or `N/A` for zero and negative values.
fn positive(value: f64, fmt: impl Fn(f64) -> String) -> String {
    if value > 0.0 {
        fmt(value)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Dictionary builder.
#[derive(Default)]
struct Vars(VariableDictionary);

impl Vars {
    /// Insert a value.
    fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert a string reading, substituting `fallback` for an empty one.
    fn text(&mut self, key: impl Into<String>, value: &str, fallback: &str) {
        let value = value.trim();
        self.set(key, if value.is_empty() { fallback } else { value });
    }
}
