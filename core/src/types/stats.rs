use serde::{Deserialize, Serialize};

/// Host telemetry from `monitor.getSystemStats`.
///
/// `SystemStats::default()` is the all-zero record returned when the
/// server sends no payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemStats {
    /// Seconds since boot.
    pub uptime: f64,
    pub mem_info: MemInfo,
    pub disk_info: DiskInfo,
    pub cpu_info: CpuInfo,
    pub network: NetworkInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemInfo {
    pub total_mem_mb: f64,
    pub used_mem_mb: f64,
    pub free_mem_mb: f64,
    pub used_mem_percentage: f64,
    pub free_mem_percentage: f64,
}

/// Disk usage. The API reports these as preformatted strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskInfo {
    pub total_gb: String,
    pub used_gb: String,
    pub free_gb: String,
    pub used_percentage: String,
    pub free_percentage: String,
}

impl Default for DiskInfo {
    fn default() -> Self {
        let zero = || "0".to_string();
        Self {
            total_gb: zero(),
            used_gb: zero(),
            free_gb: zero(),
            used_percentage: zero(),
            free_percentage: zero(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuInfo {
    pub used_percentage: f64,
    pub count: u32,
    /// 1, 5 and 15 minute load averages.
    #[serde(rename = "loadavg")]
    pub load_avg: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkInfo {
    pub input_mb: f64,
    pub output_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        let stats = SystemStats::default();
        assert_eq!(stats.uptime, 0.0);
        assert_eq!(stats.mem_info.total_mem_mb, 0.0);
        assert_eq!(stats.disk_info.total_gb, "0");
        assert_eq!(stats.disk_info.free_percentage, "0");
        assert_eq!(stats.cpu_info.count, 0);
        assert!(stats.cpu_info.load_avg.is_empty());
        assert_eq!(stats.network.output_mb, 0.0);
    }

    #[test]
    fn integer_numbers_decode_into_floats() {
        let stats: SystemStats = serde_json::from_str(
            r#"{"uptime":12,"memInfo":{"totalMemMb":2048},"cpuInfo":{"count":4,"loadavg":[0.5,1,2]}}"#,
        )
        .unwrap();
        assert_eq!(stats.uptime, 12.0);
        assert_eq!(stats.mem_info.total_mem_mb, 2048.0);
        assert_eq!(stats.cpu_info.load_avg, vec![0.5, 1.0, 2.0]);
        assert_eq!(stats.disk_info, DiskInfo::default());
    }
}
