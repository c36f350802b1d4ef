//! Collectors for `softnas-cmd pooldetails` (pool discovery and pool I/O).
//!
//! `pooldetails` lists each pool followed by its vdev and device rows. Those
//! rows are indented with `&nbsp;` entities in their name and are not pools.

use tracing::{debug, warn};

use crate::collector::Collector;
use crate::collector::traits::{Request, Tool};
use crate::error::PluginError;
use crate::metrics::{MetricMap, merge};
use crate::response::{PoolDetailRecord, Reading, decode_records};
use crate::units::parse_size;

const ACTION: &str = "pooldetails";

/// Marker of decorative sub-entries in pool names.
const NBSP: &str = "&nbsp;";

/// Returns `true` if `name` is a real pool rather than a device row.
pub fn is_pool_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(NBSP)
}

/// Extracts pool names from `pooldetails` records, keeping their order.
pub fn pool_names(records: &[PoolDetailRecord]) -> Vec<String> {
    let mut pools: Vec<String> = Vec::new();
    for record in records {
        if !is_pool_name(&record.name) {
            debug!("Skipping pooldetails row {:?}", record.name);
            continue;
        }
        if pools.iter().any(|p| p == &record.name) {
            warn!("Pool {} listed twice", record.name);
            continue;
        }
        pools.push(record.name.clone());
    }
    pools
}

/// Parses an IOPS reading such as `"1,204"` or `12.5`.
fn parse_rate(field: String, reading: &Reading) -> Result<f64, PluginError> {
    match reading {
        Reading::Number(n) => Ok(*n),
        Reading::Text(text) => {
            let cleaned: String = text.trim().chars().filter(|&c| c != ',').collect();
            cleaned
                .parse::<f64>()
                .map_err(|e| PluginError::Parse {
                    field,
                    message: format!("'{}': {}", text, e),
                })
        }
    }
}

/// Parses a bandwidth reading such as `"1.5K"`.
fn parse_bandwidth(field: String, reading: &Reading) -> Result<f64, PluginError> {
    match reading {
        Reading::Number(n) => Ok(*n),
        Reading::Text(text) => {
            parse_size(text).map_err(|source| PluginError::Size { field, source })
        }
    }
}

/// Converts the `pooldetails <pool>` record of `pool` into metrics.
///
/// Produces `<pool>_read_iops`, `<pool>_write_iops`, and, when the
/// appliance reports them, `<pool>_read_bandwidth` and
/// `<pool>_write_bandwidth` in bytes per second. An unreadable IOPS value
/// fails the pool; an unreadable bandwidth value is logged and left out.
pub fn pool_io_metrics(pool: &str, records: &[PoolDetailRecord]) -> Result<MetricMap, PluginError> {
    let record = records
        .iter()
        .find(|r| r.name == pool)
        .ok_or_else(|| PluginError::Structural {
            action: ACTION.to_string(),
            message: format!("no record for pool {}", pool),
        })?;

    let mut metrics = MetricMap::new();

    for (suffix, reading) in [("read_iops", &record.read_iops), ("write_iops", &record.write_iops)] {
        let name = format!("{}_{}", pool, suffix);
        let value = parse_rate(name.clone(), reading)?;
        metrics.insert(name, value);
    }

    for (suffix, reading) in [
        ("read_bandwidth", &record.read_bandwidth),
        ("write_bandwidth", &record.write_bandwidth),
    ] {
        if *reading == Reading::default() {
            continue;
        }
        let name = format!("{}_{}", pool, suffix);
        match parse_bandwidth(name.clone(), reading) {
            Ok(value) => {
                metrics.insert(name, value);
            }
            Err(e) => warn!("Skipping {}", e),
        }
    }

    Ok(metrics)
}

impl<T: Tool> Collector<T> {
    /// Lists the pools of the appliance.
    pub fn list_pools(&self) -> Result<Vec<String>, PluginError> {
        let body = self.tool.invoke(&Request::PoolDetails {
            session: self.session,
            pool: None,
        })?;
        let records: Vec<PoolDetailRecord> = decode_records(ACTION, &body)?;
        let pools = pool_names(&records);
        debug!("Discovered pools: {:?}", pools);
        Ok(pools)
    }

    /// Collects read/write IOPS and bandwidth of one pool.
    pub fn collect_pool_io(&self, pool: &str) -> Result<MetricMap, PluginError> {
        let body = self.tool.invoke(&Request::PoolDetails {
            session: self.session,
            pool: Some(pool),
        })?;
        let records: Vec<PoolDetailRecord> = decode_records(ACTION, &body)?;
        pool_io_metrics(pool, &records)
    }

    /// Collects pool I/O for every pool in `pools`, in order.
    pub fn collect_pools(&self, pools: &[String]) -> Result<MetricMap, PluginError> {
        let maps = pools
            .iter()
            .map(|pool| self.collect_pool_io(pool))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merge(maps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockTool;
    use crate::collector::traits::SessionId;

    fn record(name: &str, read: &str, write: &str) -> PoolDetailRecord {
        PoolDetailRecord {
            name: name.to_string(),
            read_iops: Reading::Text(read.to_string()),
            write_iops: Reading::Text(write.to_string()),
            ..PoolDetailRecord::default()
        }
    }

    #[test]
    fn test_pool_names_excludes_device_rows() {
        let records = vec![
            record("pool1", "12", "3"),
            record("&nbsp;&nbsp;&nbsp;/dev/xvdf", "12", "3"),
        ];
        assert_eq!(pool_names(&records), vec!["pool1".to_string()]);
    }

    #[test]
    fn test_pool_names_keeps_order_and_drops_duplicates() {
        let records = vec![
            record("tank", "0", "0"),
            record("", "0", "0"),
            record("backup", "0", "0"),
            record("tank", "0", "0"),
        ];
        assert_eq!(
            pool_names(&records),
            vec!["tank".to_string(), "backup".to_string()]
        );
    }

    #[test]
    fn test_is_pool_name() {
        assert!(is_pool_name("pool1"));
        assert!(!is_pool_name("&nbsp;mirror-0"));
        assert!(!is_pool_name("  "));
    }

    #[test]
    fn test_pool_io_metrics() {
        let records = vec![record("tank", "1,204", "12.5")];
        let m = pool_io_metrics("tank", &records).unwrap();
        assert_eq!(m.get("tank_read_iops"), Some(1204.0));
        assert_eq!(m.get("tank_write_iops"), Some(12.5));
        assert!(!m.contains("tank_read_bandwidth"));
    }

    #[test]
    fn test_pool_io_metrics_bandwidth() {
        let mut rec = record("tank", "1", "2");
        rec.read_bandwidth = Reading::Text("2.5M".to_string());
        rec.write_bandwidth = Reading::Number(640.0);
        let m = pool_io_metrics("tank", &[rec]).unwrap();
        assert_eq!(m.get("tank_read_bandwidth"), Some(2.5 * 1024.0 * 1024.0));
        assert_eq!(m.get("tank_write_bandwidth"), Some(640.0));
    }

    #[test]
    fn test_pool_io_metrics_skips_unreadable_bandwidth() {
        let mut rec = record("tank", "7", "8");
        rec.read_bandwidth = Reading::Text("1.5K/s".to_string());
        rec.write_bandwidth = Reading::Text("-".to_string());
        let m = pool_io_metrics("tank", &[rec]).unwrap();
        assert_eq!(m.get("tank_read_iops"), Some(7.0));
        assert_eq!(m.get("tank_write_iops"), Some(8.0));
        assert!(!m.contains("tank_read_bandwidth"));
        assert!(!m.contains("tank_write_bandwidth"));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_pool_io_metrics_unparseable_rate() {
        let records = vec![record("tank", "n/a", "0")];
        let err = pool_io_metrics("tank", &records).unwrap_err();
        assert!(matches!(err, PluginError::Parse { .. }));
        assert_eq!(err.context(), "tank_read_iops");
    }

    #[test]
    fn test_pool_io_metrics_missing_pool() {
        let records = vec![record("&nbsp;&nbsp;/dev/xvdf", "1", "1")];
        let err = pool_io_metrics("tank", &records).unwrap_err();
        assert!(matches!(err, PluginError::Structural { .. }));
    }

    #[test]
    fn test_list_pools() {
        let collector = Collector::new(MockTool::two_pool_appliance(), SessionId(12345));
        assert_eq!(
            collector.list_pools().unwrap(),
            vec!["tank".to_string(), "backup".to_string()]
        );
    }

    #[test]
    fn test_collect_pools() {
        let collector = Collector::new(MockTool::two_pool_appliance(), SessionId(12345));
        let pools = collector.list_pools().unwrap();
        let m = collector.collect_pools(&pools).unwrap();

        assert_eq!(m.get("tank_read_iops"), Some(1204.0));
        assert_eq!(m.get("tank_write_iops"), Some(310.0));
        assert_eq!(m.get("tank_write_bandwidth"), Some(640.0 * 1024.0));
        assert_eq!(m.get("backup_read_iops"), Some(0.0));
        assert_eq!(m.get("backup_read_bandwidth"), Some(0.0));
        assert_eq!(m.len(), 8);

        let calls = collector.tool().calls();
        assert_eq!(calls[1], "pooldetails tank --session_id 12345");
        assert_eq!(calls[2], "pooldetails backup --session_id 12345");
    }

    #[test]
    fn test_collect_pools_empty() {
        let collector = Collector::new(MockTool::new(), SessionId(1));
        assert!(collector.collect_pools(&[]).unwrap().is_empty());
        assert!(collector.tool().calls().is_empty());
    }
}
