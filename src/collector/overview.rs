//! Collector for `softnas-cmd overview` (storage and cache memory usage).
//!
//! `overview` answers with four records, each a human-readable descriptor
//! plus a percentage:
//!
//! ```text
//! {"storage_name": "44.8G Free\n(100.0%)",        "storage_data": 99.99}
//! {"storage_name": "480.0K Used\n(0.0%)",         "storage_data": 0.001}
//! {"memory_name":  "666.7K\nCache Used\n(0.1%)",  "memory_data": 0.06}
//! {"memory_name":  "1,002.9M\nCache Free\n(99.9%)", "memory_data": 99.93}
//! ```
//!
//! Records are matched by field and wording, not by position.

use crate::collector::Collector;
use crate::collector::traits::{Request, Tool};
use crate::error::PluginError;
use crate::metrics::MetricMap;
use crate::response::{OverviewRecord, decode_records};
use crate::units::{first_token, parse_size};

const ACTION: &str = "overview";
const EXPECTED_RECORDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Storage,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Free,
    Used,
}

/// Where one overview value lands in the metric map.
struct Slot {
    kind: Kind,
    usage: Usage,
    size_metric: &'static str,
    percent_metric: &'static str,
}

const SLOTS: [Slot; EXPECTED_RECORDS] = [
    Slot {
        kind: Kind::Storage,
        usage: Usage::Free,
        size_metric: "storagename_free",
        percent_metric: "storagedata_free",
    },
    Slot {
        kind: Kind::Storage,
        usage: Usage::Used,
        size_metric: "storagename_used",
        percent_metric: "storagedata_used",
    },
    Slot {
        kind: Kind::Memory,
        usage: Usage::Used,
        size_metric: "memoryname_used",
        percent_metric: "memorydata_used",
    },
    Slot {
        kind: Kind::Memory,
        usage: Usage::Free,
        size_metric: "memoryname_free",
        percent_metric: "memorydata_free",
    },
];

fn structural(message: String) -> PluginError {
    PluginError::Structural {
        action: ACTION.to_string(),
        message,
    }
}

/// Splits a record into kind, descriptor and percentage.
fn describe(record: &OverviewRecord) -> Option<(Kind, &str, Option<f64>)> {
    match (&record.storage_name, &record.memory_name) {
        (Some(name), None) => Some((Kind::Storage, name.as_str(), record.storage_data)),
        (None, Some(name)) => Some((Kind::Memory, name.as_str(), record.memory_data)),
        _ => None,
    }
}

/// Reads the usage from descriptor wording such as `Free` or `Cache Used`.
fn usage_of(descriptor: &str) -> Option<Usage> {
    let mut words = descriptor.split_whitespace().skip(1);
    words.find_map(|word| match word {
        "Free" => Some(Usage::Free),
        "Used" => Some(Usage::Used),
        _ => None,
    })
}

/// Converts `overview` records into metrics.
///
/// Produces byte counts (`storagename_*`, `memoryname_*`) and percentages
/// passed through unchanged (`storagedata_*`, `memorydata_*`).
pub fn overview_metrics(records: &[OverviewRecord]) -> Result<MetricMap, PluginError> {
    if records.len() < EXPECTED_RECORDS {
        return Err(structural(format!(
            "expected {} records, got {}",
            EXPECTED_RECORDS,
            records.len()
        )));
    }

    let mut metrics = MetricMap::new();

    for slot in &SLOTS {
        let found = records.iter().filter_map(describe).find(|(kind, name, _)| {
            *kind == slot.kind && usage_of(name) == Some(slot.usage)
        });
        let Some((_, descriptor, percent)) = found else {
            return Err(structural(format!("no record for {}", slot.size_metric)));
        };
        let percent = percent
            .ok_or_else(|| structural(format!("no percentage for {}", slot.percent_metric)))?;

        let bytes = parse_size(first_token(descriptor)).map_err(|source| PluginError::Size {
            field: slot.size_metric.to_string(),
            source,
        })?;

        metrics.insert(slot.size_metric, bytes);
        metrics.insert(slot.percent_metric, percent);
    }

    Ok(metrics)
}

impl<T: Tool> Collector<T> {
    /// Collects storage and cache memory usage.
    pub fn collect_overview(&self) -> Result<MetricMap, PluginError> {
        let body = self.tool.invoke(&Request::Overview {
            session: self.session,
        })?;
        let records: Vec<OverviewRecord> = decode_records(ACTION, &body)?;
        overview_metrics(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockTool;
    use crate::collector::traits::SessionId;

    fn storage(name: &str, data: f64) -> OverviewRecord {
        OverviewRecord {
            storage_name: Some(name.to_string()),
            storage_data: Some(data),
            ..OverviewRecord::default()
        }
    }

    fn memory(name: &str, data: f64) -> OverviewRecord {
        OverviewRecord {
            memory_name: Some(name.to_string()),
            memory_data: Some(data),
            ..OverviewRecord::default()
        }
    }

    fn reference_records() -> Vec<OverviewRecord> {
        vec![
            storage("44.8G Free\n(100.0%)", 99.99897820609),
            storage("480.0K Used\n(0.0%)", 0.0010217939104395),
            memory("666.7K\nCache Used\n(0.1%)", 0.064876091113447),
            memory("1,002.9M\nCache Free\n(99.9%)", 99.935123908887),
        ]
    }

    #[test]
    fn test_overview_metrics_reference_payload() {
        let m = overview_metrics(&reference_records()).unwrap();

        assert!((m.get("storagename_free").unwrap() - 48_103_633_715.2).abs() < 1e-3);
        assert_eq!(m.get("storagename_used"), Some(491_520.0));
        assert!((m.get("memoryname_used").unwrap() - 682_700.8).abs() < 1e-6);
        assert!((m.get("memoryname_free").unwrap() - 1_051_616_870.4).abs() < 1e-3);

        assert_eq!(m.get("storagedata_free"), Some(99.99897820609));
        assert_eq!(m.get("storagedata_used"), Some(0.0010217939104395));
        assert_eq!(m.get("memorydata_used"), Some(0.064876091113447));
        assert_eq!(m.get("memorydata_free"), Some(99.935123908887));
        assert_eq!(m.len(), 8);
    }

    #[test]
    fn test_overview_metrics_independent_of_order() {
        let mut records = reference_records();
        records.reverse();
        assert_eq!(
            overview_metrics(&records).unwrap(),
            overview_metrics(&reference_records()).unwrap()
        );
    }

    #[test]
    fn test_overview_metrics_short_input() {
        let records = &reference_records()[..3];
        let err = overview_metrics(records).unwrap_err();
        assert!(matches!(err, PluginError::Structural { .. }));
        assert!(overview_metrics(&[]).is_err());
    }

    #[test]
    fn test_overview_metrics_missing_slot() {
        let mut records = reference_records();
        records[3] = memory("1,002.9M\nCache Used\n(99.9%)", 99.9);
        let err = overview_metrics(&records).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected overview records: no record for memoryname_free"
        );
    }

    #[test]
    fn test_overview_metrics_missing_percentage() {
        let mut records = reference_records();
        records[1].storage_data = None;
        let err = overview_metrics(&records).unwrap_err();
        assert!(matches!(err, PluginError::Structural { .. }));
    }

    #[test]
    fn test_overview_metrics_bad_size() {
        let mut records = reference_records();
        records[0] = storage("lots Free\n(100.0%)", 99.9);
        let err = overview_metrics(&records).unwrap_err();
        assert!(matches!(err, PluginError::Size { .. }));
        assert_eq!(err.context(), "storagename_free");
    }

    #[test]
    fn test_collect_overview() {
        let collector = Collector::new(MockTool::typical_appliance(), SessionId(12345));
        let m = collector.collect_overview().unwrap();
        assert_eq!(m.get("storagename_used"), Some(491_520.0));
        assert_eq!(
            collector.tool().calls(),
            vec!["overview --session_id 12345".to_string()]
        );
    }

    #[test]
    fn test_collect_overview_unparseable_output() {
        let mut tool = MockTool::new();
        tool.add_output("overview", "<html>502 Bad Gateway</html>");
        let collector = Collector::new(tool, SessionId(1));
        assert!(matches!(
            collector.collect_overview().unwrap_err(),
            PluginError::Response { .. }
        ));
    }
}
