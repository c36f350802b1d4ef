//! Graph definitions reported to the metrics agent.
//!
//! The fixed graphs are compile-time data. Pool graphs get one series pair
//! per discovered pool, in discovery order. A `GraphDefinition` is built
//! once per run and never modified afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

/// Default leading segment of graph keys.
pub const DEFAULT_PREFIX: &str = "softnas";

/// Unit of a graph, as understood by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "bytes")]
    Bytes,
    #[serde(rename = "bytes/sec")]
    BytesPerSec,
    #[serde(rename = "iops")]
    Iops,
}

/// One series of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetric {
    pub name: String,
    pub label: String,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<GraphMetric>,
}

struct StaticMetric {
    name: &'static str,
    label: &'static str,
    stacked: bool,
}

struct StaticGraph {
    key: &'static str,
    label: &'static str,
    unit: Unit,
    metrics: &'static [StaticMetric],
}

const fn series(name: &'static str, label: &'static str) -> StaticMetric {
    StaticMetric {
        name,
        label,
        stacked: false,
    }
}

const fn stacked(name: &'static str, label: &'static str) -> StaticMetric {
    StaticMetric {
        name,
        label,
        stacked: true,
    }
}

const STATIC_GRAPHS: &[StaticGraph] = &[
    StaticGraph {
        key: "storagename",
        label: "SoftNas Storage Size",
        unit: Unit::Bytes,
        metrics: &[
            series("storagename_used", "Used"),
            series("storagename_free", "Free"),
        ],
    },
    StaticGraph {
        key: "storagedata",
        label: "SoftNas Storage Usage",
        unit: Unit::Percentage,
        metrics: &[
            series("storagedata_used", "Used"),
            series("storagedata_free", "Free"),
        ],
    },
    StaticGraph {
        key: "memoryname",
        label: "SoftNas Cache Memory Size",
        unit: Unit::Bytes,
        metrics: &[
            stacked("memoryname_used", "Used"),
            stacked("memoryname_free", "Free"),
        ],
    },
    StaticGraph {
        key: "memorydata",
        label: "SoftNas Cache Memory Usage",
        unit: Unit::Percentage,
        metrics: &[
            stacked("memorydata_used", "Used"),
            stacked("memorydata_free", "Free"),
        ],
    },
    StaticGraph {
        key: "numberofarccache",
        label: "SoftNas ARC Cache",
        unit: Unit::Float,
        metrics: &[
            series("arc_hits", "Hits"),
            series("arc_miss", "Miss"),
            series("arc_read", "Read"),
        ],
    },
    StaticGraph {
        key: "architpercent",
        label: "SoftNas ARC Hit Ratio",
        unit: Unit::Percentage,
        metrics: &[series("arc_hitpercent", "Hit")],
    },
];

/// Graph id → graph, serialized as the agent's `{"graphs": {...}}` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphDefinition {
    pub graphs: BTreeMap<String, Graph>,
}

impl GraphDefinition {
    /// Builds the definition for the given key prefix and pools.
    pub fn new(prefix: &str, pools: &[String]) -> Self {
        let mut graphs = BTreeMap::new();

        for graph in STATIC_GRAPHS {
            graphs.insert(
                format!("{}.{}", prefix, graph.key),
                Graph {
                    label: graph.label.to_string(),
                    unit: graph.unit,
                    metrics: graph
                        .metrics
                        .iter()
                        .map(|m| GraphMetric {
                            name: m.name.to_string(),
                            label: m.label.to_string(),
                            stacked: m.stacked,
                        })
                        .collect(),
                },
            );
        }

        if !pools.is_empty() {
            graphs.insert(
                format!("{}.pooliops", prefix),
                pool_graph("SoftNas Read/Write Pool IOPS", Unit::Iops, pools, "iops", "IOPS"),
            );
            graphs.insert(
                format!("{}.poolbandwidth", prefix),
                pool_graph(
                    "SoftNas Read/Write Pool Bandwidth",
                    Unit::BytesPerSec,
                    pools,
                    "bandwidth",
                    "Bandwidth",
                ),
            );
        }

        Self { graphs }
    }

    pub fn get(&self, key: &str) -> Option<&Graph> {
        self.graphs.get(key)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Graph)> {
        self.graphs.iter()
    }
}

fn pool_graph(label: &str, unit: Unit, pools: &[String], suffix: &str, series_label: &str) -> Graph {
    let metrics = pools
        .iter()
        .flat_map(|pool| {
            ["read", "write"].map(|direction| GraphMetric {
                name: format!("{}_{}_{}", pool, direction, suffix),
                label: format!(
                    "{} {}_{}",
                    pool,
                    if direction == "read" { "Read" } else { "Write" },
                    series_label
                ),
                stacked: false,
            })
        })
        .collect();

    Graph {
        label: label.to_string(),
        unit,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_graphs() {
        let def = GraphDefinition::new(DEFAULT_PREFIX, &[]);
        assert_eq!(def.len(), 6);
        assert_eq!(
            def.get("softnas.storagename").unwrap().label,
            "SoftNas Storage Size"
        );
        assert_eq!(def.get("softnas.storagedata").unwrap().unit, Unit::Percentage);
        assert!(def.get("softnas.pooliops").is_none());

        let memory = def.get("softnas.memoryname").unwrap();
        assert!(memory.metrics.iter().all(|m| m.stacked));
        let arc = def.get("softnas.numberofarccache").unwrap();
        let names: Vec<&str> = arc.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["arc_hits", "arc_miss", "arc_read"]);
    }

    #[test]
    fn test_pool_graphs_follow_discovery_order() {
        let pools = vec!["tank".to_string(), "backup".to_string()];
        let def = GraphDefinition::new(DEFAULT_PREFIX, &pools);
        assert_eq!(def.len(), 8);

        let iops = def.get("softnas.pooliops").unwrap();
        assert_eq!(iops.unit, Unit::Iops);
        let names: Vec<&str> = iops.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "tank_read_iops",
                "tank_write_iops",
                "backup_read_iops",
                "backup_write_iops"
            ]
        );
        assert_eq!(iops.metrics[0].label, "tank Read_IOPS");

        let bandwidth = def.get("softnas.poolbandwidth").unwrap();
        assert_eq!(bandwidth.metrics[3].name, "backup_write_bandwidth");
    }

    #[test]
    fn test_custom_prefix() {
        let def = GraphDefinition::new("nas01", &[]);
        assert!(def.get("nas01.storagename").is_some());
        assert!(def.get("softnas.storagename").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let def = GraphDefinition::new(DEFAULT_PREFIX, &["pool1".to_string()]);
        let json = serde_json::to_value(&def).unwrap();
        let graph = &json["graphs"]["softnas.pooliops"];
        assert_eq!(graph["unit"], "iops");
        assert_eq!(graph["metrics"][0]["name"], "pool1_read_iops");
        assert_eq!(graph["metrics"][0]["stacked"], false);
        assert_eq!(json["graphs"]["softnas.poolbandwidth"]["unit"], "bytes/sec");
    }
}
