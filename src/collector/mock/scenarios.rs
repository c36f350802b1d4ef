//! Pre-built mock appliance scenarios for testing.
//!
//! Outputs are shaped after real `softnas-cmd` answers.

use super::tool::MockTool;

/// `softnas-cmd login` answer.
pub const LOGIN: &str = r#"{"success" : true, "session_id" : 12345, "result" : {}}"#;

/// `softnas-cmd overview` answer for a nearly empty 44.8G appliance.
pub const OVERVIEW: &str = r#"{"success" : true, "session_id" : 12345, "result" : {"success":true,"msg":"","records":[{"storage_name":"44.8G Free\n(100.0%)","storage_data":99.99897820609},{"storage_name":"480.0K Used\n(0.0%)","storage_data":0.0010217939104395},{"memory_name":"666.7K\nCache Used\n(0.1%)","memory_data":0.064876091113447},{"memory_name":"1,002.9M\nCache Free\n(99.9%)","memory_data":99.935123908887}],"total":4}}"#;

/// `softnas-cmd perfmon` answer. `total` disagrees with the record count,
/// and the first minutes are zero-padded.
pub const PERFMON: &str = r#"{"result":{"msg":"","records":[
{"time":"10:00","arc_hitpercent":0,"arc_hits":0,"arc_miss":0,"arc_read":0,"arc_size":0,"cpu":0},
{"time":"10:01","arc_hitpercent":0,"arc_hits":0,"arc_miss":0,"arc_read":0,"arc_size":0,"cpu":0},
{"time":"10:02","arc_hitpercent":96,"arc_hits":120,"arc_miss":4,"arc_read":124,"arc_size":1.5,"cpu":2.5},
{"time":"10:03","arc_hitpercent":97,"arc_hits":80,"arc_miss":2,"arc_read":82,"arc_size":1.5,"cpu":1.0},
{"time":"10:04","arc_hitpercent":98,"arc_hits":100,"arc_miss":0,"arc_read":100,"arc_size":1.5,"cpu":0.5}
],"success":true,"total":60},"session_id":12345,"success":true}"#;

/// `softnas-cmd pooldetails` answer: one pool followed by its device row.
pub const POOL_LIST: &str = r#"{"result":{"msg":"","records":[
{"checksum_errors":"0","extended":"","name":"pool1","read_IOPS":"12","read_bandwidth":"1.5K","read_errors":"0","scrub":"none","status":"ONLINE","write_IOPS":"3.5","write_bandwidth":"512","write_errors":"0"},
{"checksum_errors":"0","extended":"","name":"&nbsp;&nbsp;&nbsp;/dev/xvdf","read_IOPS":"12","read_bandwidth":"1.5K","read_errors":"0","scrub":"","status":"ONLINE","write_IOPS":"3.5","write_bandwidth":"512","write_errors":"0"}
],"success":true,"total":2},"session_id":12345,"success":true}"#;

/// `softnas-cmd pooldetails pool1` answer.
pub const POOL1: &str = r#"{"result":{"msg":"","records":[
{"checksum_errors":"0","extended":"","name":"pool1","read_IOPS":"12","read_bandwidth":"1.5K","read_errors":"0","scrub":"none","status":"ONLINE","write_IOPS":"3.5","write_bandwidth":"512","write_errors":"0"},
{"checksum_errors":"0","extended":"","name":"&nbsp;&nbsp;&nbsp;/dev/xvdf","read_IOPS":"12","read_bandwidth":"1.5K","read_errors":"0","scrub":"","status":"ONLINE","write_IOPS":"3.5","write_bandwidth":"512","write_errors":"0"}
],"success":true,"total":2},"session_id":12345,"success":true}"#;

impl MockTool {
    /// Creates an appliance with a single pool `pool1`.
    pub fn typical_appliance() -> Self {
        let mut tool = Self::new();
        tool.add_output("login", LOGIN);
        tool.add_output("overview", OVERVIEW);
        tool.add_output("perfmon", PERFMON);
        tool.add_output("pooldetails", POOL_LIST);
        tool.add_pool_output("pool1", POOL1);
        tool
    }

    /// Creates an appliance with pools `tank` and `backup`.
    pub fn two_pool_appliance() -> Self {
        let mut tool = Self::new();
        tool.add_output("login", LOGIN);
        tool.add_output("overview", OVERVIEW);
        tool.add_output("perfmon", PERFMON);
        tool.add_output(
            "pooldetails",
            r#"{"result":{"msg":"","records":[
{"name":"tank","read_IOPS":"1,204","write_IOPS":"310","read_bandwidth":"2.5M","write_bandwidth":"640K"},
{"name":"&nbsp;&nbsp;&nbsp;mirror-0","read_IOPS":"1,204","write_IOPS":"310"},
{"name":"backup","read_IOPS":"0","write_IOPS":"0","read_bandwidth":"0","write_bandwidth":"0"},
{"name":"&nbsp;&nbsp;&nbsp;/dev/xvdg","read_IOPS":"0","write_IOPS":"0"}
],"success":true,"total":4},"session_id":12345,"success":true}"#,
        );
        tool.add_pool_output(
            "tank",
            r#"{"result":{"records":[
{"name":"tank","read_IOPS":"1,204","write_IOPS":"310","read_bandwidth":"2.5M","write_bandwidth":"640K"},
{"name":"&nbsp;&nbsp;&nbsp;mirror-0","read_IOPS":"1,204","write_IOPS":"310"}
],"success":true,"total":2},"success":true}"#,
        );
        tool.add_pool_output(
            "backup",
            r#"{"result":{"records":[
{"name":"backup","read_IOPS":"0","write_IOPS":"0","read_bandwidth":"0","write_bandwidth":"0"}
],"success":true,"total":1},"success":true}"#,
        );
        tool
    }
}
