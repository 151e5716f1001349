//! Ordinal tables for categorical bean values.

/// Ordinal reported for a state string the table does not know.
pub const UNKNOWN_STATE: f64 = 9999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTable {
    /// NameNode HA state (`tag.HAState`).
    HaState,
    /// HDFS file system state (`FSState`).
    FsState,
    /// YARN NodeManager state reported by the ResourceManager.
    NodeState,
}

impl StateTable {
    pub fn ordinal(&self, value: &str) -> f64 {
        match self {
            StateTable::HaState => match value {
                "initializing" => 0.0,
                "active" => 1.0,
                "standby" => 2.0,
                "stopping" => 3.0,
                _ => UNKNOWN_STATE,
            },
            StateTable::FsState => match value {
                "Safemode" => 0.0,
                "Operational" => 1.0,
                _ => UNKNOWN_STATE,
            },
            StateTable::NodeState => match value {
                "NEW" => 1.0,
                "RUNNING" => 2.0,
                "UNHEALTHY" => 3.0,
                "DECOMMISSIONED" => 4.0,
                "LOST" => 5.0,
                "REBOOTED" => 6.0,
                _ => UNKNOWN_STATE,
            },
        }
    }
}
