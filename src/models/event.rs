use chrono::{DateTime, Local};

use super::{AlertKind, ComparisonRow, LinkPair};

/// Messages sent from the comparison worker to the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        run: u32,
        first_run_at: DateTime<Local>,
        started_at: DateTime<Local>,
        total: usize,
    },
    Progress(u8),
    Row(ComparisonRow),
    Alert {
        kind: AlertKind,
        row: ComparisonRow,
        pair: LinkPair,
    },
    Completed {
        rows: Vec<ComparisonRow>,
    },
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}
