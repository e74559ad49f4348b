use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{AttendanceStats, AttendanceStatus, GradeStats, StudentRecord};

pub fn compute_stats<'a, I>(records: I) -> AttendanceStats
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let mut stats = AttendanceStats {
        total: 0,
        present: 0,
        late: 0,
        absent: 0,
        rate: 0.0,
    };

    for record in records {
        stats.total += 1;
        match record.status() {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Late => stats.late += 1,
            AttendanceStatus::Absent => stats.absent += 1,
        }
    }

    if stats.total > 0 {
        let attended = (stats.present + stats.late) as f64;
        stats.rate = round_one_decimal(100.0 * attended / stats.total as f64);
    }
    stats
}

pub fn stats_by_grade(records: &[StudentRecord]) -> Vec<GradeStats> {
    let mut grouped: BTreeMap<&str, Vec<&StudentRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.grade()).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(grade, members)| GradeStats {
            grade: grade.to_string(),
            stats: compute_stats(members),
        })
        .collect()
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Long-run attendance rate bands for a single student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AttendanceBand {
    pub fn for_rate(rate: f64) -> Self {
        match rate {
            r if r >= 95.0 => AttendanceBand::Excellent,
            r if r >= 85.0 => AttendanceBand::Good,
            r if r >= 75.0 => AttendanceBand::Fair,
            _ => AttendanceBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceBand::Excellent => "excellent",
            AttendanceBand::Good => "good",
            AttendanceBand::Fair => "fair",
            AttendanceBand::Poor => "poor",
        }
    }
}

/// Bands for a single day's cohort rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DailyBand {
    OnTrack,
    Watch,
    Critical,
}

impl DailyBand {
    pub fn for_rate(rate: f64) -> Self {
        match rate {
            r if r >= 90.0 => DailyBand::OnTrack,
            r if r >= 75.0 => DailyBand::Watch,
            _ => DailyBand::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DailyBand::OnTrack => "on track",
            DailyBand::Watch => "watch",
            DailyBand::Critical => "critical",
        }
    }
}
