use std::collections::HashMap;
use std::fmt;

use chrono::{Local, NaiveDateTime};

use crate::config::RosterConfig;
use crate::error::RosterError;
use crate::models::{AttendanceStats, CheckInEvent, StudentRecord};
use crate::notify::{CheckInNotifier, LogNotifier};
use crate::search::{self, GroupFilter};
use crate::stats;

/// Supplies the local wall-clock time used for check-ins.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Student records for one session, in load order, keyed by id.
pub struct AttendanceRoster {
    records: Vec<StudentRecord>,
    index: HashMap<String, usize>,
    config: RosterConfig,
    notifier: Box<dyn CheckInNotifier>,
}

impl fmt::Debug for AttendanceRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttendanceRoster")
            .field("records", &self.records)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AttendanceRoster {
    pub fn new(records: Vec<StudentRecord>, config: RosterConfig) -> Result<Self, RosterError> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if index.insert(record.id().to_string(), position).is_some() {
                return Err(RosterError::DuplicateId(record.id().to_string()));
            }
        }

        tracing::debug!(students = records.len(), cutoff = %config.cutoff, "roster loaded");
        Ok(Self {
            records,
            index,
            config,
            notifier: Box::new(LogNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: impl CheckInNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Marks an absent student present or late depending on `now` versus
    /// the cutoff. Students already checked in are returned unchanged.
    pub fn check_in(&mut self, id: &str, now: NaiveDateTime) -> Result<&StudentRecord, RosterError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| RosterError::NotFound(id.to_string()))?;

        let current = self.records[position].status();
        if current.is_checked_in() {
            tracing::debug!(student_id = id, status = %current, "already checked in");
            return Ok(&self.records[position]);
        }

        let status = self.config.status_at(now.time());
        let time = now.format("%H:%M").to_string();
        self.records[position].mark_checked_in(status, time.clone());

        let event = CheckInEvent {
            student_id: id.to_string(),
            new_status: status,
            check_in_time: time,
        };
        if let Err(err) = self.notifier.notify(&event) {
            tracing::warn!(student_id = id, error = %err, "check-in notification not delivered");
        }

        Ok(&self.records[position])
    }

    pub fn search(&self, query: &str, grade: &GroupFilter) -> Vec<&StudentRecord> {
        search::filter_records(&self.records, query, grade)
    }

    /// Distinct grade labels, sorted, for building a grade picker.
    pub fn grades(&self) -> Vec<String> {
        search::distinct_groups(&self.records)
    }

    pub fn stats(&self) -> AttendanceStats {
        stats::compute_stats(&self.records)
    }
}
