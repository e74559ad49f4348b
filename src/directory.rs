use std::collections::HashSet;

use serde::Serialize;

use crate::error::RosterError;
use crate::models::{TeacherRecord, TeacherStatus};
use crate::search::{self, GroupFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StaffSummary {
    pub total: usize,
    pub active: usize,
    pub on_leave: usize,
    pub inactive: usize,
}

/// Teaching staff for the session. Same search rules as the student
/// roster, keyed by department instead of grade.
#[derive(Debug, Clone, Default)]
pub struct TeacherDirectory {
    teachers: Vec<TeacherRecord>,
}

impl TeacherDirectory {
    pub fn new(teachers: Vec<TeacherRecord>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        for teacher in &teachers {
            if teacher.name.trim().is_empty() {
                return Err(RosterError::invalid(&teacher.id, "name must not be empty"));
            }
            if !seen.insert(teacher.id.as_str()) {
                return Err(RosterError::DuplicateId(teacher.id.clone()));
            }
        }
        Ok(Self { teachers })
    }

    pub fn teachers(&self) -> &[TeacherRecord] {
        &self.teachers
    }

    pub fn get(&self, id: &str) -> Option<&TeacherRecord> {
        self.teachers.iter().find(|teacher| teacher.id == id)
    }

    pub fn search(&self, query: &str, department: &GroupFilter) -> Vec<&TeacherRecord> {
        search::filter_records(&self.teachers, query, department)
    }

    pub fn departments(&self) -> Vec<String> {
        search::distinct_groups(&self.teachers)
    }

    pub fn summary(&self) -> StaffSummary {
        let mut summary = StaffSummary {
            total: self.teachers.len(),
            ..StaffSummary::default()
        };
        for teacher in &self.teachers {
            match teacher.status {
                TeacherStatus::Active => summary.active += 1,
                TeacherStatus::OnLeave => summary.on_leave += 1,
                TeacherStatus::Inactive => summary.inactive += 1,
            }
        }
        summary
    }
}
