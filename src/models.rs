use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::RosterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn is_checked_in(&self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(format!("unknown attendance status {other:?}")),
        }
    }
}

/// A student on the roster.
///
/// Status and check-in time are only reachable through validated
/// constructors and the roster's check-in transition, so a record always
/// carries a time exactly when it is present or late.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    id: String,
    name: String,
    grade: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    status: AttendanceStatus,
    check_in_time: Option<String>,
    attendance_rate: Option<f64>,
}

impl StudentRecord {
    /// Creates an absent student.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        grade: impl Into<String>,
    ) -> Result<Self, RosterError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(RosterError::invalid(&id, "id must not be empty"));
        }
        if name.trim().is_empty() {
            return Err(RosterError::invalid(&id, "name must not be empty"));
        }

        Ok(Self {
            id,
            name,
            grade: grade.into(),
            email: None,
            phone: None,
            address: None,
            status: AttendanceStatus::Absent,
            check_in_time: None,
            attendance_rate: None,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_attendance_rate(mut self, rate: f64) -> Result<Self, RosterError> {
        if !(0.0..=100.0).contains(&rate) {
            return Err(RosterError::invalid(
                &self.id,
                format!("attendance rate {rate} is outside 0-100"),
            ));
        }
        self.attendance_rate = Some(rate);
        Ok(self)
    }

    /// Seeds an attendance state, e.g. a student who already checked in
    /// before the roster was loaded.
    pub fn with_attendance(
        mut self,
        status: AttendanceStatus,
        check_in_time: Option<&str>,
    ) -> Result<Self, RosterError> {
        let time = match (status.is_checked_in(), check_in_time) {
            (true, Some(raw)) => Some(normalize_clock(&self.id, raw)?),
            (false, None) => None,
            (true, None) => {
                return Err(RosterError::invalid(
                    &self.id,
                    format!("status {status} requires a check-in time"),
                ))
            }
            (false, Some(_)) => {
                return Err(RosterError::invalid(
                    &self.id,
                    "an absent student cannot have a check-in time",
                ))
            }
        };
        self.status = status;
        self.check_in_time = time;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn status(&self) -> AttendanceStatus {
        self.status
    }

    pub fn check_in_time(&self) -> Option<&str> {
        self.check_in_time.as_deref()
    }

    pub fn attendance_rate(&self) -> Option<f64> {
        self.attendance_rate
    }

    pub(crate) fn mark_checked_in(&mut self, status: AttendanceStatus, time: String) {
        debug_assert!(status.is_checked_in());
        self.status = status;
        self.check_in_time = Some(time);
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}) {}", self.id, self.name, self.grade, self.status)?;
        if let Some(time) = &self.check_in_time {
            write!(f, " at {time}")?;
        }
        Ok(())
    }
}

fn normalize_clock(id: &str, raw: &str) -> Result<String, RosterError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| RosterError::invalid(id, format!("check-in time {raw:?} is not HH:MM")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeacherStatus {
    Active,
    #[serde(rename = "On Leave")]
    OnLeave,
    Inactive,
}

impl TeacherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeacherStatus::Active => "Active",
            TeacherStatus::OnLeave => "On Leave",
            TeacherStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeacherStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(TeacherStatus::Active),
            "onleave" => Ok(TeacherStatus::OnLeave),
            "inactive" => Ok(TeacherStatus::Inactive),
            _ => Err(format!("unknown teacher status {value:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherRecord {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub department: String,
    pub experience: Option<String>,
    pub status: TeacherStatus,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl fmt::Display for TeacherRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} ({}) {}",
            self.id, self.name, self.subject, self.department, self.status
        )
    }
}

/// Emitted once per successful absent -> present/late transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInEvent {
    pub student_id: String,
    pub new_status: AttendanceStatus,
    pub check_in_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub rate: f64,
}

impl fmt::Display for AttendanceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {} | present {} | late {} | absent {} | rate {:.1}%",
            self.total, self.present, self.late, self.absent, self.rate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeStats {
    pub grade: String,
    pub stats: AttendanceStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_student_starts_absent_without_time() {
        let student = StudentRecord::new("1", "Emma Johnson", "Year 10A").unwrap();
        assert_eq!(student.status(), AttendanceStatus::Absent);
        assert_eq!(student.check_in_time(), None);
    }

    #[test]
    fn rejects_blank_name() {
        let err = StudentRecord::new("7", "  ", "Year 10A").unwrap_err();
        assert!(matches!(err, RosterError::InvalidRecord { ref id, .. } if id == "7"));
    }

    #[test]
    fn seeded_attendance_must_keep_time_and_status_together() {
        let base = StudentRecord::new("2", "James Smith", "Year 10A").unwrap();

        let present = base
            .clone()
            .with_attendance(AttendanceStatus::Present, Some("8:15"))
            .unwrap();
        assert_eq!(present.check_in_time(), Some("08:15"));

        assert!(base
            .clone()
            .with_attendance(AttendanceStatus::Late, None)
            .is_err());
        assert!(base
            .clone()
            .with_attendance(AttendanceStatus::Absent, Some("08:15"))
            .is_err());
        assert!(base
            .with_attendance(AttendanceStatus::Present, Some("soon"))
            .is_err());
    }

    #[test]
    fn attendance_rate_is_bounded() {
        let student = StudentRecord::new("3", "Sophie Chen", "Year 10A").unwrap();
        assert!(student.clone().with_attendance_rate(96.8).is_ok());
        assert!(student.clone().with_attendance_rate(100.5).is_err());
        assert!(student.with_attendance_rate(-1.0).is_err());
    }

    #[test]
    fn parses_statuses_loosely() {
        assert_eq!("Late".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Late));
        assert!("tardy".parse::<AttendanceStatus>().is_err());
        assert_eq!("On Leave".parse::<TeacherStatus>(), Ok(TeacherStatus::OnLeave));
        assert_eq!("on_leave".parse::<TeacherStatus>(), Ok(TeacherStatus::OnLeave));
    }

    #[test]
    fn display_includes_check_in_time_when_present() {
        let student = StudentRecord::new("2", "James Smith", "Year 10A")
            .unwrap()
            .with_attendance(AttendanceStatus::Present, Some("08:15"))
            .unwrap();
        assert_eq!(
            student.to_string(),
            "[2] James Smith (Year 10A) present at 08:15"
        );
    }
}
