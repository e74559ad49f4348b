//! Attendance roster for a school office: student check-in against a
//! late cutoff, roster and staff search, and attendance statistics.

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod notify;
pub mod report;
pub mod roster;
pub mod search;
pub mod seed;
pub mod session;
pub mod stats;

pub use config::RosterConfig;
pub use directory::TeacherDirectory;
pub use error::{ConfigError, NotifyError, RosterError};
pub use models::{
    AttendanceStats, AttendanceStatus, CheckInEvent, StudentRecord, TeacherRecord, TeacherStatus,
};
pub use notify::{ChannelNotifier, CheckInNotifier, LogNotifier};
pub use roster::{AttendanceRoster, Clock, FixedClock, SystemClock};
pub use search::GroupFilter;
pub use stats::compute_stats;
