use std::fmt::Write;

use chrono::{NaiveDate, NaiveTime};

use crate::directory::TeacherDirectory;
use crate::models::{AttendanceStatus, StudentRecord, TeacherStatus};
use crate::stats::{self, AttendanceBand, DailyBand};

pub fn build_report(
    date: NaiveDate,
    cutoff: NaiveTime,
    students: &[StudentRecord],
    teachers: &TeacherDirectory,
) -> String {
    let overall = stats::compute_stats(students);
    let by_grade = stats::stats_by_grade(students);

    let mut output = String::new();

    let _ = writeln!(output, "# Attendance Report");
    let _ = writeln!(
        output,
        "Generated for {} (late after {})",
        date.format("%A, %B %-d, %Y"),
        cutoff.format("%H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Today");
    let _ = writeln!(output, "- Total students: {}", overall.total);
    let _ = writeln!(output, "- Present: {}", overall.present);
    let _ = writeln!(output, "- Late: {}", overall.late);
    let _ = writeln!(output, "- Absent: {}", overall.absent);
    let _ = writeln!(
        output,
        "- Attendance rate: {:.1}% ({})",
        overall.rate,
        DailyBand::for_rate(overall.rate).label()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## By Grade");
    if by_grade.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        let _ = writeln!(output, "| Grade | Present | Late | Absent | Rate |");
        let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
        for grade in by_grade.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {:.1}% |",
                grade.grade,
                grade.stats.present,
                grade.stats.late,
                grade.stats.absent,
                grade.stats.rate
            );
        }
    }

    let mut late: Vec<&StudentRecord> = students
        .iter()
        .filter(|s| s.status() == AttendanceStatus::Late)
        .collect();
    late.sort_by(|a, b| a.check_in_time().cmp(&b.check_in_time()));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Late Arrivals");
    if late.is_empty() {
        let _ = writeln!(output, "No late arrivals.");
    } else {
        for student in late {
            let _ = writeln!(
                output,
                "- {} ({}) at {}",
                student.name(),
                student.grade(),
                student.check_in_time().unwrap_or("-")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Not Yet Checked In");
    let absent: Vec<&StudentRecord> = students
        .iter()
        .filter(|s| s.status() == AttendanceStatus::Absent)
        .collect();
    if absent.is_empty() {
        let _ = writeln!(output, "Everyone has checked in.");
    } else {
        for student in absent {
            let _ = write!(output, "- {} ({})", student.name(), student.grade());
            if let Some(rate) = student.attendance_rate() {
                let _ = write!(
                    output,
                    ", usual attendance {:.1}% ({})",
                    rate,
                    AttendanceBand::for_rate(rate).label()
                );
            }
            let _ = writeln!(output);
        }
    }

    let summary = teachers.summary();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Staff");
    if summary.total == 0 {
        let _ = writeln!(output, "No teachers in the directory.");
    } else {
        let _ = writeln!(
            output,
            "{} teachers: {} active, {} on leave, {} inactive",
            summary.total, summary.active, summary.on_leave, summary.inactive
        );
        let unavailable = teachers
            .teachers()
            .iter()
            .filter(|t| t.status != TeacherStatus::Active);
        for teacher in unavailable {
            let _ = writeln!(
                output,
                "- {} ({}, {}): {}",
                teacher.name, teacher.subject, teacher.department, teacher.status
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    fn cutoff() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 30, 0).unwrap()
    }

    #[test]
    fn report_covers_sample_day() {
        let students = seed::sample_students().unwrap();
        let teachers = TeacherDirectory::new(seed::sample_teachers()).unwrap();
        let report = build_report(date(), cutoff(), &students, &teachers);

        assert!(report.starts_with("# Attendance Report"));
        assert!(report.contains("Monday, February 2, 2026 (late after 08:30)"));
        assert!(report.contains("- Attendance rate: 40.0% (critical)"));
        assert!(report.contains("| Year 10A | 1 | 1 | 2 | 50.0% |"));
        assert!(report.contains("- Sophie Chen (Year 10A) at 08:45"));
        assert!(report.contains("- Emma Johnson (Year 10A), usual attendance 94.5% (good)"));
        assert!(report.contains("3 teachers: 2 active, 1 on leave, 0 inactive"));
        assert!(report.contains("- Ms. Emily Chen (English Literature, Arts): On Leave"));
    }

    #[test]
    fn empty_inputs_render_placeholders() {
        let report = build_report(date(), cutoff(), &[], &TeacherDirectory::default());
        assert!(report.contains("No students on the roster."));
        assert!(report.contains("No late arrivals."));
        assert!(report.contains("Everyone has checked in."));
        assert!(report.contains("No teachers in the directory."));
        assert!(report.contains("- Attendance rate: 0.0% (critical)"));
    }
}
