use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{AttendanceStatus, StudentRecord, TeacherRecord, TeacherStatus};

pub fn sample_students() -> anyhow::Result<Vec<StudentRecord>> {
    let students = vec![
        (
            "1",
            "Emma Johnson",
            "Year 10A",
            "emma.johnson@school.edu",
            "+1 (555) 0123",
            "123 Main St, Springfield",
            94.5,
            AttendanceStatus::Absent,
            None,
        ),
        (
            "2",
            "James Smith",
            "Year 10A",
            "james.smith@school.edu",
            "+1 (555) 0124",
            "456 Oak Ave, Springfield",
            89.2,
            AttendanceStatus::Present,
            Some("08:15"),
        ),
        (
            "3",
            "Sophie Chen",
            "Year 10A",
            "sophie.chen@school.edu",
            "+1 (555) 0125",
            "789 Pine Rd, Springfield",
            96.8,
            AttendanceStatus::Late,
            Some("08:45"),
        ),
        (
            "4",
            "Marcus Williams",
            "Year 10A",
            "marcus.williams@school.edu",
            "+1 (555) 0126",
            "321 Elm St, Springfield",
            87.3,
            AttendanceStatus::Absent,
            None,
        ),
        (
            "5",
            "Lily Anderson",
            "Year 10B",
            "lily.anderson@school.edu",
            "+1 (555) 0127",
            "654 Maple Dr, Springfield",
            92.1,
            AttendanceStatus::Absent,
            None,
        ),
    ];

    let mut records = Vec::with_capacity(students.len());
    for (id, name, grade, email, phone, address, rate, status, time) in students {
        let record = StudentRecord::new(id, name, grade)?
            .with_email(email)
            .with_phone(phone)
            .with_address(address)
            .with_attendance_rate(rate)?
            .with_attendance(status, time)?;
        records.push(record);
    }
    Ok(records)
}

pub fn sample_teachers() -> Vec<TeacherRecord> {
    let teachers = [
        (
            "TCH001",
            "Dr. Sarah Wilson",
            "Mathematics",
            "Science",
            "10 years",
            TeacherStatus::Active,
            "sarah.wilson@school.edu",
            "+1 234-567-9001",
        ),
        (
            "TCH002",
            "Mr. John Martinez",
            "Physics",
            "Science",
            "8 years",
            TeacherStatus::Active,
            "john.martinez@school.edu",
            "+1 234-567-9002",
        ),
        (
            "TCH003",
            "Ms. Emily Chen",
            "English Literature",
            "Arts",
            "5 years",
            TeacherStatus::OnLeave,
            "emily.chen@school.edu",
            "+1 234-567-9003",
        ),
    ];

    teachers
        .into_iter()
        .map(
            |(id, name, subject, department, experience, status, email, phone)| TeacherRecord {
                id: id.to_string(),
                name: name.to_string(),
                subject: subject.to_string(),
                department: department.to_string(),
                experience: Some(experience.to_string()),
                status,
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
            },
        )
        .collect()
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    id: Option<String>,
    name: String,
    grade: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    status: Option<String>,
    check_in_time: Option<String>,
    attendance_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TeacherRow {
    id: Option<String>,
    name: String,
    subject: String,
    department: String,
    experience: Option<String>,
    status: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_students_csv(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let students = read_students(file).with_context(|| format!("in {}", path.display()))?;
    tracing::info!(path = %path.display(), students = students.len(), "loaded students from csv");
    Ok(students)
}

pub fn read_students<R: Read>(input: R) -> anyhow::Result<Vec<StudentRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut students = Vec::new();

    for (line, result) in reader.deserialize::<StudentRow>().enumerate() {
        let row_number = line + 2;
        let row = result.with_context(|| format!("row {row_number} is malformed"))?;

        let id = non_empty(row.id).unwrap_or_else(|| Uuid::new_v4().to_string());
        let status = match non_empty(row.status) {
            Some(raw) => raw
                .parse::<AttendanceStatus>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("row {row_number}"))?,
            None => AttendanceStatus::Absent,
        };
        let check_in_time = non_empty(row.check_in_time);

        let mut record = StudentRecord::new(id, row.name, row.grade)
            .and_then(|record| record.with_attendance(status, check_in_time.as_deref()))
            .with_context(|| format!("row {row_number}"))?;
        if let Some(email) = non_empty(row.email) {
            record = record.with_email(email);
        }
        if let Some(phone) = non_empty(row.phone) {
            record = record.with_phone(phone);
        }
        if let Some(address) = non_empty(row.address) {
            record = record.with_address(address);
        }
        if let Some(rate) = row.attendance_rate {
            record = record
                .with_attendance_rate(rate)
                .with_context(|| format!("row {row_number}"))?;
        }
        students.push(record);
    }

    Ok(students)
}

pub fn load_teachers_csv(path: &Path) -> anyhow::Result<Vec<TeacherRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let teachers = read_teachers(file).with_context(|| format!("in {}", path.display()))?;
    tracing::info!(path = %path.display(), teachers = teachers.len(), "loaded teachers from csv");
    Ok(teachers)
}

pub fn read_teachers<R: Read>(input: R) -> anyhow::Result<Vec<TeacherRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut teachers = Vec::new();

    for (line, result) in reader.deserialize::<TeacherRow>().enumerate() {
        let row_number = line + 2;
        let row = result.with_context(|| format!("row {row_number} is malformed"))?;
        let status = match non_empty(row.status) {
            Some(raw) => raw
                .parse::<TeacherStatus>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("row {row_number}"))?,
            None => TeacherStatus::Active,
        };

        teachers.push(TeacherRecord {
            id: non_empty(row.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: row.name,
            subject: row.subject,
            department: row.department,
            experience: non_empty(row.experience),
            status,
            email: non_empty(row.email),
            phone: non_empty(row.phone),
        });
    }

    Ok(teachers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "id,name,grade,email,phone,address,status,check_in_time,attendance_rate\n";

    #[test]
    fn sample_data_matches_dashboard() {
        let students = sample_students().unwrap();
        assert_eq!(students.len(), 5);
        assert_eq!(students[1].status(), AttendanceStatus::Present);
        assert_eq!(students[1].check_in_time(), Some("08:15"));
        assert_eq!(students[2].status(), AttendanceStatus::Late);
        assert_eq!(students[4].grade(), "Year 10B");

        let teachers = sample_teachers();
        assert_eq!(teachers.len(), 3);
        assert_eq!(teachers[2].status, TeacherStatus::OnLeave);
    }

    #[test]
    fn reads_students_with_optional_columns() {
        let csv = format!(
            "{HEADER}1,Emma Johnson,Year 10A,emma@school.edu,,,,,94.5\n\
             2,James Smith,Year 10A,,,,present,08:15,\n\
             ,Nadia Okafor,Year 11C,,,,,,\n"
        );
        let students = read_students(csv.as_bytes()).unwrap();
        assert_eq!(students.len(), 3);
        assert_eq!(students[0].email.as_deref(), Some("emma@school.edu"));
        assert_eq!(students[0].phone, None);
        assert_eq!(students[0].attendance_rate(), Some(94.5));
        assert_eq!(students[1].status(), AttendanceStatus::Present);
        assert_eq!(students[1].check_in_time(), Some("08:15"));
        assert_eq!(students[2].status(), AttendanceStatus::Absent);
        assert!(!students[2].id().is_empty());
    }

    #[test]
    fn rejects_checked_in_row_without_time() {
        let csv = format!("{HEADER}2,James Smith,Year 10A,,,,late,,\n");
        let err = read_students(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
    }

    #[test]
    fn rejects_unknown_status() {
        let csv = format!("{HEADER}2,James Smith,Year 10A,,,,tardy,08:40,\n");
        assert!(read_students(csv.as_bytes()).is_err());
    }

    #[test]
    fn loads_students_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}5,Lily Anderson,Year 10B,,,,,,92.1").unwrap();
        let students = load_students_csv(file.path()).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name(), "Lily Anderson");
    }

    #[test]
    fn bundled_csv_matches_sample_data() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let students = load_students_csv(&dir.join("students.csv")).unwrap();
        assert_eq!(students, sample_students().unwrap());
        let teachers = load_teachers_csv(&dir.join("teachers.csv")).unwrap();
        assert_eq!(teachers, sample_teachers());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_students_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn reads_teachers() {
        let csv = "id,name,subject,department,experience,status,email,phone\n\
                   TCH003,Ms. Emily Chen,English Literature,Arts,5 years,On Leave,emily.chen@school.edu,\n\
                   TCH004,Mr. Ravi Patel,Chemistry,Science,,,,\n";
        let teachers = read_teachers(csv.as_bytes()).unwrap();
        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers[0].status, TeacherStatus::OnLeave);
        assert_eq!(teachers[0].phone, None);
        assert_eq!(teachers[1].status, TeacherStatus::Active);
        assert_eq!(teachers[1].experience, None);
    }
}
