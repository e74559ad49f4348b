use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::models::{StudentRecord, TeacherRecord, TeacherStatus};
use crate::seed;

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Loads the sample directory. Only contact details are stored; the
/// seeded check-ins belong to an in-memory session and are not written.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    for student in seed::sample_students()? {
        sqlx::query(
            r#"
            INSERT INTO school_directory.students
            (id, full_name, grade, email, phone, address, attendance_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                grade = EXCLUDED.grade,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                attendance_rate = EXCLUDED.attendance_rate
            "#,
        )
        .bind(student.id())
        .bind(student.name())
        .bind(student.grade())
        .bind(student.email.as_deref())
        .bind(student.phone.as_deref())
        .bind(student.address.as_deref())
        .bind(student.attendance_rate())
        .execute(pool)
        .await?;
    }

    for teacher in seed::sample_teachers() {
        sqlx::query(
            r#"
            INSERT INTO school_directory.teachers
            (id, full_name, subject, department, experience, status, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                subject = EXCLUDED.subject,
                department = EXCLUDED.department,
                experience = EXCLUDED.experience,
                status = EXCLUDED.status,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone
            "#,
        )
        .bind(&teacher.id)
        .bind(&teacher.name)
        .bind(&teacher.subject)
        .bind(&teacher.department)
        .bind(teacher.experience.as_deref())
        .bind(teacher.status.as_str())
        .bind(teacher.email.as_deref())
        .bind(teacher.phone.as_deref())
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Every student starts the session absent.
pub async fn fetch_students(pool: &PgPool) -> anyhow::Result<Vec<StudentRecord>> {
    let records = sqlx::query(
        "SELECT id, full_name, grade, email, phone, address, attendance_rate \
         FROM school_directory.students ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    let mut students = Vec::with_capacity(records.len());

    for row in records {
        let id: String = row.get("id");
        let name: String = row.get("full_name");
        let grade: String = row.get("grade");
        let mut student = StudentRecord::new(id, name, grade)?;
        if let Some(email) = row.get::<Option<String>, _>("email") {
            student = student.with_email(email);
        }
        if let Some(phone) = row.get::<Option<String>, _>("phone") {
            student = student.with_phone(phone);
        }
        if let Some(address) = row.get::<Option<String>, _>("address") {
            student = student.with_address(address);
        }
        if let Some(rate) = row.get::<Option<f64>, _>("attendance_rate") {
            student = student.with_attendance_rate(rate)?;
        }
        students.push(student);
    }

    tracing::info!(students = students.len(), "loaded students from Postgres");
    Ok(students)
}

pub async fn fetch_teachers(pool: &PgPool) -> anyhow::Result<Vec<TeacherRecord>> {
    let records = sqlx::query(
        "SELECT id, full_name, subject, department, experience, status, email, phone \
         FROM school_directory.teachers ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    let mut teachers = Vec::with_capacity(records.len());
    for row in records {
        let id: String = row.get("id");
        let status: String = row.get("status");
        let status = status
            .parse::<TeacherStatus>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("teacher {id}"))?;
        teachers.push(TeacherRecord {
            id,
            name: row.get("full_name"),
            subject: row.get("subject"),
            department: row.get("department"),
            experience: row.get("experience"),
            status,
            email: row.get("email"),
            phone: row.get("phone"),
        });
    }

    tracing::info!(teachers = teachers.len(), "loaded teachers from Postgres");
    Ok(teachers)
}
