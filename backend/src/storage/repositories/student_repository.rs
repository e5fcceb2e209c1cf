use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

use super::{format_date, parse_stored_date};
use crate::domain::models::points::{PointCategory, PointMap};
use crate::domain::models::schedule::ScheduleSlot;
use crate::domain::models::student::Student;
use crate::storage::DbConnection;

/// Repository for student rows and their per-category point rows
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a student with one point row per category.
    ///
    /// Returns false, writing nothing, when the name is already taken.
    pub async fn insert_student(&self, student: &Student) -> Result<bool> {
        let schedules = serde_json::to_string(&student.schedules)?;
        let mut tx = self.db.pool().begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO students (id, name, birth, guardian_phone, schedules, spendable_points, active, pause_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(&student.id)
        .bind(&student.name)
        .bind(format_date(student.birth))
        .bind(&student.guardian_phone)
        .bind(&schedules)
        .bind(student.spendable_points)
        .bind(student.active)
        .bind(student.pause_date.map(format_date))
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if !inserted {
            return Ok(false);
        }

        for category in PointCategory::ALL {
            sqlx::query(
                r#"
                INSERT INTO student_points (student_id, category, value)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&student.id)
            .bind(category.as_str())
            .bind(student.points.get(category))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Get a student by ID
    pub async fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, birth, guardian_phone, schedules, spendable_points, active, pause_date
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let point_rows = sqlx::query(
            r#"
            SELECT student_id, category, value
            FROM student_points
            WHERE student_id = ?
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut points = group_points(&point_rows)?;
        let student = student_from_row(&row, points.remove(student_id).unwrap_or_default())?;
        Ok(Some(student))
    }

    /// List all students ordered by name
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, birth, guardian_phone, schedules, spendable_points, active, pause_date
            FROM students
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let point_rows = sqlx::query("SELECT student_id, category, value FROM student_points")
            .fetch_all(self.db.pool())
            .await?;
        let mut points = group_points(&point_rows)?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                student_from_row(row, points.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

fn group_points(rows: &[SqliteRow]) -> Result<HashMap<String, Vec<(PointCategory, i64)>>> {
    let mut grouped: HashMap<String, Vec<(PointCategory, i64)>> = HashMap::new();
    for row in rows {
        let category: String = row.get("category");
        let category = category
            .parse::<PointCategory>()
            .map_err(|e| anyhow!(e))?;
        grouped
            .entry(row.get("student_id"))
            .or_default()
            .push((category, row.get("value")));
    }
    Ok(grouped)
}

fn student_from_row(row: &SqliteRow, points: Vec<(PointCategory, i64)>) -> Result<Student> {
    let id: String = row.get("id");
    let birth: String = row.get("birth");
    let schedules: String = row.get("schedules");
    let pause_date: Option<String> = row.get("pause_date");
    let spendable_points: Option<i64> = row.get("spendable_points");

    // The startup migration fills every legacy NULL before any read
    let spendable_points =
        spendable_points.ok_or_else(|| anyhow!("Student {} has no spendable balance", id))?;

    Ok(Student {
        name: row.get("name"),
        birth: parse_stored_date(&birth)?,
        guardian_phone: row.get("guardian_phone"),
        schedules: serde_json::from_str::<Vec<ScheduleSlot>>(&schedules)?,
        points: PointMap::from_partial(points),
        spendable_points,
        active: row.get("active"),
        pause_date: pause_date.as_deref().map(parse_stored_date).transpose()?,
        id,
    })
}
