//! One-time data migrations.
//!
//! Legacy student documents carried points either as a single number or as a
//! partial category map, and often had no spendable balance at all. They are
//! normalised here, on import or at startup, so that no read path ever has to
//! fill defaults.
use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::domain::models::points::{PointCategory, PointMap};
use crate::domain::models::schedule::{parse_date, ScheduleSlot};
use crate::domain::models::student::NewStudent;

/// Give every legacy student row without a spendable balance its point total.
/// Returns the number of rows updated.
pub async fn backfill_spendable_balances(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE students
        SET spendable_points = MAX(0, COALESCE(
            (SELECT SUM(value) FROM student_points WHERE student_id = students.id), 0))
        WHERE spendable_points IS NULL
        "#,
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Points as found in legacy documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LegacyPoints {
    /// Single running total from before categories existed
    Total(i64),
    Categories(BTreeMap<String, i64>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacySchedule {
    #[serde(alias = "weekday")]
    pub day: String,
    pub time: String,
}

/// A student document as exported from the old document store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDocument {
    pub name: String,
    pub birth: String,
    #[serde(alias = "parentPhone", default)]
    pub guardian_phone: String,
    #[serde(default)]
    pub schedules: Vec<LegacySchedule>,
    #[serde(default)]
    pub points: Option<LegacyPoints>,
    #[serde(alias = "availablePoints", default)]
    pub spendable_points: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub pause_date: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Birth dates appear as "2012-04-12", "20120412" or "2012.04.12".
fn parse_legacy_birth(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    ["%Y-%m-%d", "%Y%m%d", "%Y.%m.%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| format!("Unrecognised birth date: {}", value))
}

fn migrate_points(points: Option<LegacyPoints>) -> Result<PointMap, String> {
    match points {
        None => Ok(PointMap::zeroed()),
        Some(LegacyPoints::Total(total)) => {
            Ok(PointMap::from_partial([(PointCategory::Attendance, total.max(0))]))
        }
        Some(LegacyPoints::Categories(map)) => {
            let mut values = Vec::with_capacity(map.len());
            for (key, value) in map {
                values.push((key.parse::<PointCategory>()?, value.max(0)));
            }
            Ok(PointMap::from_partial(values))
        }
    }
}

/// Convert a legacy document into a student ready for insertion.
pub fn migrate_document(doc: StudentDocument) -> Result<NewStudent, String> {
    let name = doc.name.trim().to_string();
    if name.is_empty() {
        return Err("Student name cannot be empty".to_string());
    }

    let schedules = doc
        .schedules
        .iter()
        .map(|s| ScheduleSlot::parse(&s.day, &s.time))
        .collect::<Result<Vec<_>, _>>()?;

    let pause_date = match doc.pause_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(date) => Some(parse_date(date)?),
    };

    Ok(NewStudent {
        name,
        birth: parse_legacy_birth(&doc.birth)?,
        guardian_phone: doc.guardian_phone.trim().to_string(),
        schedules,
        points: migrate_points(doc.points)?,
        spendable_points: doc.spendable_points,
        active: doc.active,
        pause_date,
    })
}
