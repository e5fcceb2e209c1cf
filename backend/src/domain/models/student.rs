//! Domain model for a student.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::points::PointMap;
use super::schedule::ScheduleSlot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub birth: NaiveDate,
    pub guardian_phone: String,
    pub schedules: Vec<ScheduleSlot>,
    pub points: PointMap,
    pub spendable_points: i64,
    pub active: bool,
    pub pause_date: Option<NaiveDate>,
}

impl Student {
    pub fn generate_id() -> String {
        format!("student::{}", uuid::Uuid::new_v4())
    }

    /// Check-in secret: the last four digits of the birth date (MMDD).
    pub fn birth_secret(&self) -> String {
        self.birth.format("%m%d").to_string()
    }

    /// Last four digits of the guardian phone number, ignoring separators.
    pub fn phone_suffix(&self) -> String {
        let digits: Vec<char> = self
            .guardian_phone
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }

    /// Redemption code: birth secret followed by the phone suffix.
    pub fn redemption_code(&self) -> String {
        format!("{}{}", self.birth_secret(), self.phone_suffix())
    }

    /// Whether the student attends classes on `date`.
    pub fn is_attending_on(&self, date: NaiveDate) -> bool {
        self.active && self.pause_date.map_or(true, |paused_from| date < paused_from)
    }
}

/// A student about to be created. Defaults are applied here, once.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub birth: NaiveDate,
    pub guardian_phone: String,
    pub schedules: Vec<ScheduleSlot>,
    pub points: PointMap,
    /// Explicit starting balance; the point total when absent
    pub spendable_points: Option<i64>,
    pub active: bool,
    pub pause_date: Option<NaiveDate>,
}

impl NewStudent {
    pub fn into_student(self, id: String) -> Student {
        let spendable_points = self
            .spendable_points
            .unwrap_or_else(|| self.points.total())
            .max(0);
        Student {
            id,
            name: self.name,
            birth: self.birth,
            guardian_phone: self.guardian_phone,
            schedules: self.schedules,
            points: self.points,
            spendable_points,
            active: self.active,
            pause_date: self.pause_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::points::PointCategory;

    fn new_student() -> NewStudent {
        NewStudent {
            name: "Mina".to_string(),
            birth: NaiveDate::from_ymd_opt(2012, 4, 12).unwrap(),
            guardian_phone: "010-1234-5678".to_string(),
            schedules: vec![],
            points: PointMap::from_partial([(PointCategory::Homework, 3), (PointCategory::Exam, 2)]),
            spendable_points: None,
            active: true,
            pause_date: None,
        }
    }

    #[test]
    fn test_secrets_derived_from_birth_and_phone() {
        let student = new_student().into_student(Student::generate_id());
        assert_eq!(student.birth_secret(), "0412");
        assert_eq!(student.phone_suffix(), "5678");
        assert_eq!(student.redemption_code(), "04125678");
    }

    #[test]
    fn test_spendable_defaults_to_total() {
        let student = new_student().into_student("student::1".to_string());
        assert_eq!(student.spendable_points, 5);

        let mut explicit = new_student();
        explicit.spendable_points = Some(2);
        assert_eq!(explicit.into_student("student::2".to_string()).spendable_points, 2);
    }

    #[test]
    fn test_paused_and_inactive_students() {
        let mut student = new_student().into_student("student::1".to_string());
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(student.is_attending_on(day));

        student.pause_date = Some(day);
        assert!(!student.is_attending_on(day));
        assert!(student.is_attending_on(day.pred_opt().unwrap()));

        student.pause_date = None;
        student.active = false;
        assert!(!student.is_attending_on(day));
    }
}
