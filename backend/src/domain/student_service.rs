use tracing::{info, warn};

use crate::domain::commands::students::ImportStudentsResult;
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::student::{NewStudent, Student};
use crate::domain::session::SessionContext;
use crate::storage::migration::{migrate_document, StudentDocument};
use crate::storage::StudentRepository;

/// Service for registering and looking up students
#[derive(Clone)]
pub struct StudentService {
    students: StudentRepository,
}

impl StudentService {
    pub fn new(students: StudentRepository) -> Self {
        Self { students }
    }

    /// Create a student. Every category starts present and spendable starts at the total.
    pub async fn create_student(
        &self,
        session: &SessionContext,
        new_student: NewStudent,
    ) -> CoreResult<Student> {
        session.require_open()?;
        info!("Creating student: name={}", new_student.name);

        Self::validate(&new_student)?;
        let student = new_student.into_student(Student::generate_id());

        if !self.students.insert_student(&student).await? {
            warn!("Student name already taken: {}", student.name);
            return Err(CoreError::InvalidInput(format!(
                "A student named '{}' already exists",
                student.name
            )));
        }

        info!("Created student: {} with ID: {}", student.name, student.id);
        Ok(student)
    }

    pub async fn get_student(&self, student_id: &str) -> CoreResult<Student> {
        self.students
            .get_student(student_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student {}", student_id)))
    }

    pub async fn list_students(&self) -> CoreResult<Vec<Student>> {
        let students = self.students.list_students().await?;
        info!("Found {} students", students.len());
        Ok(students)
    }

    /// Import legacy documents through the one-time migration.
    ///
    /// Documents that fail to convert or whose name is taken are skipped and reported.
    pub async fn import_documents(
        &self,
        session: &SessionContext,
        documents: Vec<StudentDocument>,
    ) -> CoreResult<ImportStudentsResult> {
        session.require_open()?;
        info!("Importing {} legacy student documents", documents.len());

        let mut imported = Vec::new();
        let mut skipped = Vec::new();

        for document in documents {
            let label = document.name.clone();
            let new_student = match migrate_document(document) {
                Ok(new_student) => new_student,
                Err(reason) => {
                    warn!("Skipping document '{}': {}", label, reason);
                    skipped.push(format!("{}: {}", label, reason));
                    continue;
                }
            };

            if let Err(e) = Self::validate(&new_student) {
                skipped.push(format!("{}: {}", label, e));
                continue;
            }

            let student = new_student.into_student(Student::generate_id());
            if self.students.insert_student(&student).await? {
                imported.push(student);
            } else {
                skipped.push(format!("{}: name already exists", label));
            }
        }

        info!("Imported {} students, skipped {}", imported.len(), skipped.len());
        Ok(ImportStudentsResult { imported, skipped })
    }

    fn validate(new_student: &NewStudent) -> CoreResult<()> {
        if new_student.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("Student name cannot be empty".to_string()));
        }
        if new_student.points.iter().any(|(_, value)| value < 0) {
            return Err(CoreError::InvalidInput("Points cannot be negative".to_string()));
        }
        if new_student.spendable_points.map_or(false, |value| value < 0) {
            return Err(CoreError::InvalidInput(
                "Spendable points cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::points::{PointCategory, PointMap};
    use crate::storage::DbConnection;
    use crate::test_support::date;
    use serde_json::json;

    async fn setup() -> StudentService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        StudentService::new(StudentRepository::new(db))
    }

    fn new_student(name: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            birth: date("2012-04-12"),
            guardian_phone: "010-1234-5678".to_string(),
            schedules: Vec::new(),
            points: PointMap::from_partial([(PointCategory::Exam, 4), (PointCategory::Homework, 2)]),
            spendable_points: None,
            active: true,
            pause_date: None,
        }
    }

    #[tokio::test]
    async fn test_new_student_starts_with_spendable_equal_to_total() {
        let service = setup().await;
        let student = service
            .create_student(&SessionContext::open(), new_student("Minji"))
            .await
            .expect("Failed to create student");

        let stored = service.get_student(&student.id).await.unwrap();
        assert_eq!(stored.points.total(), 6);
        assert_eq!(stored.spendable_points, 6);
        assert_eq!(stored.points.get(PointCategory::Workbook), 0);
    }

    #[tokio::test]
    async fn test_create_requires_open_desk_and_unique_name() {
        let service = setup().await;

        let closed = service
            .create_student(&SessionContext::closed(), new_student("Minji"))
            .await;
        assert!(matches!(closed, Err(CoreError::Unauthorized)));

        service
            .create_student(&SessionContext::open(), new_student("Minji"))
            .await
            .unwrap();
        let duplicate = service
            .create_student(&SessionContext::open(), new_student("Minji"))
            .await;
        assert!(matches!(duplicate, Err(CoreError::InvalidInput(_))));

        let blank = service
            .create_student(&SessionContext::open(), new_student("  "))
            .await;
        assert!(matches!(blank, Err(CoreError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_import_migrates_and_reports_skips() {
        let service = setup().await;
        let documents: Vec<StudentDocument> = serde_json::from_value(json!([
            { "name": "Jisoo", "birth": "20120412", "parentPhone": "01022223333", "points": 7 },
            { "name": "Hana", "birth": "2013-01-05", "points": { "homework": 2 }, "availablePoints": 1 },
            { "name": "Broken", "birth": "not a date" },
            { "name": "Jisoo", "birth": "2012-04-12" }
        ]))
        .unwrap();

        let result = service
            .import_documents(&SessionContext::open(), documents)
            .await
            .unwrap();
        assert_eq!(result.imported.len(), 2);
        assert_eq!(result.skipped.len(), 2);

        let jisoo = &result.imported[0];
        assert_eq!(jisoo.points.get(PointCategory::Attendance), 7);
        assert_eq!(jisoo.spendable_points, 7);
        let hana = &result.imported[1];
        assert_eq!(hana.spendable_points, 1);
        assert_eq!(service.list_students().await.unwrap().len(), 2);
    }
}
