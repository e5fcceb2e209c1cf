use tracing::{info, warn};

use crate::domain::commands::ledger::{AdjustPointsCommand, AdjustPointsResult, Balance};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::session::SessionContext;
use crate::storage::{retry_once, LedgerRepository, StudentRepository};

/// Manual point adjustments and balance lookups
#[derive(Clone)]
pub struct LedgerService {
    students: StudentRepository,
    ledger: LedgerRepository,
}

impl LedgerService {
    pub fn new(students: StudentRepository, ledger: LedgerRepository) -> Self {
        Self { students, ledger }
    }

    /// Apply a signed change to one category, floored at zero.
    ///
    /// Manual adjustments leave the spendable balance alone.
    pub async fn adjust(
        &self,
        session: &SessionContext,
        command: AdjustPointsCommand,
    ) -> CoreResult<AdjustPointsResult> {
        session.require_open()?;
        info!(
            "Adjusting {} points for {} by {}",
            command.category, command.student_id, command.delta
        );

        let value = retry_once("point adjustment", || {
            self.ledger
                .adjust(&command.student_id, command.category, command.delta)
        })
        .await?;

        match value {
            Some(value) => Ok(AdjustPointsResult {
                student_id: command.student_id,
                category: command.category,
                value,
            }),
            None => {
                warn!("Point adjustment for unknown student {}", command.student_id);
                Err(CoreError::NotFound(format!("Student {}", command.student_id)))
            }
        }
    }

    pub async fn balance(&self, student_id: &str) -> CoreResult<Balance> {
        let student = self
            .students
            .get_student(student_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student {}", student_id)))?;

        Ok(Balance {
            total: student.points.total(),
            spendable: student.spendable_points,
            student_id: student.id,
            student_name: student.name,
            points: student.points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::points::PointCategory;
    use crate::storage::DbConnection;
    use crate::test_support::new_student;

    #[tokio::test]
    async fn test_adjust_and_balance() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let students = StudentRepository::new(db.clone());
        let service = LedgerService::new(students.clone(), LedgerRepository::new(db));

        let student = new_student("Minji", "2012-04-12", "010-1234-5678");
        students.insert_student(&student).await.unwrap();

        let open = SessionContext::open();
        let adjust = |category, delta| AdjustPointsCommand {
            student_id: student.id.clone(),
            category,
            delta,
        };

        let result = service.adjust(&open, adjust(PointCategory::Exam, 5)).await.unwrap();
        assert_eq!(result.value, 5);
        service.adjust(&open, adjust(PointCategory::Homework, 2)).await.unwrap();
        let floored = service.adjust(&open, adjust(PointCategory::Exam, -9)).await.unwrap();
        assert_eq!(floored.value, 0);

        let balance = service.balance(&student.id).await.unwrap();
        assert_eq!(balance.total, 2);
        assert_eq!(balance.total, balance.points.iter().map(|(_, v)| v).sum::<i64>());
        assert_eq!(balance.spendable, 0);
    }

    #[tokio::test]
    async fn test_adjust_rejects_unknown_student_and_closed_desk() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = LedgerService::new(StudentRepository::new(db.clone()), LedgerRepository::new(db));

        let command = AdjustPointsCommand {
            student_id: "student::missing".to_string(),
            category: PointCategory::Exam,
            delta: 1,
        };
        let missing = service.adjust(&SessionContext::open(), command.clone()).await;
        assert!(matches!(missing, Err(CoreError::NotFound(_))));

        let closed = service.adjust(&SessionContext::closed(), command).await;
        assert!(matches!(closed, Err(CoreError::Unauthorized)));

        assert!(matches!(
            service.balance("student::missing").await,
            Err(CoreError::NotFound(_))
        ));
    }
}
