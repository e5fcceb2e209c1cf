//! Point shop redemptions.
//!
//! A redemption debits the spendable balance and appends to the log in one
//! transaction; the debit itself only succeeds when the balance covers the cost.
use tracing::{info, warn};

use crate::domain::commands::redemption::{
    CreateShopItemCommand, RedeemCommand, RedeemResult, ReverseRedemptionCommand,
    ReverseRedemptionResult,
};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::local_clock::LocalClock;
use crate::domain::models::redemption::{RedemptionEntry, ShopItem};
use crate::domain::models::student::Student;
use crate::domain::session::SessionContext;
use crate::storage::{
    retry_once, DbConnection, LedgerRepository, RedemptionRepository, ShopItemRepository,
    StudentRepository,
};

#[derive(Clone)]
pub struct RedemptionService {
    db: DbConnection,
    students: StudentRepository,
    ledger: LedgerRepository,
    redemptions: RedemptionRepository,
    items: ShopItemRepository,
    clock: LocalClock,
    admin_secret: String,
}

impl RedemptionService {
    pub fn new(db: DbConnection, clock: LocalClock, admin_secret: String) -> Self {
        Self {
            students: StudentRepository::new(db.clone()),
            ledger: LedgerRepository::new(db.clone()),
            redemptions: RedemptionRepository::new(db.clone()),
            items: ShopItemRepository::new(db.clone()),
            db,
            clock,
            admin_secret,
        }
    }

    /// Spend points on a shop item, identified by the student's redemption code
    pub async fn redeem(
        &self,
        session: &SessionContext,
        command: RedeemCommand,
    ) -> CoreResult<RedeemResult> {
        session.require_open()?;
        info!("Redemption requested for item {}", command.item_id);

        let student = self.identify(&command.code).await?;
        let item = self
            .items
            .get_item(&command.item_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Shop item {}", command.item_id)))?;

        let entry = RedemptionEntry {
            id: RedemptionEntry::generate_id(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            item_name: item.name.clone(),
            point: item.cost,
            date: self.clock.today(),
        };

        let remaining_points = retry_once("redemption", || self.debit_and_log(&entry)).await?;

        info!(
            "{} redeemed {} for {} points ({} left)",
            student.name, item.name, item.cost, remaining_points
        );

        Ok(RedeemResult {
            success_message: format!("{} redeemed {}", student.name, item.name),
            entry,
            remaining_points,
        })
    }

    async fn debit_and_log(&self, entry: &RedemptionEntry) -> CoreResult<i64> {
        let mut tx = self.db.pool().begin().await?;

        if !self.ledger.try_debit(&mut *tx, &entry.student_id, entry.point).await? {
            let available = self
                .ledger
                .spendable(&mut *tx, &entry.student_id)
                .await?
                .unwrap_or(0);
            return Err(CoreError::InsufficientBalance {
                available,
                cost: entry.point,
            });
        }

        self.redemptions.append(&mut *tx, entry).await?;
        let remaining = self
            .ledger
            .spendable(&mut *tx, &entry.student_id)
            .await?
            .unwrap_or(0);

        tx.commit().await?;
        Ok(remaining)
    }

    /// The single student whose redemption code matches; none or several is a mismatch
    async fn identify(&self, code: &str) -> CoreResult<Student> {
        let code = code.trim();
        let mut matches: Vec<Student> = self
            .students
            .list_students()
            .await?
            .into_iter()
            .filter(|s| s.redemption_code() == code)
            .collect();

        if matches.len() != 1 {
            warn!("Redemption code matched {} students", matches.len());
            return Err(CoreError::IdentityMismatch);
        }
        Ok(matches.remove(0))
    }

    /// Delete a log entry and give its points back
    pub async fn reverse(
        &self,
        command: ReverseRedemptionCommand,
    ) -> CoreResult<ReverseRedemptionResult> {
        info!("Reversal requested for redemption {}", command.entry_id);

        if command.admin_secret.trim() != self.admin_secret {
            warn!("Wrong admin secret for reversal of {}", command.entry_id);
            return Err(CoreError::Unauthorized);
        }

        let (entry, spendable_points) =
            retry_once("redemption reversal", || self.remove_and_credit(&command.entry_id)).await?;

        info!(
            "Reversed {} for {}: {} points restored",
            entry.item_name, entry.student_name, entry.point
        );

        Ok(ReverseRedemptionResult {
            success_message: format!("Restored {} points to {}", entry.point, entry.student_name),
            entry,
            spendable_points,
        })
    }

    async fn remove_and_credit(&self, entry_id: &str) -> CoreResult<(RedemptionEntry, i64)> {
        let mut tx = self.db.pool().begin().await?;

        let entry = self
            .redemptions
            .remove(&mut *tx, entry_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Redemption {}", entry_id)))?;

        let spendable = self
            .ledger
            .credit_spendable(&mut *tx, &entry.student_id, entry.point)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student {}", entry.student_id)))?;

        tx.commit().await?;
        Ok((entry, spendable))
    }

    pub async fn list_log(&self) -> CoreResult<Vec<RedemptionEntry>> {
        Ok(self.redemptions.list().await?)
    }

    pub async fn list_items(&self) -> CoreResult<Vec<ShopItem>> {
        Ok(self.items.list_items().await?)
    }

    pub async fn create_item(&self, command: CreateShopItemCommand) -> CoreResult<ShopItem> {
        if command.admin_secret.trim() != self.admin_secret {
            return Err(CoreError::Unauthorized);
        }
        let name = command.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Item name cannot be empty".to_string()));
        }
        if command.cost <= 0 {
            return Err(CoreError::InvalidInput("Item cost must be positive".to_string()));
        }

        let item = ShopItem {
            id: ShopItem::generate_id(),
            name: name.to_string(),
            cost: command.cost,
            image_url: command.image_url.filter(|url| !url.trim().is_empty()),
        };
        self.items.insert_item(&item).await?;
        info!("Added shop item {} ({} points)", item.name, item.cost);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::points::PointCategory;
    use crate::test_support::clock_at;

    const ADMIN: &str = "admin-secret";

    struct Fixture {
        service: RedemptionService,
        students: StudentRepository,
        student: Student,
    }

    /// Student "Minji" with 5 spendable points; code 0412 + 5678
    async fn setup() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let (_clock, local) = clock_at("2025-03-03 15:00");
        let students = StudentRepository::new(db.clone());

        let mut student = crate::test_support::new_student("Minji", "2012-04-12", "010-1234-5678");
        student.points.set(PointCategory::Homework, 5);
        student.spendable_points = 5;
        students.insert_student(&student).await.unwrap();

        Fixture {
            service: RedemptionService::new(db, local, ADMIN.to_string()),
            students,
            student,
        }
    }

    impl Fixture {
        async fn add_item(&self, name: &str, cost: i64) -> ShopItem {
            self.service
                .create_item(CreateShopItemCommand {
                    name: name.to_string(),
                    cost,
                    image_url: None,
                    admin_secret: ADMIN.to_string(),
                })
                .await
                .expect("Failed to create item")
        }

        async fn spendable(&self) -> i64 {
            self.students
                .get_student(&self.student.id)
                .await
                .unwrap()
                .unwrap()
                .spendable_points
        }
    }

    fn redeem(code: &str, item: &ShopItem) -> RedeemCommand {
        RedeemCommand {
            code: code.to_string(),
            item_id: item.id.clone(),
        }
    }

    #[tokio::test]
    async fn test_successful_redemption_debits_exact_cost() {
        let fixture = setup().await;
        let pencil = fixture.add_item("Pencil", 3).await;

        let result = fixture
            .service
            .redeem(&SessionContext::open(), redeem("04125678", &pencil))
            .await
            .expect("Redemption failed");
        assert_eq!(result.remaining_points, 2);
        assert_eq!(result.entry.point, 3);
        assert_eq!(fixture.spendable().await, 2);

        let log = fixture.service.list_log().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].item_name, "Pencil");

        // Category points are untouched by spending
        let stored = fixture.students.get_student(&fixture.student.id).await.unwrap().unwrap();
        assert_eq!(stored.points.total(), 5);
    }

    #[tokio::test]
    async fn test_unknown_code_and_insufficient_balance() {
        let fixture = setup().await;
        let bike = fixture.add_item("Bike", 50).await;

        let wrong = fixture
            .service
            .redeem(&SessionContext::open(), redeem("00000000", &bike))
            .await;
        assert!(matches!(wrong, Err(CoreError::IdentityMismatch)));

        let too_expensive = fixture
            .service
            .redeem(&SessionContext::open(), redeem("04125678", &bike))
            .await;
        match too_expensive {
            Err(CoreError::InsufficientBalance { available, cost }) => {
                assert_eq!(available, 5);
                assert_eq!(cost, 50);
            }
            other => panic!("Expected insufficient balance, got {:?}", other.map(|r| r.entry)),
        }
        assert_eq!(fixture.spendable().await, 5);
        assert!(fixture.service.list_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ambiguous_code_is_a_mismatch() {
        let fixture = setup().await;
        let twin = crate::test_support::new_student("Minseo", "2012-04-12", "010-9999-5678");
        fixture.students.insert_student(&twin).await.unwrap();
        let pencil = fixture.add_item("Pencil", 1).await;

        let result = fixture
            .service
            .redeem(&SessionContext::open(), redeem("04125678", &pencil))
            .await;
        assert!(matches!(result, Err(CoreError::IdentityMismatch)));
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let fixture = setup().await;
        let result = fixture
            .service
            .redeem(
                &SessionContext::open(),
                RedeemCommand {
                    code: "04125678".to_string(),
                    item_id: "item::missing".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reverse_restores_balance() {
        let fixture = setup().await;
        let pencil = fixture.add_item("Pencil", 4).await;
        let redeemed = fixture
            .service
            .redeem(&SessionContext::open(), redeem("04125678", &pencil))
            .await
            .unwrap();
        assert_eq!(fixture.spendable().await, 1);

        let wrong = fixture
            .service
            .reverse(ReverseRedemptionCommand {
                entry_id: redeemed.entry.id.clone(),
                admin_secret: "guess".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(CoreError::Unauthorized)));
        assert_eq!(fixture.spendable().await, 1);

        let reversed = fixture
            .service
            .reverse(ReverseRedemptionCommand {
                entry_id: redeemed.entry.id.clone(),
                admin_secret: ADMIN.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reversed.spendable_points, 5);
        assert!(fixture.service.list_log().await.unwrap().is_empty());

        let again = fixture
            .service
            .reverse(ReverseRedemptionCommand {
                entry_id: redeemed.entry.id,
                admin_secret: ADMIN.to_string(),
            })
            .await;
        assert!(matches!(again, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_spendable_never_negative_over_sequence() {
        let fixture = setup().await;
        let small = fixture.add_item("Sticker", 2).await;

        let mut successes = 0;
        for _ in 0..4 {
            match fixture
                .service
                .redeem(&SessionContext::open(), redeem("04125678", &small))
                .await
            {
                Ok(_) => successes += 1,
                Err(CoreError::InsufficientBalance { .. }) => {}
                Err(e) => panic!("Unexpected error: {}", e),
            }
            assert!(fixture.spendable().await >= 0);
        }
        assert_eq!(successes, 2);
        assert_eq!(fixture.spendable().await, 1);
    }

    #[tokio::test]
    async fn test_create_item_validation() {
        let fixture = setup().await;
        let command = |name: &str, cost, secret: &str| CreateShopItemCommand {
            name: name.to_string(),
            cost,
            image_url: Some("".to_string()),
            admin_secret: secret.to_string(),
        };

        assert!(matches!(
            fixture.service.create_item(command("Pen", 2, "nope")).await,
            Err(CoreError::Unauthorized)
        ));
        assert!(matches!(
            fixture.service.create_item(command("Pen", 0, ADMIN)).await,
            Err(CoreError::InvalidInput(_))
        ));
        let item = fixture.service.create_item(command("Pen", 2, ADMIN)).await.unwrap();
        assert_eq!(item.image_url, None);
        assert_eq!(fixture.service.list_items().await.unwrap(), vec![item]);
    }
}
