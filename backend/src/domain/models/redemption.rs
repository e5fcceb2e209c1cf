//! Point shop items and the redemption log.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub cost: i64,
    pub image_url: Option<String>,
}

impl ShopItem {
    pub fn generate_id() -> String {
        format!("item::{}", uuid::Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionEntry {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub item_name: String,
    pub point: i64,
    pub date: NaiveDate,
}

impl RedemptionEntry {
    pub fn generate_id() -> String {
        format!("redemption::{}", uuid::Uuid::new_v4())
    }
}
