use shared::{
    CreateShopItemRequest, RedeemRequest, RedeemResponse, RedemptionLogEntry,
    ReverseRedemptionResponse, ShopItem as ShopItemDto,
};

use super::date_to_dto;
use crate::domain::commands::redemption::{
    CreateShopItemCommand, RedeemCommand, RedeemResult, ReverseRedemptionResult,
};
use crate::domain::models::redemption::{RedemptionEntry, ShopItem};

pub struct RedemptionMapper;

impl RedemptionMapper {
    pub fn item_to_dto(item: ShopItem) -> ShopItemDto {
        ShopItemDto {
            id: item.id,
            name: item.name,
            cost: item.cost,
            image_url: item.image_url,
        }
    }

    pub fn create_item_command(request: CreateShopItemRequest) -> CreateShopItemCommand {
        CreateShopItemCommand {
            name: request.name,
            cost: request.cost,
            image_url: request.image_url,
            admin_secret: request.admin_secret,
        }
    }

    pub fn redeem_command(request: RedeemRequest) -> RedeemCommand {
        RedeemCommand {
            code: request.code,
            item_id: request.item_id,
        }
    }

    pub fn entry_to_dto(entry: RedemptionEntry) -> RedemptionLogEntry {
        RedemptionLogEntry {
            date: date_to_dto(entry.date),
            id: entry.id,
            student_id: entry.student_id,
            student_name: entry.student_name,
            item_name: entry.item_name,
            point: entry.point,
        }
    }

    pub fn redeem_to_dto(result: RedeemResult) -> RedeemResponse {
        RedeemResponse {
            entry: Self::entry_to_dto(result.entry),
            remaining_points: result.remaining_points,
            success_message: result.success_message,
        }
    }

    pub fn reverse_to_dto(result: ReverseRedemptionResult) -> ReverseRedemptionResponse {
        ReverseRedemptionResponse {
            entry_id: result.entry.id,
            restored_points: result.entry.point,
            spendable_points: result.spendable_points,
            success_message: result.success_message,
        }
    }
}
