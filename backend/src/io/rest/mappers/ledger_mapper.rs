use shared::{
    AdjustPointsRequest, AdjustPointsResponse, BalanceResponse, RankGroup as RankGroupDto,
    RankingResponse,
};

use super::category_from_dto;
use super::student_mapper::StudentMapper;
use crate::domain::commands::ledger::{AdjustPointsCommand, AdjustPointsResult, Balance};
use crate::domain::commands::ranking::RankGroup;
use crate::domain::CoreError;

pub struct LedgerMapper;

impl LedgerMapper {
    pub fn adjust_command(request: AdjustPointsRequest) -> Result<AdjustPointsCommand, CoreError> {
        Ok(AdjustPointsCommand {
            category: category_from_dto(&request.category)?,
            student_id: request.student_id,
            delta: request.delta,
        })
    }

    pub fn adjust_to_dto(result: AdjustPointsResult) -> AdjustPointsResponse {
        AdjustPointsResponse {
            student_id: result.student_id,
            category: result.category.to_string(),
            value: result.value,
        }
    }

    pub fn balance_to_dto(balance: Balance) -> BalanceResponse {
        BalanceResponse {
            points: StudentMapper::points_to_dto(&balance.points),
            student_id: balance.student_id,
            student_name: balance.student_name,
            total: balance.total,
            spendable_points: balance.spendable,
        }
    }

    pub fn ranking_to_dto(category: &str, groups: Vec<RankGroup>) -> RankingResponse {
        RankingResponse {
            category: category.to_string(),
            groups: groups
                .into_iter()
                .map(|g| RankGroupDto {
                    rank: g.rank,
                    value: g.value,
                    names: g.names,
                })
                .collect(),
        }
    }
}
