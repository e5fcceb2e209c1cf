use shared::{LotteryStateResponse, ResolveLotteryRequest};

use super::{time_from_dto, time_to_dto};
use crate::domain::commands::lottery::ResolveLotteryCommand;
use crate::domain::models::lottery::LotteryState;
use crate::domain::CoreError;

pub struct LotteryMapper;

impl LotteryMapper {
    pub fn resolve_command(request: ResolveLotteryRequest) -> Result<ResolveLotteryCommand, CoreError> {
        Ok(ResolveLotteryCommand {
            session_time: time_from_dto(&request.session_time)?,
            lottery_key: request.lottery_key.trim().to_string(),
        })
    }

    pub fn state_to_dto(state: LotteryState) -> LotteryStateResponse {
        let (winner_name, winner_time) = match state.winner {
            Some(winner) => (Some(winner.student_name), Some(time_to_dto(winner.time))),
            None => (None, None),
        };
        LotteryStateResponse {
            lottery_key: state.lottery_key,
            candidates: state.candidates.into_iter().map(|c| c.student_name).collect(),
            winner_name,
            winner_time,
        }
    }
}
