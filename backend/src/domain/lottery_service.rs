//! Lucky draw coordination.
//!
//! Candidates are appended on window check-ins; the winner is drawn lazily by
//! whichever check-in (or explicit resolve call) first arrives after the
//! window has closed, and committed with a compare-and-set so it is written
//! exactly once per lottery key.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::commands::attendance::LotteryOutcome;
use crate::domain::commands::lottery::ResolveLotteryCommand;
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::local_clock::LocalClock;
use crate::domain::models::attendance::{lottery_window_closed, CheckInWindow, LOTTERY_BONUS_POINTS};
use crate::domain::models::lottery::{
    draw_winner, LotteryCandidate, LotteryScope, LotteryState, LotteryWinner,
};
use crate::domain::models::points::PointCategory;
use crate::domain::models::schedule::parse_date;
use crate::domain::models::student::Student;
use crate::domain::session::SessionContext;
use crate::storage::{retry_once, DbConnection, LedgerRepository, LotteryRepository};

/// What a resolution attempt left behind
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub winner: Option<LotteryWinner>,
    /// True only for the attempt whose compare-and-set succeeded
    pub committed_now: bool,
}

#[derive(Clone)]
pub struct LotteryService {
    db: DbConnection,
    lottery: LotteryRepository,
    ledger: LedgerRepository,
    scope: LotteryScope,
    excluded_names: Arc<HashSet<String>>,
    clock: LocalClock,
}

impl LotteryService {
    pub fn new(
        db: DbConnection,
        lottery: LotteryRepository,
        ledger: LedgerRepository,
        scope: LotteryScope,
        excluded_names: HashSet<String>,
        clock: LocalClock,
    ) -> Self {
        Self {
            db,
            lottery,
            ledger,
            scope,
            excluded_names: Arc::new(excluded_names),
            clock,
        }
    }

    pub fn key_for(&self, date: NaiveDate, session_time: NaiveTime) -> String {
        self.scope.key(date, session_time)
    }

    /// Lottery steps of a check-in, run inside the caller's transaction.
    ///
    /// Window check-ins become candidates; any check-in past its session's
    /// window close attempts the draw.
    pub(crate) async fn on_check_in(
        &self,
        conn: &mut SqliteConnection,
        student: &Student,
        window: CheckInWindow,
        session_time: NaiveTime,
        now: NaiveDateTime,
    ) -> CoreResult<Option<LotteryOutcome>> {
        let session_start = now.date().and_time(session_time);
        let window_closed = lottery_window_closed(now, session_start);
        if !window.is_lottery_eligible() && !window_closed {
            return Ok(None);
        }

        let lottery_key = self.key_for(now.date(), session_time);

        let mut candidate = false;
        if window.is_lottery_eligible() {
            let entry = LotteryCandidate {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
            };
            candidate = self
                .lottery
                .add_candidate(conn, &lottery_key, &entry, now.time())
                .await?;
            debug!("{} entered lottery {}", student.name, lottery_key);
        }

        let resolution = if window_closed {
            self.try_resolve(conn, &lottery_key, now.time()).await?
        } else {
            Resolution {
                winner: self.lottery.load_state(conn, &lottery_key).await?.winner,
                committed_now: false,
            }
        };

        Ok(Some(LotteryOutcome {
            lottery_key,
            candidate,
            winner: resolution.winner,
            resolved_now: resolution.committed_now,
        }))
    }

    /// Draw and commit a winner if the key has two or more candidates and no winner yet.
    ///
    /// The winner's bonus is credited in the same transaction as the commit.
    pub(crate) async fn try_resolve(
        &self,
        conn: &mut SqliteConnection,
        lottery_key: &str,
        at: NaiveTime,
    ) -> CoreResult<Resolution> {
        let state = self.lottery.load_state(conn, lottery_key).await?;
        if state.winner.is_some() {
            return Ok(Resolution {
                winner: state.winner,
                committed_now: false,
            });
        }
        if state.distinct_candidates() < 2 {
            debug!("Lottery {} has too few candidates to draw", lottery_key);
            return Ok(Resolution {
                winner: None,
                committed_now: false,
            });
        }

        let picked = {
            let mut rng = rand::thread_rng();
            draw_winner(&state.candidates, &self.excluded_names, &mut rng).cloned()
        };
        let picked = match picked {
            Some(picked) => picked,
            None => {
                debug!("Every candidate of lottery {} is excluded", lottery_key);
                return Ok(Resolution {
                    winner: None,
                    committed_now: false,
                });
            }
        };

        let winner = LotteryWinner {
            student_id: picked.student_id,
            student_name: picked.student_name,
            time: at,
        };

        if self.lottery.commit_winner(conn, lottery_key, &winner).await? {
            self.ledger
                .credit_award(conn, &winner.student_id, PointCategory::Attendance, LOTTERY_BONUS_POINTS)
                .await?;
            info!("Lottery {} won by {}", lottery_key, winner.student_name);
            return Ok(Resolution {
                winner: Some(winner),
                committed_now: true,
            });
        }

        // Lost the race; report whoever won
        let existing = self.lottery.load_state(conn, lottery_key).await?.winner;
        Ok(Resolution {
            winner: existing,
            committed_now: false,
        })
    }

    /// Run a resolution attempt outside a check-in
    pub async fn resolve_now(
        &self,
        session: &SessionContext,
        command: ResolveLotteryCommand,
    ) -> CoreResult<LotteryState> {
        session.require_open()?;
        info!("Resolving lottery {} on request", command.lottery_key);

        let key_date = command
            .lottery_key
            .get(..10)
            .ok_or_else(|| CoreError::InvalidInput(format!("Bad lottery key: {}", command.lottery_key)))
            .and_then(|date| parse_date(date).map_err(CoreError::InvalidInput))?;
        let session_start = key_date.and_time(command.session_time);
        let now = self.clock.now();
        if !lottery_window_closed(now, session_start) {
            return Err(CoreError::InvalidState(
                "The lottery window has not closed yet".to_string(),
            ));
        }

        retry_once("lottery resolution", || async {
            let mut tx = self.db.pool().begin().await?;
            // Take the write lock before reading the state
            self.lottery.ensure_lottery(&mut *tx, &command.lottery_key).await?;
            self.try_resolve(&mut *tx, &command.lottery_key, now.time()).await?;
            let state = self.lottery.load_state(&mut *tx, &command.lottery_key).await?;
            tx.commit().await?;
            Ok::<_, CoreError>(state)
        })
        .await
    }

    pub async fn state(&self, lottery_key: &str) -> CoreResult<LotteryState> {
        Ok(self.lottery.state(lottery_key).await?)
    }
}
