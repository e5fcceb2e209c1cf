//! Lucky draw state and the winner draw.
use chrono::{NaiveDate, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// How check-ins are pooled into lottery keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LotteryScope {
    /// One draw per calendar date, shared by every session that day
    #[default]
    Date,
    /// One draw per session (date and start time)
    Session,
}

impl LotteryScope {
    pub fn key(&self, date: NaiveDate, session_time: NaiveTime) -> String {
        match self {
            LotteryScope::Date => date.format("%Y-%m-%d").to_string(),
            LotteryScope::Session => {
                format!("{}@{}", date.format("%Y-%m-%d"), session_time.format("%H:%M"))
            }
        }
    }
}

impl FromStr for LotteryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(LotteryScope::Date),
            "session" => Ok(LotteryScope::Session),
            other => Err(format!("Unknown lottery scope: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryCandidate {
    pub student_id: String,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryWinner {
    pub student_id: String,
    pub student_name: String,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryState {
    pub lottery_key: String,
    /// In check-in order
    pub candidates: Vec<LotteryCandidate>,
    pub winner: Option<LotteryWinner>,
}

impl LotteryState {
    pub fn empty(lottery_key: &str) -> Self {
        Self {
            lottery_key: lottery_key.to_string(),
            candidates: Vec::new(),
            winner: None,
        }
    }

    pub fn distinct_candidates(&self) -> usize {
        self.candidates
            .iter()
            .map(|c| c.student_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Pick the winner uniformly among candidates whose names are not excluded.
pub fn draw_winner<'a, R: Rng + ?Sized>(
    candidates: &'a [LotteryCandidate],
    excluded_names: &HashSet<String>,
    rng: &mut R,
) -> Option<&'a LotteryCandidate> {
    let pool: Vec<&LotteryCandidate> = candidates
        .iter()
        .filter(|c| !excluded_names.contains(&c.student_name))
        .collect();
    pool.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidates(names: &[&str]) -> Vec<LotteryCandidate> {
        names
            .iter()
            .map(|n| LotteryCandidate {
                student_id: format!("student::{}", n),
                student_name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_scope_keys() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert_eq!(LotteryScope::Date.key(date, time), "2025-03-03");
        assert_eq!(LotteryScope::Session.key(date, time), "2025-03-03@14:00");
        assert_eq!("SESSION".parse::<LotteryScope>(), Ok(LotteryScope::Session));
    }

    #[test]
    fn test_draw_only_picks_candidates() {
        let pool = candidates(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let winner = draw_winner(&pool, &HashSet::new(), &mut rng).unwrap();
            assert!(pool.contains(winner));
        }
    }

    #[test]
    fn test_draw_is_spread_over_candidates() {
        let pool = candidates(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(42);
        let picked: HashSet<String> = (0..200)
            .filter_map(|_| draw_winner(&pool, &HashSet::new(), &mut rng))
            .map(|c| c.student_name.clone())
            .collect();
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_excluded_names_never_win() {
        let pool = candidates(&["A", "B", "C"]);
        let excluded: HashSet<String> = ["A".to_string(), "C".to_string()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(draw_winner(&pool, &excluded, &mut rng).unwrap().student_name, "B");
        }

        let everyone: HashSet<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert!(draw_winner(&pool, &everyone, &mut rng).is_none());
    }
}
