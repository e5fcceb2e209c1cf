use std::collections::BTreeMap;

use crate::domain::commands::ranking::RankGroup;
use crate::domain::errors::CoreResult;
use crate::domain::models::points::PointCategory;
use crate::storage::StudentRepository;

/// Number of distinct values shown on a leaderboard
pub const RANK_SLOTS: usize = 5;

/// Tie-aware leaderboards over the point ledger
#[derive(Clone)]
pub struct RankingService {
    students: StudentRepository,
}

impl RankingService {
    pub fn new(students: StudentRepository) -> Self {
        Self { students }
    }

    pub async fn top_rankings(&self, category: PointCategory) -> CoreResult<Vec<RankGroup>> {
        let students = self.students.list_students().await?;
        Ok(rank_groups(
            students.into_iter().map(|s| (s.name, s.points.get(category))),
            RANK_SLOTS,
        ))
    }

    /// Same ranking over each student's total
    pub async fn total_rankings(&self) -> CoreResult<Vec<RankGroup>> {
        let students = self.students.list_students().await?;
        Ok(rank_groups(
            students.into_iter().map(|s| {
                let total = s.points.total();
                (s.name, total)
            }),
            RANK_SLOTS,
        ))
    }
}

/// Keep the top `slots` distinct values, highest first, each listing every
/// name that holds it in alphabetical order.
pub fn rank_groups<I>(entries: I, slots: usize) -> Vec<RankGroup>
where
    I: IntoIterator<Item = (String, i64)>,
{
    let mut by_value: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for (name, value) in entries {
        by_value.entry(value).or_default().push(name);
    }

    by_value
        .into_iter()
        .rev()
        .take(slots)
        .enumerate()
        .map(|(i, (value, mut names))| {
            names.sort();
            RankGroup {
                rank: i + 1,
                value,
                names,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use crate::test_support::new_student;

    fn entries(values: &[(&str, i64)]) -> Vec<(String, i64)> {
        values.iter().map(|(n, v)| (n.to_string(), *v)).collect()
    }

    #[test]
    fn test_ties_share_a_slot() {
        let groups = rank_groups(
            entries(&[("F", 5), ("A", 10), ("D", 5), ("C", 8), ("B", 10), ("E", 5)]),
            RANK_SLOTS,
        );
        assert_eq!(
            groups,
            vec![
                RankGroup { rank: 1, value: 10, names: vec!["A".into(), "B".into()] },
                RankGroup { rank: 2, value: 8, names: vec!["C".into()] },
                RankGroup { rank: 3, value: 5, names: vec!["D".into(), "E".into(), "F".into()] },
            ]
        );
    }

    #[test]
    fn test_only_top_distinct_values_kept() {
        let groups = rank_groups(
            entries(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6), ("g", 6)]),
            RANK_SLOTS,
        );
        let values: Vec<i64> = groups.iter().map(|g| g.value).collect();
        assert_eq!(values, vec![6, 5, 4, 3, 2]);
        assert_eq!(groups[0].names.len(), 2);
    }

    #[test]
    fn test_empty_ranking() {
        assert!(rank_groups(Vec::<(String, i64)>::new(), RANK_SLOTS).is_empty());
    }

    #[tokio::test]
    async fn test_category_and_total_rankings() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = StudentRepository::new(db);

        let mut ara = new_student("Ara", "2012-01-01", "0000");
        ara.points.set(PointCategory::Exam, 3);
        ara.points.set(PointCategory::Homework, 1);
        let mut bo = new_student("Bo", "2012-01-01", "0000");
        bo.points.set(PointCategory::Exam, 4);
        repo.insert_student(&ara).await.unwrap();
        repo.insert_student(&bo).await.unwrap();

        let service = RankingService::new(repo);
        let exam = service.top_rankings(PointCategory::Exam).await.unwrap();
        assert_eq!(exam[0].names, vec!["Bo".to_string()]);

        let total = service.total_rankings().await.unwrap();
        assert_eq!(total.len(), 1);
        assert_eq!(total[0].value, 4);
        assert_eq!(total[0].names, vec!["Ara".to_string(), "Bo".to_string()]);
    }
}
