//! Point categories and the per-student category map.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fixed set of categories points are tracked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointCategory {
    Attendance,
    Homework,
    Conduct,
    Exam,
    Workbook,
}

impl PointCategory {
    pub const ALL: [PointCategory; 5] = [
        PointCategory::Attendance,
        PointCategory::Homework,
        PointCategory::Conduct,
        PointCategory::Exam,
        PointCategory::Workbook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PointCategory::Attendance => "attendance",
            PointCategory::Homework => "homework",
            PointCategory::Conduct => "conduct",
            PointCategory::Exam => "exam",
            PointCategory::Workbook => "workbook",
        }
    }
}

impl fmt::Display for PointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attendance" => Ok(PointCategory::Attendance),
            "homework" => Ok(PointCategory::Homework),
            "conduct" | "classroom-conduct" | "classroom_conduct" => Ok(PointCategory::Conduct),
            "exam" => Ok(PointCategory::Exam),
            "workbook" | "workbook-completion" | "workbook_completion" => {
                Ok(PointCategory::Workbook)
            }
            other => Err(format!("Unknown point category: {}", other)),
        }
    }
}

/// Category → points, always holding every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointMap(BTreeMap<PointCategory, i64>);

impl PointMap {
    pub fn zeroed() -> Self {
        Self(PointCategory::ALL.iter().map(|c| (*c, 0)).collect())
    }

    /// Build from possibly incomplete values; absent categories start at zero.
    pub fn from_partial<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (PointCategory, i64)>,
    {
        let mut map = Self::zeroed();
        for (category, value) in values {
            map.0.insert(category, value);
        }
        map
    }

    pub fn get(&self, category: PointCategory) -> i64 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn set(&mut self, category: PointCategory, value: i64) {
        self.0.insert(category, value);
    }

    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointCategory, i64)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }
}

impl Default for PointMap {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_map_fills_missing_categories() {
        let map = PointMap::from_partial([(PointCategory::Exam, 4)]);
        assert_eq!(map.iter().count(), 5);
        assert_eq!(map.get(PointCategory::Exam), 4);
        assert_eq!(map.get(PointCategory::Homework), 0);
        assert_eq!(map.total(), 4);
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!("Classroom-Conduct".parse::<PointCategory>(), Ok(PointCategory::Conduct));
        assert_eq!("workbook-completion".parse::<PointCategory>(), Ok(PointCategory::Workbook));
        assert!("karma".parse::<PointCategory>().is_err());
    }
}
