use serde::Serialize;

use crate::models::{RiskFactor, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskCategory {
    Academic,
    Attendance,
    Financial,
    Personal,
    Protective,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Academic,
        RiskCategory::Attendance,
        RiskCategory::Financial,
        RiskCategory::Personal,
        RiskCategory::Protective,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Academic => "Academic",
            RiskCategory::Attendance => "Attendance",
            RiskCategory::Financial => "Financial",
            RiskCategory::Personal => "Personal",
            RiskCategory::Protective => "Protective",
        }
    }

    /// Name keywords are checked before severity, so a protective factor
    /// named like a financial one still lands in Financial.
    pub fn of(factor: &RiskFactor) -> Self {
        let name = factor.name.as_str();
        if name.contains("Academic") || name.contains("GPA") || name.contains("Grade") {
            RiskCategory::Academic
        } else if name.contains("Attendance") {
            RiskCategory::Attendance
        } else if name.contains("Fee") || name.contains("Financial") {
            RiskCategory::Financial
        } else if factor.severity == Severity::Protective {
            RiskCategory::Protective
        } else {
            RiskCategory::Personal
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Absolute factor impact per category, in `RiskCategory::ALL` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryBreakdown {
    totals: [u32; 5],
}

impl CategoryBreakdown {
    pub fn get(&self, category: RiskCategory) -> u32 {
        self.totals[category.index()]
    }

    pub fn series(&self) -> Vec<(&'static str, u32)> {
        RiskCategory::ALL
            .iter()
            .map(|category| (category.label(), self.get(*category)))
            .collect()
    }

    pub fn to_chart(&self) -> ChartSeries {
        ChartSeries {
            labels: RiskCategory::ALL.iter().map(|c| c.label()).collect(),
            data: self.totals.to_vec(),
        }
    }
}

/// Labels plus one numeric dataset, the shape a chart widget consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<&'static str>,
    pub data: Vec<u32>,
}

pub fn categorize(factors: &[RiskFactor]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();
    for factor in factors {
        breakdown.totals[RiskCategory::of(factor).index()] += factor.impact.unsigned_abs();
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Extracurricular, FamilyIncome, FeeStatus, MentalHealth, Scholarship, StudentInput,
    };
    use crate::risk;

    #[test]
    fn empty_factors_give_zero_buckets() {
        let breakdown = categorize(&[]);
        assert_eq!(
            breakdown.series(),
            vec![
                ("Academic", 0),
                ("Attendance", 0),
                ("Financial", 0),
                ("Personal", 0),
                ("Protective", 0),
            ]
        );
    }

    #[test]
    fn buckets_a_scored_result() {
        let input = StudentInput {
            attendance: Some(65.0),
            test_scores: Some(35.0),
            gpa: Some(2.5),
            fee_status: Some(FeeStatus::Overdue),
            family_income: Some(FamilyIncome::Low),
            mental_health: Some(MentalHealth::Poor),
            stress_level: Some(10),
            scholarship: Some(Scholarship::Full),
            extracurricular: Some(Extracurricular::Medium),
            ..StudentInput::default()
        };
        let result = risk::score(&input);
        let breakdown = categorize(&result.factors);

        assert_eq!(breakdown.get(RiskCategory::Academic), 20 + 8);
        assert_eq!(breakdown.get(RiskCategory::Attendance), 15);
        assert_eq!(breakdown.get(RiskCategory::Financial), 10 + 5);
        assert_eq!(breakdown.get(RiskCategory::Personal), 10 + 5);
        assert_eq!(breakdown.get(RiskCategory::Protective), 5 + 3);
    }

    #[test]
    fn chart_series_serializes_in_category_order() {
        let factors = vec![RiskFactor {
            name: "Below Average Attendance".to_string(),
            impact: 8,
            severity: Severity::Low,
        }];
        let json = serde_json::to_value(categorize(&factors).to_chart()).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({
                "labels": ["Academic", "Attendance", "Financial", "Personal", "Protective"],
                "data": [0, 8, 0, 0, 0],
            })
        );
    }
}
