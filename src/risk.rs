//! Rule-table dropout risk scoring.
//!
//! Invariants:
//! - Scoring is pure: the same input always yields the same result.
//! - At most one band fires per feature, most severe band first.
//! - Only the final sum is clamped to 0..=100.

use tracing::debug;

use crate::models::{
    Extracurricular, FamilyIncome, FeeStatus, MentalHealth, ProgressSnapshot, RiskFactor,
    RiskResult, Scholarship, Severity, StudentInput,
};
use crate::recommend;

/// Numeric form fields the rules read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Attendance,
    TestScores,
    Gpa,
    Backlogs,
    StressLevel,
}

impl Measure {
    /// The field value, or `None` when it is absent or outside its valid range.
    pub fn read(&self, input: &StudentInput) -> Option<f64> {
        let (value, range) = match self {
            Measure::Attendance => (input.attendance, 0.0..=100.0),
            Measure::TestScores => (input.test_scores, 0.0..=100.0),
            Measure::Gpa => (input.gpa, 0.0..=4.0),
            Measure::Backlogs => (input.backlogs.map(f64::from), 0.0..=f64::from(u32::MAX)),
            Measure::StressLevel => (input.stress_level.map(f64::from), 0.0..=10.0),
        };
        value.filter(|v| range.contains(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    Below(Measure, f64),
    Above(Measure, f64),
    Fee(FeeStatus),
    Income(FamilyIncome),
    Wellbeing(MentalHealth),
    /// Any recognized scholarship other than `none`.
    ScholarshipAwarded,
    /// Extracurricular involvement of medium or high.
    ActiveExtracurricular,
}

impl Condition {
    pub fn matches(&self, input: &StudentInput) -> bool {
        match *self {
            Condition::Below(measure, bound) => measure.read(input).is_some_and(|v| v < bound),
            Condition::Above(measure, bound) => measure.read(input).is_some_and(|v| v > bound),
            Condition::Fee(status) => input.fee_status == Some(status),
            Condition::Income(level) => input.family_income == Some(level),
            Condition::Wellbeing(state) => input.mental_health == Some(state),
            Condition::ScholarshipAwarded => matches!(
                input.scholarship,
                Some(Scholarship::Partial | Scholarship::Full)
            ),
            Condition::ActiveExtracurricular => matches!(
                input.extracurricular,
                Some(Extracurricular::Medium | Extracurricular::High)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub name: &'static str,
    pub points: i32,
    pub severity: Severity,
    pub when: Condition,
}

impl Rule {
    const fn new(name: &'static str, points: i32, severity: Severity, when: Condition) -> Self {
        Rule {
            name,
            points,
            severity,
            when,
        }
    }

    fn to_factor(self) -> RiskFactor {
        RiskFactor {
            name: self.name.to_string(),
            impact: self.points,
            severity: self.severity,
        }
    }
}

use Condition::*;
use Measure::*;

/// Feature groups in evaluation order. Within a group the first matching rule wins.
pub const RULE_GROUPS: &[&[Rule]] = &[
    &[
        Rule::new("Very Low Attendance", 25, Severity::High, Below(Attendance, 60.0)),
        Rule::new("Low Attendance", 15, Severity::Medium, Below(Attendance, 75.0)),
        Rule::new("Below Average Attendance", 8, Severity::Low, Below(Attendance, 85.0)),
    ],
    &[
        Rule::new("Poor Academic Performance", 20, Severity::High, Below(TestScores, 40.0)),
        Rule::new("Below Average Grades", 12, Severity::Medium, Below(TestScores, 60.0)),
    ],
    &[
        Rule::new("Very Low GPA", 15, Severity::High, Below(Gpa, 2.0)),
        Rule::new("Low GPA", 8, Severity::Medium, Below(Gpa, 3.0)),
    ],
    &[
        Rule::new("Multiple Backlogs", 15, Severity::High, Above(Backlogs, 5.0)),
        Rule::new("Some Backlogs", 8, Severity::Medium, Above(Backlogs, 2.0)),
    ],
    &[
        Rule::new("Fee Payment Issues", 10, Severity::Medium, Fee(FeeStatus::Overdue)),
        Rule::new("Pending Fee Payment", 5, Severity::Low, Fee(FeeStatus::Pending)),
    ],
    &[Rule::new("Financial Constraints", 5, Severity::Low, Income(FamilyIncome::Low))],
    &[
        Rule::new("Mental Health Concerns", 10, Severity::High, Wellbeing(MentalHealth::Poor)),
        Rule::new("Mental Health Issues", 5, Severity::Medium, Wellbeing(MentalHealth::Fair)),
    ],
    &[Rule::new("High Stress Level", 5, Severity::Medium, Above(StressLevel, 8.0))],
    &[Rule::new("Scholarship Support", -5, Severity::Protective, ScholarshipAwarded)],
    &[Rule::new("Active in Extracurriculars", -3, Severity::Protective, ActiveExtracurricular)],
];

/// Unclamped point total and the fired factors in evaluation order.
pub fn evaluate(input: &StudentInput) -> (i32, Vec<RiskFactor>) {
    let mut raw = 0;
    let mut factors = Vec::new();

    for group in RULE_GROUPS {
        if let Some(rule) = group.iter().find(|rule| rule.when.matches(input)) {
            raw += rule.points;
            factors.push(rule.to_factor());
        }
    }

    (raw, factors)
}

pub fn score(input: &StudentInput) -> RiskResult {
    let (raw, factors) = evaluate(input);
    let score = raw.clamp(0, 100) as u8;
    let recommendations = recommend::derive(&factors);

    debug!(raw, score, factors = factors.len(), "scored assessment");

    RiskResult {
        score,
        factors,
        recommendations,
    }
}

/// Progress toward the 85% attendance and 80% test score targets.
pub fn progress(input: &StudentInput) -> ProgressSnapshot {
    let attendance = (Attendance.read(input).unwrap_or(0.0) / 85.0 * 100.0).min(100.0);
    let grades = (TestScores.read(input).unwrap_or(0.0) / 80.0 * 100.0).min(100.0);

    ProgressSnapshot {
        attendance,
        grades,
        overall: (attendance + grades) / 2.0,
    }
}
