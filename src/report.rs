use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::chart;
use crate::models::{RiskLevel, RiskResult, StudentRecord};
use crate::roster::{self, SortKey};

#[derive(Debug, Clone, PartialEq)]
pub struct RiskLevelSummary {
    pub risk_level: RiskLevel,
    pub count: usize,
    pub avg_score: f64,
}

pub fn summarize_by_level(students: &[StudentRecord]) -> Vec<RiskLevelSummary> {
    let mut map: HashMap<&'static str, (RiskLevel, usize, u32)> = HashMap::new();

    for student in students {
        let entry = map
            .entry(student.risk_level.as_str())
            .or_insert((student.risk_level, 0, 0));
        entry.1 += 1;
        entry.2 += u32::from(student.risk_score);
    }

    let mut summaries: Vec<RiskLevelSummary> = map
        .into_values()
        .map(|(risk_level, count, total_score)| RiskLevelSummary {
            risk_level,
            count,
            avg_score: if count == 0 {
                0.0
            } else {
                total_score as f64 / count as f64
            },
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.risk_level.as_str().cmp(b.risk_level.as_str()))
    });
    summaries
}

pub fn build_report(
    scope: Option<&str>,
    generated_on: NaiveDate,
    students: &[StudentRecord],
    assessment: Option<&RiskResult>,
) -> String {
    let summaries = summarize_by_level(students);
    let mut ranked = students.to_vec();
    roster::sort(&mut ranked, SortKey::RiskDesc);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all departments");

    let _ = writeln!(output, "# Counselor Risk Report");
    let _ = writeln!(output, "Generated for {} on {}", scope_label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Level Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students (avg score {:.1})",
                summary.risk_level.as_str(),
                summary.count,
                summary.avg_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");

    if ranked.is_empty() {
        let _ = writeln!(output, "No students on the roster.");
    } else {
        for student in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) score {} [{}]",
                student.name,
                student.roll_no,
                student.department,
                student.risk_score,
                student.factors.join(", ")
            );
        }
    }

    let mut recent = students.to_vec();
    recent.sort_by(|a, b| b.last_contact.cmp(&a.last_contact));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Contacts");

    if recent.is_empty() {
        let _ = writeln!(output, "No contacts recorded.");
    } else {
        for student in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} on {} ({})",
                student.name, student.last_contact, student.email
            );
        }
    }

    if let Some(result) = assessment {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Assessment");
        let _ = writeln!(
            output,
            "Score {}% ({} risk)",
            result.score,
            RiskLevel::from_score(result.score).as_str()
        );

        let _ = writeln!(output);
        let _ = writeln!(output, "### Factors");
        if result.factors.is_empty() {
            let _ = writeln!(output, "No risk factors detected.");
        }
        for factor in result.factors.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) {:+}%",
                factor.name,
                factor.severity.as_str(),
                factor.impact
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### By Category");
        for (label, value) in chart::categorize(&result.factors).series() {
            let _ = writeln!(output, "- {}: {}", label, value);
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Recommendations");
        for rec in result.recommendations.iter() {
            let _ = writeln!(
                output,
                "- {} {} [{}]: {}",
                rec.icon,
                rec.action,
                rec.priority.as_str(),
                rec.description
            );
        }
    }

    output
}
