use serde::Deserialize;

use crate::models::{
    Extracurricular, FamilyIncome, FeeStatus, MentalHealth, PartTimeJob, Scholarship,
    StudentInput,
};

/// Raw assessment form values exactly as typed or selected.
///
/// Deserializes from CSV headers in either `camelCase` (the form field names)
/// or `snake_case`. Missing columns become empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormValues {
    pub attendance: String,
    #[serde(alias = "test_scores")]
    pub test_scores: String,
    pub backlogs: String,
    pub gpa: String,
    #[serde(alias = "fee_status")]
    pub fee_status: String,
    pub scholarship: String,
    #[serde(alias = "family_income")]
    pub family_income: String,
    #[serde(alias = "distance_home")]
    pub distance_home: String,
    #[serde(alias = "part_time_job")]
    pub part_time_job: String,
    pub extracurricular: String,
    #[serde(alias = "mental_health")]
    pub mental_health: String,
    #[serde(alias = "stress_level")]
    pub stress_level: String,
}

impl FormValues {
    /// Never fails. Text that does not parse leaves the field empty.
    pub fn parse(&self) -> StudentInput {
        StudentInput {
            attendance: parse_real(&self.attendance),
            test_scores: parse_real(&self.test_scores),
            backlogs: parse_count(&self.backlogs),
            gpa: parse_real(&self.gpa),
            fee_status: FeeStatus::parse(&self.fee_status),
            scholarship: Scholarship::parse(&self.scholarship),
            family_income: FamilyIncome::parse(&self.family_income),
            distance_home: parse_real(&self.distance_home),
            part_time_job: PartTimeJob::parse(&self.part_time_job),
            extracurricular: Extracurricular::parse(&self.extracurricular),
            mental_health: MentalHealth::parse(&self.mental_health),
            stress_level: parse_count(&self.stress_level).and_then(|v| u8::try_from(v).ok()),
        }
    }
}

pub fn parse_real(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Whole counts read from the leading digits, so "4.9" and "3abc" both stop
/// at the first non-digit. Negative or digit-less text is absent.
pub fn parse_count(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let digits = text.strip_prefix('+').unwrap_or(text);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormValues {
        FormValues {
            attendance: "82.5".to_string(),
            test_scores: " 55 ".to_string(),
            backlogs: "3".to_string(),
            gpa: "2.4".to_string(),
            fee_status: "Pending".to_string(),
            scholarship: "partial".to_string(),
            family_income: "medium".to_string(),
            distance_home: "12".to_string(),
            part_time_job: "yes".to_string(),
            extracurricular: "high".to_string(),
            mental_health: "fair".to_string(),
            stress_level: "7".to_string(),
        }
    }

    #[test]
    fn parses_a_complete_form() {
        let input = form().parse();
        assert_eq!(input.attendance, Some(82.5));
        assert_eq!(input.test_scores, Some(55.0));
        assert_eq!(input.backlogs, Some(3));
        assert_eq!(input.fee_status, Some(FeeStatus::Pending));
        assert_eq!(input.scholarship, Some(Scholarship::Partial));
        assert_eq!(input.part_time_job, Some(PartTimeJob::Yes));
        assert_eq!(input.stress_level, Some(7));
    }

    #[test]
    fn garbage_becomes_absent() {
        let mut values = form();
        values.attendance = "lots".to_string();
        values.backlogs = "-2".to_string();
        values.fee_status = "waived".to_string();
        values.stress_level = "".to_string();
        values.gpa = "NaN".to_string();

        let input = values.parse();
        assert_eq!(input.attendance, None);
        assert_eq!(input.backlogs, None);
        assert_eq!(input.fee_status, None);
        assert_eq!(input.stress_level, None);
        assert_eq!(input.gpa, None);
    }

    #[test]
    fn counts_truncate_fractions() {
        assert_eq!(parse_count("4.9"), Some(4));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn counts_stop_at_trailing_text() {
        assert_eq!(parse_count("3abc"), Some(3));
        assert_eq!(parse_count(" +7 backlogs"), Some(7));
        assert_eq!(parse_count("-2"), None);

        let mut values = form();
        values.backlogs = "3abc".to_string();
        values.stress_level = "8/10".to_string();
        let input = values.parse();
        assert_eq!(input.backlogs, Some(3));
        assert_eq!(input.stress_level, Some(8));
    }

    #[test]
    fn reads_snake_case_csv_headers() {
        let data = "attendance,test_scores,mental_health\n70,35,poor\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: FormValues = reader
            .deserialize()
            .next()
            .expect("one row")
            .expect("valid row");
        let input = row.parse();
        assert_eq!(input.attendance, Some(70.0));
        assert_eq!(input.test_scores, Some(35.0));
        assert_eq!(input.mental_health, Some(MentalHealth::Poor));
        assert_eq!(input.gpa, None);
    }
}
