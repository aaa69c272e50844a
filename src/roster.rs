use std::cmp::Ordering;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::input::{parse_count, parse_real};
use crate::models::{RiskLevel, RosterStats, StudentRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("student {0} is required")]
    MissingField(&'static str),
    #[error("unknown department code `{0}`")]
    UnknownDepartment(String),
    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),
    #[error("unknown risk level `{0}`")]
    UnknownRiskLevel(String),
}

/// Short codes used by the department filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentCode {
    Cs,
    Ee,
    Me,
    Ce,
    It,
}

impl DepartmentCode {
    pub fn parse(code: &str) -> Result<Self, RosterError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "cs" => Ok(Self::Cs),
            "ee" => Ok(Self::Ee),
            "me" => Ok(Self::Me),
            "ce" => Ok(Self::Ce),
            "it" => Ok(Self::It),
            other => Err(RosterError::UnknownDepartment(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cs => "Computer Science",
            Self::Ee => "Electrical Engineering",
            Self::Me => "Mechanical Engineering",
            Self::Ce => "Civil Engineering",
            Self::It => "Information Technology",
        }
    }
}

/// Conjunction of optional predicates; `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub department: Option<DepartmentCode>,
    pub risk_level: Option<RiskLevel>,
    pub semester: Option<u8>,
}

impl RosterFilter {
    pub fn matches(&self, student: &StudentRecord) -> bool {
        self.department
            .map_or(true, |code| student.department == code.name())
            && self.risk_level.map_or(true, |level| student.risk_level == level)
            && self.semester.map_or(true, |semester| student.semester == semester)
    }
}

pub fn filter(students: &[StudentRecord], filter: &RosterFilter) -> Vec<StudentRecord> {
    students
        .iter()
        .filter(|student| filter.matches(student))
        .cloned()
        .collect()
}

/// Case-insensitive substring match on name, roll number or department.
pub fn search(students: &[StudentRecord], term: &str) -> Vec<StudentRecord> {
    let needle = term.to_lowercase();
    students
        .iter()
        .filter(|student| {
            student.name.to_lowercase().contains(&needle)
                || student.roll_no.to_lowercase().contains(&needle)
                || student.department.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    RiskDesc,
    RiskAsc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub fn parse(value: &str) -> Result<Self, RosterError> {
        match value.trim() {
            "risk-desc" => Ok(Self::RiskDesc),
            "risk-asc" => Ok(Self::RiskAsc),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            other => Err(RosterError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Root-locale collation with a byte-wise tiebreak, so the order is total.
struct NameOrder {
    collator: Option<Collator>,
}

impl NameOrder {
    fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                warn!(?err, "name collation unavailable, falling back to case-insensitive order");
                None
            }
        };
        NameOrder { collator }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        collated.then_with(|| a.cmp(b))
    }
}

/// Stable, so equal keys keep their current relative order.
pub fn sort(students: &mut [StudentRecord], key: SortKey) {
    match key {
        SortKey::RiskDesc => students.sort_by(|a, b| b.risk_score.cmp(&a.risk_score)),
        SortKey::RiskAsc => students.sort_by(|a, b| a.risk_score.cmp(&b.risk_score)),
        SortKey::NameAsc => {
            let order = NameOrder::new();
            students.sort_by(|a, b| order.compare(&a.name, &b.name));
        }
        SortKey::NameDesc => {
            let order = NameOrder::new();
            students.sort_by(|a, b| order.compare(&b.name, &a.name));
        }
    }
}

/// 1-based page cursor over a list of `len` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current: usize,
}

/// The visible window and the "showing start-end of total" numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub number: usize,
    pub total_pages: usize,
    pub showing_start: usize,
    pub showing_end: usize,
    pub total: usize,
    pub students: Vec<StudentRecord>,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Paginator {
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current < self.total_pages(len)
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Returns false and stays put when already on the last page.
    pub fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, page: usize, len: usize) {
        self.current = page.clamp(1, self.total_pages(len));
    }

    pub fn page(&self, students: &[StudentRecord]) -> Page {
        let total = students.len();
        let current = self.current.min(self.total_pages(total));
        let start = ((current - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);

        Page {
            number: current,
            total_pages: self.total_pages(total),
            showing_start: if total == 0 { 0 } else { start + 1 },
            showing_end: end,
            total,
            students: students[start..end].to_vec(),
        }
    }
}

pub fn stats(students: &[StudentRecord]) -> RosterStats {
    RosterStats {
        total_students: students.len(),
        high_risk: students
            .iter()
            .filter(|s| s.risk_level == RiskLevel::High)
            .count(),
    }
}

/// Values from the "add student" form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewStudent {
    pub name: String,
    pub roll_no: String,
    /// A department code (`cs`) or a full department name.
    pub department: String,
    pub semester: String,
    pub email: String,
    pub phone: String,
    pub gpa: String,
}

impl NewStudent {
    pub fn into_record(self, today: NaiveDate) -> Result<StudentRecord, RosterError> {
        let name = self.name.trim().to_string();
        let roll_no = self.roll_no.trim().to_string();
        if name.is_empty() {
            return Err(RosterError::MissingField("name"));
        }
        if roll_no.is_empty() {
            return Err(RosterError::MissingField("roll number"));
        }

        let department = match DepartmentCode::parse(&self.department) {
            Ok(code) => code.name().to_string(),
            Err(_) => self.department.trim().to_string(),
        };
        let semester = parse_count(&self.semester)
            .and_then(|v| u8::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(1);

        Ok(StudentRecord {
            id: Uuid::new_v4(),
            name,
            roll_no,
            department,
            semester,
            risk_level: RiskLevel::Unknown,
            risk_score: 0,
            factors: Vec::new(),
            last_contact: today,
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            gpa: parse_real(&self.gpa).unwrap_or(0.0),
            attendance: 0.0,
        })
    }
}

/// Adds a student at the front of the roster.
pub fn add_student(
    students: &mut Vec<StudentRecord>,
    new_student: NewStudent,
    today: NaiveDate,
) -> Result<Uuid, RosterError> {
    let record = new_student.into_record(today)?;
    let id = record.id;
    info!(name = %record.name, roll_no = %record.roll_no, "student added");
    students.insert(0, record);
    Ok(id)
}

pub fn import_reader<R: Read>(
    students: &mut Vec<StudentRecord>,
    reader: R,
    today: NaiveDate,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<NewStudent>().enumerate() {
        let row = result.with_context(|| format!("invalid student row {}", index + 1))?;
        match add_student(students, row, today) {
            Ok(_) => inserted += 1,
            Err(err) => warn!(row = index + 1, %err, "skipping student row"),
        }
    }

    Ok(inserted)
}

pub fn import_csv(
    students: &mut Vec<StudentRecord>,
    csv_path: &Path,
    today: NaiveDate,
) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_reader(students, file, today)
}

/// The demo roster shown on the counselor dashboard.
pub fn seed_roster() -> anyhow::Result<Vec<StudentRecord>> {
    let rows = vec![
        (
            "6f1c2a3e-8d4b-4c1a-9e2f-0a1b2c3d4e01",
            "Ganesh",
            "101ME",
            DepartmentCode::Cs,
            3,
            RiskLevel::High,
            78,
            vec!["Low Attendance", "Poor Grades", "Financial Issues"],
            (2024, 1, 15),
            "john.doe@university.edu",
            "+1234567890",
            2.1,
            65.0,
        ),
        (
            "6f1c2a3e-8d4b-4c1a-9e2f-0a1b2c3d4e02",
            "Chanthrika",
            "205CS",
            DepartmentCode::Cs,
            4,
            RiskLevel::Medium,
            45,
            vec!["Stress", "Part-time Job"],
            (2024, 1, 12),
            "jane.smith@university.edu",
            "+1234567891",
            3.2,
            78.0,
        ),
        (
            "6f1c2a3e-8d4b-4c1a-9e2f-0a1b2c3d4e03",
            "Shirivanth",
            "301EE",
            DepartmentCode::Ee,
            6,
            RiskLevel::Low,
            25,
            vec![],
            (2024, 1, 10),
            "bob.johnson@university.edu",
            "+1234567892",
            3.8,
            92.0,
        ),
        (
            "6f1c2a3e-8d4b-4c1a-9e2f-0a1b2c3d4e04",
            "Shanjana",
            "102CE",
            DepartmentCode::Ce,
            2,
            RiskLevel::High,
            82,
            vec!["Very Low Attendance", "Multiple Backlogs", "Mental Health"],
            (2024, 1, 14),
            "alice.brown@university.edu",
            "+1234567893",
            1.8,
            45.0,
        ),
        (
            "6f1c2a3e-8d4b-4c1a-9e2f-0a1b2c3d4e05",
            "Charlie Wilson",
            "403IT",
            DepartmentCode::It,
            8,
            RiskLevel::Medium,
            55,
            vec!["Job Pressure", "Final Year Stress"],
            (2024, 1, 11),
            "charlie.wilson@university.edu",
            "+1234567894",
            2.9,
            72.0,
        ),
    ];

    let mut students = Vec::with_capacity(rows.len());
    for (
        id,
        name,
        roll_no,
        dept,
        semester,
        level,
        score,
        factors,
        contact,
        email,
        phone,
        gpa,
        attendance,
    ) in rows
    {
        let (year, month, day) = contact;
        students.push(StudentRecord {
            id: Uuid::parse_str(id)?,
            name: name.to_string(),
            roll_no: roll_no.to_string(),
            department: dept.name().to_string(),
            semester,
            risk_level: level,
            risk_score: score,
            factors: factors.into_iter().map(str::to_string).collect(),
            last_contact: NaiveDate::from_ymd_opt(year, month, day).context("invalid date")?,
            email: email.to_string(),
            phone: phone.to_string(),
            gpa,
            attendance,
        });
    }

    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<StudentRecord> {
        seed_roster().expect("seed roster")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date")
    }

    fn names(students: &[StudentRecord]) -> Vec<&str> {
        students.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn seed_has_five_students() {
        let students = roster();
        assert_eq!(students.len(), 5);
        assert_eq!(stats(&students), RosterStats { total_students: 5, high_risk: 2 });
    }

    #[test]
    fn filters_are_a_conjunction() {
        let students = roster();
        let by_dept = RosterFilter {
            department: Some(DepartmentCode::Cs),
            ..RosterFilter::default()
        };
        assert_eq!(names(&filter(&students, &by_dept)), vec!["Ganesh", "Chanthrika"]);

        let dept_and_risk = RosterFilter {
            risk_level: Some(RiskLevel::Medium),
            ..by_dept
        };
        assert_eq!(names(&filter(&students, &dept_and_risk)), vec!["Chanthrika"]);

        let nobody = RosterFilter {
            semester: Some(8),
            ..dept_and_risk
        };
        assert!(filter(&students, &nobody).is_empty());

        assert_eq!(filter(&students, &RosterFilter::default()), students);
    }

    #[test]
    fn filtered_set_preserves_order() {
        let students = roster();
        let medium = RosterFilter {
            risk_level: Some(RiskLevel::Medium),
            ..RosterFilter::default()
        };
        let result = filter(&students, &medium);
        let positions: Vec<usize> = result
            .iter()
            .map(|s| students.iter().position(|o| o.id == s.id).expect("subset"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn search_matches_any_column_case_insensitively() {
        let students = roster();
        assert_eq!(names(&search(&students, "CHARLIE")), vec!["Charlie Wilson"]);
        assert_eq!(names(&search(&students, "301ee")), vec!["Shirivanth"]);
        assert_eq!(names(&search(&students, "civil")), vec!["Shanjana"]);
        assert_eq!(search(&students, "").len(), 5);
        assert!(search(&students, "zzz").is_empty());
    }

    #[test]
    fn sort_orders() {
        let mut students = roster();
        sort(&mut students, SortKey::RiskDesc);
        assert_eq!(
            students.iter().map(|s| s.risk_score).collect::<Vec<_>>(),
            vec![82, 78, 55, 45, 25]
        );
        let descending: Vec<Uuid> = students.iter().map(|s| s.id).collect();

        sort(&mut students, SortKey::RiskAsc);
        let mut ascending: Vec<Uuid> = students.iter().map(|s| s.id).collect();
        ascending.reverse();
        assert_eq!(ascending, descending);

        sort(&mut students, SortKey::NameAsc);
        assert_eq!(
            names(&students),
            vec!["Chanthrika", "Charlie Wilson", "Ganesh", "Shanjana", "Shirivanth"]
        );
        sort(&mut students, SortKey::NameDesc);
        assert_eq!(names(&students)[0], "Shirivanth");
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut students = roster();
        students[0].name = "aaron".to_string();
        students[1].name = "Abby".to_string();
        sort(&mut students, SortKey::NameAsc);
        assert_eq!(names(&students)[..2], ["aaron", "Abby"]);
    }

    #[test]
    fn name_sort_collates_accented_names() {
        let mut students = roster();
        students.truncate(3);
        for (student, name) in students.iter_mut().zip(["Émile", "Zara", "Farah"]) {
            student.name = name.to_string();
        }

        sort(&mut students, SortKey::NameAsc);
        assert_eq!(names(&students), vec!["Émile", "Farah", "Zara"]);
        sort(&mut students, SortKey::NameDesc);
        assert_eq!(names(&students), vec!["Zara", "Farah", "Émile"]);
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!(SortKey::parse("name-desc"), Ok(SortKey::NameDesc));
        assert_eq!(
            SortKey::parse("age"),
            Err(RosterError::UnknownSortKey("age".to_string()))
        );
    }

    #[test]
    fn paginator_stays_in_range() {
        let students = roster();
        let mut pages = Paginator::new(2);
        assert_eq!(pages.total_pages(students.len()), 3);
        assert!(!pages.prev());
        assert_eq!(pages.current(), 1);

        assert!(pages.next(students.len()));
        assert!(pages.next(students.len()));
        assert!(!pages.next(students.len()));
        assert_eq!(pages.current(), 3);

        let page = pages.page(&students);
        assert_eq!(page.showing_start, 5);
        assert_eq!(page.showing_end, 5);
        assert_eq!(names(&page.students), vec!["Charlie Wilson"]);

        pages.go_to(99, students.len());
        assert_eq!(pages.current(), 3);
        pages.go_to(0, students.len());
        assert_eq!(pages.current(), 1);
    }

    #[test]
    fn empty_roster_has_one_empty_page() {
        let mut pages = Paginator::new(10);
        assert_eq!(pages.total_pages(0), 1);
        assert!(!pages.next(0));
        let page = pages.page(&[]);
        assert_eq!(page.showing_start, 0);
        assert_eq!(page.showing_end, 0);
        assert!(page.students.is_empty());
    }

    #[test]
    fn add_student_applies_defaults() {
        let mut students = roster();
        let id = add_student(
            &mut students,
            NewStudent {
                name: " Priya ".to_string(),
                roll_no: "501ME".to_string(),
                department: "me".to_string(),
                semester: "".to_string(),
                gpa: "x".to_string(),
                ..NewStudent::default()
            },
            today(),
        )
        .expect("valid student");

        let added = &students[0];
        assert_eq!(added.id, id);
        assert_eq!(added.name, "Priya");
        assert_eq!(added.department, "Mechanical Engineering");
        assert_eq!(added.semester, 1);
        assert_eq!(added.gpa, 0.0);
        assert_eq!(added.risk_level, RiskLevel::Unknown);
        assert_eq!(added.risk_score, 0);
        assert_eq!(added.last_contact, today());
        assert_eq!(students.len(), 6);
    }

    #[test]
    fn add_student_requires_name_and_roll() {
        let mut students = Vec::new();
        let missing_roll = NewStudent {
            name: "Priya".to_string(),
            ..NewStudent::default()
        };
        assert_eq!(
            add_student(&mut students, missing_roll, today()),
            Err(RosterError::MissingField("roll number"))
        );
        assert_eq!(
            add_student(&mut students, NewStudent::default(), today()),
            Err(RosterError::MissingField("name"))
        );
        assert!(students.is_empty());
    }

    #[test]
    fn import_skips_invalid_rows() {
        let data = "name,roll_no,department,semester,email,phone,gpa\n\
                    Asha,610IT,it,5,asha@university.edu,+1,3.4\n\
                    ,611IT,it,5,,,\n\
                    Ravi,612EE,Electrical Engineering,2,,,2.2\n";
        let mut students = Vec::new();
        let inserted = import_reader(&mut students, data.as_bytes(), today()).expect("import");
        assert_eq!(inserted, 2);
        assert_eq!(names(&students), vec!["Ravi", "Asha"]);
        assert_eq!(students[1].department, "Information Technology");
        assert_eq!(students[1].semester, 5);
    }

    #[test]
    fn import_csv_reads_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.csv");
        std::fs::write(&path, "name,roll_no\nMeera,700CS\n").expect("write csv");

        let mut students = Vec::new();
        assert_eq!(import_csv(&mut students, &path, today()).expect("import"), 1);
        assert_eq!(students[0].roll_no, "700CS");
    }
}
