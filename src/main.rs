use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use edutrack_risk::config::{AppConfig, ConfigArgs};
use edutrack_risk::input::FormValues;
use edutrack_risk::models::ProgressSnapshot;
use edutrack_risk::roster::{DepartmentCode, RosterError, RosterFilter, SortKey};
use edutrack_risk::{assistant, chart, report, risk, roster};
use edutrack_risk::{Dashboard, RiskLevel, RiskResult, StudentInput, StudentRecord};

#[derive(Parser)]
#[command(name = "edutrack-risk")]
#[command(about = "Student dropout risk scoring and counselor roster", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one student's assessment form
    Score {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Score every row of a CSV file of assessment forms
    ScoreBatch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the counselor roster
    #[command(group(
        ArgGroup::new("narrow")
            .args(["dept", "risk", "semester"])
            .multiple(true)
            .conflicts_with("search")
    ))]
    Roster {
        /// Department code: cs, ee, me, ce or it
        #[arg(long)]
        dept: Option<String>,
        #[arg(long)]
        risk: Option<String>,
        #[arg(long)]
        semester: Option<u8>,
        #[arg(long)]
        search: Option<String>,
        /// risk-desc, risk-asc, name-asc or name-desc
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Extra students to add before listing
        #[arg(long)]
        import: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown counselor report
    Report {
        #[arg(long)]
        dept: Option<String>,
        #[arg(long)]
        import: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Ask the help-desk assistant a question
    Ask { question: Vec<String> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Assessment form fields, taken as raw text like the web form sends them.
#[derive(Args, Debug, Clone, Default)]
struct FormArgs {
    #[arg(long)]
    attendance: Option<String>,
    #[arg(long)]
    test_scores: Option<String>,
    #[arg(long)]
    backlogs: Option<String>,
    #[arg(long)]
    gpa: Option<String>,
    #[arg(long)]
    fee_status: Option<String>,
    #[arg(long)]
    scholarship: Option<String>,
    #[arg(long)]
    family_income: Option<String>,
    #[arg(long)]
    distance_home: Option<String>,
    #[arg(long)]
    part_time_job: Option<String>,
    #[arg(long)]
    extracurricular: Option<String>,
    #[arg(long)]
    mental_health: Option<String>,
    #[arg(long)]
    stress_level: Option<String>,
}

impl FormArgs {
    fn fields(&self) -> [&Option<String>; 12] {
        [
            &self.attendance,
            &self.test_scores,
            &self.backlogs,
            &self.gpa,
            &self.fee_status,
            &self.scholarship,
            &self.family_income,
            &self.distance_home,
            &self.part_time_job,
            &self.extracurricular,
            &self.mental_health,
            &self.stress_level,
        ]
    }

    fn is_empty(&self) -> bool {
        self.fields().iter().all(|field| field.is_none())
    }

    fn into_values(self) -> FormValues {
        FormValues {
            attendance: self.attendance.unwrap_or_default(),
            test_scores: self.test_scores.unwrap_or_default(),
            backlogs: self.backlogs.unwrap_or_default(),
            gpa: self.gpa.unwrap_or_default(),
            fee_status: self.fee_status.unwrap_or_default(),
            scholarship: self.scholarship.unwrap_or_default(),
            family_income: self.family_income.unwrap_or_default(),
            distance_home: self.distance_home.unwrap_or_default(),
            part_time_job: self.part_time_job.unwrap_or_default(),
            extracurricular: self.extracurricular.unwrap_or_default(),
            mental_health: self.mental_health.unwrap_or_default(),
            stress_level: self.stress_level.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Assessment {
    input: StudentInput,
    risk_level: RiskLevel,
    #[serde(flatten)]
    result: RiskResult,
    categories: chart::ChartSeries,
    progress: ProgressSnapshot,
}

impl Assessment {
    fn from_input(input: StudentInput) -> Self {
        let result = risk::score(&input);
        Assessment {
            risk_level: RiskLevel::from_score(result.score),
            categories: chart::categorize(&result.factors).to_chart(),
            progress: risk::progress(&input),
            input,
            result,
        }
    }

    fn print_text(&self) {
        println!(
            "Risk score: {}% ({} risk)",
            self.result.score,
            self.risk_level.as_str()
        );

        println!("Factors:");
        if self.result.factors.is_empty() {
            println!("- none detected");
        }
        for factor in self.result.factors.iter() {
            println!(
                "- {} ({}) {:+}%",
                factor.name,
                factor.severity.as_str(),
                factor.impact
            );
        }

        println!("Recommendations:");
        for rec in self.result.recommendations.iter() {
            println!(
                "- {} {} [{}]: {}",
                rec.icon,
                rec.action,
                rec.priority.as_str(),
                rec.description
            );
        }

        println!(
            "Progress: attendance {:.0}%, grades {:.0}%, overall {:.0}%",
            self.progress.attendance, self.progress.grades, self.progress.overall
        );
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The "analyzing" pause belongs to the presentation layer, never the engine.
async fn simulate_analysis(config: &AppConfig) {
    if !config.latency.is_zero() {
        info!(delay_ms = config.latency.as_millis() as u64, "analyzing");
        tokio::time::sleep(config.latency).await;
    }
}

fn load_dashboard(config: &AppConfig, import: Option<&PathBuf>) -> anyhow::Result<Dashboard> {
    let mut students = roster::seed_roster()?;
    if let Some(path) = import {
        let inserted = roster::import_csv(&mut students, path, Utc::now().date_naive())?;
        info!(inserted, path = %path.display(), "imported students");
    }
    Ok(Dashboard::new(students, config))
}

fn roster_filter(
    dept: Option<&str>,
    risk: Option<&str>,
    semester: Option<u8>,
) -> Result<RosterFilter, RosterError> {
    let department = dept.map(DepartmentCode::parse).transpose()?;
    let risk_level = risk
        .map(|value| {
            RiskLevel::parse(value).ok_or_else(|| RosterError::UnknownRiskLevel(value.to_string()))
        })
        .transpose()?;
    Ok(RosterFilter {
        department,
        risk_level,
        semester,
    })
}

fn roster_line(student: &StudentRecord) -> String {
    let mut factors: Vec<String> = student.factors.iter().take(2).cloned().collect();
    if student.factors.len() > 2 {
        factors.push(format!("+{} more", student.factors.len() - 2));
    }
    format!(
        "- {} ({}, {}, sem {}) {} {}% [{}] last contact {}",
        student.name,
        student.roll_no,
        student.department,
        student.semester,
        student.risk_level.as_str(),
        student.risk_score,
        factors.join(", "),
        student.last_contact.format("%b %-d, %Y")
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from(cli.config);
    init_tracing(&config);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Score { form, format } => {
            let assessment = Assessment::from_input(form.into_values().parse());
            simulate_analysis(&config).await;
            match format {
                OutputFormat::Text => assessment.print_text(),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
            }
        }
        Commands::ScoreBatch { csv, format } => {
            let mut reader = csv::Reader::from_path(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let mut assessments = Vec::new();
            for (index, row) in reader.deserialize::<FormValues>().enumerate() {
                let row = row.with_context(|| format!("invalid form row {}", index + 1))?;
                assessments.push(Assessment::from_input(row.parse()));
            }
            simulate_analysis(&config).await;

            match format {
                OutputFormat::Text => {
                    if assessments.is_empty() {
                        println!("No assessments found in {}.", csv.display());
                        return Ok(());
                    }
                    for (index, assessment) in assessments.iter().enumerate() {
                        println!(
                            "- row {}: score {}% ({} risk) across {} factors",
                            index + 1,
                            assessment.result.score,
                            assessment.risk_level.as_str(),
                            assessment.result.factors.len()
                        );
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessments)?),
            }
        }
        Commands::Roster {
            dept,
            risk,
            semester,
            search,
            sort,
            page,
            import,
            format,
        } => {
            let mut dashboard = load_dashboard(&config, import.as_ref())?;
            let filter = roster_filter(dept.as_deref(), risk.as_deref(), semester)?;
            if filter != RosterFilter::default() {
                dashboard.apply_filters(filter);
            }
            if let Some(term) = search.as_deref() {
                dashboard.search(term);
            }
            if let Some(key) = sort.as_deref() {
                dashboard.sort(SortKey::parse(key)?);
            }
            dashboard.go_to_page(page);
            let visible = dashboard.visible_page();

            match format {
                OutputFormat::Text => {
                    let stats = dashboard.stats();
                    println!(
                        "{} students, {} high risk, {} unread notifications",
                        stats.total_students,
                        stats.high_risk,
                        dashboard.notifications.unread_count()
                    );
                    if visible.students.is_empty() {
                        println!("No students match.");
                        return Ok(());
                    }
                    println!(
                        "Showing {}-{} of {} (page {}/{}):",
                        visible.showing_start,
                        visible.showing_end,
                        visible.total,
                        visible.number,
                        visible.total_pages
                    );
                    for student in visible.students.iter() {
                        println!("{}", roster_line(student));
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&visible)?),
            }
        }
        Commands::Report {
            dept,
            import,
            out,
            form,
        } => {
            let mut dashboard = load_dashboard(&config, import.as_ref())?;
            let department = dept.as_deref().map(DepartmentCode::parse).transpose()?;
            if let Some(code) = department {
                dashboard.apply_filters(RosterFilter {
                    department: Some(code),
                    ..RosterFilter::default()
                });
            }

            let assessment = if form.is_empty() {
                None
            } else {
                simulate_analysis(&config).await;
                Some(risk::score(&form.into_values().parse()))
            };

            let report = report::build_report(
                department.map(|code| code.name()),
                Utc::now().date_naive(),
                dashboard.visible(),
                assessment.as_ref(),
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Ask { question } => {
            println!("{}", assistant::reply(&question.join(" ")));
        }
    }

    Ok(())
}
