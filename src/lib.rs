//! EduTrack risk library - dropout-risk scoring and the counselor roster

// Invariants shared by the engine modules:
// - Scoring is pure: no clocks, randomness, or I/O
// - Missing or out-of-range inputs contribute nothing
// - Scores are clamped to 0..=100 only after all factors are summed

pub mod assistant;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod input;
pub mod models;
pub mod notifications;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod roster;

pub use dashboard::Dashboard;
pub use models::{RiskLevel, RiskResult, StudentInput, StudentRecord};
