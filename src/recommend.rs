use crate::models::{Priority, Recommendation, RiskFactor};

struct Advice {
    priority: Priority,
    action: &'static str,
    description: &'static str,
    icon: &'static str,
}

impl Advice {
    fn to_recommendation(&self) -> Recommendation {
        Recommendation {
            priority: self.priority,
            action: self.action.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
        }
    }
}

static IMPROVE_ATTENDANCE: Advice = Advice {
    priority: Priority::High,
    action: "Improve Attendance",
    description: "Attend all classes regularly. Aim for at least 85% attendance.",
    icon: "📅",
};

static ACADEMIC_SUPPORT: Advice = Advice {
    priority: Priority::High,
    action: "Academic Support",
    description: "Join study groups, seek tutoring, and meet with professors during office hours.",
    icon: "📚",
};

static MENTAL_HEALTH_SUPPORT: Advice = Advice {
    priority: Priority::High,
    action: "Mental Health Support",
    description: "Schedule a session with the campus counseling center.",
    icon: "🧠",
};

static FINANCIAL_PLANNING: Advice = Advice {
    priority: Priority::Medium,
    action: "Financial Planning",
    description: "Meet with financial aid office to discuss payment options.",
    icon: "💰",
};

static GENERAL: [Advice; 2] = [
    Advice {
        priority: Priority::Medium,
        action: "Time Management",
        description: "Create a structured study schedule and stick to it.",
        icon: "⏰",
    },
    Advice {
        priority: Priority::Low,
        action: "Peer Support",
        description: "Connect with classmates and form study partnerships.",
        icon: "👥",
    },
];

fn advice_for(factor_name: &str) -> Option<&'static Advice> {
    match factor_name {
        "Very Low Attendance" | "Low Attendance" => Some(&IMPROVE_ATTENDANCE),
        "Poor Academic Performance" | "Below Average Grades" => Some(&ACADEMIC_SUPPORT),
        "Mental Health Concerns" => Some(&MENTAL_HEALTH_SUPPORT),
        "Fee Payment Issues" => Some(&FINANCIAL_PLANNING),
        _ => None,
    }
}

/// Recommendations keyed on factor names, in factor order, followed by the
/// two general recommendations. Each action appears at most once.
pub fn derive(factors: &[RiskFactor]) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = Vec::new();

    let matched = factors.iter().filter_map(|factor| advice_for(&factor.name));
    for advice in matched.chain(GENERAL.iter()) {
        if recommendations.iter().any(|r| r.action == advice.action) {
            continue;
        }
        recommendations.push(advice.to_recommendation());
    }

    recommendations
}
