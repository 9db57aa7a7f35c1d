use crate::models::{Category, RatingSet, RiskFactor, Severity, Stage};

// Fallback for an empty rating set: the neutral midpoint of the 1-10 scale.
// Abnormal input, but it must not produce NaN downstream.
pub const NEUTRAL_AVERAGE: f64 = 5.0;

pub fn weighted_average(ratings: &RatingSet) -> f64 {
    if ratings.is_empty() {
        return NEUTRAL_AVERAGE;
    }

    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (category, rating) in ratings.iter() {
        let weight = category.weight();
        total += rating as f64 * weight;
        weight_sum += weight;
    }

    total / weight_sum
}

// Average 10 (perfect health) maps to angle 0; average 1 maps to 180.
pub fn angle_from_average(average: f64) -> i32 {
    let angle = ((10.0 - average) / 9.0 * 180.0).round() as i32;
    angle.clamp(0, 180)
}

// Quartiles of the 0-180 range. An angle exactly on a boundary classifies
// into the higher-risk stage.
pub fn classify_stage(angle: i32) -> Stage {
    if angle >= 135 {
        Stage::Severe
    } else if angle >= 90 {
        Stage::Critical
    } else if angle >= 45 {
        Stage::Strained
    } else {
        Stage::Stable
    }
}

pub fn extract_risk_factors(ratings: &RatingSet) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    for (category, rating) in ratings.iter() {
        let severity = match rating {
            r if r <= 2 => Severity::Critical,
            3 => Severity::High,
            4 => Severity::Medium,
            _ => continue,
        };
        factors.push(RiskFactor {
            category,
            severity,
            message: risk_message(category, rating, severity),
        });
    }

    factors
}

fn risk_message(category: Category, rating: i32, severity: Severity) -> String {
    let advice = match severity {
        Severity::Critical => "needs immediate attention",
        Severity::High => "needs attention soon",
        _ => "worth a conversation",
    };
    format!("{category} rated {rating}: {advice}")
}
