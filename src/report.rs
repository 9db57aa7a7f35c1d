use std::fmt::Write;

use chrono::Utc;

use crate::models::Assessment;

// Expects assessments most-recent-first, as fetched from the store.
pub fn trend_direction(assessments: &[Assessment]) -> &'static str {
    match assessments {
        [latest, previous, ..] => {
            if latest.angle < previous.angle {
                "improving"
            } else if latest.angle > previous.angle {
                "worsening"
            } else {
                "steady"
            }
        }
        _ => "not enough history",
    }
}

pub fn build_report(email: &str, assessments: &[Assessment]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Separation Risk Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        email,
        Utc::now().date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Current Standing");

    let latest = match assessments.first() {
        Some(latest) => latest,
        None => {
            let _ = writeln!(output, "No assessments recorded yet.");
            return output;
        }
    };

    let _ = writeln!(
        output,
        "Angle {} of 180 ({} stage), assessed {}",
        latest.angle,
        latest.stage,
        latest.created_at.date_naive()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Factors");

    if latest.risk_factors.is_empty() {
        let _ = writeln!(output, "No categories currently flagged.");
    } else {
        for factor in &latest.risk_factors {
            let _ = writeln!(output, "- {} ({})", factor.message, factor.severity);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## History");
    let _ = writeln!(output, "Trend: {}", trend_direction(assessments));
    for assessment in assessments {
        let _ = writeln!(
            output,
            "- {}: angle {} ({}), {} risk factors",
            assessment.created_at.date_naive(),
            assessment.angle,
            assessment.stage,
            assessment.risk_factors.len()
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, RatingSet};
    use crate::recorder::build_assessment;
    use uuid::Uuid;

    fn assessment_with_angle(target: i32) -> Assessment {
        // Every category at the same rating; pick the rating whose angle is
        // closest to the target for test purposes.
        let rating = (10.0 - (target as f64 / 180.0) * 9.0).round() as i32;
        let ratings =
            RatingSet::new(Category::ALL.iter().map(|c| (*c, rating.clamp(1, 10)))).unwrap();
        build_assessment(Uuid::new_v4(), None, ratings)
    }

    #[test]
    fn trend_reports_improving_when_angle_drops() {
        let history = vec![assessment_with_angle(40), assessment_with_angle(120)];
        assert_eq!(trend_direction(&history), "improving");
    }

    #[test]
    fn trend_reports_worsening_when_angle_rises() {
        let history = vec![assessment_with_angle(120), assessment_with_angle(40)];
        assert_eq!(trend_direction(&history), "worsening");
    }

    #[test]
    fn trend_reports_steady_for_equal_angles() {
        let history = vec![assessment_with_angle(60), assessment_with_angle(60)];
        assert_eq!(trend_direction(&history), "steady");
    }

    #[test]
    fn trend_needs_two_assessments() {
        assert_eq!(trend_direction(&[]), "not enough history");
        assert_eq!(
            trend_direction(&[assessment_with_angle(60)]),
            "not enough history"
        );
    }

    #[test]
    fn report_lists_standing_factors_and_history() {
        let ratings = RatingSet::new(vec![
            (Category::Communication, 2),
            (Category::Trust, 6),
        ])
        .unwrap();
        let assessment = build_assessment(Uuid::new_v4(), None, ratings);
        let report = build_report("dana.whitfield@example.com", &[assessment]);

        assert!(report.contains("# Separation Risk Report"));
        assert!(report.contains("## Current Standing"));
        assert!(report.contains("## Risk Factors"));
        assert!(report.contains("communication rated 2"));
        assert!(report.contains("## History"));
    }

    #[test]
    fn report_handles_empty_history() {
        let report = build_report("nobody@example.com", &[]);
        assert!(report.contains("No assessments recorded yet."));
    }
}
