use anyhow::Context;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{Assessment, RatingSet};
use crate::scoring;

pub fn build_assessment(
    user_id: Uuid,
    check_in_id: Option<Uuid>,
    ratings: RatingSet,
) -> Assessment {
    let average = scoring::weighted_average(&ratings);
    let angle = scoring::angle_from_average(average);
    let stage = scoring::classify_stage(angle);
    let risk_factors = scoring::extract_risk_factors(&ratings);

    Assessment {
        id: Uuid::new_v4(),
        user_id,
        check_in_id,
        angle,
        stage,
        ratings,
        risk_factors,
        created_at: Utc::now(),
    }
}

// Append-only: every call inserts a fresh row, even for identical ratings.
// Preventing duplicate submissions is the caller's concern, not ours.
pub async fn record_assessment(
    pool: &PgPool,
    user_id: Uuid,
    check_in_id: Option<Uuid>,
    ratings: RatingSet,
) -> anyhow::Result<Assessment> {
    let assessment = build_assessment(user_id, check_in_id, ratings);
    db::insert_assessment(pool, &assessment)
        .await
        .context("failed to persist assessment")?;
    Ok(assessment)
}
