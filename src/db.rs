use anyhow::Context;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Assessment, Category, RatingSet};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn upsert_user(pool: &PgPool, email: &str, full_name: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query(
        r#"
        INSERT INTO separation_risk.users (id, email, full_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(full_name)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn find_user(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query("SELECT id FROM separation_risk.users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no user found for {email}"))?;

    Ok(row.get("id"))
}

pub async fn insert_check_in(
    pool: &PgPool,
    user_id: Uuid,
    ratings: &RatingSet,
    source_key: Option<&str>,
) -> anyhow::Result<Option<Uuid>> {
    let row = sqlx::query(
        r#"
        INSERT INTO separation_risk.check_ins (id, user_id, ratings, source_key)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (source_key) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(serde_json::to_value(ratings)?)
    .bind(source_key)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.get("id")))
}

pub async fn latest_check_in(pool: &PgPool, user_id: Uuid) -> anyhow::Result<(Uuid, RatingSet)> {
    let row = sqlx::query(
        "SELECT id, ratings FROM separation_risk.check_ins \
         WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .context("no check-ins recorded for this user")?;

    let ratings: serde_json::Value = row.get("ratings");
    Ok((row.get("id"), serde_json::from_value(ratings)?))
}

pub async fn insert_assessment(pool: &PgPool, assessment: &Assessment) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO separation_risk.assessments
        (id, user_id, check_in_id, angle, stage, ratings, risk_factors, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(assessment.id)
    .bind(assessment.user_id)
    .bind(assessment.check_in_id)
    .bind(assessment.angle)
    .bind(assessment.stage.as_str())
    .bind(serde_json::to_value(&assessment.ratings)?)
    .bind(serde_json::to_value(&assessment.risk_factors)?)
    .bind(assessment.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fetch_assessments(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<Assessment>> {
    let rows = sqlx::query(
        "SELECT id, user_id, check_in_id, angle, stage, ratings, risk_factors, created_at \
         FROM separation_risk.assessments \
         WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut assessments = Vec::new();
    for row in rows {
        let stage: String = row.get("stage");
        let ratings: serde_json::Value = row.get("ratings");
        let risk_factors: serde_json::Value = row.get("risk_factors");

        assessments.push(Assessment {
            id: row.get("id"),
            user_id: row.get("user_id"),
            check_in_id: row.get("check_in_id"),
            angle: row.get("angle"),
            stage: stage.parse()?,
            ratings: serde_json::from_value(ratings)?,
            risk_factors: serde_json::from_value(risk_factors)?,
            created_at: row.get("created_at"),
        });
    }

    Ok(assessments)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<Vec<(Uuid, Uuid, RatingSet)>> {
    let users = vec![
        (
            Uuid::parse_str("6f1c2a4e-8d3b-4f7a-9c51-2e0b8a6d43f1")?,
            "Dana Whitfield",
            "dana.whitfield@example.com",
        ),
        (
            Uuid::parse_str("b2c9e7d0-5a14-4c83-bf62-907d1e3a58c4")?,
            "Marcus Okafor",
            "marcus.okafor@example.com",
        ),
        (
            Uuid::parse_str("4a8d03b6-e972-4516-8cfd-61b54c2f9ea0")?,
            "Priya Raman",
            "priya.raman@example.com",
        ),
    ];

    for (id, full_name, email) in users {
        sqlx::query(
            r#"
            INSERT INTO separation_risk.users (id, email, full_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(full_name)
        .execute(pool)
        .await?;
    }

    let check_ins = vec![
        (
            "seed-001",
            "dana.whitfield@example.com",
            vec![
                (Category::Communication, 8),
                (Category::Trust, 9),
                (Category::Intimacy, 7),
                (Category::QualityTime, 6),
            ],
        ),
        (
            "seed-002",
            "marcus.okafor@example.com",
            vec![
                (Category::Communication, 4),
                (Category::Trust, 5),
                (Category::ConflictResolution, 3),
                (Category::Finances, 4),
            ],
        ),
        (
            "seed-003",
            "priya.raman@example.com",
            vec![
                (Category::Communication, 2),
                (Category::Trust, 3),
                (Category::Intimacy, 2),
                (Category::EmotionalSupport, 3),
                (Category::FutureAlignment, 4),
            ],
        ),
    ];

    let mut recorded = Vec::new();
    for (source_key, email, pairs) in check_ins {
        let user_id = find_user(pool, email).await?;
        let ratings = RatingSet::new(pairs)?;
        if let Some(check_in_id) = insert_check_in(pool, user_id, &ratings, Some(source_key)).await?
        {
            recorded.push((user_id, check_in_id, ratings));
        }
    }

    Ok(recorded)
}

pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<Vec<(Uuid, Uuid, RatingSet)>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        communication: Option<i32>,
        trust: Option<i32>,
        intimacy: Option<i32>,
        shared_goals: Option<i32>,
        conflict_resolution: Option<i32>,
        emotional_support: Option<i32>,
        quality_time: Option<i32>,
        finances: Option<i32>,
        appreciation: Option<i32>,
        future_alignment: Option<i32>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut imported = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let user_id = upsert_user(pool, &row.email, &row.full_name).await?;

        let values = [
            row.communication,
            row.trust,
            row.intimacy,
            row.shared_goals,
            row.conflict_resolution,
            row.emotional_support,
            row.quality_time,
            row.finances,
            row.appreciation,
            row.future_alignment,
        ];
        let pairs = Category::ALL
            .iter()
            .copied()
            .zip(values)
            .filter_map(|(category, value)| value.map(|rating| (category, rating)));
        let ratings = RatingSet::new(pairs)
            .with_context(|| format!("invalid ratings for {}", row.email))?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if let Some(check_in_id) =
            insert_check_in(pool, user_id, &ratings, Some(&source_key)).await?
        {
            imported.push((user_id, check_in_id, ratings));
        }
    }

    Ok(imported)
}
