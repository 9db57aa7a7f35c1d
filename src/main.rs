use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod recorder;
mod report;
mod scoring;

use models::{Assessment, RatingSet};

#[derive(Parser)]
#[command(name = "separation-tracker")]
#[command(about = "Relationship separation risk tracker for Mind Insurance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data and assess it
    Seed,
    /// Import check-ins from a CSV file, recording an assessment per row
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record a check-in and its assessment
    CheckIn {
        #[arg(long)]
        email: String,
        /// Create or update the user with this name before recording
        #[arg(long)]
        name: Option<String>,
        /// JSON object of category ratings, e.g. '{"communication": 8, "trust": 9}'
        #[arg(long)]
        ratings: String,
    },
    /// Recompute an assessment from the user's latest check-in
    Recalc {
        #[arg(long)]
        email: String,
    },
    /// List assessments most-recent-first
    History {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let seeded = db::seed(&pool).await?;
            let count = seeded.len();
            for (user_id, check_in_id, ratings) in seeded {
                recorder::record_assessment(&pool, user_id, Some(check_in_id), ratings).await?;
            }
            println!("Seed data inserted ({count} check-ins assessed).");
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(&pool, &csv).await?;
            let count = imported.len();
            for (user_id, check_in_id, ratings) in imported {
                recorder::record_assessment(&pool, user_id, Some(check_in_id), ratings).await?;
            }
            println!("Recorded {count} check-ins from {}.", csv.display());
        }
        Commands::CheckIn {
            email,
            name,
            ratings,
        } => {
            let ratings = RatingSet::parse_json(&ratings).context("invalid --ratings value")?;
            let user_id = match name {
                Some(name) => db::upsert_user(&pool, &email, &name).await?,
                None => db::find_user(&pool, &email).await?,
            };
            let check_in_id = db::insert_check_in(&pool, user_id, &ratings, None)
                .await?
                .context("check-in insert returned no id")?;
            let assessment =
                recorder::record_assessment(&pool, user_id, Some(check_in_id), ratings).await?;
            print_assessment(&assessment);
        }
        Commands::Recalc { email } => {
            let user_id = db::find_user(&pool, &email).await?;
            let (check_in_id, ratings) = db::latest_check_in(&pool, user_id).await?;
            let assessment =
                recorder::record_assessment(&pool, user_id, Some(check_in_id), ratings).await?;
            print_assessment(&assessment);
        }
        Commands::History { email, limit } => {
            let user_id = db::find_user(&pool, &email).await?;
            let assessments = db::fetch_assessments(&pool, user_id, limit).await?;

            if assessments.is_empty() {
                println!("No assessments recorded for {email}.");
                return Ok(());
            }

            println!("Assessments for {email}:");
            for assessment in &assessments {
                println!(
                    "- {}: angle {} ({}), {} risk factors",
                    assessment.created_at.date_naive(),
                    assessment.angle,
                    assessment.stage,
                    assessment.risk_factors.len()
                );
            }
        }
        Commands::Report { email, out } => {
            let user_id = db::find_user(&pool, &email).await?;
            let assessments = db::fetch_assessments(&pool, user_id, 50).await?;
            let report = report::build_report(&email, &assessments);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_assessment(assessment: &Assessment) {
    println!("Angle {} of 180 ({} stage)", assessment.angle, assessment.stage);
    if assessment.risk_factors.is_empty() {
        println!("No categories flagged.");
    } else {
        println!("Risk factors:");
        for factor in &assessment.risk_factors {
            println!("- {}", factor.message);
        }
    }
}
