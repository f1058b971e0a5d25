//! Simple test harness for the recommendation engine.
//!
//! Loads a data directory and prints recommendations for one user.
//!
//! Usage: server [DATA_DIR] [USER_ID]

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::UserId;
use server::CourseService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,recommender=debug,pipeline=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data/catalog".to_string()));
    let user_id: UserId = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("Invalid user id '{}'", raw))?,
        None => 1,
    };

    info!("Loading catalog from {}", data_dir.display());
    let service = CourseService::load(&data_dir)
        .with_context(|| format!("Failed to load catalog from {}", data_dir.display()))?;
    let (users, courses, ratings, enrollments) = service.counts().await;
    info!(
        "Catalog loaded: {} users, {} courses, {} ratings, {} enrollments",
        users, courses, ratings, enrollments
    );

    let recommendations = service.recommend(user_id).await?;
    info!("Received {} recommendations:", recommendations.len());
    for (i, course) in recommendations.iter().enumerate() {
        info!(
            "{}. {} [{}] by {} - ${:.2}",
            i + 1,
            course.title,
            course.category,
            course.instructor,
            course.price
        );
    }

    Ok(())
}
