use anyhow::{bail, Context, Result};
use catalog::{CourseId, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{CourseQuery, CourseService, EnrollOutcome, RecommendedCourse};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// CourseRecs - Course Marketplace Recommender
#[derive(Parser)]
#[command(name = "course-recs")]
#[command(about = "Hybrid course recommender and marketplace tools", long_about = None)]
struct Cli {
    /// Path to the catalog data directory
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get course recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,

        /// Show which tier produced each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Register a new user
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,
    },

    /// Show user profile, ratings and enrollments
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search courses by title and minimum average rating
    Search {
        /// Case-insensitive title substring
        #[arg(long)]
        title: Option<String>,

        /// Minimum average rating (unrated courses are excluded)
        #[arg(long)]
        min_rating: Option<f32>,
    },

    /// Rate a course (1-5); re-rating overwrites the previous rating
    Rate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        course_id: CourseId,

        #[arg(long)]
        rating: u8,

        /// Optional written feedback
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Enroll a user in a course
    Enroll {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        course_id: CourseId,
    },

    /// Show progress, or replace completed topics when --topic is given
    Progress {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        course_id: CourseId,

        /// Completed topic (repeatable)
        #[arg(long = "topic")]
        topics: Vec<String>,
    },

    /// List written feedback for a course
    Feedback {
        #[arg(long)]
        course_id: CourseId,
    },

    /// Compute Precision@K of a user's recommendations
    Evaluate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "5")]
        k: usize,
    },

    /// Dump all courses and ratings as JSON
    Export,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let service = CourseService::load(&cli.data_dir)
        .with_context(|| format!("Failed to load catalog from {}", cli.data_dir.display()))?;
    tracing::info!("Loaded catalog in {:?}", start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            json,
            explain,
        } => handle_recommend(&service, user_id, json, explain).await?,
        Commands::Register { username, email } => {
            let user = service.register_user(&username, &email).await?;
            save(&service, &cli.data_dir).await?;
            println!("{} Registered {} with id {}", "✓".green(), user.username, user.id);
        }
        Commands::User { user_id } => handle_user(&service, user_id).await?,
        Commands::Search { title, min_rating } => {
            handle_search(&service, title, min_rating).await
        }
        Commands::Rate {
            user_id,
            course_id,
            rating,
            feedback,
        } => {
            let course = service.get_course(course_id).await?;
            service
                .rate_course(user_id, course_id, rating, feedback.as_deref())
                .await?;
            save(&service, &cli.data_dir).await?;
            println!("{} Rated {} with {} stars!", "✓".green(), course.title, rating);
        }
        Commands::Enroll { user_id, course_id } => {
            let course = service.get_course(course_id).await?;
            match service.enroll(user_id, course_id).await? {
                EnrollOutcome::Enrolled => {
                    save(&service, &cli.data_dir).await?;
                    println!("{} Enrolled in {}", "✓".green(), course.title);
                }
                EnrollOutcome::AlreadyEnrolled => {
                    println!("Already enrolled in {}", course.title);
                }
            }
        }
        Commands::Progress {
            user_id,
            course_id,
            topics,
        } => handle_progress(&service, &cli.data_dir, user_id, course_id, topics).await?,
        Commands::Feedback { course_id } => handle_feedback(&service, course_id).await?,
        Commands::Evaluate { user_id, k } => {
            let evaluation = service.evaluate(user_id, k).await?;
            println!("Relevant courses: {:?}", evaluation.relevant);
            println!("Recommended courses: {:?}", evaluation.recommended);
            println!(
                "{}",
                format!("Precision@{}: {:.2}", evaluation.k, evaluation.precision)
                    .bold()
                    .blue()
            );
        }
        Commands::Export => {
            let data = service.recommendation_data().await;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Commands::Benchmark { requests } => handle_benchmark(&service, requests).await?,
    }

    Ok(())
}

async fn save(service: &CourseService, data_dir: &Path) -> Result<()> {
    service
        .save(data_dir)
        .await
        .with_context(|| format!("Failed to save catalog to {}", data_dir.display()))
}

/// Handle the 'recommend' command
async fn handle_recommend(
    service: &CourseService,
    user_id: UserId,
    json: bool,
    explain: bool,
) -> Result<()> {
    let recommendations = service.recommend_detailed(user_id).await?;

    if json {
        let courses: Vec<_> = recommendations.iter().map(|r| &r.course).collect();
        println!("{}", serde_json::to_string_pretty(&courses)?);
    } else {
        print_recommendations(&recommendations, explain);
    }
    Ok(())
}

/// Handle the 'user' command
async fn handle_user(service: &CourseService, user_id: UserId) -> Result<()> {
    let profile = service.user_profile(user_id).await?;
    let data = service.recommendation_data().await;
    let ratings: Vec<_> = data
        .ratings
        .iter()
        .filter(|r| r.user_id == user_id)
        .collect();

    println!("{}", format!("User ID: {}", profile.id).bold().blue());
    println!("{}Username: {}", "• ".green(), profile.username);
    println!("{}Email: {}", "• ".green(), profile.email);

    let num_ratings = ratings.len();
    let avg_rating = if num_ratings > 0 {
        let total: f32 = ratings.iter().map(|r| r.rating as f32).sum();
        total / num_ratings as f32
    } else {
        0.0
    };
    println!("{}Number of ratings: {}", "• ".cyan(), num_ratings);
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    let mut top_rated = ratings.clone();
    top_rated.sort_by(|a, b| b.rating.cmp(&a.rating));
    println!("Top rated courses:");
    for rating in top_rated.iter().take(5) {
        if let Some(course) = data.courses.iter().find(|c| c.id == rating.course_id) {
            println!("  - {} (Rating: {})", course.title, rating.rating);
        }
    }

    println!("Enrolled courses:");
    if profile.enrolled_courses.is_empty() {
        println!("  (none)");
    }
    for title in &profile.enrolled_courses {
        println!("  - {}", title);
    }
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(service: &CourseService, title: Option<String>, min_rating: Option<f32>) {
    let query = CourseQuery {
        search: title.clone(),
        min_rating,
    };
    let results = service.list_courses(&query).await;

    let label = title.unwrap_or_else(|| "*".to_string());
    println!("{}", format!("Search results for '{}':", label).bold().blue());
    if results.is_empty() {
        println!("  No matching courses");
    }
    for summary in results.iter().take(20) {
        let rating = match summary.stats.avg_rating {
            Some(avg) => format!("avg {:.2} ({} ratings)", avg, summary.stats.rating_count),
            None => "unrated".to_string(),
        };
        println!(
            "{}: {} [{}] ${:.2} {}",
            summary.course.id, summary.course.title, summary.course.category, summary.course.price, rating
        );
    }
}

/// Handle the 'progress' command
async fn handle_progress(
    service: &CourseService,
    data_dir: &Path,
    user_id: UserId,
    course_id: CourseId,
    topics: Vec<String>,
) -> Result<()> {
    let completed = if topics.is_empty() {
        service.progress(user_id, course_id).await?
    } else {
        let completed = service.update_progress(user_id, course_id, topics).await?;
        save(service, data_dir).await?;
        println!("{} Progress updated", "✓".green());
        completed
    };

    println!("{}", format!("Completed topics ({}):", completed.len()).bold());
    for topic in &completed {
        println!("  - {}", topic);
    }
    Ok(())
}

/// Handle the 'feedback' command
async fn handle_feedback(service: &CourseService, course_id: CourseId) -> Result<()> {
    let course = service.get_course(course_id).await?;
    let feedback = service.course_feedback(course_id).await?;

    println!("{}", format!("Feedback for {}:", course.title).bold().blue());
    if feedback.is_empty() {
        println!("  No feedback yet");
    }
    for entry in &feedback {
        println!(
            "  {} {} - {}",
            "★".repeat(entry.rating as usize).yellow(),
            entry.username.cyan(),
            entry.feedback
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(service: &CourseService, requests: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be greater than zero");
    }
    let user_ids: Vec<UserId> = service
        .recommendation_data()
        .await
        .ratings
        .iter()
        .map(|r| r.user_id)
        .collect();
    if user_ids.is_empty() {
        bail!("Catalog has no ratings to benchmark");
    }

    // Random raters, weighted by how many ratings they submitted
    let targets: Vec<UserId> = (0..requests)
        .map(|_| user_ids[rand::random::<u32>() as usize % user_ids.len()])
        .collect();

    let started = Instant::now();
    let mut handles = vec![];
    for user in targets {
        let service = service.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            service.recommend(user).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = started.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[RecommendedCourse], explain: bool) {
    println!("{}", "Course Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  Nothing to recommend");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let course = &rec.course;
        println!(
            "{}. {} [{}] by {} - ${:.2}",
            (i + 1).to_string().green(),
            course.title,
            course.category,
            course.instructor,
            course.price
        );
        if explain {
            println!("   Source: {:?}, Score: {:.3}", rec.source, rec.score);
        }
    }
}
