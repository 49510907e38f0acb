mod interactive;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use server::{AppConfig, AppContext, BookRecommendation, CredentialScheme};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use interactive::Terminal;

/// Book Recs - Book Recommender System
#[derive(Parser)]
#[command(name = "book-recs")]
#[command(about = "Item-based book recommender over the Book-Crossing dataset", long_about = None)]
struct Cli {
    /// Directory holding BX-Books.csv and BX-Book-Ratings.csv
    #[arg(short, long, env = "BOOK_RECS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Registered users file
    #[arg(long, env = "BOOK_RECS_USERS_FILE", default_value = "users.csv")]
    users_file: PathBuf,

    /// Submitted reviews file
    #[arg(long, env = "BOOK_RECS_REVIEWS_FILE", default_value = "reviews.csv")]
    reviews_file: PathBuf,

    /// Keep only the most-rated books
    #[arg(long, env = "BOOK_RECS_TOP_BOOKS", default_value = "5000")]
    top_books: usize,

    /// Keep only the most active users
    #[arg(long, env = "BOOK_RECS_TOP_USERS", default_value = "5000")]
    top_users: usize,

    /// Neighbors per query, the queried book included
    #[arg(long, env = "BOOK_RECS_NEIGHBORS", default_value = "6")]
    neighbors: usize,

    /// Cover lookups kept in memory
    #[arg(long, env = "BOOK_RECS_POSTER_CACHE", default_value = "1024")]
    poster_cache: usize,

    /// Base URL of the volumes API
    #[arg(long, env = "BOOK_RECS_POSTER_API", default_value = poster_client::DEFAULT_BASE_URL)]
    poster_api: String,

    /// Timeout for a cover lookup in seconds
    #[arg(long, env = "BOOK_RECS_POSTER_TIMEOUT")]
    poster_timeout_secs: Option<u64>,

    /// How passwords are stored in the users file
    #[arg(long, env = "BOOK_RECS_PASSWORD_SCHEME", value_enum, default_value_t = PasswordScheme::Plaintext)]
    password_scheme: PasswordScheme,

    /// bcrypt work factor
    #[arg(long, env = "BOOK_RECS_BCRYPT_COST", default_value = "12")]
    bcrypt_cost: u32,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PasswordScheme {
    Plaintext,
    Bcrypt,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive login and recommender session (default)
    App,

    /// Print the books most similar to a title
    Recommend {
        /// Exact book title
        #[arg(long)]
        title: String,
    },

    /// Search the selectable titles
    Search {
        /// Title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Show dataset, matrix and account statistics
    Stats,

    /// Run benchmark to test similarity query latency
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            data_dir: self.data_dir.clone(),
            users_file: self.users_file.clone(),
            reviews_file: self.reviews_file.clone(),
            top_books: self.top_books,
            top_users: self.top_users,
            neighbors: self.neighbors,
            poster_cache_capacity: self.poster_cache,
            poster_api_base: self.poster_api.clone(),
            poster_timeout: self.poster_timeout_secs.map(Duration::from_secs),
            credential_scheme: match self.password_scheme {
                PasswordScheme::Plaintext => CredentialScheme::Plaintext,
                PasswordScheme::Bcrypt => CredentialScheme::Bcrypt {
                    cost: self.bcrypt_cost,
                },
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let app = AppContext::from_config(&config).context("Failed to set up the application")?;

    match cli.command.unwrap_or(Commands::App) {
        Commands::App => {
            let stdin = io::stdin();
            let mut term = Terminal::new(stdin.lock(), io::stdout());
            interactive::run(&app, &mut term).await?
        }
        Commands::Recommend { title } => handle_recommend(&app, &title).await?,
        Commands::Search { title } => handle_search(&app, &title).await?,
        Commands::Stats => handle_stats(&app, &config).await?,
        Commands::Benchmark { requests } => handle_benchmark(&app, requests).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(app: &AppContext, title: &str) -> Result<()> {
    let recommendations = app
        .recommender()
        .recommend(title)
        .await
        .context("Failed to load the Book-Crossing dataset")?;

    if recommendations.is_empty() {
        println!("No recommendations available.");
        return Ok(());
    }
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(app: &AppContext, title: &str) -> Result<()> {
    let matches = app
        .recommender()
        .search(title)
        .await
        .context("Failed to load the Book-Crossing dataset")?;

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("No matching books.");
    }
    for title in matches.iter().take(20) {
        println!("{} {}", "•".green(), title);
    }
    if matches.len() > 20 {
        println!("... and {} more", matches.len() - 20);
    }
    Ok(())
}

/// Handle the 'stats' command
async fn handle_stats(app: &AppContext, config: &AppConfig) -> Result<()> {
    let start = Instant::now();
    let index = app
        .recommender()
        .index()
        .await
        .context("Failed to load the Book-Crossing dataset")?;
    println!("{} Built index in {:.2?}", "✓".green(), start.elapsed());

    let catalog = index.catalog();
    let (books, ratings, titles) = catalog.counts();
    let matrix = index.model().matrix();

    println!("{}", "Dataset:".bold().blue());
    println!("{}Books: {}", "• ".green(), books);
    println!("{}Ratings: {}", "• ".green(), ratings);
    println!("{}Distinct titles: {}", "• ".green(), titles);
    println!("{}Skipped rows: {}", "• ".green(), catalog.skipped_rows());

    println!("{}", "Rating matrix:".bold().blue());
    println!("{}Books (rows): {}", "• ".cyan(), matrix.n_rows());
    println!("{}Users (columns): {}", "• ".cyan(), matrix.n_cols());
    println!("{}Stored ratings: {}", "• ".cyan(), matrix.nnz());
    println!("{}Selectable titles: {}", "• ".cyan(), index.book_titles().len());

    let users = match app.credentials().users() {
        Ok(users) => users.len(),
        Err(accounts::AccountError::NoUsersFile) => 0,
        Err(e) => return Err(e.into()),
    };
    let reviews = if config.reviews_file.exists() {
        app.reviews().reviews()?.len()
    } else {
        0
    };
    println!("{}", "Accounts:".bold().blue());
    println!("{}Registered users: {}", "• ".yellow(), users);
    println!("{}Reviews: {}", "• ".yellow(), reviews);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(app: &AppContext, requests: usize) -> Result<()> {
    let recommender = app.recommender();
    let index = recommender
        .index()
        .await
        .context("Failed to load the Book-Crossing dataset")?;
    let titles = index.book_titles();
    if titles.is_empty() || requests == 0 {
        println!("Nothing to benchmark.");
        return Ok(());
    }

    // random selectable titles; covers are left out to time the model alone
    let queries: Vec<&str> = (0..requests)
        .map(|_| titles[rand::random::<u32>() as usize % titles.len()].as_str())
        .collect();

    let mut timings = Vec::with_capacity(queries.len());
    let started = Instant::now();
    for title in queries {
        let start = Instant::now();
        index.similar_books(title, recommender.neighbors());
        timings.push(start.elapsed());
    }
    let total_time = started.elapsed();

    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print recommendations the way the recommender screen lays them out
fn print_recommendations(recommendations: &[BookRecommendation]) {
    println!("{}", "Recommended books:".bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Distance: {:.4}",
            (i + 1).to_string().green(),
            rec.title,
            rec.distance
        );
        if let Some(poster) = &rec.poster {
            println!("   Cover: {}", poster);
        }
        println!("   Buy on Amazon: {}", rec.links.amazon);
        println!("   Buy on Flipkart: {}", rec.links.flipkart);
    }
}
