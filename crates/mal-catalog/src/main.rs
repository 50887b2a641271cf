//! Catalog CLI front-end.
//!
//! Each subcommand maps onto one catalog query. Arguments are type-checked
//! here (enums, integers) before they reach the client; failures come back
//! as a generic message while the detail goes to the daily log.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use mal_catalog::api::AiringStatus;
use mal_catalog::{
    image, schedule, AnimeRecord, CatalogClient, Credentials, ListSort, RankingKind, Season,
    SeasonSort, WatchStatus,
};
use rand::Rng;
use shared::Config;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the MyAnimeList catalog", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for anime matching a query
    Search {
        /// Name of the anime
        query: String,

        /// Number of results to return (capped at 20)
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Result offset for paging
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },

    /// Show the catalog entry for one anime id
    Show {
        /// Catalog anime id
        id: String,

        /// Comma-separated fields to request instead of the defaults
        #[arg(long)]
        fields: Option<String>,

        /// Also download the cover picture into the current directory
        #[arg(long)]
        cover: bool,
    },

    /// Show an anime ranking board
    Ranking {
        /// Ranking board to fetch
        #[arg(value_enum)]
        kind: RankingKind,

        /// Number of results to return (capped at 20)
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Result offset for paging
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },

    /// List the anime of one airing season
    Season {
        /// Airing year
        year: u16,

        /// Airing season
        #[arg(value_enum)]
        season: Season,

        /// Sort order
        #[arg(long, value_enum, default_value = "score")]
        sort: SeasonSort,

        /// Number of results to return (capped at 20)
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Result offset for paging
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },

    /// Show a user's anime list
    UserList {
        /// Catalog username
        user: String,

        /// Filter by watch status (everything when omitted)
        #[arg(long, value_enum)]
        status: Option<WatchStatus>,

        /// Sort order
        #[arg(long, value_enum, default_value = "title")]
        sort: ListSort,

        /// Number of results to return (capped at 20)
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Result offset for paging
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },

    /// Pick a random catalog entry
    Random,

    /// Days until the next episode of a currently airing show (JST)
    NextEpisode {
        /// Catalog anime id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging. Replies go to stdout, so the console layer stays
    // off and failures land in the daily log file.
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "mal-catalog".to_string(),
        default_level: log_level,
        console: false,
        file: true,
        json_format: false,
    })?;

    // Initialize the API client
    let client = CatalogClient::new(
        config.catalog.base_url.clone(),
        Credentials::from_env(),
        Duration::from_secs(config.catalog.timeout_seconds),
    )
    .context("Failed to create catalog client")?;

    match args.command {
        Command::Search {
            query,
            limit,
            offset,
        } => search(&client, &query, limit, offset).await,
        Command::Show { id, fields, cover } => {
            show(&client, &id, fields.as_deref(), cover).await
        }
        Command::Ranking {
            kind,
            limit,
            offset,
        } => ranking(&client, kind, limit, offset).await,
        Command::Season {
            year,
            season,
            sort,
            limit,
            offset,
        } => seasonal(&client, year, season, sort, limit, offset).await,
        Command::UserList {
            user,
            status,
            sort,
            limit,
            offset,
        } => user_list(&client, &user, status, sort, limit, offset).await,
        Command::Random => random(&client).await,
        Command::NextEpisode { id } => next_episode(&client, &id).await,
    }
}

async fn search(client: &CatalogClient, query: &str, limit: u32, offset: u32) -> Result<()> {
    let results = match client
        .search(query.trim(), &limit.to_string(), &offset.to_string())
        .await
    {
        Ok(results) => results,
        Err(_) => {
            println!("Request send error.");
            return Ok(());
        }
    };

    for (i, item) in results.iter().enumerate() {
        println!("#{} {} (ID: {})", i + 1, item.title, item.id);
    }
    Ok(())
}

async fn show(
    client: &CatalogClient,
    id: &str,
    fields: Option<&str>,
    cover: bool,
) -> Result<()> {
    let record = match client.anime_by_id(id.trim(), fields).await {
        Ok(record) => record,
        Err(_) => {
            println!("The requested anime could not be found.");
            return Ok(());
        }
    };

    print_anime_info(&record);

    if cover {
        save_cover(&record).await?;
    }
    Ok(())
}

/// Download the cover picture and write it into the current directory.
async fn save_cover(record: &AnimeRecord) -> Result<()> {
    let picture = match record.main_picture.as_ref() {
        Some(picture) => picture,
        None => {
            println!("No cover picture available for {}.", record.title);
            return Ok(());
        }
    };

    let http = reqwest::Client::new();
    let filename = format!("{}.jpg", record.title);
    match image::fetch_image(&http, &picture.medium, &filename).await {
        Ok(cover) => {
            std::fs::write(&cover.filename, &cover.bytes)
                .with_context(|| format!("Failed to write {}", cover.filename))?;
            println!("Cover saved to {}.", cover.filename);
        }
        Err(_) => {
            println!("Error: Failed to retrieve image for {}.", record.title);
        }
    }
    Ok(())
}

async fn ranking(
    client: &CatalogClient,
    kind: RankingKind,
    limit: u32,
    offset: u32,
) -> Result<()> {
    let results = match client
        .ranking(kind, &limit.to_string(), &offset.to_string())
        .await
    {
        Ok(results) => results,
        Err(_) => {
            println!("Request send error.");
            return Ok(());
        }
    };

    println!("{}", ranking_header(kind));
    for item in &results {
        println!("#{} {} (ID: {})", item.rank, item.anime.title, item.anime.id);
    }
    Ok(())
}

fn ranking_header(kind: RankingKind) -> &'static str {
    match kind {
        RankingKind::All => "Top Anime Series:",
        RankingKind::Airing => "Top Airing Anime:",
        RankingKind::Upcoming => "Top Upcoming Anime:",
        RankingKind::Tv => "Top Anime TV Series:",
        RankingKind::Ova => "Top Anime OVA Series:",
        RankingKind::Movie => "Top Anime Movies:",
        RankingKind::Special => "Top Anime Specials:",
        RankingKind::ByPopularity => "Top Anime by Popularity:",
        RankingKind::Favorite => "Top Favorited Anime:",
    }
}

async fn seasonal(
    client: &CatalogClient,
    year: u16,
    season: Season,
    sort: SeasonSort,
    limit: u32,
    offset: u32,
) -> Result<()> {
    let results = match client
        .seasonal(
            &year.to_string(),
            season,
            sort,
            &limit.to_string(),
            &offset.to_string(),
        )
        .await
    {
        Ok(results) => results,
        Err(_) => {
            println!("Request send error.");
            return Ok(());
        }
    };

    println!("{} {}:", capitalize(season.as_str()), year);
    for (i, item) in results.iter().enumerate() {
        println!("#{} {} (ID: {})", i + 1, item.title, item.id);
    }
    Ok(())
}

async fn user_list(
    client: &CatalogClient,
    user: &str,
    status: Option<WatchStatus>,
    sort: ListSort,
    limit: u32,
    offset: u32,
) -> Result<()> {
    if user.is_empty() {
        println!("Please specify a user.");
        return Ok(());
    }

    let results = match client
        .user_list(user, status, sort, &limit.to_string(), &offset.to_string())
        .await
    {
        Ok(results) => results,
        Err(_) => {
            println!("User not found.");
            return Ok(());
        }
    };

    println!("User: {}", user);
    for (i, item) in results.iter().enumerate() {
        println!("#{} {} (ID: {})", i + 1, item.anime.title, item.anime.id);
        println!(
            "   Status: {}   Score: {}",
            capitalize(item.status.as_str()),
            item.score
        );
    }
    Ok(())
}

async fn random(client: &CatalogClient) -> Result<()> {
    // Probe random ids until one resolves; most of the id space is empty
    for _ in 0..=10 {
        let id = rand::rng().random_range(0..60000u32);
        if let Ok(record) = client.anime_by_id(&id.to_string(), None).await {
            print_anime_info(&record);
            return Ok(());
        }
    }

    println!("Request timed out.");
    Ok(())
}

async fn next_episode(client: &CatalogClient, id: &str) -> Result<()> {
    let record = match client
        .anime_by_id(id.trim(), Some("id,title,start_date,status,broadcast"))
        .await
    {
        Ok(record) => record,
        Err(_) => {
            println!("The requested anime could not be found.");
            return Ok(());
        }
    };

    match record.status {
        Some(AiringStatus::FinishedAiring) => {
            println!("{} has already finished airing.", record.title);
        }
        Some(AiringStatus::NotYetAired) => match &record.start_date {
            Some(start) => println!("{} has an air date of {}.", record.title, start),
            None => println!("{} hasn't begun airing yet.", record.title),
        },
        Some(AiringStatus::CurrentlyAiring) => {
            report_next_broadcast(&record);
        }
        None => {
            println!("{} has an unknown status.", record.title);
        }
    }
    Ok(())
}

/// Report when a currently airing show next broadcasts (JST schedule).
fn report_next_broadcast(record: &AnimeRecord) {
    let weekday = record
        .broadcast
        .as_ref()
        .and_then(|b| schedule::parse_weekday(&b.day_of_the_week));

    let (broadcast, weekday) = match (record.broadcast.as_ref(), weekday) {
        (Some(broadcast), Some(weekday)) => (broadcast, weekday),
        _ => {
            println!("{} has no broadcast schedule listed.", record.title);
            return;
        }
    };

    let start_time = broadcast.start_time.as_deref().unwrap_or("??:??");
    println!(
        "{} airs at {} on {}s!",
        record.title,
        start_time,
        capitalize(&broadcast.day_of_the_week)
    );

    let today = Local::now().date_naive();
    let days = schedule::days_until(today, weekday);
    if days == 0 {
        println!(
            "The next episode airs today at {}! (Or at least it should.)",
            start_time
        );
    } else {
        println!("The next episode (should) air in {} day(s).", days);
    }
}

fn print_anime_info(record: &AnimeRecord) {
    println!("Title: {}", record.title);
    println!(
        "Episodes: {}",
        record
            .num_episodes
            .map(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    );
    println!(
        "Rating: {}",
        record
            .mean
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    );
    match &record.start_season {
        Some(premiere) => println!(
            "Season: {} {}",
            capitalize(premiere.season.as_str()),
            premiere.year
        ),
        None => println!("Season: Unknown"),
    }
    let aired = match (&record.start_date, &record.end_date) {
        (Some(start), Some(end)) => format!("{} ~ {}", start, end),
        (Some(start), None) => format!("{} ~ ???", start),
        _ => "Unknown".to_string(),
    };
    println!("Aired: {}", aired);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
