use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use gamesanpi::utils::{IllustrationStats, ListingFilter, ListingStats};
use gamesanpi::{DiscoveryLimits, ScraperError, SiteConfig, WebScraper};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "gamesanpi")]
#[command(about = "Browse gamesanpi.com articles and their illustrations", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Serve listing, articles and images from this origin instead of gamesanpi.com"
    )]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the articles of the front page, newest first
    List {
        #[arg(
            long,
            help = "Maximum number of results to return",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        limit: Option<u16>,

        #[arg(
            long,
            help = "Number of results to skip from the beginning",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        offset: Option<u16>,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Only articles published on or after this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        since: Option<NaiveDate>,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Only articles published on or before this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        until: Option<NaiveDate>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Discover the illustrations of the newest articles
    Illusts {
        #[arg(
            long,
            default_value_t = 15,
            help = "Number of newest articles to search",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        max_articles: u16,

        #[arg(
            long,
            default_value_t = 10,
            help = "Stop once this many illustrations were found",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        max: u16,

        #[arg(
            long,
            default_value_t = 3,
            help = "Highest illust<N>.png index probed per article",
            value_parser = clap::value_parser!(u8).range(1..)
        )]
        per_article: u8,

        #[arg(
            long,
            default_value_t = 1,
            help = "Number of existence probes in flight at once",
            value_parser = clap::value_parser!(u16).range(1..=16)
        )]
        concurrency: u16,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn build_scraper(base_url: Option<&str>, limits: DiscoveryLimits) -> WebScraper {
    let site = base_url
        .map(SiteConfig::with_base_url)
        .unwrap_or_default();

    WebScraper::with_site(site, limits).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::List {
            limit,
            offset,
            since,
            until,
            format,
        } => {
            let listing_filter = ListingFilter {
                since,
                until,
                limit: limit.map(usize::from),
                offset: offset.map(usize::from),
            };

            let listing_filter = listing_filter.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let scraper = build_scraper(cli.base_url.as_deref(), DiscoveryLimits::default());

            let articles = scraper.list_articles().await.unwrap_or_else(|e| {
                log::error!("Error fetching article list: {}", e);
                process::exit(1);
            });

            let articles = listing_filter.apply(articles);

            match format {
                OutputFormat::Json => serialize_json(&articles),
                OutputFormat::Text => {
                    if articles.is_empty() {
                        println!("No entries to display.");
                    } else {
                        for (i, article) in articles.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, article);
                            println!("     {}", article.url);
                        }
                        print!("{}", ListingStats::from_articles(&articles));
                    }
                }
            }
        }

        Commands::Illusts {
            max_articles,
            max,
            per_article,
            concurrency,
            format,
        } => {
            let limits = DiscoveryLimits {
                max_articles: max_articles.into(),
                illustrations_per_article: per_article,
                max_illustrations: max.into(),
                concurrency: concurrency.into(),
            };

            let scraper = build_scraper(cli.base_url.as_deref(), limits);

            let illustrations = match scraper.discover_illustrations().await {
                Ok(illustrations) => illustrations,
                Err(ScraperError::NotFound) => {
                    println!("No illustrations found. Try again later.");
                    process::exit(1);
                }
                Err(e) => {
                    log::error!("Error discovering illustrations: {}", e);
                    process::exit(1);
                }
            };

            match format {
                OutputFormat::Json => serialize_json(&illustrations),
                OutputFormat::Text => {
                    for (i, illustration) in illustrations.iter().enumerate() {
                        println!("{:>3}. {}", i + 1, illustration);
                    }
                    print!("{}", IllustrationStats::from_illustrations(&illustrations));
                }
            }
        }
    }
}
