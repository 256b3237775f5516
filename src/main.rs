use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use movie_digest::notify::{MailgunNotifier, Notifier, StdoutNotifier};
use movie_digest::parser::shapes::Shape;
use movie_digest::settings::Settings;
use movie_digest::source::{FileSource, HttpSource};

#[derive(Parser)]
#[command(name = "movie_digest", about = "Scrape a movie listing page and mail it as JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the listing, extract records and deliver the payload
    Run {
        #[arg(short, long, value_enum)]
        shape: Option<Shape>,
        /// Max items per bucket (<= 0: all)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Print the payload instead of sending it
        #[arg(long)]
        print: bool,
    },
    /// Extract records from a saved page and print the payload
    Extract {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long, value_enum)]
        shape: Option<Shape>,
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Print the URL a run would fetch
    Url {
        #[arg(short, long, value_enum)]
        shape: Option<Shape>,
    },
}

fn apply_overrides(settings: &mut Settings, shape: Option<Shape>, limit: Option<i64>) {
    if let Some(shape) = shape {
        settings.shape = shape;
    }
    if let Some(n) = limit {
        settings.max_num_films = n;
        settings.new_limit = n;
        settings.old_limit = n;
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("Failed to load settings")?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Run { shape, limit, print } => {
            apply_overrides(&mut settings, shape, limit);
            let timeout = Duration::from_secs(settings.timeout_secs);
            let url = settings.shape.listing_url(today, settings.window_days);
            let source = HttpSource::new(timeout)?;

            let notifier: Box<dyn Notifier> = match (&settings.mailgun, print) {
                (Some(mailgun), false) => {
                    Box::new(MailgunNotifier::new(mailgun.clone(), &settings.subject(), timeout)?)
                }
                (None, false) => {
                    info!("No mailgun settings, printing payload");
                    Box::new(StdoutNotifier)
                }
                (_, true) => Box::new(StdoutNotifier),
            };

            let payload = movie_digest::run(&source, notifier.as_ref(), settings.shape, &settings.limits(), &url)?;
            let total: usize = payload.buckets.iter().map(|b| b.records.len()).sum();
            info!("Delivered {} records in {:.1}s", total, t0.elapsed().as_secs_f64());
        }
        Commands::Extract { file, shape, limit } => {
            apply_overrides(&mut settings, shape, limit);
            let url = settings.shape.listing_url(today, settings.window_days);
            let source = FileSource::new(file);
            movie_digest::run(&source, &StdoutNotifier, settings.shape, &settings.limits(), &url)?;
        }
        Commands::Url { shape } => {
            apply_overrides(&mut settings, shape, None);
            println!("{}", settings.shape.listing_url(today, settings.window_days));
        }
    }

    Ok(())
}
