//! Incrementum CLI
//!
//! Command-line front end for the scheduling engine: inspect the due queue,
//! preview intervals, submit ratings and manage items.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use incrementum_core::item::DEFAULT_PRIORITY_SLIDER;
use incrementum_core::storage::DATABASE_FILE;
use incrementum_core::{
    Document, Extract, ItemKind, ItemStore, ItemType, LearningItem, QueueEntry, ReviewService,
    ReviewableItem, SchedulerConfig, Storage,
};

/// Incrementum - incremental reading scheduler CLI
#[derive(Parser)]
#[command(name = "incrementum")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the Incrementum incremental reading scheduler")]
#[command(long_about = "Incrementum schedules documents, extracts and flashcards with FSRS-6.\n\nRatings: 1 = Again, 2 = Hard, 3 = Good, 4 = Easy.")]
struct Cli {
    /// Custom data directory (database and settings.json)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show items due now
    Queue,

    /// Show queue statistics and review streak
    Stats,

    /// Preview the interval each rating would give
    Preview {
        /// Item id
        id: String,
    },

    /// Rate an item (1 = Again, 2 = Hard, 3 = Good, 4 = Easy)
    Rate {
        /// Item kind: document, extract or learning-item
        #[arg(value_parser = parse_kind)]
        kind: ItemKind,
        /// Item id
        id: String,
        /// Rating 1-4
        #[arg(allow_negative_numbers = true)]
        rating: i32,
        /// Time spent on the item in milliseconds
        #[arg(long)]
        time_ms: Option<u64>,
    },

    /// Add a document to read incrementally
    AddDocument {
        /// Document title
        title: String,
        /// Priority rating 1-4
        #[arg(long)]
        priority: Option<i32>,
        /// Priority slider 0-100
        #[arg(long, default_value_t = DEFAULT_PRIORITY_SLIDER)]
        slider: i32,
        /// Tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },

    /// Add an extract taken from a document
    AddExtract {
        /// Source document id
        document_id: String,
        /// Extract text
        content: String,
        /// Display priority 0-10
        #[arg(long)]
        priority: Option<f64>,
    },

    /// Add a learning item (flashcard)
    AddItem {
        /// Question or cloze text
        question: String,
        /// Answer
        #[arg(long)]
        answer: Option<String>,
        /// Extract the item was derived from
        #[arg(long)]
        extract_id: Option<String>,
        /// Item type: flashcard, cloze, qa, basic
        #[arg(long, default_value = "flashcard")]
        item_type: String,
    },

    /// Show the review history of an item
    History {
        /// Item id
        id: String,
    },

    /// Show the daily review streak
    Streak,

    /// Suspend a learning item (or resume it with --resume)
    Suspend {
        /// Learning item id
        id: String,
        #[arg(long)]
        resume: bool,
    },

    /// Archive a document (or restore it with --restore)
    Archive {
        /// Document id
        id: String,
        #[arg(long)]
        restore: bool,
    },

    /// Print the effective scheduler configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let data_dir = resolve_data_dir(cli.data_dir.clone())?;
    let json = cli.json;

    match cli.command {
        Commands::Queue => run_queue(&data_dir, json),
        Commands::Stats => run_stats(&data_dir, json),
        Commands::Preview { id } => run_preview(&data_dir, &id, json),
        Commands::Rate {
            kind,
            id,
            rating,
            time_ms,
        } => run_rate(&data_dir, kind, &id, rating, time_ms, json),
        Commands::AddDocument {
            title,
            priority,
            slider,
            tags,
        } => run_add_document(&data_dir, title, priority, slider, tags),
        Commands::AddExtract {
            document_id,
            content,
            priority,
        } => run_add_extract(&data_dir, document_id, content, priority),
        Commands::AddItem {
            question,
            answer,
            extract_id,
            item_type,
        } => run_add_item(&data_dir, question, answer, extract_id, &item_type),
        Commands::History { id } => run_history(&data_dir, &id, json),
        Commands::Streak => run_streak(&data_dir, json),
        Commands::Suspend { id, resume } => run_suspend(&data_dir, &id, !resume),
        Commands::Archive { id, restore } => run_archive(&data_dir, &id, !restore),
        Commands::Config => run_config(&data_dir),
    }
}

/// Logs go to stderr so stdout stays clean for --json output
fn init_logging(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(false)
            .init();
    }
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir,
        None => ProjectDirs::from("com", "incrementum", "core")
            .context("Could not determine project directories")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create data directory {}", dir.display()))?;
    Ok(dir)
}

fn parse_kind(s: &str) -> Result<ItemKind, String> {
    ItemKind::parse_name(s)
        .ok_or_else(|| format!("unknown item kind '{}' (expected document, extract or learning-item)", s))
}

fn open_storage(data_dir: &Path) -> anyhow::Result<Storage> {
    Ok(Storage::new(Some(data_dir.join(DATABASE_FILE)))?)
}

fn open_service(data_dir: &Path) -> anyhow::Result<ReviewService<Storage>> {
    let config = SchedulerConfig::load(Some(data_dir))?;
    Ok(ReviewService::new(open_storage(data_dir)?, config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_due(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match due {
        None => "new".to_string(),
        Some(due) if due < now => {
            let days = (now - due).num_days();
            if days == 0 {
                "due".to_string()
            } else {
                format!("{}d overdue", days)
            }
        }
        Some(_) => "due".to_string(),
    }
}

fn kind_label(kind: ItemKind) -> colored::ColoredString {
    match kind {
        ItemKind::Document => "DOC ".blue().bold(),
        ItemKind::Extract => "EXT ".magenta().bold(),
        ItemKind::LearningItem => "CARD".green().bold(),
    }
}

fn print_queue_entry(entry: &QueueEntry, now: DateTime<Utc>) {
    println!(
        "  {} {:<48} {:>6.1}  {:>3}m  {}  {}",
        kind_label(entry.kind),
        truncate(&entry.title, 48),
        entry.priority,
        entry.estimated_time,
        format_due(entry.due, now).dimmed(),
        entry.id.dimmed()
    );
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let short: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", short)
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_queue(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let service = open_service(data_dir)?;
    let now = Utc::now();
    let queue = service.due_queue_at(now)?;

    if json {
        return print_json(&queue);
    }

    println!("{}", "=== Review Queue ===".cyan().bold());
    println!();
    if queue.is_empty() {
        println!("{}", "Nothing due. Come back later.".dimmed());
        return Ok(());
    }
    for entry in &queue {
        print_queue_entry(entry, now);
    }
    println!();
    let minutes: u32 = queue.iter().map(|e| e.estimated_time).sum();
    println!("{}: {} items, ~{} min", "Total".white().bold(), queue.len(), minutes);
    Ok(())
}

fn run_stats(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let service = open_service(data_dir)?;
    let now = Utc::now();
    let stats = service.queue_stats_at(now)?;
    let streak = service.review_streak(now.date_naive())?;
    let reviews = service.review_statistics_at(now)?;

    if json {
        return print_json(&serde_json::json!({
            "queue": stats,
            "streak": streak,
            "reviews": reviews,
        }));
    }

    println!("{}", "=== Incrementum Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Due Today".white().bold(), stats.due_today);
    println!("{}: {}", "Overdue".white().bold(), stats.overdue);
    println!("{}: {}", "New".white().bold(), stats.new_items);
    println!("{}: {} min", "Estimated Time".white().bold(), stats.total_estimated_time);

    if stats.total_items > 0 {
        println!();
        println!("{}", "=== By Kind ===".yellow().bold());
        print_distribution_bar("Documents", stats.documents, stats.total_items, "blue");
        print_distribution_bar("Extracts", stats.extracts, stats.total_items, "magenta");
        print_distribution_bar("Learning items", stats.learning_items, stats.total_items, "green");
    }

    println!();
    println!("{}: {} days", "Current Streak".white().bold(), streak.current_streak);
    println!("{}: {} days", "Longest Streak".white().bold(), streak.longest_streak);
    println!("{}: {}", "Total Reviews".white().bold(), streak.total_reviews);

    if reviews.total_items > 0 {
        println!();
        println!("{}", "=== Learning Items ===".yellow().bold());
        println!("{}: {}", "Lapses".white().bold(), reviews.total_lapses);
        println!("{}: {:.1} days", "Average Interval".white().bold(), reviews.average_interval);
        if let Some(retention) = reviews.retention_estimate {
            println!("{}: {:.1}%", "Retention".white().bold(), retention * 100.0);
        }
        println!(
            "{}: {} today, {} this week, {} this month",
            "Due".white().bold(),
            reviews.due_today,
            reviews.due_week,
            reviews.due_month
        );
    }
    Ok(())
}

fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "blue" => bar.blue(),
        "magenta" => bar.magenta(),
        "green" => bar.green(),
        _ => bar.white(),
    };

    println!(
        "  {:15} [{:30}] {:>4} ({:>5.1}%)",
        label, colored_bar, count, percentage
    );
}

fn run_preview(data_dir: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let service = open_service(data_dir)?;
    let preview = service.preview(id, Utc::now())?;

    if json {
        return print_json(&preview);
    }

    println!("{}", "=== Interval Preview ===".cyan().bold());
    println!();
    println!("{} {}", kind_label(preview.kind), preview.title);
    println!("{}: {}", "State".white().bold(), preview.state);
    println!(
        "{}: {:.1}%",
        "Retrievability".white().bold(),
        preview.retrievability * 100.0
    );
    println!();
    println!("  {} {:>5} days", "1 Again".red(), preview.intervals.again);
    println!("  {} {:>5} days", "2 Hard ".yellow(), preview.intervals.hard);
    println!("  {} {:>5} days", "3 Good ".green(), preview.intervals.good);
    println!("  {} {:>5} days", "4 Easy ".blue(), preview.intervals.easy);
    Ok(())
}

fn run_rate(
    data_dir: &Path,
    kind: ItemKind,
    id: &str,
    rating: i32,
    time_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let service = open_service(data_dir)?;
    let outcome = service.submit_rating(kind, id, rating, time_ms, Utc::now())?;

    if json {
        return print_json(&outcome);
    }

    println!("{} {}", "Rated".green().bold(), outcome.item.title());
    println!("  {}", outcome.reason);
    println!(
        "  {} → {}, next review {}",
        outcome.update.state_before,
        outcome.update.state,
        outcome.update.due.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  stability {:.2}, difficulty {:.2}, lapses {}",
        outcome.update.stability, outcome.update.difficulty, outcome.update.lapses
    );
    Ok(())
}

fn split_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn run_add_document(
    data_dir: &Path,
    title: String,
    priority: Option<i32>,
    slider: i32,
    tags: Option<String>,
) -> anyhow::Result<()> {
    if let Some(p) = priority {
        if !(1..=4).contains(&p) {
            bail!("Priority must be between 1 and 4");
        }
    }

    let storage = open_storage(data_dir)?;
    let mut doc = Document::new(title).with_priority(priority.unwrap_or(0), slider);
    doc.tags = split_tags(tags);
    storage.insert_document(&doc)?;

    println!(
        "{} {} (priority {:.0})",
        "Added document".green().bold(),
        doc.id,
        doc.priority_score
    );
    Ok(())
}

fn run_add_extract(
    data_dir: &Path,
    document_id: String,
    content: String,
    priority: Option<f64>,
) -> anyhow::Result<()> {
    let storage = open_storage(data_dir)?;
    if storage.get_item(ItemKind::Document, &document_id)?.is_none() {
        bail!("Document not found: {}", document_id);
    }

    let mut extract = Extract::new(document_id, content);
    if let Some(p) = priority {
        extract.priority = p.clamp(0.0, 10.0);
    }
    storage.insert_extract(&extract)?;

    println!("{} {}", "Added extract".green().bold(), extract.id);
    Ok(())
}

fn run_add_item(
    data_dir: &Path,
    question: String,
    answer: Option<String>,
    extract_id: Option<String>,
    item_type: &str,
) -> anyhow::Result<()> {
    let storage = open_storage(data_dir)?;
    let mut item = LearningItem::new(ItemType::parse_name(item_type), question);
    item.answer = answer;

    if let Some(extract_id) = extract_id {
        match storage.get_item(ItemKind::Extract, &extract_id)? {
            Some(ReviewableItem::Extract(extract)) => {
                item = item.from_extract(extract.id, extract.document_id);
            }
            _ => bail!("Extract not found: {}", extract_id),
        }
    }
    storage.insert_learning_item(&item)?;

    println!("{} {}", "Added learning item".green().bold(), item.id);
    Ok(())
}

fn run_history(data_dir: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let service = open_service(data_dir)?;
    let history = service.review_history(id)?;

    if json {
        return print_json(&history);
    }

    println!("{}", "=== Review History ===".cyan().bold());
    println!();
    if history.is_empty() {
        println!("{}", "No reviews recorded.".dimmed());
        return Ok(());
    }
    for log in &history {
        let time = log
            .time_taken_ms
            .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {:<6} {:<10} +{:<4} {:>7.1}d  {}",
            log.reviewed_at.format("%Y-%m-%d %H:%M"),
            log.rating.as_str(),
            log.state_before.as_str(),
            log.elapsed_days,
            log.scheduled_days,
            time.dimmed()
        );
    }
    Ok(())
}

fn run_streak(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let service = open_service(data_dir)?;
    let streak = service.review_streak(Utc::now().date_naive())?;

    if json {
        return print_json(&streak);
    }

    println!("{}: {} days", "Current Streak".white().bold(), streak.current_streak);
    println!("{}: {} days", "Longest Streak".white().bold(), streak.longest_streak);
    println!("{}: {}", "Total Reviews".white().bold(), streak.total_reviews);
    if let Some(last) = streak.last_review_date {
        println!("{}: {}", "Last Review".white().bold(), last);
    }
    Ok(())
}

fn run_suspend(data_dir: &Path, id: &str, suspend: bool) -> anyhow::Result<()> {
    let storage = open_storage(data_dir)?;
    if !storage.set_suspended(id, suspend)? {
        bail!("Learning item not found: {}", id);
    }
    let verb = if suspend { "Suspended" } else { "Resumed" };
    println!("{} {}", verb.green().bold(), id);
    Ok(())
}

fn run_archive(data_dir: &Path, id: &str, archive: bool) -> anyhow::Result<()> {
    let storage = open_storage(data_dir)?;
    if !storage.set_archived(id, archive)? {
        bail!("Document not found: {}", id);
    }
    let verb = if archive { "Archived" } else { "Restored" };
    println!("{} {}", verb.green().bold(), id);
    Ok(())
}

fn run_config(data_dir: &Path) -> anyhow::Result<()> {
    let config = SchedulerConfig::load(Some(data_dir))?;
    print_json(&config)
}
