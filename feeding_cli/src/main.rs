use clap::{Parser, Subcommand};
use feeding_core::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "neofeed")]
#[command(about = "Newborn feeding volume scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a per-feed volume schedule
    Calc {
        /// Body weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        /// Prescribed volume in mL per kg per day
        #[arg(long)]
        rate: Option<u32>,

        /// Patient was newly admitted mid-cycle
        #[arg(long)]
        admitted: bool,

        /// Admission hour (0-23), required with --admitted
        #[arg(long)]
        hour: Option<u32>,

        /// Admission minute (5-minute steps), required with --admitted
        #[arg(long)]
        minute: Option<u32>,

        /// Don't record this use in the visit log
        #[arg(long)]
        dry_run: bool,
    },

    /// Browse and post improvement suggestions
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },

    /// Show visit statistics (admin mode only)
    Stats,

    /// Roll up the visit log into the CSV archive
    Rollup {
        /// Remove processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Leave admin mode
    Lock,
}

#[derive(Subcommand)]
enum BoardAction {
    /// List suggestions, newest first
    List,

    /// Post a new suggestion
    Post {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,
    },

    /// Show one suggestion with its replies
    Show { id: String },

    /// Reply to a suggestion (flagged as an admin reply in admin mode)
    Comment {
        id: String,

        #[arg(long)]
        text: String,
    },

    /// Delete a suggestion (admin mode only)
    Delete { id: String },

    /// Delete a reply (admin mode only)
    DeleteComment { id: String, comment_id: String },
}

fn main() -> Result<()> {
    // Initialize logging
    feeding_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Calc {
            weight,
            rate,
            admitted,
            hour,
            minute,
            dry_run,
        } => cmd_calc(data_dir, weight, rate, admitted, hour, minute, dry_run),
        Commands::Board { action } => cmd_board(data_dir, action, &config),
        Commands::Stats => cmd_stats(data_dir),
        Commands::Rollup { cleanup } => cmd_rollup(data_dir, cleanup),
        Commands::Lock => cmd_lock(data_dir),
    }
}

fn visit_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("log").join("visits.wal")
}

fn visit_csv_path(data_dir: &Path) -> PathBuf {
    data_dir.join("visits.csv")
}

fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join("state.json")
}

fn cmd_calc(
    data_dir: PathBuf,
    weight: Option<f64>,
    rate: Option<u32>,
    admitted: bool,
    hour: Option<u32>,
    minute: Option<u32>,
    dry_run: bool,
) -> Result<()> {
    let status = if admitted {
        PatientStatus::NewlyAdmitted
    } else {
        PatientStatus::Resident
    };
    let admission = match (hour, minute) {
        (Some(hour), Some(minute)) => Some(AdmissionTime { hour, minute }),
        _ => None,
    };
    let input = PatientInput {
        weight_kg: weight,
        ml_per_kg_per_day: rate,
        status,
        admission,
    };

    // The unlock check runs before validation so the sentinel never reaches
    // the calculator.
    if is_unlock_request(&input) {
        AppState::update(&state_path(&data_dir), |state| {
            state.admin_mode = true;
            state.admin_enabled_at = Some(chrono::Utc::now());
            Ok(())
        })?;
        println!("🔐 Admin mode enabled.");
        display_stats(&data_dir)?;
        return Ok(());
    }

    let state = AppState::load(&state_path(&data_dir))?;
    if state.admin_mode {
        println!("👑 Admin mode active");
        display_stats(&data_dir)?;
    }

    let result = compute_schedule(get_default_cycle(), &input)?;
    display_schedule(&result);

    if dry_run {
        println!("[Dry run - visit not recorded]");
        return Ok(());
    }

    let mut log = JsonlVisitLog::new(visit_log_path(&data_dir));
    log.append(&VisitRecord {
        id: Uuid::new_v4(),
        recorded_at: chrono::Utc::now(),
        source: "calc".into(),
    })?;

    Ok(())
}

fn cmd_board(data_dir: PathBuf, action: BoardAction, config: &Config) -> Result<()> {
    let board_path = data_dir.join("board.json");
    let state = AppState::load(&state_path(&data_dir))?;

    match action {
        BoardAction::List => {
            let board = Board::load(&board_path)?;
            if board.suggestions.is_empty() {
                println!("No suggestions yet.");
                return Ok(());
            }
            for suggestion in &board.suggestions {
                println!(
                    "{}  {}  {} ({} replies)",
                    suggestion.id,
                    suggestion.posted_at.format("%Y-%m-%d"),
                    suggestion.title,
                    suggestion.comments.len()
                );
            }
            Ok(())
        }

        BoardAction::Post { title, content } => {
            let id = Board::update(&board_path, |board| {
                board.post(&title, &content, &config.board)
            })?;
            println!("✓ Posted suggestion {}", id);
            Ok(())
        }

        BoardAction::Show { id } => {
            let id = parse_id(&id)?;
            let board = Board::load(&board_path)?;
            let suggestion = board
                .get(id)
                .ok_or_else(|| Error::Board(format!("no suggestion with id {}", id)))?;

            println!("{}", suggestion.title);
            println!("  posted {}", suggestion.posted_at.format("%Y-%m-%d"));
            println!();
            println!("{}", suggestion.content);
            if !suggestion.comments.is_empty() {
                println!();
                for comment in &suggestion.comments {
                    let badge = if comment.from_admin { " [admin]" } else { "" };
                    println!(
                        "  {}  {}{}: {}",
                        comment.id,
                        comment.posted_at.format("%Y-%m-%d"),
                        badge,
                        comment.text
                    );
                }
            }
            Ok(())
        }

        BoardAction::Comment { id, text } => {
            let id = parse_id(&id)?;
            let from_admin = state.admin_mode;
            let comment_id =
                Board::update(&board_path, |board| board.add_comment(id, &text, from_admin))?;
            println!("✓ Added reply {}", comment_id);
            Ok(())
        }

        BoardAction::Delete { id } => {
            require_admin(&state)?;
            let id = parse_id(&id)?;
            Board::update(&board_path, |board| board.delete(id))?;
            println!("✓ Deleted suggestion {}", id);
            Ok(())
        }

        BoardAction::DeleteComment { id, comment_id } => {
            require_admin(&state)?;
            let id = parse_id(&id)?;
            let comment_id = parse_id(&comment_id)?;
            Board::update(&board_path, |board| board.delete_comment(id, comment_id))?;
            println!("✓ Deleted reply {}", comment_id);
            Ok(())
        }
    }
}

fn cmd_stats(data_dir: PathBuf) -> Result<()> {
    let state = AppState::load(&state_path(&data_dir))?;
    if !state.admin_mode {
        println!("Visit statistics are only shown in admin mode.");
        return Ok(());
    }
    display_stats(&data_dir)
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let log_dir = data_dir.join("log");
    let log_path = log_dir.join("visits.wal");
    let csv_path = visit_csv_path(&data_dir);

    if !log_path.exists() {
        println!("No visit log found - nothing to roll up.");
        return Ok(());
    }

    let count = feeding_core::rollup::visits_to_csv_and_archive(&log_path, &csv_path)?;

    println!("✓ Rolled up {} visits to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = feeding_core::rollup::cleanup_processed_logs(&log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}

fn cmd_lock(data_dir: PathBuf) -> Result<()> {
    AppState::update(&state_path(&data_dir), |state| {
        state.admin_mode = false;
        state.admin_enabled_at = None;
        Ok(())
    })?;
    println!("Admin mode disabled.");
    Ok(())
}

fn display_schedule(result: &ScheduleResult) {
    const NIGHT_LABELS: [&str; 2] = ["02:00", "05:00"];

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  NEWBORN FEEDING SCHEDULE");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Daily total:  {} mL", result.daily_total_ml);
    println!("  To be given:  {} mL", result.effective_total_ml);
    println!();

    for feed in &result.feeds {
        let tag = match feed.marker {
            FeedMarker::Admission => "  🏥 admission",
            FeedMarker::Bottle if NIGHT_LABELS.contains(&feed.time.as_str()) => "  🌙",
            FeedMarker::Bottle => "",
        };
        println!("  {}  {:>4} mL{}", feed.time, feed.volume_ml, tag);
    }

    println!();
}

fn display_stats(data_dir: &Path) -> Result<()> {
    let stats = count_visits(
        &visit_log_path(data_dir),
        &visit_csv_path(data_dir),
        chrono::Utc::now(),
    )?;
    println!();
    println!("  📅 Visitors today:  {}", stats.today);
    println!("  👥 Visitors total:  {}", stats.total);
    println!();
    Ok(())
}

fn require_admin(state: &AppState) -> Result<()> {
    if !state.admin_mode {
        return Err(Error::Board("admin mode required".into()));
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Board(format!("invalid id '{}': {}", raw, e)))
}
