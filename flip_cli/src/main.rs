use chrono::Utc;
use clap::{Parser, Subcommand};
use flip_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "flip")]
#[command(about = "Swipe-based spaced repetition flashcards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a review session over the due cards of a deck (default)
    Review {
        /// Deck to review (defaults to the bundled sample deck)
        #[arg(long)]
        deck: Option<String>,

        /// Restrict the session to one chapter
        #[arg(long)]
        chapter: Option<String>,

        /// Non-interactive action script (for testing):
        /// r=right, l=left, s=skip 15m, u=undo, q=quit
        #[arg(long)]
        script: Option<String>,

        /// Hands-free mode: cards flip and swipe left automatically
        #[arg(long, conflicts_with = "script")]
        autoplay: bool,
    },

    /// Create the bundled sample deck
    Seed,

    /// Show learned/learning counts for a deck
    Stats {
        #[arg(long)]
        deck: Option<String>,
    },

    /// Roll the session log up to CSV
    Export {
        /// Remove processed session logs after export
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    flip_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Review {
            deck,
            chapter,
            script,
            autoplay,
        }) => cmd_review(&data_dir, deck, chapter, script, autoplay, &config),
        Some(Commands::Seed) => cmd_seed(&data_dir),
        Some(Commands::Stats { deck }) => cmd_stats(&data_dir, deck),
        Some(Commands::Export { cleanup }) => cmd_export(&data_dir, cleanup),
        None => cmd_review(&data_dir, None, None, None, false, &config),
    }
}

fn current_user() -> StaticUserSession {
    let name = std::env::var("USER").unwrap_or_else(|_| "local".into());
    StaticUserSession(UserId(name))
}

type CliEngine = ReviewEngine<JsonDeckStore, JsonFavoriteStore>;

fn cmd_review(
    data_dir: &Path,
    deck: Option<String>,
    chapter: Option<String>,
    script: Option<String>,
    autoplay: bool,
    config: &Config,
) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;

    let store = JsonDeckStore::open(data_dir)?;
    let deck_id = deck.unwrap_or_else(|| SAMPLE_DECK_ID.to_string());
    if store.get_deck(&deck_id).is_none() {
        return Err(Error::Session(format!(
            "Deck '{}' not found. Run `flip seed` to create the sample deck.",
            deck_id
        )));
    }

    let favorites = JsonFavoriteStore::open(data_dir)?;
    let session = current_user();
    let mut engine =
        ReviewEngine::with_tuning(store, favorites, &session, config.review.tuning());

    let started_at = Utc::now();
    let due = engine.start_session(&deck_id, chapter.as_deref())?;
    if due == 0 {
        println!("No cards due in '{}' - come back later.", deck_id);
        return Ok(());
    }
    println!("{} cards due in '{}'.\n", due, deck_id);

    if let Some(script) = script {
        run_scripted(&mut engine, &script);
        return finish_session(data_dir, &engine, &deck_id, chapter, started_at);
    }

    let engine = Arc::new(Mutex::new(engine));
    let mut ticker = start_scheduler_ticker(engine.clone(), config);

    if autoplay {
        run_autoplay(engine.clone(), config);
    } else {
        run_interactive(&engine)?;
    }

    ticker.stop();
    let engine = engine.lock().map_err(|_| Error::Session("engine poisoned".into()))?;
    finish_session(data_dir, &engine, &deck_id, chapter, started_at)
}

/// Periodic tick moving due reinsertions back into the queue.
///
/// Owned by this function's caller and stopped before the session
/// summary, so no tick can touch the queue after the session is over.
fn start_scheduler_ticker(engine: Arc<Mutex<CliEngine>>, config: &Config) -> PeriodicTicker {
    let interval = std::time::Duration::from_secs(config.review.tick_interval_seconds);
    PeriodicTicker::start(interval, move || {
        if let Ok(mut engine) = engine.lock() {
            engine.tick(Utc::now());
        }
    })
}

fn run_scripted(engine: &mut CliEngine, script: &str) {
    for action in script.chars() {
        match action {
            'r' => {
                engine.swipe(SwipeDirection::Right);
            }
            'l' => {
                engine.swipe(SwipeDirection::Left);
            }
            's' => {
                engine.skip(SkipDuration::FifteenMinutes);
            }
            'u' => {
                engine.undo();
            }
            'q' => break,
            other => {
                eprintln!("Ignoring unknown script action '{}'", other);
            }
        }
    }
}

fn run_interactive(engine: &Arc<Mutex<CliEngine>>) -> Result<()> {
    loop {
        let card = match engine.lock() {
            Ok(engine) => engine.current().cloned(),
            Err(_) => return Err(Error::Session("engine poisoned".into())),
        };

        let card = match card {
            Some(card) => card,
            None => break,
        };

        println!("┌─────────────────────────────────────────");
        println!("│  {}", card_face(&card, "front"));
        println!("└─────────────────────────────────────────");
        print!("[Enter] to flip, q to quit > ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().eq_ignore_ascii_case("q") {
            break;
        }

        println!("│  {}", card_face(&card, "back"));
        print!("r=learned  l=again  s=skip 15m  f=favorite  u=undo  q=quit > ");
        io::stdout().flush()?;
        input.clear();
        io::stdin().read_line(&mut input)?;

        let mut engine = engine
            .lock()
            .map_err(|_| Error::Session("engine poisoned".into()))?;
        match input.trim().to_lowercase().as_str() {
            "r" => {
                engine.swipe(SwipeDirection::Right);
            }
            "l" => {
                engine.swipe(SwipeDirection::Left);
                println!("  (coming back in ~2 minutes)");
            }
            "s" => {
                engine.skip(SkipDuration::FifteenMinutes);
                println!("  (skipped for 15 minutes)");
            }
            "f" => {
                let favorited = engine.toggle_favorite(card.id);
                println!("  {}", if favorited { "★ favorited" } else { "☆ unfavorited" });
            }
            "u" => {
                if !engine.undo() {
                    println!("  (nothing to undo)");
                }
            }
            "q" => break,
            _ => {
                engine.swipe(SwipeDirection::Right);
            }
        }
        println!();
    }

    Ok(())
}

fn run_autoplay(engine: Arc<Mutex<CliEngine>>, config: &Config) {
    use std::sync::mpsc;

    println!("Autoplay: cards flip and swipe automatically. Ctrl-C to abort.\n");

    let (tx, rx) = mpsc::channel();
    let mut driver = AutoplayDriver::start(
        engine.clone(),
        std::time::Duration::from_millis(config.autoplay.reveal_ms),
        std::time::Duration::from_millis(config.autoplay.flip_ms),
        move |event| {
            let _ = tx.send(event);
        },
    );

    while let Ok(event) = rx.recv() {
        match event {
            AutoplayEvent::Reveal(_) => {
                if let Ok(engine) = engine.lock() {
                    if let Some(card) = engine.current() {
                        println!("┌ {}", card_face(card, "front"));
                    }
                }
            }
            AutoplayEvent::Flip(_) => {
                if let Ok(engine) = engine.lock() {
                    if let Some(card) = engine.current() {
                        println!("└ {}", card_face(card, "back"));
                    }
                }
            }
            AutoplayEvent::Swiped(_) => println!(),
            AutoplayEvent::Finished => break,
        }
    }

    driver.stop();
}

fn finish_session(
    data_dir: &Path,
    engine: &CliEngine,
    deck_id: &str,
    chapter_id: Option<String>,
    started_at: chrono::DateTime<Utc>,
) -> Result<()> {
    let stats = engine.session_stats();

    println!("\n─────────────────────────────────────────");
    println!("  Learned:  {}", stats.learned_count);
    println!("  Learning: {}", stats.learning_count);
    println!("  Swipes:   {}", stats.total_swipes);

    let record = SessionRecord {
        id: uuid::Uuid::new_v4(),
        deck_id: deck_id.to_string(),
        chapter_id,
        started_at,
        finished_at: Utc::now(),
        learned_count: stats.learned_count,
        learning_count: stats.learning_count,
        total_swipes: stats.total_swipes,
    };
    let mut log = JsonlLog::new(data_dir.join("sessions.jsonl"));
    log.append(&record)?;

    println!("\n✓ Session logged!");
    Ok(())
}

fn cmd_seed(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let mut store = JsonDeckStore::open(data_dir)?;

    if store.get_deck(SAMPLE_DECK_ID).is_some() {
        println!("Sample deck '{}' already exists.", SAMPLE_DECK_ID);
        return Ok(());
    }

    let deck = build_sample_deck();
    let count = deck.cards.len();
    store.put_deck(deck)?;
    println!("✓ Created sample deck '{}' with {} cards", SAMPLE_DECK_ID, count);
    Ok(())
}

fn cmd_stats(data_dir: &Path, deck: Option<String>) -> Result<()> {
    let store = JsonDeckStore::open(data_dir)?;
    let deck_id = deck.unwrap_or_else(|| SAMPLE_DECK_ID.to_string());

    if store.get_deck(&deck_id).is_none() {
        return Err(Error::Session(format!("Deck '{}' not found.", deck_id)));
    }

    let learned = store.count_by_status(&deck_id, None, ReviewStatus::Learned)?;
    let learning = store.count_by_status(&deck_id, None, ReviewStatus::Learning)?;
    let fresh = store.count_by_status(&deck_id, None, ReviewStatus::New)?;

    println!("Deck '{}'", deck_id);
    println!("  new:      {}", fresh);
    println!("  learning: {}", learning);
    println!("  learned:  {}", learned);
    Ok(())
}

fn cmd_export(data_dir: &Path, cleanup: bool) -> Result<()> {
    let log_path = data_dir.join("sessions.jsonl");
    let csv_path = data_dir.join("sessions.csv");

    if !log_path.exists() {
        println!("No session log found - nothing to export.");
        return Ok(());
    }

    let count = flip_core::export::log_to_csv_and_archive(&log_path, &csv_path)?;
    println!("✓ Exported {} sessions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = flip_core::export::cleanup_processed_logs(data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed session logs", cleaned);
        }
    }

    Ok(())
}

/// Pull a face out of the opaque payload for terminal display
fn card_face(card: &ReviewCard, face: &str) -> String {
    card.payload
        .get(face)
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| card.payload.to_string())
}
