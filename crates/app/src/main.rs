use std::sync::Arc;

use services::{AppServices, Clock, SkipReason, SyncOutcome};
use storage::sqlite::sqlite_url;
use vocab_core::model::{ProgressRecord, VocabularyDataset, Word};

mod cli;
mod config;
mod logging;

use cli::{Args, Command, Parsed, print_usage};
use config::AppConfig;

fn print_progress(progress: &ProgressRecord) {
    println!("Level:          {}", progress.level.display_name());
    println!("                {}", progress.level.description());
    println!("Points:         {}", progress.total_points);
    println!("Streak:         {} day(s)", progress.streak);
    match progress.last_study_date {
        Some(date) => println!("Last studied:   {date}"),
        None => println!("Last studied:   never"),
    }
    println!("Words mastered: {}", progress.mastered_words.len());
    let badges: Vec<&str> = progress.badges.iter().map(|id| id.badge().name).collect();
    if badges.is_empty() {
        println!("Badges:         none yet");
    } else {
        println!("Badges:         {}", badges.join(", "));
    }
}

fn print_word(word: &Word) {
    let meaning = word
        .meaning
        .as_deref()
        .map(|m| format!(" [{m}]"))
        .unwrap_or_default();
    println!(
        "{:>6}  {:<18} {:<3} {}{meaning}",
        word.id.value(),
        word.word,
        word.level.as_str(),
        word.definition
    );
}

fn report_sync(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Skipped(SkipReason::RemoteDisabled) => {
            println!("Remote sync is not configured (set VOCAB_REMOTE_URL).");
        }
        SyncOutcome::Skipped(SkipReason::SignedOut) => {
            println!("Not signed in (set VOCAB_USER_ID).");
        }
        SyncOutcome::Uploaded(progress) => {
            println!("Uploaded local progress.");
            print_progress(progress);
        }
        SyncOutcome::Merged(progress) => {
            println!("Merged progress with remote.");
            print_progress(progress);
        }
        SyncOutcome::Failed => println!("Sync failed; local progress kept. See logs."),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    let mut config = AppConfig::from_env()?;
    logging::init_tracing(&config.log_filter);
    if let Some(db_url) = args.db_url {
        config.db_url = db_url;
    }
    if let Some(path) = args.progress_path {
        config.progress_path = path;
    }

    let db_url = sqlite_url(&config.db_url)?;
    let services = AppServices::new_sqlite(
        &db_url,
        &config.progress_path,
        Clock::default_clock(),
        config.sync.clone(),
        Arc::new(config.session()),
    )
    .await?;
    tracing::debug!(db = %db_url, progress = %config.progress_path.display(), "services ready");

    // A restored session syncs once before the command runs.
    let startup_sync = services
        .handle_auth_event(&config.session().initial_event())
        .await;
    if let Some(outcome) = &startup_sync {
        tracing::debug!(?outcome, "startup sync finished");
    }

    let progress = services.progress();
    let local_db = services.local_db();

    match args.command {
        Command::Show => print_progress(&progress.get_progress()),
        Command::Stats => {
            let summary = progress.stats();
            println!("Level:          {}", summary.level);
            println!("Points:         {}", summary.total_points);
            println!("Streak:         {}", summary.streak);
            println!("Words learned:  {}", summary.stats.words_learned);
            println!("Quizzes taken:  {}", summary.stats.quizzes_taken);
            println!(
                "Answers:        {}/{} correct ({}%)",
                summary.stats.correct_answers, summary.stats.total_answers, summary.accuracy
            );
            let db = local_db.stats().await;
            println!("Vocabulary:     {} words in database", db.total_words);
        }
        Command::Badges => {
            for status in progress.all_badges() {
                let mark = if status.earned { "x" } else { " " };
                println!(
                    "[{mark}] {} {:<16} {}",
                    status.badge.icon, status.badge.name, status.badge.description
                );
            }
        }
        Command::Master(word_id) => {
            if let Some(word) = local_db.word_by_id(word_id).await {
                println!("Mastered \"{}\"", word.word);
            }
            print_progress(&services.master_word(word_id).await?);
        }
        Command::Quiz { correct, total } => {
            let outcome = services.finish_quiz(correct, total).await?;
            println!("Quiz recorded: {correct}/{total}, +{} points", outcome.points);
            print_progress(&outcome.progress);
        }
        Command::Streak => print_progress(&services.study_today().await?),
        Command::LevelUp(level) => {
            match level.or_else(|| progress.get_progress().level.next()) {
                Some(level) => print_progress(&services.level_up(level).await?),
                None => println!("Already at the highest level."),
            }
        }
        Command::AddPoints(points) => print_progress(&services.add_points(points).await?),
        Command::Reset => {
            services.reset_progress().await?;
            println!("Progress reset.");
        }
        Command::Import(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let dataset: VocabularyDataset = serde_json::from_str(&raw)?;
            let words = dataset.into_words();
            let inserted = local_db.import_words(&words).await;
            println!(
                "Imported {inserted} of {} words from {}",
                words.len(),
                path.display()
            );
        }
        Command::Words { level, category } => {
            let words = match (category, level) {
                (Some(category), level) => local_db
                    .words_by_category(&category)
                    .await
                    .into_iter()
                    .filter(|word| level.is_none_or(|wanted| word.level == wanted))
                    .collect(),
                (None, Some(level)) => local_db.words_by_level(level).await,
                (None, None) => local_db.all_words().await,
            };
            if words.is_empty() && !local_db.has_vocabulary().await {
                println!("No vocabulary yet. Run `vocab import <dataset.json>` first.");
            }
            words.iter().for_each(print_word);
        }
        Command::Search(query) => {
            let words = local_db.search_words(&query).await;
            if words.is_empty() {
                println!("No matches for \"{query}\".");
            }
            words.iter().for_each(print_word);
        }
        Command::Sync => {
            let outcome = match startup_sync {
                Some(outcome) => outcome,
                None => services.sync_now().await,
            };
            report_sync(&outcome);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
