//! Lingo Coach terminal client.
//!
//! Opens (or starts) today's journal for a learner and runs an interactive
//! coaching session on stdin. Plain lines are sent as turns; lines starting
//! with `/` are commands, see `/help`.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

use lingo_coach::adapters::ai::{HttpProvider, MockAIProvider, RetryingAIProvider};
use lingo_coach::adapters::jobs::{ProfileRefreshWorker, ProfileWorkerConfig};
use lingo_coach::adapters::memory::{
    InMemoryContextProfileRepository, InMemoryErrorLedger, InMemoryJournalRepository,
};
use lingo_coach::adapters::postgres::{
    self, PostgresContextProfileRepository, PostgresErrorLedger, PostgresJournalRepository,
};
use lingo_coach::adapters::storage::{InMemoryImageStorage, LocalImageStorage};
use lingo_coach::application::{
    AttachImageCommand, AttachImageHandler, CreateJournalCommand, CreateJournalHandler,
    EvaluateJournalCommand, EvaluateJournalHandler, GetJournalByDateQuery, GetJournalHandler,
    GetJournalQuery, GetProgressSummaryHandler, GetProgressSummaryQuery,
    RefreshContextProfileHandler, SendTurnCommand, SendTurnHandler, TransitionPhaseCommand,
    TransitionPhaseHandler, UpdateJournalDraftCommand, UpdateJournalDraftHandler,
};
use lingo_coach::config::AppConfig;
use lingo_coach::domain::foundation::{JournalId, UserId};
use lingo_coach::domain::journal::{JournalView, MessageType, Sender, WritingPhase};
use lingo_coach::ports::{
    AIProvider, ContextProfileRepository, ErrorLedgerRepository, ImageStorage, JournalRepository,
};
use lingo_coach::telemetry;

const HELP: &str = "\
Commands:
  /show                  print the journal
  /phase <name>          move to scaffolding, writing, evaluation or completed
  /draft <text>          replace the draft
  /image <path> [caption] attach an image
  /feedback              evaluate the draft and record corrections
  /progress              show your error totals
  /quit                  leave
Anything else is sent to the coach.";

struct Repositories {
    journals: Arc<dyn JournalRepository>,
    ledger: Arc<dyn ErrorLedgerRepository>,
    profiles: Arc<dyn ContextProfileRepository>,
}

struct Session {
    user_id: UserId,
    journal_id: JournalId,
    get: GetJournalHandler,
    send: SendTurnHandler,
    transition: TransitionPhaseHandler,
    draft: UpdateJournalDraftHandler,
    attach: AttachImageHandler,
    evaluate: EvaluateJournalHandler,
    progress: GetProgressSummaryHandler,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config.logging)?;

    let repos = repositories(&config).await?;
    let storage: Arc<dyn ImageStorage> = match &config.storage.image_dir {
        Some(dir) => Arc::new(LocalImageStorage::new(dir.clone())),
        None => Arc::new(InMemoryImageStorage::new()),
    };
    let ai = ai_provider(&config)?;

    // Background profile refresh
    let runner = Arc::new(RefreshContextProfileHandler::new(
        repos.journals.clone(),
        repos.profiles.clone(),
        ai.clone(),
    ));
    let (queue, worker) =
        ProfileRefreshWorker::new(runner, ProfileWorkerConfig::from(&config.agent));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    let user_id = UserId::new(std::env::args().nth(1).unwrap_or_else(|| "local".to_string()))?;
    let today = Utc::now().date_naive();
    let view = open_journal(repos.journals.clone(), &user_id, today).await?;
    info!(journal_id = %view.journal.id(), user_id = %user_id, "Session opened");

    let session = Session {
        user_id,
        journal_id: *view.journal.id(),
        get: GetJournalHandler::new(repos.journals.clone()),
        send: SendTurnHandler::new(
            repos.journals.clone(),
            repos.profiles.clone(),
            storage.clone(),
            ai.clone(),
            config.session.clone(),
        ),
        transition: TransitionPhaseHandler::new(repos.journals.clone(), Arc::new(queue)),
        draft: UpdateJournalDraftHandler::new(repos.journals.clone()),
        attach: AttachImageHandler::new(repos.journals.clone(), storage, ai.clone()),
        evaluate: EvaluateJournalHandler::new(repos.journals.clone(), repos.ledger.clone(), ai),
        progress: GetProgressSummaryHandler::new(repos.ledger.clone()),
    };

    print_view(&view);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if let Err(e) = session.dispatch(line).await {
            println!("! {}", e);
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = worker_handle.await {
        warn!(error = %e, "Profile worker ended abnormally");
    }
    Ok(())
}

impl Session {
    async fn dispatch(&self, line: &str) -> Result<(), Box<dyn Error>> {
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        match command {
            "/help" => println!("{}", HELP),
            "/show" => {
                let view = self
                    .get
                    .handle(GetJournalQuery {
                        user_id: self.user_id.clone(),
                        journal_id: self.journal_id,
                    })
                    .await?;
                print_view(&view);
            }
            "/phase" => {
                let target: WritingPhase = rest.parse()?;
                let result = self
                    .transition
                    .handle(TransitionPhaseCommand {
                        user_id: self.user_id.clone(),
                        journal_id: self.journal_id,
                        target,
                    })
                    .await?;
                println!("Phase: {}", result.view.journal.writing_phase());
                if result.transition.content_seeded_from_outline {
                    println!("Your outline was copied into the draft.");
                }
            }
            "/draft" => {
                self.draft
                    .handle(UpdateJournalDraftCommand {
                        user_id: self.user_id.clone(),
                        journal_id: self.journal_id,
                        content: rest.to_string(),
                        outline: None,
                    })
                    .await?;
                println!("Draft saved.");
            }
            "/image" => {
                let (path, caption) = match rest.split_once(' ') {
                    Some((p, c)) => (p, Some(c.trim().to_string())),
                    None => (rest, None),
                };
                let bytes = tokio::fs::read(path).await?;
                let filename = Path::new(path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("upload")
                    .to_string();
                let result = self
                    .attach
                    .handle(AttachImageCommand {
                        user_id: self.user_id.clone(),
                        journal_id: self.journal_id,
                        filename,
                        bytes,
                        caption,
                    })
                    .await?;
                println!(
                    "Image {} attached: {}",
                    result.image.id,
                    result.image.ai_description.as_deref().unwrap_or("")
                );
            }
            "/feedback" => {
                let result = self
                    .evaluate
                    .handle(EvaluateJournalCommand {
                        user_id: self.user_id.clone(),
                        journal_id: self.journal_id,
                        text: None,
                        record_summary: true,
                    })
                    .await?;
                println!("{}", result.feedback.high_level_summary);
                for item in &result.feedback.feedback_items {
                    println!(
                        "- [{}] \"{}\" -> \"{}\": {}",
                        item.category, item.incorrect_phrase, item.suggestion, item.explanation
                    );
                }
            }
            "/progress" => {
                let summary = self
                    .progress
                    .handle(GetProgressSummaryQuery {
                        user_id: self.user_id.clone(),
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            _ if command.starts_with('/') => println!("Unknown command, try /help"),
            _ => {
                let result = self
                    .send
                    .handle(SendTurnCommand::new(
                        self.user_id.clone(),
                        self.journal_id,
                        line,
                    ))
                    .await?;
                if let Some(correction) = result.correction.filter(|c| c.is_correction()) {
                    println!("~ {}", correction.to_message_text());
                }
                if let Some(reply) = result.view.last_message() {
                    println!("Lingo: {}", reply.text);
                }
            }
        }
        Ok(())
    }
}

async fn repositories(config: &AppConfig) -> Result<Repositories, Box<dyn Error>> {
    if config.database.is_configured() {
        let pool = postgres::connect(&config.database).await?;
        return Ok(Repositories {
            journals: Arc::new(PostgresJournalRepository::new(pool.clone())),
            ledger: Arc::new(PostgresErrorLedger::new(pool.clone())),
            profiles: Arc::new(PostgresContextProfileRepository::new(pool)),
        });
    }
    info!("No database configured, using in-memory repositories");
    Ok(Repositories {
        journals: Arc::new(InMemoryJournalRepository::new()),
        ledger: Arc::new(InMemoryErrorLedger::new()),
        profiles: Arc::new(InMemoryContextProfileRepository::new()),
    })
}

fn ai_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, Box<dyn Error>> {
    if config.ai.has_endpoint() {
        let provider = HttpProvider::new(config.ai.provider_config())?;
        return Ok(Arc::new(RetryingAIProvider::new(
            provider,
            config.ai.retry_policy(),
        )));
    }
    warn!("No AI endpoint configured, the coach will give canned replies");
    Ok(Arc::new(
        MockAIProvider::new()
            .on_prompt_containing("grammar and spelling checker", json!({"status": "no_errors"}))
            .on_prompt_containing(
                "Socratic questions",
                json!({"action": "ASK_QUESTION", "payload": {"question": "That sounds interesting. What happened next?"}}),
            ),
    ))
}

async fn open_journal(
    journals: Arc<dyn JournalRepository>,
    user_id: &UserId,
    date: chrono::NaiveDate,
) -> Result<JournalView, Box<dyn Error>> {
    let existing = GetJournalHandler::new(journals.clone())
        .handle_by_date(GetJournalByDateQuery {
            user_id: user_id.clone(),
            date,
        })
        .await?;
    match existing {
        Some(view) => Ok(view),
        None => Ok(CreateJournalHandler::new(journals)
            .handle(CreateJournalCommand {
                user_id: user_id.clone(),
                date,
            })
            .await?),
    }
}

fn print_view(view: &JournalView) {
    let journal = &view.journal;
    println!("== Journal {} ({}) ==", journal.date(), journal.writing_phase());
    if !journal.outline_content().is_empty() {
        println!("Outline:\n{}", journal.outline_content());
    }
    if !journal.content().is_empty() {
        println!("Draft:\n{}", journal.content());
    }
    for message in &view.messages {
        let who = match (message.sender, message.message_type) {
            (_, MessageType::Feedback) => "~",
            (Sender::User, _) => "You",
            (Sender::Ai, _) => "Lingo",
        };
        println!("{}: {}", who, message.text);
    }
}
