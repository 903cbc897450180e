use std::fmt;
use std::path::PathBuf;

use services::{AppServices, Clock, ContentGenerator, DEFAULT_PRACTICE_COUNT, StudyStore};
use study_core::model::{AppSettingsDraft, Catalogue, ItemId};
use study_core::plan::{DateRange, PlanDay};
use study_core::progress::{ExpeditionStage, RankBand, aggregate_by_category};
use study_core::revision::RevisionVault;

mod logging;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidItemId { raw: String },
    InvalidCount { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidItemId { raw } => write!(f, "invalid item id: {raw:?}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  study plan                        [--db <sqlite_url>]");
    eprintln!("  study progress                    [--db <sqlite_url>]");
    eprintln!("  study toggle <id>                 [--db <sqlite_url>]");
    eprintln!("  study range <start> <end>         [--db <sqlite_url>]   # YYYY-MM-DD");
    eprintln!("  study generate <id> [--force]     [--db <sqlite_url>]");
    eprintln!("  study more-questions <id> [--count <n>]");
    eprintln!("  study formula <name>");
    eprintln!("  study vault                       [--db <sqlite_url>]");
    eprintln!("  study export <path> | import <path>");
    eprintln!("  study reset --yes                 [--db <sqlite_url>]");
    eprintln!("  study ai-settings [--key <k>] [--model <m>] [--base-url <u>] [--prompt <p>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:study.sqlite3");
    eprintln!("  --count {DEFAULT_PRACTICE_COUNT}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_LOG, STUDY_AI_API_KEY, STUDY_AI_BASE_URL, STUDY_AI_MODEL");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Plan,
    Progress,
    Toggle(ItemId),
    Range { start: String, end: String },
    Generate { id: ItemId, force: bool },
    MoreQuestions { id: ItemId, count: usize },
    Formula(String),
    Vault,
    Export(PathBuf),
    Import(PathBuf),
    Reset { confirmed: bool },
    AiSettings(SettingsFlags),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SettingsFlags {
    api_key: Option<String>,
    api_model: Option<String>,
    api_base_url: Option<String>,
    ai_system_prompt: Option<String>,
}

impl SettingsFlags {
    fn into_draft(self) -> AppSettingsDraft {
        AppSettingsDraft {
            api_key: self.api_key,
            api_model: self.api_model,
            api_base_url: self.api_base_url,
            ai_system_prompt: self.ai_system_prompt,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let Some(name) = args.next() else {
            return Ok(None);
        };
        if matches!(name.as_str(), "--help" | "-h") {
            return Ok(None);
        }

        let mut db_url = std::env::var("STUDY_DB_URL")
            .ok()
            .unwrap_or_else(|| "sqlite:study.sqlite3".into());
        let mut positional = Vec::new();
        let mut count = DEFAULT_PRACTICE_COUNT;
        let mut force = false;
        let mut confirmed = false;
        let mut settings = SettingsFlags::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--count" => {
                    let value = require_value(&mut args, "--count")?;
                    count = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidCount { raw: value })?;
                }
                "--force" => force = true,
                "--yes" | "-y" => confirmed = true,
                "--key" => settings.api_key = Some(require_value(&mut args, "--key")?),
                "--model" => settings.api_model = Some(require_value(&mut args, "--model")?),
                "--base-url" => {
                    settings.api_base_url = Some(require_value(&mut args, "--base-url")?);
                }
                "--prompt" => {
                    settings.ai_system_prompt = Some(require_value(&mut args, "--prompt")?);
                }
                "--help" | "-h" => return Ok(None),
                _ => {
                    if arg.starts_with("--") {
                        return Err(ArgsError::UnknownArg(arg));
                    }
                    positional.push(arg);
                }
            }
        }

        let mut positional = positional.into_iter();
        let mut take = |name: &'static str| {
            positional
                .next()
                .ok_or(ArgsError::MissingArgument { name })
        };
        let item_id = |raw: String| {
            raw.parse::<ItemId>()
                .map_err(|_| ArgsError::InvalidItemId { raw })
        };

        let command = match name.as_str() {
            "plan" => Command::Plan,
            "progress" => Command::Progress,
            "toggle" => Command::Toggle(item_id(take("id")?)?),
            "range" => Command::Range {
                start: take("start")?,
                end: take("end")?,
            },
            "generate" => Command::Generate {
                id: item_id(take("id")?)?,
                force,
            },
            "more-questions" => Command::MoreQuestions {
                id: item_id(take("id")?)?,
                count,
            },
            "formula" => Command::Formula(take("name")?),
            "vault" => Command::Vault,
            "export" => Command::Export(PathBuf::from(take("path")?)),
            "import" => Command::Import(PathBuf::from(take("path")?)),
            "reset" => Command::Reset { confirmed },
            "ai-settings" => Command::AiSettings(settings),
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            db_url: normalize_sqlite_url(db_url),
            command,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

//
// ─── OUTPUT ────────────────────────────────────────────────────────────────────
//

/// Why a plan came out empty: an inverted range or nothing to schedule.
fn empty_plan_message(range: &DateRange) -> &'static str {
    if range.is_valid() {
        "No plan: there are no study items to schedule."
    } else {
        "No plan: the end date is before the start date."
    }
}

fn print_plan(store: &StudyStore) {
    let plan = store.plan();
    if plan.is_empty() {
        println!("{}", empty_plan_message(&store.settings().plan_range()));
        return;
    }

    let catalogue = store.catalogue();
    let today = store.today();
    for day in &plan {
        let progress = store.day_progress(day);
        let marker = if day.date == today { " <- today" } else { "" };
        println!(
            "Day {:>2}  {}  {}  {}/{} ({}%){marker}",
            day.day,
            day.display_date(),
            day.label,
            progress.completed,
            progress.total,
            progress.percent
        );
        print_day_items(&catalogue, day);
    }
}

fn print_day_items(catalogue: &Catalogue, day: &PlanDay) {
    for id in &day.item_ids {
        let Some((category, item)) = catalogue.find(id) else {
            continue;
        };
        let check = if item.is_completed() { 'x' } else { ' ' };
        println!(
            "    [{check}] {:<6} {}  ({})",
            id.as_str(),
            item.title(),
            category.short_label()
        );
    }
}

fn print_progress(store: &StudyStore) {
    let overall = store.overall_progress();
    let stage = ExpeditionStage::from_percent(overall.percent);
    let rank = RankBand::estimate(&overall);
    println!(
        "Overall: {}/{} ({}%)  {}  est. rank {}",
        overall.completed,
        overall.total,
        overall.percent,
        stage.label(),
        rank.label()
    );

    let catalogue = store.catalogue();
    for (category, (_, progress)) in catalogue
        .categories()
        .iter()
        .zip(aggregate_by_category(&catalogue))
    {
        println!(
            "  {:<45} {:>2}/{:<2} {:>3}%",
            category.label(),
            progress.completed,
            progress.total,
            progress.percent
        );
    }
}

fn print_vault(catalogue: &Catalogue) {
    let vault = RevisionVault::collect(catalogue);
    if vault.is_empty() {
        println!("Vault is open, but no study material was generated yet.");
        return;
    }

    println!("== Revision points ==");
    for point in vault.revision_points() {
        println!("  * {point}");
    }
    println!("== Formulas ==");
    for formula in vault.formulas() {
        println!("  {}: {}", formula.name, formula.original_script);
    }
    println!("== Tips ==");
    for tip in vault.tips() {
        println!("  - {tip}");
    }
    println!("== Notes ==");
    for (title, notes) in vault.notes() {
        println!("# {title}\n{notes}\n");
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(parsed) = parsed else {
        print_usage();
        return Ok(());
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    let store = services.store();

    match parsed.command {
        Command::Plan => print_plan(&store),
        Command::Progress => print_progress(&store),
        Command::Toggle(id) => {
            let catalogue = store.toggle(&id).await?;
            match catalogue.item(&id) {
                Some(item) if item.is_completed() => println!("{id} marked done"),
                Some(_) => println!("{id} marked not done"),
                None => println!("{id}: no such study item"),
            }
        }
        Command::Range { start, end } => {
            let settings = store.set_plan_range_iso(&start, &end).await?;
            println!(
                "Plan range set to {} .. {}",
                settings.plan_start_date, settings.plan_end_date
            );
            print_plan(&store);
        }
        Command::Generate { id, force } => {
            let content = store
                .generate_content(&id, services.content().as_ref(), force)
                .await?;
            println!("{}\n", content.notes);
            for point in &content.last_minute_notes {
                println!("  * {point}");
            }
            println!(
                "\nWatch: https://www.youtube.com/results?search_query={}",
                content.youtube_query.replace(' ', "+")
            );
        }
        Command::MoreQuestions { id, count } => {
            let questions = store
                .generate_more_questions(&id, count, services.content().as_ref())
                .await?;
            for (n, question) in questions.iter().enumerate() {
                println!(
                    "{}. {}\n   answer: {}",
                    n + 1,
                    question.question,
                    question.answer
                );
            }
        }
        Command::Formula(name) => {
            let formula = services.content().lookup_formula(&name).await?;
            println!(
                "{}\n  {}\n  {}",
                formula.name,
                formula.clean_latex(),
                formula.original_script
            );
            println!("  {}", formula.explanation);
            for definition in &formula.variable_definitions {
                println!("    {definition}");
            }
        }
        Command::Vault => print_vault(&store.vault()?),
        Command::Export(path) => {
            std::fs::write(&path, store.export_snapshot()?)?;
            println!("Exported progress to {}", path.display());
        }
        Command::Import(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let catalogue = store.import_snapshot(&raw).await?;
            println!("Imported {} study items from {}", catalogue.len(), path.display());
        }
        Command::Reset { confirmed: false } => {
            eprintln!("reset clears all progress and notes; re-run with --yes to confirm");
        }
        Command::Reset { confirmed: true } => {
            store.reset().await?;
            println!("Progress cleared.");
        }
        Command::AiSettings(flags) => {
            let settings = services.app_settings().save(flags.into_draft()).await?;
            println!(
                "AI settings saved (key: {}, model: {}, base url: {})",
                if settings.has_api_key() { "set" } else { "unset" },
                settings.api_model().unwrap_or("default"),
                settings.api_base_url().unwrap_or("default")
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _logger = match logging::init() {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    };

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        log::error!("event=command_failed error={err}");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn no_args_or_help_prints_usage() {
        assert!(parse(&[]).unwrap().is_none());
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn parses_toggle_with_db() {
        let args = parse(&["toggle", "ps-1", "--db", "sqlite::memory:"])
            .unwrap()
            .unwrap();
        assert_eq!(args.command, Command::Toggle(ItemId::new("ps-1")));
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn parses_more_questions_count() {
        let args = parse(&["more-questions", "la-2", "--count", "5", "--db", "sqlite::memory:"])
            .unwrap()
            .unwrap();
        assert_eq!(
            args.command,
            Command::MoreQuestions {
                id: ItemId::new("la-2"),
                count: 5
            }
        );
        assert!(matches!(
            parse(&["more-questions", "la-2", "--count", "0"]),
            Err(ArgsError::InvalidCount { .. })
        ));
    }

    #[test]
    fn reports_missing_and_extra_arguments() {
        assert!(matches!(
            parse(&["range", "2026-01-01"]),
            Err(ArgsError::MissingArgument { name: "end" })
        ));
        assert!(matches!(
            parse(&["plan", "extra"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["fly"]),
            Err(ArgsError::UnknownCommand(_))
        ));
    }

    #[test]
    fn reset_requires_confirmation_flag() {
        let args = parse(&["reset", "--db", "sqlite::memory:"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Reset { confirmed: false });
        let args = parse(&["reset", "--yes", "--db", "sqlite::memory:"])
            .unwrap()
            .unwrap();
        assert_eq!(args.command, Command::Reset { confirmed: true });
    }

    #[test]
    fn empty_plan_message_distinguishes_range_from_catalogue() {
        let start = study_core::time::parse_iso_date("2026-01-10").unwrap();
        let end = study_core::time::parse_iso_date("2026-01-20").unwrap();
        assert_eq!(
            empty_plan_message(&DateRange::new(start, end)),
            "No plan: there are no study items to schedule."
        );
        assert_eq!(
            empty_plan_message(&DateRange::new(end, start)),
            "No plan: the end date is before the start date."
        );
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/study.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/study.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite:file:mem?mode=memory&cache=shared".into()),
            "sqlite:file:mem?mode=memory&cache=shared"
        );
    }
}
