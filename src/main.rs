use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;

use tracker::config::TrackerConfig;
use tracker::core::mood::MoodFilter;
use tracker::core::ordering::SortKey;
use tracker::dashboard;
use tracker::sync::blob::HttpBlobStore;
use tracker::sync::memory::{MemoryBlobStore, MemoryGateway};
use tracker::sync::rest::RestGateway;
use tracker::sync::{BlobStore, SyncGateway, keyring};
use tracker::tracker::Trackers;

/// Print the tracker dashboard from the configured document store.
#[derive(Parser)]
#[command(name = "tracker", version, about)]
struct Cli {
    /// Ordering for projects and goals: default, priority-high, priority-low, deadline or name
    #[arg(long, value_parser = SortKey::from_str)]
    sort: Option<SortKey>,

    /// Mood entries to show: a level from 1 to 5, or all
    #[arg(long, value_parser = parse_mood, default_value = "all")]
    mood: MoodFilter,

    /// Use the in-memory store instead of the configured gateway
    #[arg(long)]
    offline: bool,

    /// Add the default life-balance categories when there are none
    #[arg(long)]
    seed: bool,

    /// Store the gateway token in the keyring and exit
    #[arg(long, value_name = "TOKEN", conflicts_with = "clear_token")]
    set_token: Option<String>,

    /// Remove the gateway token from the keyring and exit
    #[arg(long)]
    clear_token: bool,
}

impl Cli {
    fn token_command(&self) -> Option<TokenCommand> {
        match (&self.set_token, self.clear_token) {
            (Some(token), _) => Some(TokenCommand::Set(token.clone())),
            (None, true) => Some(TokenCommand::Clear),
            (None, false) => None,
        }
    }
}

enum TokenCommand {
    Set(String),
    Clear,
}

fn parse_mood(value: &str) -> Result<MoodFilter, String> {
    MoodFilter::parse(value).ok_or_else(|| format!("expected 1-5 or all, got {}", value))
}

fn init_logging(debug: bool) {
    // Log to the systemd user journal (`journalctl --user -t tracker -f`).
    // This crate logs at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("tracker") {
                let max = if tracker::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    tracker::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("tracker".to_string()),
        Err(e) => {
            eprintln!("journal logging unavailable: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

async fn manage_token(config: &TrackerConfig, command: TokenCommand) -> Result<(), String> {
    let url = config.gateway_url.trim();
    if url.is_empty() {
        return Err("no gateway_url configured".to_string());
    }
    match command {
        TokenCommand::Set(token) => {
            keyring::store_token(url, token.trim()).await?;
            log::info!("Stored gateway token for {}", url);
        }
        TokenCommand::Clear => {
            keyring::delete_token(url).await?;
            log::info!("Removed gateway token for {}", url);
        }
    }
    Ok(())
}

type Backends = (Arc<dyn SyncGateway>, Arc<dyn BlobStore>);

async fn connect(config: &TrackerConfig, offline: bool) -> Result<Backends, String> {
    if offline || config.is_offline() {
        log::info!("Running against the in-memory gateway");
        return Ok((Arc::new(MemoryGateway::new()), Arc::new(MemoryBlobStore::new())));
    }

    let url = config.gateway_url.trim();
    let token = match keyring::load_token(url).await {
        Ok(token) => token,
        Err(e) => {
            log::warn!("Keyring unavailable, connecting without a token: {}", e);
            None
        }
    };
    let gateway = RestGateway::new(url, token.clone(), config.poll_interval())
        .map_err(|e| e.to_string())?;
    let blobs =
        HttpBlobStore::new(&config.blob_base_url(), token).map_err(|e| e.to_string())?;
    Ok((Arc::new(gateway), Arc::new(blobs)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let config = TrackerConfig::load_or_default(&TrackerConfig::default_path());
    init_logging(config.debug_logging);

    if let Some(command) = args.token_command() {
        manage_token(&config, command).await?;
        return Ok(());
    }

    let (gateway, blobs) = connect(&config, args.offline).await?;
    let trackers = Trackers::new(gateway, blobs);
    let attached = trackers.attach_all().await;
    if attached == 0 {
        return Err("could not attach to any collection".into());
    }

    if args.seed {
        let added = trackers.balance.seed_defaults().await;
        log::info!("Seeded {} life-balance categories", added);
    }

    let sort = args.sort.unwrap_or(config.default_sort);
    println!("{}", dashboard::render_projects(&trackers.projects.sorted_projects(sort)));
    println!("{}", dashboard::render_goals(&trackers.goals.sorted_goals(sort)));
    println!("{}", dashboard::render_mood(&trackers.mood.entries(args.mood)));
    println!("{}", dashboard::render_balance(&trackers.balance.categories()));
    println!("{}", dashboard::render_todos(&trackers.todos.groups()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker::core::mood::MoodLevel;

    #[test]
    fn flags_and_values() {
        let args = ["tracker", "--sort", "priority-high", "--mood", "4", "--offline"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.sort, Some(SortKey::PriorityHigh));
        assert_eq!(cli.mood, MoodFilter::Only(MoodLevel::Good));
        assert!(cli.offline);
        assert!(!cli.seed);
        assert!(cli.token_command().is_none());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["tracker"]).unwrap();
        assert_eq!(cli.sort, None);
        assert_eq!(cli.mood, MoodFilter::All);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["tracker", "--sort", "colour"]).is_err());
        assert!(Cli::try_parse_from(["tracker", "--mood", "9"]).is_err());
        assert!(Cli::try_parse_from(["tracker", "--set-token", "t", "--clear-token"]).is_err());
    }

    #[test]
    fn token_commands() {
        let cli = Cli::try_parse_from(["tracker", "--set-token", "abc"]).unwrap();
        assert!(matches!(cli.token_command(), Some(TokenCommand::Set(t)) if t == "abc"));
        let cli = Cli::try_parse_from(["tracker", "--clear-token"]).unwrap();
        assert!(matches!(cli.token_command(), Some(TokenCommand::Clear)));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
