//! gigscout command-line front end.
//!
//! A thin shell over the library: parse arguments, build a session, run one
//! command, render the resulting view model as text.
//!
//! ```text
//! gigscout search --city Austin
//! gigscout search --lat 30.2672 --lon -97.7431
//! gigscout restore
//! gigscout favourite <id>       # restores the last search, then toggles
//! gigscout unfavourite <id>
//! gigscout favourites --filter live
//! gigscout show <id>
//! gigscout forget
//! ```
//!
//! Commands that only touch favourites or the last search work without an API
//! key.

#![allow(clippy::multiple_crate_versions)]

use clap::{Args, Parser, Subcommand};
use gigscout::app::Completion;
use gigscout::storage::{FavouritesStore, JsonFileStore, KeyValueStore, LastSearchStore};
use gigscout::ui::{self, EventCard, EventDetailViewModel, EventListViewModel};
use gigscout::{initialize, observability, Config, Coordinate, EventSession, GigscoutError, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "gigscout", version, about = "Discover live events near you")]
struct Cli {
    /// Config file (default: <config dir>/gigscout/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for events by city or coordinate
    Search(SearchArgs),
    /// Re-run the last successful search
    Restore,
    /// Toggle an event from the last search as a favourite
    Favourite { id: String },
    /// Remove a favourite, whether or not it is in the last search
    Unfavourite { id: String },
    /// List favourites
    Favourites {
        /// Only favourites whose name matches every word
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show details of a favourite or an event from the last search
    Show { id: String },
    /// Forget the last search
    Forget,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = observability::init_tracing(&config);

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(&path)?,
        None => return Config::discover(),
    };
    Ok(config.with_env_overrides())
}

async fn run(command: Command, config: &Config) -> Result<ExitCode> {
    match command {
        Command::Search(args) => {
            let session = initialize(config)?;
            let completion = match (args.city, args.lat, args.lon) {
                (Some(city), _, _) => session.search_city(&city).await,
                (None, Some(lat), Some(lon)) => {
                    session.search_coordinate(Coordinate::new(lat, lon)).await
                }
                _ => {
                    return Err(GigscoutError::Validation(
                        "pass --city, or both --lat and --lon".to_string(),
                    ))
                }
            };
            Ok(finish_search(&session, completion))
        }
        Command::Restore => {
            let session = initialize(config)?;
            let completion = restore(&session).await?;
            Ok(finish_search(&session, completion))
        }
        Command::Favourite { id } => {
            let session = initialize(config)?;
            restore(&session).await?;
            let flag = session.toggle_favourite(&id).ok_or_else(|| {
                GigscoutError::Validation(format!("no event {id:?} in the last search"))
            })?;
            println!("{} {id}", if flag { "Favourited" } else { "Unfavourited" });
            Ok(ExitCode::SUCCESS)
        }
        Command::Unfavourite { id } => {
            let mut favourites = FavouritesStore::load(open_store(config)?);
            if favourites.set_favourite(&id, None, false) {
                println!("Unfavourited {id}");
            } else {
                println!("{id} was not a favourite");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Favourites { filter } => {
            let favourites = FavouritesStore::load(open_store(config)?).all_favourites();
            let query = filter.unwrap_or_default();
            let matching = gigscout::app::filter_by_name(favourites, &query);
            let vm = ui::compute_favourites(&matching, &query);

            println!("Favourites");
            match vm.empty_state {
                Some(empty) => println!("  {}", empty.message),
                None => vm.cards.iter().for_each(print_card),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id } => {
            let favourites = FavouritesStore::load(open_store(config)?).all_favourites();
            let event = match favourites.into_iter().find(|e| e.has_id(&id)) {
                Some(event) => event,
                None => {
                    let session = initialize(config)?;
                    restore(&session).await?;
                    session
                        .events()
                        .into_iter()
                        .find(|e| e.has_id(&id))
                        .ok_or_else(|| GigscoutError::Validation(format!("no event {id:?} found")))?
                }
            };
            print_detail(&ui::compute_event_detail(&event));
            Ok(ExitCode::SUCCESS)
        }
        Command::Forget => {
            LastSearchStore::new(open_store(config)?).clear();
            println!("Last search forgotten");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(JsonFileStore::open(config.state_file())?))
}

async fn restore(session: &EventSession) -> Result<Completion> {
    session.restore().await.ok_or_else(|| {
        GigscoutError::Validation("no saved search; run `gigscout search` first".to_string())
    })
}

fn finish_search(session: &EventSession, completion: Completion) -> ExitCode {
    print_list(&ui::compute_event_list(&session.snapshot()));
    match completion {
        Completion::Failed => ExitCode::FAILURE,
        Completion::Applied | Completion::Stale => ExitCode::SUCCESS,
    }
}

fn print_list(vm: &EventListViewModel) {
    println!("{}", vm.title);
    if let Some(error) = &vm.error {
        eprintln!("  {error}");
    }
    match &vm.empty_state {
        Some(empty) => println!("  {}", empty.message),
        None => vm.cards.iter().for_each(print_card),
    }
}

fn print_card(card: &EventCard) {
    let heart = if card.is_favourite { "♥" } else { " " };
    let name = highlight(&card.name, &card.highlight_ranges);
    let padding = 48usize.saturating_sub(card.name.chars().count());
    println!(
        "{heart} {name}{:padding$}  {:<16}  {}",
        "",
        card.genre.as_deref().unwrap_or("-"),
        card.id.as_deref().unwrap_or("-"),
    );
}

fn print_detail(vm: &EventDetailViewModel) {
    println!("{}", vm.name);
    for row in &vm.info_rows {
        println!("  {}: {}", row.label, row.value);
    }
    if let Some(image) = &vm.image_url {
        println!("  Image: {image}");
    }
    for link in &vm.links {
        println!("  {}: {}", link.label, link.url);
    }
    println!("  [{}]", vm.favourite_label);
}

/// Bolds the matched character ranges when writing to a terminal.
fn highlight(text: &str, ranges: &[(usize, usize)]) -> String {
    if ranges.is_empty() || !std::io::stdout().is_terminal() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + ranges.len() * 8);
    for (i, ch) in text.chars().enumerate() {
        if ranges.iter().any(|&(start, _)| start == i) {
            out.push_str("\u{1b}[1m");
        }
        out.push(ch);
        if ranges.iter().any(|&(_, end)| end == i + 1) {
            out.push_str("\u{1b}[0m");
        }
    }
    out
}
