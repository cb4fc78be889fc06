use std::io::{self, BufRead};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use feed_core::{update, AppState, FeedViewModel, ListingSource, ListingState, Msg, ResolvedFeed};
use feed_engine::{FixtureFetcher, PageFetcher, PostSummary, TimedFetcher};
use feed_logging::{feed_debug, feed_info, feed_warn};

use super::commands::{parse_args, parse_command, Command, Invocation, HELP, USAGE};
use super::config::{load_catalog, load_config, AppConfig};
use super::effects::{outcome_of, Completion, EffectRunner};
use super::store::ListingStore;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const DEFAULT_VIEWPORT_HEIGHT: u32 = 900;

pub fn run_app() -> Result<()> {
    let config_path = match parse_args(std::env::args().skip(1))? {
        Invocation::Help => {
            println!("{USAGE}\n\n{HELP}");
            return Ok(());
        }
        Invocation::Version => {
            println!("feed_app {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Invocation::Run { config } => config,
    };

    let config = load_config(&config_path)?;
    feed_logging::initialize(config.log_destination(), config.level_filter());
    feed_info!("Starting feed_app (config {:?})", config_path);

    let catalog = config
        .fixture
        .as_deref()
        .map(load_catalog)
        .unwrap_or_default();
    let settings = config.fetch_settings();
    let fetcher: Arc<dyn PageFetcher> = Arc::new(TimedFetcher::new(
        Arc::new(FixtureFetcher::new(catalog, settings.page_size)),
        settings.request_timeout,
    ));
    let mut session = Session::new(&config, fetcher)?;

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("{HELP}");
    let mut input_open = true;
    loop {
        while input_open {
            match line_rx.try_recv() {
                Ok(line) => {
                    if !session.handle_line(&line) {
                        feed_info!("Quit requested");
                        return Ok(());
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    feed_debug!("stdin closed; finishing {} job(s)", session.pending());
                    input_open = false;
                }
            }
        }
        session.pump();
        if !input_open && session.pending() == 0 {
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Host loop state: the core state plus everything the core leaves to the host.
struct Session {
    state: AppState,
    runner: EffectRunner,
    store: ListingStore,
    viewport_height: u32,
}

impl Session {
    fn new(config: &AppConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let runner = EffectRunner::new(fetcher).context("Failed to start the fetch engine")?;
        let state = AppState::new(config.coordinator()).with_base_params(config.base_params());
        Ok(Self {
            state,
            runner,
            store: ListingStore::default(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        })
    }

    fn pending(&self) -> usize {
        self.runner.pending()
    }

    /// Returns false when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_command(line) {
            Ok(Some(command)) => self.handle_command(command),
            Ok(None) => true,
            Err(err) => {
                eprintln!("error: {err}");
                true
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Open {
                category,
                order,
                viewer,
            } => {
                self.dispatch(Msg::Navigated {
                    category,
                    order,
                    viewer,
                });
                self.load_head();
            }
            Command::More { anchor } => {
                let last_item = anchor.or_else(|| self.active_last_item());
                self.dispatch(Msg::LoadMore { last_item });
            }
            Command::Viewport(height) => {
                self.viewport_height = height;
                self.listing_changed();
            }
            Command::List => self.print_posts(),
            Command::Status => self.print_status(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }

    fn load_head(&mut self) {
        let Some(feed) = self.state.active().cloned() else {
            return;
        };
        let params = self.state.base_params().clone();
        let loading = self.runner.load_head(&feed, &params);
        self.dispatch(Msg::HostLoading(loading));
    }

    /// Applies finished jobs to the store and the core state.
    fn pump(&mut self) {
        for completion in self.runner.poll() {
            let source = completion.source().clone();
            let changed = match completion {
                Completion::Head { source, result } => {
                    let changed = match result {
                        Ok(page) => {
                            self.store.replace(source, page.items);
                            true
                        }
                        Err(err) => {
                            feed_warn!("First page of {:?} failed: {}", source, err);
                            false
                        }
                    };
                    // A first page of a listing left behind must not end the
                    // loading state of the one on screen.
                    let active_loading = self
                        .active_source()
                        .is_some_and(|active| self.runner.head_pending(&active));
                    if !active_loading {
                        self.dispatch(Msg::HostLoading(false));
                    }
                    changed
                }
                Completion::More {
                    request_id,
                    key,
                    source,
                    result,
                } => {
                    let outcome = outcome_of(&result);
                    let added = match result {
                        Ok(page) => self.store.append(source, page.items),
                        Err(_) => 0,
                    };
                    feed_debug!("{} new post(s) for {}", added, key);
                    self.dispatch(Msg::FetchSettled {
                        request_id,
                        key,
                        outcome,
                    });
                    added > 0
                }
            };
            // Only real content changes re-check the viewport.
            if changed && self.active_source().as_ref() == Some(&source) {
                self.listing_changed();
            }
        }
    }

    fn listing_changed(&mut self) {
        let Some(source) = self.active_source() else {
            return;
        };
        self.dispatch(Msg::ListingChanged {
            item_count: self.store.len(&source),
            last_item: self.store.last(&source).map(PostSummary::identity),
            viewport_height: self.viewport_height,
        });
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let active = state.active().cloned();
        self.runner.enqueue(effects, active.as_ref());
        if state.consume_dirty() {
            println!("{}", render(&state.view()));
        }
        self.state = state;
    }

    fn active_source(&self) -> Option<ListingSource> {
        self.state.active().map(ResolvedFeed::listing_source)
    }

    fn active_last_item(&self) -> Option<String> {
        let source = self.active_source()?;
        self.store.last(&source).map(PostSummary::identity)
    }

    fn print_posts(&self) {
        let Some(source) = self.active_source() else {
            println!("nothing open");
            return;
        };
        for (index, post) in self.store.posts(&source).iter().enumerate() {
            println!("{:>4}  {}  {}", index + 1, post.identity(), post.title);
        }
    }

    fn print_status(&self) {
        let mut rows: Vec<String> = self
            .state
            .coordinator()
            .statuses()
            .map(|(key, status)| {
                let cursor = status
                    .last_cursor()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "{key}  fetching={}  cursor={cursor}  failures={}",
                    status.is_fetching(),
                    status.consecutive_failures()
                )
            })
            .collect();
        rows.sort();
        if rows.is_empty() {
            println!("no fetches yet");
        }
        for row in rows {
            println!("{row}");
        }
    }
}

fn render(view: &FeedViewModel) -> String {
    let stamp = Local::now().format("%H:%M:%S");
    let Some(key) = view.key.as_ref() else {
        return format!("[{stamp}] no listing open");
    };
    let listing = match view.listing {
        ListingState::Fetching => "loading".to_string(),
        ListingState::Empty => "empty".to_string(),
        ListingState::Ready(count) => format!("{count} post(s)"),
    };
    let account = view
        .account
        .as_deref()
        .map(|name| format!(" @{name}"))
        .unwrap_or_default();
    let own = if view.own_feed { " (your feed)" } else { "" };
    let menu: Vec<&str> = view.sort_menu.iter().map(|order| order.as_str()).collect();
    format!(
        "[{stamp}] {key}{account}{own}: {listing}{}  sort: {}",
        if view.fetching { ", fetching" } else { "" },
        menu.join(" ")
    )
}
