// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive command, text and callback flows.
//!
//! [`BotFlows`] is transport-free: it turns a user action into a [`Reply`]
//! and leaves delivery to the dispatcher in `lib.rs`.

use std::sync::Arc;

use reelwatch_cache::{SearchPage, SearchSessions, SearchState, SessionCache};
use reelwatch_core::{
    Clock, InlineAction, MetadataProvider, ReelwatchError, SearchItem, SearchKind,
    StorageAdapter, TrackedShow, UserId, WatchlistEntry,
};
use tracing::{info, warn};

use crate::handler::Command;
use crate::keyboard::{Callback, page_keyboard};
use crate::markdown::{bold, escape, italic, truncate};

const OVERVIEW_CHARS: usize = 160;

/// A MarkdownV2 reply with optional inline buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<InlineAction>>,
    /// Replace the message the callback came from instead of sending a new one.
    pub edit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
            edit: false,
        }
    }

    fn plain(text: &str) -> Self {
        Self::text(escape(text))
    }
}

pub struct BotFlows {
    sessions: Arc<SessionCache>,
    searches: Arc<SearchSessions>,
    storage: Arc<dyn StorageAdapter>,
    provider: Arc<dyn MetadataProvider>,
    clock: Arc<dyn Clock>,
}

impl BotFlows {
    pub fn new(
        sessions: Arc<SessionCache>,
        searches: Arc<SearchSessions>,
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn MetadataProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            searches,
            storage,
            provider,
            clock,
        }
    }

    pub async fn handle_command(&self, user_id: UserId, command: Command) -> Reply {
        let result = self.command(user_id, command).await;
        recover(user_id, "command", result)
    }

    /// Free text is a token or a search query depending on what the
    /// session is waiting for.
    pub async fn handle_text(&self, user_id: UserId, text: &str) -> Reply {
        let result = self.text(user_id, text.trim()).await;
        recover(user_id, "text", result)
    }

    pub async fn handle_callback(&self, user_id: UserId, data: &str) -> Reply {
        let Some(callback) = Callback::parse(data) else {
            warn!(user_id, data, "unknown callback data");
            return Reply::plain("That button is no longer supported.");
        };
        let result = self.callback(user_id, callback).await;
        recover(user_id, "callback", result)
    }

    async fn command(&self, user_id: UserId, command: Command) -> Result<Reply, ReelwatchError> {
        match command {
            Command::Start => {
                let session = self.sessions.fetch(user_id).await?;
                if session.auth_token.value.is_some() {
                    return Ok(Reply::text(format!(
                        "{}\n\n{}",
                        bold("Welcome back!"),
                        help_text()
                    )));
                }
                self.sessions.update_token_state(user_id, true).await;
                Ok(Reply::text(format!(
                    "{}\n\n{}",
                    bold("Welcome to reelwatch!"),
                    escape(
                        "Send me your TMDB API read access token so I can search and \
                         check your shows for new seasons."
                    )
                )))
            }
            Command::Help => Ok(Reply::text(help_text())),
            Command::Token(token) => {
                let token = token.trim();
                if token.is_empty() {
                    self.sessions.fetch(user_id).await?;
                    self.sessions.update_token_state(user_id, true).await;
                    return Ok(Reply::plain("Send me your TMDB API read access token."));
                }
                self.accept_token(user_id, token).await
            }
            Command::Movie(query) => self.begin_search(user_id, SearchKind::Movie, &query).await,
            Command::Tv(query) => self.begin_search(user_id, SearchKind::TvShow, &query).await,
            Command::Shows => self.list_shows(user_id).await,
            Command::Watchlist => self.list_watchlist(user_id).await,
        }
    }

    async fn text(&self, user_id: UserId, text: &str) -> Result<Reply, ReelwatchError> {
        let session = self.sessions.fetch(user_id).await?;
        if session.auth_token.waiting {
            return self.accept_token(user_id, text).await;
        }
        match session.search_state {
            SearchState::Waiting(kind) => {
                let Some(api_key) = session.auth_token.value else {
                    return self.ask_for_token(user_id).await;
                };
                self.run_search(user_id, &api_key, kind, text).await
            }
            SearchState::Idle => Ok(Reply::plain(
                "Use /movie or /tv to search. /help lists every command.",
            )),
        }
    }

    async fn accept_token(&self, user_id: UserId, token: &str) -> Result<Reply, ReelwatchError> {
        if token.is_empty() {
            return Ok(Reply::plain("The token cannot be empty. Send it again."));
        }
        if !self.provider.validate_credential(token).await? {
            info!(user_id, "credential rejected by provider");
            return Ok(Reply::plain("TMDB rejected that token. Send a valid one."));
        }

        self.storage.get_or_create_user(user_id).await?;
        self.storage.set_user_credential(user_id, token).await?;
        self.sessions.fetch(user_id).await?;
        self.sessions.store_token(user_id, token).await;
        info!(user_id, "credential stored");
        Ok(Reply::plain(
            "Token saved. Use /movie or /tv to start searching.",
        ))
    }

    async fn ask_for_token(&self, user_id: UserId) -> Result<Reply, ReelwatchError> {
        self.sessions.update_token_state(user_id, true).await;
        Ok(Reply::plain(
            "I need your TMDB API read access token first. Send it as a message.",
        ))
    }

    /// The user's credential, asking for one when none is on file.
    async fn credential(&self, user_id: UserId) -> Result<Result<String, Reply>, ReelwatchError> {
        let session = self.sessions.fetch(user_id).await?;
        match session.auth_token.value {
            Some(key) => Ok(Ok(key)),
            None => Ok(Err(self.ask_for_token(user_id).await?)),
        }
    }

    async fn begin_search(
        &self,
        user_id: UserId,
        kind: SearchKind,
        query: &str,
    ) -> Result<Reply, ReelwatchError> {
        let api_key = match self.credential(user_id).await? {
            Ok(key) => key,
            Err(reply) => return Ok(reply),
        };
        let query = query.trim();
        if !query.is_empty() {
            return self.run_search(user_id, &api_key, kind, query).await;
        }

        self.sessions.set_search_waiting(user_id, kind).await;
        let prompt = match kind {
            SearchKind::Movie => "Which movie are you looking for?",
            SearchKind::TvShow => "Which TV show are you looking for?",
        };
        Ok(Reply::plain(prompt))
    }

    async fn run_search(
        &self,
        user_id: UserId,
        api_key: &str,
        kind: SearchKind,
        query: &str,
    ) -> Result<Reply, ReelwatchError> {
        self.sessions.clear_search_waiting(user_id).await;
        if query.is_empty() {
            return Ok(Reply::plain("Send a title to search for."));
        }

        let results: Vec<SearchItem> = match kind {
            SearchKind::Movie => self
                .provider
                .search_movies(api_key, query)
                .await?
                .into_iter()
                .map(SearchItem::Movie)
                .collect(),
            SearchKind::TvShow => self
                .provider
                .search_shows(api_key, query)
                .await?
                .into_iter()
                .map(SearchItem::Show)
                .collect(),
        };
        info!(user_id, %kind, results = results.len(), "search completed");

        if results.is_empty() {
            self.searches.clear(user_id);
            return Ok(Reply::plain(&format!("Nothing found for \"{query}\".")));
        }
        let page = self.searches.install(user_id, kind, results);
        Ok(render_page(&page))
    }

    async fn callback(&self, user_id: UserId, callback: Callback) -> Result<Reply, ReelwatchError> {
        match callback {
            Callback::Page(nav) => Ok(match self.searches.navigate(user_id, nav) {
                Some(page) => Reply {
                    edit: true,
                    ..render_page(&page)
                },
                None => expired(),
            }),
            Callback::Track(rank) => {
                let Some(item) = self.searches.get_item(user_id, rank) else {
                    return Ok(expired());
                };
                let SearchItem::Show(show) = item else {
                    return Ok(Reply::plain("Only TV shows can be tracked."));
                };
                let api_key = match self.credential(user_id).await? {
                    Ok(key) => key,
                    Err(reply) => return Ok(reply),
                };
                let details = self.provider.get_show(&api_key, show.id).await?;
                let tracked = TrackedShow::from_details(user_id, &details, details.seasons);
                self.save_tracked(&tracked).await?;
                info!(user_id, show_id = details.id, seasons = details.seasons, "show tracked");
                Ok(Reply::text(format!(
                    "{} {} {}",
                    escape("Now tracking"),
                    bold(&details.name),
                    escape(&format!(
                        "({} seasons watched). I will tell you when a new season airs.",
                        details.seasons
                    ))
                )))
            }
            Callback::Watched(rank) => {
                let Some(item) = self.searches.get_item(user_id, rank) else {
                    return Ok(expired());
                };
                let SearchItem::Movie(movie) = item else {
                    return Ok(Reply::plain("Use Track for TV shows."));
                };
                let api_key = match self.credential(user_id).await? {
                    Ok(key) => key,
                    Err(reply) => return Ok(reply),
                };
                let details = self.provider.get_movie(&api_key, movie.id).await?;
                self.storage
                    .mark_movie_watched(user_id, &details, self.clock.now())
                    .await?;
                info!(user_id, movie_id = details.id, "movie marked watched");
                Ok(Reply::text(format!(
                    "{} {}",
                    escape("Marked as watched:"),
                    bold(&details.title)
                )))
            }
            Callback::Later(rank) => {
                let Some(item) = self.searches.get_item(user_id, rank) else {
                    return Ok(expired());
                };
                let entry = WatchlistEntry {
                    user_id,
                    api_id: item.id(),
                    media_type: item.kind(),
                    title: item.title().to_string(),
                    added_at: self.clock.now(),
                };
                self.storage.add_to_watchlist(&entry).await?;
                Ok(Reply::text(format!(
                    "{} {}",
                    escape("Added to your watchlist:"),
                    bold(&entry.title)
                )))
            }
            Callback::Seen { show_id, seasons } => self.confirm_seen(user_id, show_id, seasons).await,
        }
    }

    async fn confirm_seen(
        &self,
        user_id: UserId,
        show_id: i64,
        seasons: i32,
    ) -> Result<Reply, ReelwatchError> {
        let tracked = match self.storage.get_tracked_show(show_id, user_id).await? {
            Some(mut show) => {
                show.seasons = seasons;
                self.storage.update_tracked_show(&show).await?;
                show
            }
            None => {
                let api_key = match self.credential(user_id).await? {
                    Ok(key) => key,
                    Err(reply) => return Ok(reply),
                };
                let details = self.provider.get_show(&api_key, show_id).await?;
                let show = TrackedShow::from_details(user_id, &details, seasons);
                self.storage.create_tracked_show(&show).await?;
                show
            }
        };
        info!(user_id, show_id, seasons, "watched seasons confirmed");
        Ok(Reply::plain(&format!(
            "Got it: {} seasons of {} watched.",
            tracked.seasons, tracked.name
        )))
    }

    /// Creates the row on first track, otherwise refreshes it.
    async fn save_tracked(&self, show: &TrackedShow) -> Result<(), ReelwatchError> {
        match self
            .storage
            .get_tracked_show(show.api_show_id, show.user_id)
            .await?
        {
            Some(_) => self.storage.update_tracked_show(show).await,
            None => self.storage.create_tracked_show(show).await,
        }
    }

    async fn list_shows(&self, user_id: UserId) -> Result<Reply, ReelwatchError> {
        let shows = self.storage.list_tracked_shows(user_id).await?;
        if shows.is_empty() {
            return Ok(Reply::plain(
                "You are not tracking any shows yet. Use /tv to find one.",
            ));
        }
        let mut text = bold("Tracked shows");
        for show in &shows {
            text.push_str(&format!(
                "\n{} {} {}",
                escape("•"),
                bold(&show.name),
                escape(&format!("{} seasons watched, {}", show.seasons, show.status))
            ));
        }
        Ok(Reply::text(text))
    }

    async fn list_watchlist(&self, user_id: UserId) -> Result<Reply, ReelwatchError> {
        let entries = self.storage.list_watchlist(user_id).await?;
        if entries.is_empty() {
            return Ok(Reply::plain("Your watchlist is empty."));
        }
        let mut text = bold("Watchlist");
        for entry in &entries {
            let kind = match entry.media_type {
                SearchKind::Movie => "movie",
                SearchKind::TvShow => "TV",
            };
            text.push_str(&format!(
                "\n{} {} {}",
                escape("•"),
                bold(&entry.title),
                escape(&format!("({kind})"))
            ));
        }
        Ok(Reply::text(text))
    }
}

fn recover(user_id: UserId, flow: &str, result: Result<Reply, ReelwatchError>) -> Reply {
    result.unwrap_or_else(|e| {
        warn!(user_id, flow, error = %e, "interactive flow failed");
        Reply::plain("Something went wrong. Please try again later.")
    })
}

fn expired() -> Reply {
    Reply::plain("Those results have expired. Search again with /movie or /tv.")
}

fn help_text() -> String {
    escape(
        "/movie <title> - search for a movie\n\
         /tv <title> - search for a TV show\n\
         /shows - TV shows you track\n\
         /watchlist - titles saved for later\n\
         /token <token> - set your TMDB token\n\
         /help - this message",
    )
}

/// Formats a result page with its buttons.
pub fn render_page(page: &SearchPage) -> Reply {
    let heading = match page.kind {
        SearchKind::Movie => "Movies",
        SearchKind::TvShow => "TV shows",
    };
    let mut text = format!(
        "{} {}",
        bold(heading),
        escape(&format!("(page {}/{})", page.page, page.max_page))
    );
    for (rank, item) in &page.items {
        text.push_str(&format!("\n\n{} {}", escape(&format!("{rank}.")), bold(item.title())));
        if let Some(year) = item.year() {
            text.push_str(&escape(&format!(" ({year})")));
        }
        let overview = match item {
            SearchItem::Movie(m) => m.overview.as_deref(),
            SearchItem::Show(s) => s.overview.as_deref(),
        };
        if let Some(overview) = overview.filter(|o| !o.is_empty()) {
            text.push('\n');
            text.push_str(&italic(&truncate(overview, OVERVIEW_CHARS)));
        }
    }
    Reply {
        text,
        keyboard: page_keyboard(page),
        edit: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelwatch_core::{MovieDetails, MovieSummary, ShowDetails, ShowSummary};
    use reelwatch_test_utils::TestHarness;

    const USER: UserId = 7;

    struct Fixture {
        flows: BotFlows,
        searches: Arc<SearchSessions>,
        harness: TestHarness,
    }

    async fn fixture() -> Fixture {
        let harness = TestHarness::new().await.unwrap();
        let sessions = Arc::new(SessionCache::new(
            harness.storage.clone(),
            harness.clock.clone(),
            std::time::Duration::from_secs(24 * 3600),
        )
        .unwrap());
        let searches = Arc::new(SearchSessions::new());
        let flows = BotFlows::new(
            sessions,
            searches.clone(),
            harness.storage.clone(),
            harness.provider.clone(),
            harness.clock.clone(),
        );
        Fixture {
            flows,
            searches,
            harness,
        }
    }

    fn movie(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            release_date: Some("1999-03-31".into()),
            overview: Some("A hacker learns the truth.".into()),
            poster_path: None,
            vote_average: None,
        }
    }

    fn show(id: i64, name: &str) -> ShowSummary {
        ShowSummary {
            id,
            name: name.to_string(),
            first_air_date: None,
            overview: None,
            poster_path: None,
            vote_average: None,
        }
    }

    fn show_details(id: i64, seasons: i32) -> ShowDetails {
        ShowDetails {
            id,
            name: format!("Show {id}"),
            seasons,
            episodes: seasons * 10,
            runtime: 50,
            status: "Returning Series".into(),
            poster_path: None,
            overview: None,
        }
    }

    #[tokio::test]
    async fn start_without_token_waits_for_one() {
        let f = fixture().await;
        f.harness.provider.accept_key("good").await;

        let reply = f.flows.handle_command(USER, Command::Start).await;
        assert!(reply.text.contains("token"));

        let reply = f.flows.handle_text(USER, "bad").await;
        assert!(reply.text.contains("rejected"));
        assert_eq!(f.harness.storage.get_user_credential(USER).await.unwrap(), None);

        let reply = f.flows.handle_text(USER, "good").await;
        assert!(reply.text.contains("Token saved"));
        assert_eq!(
            f.harness.storage.get_user_credential(USER).await.unwrap(),
            Some("good".to_string())
        );

        // No longer waiting: free text is not taken as a token.
        let reply = f.flows.handle_text(USER, "other").await;
        assert!(reply.text.contains("/movie"));
    }

    #[tokio::test]
    async fn start_with_token_welcomes_back() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        let reply = f.flows.handle_command(USER, Command::Start).await;
        assert!(reply.text.contains("Welcome back"));
    }

    #[tokio::test]
    async fn search_requires_a_token() {
        let f = fixture().await;
        let reply = f
            .flows
            .handle_command(USER, Command::Movie("matrix".into()))
            .await;
        assert!(reply.text.contains("token first"));
        assert!(f.searches.page(USER).is_none());
    }

    #[tokio::test]
    async fn waiting_search_runs_on_next_text() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness
            .provider
            .set_movie_results((1..=7).map(|i| movie(i, &format!("Movie {i}"))).collect())
            .await;

        let reply = f.flows.handle_command(USER, Command::Movie(String::new())).await;
        assert!(reply.text.contains("Which movie"));

        let reply = f.flows.handle_text(USER, "movie").await;
        assert!(reply.text.contains("page 1/3"));
        assert!(reply.text.contains("Movie 1"));
        assert!(reply.text.contains("1999"));
        assert!(!reply.text.contains("Movie 4"));
        assert!(!reply.edit);
        let nav = reply.keyboard.last().unwrap();
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].callback_data, "page:next");

        // Search state was cleared: the next text is not a query.
        let reply = f.flows.handle_text(USER, "again").await;
        assert!(reply.text.contains("Use /movie"));
    }

    #[tokio::test]
    async fn navigation_edits_and_clamps() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness
            .provider
            .set_movie_results((1..=4).map(|i| movie(i, &format!("Movie {i}"))).collect())
            .await;
        f.flows
            .handle_command(USER, Command::Movie("m".into()))
            .await;

        let reply = f.flows.handle_callback(USER, "page:next").await;
        assert!(reply.edit);
        assert!(reply.text.contains("page 2/2"));
        assert!(reply.text.contains("Movie 4"));

        let reply = f.flows.handle_callback(USER, "page:next").await;
        assert!(reply.text.contains("page 2/2"));
    }

    #[tokio::test]
    async fn callbacks_without_search_are_expired() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        for data in ["page:next", "track:1", "watched:1", "later:1"] {
            let reply = f.flows.handle_callback(USER, data).await;
            assert!(reply.text.contains("expired"), "{data}");
        }
    }

    #[tokio::test]
    async fn track_creates_then_updates() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness.provider.set_show_results(vec![show(10, "Show 10")]).await;
        f.harness.provider.set_show(show_details(10, 2)).await;
        f.flows.handle_command(USER, Command::Tv("show".into())).await;

        let reply = f.flows.handle_callback(USER, "track:1").await;
        assert!(reply.text.contains("Now tracking"));
        let stored = f.harness.storage.get_tracked_show(10, USER).await.unwrap().unwrap();
        assert_eq!(stored.seasons, 2);

        f.harness.provider.set_show(show_details(10, 3)).await;
        f.flows.handle_callback(USER, "track:1").await;
        let stored = f.harness.storage.get_tracked_show(10, USER).await.unwrap().unwrap();
        assert_eq!(stored.seasons, 3);
        assert_eq!(f.harness.storage.list_tracked_shows(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn watched_removes_movie_from_watchlist() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness.provider.set_movie_results(vec![movie(603, "The Matrix")]).await;
        f.harness
            .provider
            .set_movie(MovieDetails {
                id: 603,
                title: "The Matrix".into(),
                runtime: 136,
                status: "Released".into(),
                release_date: None,
                poster_path: None,
                overview: None,
            })
            .await;
        f.flows
            .handle_command(USER, Command::Movie("matrix".into()))
            .await;

        let reply = f.flows.handle_callback(USER, "later:1").await;
        assert!(reply.text.contains("watchlist"));
        assert_eq!(f.harness.storage.list_watchlist(USER).await.unwrap().len(), 1);

        let reply = f.flows.handle_callback(USER, "watched:1").await;
        assert!(reply.text.contains("Marked as watched"));
        assert!(f.harness.storage.list_watchlist(USER).await.unwrap().is_empty());

        let reply = f.flows.handle_callback(USER, "track:1").await;
        assert!(reply.text.contains("Only TV shows"));
    }

    #[tokio::test]
    async fn seen_updates_existing_or_creates() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness.track_show(USER, 20, "Twenty", 1, 3).await.unwrap();

        let reply = f.flows.handle_callback(USER, "seen:20:3").await;
        assert!(reply.text.contains("3 seasons of Twenty"));
        let stored = f.harness.storage.get_tracked_show(20, USER).await.unwrap().unwrap();
        assert_eq!(stored.seasons, 3);

        f.harness.provider.set_show(show_details(30, 5)).await;
        f.flows.handle_callback(USER, "seen:30:4").await;
        let stored = f.harness.storage.get_tracked_show(30, USER).await.unwrap().unwrap();
        assert_eq!(stored.seasons, 4);
    }

    #[tokio::test]
    async fn provider_errors_become_a_friendly_reply() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness.provider.set_show_results(vec![show(40, "Gone")]).await;
        f.harness.provider.fail_show(40).await;
        f.flows.handle_command(USER, Command::Tv("gone".into())).await;

        let reply = f.flows.handle_callback(USER, "track:1").await;
        assert!(reply.text.contains("Something went wrong"));
        assert!(f.harness.storage.get_tracked_show(40, USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_shows_and_watchlist() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        let reply = f.flows.handle_command(USER, Command::Shows).await;
        assert!(reply.text.contains("not tracking"));
        let reply = f.flows.handle_command(USER, Command::Watchlist).await;
        assert!(reply.text.contains("empty"));

        f.harness.track_show(USER, 50, "Fifty", 2, 2).await.unwrap();
        let reply = f.flows.handle_command(USER, Command::Shows).await;
        assert!(reply.text.contains("*Fifty*"));
        assert!(reply.text.contains("2 seasons watched"));
    }

    #[tokio::test]
    async fn empty_search_clears_previous_results() {
        let f = fixture().await;
        f.harness.add_user(USER, "key").await.unwrap();
        f.harness.provider.set_movie_results(vec![movie(1, "One")]).await;
        f.flows.handle_command(USER, Command::Movie("one".into())).await;
        assert!(f.searches.get_item(USER, 1).is_some());

        f.harness.provider.set_movie_results(Vec::new()).await;
        let reply = f.flows.handle_command(USER, Command::Movie("none".into())).await;
        assert!(reply.text.contains("Nothing found"));
        assert!(f.searches.get_item(USER, 1).is_none());
    }

    #[test]
    fn page_text_is_escaped() {
        let page = SearchPage {
            kind: SearchKind::Movie,
            page: 1,
            max_page: 1,
            items: vec![(1, SearchItem::Movie(movie(1, "Mr. Robot (pilot)")))],
        };
        let reply = render_page(&page);
        assert!(reply.text.contains("Mr\\. Robot \\(pilot\\)"));
        assert!(reply.text.contains("\\(1999\\)"));
    }
}
