//! The active-chart flow shared by every chart page.
//!
//! A load resolves whose chart is wanted, checks the person has birth
//! details, builds the query parameters, fetches the chart, writes it to
//! the cache and publishes it as the page state. Loads may overlap; each
//! one holds a [`LoadTicket`] from a generation counter and only the
//! newest ticket may publish.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use jyotish_core::chart::ChartResult;
use jyotish_core::error::CoreError;
use jyotish_core::identity::{Directory, Selection};
use jyotish_core::params::ChartQueryParams;

use crate::api::{ApiError, AstroApi};
use crate::cache::{CacheError, ChartCache};
use crate::session::Session;

/// Notice shown after the backend rejected the session token.
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please log in again.";

/// Why a page has nothing to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The selection does not match the account or any family member.
    UnknownSelection(Selection),
    /// The person lacks a date, time or place of birth.
    IncompleteProfile,
}

/// What a chart page currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageState {
    #[default]
    Idle,
    Loading(Selection),
    Ready {
        selection: Selection,
        chart: ChartResult,
    },
    Empty(EmptyReason),
    Error(String),
}

impl PageState {
    pub fn chart(&self) -> Option<&ChartResult> {
        match self {
            Self::Ready { chart, .. } => Some(chart),
            _ => None,
        }
    }
}

/// Proof that a load was started, tagged with its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub selection: Selection,
}

/// Result of finishing a load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The load was current and its state was published.
    Applied(PageState),
    /// A newer load started meanwhile; the result was dropped.
    Stale,
}

/// Internal result of a load before it is settled.
enum Fetched {
    Chart(ChartResult),
    Empty(EmptyReason),
    Failed(String),
}

pub struct ChartFlow {
    api: AstroApi,
    cache: ChartCache,
    session: Session,
    generation: AtomicU64,
    state: RwLock<PageState>,
}

impl ChartFlow {
    pub fn new(api: AstroApi, cache: ChartCache) -> Self {
        let session = api.session().clone();
        Self {
            api,
            cache,
            session,
            generation: AtomicU64::new(0),
            state: RwLock::new(PageState::Idle),
        }
    }

    pub fn api(&self) -> &AstroApi {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn state(&self) -> PageState {
        self.state.read().await.clone()
    }

    /// The cached chart for painting before a load completes. A malformed
    /// entry counts as a miss.
    pub fn placeholder(&self) -> Option<ChartResult> {
        match self.cache.read() {
            Ok(chart) => chart,
            Err(CacheError::Malformed(e)) => {
                tracing::warn!(error = %e, "Ignoring malformed cached chart");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chart cache unreadable");
                None
            }
        }
    }

    /// Start a load for `selection`, invalidating any load in flight.
    pub async fn begin(&self, selection: Selection) -> LoadTicket {
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = PageState::Loading(selection);
        tracing::debug!(generation, %selection, "Chart load started");
        LoadTicket {
            generation,
            selection,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Load the chart of `selection` from an already fetched directory.
    pub async fn load_for(&self, selection: Selection, directory: &Directory) -> LoadOutcome {
        let ticket = self.begin(selection).await;
        self.run(ticket, directory).await
    }

    /// Finish a started load against `directory`.
    pub async fn run(&self, ticket: LoadTicket, directory: &Directory) -> LoadOutcome {
        let fetched = match directory.resolve(ticket.selection) {
            None => {
                tracing::info!(selection = %ticket.selection, "Selection matches nobody");
                Fetched::Empty(EmptyReason::UnknownSelection(ticket.selection))
            }
            Some(person) if !person.is_chart_ready() => {
                tracing::info!(
                    selection = %ticket.selection,
                    missing = ?person.missing_birth_fields(),
                    "Profile incomplete, not fetching chart",
                );
                Fetched::Empty(EmptyReason::IncompleteProfile)
            }
            Some(person) => match ChartQueryParams::from_person(person) {
                Ok(params) => self.fetch(&params).await,
                Err(e) => Self::invalid_params(e),
            },
        };
        self.settle(ticket, fetched).await
    }

    /// Fetch the account and its family members, in that order, then load
    /// the chart of `selection`. The fetched directory is returned so the
    /// caller can offer the selector without refetching.
    pub async fn open(&self, selection: Selection) -> (Option<Directory>, LoadOutcome) {
        let ticket = self.begin(selection).await;
        match self.load_directory().await {
            Ok(directory) => {
                let outcome = self.run(ticket, &directory).await;
                (Some(directory), outcome)
            }
            Err(e) => {
                let fetched = Fetched::Failed(Self::notice(&e));
                (None, self.settle(ticket, fetched).await)
            }
        }
    }

    /// The dashboard path: the backend derives the parameters from the
    /// stored profile.
    pub async fn load_own(&self) -> LoadOutcome {
        let ticket = self.begin(Selection::Me).await;
        let fetched = match self.api.chart_params().await {
            Ok(None) => Fetched::Empty(EmptyReason::IncompleteProfile),
            Ok(Some(params)) => self.fetch(&params).await,
            Err(e) => Fetched::Failed(self.notice_for(&e)),
        };
        self.settle(ticket, fetched).await
    }

    /// Fetch the account, then its family members.
    pub async fn load_directory(&self) -> Result<Directory, ApiError> {
        let user = self.api.current_user().await.inspect_err(|e| self.on_error(e))?;
        if let Err(e) = self.session.store_user(&user) {
            tracing::warn!(error = %e, "Failed to cache account");
        }
        let members = self
            .api
            .family_members()
            .await
            .inspect_err(|e| self.on_error(e))?;
        tracing::debug!(members = members.len(), "Directory loaded");
        Ok(Directory::new(Some(user), members))
    }

    async fn fetch(&self, params: &ChartQueryParams) -> Fetched {
        match self.api.compute_chart(params).await {
            Ok(chart) => Fetched::Chart(chart),
            Err(e) => Fetched::Failed(self.notice_for(&e)),
        }
    }

    fn invalid_params(e: CoreError) -> Fetched {
        tracing::warn!(error = %e, "Birth details could not be turned into chart parameters");
        Fetched::Failed(e.to_string())
    }

    /// Map an API error to its notice, ending the session on a 401.
    fn notice_for(&self, e: &ApiError) -> String {
        self.on_error(e);
        Self::notice(e)
    }

    /// User-facing notice for a failed flow call. A 401 always reads as
    /// an expired session.
    pub fn notice(e: &ApiError) -> String {
        if e.is_unauthorized() {
            SESSION_EXPIRED_NOTICE.to_string()
        } else {
            e.notice()
        }
    }

    fn on_error(&self, e: &ApiError) {
        if e.is_unauthorized() {
            tracing::warn!("Backend rejected the session token, signing out");
            if let Err(e) = self.session.end() {
                tracing::error!(error = %e, "Failed to clear the session");
            }
        } else {
            tracing::error!(error = %e, "Backend request failed");
        }
    }

    /// Publish a finished load if its ticket is still current.
    async fn settle(&self, ticket: LoadTicket, fetched: Fetched) -> LoadOutcome {
        let mut state = self.state.write().await;
        if !self.is_current(&ticket) {
            tracing::debug!(
                generation = ticket.generation,
                selection = %ticket.selection,
                "Discarding stale chart load",
            );
            return LoadOutcome::Stale;
        }

        let next = match fetched {
            Fetched::Chart(chart) => {
                if let Err(e) = self.cache.write(&chart) {
                    tracing::warn!(error = %e, "Failed to cache chart");
                }
                PageState::Ready {
                    selection: ticket.selection,
                    chart,
                }
            }
            Fetched::Empty(reason) => PageState::Empty(reason),
            Fetched::Failed(notice) => PageState::Error(notice),
        };
        *state = next.clone();
        LoadOutcome::Applied(next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
