//! The per-session context: active selection, alert rules, and the
//! stale-fetch guard.
//!
//! The engine is single-threaded and event-driven; the only suspension point
//! is the upstream fetch. Because a new fetch can be triggered before a prior
//! one resolves, at most one in-flight fetch is authoritative: every request
//! carries a monotonically increasing token, and only the response matching
//! the latest token is installed. Superseded responses are discarded on
//! arrival (last-writer-wins, no locks).

use chrono::NaiveDate;
use market_data_ingestor::providers::DataProvider;
use tracing::{debug, warn};

use crate::{
    alerts::{self, AlertEvent, AlertRule, RuleId},
    calendar::Granularity,
    compare::BenchmarkAlignment,
    config::EngineConfig,
    errors::Error,
    export::{self, DaySnapshot, ExportRow},
    metrics::MetricsTable,
    store::BarStore,
};

/// A claim on one load request, handed back to [`SessionContext::commit`]
/// with the fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    symbol: String,
    range_start: NaiveDate,
    range_end: NaiveDate,
}

impl LoadTicket {
    /// The symbol this request was issued for.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Start of the requested range (inclusive).
    pub fn range_start(&self) -> NaiveDate {
        self.range_start
    }

    /// End of the requested range (inclusive).
    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }
}

/// What became of a committed response.
#[derive(Debug, PartialEq)]
pub enum Commit {
    /// The response matched the latest request and was installed; derived
    /// state was recomputed and alerts evaluated over the full range.
    Applied {
        /// Events raised by the active rules over the refreshed range.
        alerts: Vec<AlertEvent>,
    },
    /// A newer request superseded this response; nothing changed.
    Stale,
}

/// Explicit session state shared across views.
///
/// Holds the active symbol, range, and granularity, the ordered alert-rule
/// list, and the current store plus its derived metric table. Passed into
/// component entry points rather than living in ambient globals.
#[derive(Debug)]
pub struct SessionContext {
    symbol: String,
    granularity: Granularity,
    range_start: NaiveDate,
    range_end: NaiveDate,
    store: BarStore,
    metrics: MetricsTable,
    rules: Vec<AlertRule>,
    next_rule_id: u64,
    latest_token: u64,
}

impl SessionContext {
    /// A fresh session with an empty store for the given selection.
    pub fn new(
        symbol: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
        granularity: Granularity,
    ) -> Self {
        let store = BarStore::empty(symbol, range_start, range_end);
        Self {
            symbol: store.symbol().to_string(),
            granularity,
            range_start,
            range_end,
            metrics: MetricsTable::default(),
            store,
            rules: Vec::new(),
            next_rule_id: 1,
            latest_token: 0,
        }
    }

    /// A session seeded from an engine configuration.
    pub fn from_config(config: &EngineConfig, range_start: NaiveDate, range_end: NaiveDate) -> Self {
        let mut session = Self::new(&config.symbol, range_start, range_end, config.granularity);
        for seed in &config.alerts {
            session.add_rule(
                seed.volatility_threshold,
                seed.performance_threshold,
                seed.anchor_date,
            );
        }
        session
    }

    /// Issues a new authoritative request token for the given selection.
    ///
    /// Any response committed against an earlier ticket will be discarded.
    pub fn begin_request(
        &mut self,
        symbol: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> LoadTicket {
        self.latest_token += 1;
        self.symbol = symbol.trim().to_uppercase();
        self.range_start = range_start;
        self.range_end = range_end;
        LoadTicket {
            token: self.latest_token,
            symbol: self.symbol.clone(),
            range_start,
            range_end,
        }
    }

    /// Installs a fetch outcome if its ticket is still the latest.
    ///
    /// On success the store is replaced wholesale, metrics recomputed, and
    /// alerts evaluated over the full refreshed range. On a fetch failure the
    /// store is replaced by an empty one for the range and the error is
    /// returned to the caller, who may retry by issuing the same request
    /// again.
    pub fn commit(
        &mut self,
        ticket: &LoadTicket,
        outcome: Result<BarStore, Error>,
    ) -> Result<Commit, Error> {
        if ticket.token != self.latest_token {
            warn!(
                symbol = %ticket.symbol,
                token = ticket.token,
                latest = self.latest_token,
                "discarding stale fetch response"
            );
            return Ok(Commit::Stale);
        }

        match outcome {
            Ok(store) => {
                debug!(symbol = %store.symbol(), bars = store.len(), "installing refreshed bars");
                self.store = store;
                self.metrics = MetricsTable::compute(&self.store);
                let alerts = alerts::evaluate(&self.store, &self.metrics, &self.rules);
                Ok(Commit::Applied { alerts })
            }
            Err(error) => {
                self.store =
                    BarStore::empty(&ticket.symbol, ticket.range_start, ticket.range_end);
                self.metrics = MetricsTable::compute(&self.store);
                Err(error)
            }
        }
    }

    /// Issues a request for the current selection, fetches, and commits.
    ///
    /// Returns the alert events raised over the refreshed range.
    pub async fn refresh(&mut self, provider: &dyn DataProvider) -> Result<Vec<AlertEvent>, Error> {
        let symbol = self.symbol.clone();
        let ticket = self.begin_request(&symbol, self.range_start, self.range_end);
        let outcome = BarStore::load(
            provider,
            ticket.symbol(),
            ticket.range_start(),
            ticket.range_end(),
        )
        .await;

        match self.commit(&ticket, outcome)? {
            Commit::Applied { alerts } => Ok(alerts),
            // Single-flight callers cannot be superseded mid-await by
            // themselves; a concurrent begin_request surfaces here.
            Commit::Stale => Ok(Vec::new()),
        }
    }

    /// Changes the active view granularity.
    ///
    /// Derived rollups are pure functions of the store, so no rebuild happens
    /// here; callers re-trigger a load when the visible range changes with
    /// the view.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Creates an immutable rule and appends it to the session's list.
    pub fn add_rule(
        &mut self,
        volatility_threshold: Option<f64>,
        performance_threshold: Option<f64>,
        anchor_date: NaiveDate,
    ) -> RuleId {
        let id = RuleId(self.next_rule_id);
        self.next_rule_id += 1;
        self.rules.push(AlertRule {
            id,
            volatility_threshold,
            performance_threshold,
            anchor_date,
        });
        id
    }

    /// Deletes a rule by id. Returns whether a rule was removed.
    pub fn remove_rule(&mut self, id: RuleId) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        self.rules.len() != before
    }

    /// The ordered rule list.
    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Re-evaluates the current store against the current rules.
    ///
    /// Used after the rule list changes without a data refresh; history
    /// already loaded is re-scanned in full.
    pub fn evaluate_alerts(&self) -> Vec<AlertEvent> {
        alerts::evaluate(&self.store, &self.metrics, &self.rules)
    }

    /// The active symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The active view granularity.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The current bar store.
    pub fn store(&self) -> &BarStore {
        &self.store
    }

    /// The current metric table.
    pub fn metrics(&self) -> &MetricsTable {
        &self.metrics
    }

    /// Per-date lookup for rendering collaborators.
    pub fn day_snapshot(&self, date: NaiveDate) -> DaySnapshot<'_> {
        export::day_snapshot(&self.store, &self.metrics, date)
    }

    /// Tabular rows for export collaborators, optionally with an aligned
    /// benchmark column.
    pub fn export_rows(&self, benchmark: Option<&BenchmarkAlignment>) -> Vec<ExportRow> {
        export::export_rows(&self.store, &self.metrics, benchmark)
    }
}
