//! Collection route builder.
//!
//! One [`CollectionBuilder`] per collection component. Each pass runs the
//! state machine below; between passes the builder sleeps on its
//! [`Subscription`] until the component or a query dependency changes.
//!
//! ```text
//!            ┌──────────────── trigger (debounced) ────────────────┐
//!            ▼                                                     │
//!      AwaitingQuery ──no query──────────────────────────────┐     │
//!            │                                               ▼     │
//!            ▼                                            Watching ┘
//!        Querying ──errors / no data / bad shape──► QueryFailed ─┤
//!            │                                               ▲   │
//!            ▼                                               │   │
//!        Succeeded ──Abort policy hit────────────────────────┘   │
//!            └──────────────────────────────────────────────────►┘
//! ```
//!
//! Every pass ends the same way: register the new pages, deregister the
//! previous pages the pass no longer produced, re-arm the notifier.

mod plan;
mod reconcile;

pub use reconcile::GeneratedPageSet;

use plan::{Plan, Planner};

use crate::{
    config::{MissingFieldPolicy, SiteConfig, defaults},
    log,
    pages::{ComponentRoute, PageRequest, PageSink},
    query::{Collection, QueryEngine, extract_query},
    watch::{ChangeNotifier, Subscription},
};
use pagegen_core::{DeriveOptions, Pattern, PatternError, pattern::DEFAULT_PREFIX};
use std::{path::PathBuf, sync::Arc, time::Duration};
use thiserror::Error;

/// Fatal builder errors. Everything else is logged and waits for a change.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    AwaitingQuery,
    Querying,
    Succeeded,
    QueryFailed,
    Watching,
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// `AwaitingQuery`, `QueryFailed` or `Succeeded`.
    pub state: BuilderState,
    pub query: Option<String>,
    /// Paths registered by this pass, in record order.
    pub created: Vec<String>,
    /// Paths of the previous pass that were deregistered.
    pub removed: Vec<String>,
    /// Records that produced no page.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct BuilderOptions {
    pub prefix: String,
    pub query_tag: String,
    pub derive: DeriveOptions,
    pub on_missing_field: MissingFieldPolicy,
    pub debounce: Duration,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            query_tag: defaults::collection::query_tag(),
            derive: DeriveOptions::default(),
            on_missing_field: MissingFieldPolicy::default(),
            debounce: Duration::from_millis(defaults::watch::debounce_ms()),
        }
    }
}

impl BuilderOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            prefix: config.collection.prefix.clone(),
            query_tag: config.collection.query_tag.clone(),
            derive: config.collection.derive_options(),
            on_missing_field: config.collection.on_missing_field,
            debounce: config.watch.debounce(),
        }
    }
}

pub struct CollectionBuilder<Q, S, N> {
    route: ComponentRoute,
    pattern: Pattern,
    engine: Arc<Q>,
    sink: Arc<S>,
    notifier: Arc<N>,
    options: BuilderOptions,
    subscription: Subscription,
    generated: GeneratedPageSet,
    state: BuilderState,
}

impl<Q, S, N> CollectionBuilder<Q, S, N>
where
    Q: QueryEngine,
    S: PageSink,
    N: ChangeNotifier,
{
    /// Parse the component's pattern. Fails before any page exists.
    pub fn new(
        route: ComponentRoute,
        engine: Arc<Q>,
        sink: Arc<S>,
        notifier: Arc<N>,
        options: BuilderOptions,
    ) -> Result<Self, BuildError> {
        let pattern = Pattern::parse(&route.file_path, &options.prefix)?;
        let subscription = notifier.subscribe();

        Ok(Self {
            route,
            pattern,
            engine,
            sink,
            notifier,
            options,
            subscription,
            generated: GeneratedPageSet::new(),
            state: BuilderState::AwaitingQuery,
        })
    }

    #[cfg(test)]
    pub const fn state(&self) -> BuilderState {
        self.state
    }

    #[cfg(test)]
    pub const fn generated(&self) -> &GeneratedPageSet {
        &self.generated
    }

    /// Run one pass and re-arm the notifier.
    pub async fn step(&mut self) -> RunReport {
        self.state = BuilderState::AwaitingQuery;
        let Some(query) = extract_query(&self.route.absolute, &self.options.query_tag) else {
            log!("collection"; "{}: no collection query yet, waiting for changes", self.route.file_path);
            return self.finish(BuilderState::AwaitingQuery, None, Plan::default());
        };

        self.state = BuilderState::Querying;
        let response = self.engine.execute(&query).await;

        if response.is_failure() {
            log!("warn"; "{}: the query came back empty, there may be an error in it", self.route.file_path);
            for message in response.error_messages() {
                log!("error"; "{message}");
            }
            return self.finish(BuilderState::QueryFailed, Some(query), Plan::default());
        }

        let collection = match Collection::from_response(&query, response.data.unwrap_or_default()) {
            Ok(collection) => collection,
            Err(err) => {
                log!("error"; "{}: {err}", self.route.file_path);
                return self.finish(BuilderState::QueryFailed, Some(query), Plan::default());
            }
        };
        log!("query"; "{}: {} records from `{}`", self.route.file_path, collection.nodes.len(), collection.key);

        let planner = Planner {
            pattern: &self.pattern,
            component: &self.route.absolute,
            derive: self.options.derive,
            on_missing_field: self.options.on_missing_field,
        };
        match planner.plan(&collection.nodes) {
            Ok(plan) => self.finish(BuilderState::Succeeded, Some(query), plan),
            Err(err) => {
                log!("error"; "{}: {err}, no pages created", self.route.file_path);
                self.finish(BuilderState::QueryFailed, Some(query), Plan::default())
            }
        }
    }

    /// Step, then re-run on every change until the notifier goes away.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
            if !self.wait_for_change().await {
                break;
            }
        }
    }

    async fn wait_for_change(&mut self) -> bool {
        if !self.subscription.changed().await {
            return false;
        }
        // Collapse the burst of events an editor save produces.
        tokio::time::sleep(self.options.debounce).await;
        self.subscription.settle();
        true
    }

    fn finish(&mut self, state: BuilderState, query: Option<String>, plan: Plan) -> RunReport {
        self.state = state;
        let next: GeneratedPageSet = plan.pages.iter().map(|p| p.path.clone()).collect();
        let created: Vec<String> = plan.pages.iter().map(|p| p.path.clone()).collect();

        if self.state == BuilderState::Succeeded {
            self.log_pages(&plan.pages);
        }
        for page in plan.pages {
            self.sink.create_page(page);
        }

        let removed = self.generated.stale(&next);
        for path in &removed {
            self.sink.delete_page(path, &self.route.absolute);
        }
        if !removed.is_empty() {
            log!("collection"; "removed {} stale pages from {}", removed.len(), self.route.file_path);
        }

        self.generated = next;
        self.arm(query.as_deref());
        self.state = BuilderState::Watching;

        RunReport {
            state,
            query,
            created,
            removed,
            skipped: plan.skipped,
        }
    }

    fn log_pages(&self, pages: &[PageRequest]) {
        if pages.is_empty() {
            log!("warn"; "{}: the query returned no records", self.route.file_path);
            return;
        }
        log!("collection"; "creating {} pages from {}", pages.len(), self.route.file_path);
        for page in pages {
            log!("collection"; "  {}", page.match_path.as_deref().unwrap_or(&page.path));
        }
    }

    /// Watch the component itself plus whatever the query reads.
    fn arm(&self, query: Option<&str>) {
        let mut paths: Vec<PathBuf> = vec![self.route.absolute.clone()];
        if let Some(query) = query {
            paths.extend(self.engine.dependencies(query));
        }

        if let Err(e) = self.notifier.watch(&self.subscription, &paths) {
            log!("watch"; "{}: {:#}", self.route.file_path, e);
        }
    }
}
