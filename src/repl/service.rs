//! Service façade
//!
//! Construction of the workspace, store, highlighter, completion and
//! handlers runs once, in a background task spawned when the service starts.
//! Every operation first waits for that task's outcome, then upserts the
//! line and hands it to the component doing the work. Dropping a waiting
//! operation never affects the construction.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info};

use super::commands::Dispatcher;
use super::completion::{CompletionItem, CompletionSynthesizer};
use super::engine::{Evaluator, LineId, SourceUnit, SubmissionStore};
use super::highlight::{ColorSpan, Highlighter};
use super::result::LineEvaluationResult;
use super::ReplError;
use crate::references::{CatalogInstaller, DefaultReferences, PackageInstaller};
use crate::runtime::EvaluationLogger;
use crate::util::config::{Color, UserConfiguration};
use crate::workspace::{Workspace, WorkspaceSummary};

/// Theme colors announced once the highlighter exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationLoaded {
    pub background: Color,
    pub foreground: Color,
}

/// Receives service lifecycle events
pub trait ServiceObserver: Send + Sync {
    fn on_configuration_loaded(
        &self,
        event: &ConfigurationLoaded,
    );
}

/// Components built by the background initialization
struct Services {
    store: Arc<SubmissionStore>,
    highlighter: Highlighter,
    completion: CompletionSynthesizer,
    dispatcher: Dispatcher,
}

/// Outcome of the background construction; `None` while it runs
type InitState = Option<Result<Arc<Services>, String>>;

struct Inner {
    config: UserConfiguration,
    observer_count: usize,
    ready: watch::Receiver<InitState>,
}

/// Configures and starts a [`ReplService`]
pub struct ReplServiceBuilder {
    config: UserConfiguration,
    installer: Arc<dyn PackageInstaller>,
    observers: Vec<Arc<dyn ServiceObserver>>,
}

impl ReplServiceBuilder {
    pub fn new(config: UserConfiguration) -> Self {
        Self {
            config,
            installer: Arc::new(CatalogInstaller),
            observers: Vec::new(),
        }
    }

    pub fn package_installer(
        mut self,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        self.installer = installer;
        self
    }

    /// Register an observer; it sees every event of the started service
    pub fn observer(
        mut self,
        observer: Arc<dyn ServiceObserver>,
    ) -> Self {
        self.observers.push(observer);
        self
    }

    /// Start background initialization and return the service right away
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> ReplService {
        let (sender, ready) = watch::channel(None);
        let inner = Arc::new(Inner {
            config: self.config.clone(),
            observer_count: self.observers.len(),
            ready,
        });

        tokio::spawn(async move {
            let outcome = match tokio::task::spawn_blocking(move || build(&self)).await {
                Ok(services) => Ok(Arc::new(services)),
                Err(e) => {
                    error!("REPL initialization failed: {}", e);
                    Err(e.to_string())
                }
            };
            sender.send_replace(Some(outcome));
        });
        ReplService { inner }
    }
}

/// Front-end entry point: completion, highlighting and evaluation by line id
#[derive(Clone)]
pub struct ReplService {
    inner: Arc<Inner>,
}

impl ReplService {
    /// Start with the default installer and no observers
    pub fn start(config: UserConfiguration) -> Self {
        ReplServiceBuilder::new(config).start()
    }

    pub fn config(&self) -> &UserConfiguration {
        &self.inner.config
    }

    /// Whether background initialization has finished
    pub fn is_initialized(&self) -> bool {
        matches!(*self.inner.ready.borrow(), Some(Ok(_)))
    }

    /// Wait for initialization without doing anything else
    pub async fn ready(&self) -> Result<(), ReplError> {
        self.services().await.map(|_| ())
    }

    /// Completions for `code` on `line_id` at byte offset `caret`
    pub async fn complete_code(
        &self,
        line_id: LineId,
        code: &str,
        caret: usize,
    ) -> Result<Vec<CompletionItem>, ReplError> {
        let services = self.services().await?;
        let code = code.to_string();
        let items = tokio::task::spawn_blocking(move || {
            let unit = services.store.create_or_update(line_id, &code, &[]);
            services.completion.complete(&unit, caret)
        })
        .await?;
        Ok(items)
    }

    /// Color spans for `code` on `line_id`
    pub async fn highlight(
        &self,
        line_id: LineId,
        code: &str,
    ) -> Result<Vec<ColorSpan>, ReplError> {
        let services = self.services().await?;
        let code = code.to_string();
        let spans = tokio::task::spawn_blocking(move || {
            let unit = services.store.create_or_update(line_id, &code, &[]);
            services.highlighter.highlight(&unit)
        })
        .await?;
        Ok(spans)
    }

    /// Run `code` as `line_id` through the first handler that accepts it
    ///
    /// Errors only when no handler accepts the code or the task dies;
    /// compile and runtime failures are part of the returned result.
    pub async fn evaluate(
        &self,
        line_id: LineId,
        code: &str,
        logger: Arc<dyn EvaluationLogger>,
    ) -> Result<LineEvaluationResult, ReplError> {
        let services = self.services().await?;
        let code = code.to_string();
        tokio::task::spawn_blocking(move || -> Result<LineEvaluationResult, ReplError> {
            services.store.create_or_update(line_id, &code, &[]);
            let handler = services.dispatcher.dispatch(&code)?;
            debug!("Line {} handled by {}", line_id, handler.name());
            Ok(handler.handle(line_id, &code, logger.as_ref()))
        })
        .await?
    }

    /// Every known line, ordered by id
    pub async fn lines(&self) -> Result<Vec<SourceUnit>, ReplError> {
        Ok(self.services().await?.store.lines())
    }

    pub async fn summary(&self) -> Result<WorkspaceSummary, ReplError> {
        Ok(self.services().await?.store.workspace().summary())
    }

    /// The initialization barrier; waits for the one background construction
    async fn services(&self) -> Result<Arc<Services>, ReplError> {
        let mut ready = self.inner.ready.clone();
        let state = ready
            .wait_for(|state| state.is_some())
            .await
            .map_err(|_| ReplError::Initialization("initialization task stopped".to_string()))?;
        match &*state {
            Some(Ok(services)) => Ok(Arc::clone(services)),
            Some(Err(e)) => Err(ReplError::Initialization(e.clone())),
            None => Err(ReplError::Initialization("initialization did not finish".to_string())),
        }
    }
}

impl std::fmt::Debug for ReplService {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReplService")
            .field("initialized", &self.is_initialized())
            .field("observers", &self.inner.observer_count)
            .finish()
    }
}

fn build(setup: &ReplServiceBuilder) -> Services {
    let started = Instant::now();
    let config = &setup.config;

    let defaults = DefaultReferences::with_config(&config.references);
    let workspace = Arc::new(Workspace::new(defaults));
    let store = Arc::new(SubmissionStore::new(Arc::clone(&workspace)));

    let highlighter = Highlighter::new(config.theme.clone());
    let event = ConfigurationLoaded {
        background: highlighter.theme().background,
        foreground: highlighter.theme().foreground,
    };
    for observer in &setup.observers {
        observer.on_configuration_loaded(&event);
    }

    let completion = CompletionSynthesizer::new(workspace, store.chain_builder().clone());
    let dispatcher = Dispatcher::standard(
        Arc::clone(&store),
        Evaluator::new(config.repl.max_steps),
        Arc::clone(&setup.installer),
    );

    info!(
        "REPL services ready in {:?} (handlers: {})",
        started.elapsed(),
        dispatcher.handler_names().join(", ")
    );
    Services {
        store,
        highlighter,
        completion,
        dispatcher,
    }
}
