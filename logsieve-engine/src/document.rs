//! One opened log and the worker thread that owns its heavy work.
//!
//! Every document runs a single worker thread. Ingestion, re-filtering and
//! search are queued to it in submission order, so two rebuilds or two
//! searches of the same document never overlap:
//!
//! ```text
//!  caller ──ingest/apply/search──> [ command queue ] ──> worker
//!                                                          │ snapshot under read lock
//!                                                          │ compute with no lock
//!                                                          │ swap under write lock
//!  caller <──── DocumentEvent ───── EventBus <─────────────┘
//! ```
//!
//! Readers take the read lock on the published [`DocumentState`] and always
//! see either the old or the new state, never a half-written one. Marks and
//! search navigation are cheap and applied on the caller's thread; they only
//! wait for the short snapshot and swap sections, never for a rebuild or a scan.
//!
//! Closing a document never waits for its worker: [`Document::detach`] tells
//! the worker to drop whatever is still queued and lets it finish on its own.

use crate::{
    annotate::{StyledSpan, annotate, annotate_with_search},
    config::EngineConfig,
    error::{EngineError, Result},
    events::{DocumentEvent, EventBus},
    line_store::{ApplyOutcome, LineStore},
    log_line::LogLine,
    operation::TextOperation,
    search::{self, SearchEngine},
    source::{LineSource, SourceKind},
};
use parking_lot::{RwLock, RwLockReadGuard};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Instant,
};
use uuid::Uuid;

/// published state of a document
pub struct DocumentState {
    store: LineStore,
    search: SearchEngine,
}

impl DocumentState {
    pub fn store(&self) -> &LineStore {
        &self.store
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    /// highlight spans for panels without a search overlay
    pub fn annotate(&self, line: &LogLine) -> Vec<StyledSpan> {
        annotate(line.content(), self.store.highlight_operations())
    }

    /// highlight spans plus this line's search matches
    pub fn annotate_with_search(&self, line: &LogLine) -> Vec<StyledSpan> {
        annotate_with_search(
            line.content(),
            self.store.highlight_operations(),
            self.search.matches_for_line(line.line_number()),
            self.search.current_ordinal(),
        )
    }
}

enum Command {
    Ingest,
    ApplyOperations(Vec<TextOperation>),
    Search { query: String, first_visible: usize },
    Barrier(Sender<()>),
}

struct Shared {
    page: Uuid,
    source: LineSource,
    state: RwLock<DocumentState>,
    render_version: AtomicU64,
    /// set once the document is closed; queued work is skipped
    stopping: AtomicBool,
    bus: EventBus<DocumentEvent>,
}

impl Shared {
    fn bump(&self) {
        self.render_version.fetch_add(1, Ordering::AcqRel);
    }

    fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }
}

pub struct Document {
    id: Uuid,
    name: String,
    shared: Arc<Shared>,
    commands: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Document {
    /// start a worker for `source` and queue its ingestion
    pub fn open(source: LineSource, config: &EngineConfig, bus: EventBus<DocumentEvent>) -> Self {
        let id = Uuid::new_v4();
        let name = source.display_name();
        let shared = Arc::new(Shared {
            page: id,
            source,
            state: RwLock::new(DocumentState {
                store: LineStore::new(config.filter_engine()),
                search: SearchEngine::new(),
            }),
            render_version: AtomicU64::new(0),
            stopping: AtomicBool::new(false),
            bus,
        });

        let (tx, rx) = mpsc::channel();
        let worker = spawn_worker(shared.clone(), rx);
        // the receiver is alive until the sender is dropped, so this cannot fail
        let _ = tx.send(Command::Ingest);

        Self {
            id,
            name,
            shared,
            commands: Some(tx),
            worker: Some(worker),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_kind(&self) -> SourceKind {
        self.shared.source.kind()
    }

    pub fn source_ref(&self) -> String {
        self.shared.source.source_ref()
    }

    /// current published state; hold the guard briefly
    pub fn read(&self) -> RwLockReadGuard<'_, DocumentState> {
        self.shared.state.read()
    }

    /// bumped whenever anything a view renders may have changed
    pub fn render_version(&self) -> u64 {
        self.shared.render_version.load(Ordering::Acquire)
    }

    /// queue a new operation list, replacing the current one
    pub fn apply_operations(&self, operations: Vec<TextOperation>) -> Result<()> {
        self.send(Command::ApplyOperations(operations))
    }

    /// validate and queue a search over the filtered lines
    pub fn search(&self, query: &str, first_visible: usize) -> Result<()> {
        let query = search::validate_query(query)?;
        self.send(Command::Search {
            query: query.to_string(),
            first_visible,
        })
    }

    pub fn search_previous(&self) {
        self.shared.state.write().search.previous();
        self.shared.bump();
    }

    pub fn search_next(&self) {
        self.shared.state.write().search.next();
        self.shared.bump();
    }

    pub fn stop_search(&self) {
        self.shared.state.write().search.stop();
        self.shared.bump();
    }

    /// returns false when no such line exists
    pub fn set_mark(&self, line_number: usize, marked: bool) -> bool {
        let found = self.shared.state.write().store.set_mark(line_number, marked);
        if found {
            self.shared.bump();
        }
        found
    }

    pub fn toggle_mark(&self, line_number: usize) -> bool {
        let found = self.shared.state.write().store.toggle_mark(line_number);
        if found {
            self.shared.bump();
        }
        found
    }

    pub fn clear_marks(&self) {
        self.shared.state.write().store.clear_marks();
        self.shared.bump();
    }

    /// block until every command queued so far has been processed
    pub fn wait_idle(&self) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        self.send(Command::Barrier(tx))?;
        rx.recv().map_err(|_| EngineError::WorkerGone)
    }

    /// close without waiting: pending work is dropped and the worker exits
    /// on its own once the command it is running returns
    pub fn detach(mut self) {
        self.shared.stopping.store(true, Ordering::Release);
        self.commands.take();
        if self.worker.take().is_some() {
            log::debug!("Document worker {} detached", self.id);
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .as_ref()
            .ok_or(EngineError::WorkerGone)?
            .send(command)
            .map_err(|_| EngineError::WorkerGone)
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        // closing the queue ends the worker loop
        self.shared.stopping.store(true, Ordering::Release);
        self.commands.take();
        if let Some(handle) = self.worker.take()
            && let Err(e) = handle.join()
        {
            log::error!("Document worker panicked: {:?}", e);
        }
    }
}

fn spawn_worker(shared: Arc<Shared>, commands: Receiver<Command>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        log::debug!("Document worker {} started", shared.page);

        for command in commands {
            if shared.is_stopping() {
                // barriers are still answered so nobody waits forever
                if let Command::Barrier(done) = command {
                    let _ = done.send(());
                }
                continue;
            }
            match command {
                Command::Ingest => ingest(&shared),
                Command::ApplyOperations(operations) => apply_operations(&shared, &operations),
                Command::Search {
                    query,
                    first_visible,
                } => run_search(&shared, query, first_visible),
                Command::Barrier(done) => {
                    let _ = done.send(());
                }
            }
        }

        log::debug!("Document worker {} stopped", shared.page);
    })
}

fn ingest(shared: &Shared) {
    shared.state.write().store.begin_loading();
    let start = Instant::now();

    match shared.source.read_lines() {
        Ok(lines) => {
            let count = lines.len();
            {
                let mut state = shared.state.write();
                state.store.load(lines);
                state.search.stop();
            }
            shared.bump();
            log::debug!(
                "Loaded {} lines from {} in {:?}",
                count,
                shared.source.display_name(),
                start.elapsed()
            );
            shared.bus.publish(DocumentEvent::Loaded {
                page: shared.page,
                lines: count,
            });
        }
        Err(e) => {
            log::warn!("Ingestion failed: {}", e);
            shared.state.write().store.fail_loading();
            shared.bus.publish(DocumentEvent::IngestionFailed {
                page: shared.page,
                message: e.to_string(),
            });
        }
    }
}

fn apply_operations(shared: &Shared, operations: &[TextOperation]) {
    let start = Instant::now();
    // the worker is the only writer of operations and lines, so the plan is
    // still valid at commit time; marks set meanwhile live outside it
    let plan = shared.state.read().store.plan_operations(operations);

    let outcome = match plan.map(|plan| plan.compute()) {
        Some(update) => {
            let mut state = shared.state.write();
            let outcome = state.store.commit(update);
            state.search.stop();
            outcome
        }
        None => ApplyOutcome::Unchanged,
    };

    if outcome.is_changed() {
        shared.bump();
    }
    log::debug!(
        "Applied {} operations in {:?} (rebuilt: {})",
        operations.len(),
        start.elapsed(),
        outcome.filtered_rebuilt()
    );

    if let ApplyOutcome::Changed { pattern_errors, .. } = &outcome {
        for error in pattern_errors {
            shared.bus.publish(DocumentEvent::PatternRejected {
                page: shared.page,
                error: error.clone(),
            });
        }
    }
    shared.bus.publish(DocumentEvent::OperationsApplied {
        page: shared.page,
        outcome,
    });
}

fn run_search(shared: &Shared, query: String, first_visible: usize) {
    let lines = shared.state.read().store.snapshot();
    let results = search::find_matches(&query, &lines);

    if results.is_empty() {
        shared.bus.publish(DocumentEvent::SearchNotFound {
            page: shared.page,
            query,
        });
        return;
    }

    let outcome = shared.state.write().search.publish(&query, results);
    shared.bump();
    if let search::SearchOutcome::Found { total, jump_index } = outcome {
        shared.bus.publish(DocumentEvent::SearchFinished {
            page: shared.page,
            total,
            jump_index,
            first_visible,
        });
    }
}
