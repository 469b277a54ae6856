//! # logsieve-engine
//!
//! The line-processing engine behind the `logsieve` log viewer: load a log,
//! then filter, shield, highlight, search and mark its lines while keeping
//! several views of the same content in sync.
//!
//! ## Overview
//!
//! A front end opens [`LineSource`]s in a [`Session`]. Each opened source is a
//! [`Document`] with its own worker thread; the front end submits operation
//! lists and search queries, and reads back ordered line lists and styled
//! spans ready for rendering.
//!
//! ## Core Concepts
//!
//! ### Text Operations
//!
//! - **Filter**: keep only lines containing the text (all lines if there is no filter)
//! - **Shield**: hide lines containing the text
//! - **Highlight**: color the text, never hides anything
//! - **RegexFilter / RegexShield**: regular-expression variants
//!
//! Operations are identified by text alone. The [`OperationBar`] keeps the
//! user's list, rejects duplicates and hands out palette colors.
//!
//! ### Views
//!
//! Every document has three synchronized [`Panel`]s: the whole list, the
//! filtered list (a subsequence of the whole list) and the marked list (lines
//! the user flagged, independent of filtering). Jumping between panels
//! resolves a line number to the nearest preceding visible line.
//!
//! ### Change Detection
//!
//! Submitting a list that is set-equal to the current one is a no-op, and the
//! filtered list is only rebuilt when the filter or shield operations change.
//! Highlight-only edits just restyle.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logsieve_engine::{EngineConfig, LineSource, OperationBar, OperationKind, Session};
//!
//! # fn main() -> logsieve_engine::Result<()> {
//! let mut session = Session::new(EngineConfig::default());
//! let events = session.subscribe();
//! let doc = session.open(LineSource::File("/var/log/system.log".into()));
//!
//! let mut bar = OperationBar::new();
//! bar.add("error", OperationKind::Filter)?;
//! bar.add("heartbeat", OperationKind::Shield)?;
//! doc.apply_operations(bar.active())?;
//! doc.search("timeout", 0)?;
//! doc.wait_idle()?;
//!
//! let state = doc.read();
//! for line in state.store().filtered() {
//!     let spans = state.annotate_with_search(line);
//!     println!("{} {} ({} styled spans)", line.line_number(), line.content(), spans.len());
//! }
//! # drop(events);
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! - Re-filtering is linear in the document size and runs on the document
//!   worker; large documents are filtered in parallel with rayon
//! - Regex operations are compiled once per rebuild
//! - Filtering and search run on shared snapshots with no lock held; results
//!   are published by swapping under a short write lock

pub mod annotate;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod filter;
pub mod line_store;
pub mod log_line;
pub mod operation;
pub mod search;
pub mod session;
pub mod source;
pub mod theme;

// re-export commonly used types
pub use annotate::{StyleTag, StyledSpan, annotate, annotate_with_search, flatten, to_line};
pub use config::EngineConfig;
pub use document::{Document, DocumentState};
pub use error::{EngineError, PatternError, Result};
pub use events::{DocumentEvent, EventBus};
pub use filter::{is_shielded, matches, passes};
pub use line_store::{
    ApplyOutcome, ExportStyle, LineSnapshot, LineStore, LoadState, OperationPlan, Panel,
    index_for_line_number,
};
pub use log_line::{LINE_SENTINEL, LogLine, copy_lines, restore_line_breaks};
pub use operation::{
    OperationBar, OperationKind, TextOperation, active_operations, same_operations,
};
pub use search::{SearchEngine, SearchMatch, SearchOutcome, validate_query};
pub use session::Session;
pub use source::{LineSource, SourceKind};
