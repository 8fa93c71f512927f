//! Client-side list controllers shared by the feed, category and comment
//! pages.
//!
//! - [`retry`] - bounded, immediate retry of a remote call
//! - [`debounce`] - trailing/leading-edge debouncing for input and scroll
//! - [`pagination`] - deduplicated infinite-scroll collections
//! - [`optimistic`] - optimistic comment/reply submission with rollback
//!
//! All controllers are cheap-to-clone handles over shared state. Mutations
//! take a short lock and never hold it across an await, so UI callbacks and
//! network completions interleave safely.

pub mod debounce;
pub mod optimistic;
pub mod pagination;
pub mod retry;

pub use debounce::{Debouncer, Edge};
pub use optimistic::{
    CreateSink, EntryKey, EntryStatus, OptimisticThread, PendingSubmit, SubmitError,
    SubmitOutcome, TempId, ThreadEntry, UserMessage,
};
pub use pagination::{ListStatus, LoadOutcome, PageSource, Paginator, ScrollPosition};
pub use retry::{with_retry, with_retry_if, Retryable};
