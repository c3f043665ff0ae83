//! Listening progress.
//!
//! `ProgressTracker` owns saved positions, the completion history and the
//! last-listened pointer. Audio devices are reached only through an
//! explicit [`PlaybackSession`].

pub mod session;
pub mod tracker;

pub use session::{format_time, PlaybackDevice, PlaybackSession};
pub use tracker::{
    CompletionEntry, CompletionPolicy, LastListened, ListeningHistory, PlaybackState,
    ProgressFilter, ProgressKey, ProgressRecord, ProgressTracker,
};
