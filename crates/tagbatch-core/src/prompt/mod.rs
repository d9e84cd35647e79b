//! Prompt composition and contamination bookkeeping.
//!
//! - **composer**: placement of interrogation text and write-back into a job
//! - **contamination**: per-session record of the last injected text
//! - **preview**: labelled preview of an insertion point

pub mod composer;
pub mod contamination;
pub mod preview;

pub use composer::{
    compose, finalize_interrogation, strip_extra_networks, target_field, ComposedPrompt,
};
pub use contamination::ContaminationTracker;
pub use preview::{insertion_preview, InsertionPreview, PreviewSegment, SegmentLabel};
