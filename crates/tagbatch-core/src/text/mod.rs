//! Text normalization for interrogation output.
//!
//! Pure string transforms, leaves of the pipeline:
//! - **normalize**: dedup, attention stripping, punctuation and underscore passes
//! - **filter**: overlap filtering against a reference prompt
//! - **replace**: user-defined whole-word find/replace pairs
//! - **emoticons**: allow-lists the punctuation and underscore passes respect

pub mod emoticons;
pub mod filter;
pub mod normalize;
pub mod replace;

pub use filter::filter_overlap;
pub use normalize::{
    dedup_comma_list, normalize_underscore, split_segments, strip_attention_syntax,
    strip_punctuation_preserving_emoticons,
};
pub use replace::ReplacePairSet;
