//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File I/O with consistent error handling
//! - `parser` - Bracket- and quote-aware argument scanning
//! - `template` - String template rendering

pub mod io;
pub mod parser;
pub(crate) mod template;
