//! Old-style signal call migration.
//!
//! Finds `connect(owner, SIGNAL("name(types)"), slot)` and
//! `owner.emit(SIGNAL("name(types)"), args...)` calls in a fragment of
//! Python source and rewrites them to `owner.name.connect(slot)` and
//! `owner.name.emit(args...)`.
//!
//! 1. `matcher` locates call sites and classifies each one
//! 2. `rewrite` renders rewritable sites
//! 3. `convert` splices replacements back and reports the rest

mod convert;
mod matcher;
mod rewrite;

pub use convert::{convert_fragment, convert_source, Fragment, FragmentOutcome, Rewrite};
pub use matcher::scan;
pub use rewrite::{render, CONNECT_TEMPLATE, EMIT_TEMPLATE};

use serde::Serialize;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    Connect,
    Emit,
}

/// A rewritable old-style call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub owner: String,
    pub signal_name: String,
    /// Type list from the descriptor, e.g. `int` in `"valueChanged(int)"`.
    pub signature_text: String,
    /// The slot for CONNECT, the verbatim trailing arguments for EMIT.
    pub argument_text: String,
    pub kind: OccurrenceKind,
}

/// Why a recognized old-style call cannot be rewritten automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnfixableKind {
    SignalNotLiteral,
    UnexpectedArity { found: usize },
    SlotDescriptor,
    ComplexReceiver,
    MissingOwner,
}

impl fmt::Display for UnfixableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnfixableKind::SignalNotLiteral => {
                write!(f, "SIGNAL() is built from an expression, not a string literal")
            }
            UnfixableKind::UnexpectedArity { found } => write!(
                f,
                "connect() with {} arguments has no direct new-style equivalent",
                found
            ),
            UnfixableKind::SlotDescriptor => {
                write!(f, "SLOT() strings must be replaced with a callable by hand")
            }
            UnfixableKind::ComplexReceiver => {
                write!(f, "Call receiver is an expression that cannot be rewritten in place")
            }
            UnfixableKind::MissingOwner => write!(f, "emit() is called without an owner"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKind {
    Rewrite(Occurrence),
    Unfixable(UnfixableKind),
}

/// A recognized call and the byte range it covers in the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub range: Range<usize>,
    /// Where the slot or emitted arguments sit, for rewritable sites. Old-style
    /// calls nested in that text are converted on their own.
    pub arguments: Option<Range<usize>>,
    pub kind: SiteKind,
}
