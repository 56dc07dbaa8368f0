//! Render recognized occurrences in attribute-based signal syntax.

use super::{Occurrence, OccurrenceKind};
use crate::utils::template;

pub const CONNECT_TEMPLATE: &str = "{owner}.{signal}.connect({slot})";
pub const EMIT_TEMPLATE: &str = "{owner}.{signal}.emit({args})";

/// Render the new-style call for an occurrence.
///
/// CONNECT drops the old type signature entirely; new-style connections need
/// no annotation. EMIT copies the trailing arguments exactly as written: they
/// are live expressions and never go through a split/rejoin round trip.
/// An empty owner is rendered as-is.
pub fn render(occurrence: &Occurrence) -> String {
    let (template, arg_key) = match occurrence.kind {
        OccurrenceKind::Connect => (CONNECT_TEMPLATE, "slot"),
        OccurrenceKind::Emit => (EMIT_TEMPLATE, "args"),
    };
    template::render(
        template,
        &[
            ("owner", occurrence.owner.as_str()),
            ("signal", occurrence.signal_name.as_str()),
            (arg_key, occurrence.argument_text.as_str()),
        ],
    )
}
