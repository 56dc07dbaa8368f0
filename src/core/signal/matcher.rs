//! Locate old-style `connect`/`emit` calls in a source fragment.
//!
//! A regex finds each call head (`receiver.connect(` or `owner.emit(`); the
//! argument region is then bounded with `find_closing`, which tracks bracket
//! depth and string literals. A shortest-match pattern over the whole call
//! (`connect\((.*?)\)`) stops at the first `)` and cuts nested calls such as
//! `connect(self.model(), SIGNAL("reset()"), self.refresh)` short, so
//! argument boundaries are never left to a regex.
//!
//! Sites are returned left to right and never overlap. A call whose
//! descriptor argument is not a `SIGNAL(...)` form is not old-style and is
//! skipped without a trace.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::{Occurrence, OccurrenceKind, Site, SiteKind, UnfixableKind};
use crate::utils::parser::{find_closing, split_args, top_level_commas};

static CALL_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<recv>(?:[A-Za-z_]\w*\.)*)(?P<verb>connect|emit)\s*\(")
        .expect("call head pattern is valid")
});

static DESCRIPTOR_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_]\w*\.)*(?P<func>SIGNAL|SLOT)\s*\(")
        .expect("descriptor head pattern is valid")
});

static DESCRIPTOR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[uUbBrR]{0,2}(?:'(?P<sq_name>\w+)(?:\((?P<sq_sig>[^']*)\))?'|"(?P<dq_name>\w+)(?:\((?P<dq_sig>[^"]*)\))?")$"#,
    )
    .expect("descriptor literal pattern is valid")
});

#[derive(Debug, PartialEq)]
enum Descriptor {
    /// Not a `SIGNAL(...)`/`SLOT(...)` call at all.
    Absent,
    Slot,
    NonLiteral,
    Literal { name: String, signature: String },
}

fn parse_descriptor(arg: &str) -> Descriptor {
    let arg = arg.trim();
    let Some(head) = DESCRIPTOR_HEAD.captures(arg) else {
        return Descriptor::Absent;
    };
    let Some(whole) = head.get(0) else {
        return Descriptor::Absent;
    };
    let open = whole.end() - 1;

    // The call must span the entire argument: `SIGNAL("a()") + x` is not a descriptor.
    if find_closing(arg, open) != Some(arg.len() - 1) {
        return Descriptor::Absent;
    }
    if &head["func"] == "SLOT" {
        return Descriptor::Slot;
    }

    let inner = arg[open + 1..arg.len() - 1].trim();
    match DESCRIPTOR_LITERAL.captures(inner) {
        Some(caps) => {
            let name = caps.name("sq_name").or_else(|| caps.name("dq_name"));
            let signature = caps.name("sq_sig").or_else(|| caps.name("dq_sig"));
            match name {
                Some(name) => Descriptor::Literal {
                    name: name.as_str().to_string(),
                    signature: signature.map(|m| m.as_str().to_string()).unwrap_or_default(),
                },
                None => Descriptor::NonLiteral,
            }
        }
        None => Descriptor::NonLiteral,
    }
}

/// Scan `text` for old-style signal calls.
pub fn scan(text: &str) -> Vec<Site> {
    let mut sites = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(caps) = CALL_HEAD.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let start = whole.start();
        let open = whole.end() - 1;
        let prev = text[..start].chars().next_back();

        // `reconnect(` / `do_emit(`
        if prev.is_some_and(|c| c.is_alphanumeric() || c == '_') {
            pos = start + 1;
            continue;
        }

        let Some(close) = find_closing(text, open) else {
            pos = whole.end();
            continue;
        };

        let ctx = CallContext {
            receiver: caps["recv"].trim_end_matches('.'),
            chained: prev == Some('.'),
            args: &text[open + 1..close],
        };
        let kind = match &caps["verb"] {
            "connect" => classify_connect(&ctx),
            _ => classify_emit(&ctx),
        };

        match kind {
            Some(kind) => {
                let arguments = match &kind {
                    SiteKind::Rewrite(occurrence) => {
                        Some(argument_range(ctx.args, open + 1, occurrence.kind))
                    }
                    SiteKind::Unfixable(_) => None,
                };
                sites.push(Site {
                    range: start..close + 1,
                    arguments,
                    kind,
                });
                pos = close + 1;
            }
            // Not old-style; keep scanning inside the arguments.
            None => pos = whole.end(),
        }
    }

    sites
}

/// Absolute range of the trimmed text that lands in the rendered call:
/// the slot of a CONNECT, everything after the descriptor of an EMIT.
fn argument_range(args: &str, args_start: usize, kind: OccurrenceKind) -> Range<usize> {
    let skip = match kind {
        OccurrenceKind::Connect => 2,
        OccurrenceKind::Emit => 1,
    };
    let Some(&comma) = top_level_commas(args).get(skip - 1) else {
        let end = args_start + args.len();
        return end..end;
    };
    let tail = &args[comma + 1..];
    let lead = tail.len() - tail.trim_start().len();
    let from = args_start + comma + 1 + lead;
    from..from + tail.trim().len()
}

struct CallContext<'a> {
    /// Dotted name before the verb, without the trailing dot.
    receiver: &'a str,
    /// The call head follows a non-name expression (`f().emit(`).
    chained: bool,
    /// Raw text between the call's parentheses.
    args: &'a str,
}

fn classify_connect(ctx: &CallContext) -> Option<SiteKind> {
    let args = split_args(ctx.args);
    if args.len() < 2 {
        return None;
    }

    let (name, signature) = match parse_descriptor(&args[1]) {
        Descriptor::Absent | Descriptor::Slot => return None,
        Descriptor::NonLiteral => return Some(SiteKind::Unfixable(UnfixableKind::SignalNotLiteral)),
        Descriptor::Literal { name, signature } => (name, signature),
    };

    if ctx.chained {
        return Some(SiteKind::Unfixable(UnfixableKind::ComplexReceiver));
    }
    if args.len() != 3 {
        return Some(SiteKind::Unfixable(UnfixableKind::UnexpectedArity {
            found: args.len(),
        }));
    }
    if parse_descriptor(&args[2]) == Descriptor::Slot {
        return Some(SiteKind::Unfixable(UnfixableKind::SlotDescriptor));
    }

    Some(SiteKind::Rewrite(Occurrence {
        owner: args[0].clone(),
        signal_name: name,
        signature_text: signature,
        argument_text: args[2].clone(),
        kind: OccurrenceKind::Connect,
    }))
}

fn classify_emit(ctx: &CallContext) -> Option<SiteKind> {
    let first_comma = top_level_commas(ctx.args).first().copied();
    let descriptor = &ctx.args[..first_comma.unwrap_or(ctx.args.len())];

    let (name, signature) = match parse_descriptor(descriptor) {
        Descriptor::Absent | Descriptor::Slot => return None,
        Descriptor::NonLiteral => return Some(SiteKind::Unfixable(UnfixableKind::SignalNotLiteral)),
        Descriptor::Literal { name, signature } => (name, signature),
    };

    if ctx.chained {
        return Some(SiteKind::Unfixable(UnfixableKind::ComplexReceiver));
    }
    if ctx.receiver.is_empty() {
        return Some(SiteKind::Unfixable(UnfixableKind::MissingOwner));
    }

    let arguments = first_comma
        .map(|comma| ctx.args[comma + 1..].trim())
        .unwrap_or("");

    Some(SiteKind::Rewrite(Occurrence {
        owner: ctx.receiver.to_string(),
        signal_name: name,
        signature_text: signature,
        argument_text: arguments.to_string(),
        kind: OccurrenceKind::Emit,
    }))
}
