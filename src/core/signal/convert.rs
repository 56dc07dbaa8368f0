use serde::Serialize;

use super::{matcher, rewrite, SiteKind};
use crate::registry::Registry;
use crate::report::{self, ErrorRecord, SourceSpan};

/// A block of source text and the one-based line it starts on.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub first_line: usize,
}

impl<'a> Fragment<'a> {
    /// Lines are one-based; a `first_line` of 0 is taken as 1.
    pub fn new(text: &'a str, first_line: usize) -> Self {
        Self {
            text,
            first_line: first_line.max(1),
        }
    }
}

/// A single applied replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rewrite {
    pub line: usize,
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FragmentOutcome {
    #[serde(skip)]
    pub text: String,
    pub changed: bool,
    pub rewrites: Vec<Rewrite>,
    pub unfixable: Vec<ErrorRecord>,
}

/// Rewrite every old-style call in the fragment.
///
/// Unfixable sites are filed into `registry` and left as written; the rest
/// of the fragment is still converted.
pub fn convert_fragment(fragment: &Fragment, registry: &mut Registry) -> FragmentOutcome {
    let text = fragment.text;
    let mut out = String::with_capacity(text.len());
    let mut rewrites = Vec::new();
    let mut unfixable = Vec::new();
    let mut cursor = 0;

    for site in matcher::scan(text) {
        let original = &text[site.range.clone()];
        let span = SourceSpan::from_offsets(text, &site.range, fragment.first_line);

        match site.kind {
            SiteKind::Rewrite(mut occurrence) => {
                if let Some(arguments) = site.arguments.filter(|r| !r.is_empty()) {
                    let at = arguments.start..arguments.start;
                    let line = SourceSpan::from_offsets(text, &at, fragment.first_line).start_line;
                    let nested = convert_fragment(&Fragment::new(&text[arguments], line), registry);
                    occurrence.argument_text = nested.text;
                    rewrites.extend(nested.rewrites);
                    unfixable.extend(nested.unfixable);
                }

                let replacement = rewrite::render(&occurrence);
                crate::log_status!(
                    "convert",
                    "Replacing \"{}\" with \"{}\" at line {}",
                    original,
                    replacement,
                    span.start_line
                );
                out.push_str(&text[cursor..site.range.start]);
                out.push_str(&replacement);
                cursor = site.range.end;
                rewrites.push(Rewrite {
                    line: span.start_line,
                    original: original.to_string(),
                    replacement,
                });
            }
            SiteKind::Unfixable(kind) => {
                crate::log_status!("convert", "Cannot fix line {}: {}", span.start_line, kind);
                unfixable.push(report::report(registry, span, kind.to_string()));
            }
        }
    }

    if rewrites.is_empty() {
        return FragmentOutcome {
            text: text.to_string(),
            changed: false,
            rewrites,
            unfixable,
        };
    }

    out.push_str(&text[cursor..]);
    FragmentOutcome {
        changed: out != text,
        text: out,
        rewrites,
        unfixable,
    }
}

/// Convert a whole source text as a single fragment starting at line 1.
pub fn convert_source(text: &str, registry: &mut Registry) -> FragmentOutcome {
    convert_fragment(&Fragment::new(text, 1), registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryKey;
    use crate::settings::Settings;

    fn registry() -> Registry {
        Registry::new(Settings::default())
    }

    #[test]
    fn connect_round_trip() {
        let mut reg = registry();
        let out = convert_source(
            r#"self.connect(obj, QtCore.SIGNAL("valueChanged(int)"), self.onValueChanged)"#,
            &mut reg,
        );
        assert_eq!(out.text, "obj.valueChanged.connect(self.onValueChanged)");
        assert!(out.changed);
        assert!(reg.is_empty());
    }

    #[test]
    fn emit_round_trip() {
        let mut reg = registry();
        let out = convert_source(r#"obj.emit(QtCore.SIGNAL("valueChanged(int)"), 5)"#, &mut reg);
        assert_eq!(out.text, "obj.valueChanged.emit(5)");
    }

    #[test]
    fn no_match_is_byte_identical_and_records_nothing() {
        let mut reg = registry();
        let text = "def f(self):\n    self.clicked.connect(self.go)  \r\n\treturn 'connect(x)'\n";
        let out = convert_source(text, &mut reg);
        assert_eq!(out.text, text);
        assert!(!out.changed);
        assert!(out.rewrites.is_empty());
        assert!(reg.is_empty());
    }

    #[test]
    fn independent_connects_do_not_cross_contaminate() {
        let mut reg = registry();
        let text = concat!(
            "    self.connect(a, SIGNAL(\"first(int)\"), self.one)\n",
            "    self.connect(b, SIGNAL(\"second()\"), self.two)\n",
        );
        let out = convert_source(text, &mut reg);
        assert_eq!(
            out.text,
            "    a.first.connect(self.one)\n    b.second.connect(self.two)\n"
        );
        assert_eq!(out.rewrites.len(), 2);
        assert_eq!(out.rewrites[0].line, 1);
        assert_eq!(out.rewrites[1].line, 2);
    }

    #[test]
    fn unfixable_site_is_left_untouched_and_recorded() {
        let mut reg = registry();
        let text = concat!(
            "def setup(self):\n",
            "    self.connect(a, SIGNAL(\"x()\"),\n",
            "                 b, SLOT(\"y()\"))\n",
            "    self.emit(SIGNAL(\"ready()\"))\n",
        );
        let out = convert_fragment(&Fragment::new(text, 20), &mut reg);

        assert!(out.text.contains("self.connect(a, SIGNAL(\"x()\"),\n                 b, SLOT(\"y()\"))"));
        assert!(out.text.ends_with("    self.ready.emit()\n"));
        assert_eq!(out.unfixable.len(), 1);
        assert_eq!(out.unfixable[0].row, 20);
        assert_eq!(out.unfixable[0].row_to, 21);
        assert_eq!(reg.len(RegistryKey::Errors), 1);
    }

    #[test]
    fn only_unfixable_sites_leave_text_unchanged() {
        let mut reg = registry();
        let text = "self.emit(SIGNAL(name))";
        let out = convert_source(text, &mut reg);
        assert_eq!(out.text, text);
        assert!(!out.changed);
        assert_eq!(out.unfixable.len(), 1);
    }

    #[test]
    fn old_style_call_nested_in_slot_is_converted() {
        let mut reg = registry();
        let out = convert_source(
            r#"self.connect(btn, SIGNAL("clicked()"), lambda: self.emit(SIGNAL("go()")))"#,
            &mut reg,
        );
        assert_eq!(out.text, "btn.clicked.connect(lambda: self.go.emit())");
        assert_eq!(out.rewrites.len(), 2);
        assert!(reg.is_empty());
    }

    #[test]
    fn unfixable_call_nested_in_slot_is_reported() {
        let mut reg = registry();
        let text = concat!(
            "self.connect(btn, SIGNAL(\"clicked()\"),\n",
            "             lambda: self.emit(SIGNAL(name)))\n",
        );
        let out = convert_fragment(&Fragment::new(text, 7), &mut reg);

        assert_eq!(
            out.text,
            "btn.clicked.connect(lambda: self.emit(SIGNAL(name)))\n"
        );
        assert_eq!(out.unfixable.len(), 1);
        assert_eq!(out.unfixable[0].row, 7);
        assert_eq!(reg.len(RegistryKey::Errors), 1);
    }

    #[test]
    fn nested_emit_arguments_are_converted() {
        let mut reg = registry();
        let out = convert_source(
            r#"self.emit(SIGNAL("relay(PyQt_PyObject)"), lambda: obj.emit(SIGNAL("done()"), 1))"#,
            &mut reg,
        );
        assert_eq!(out.text, "self.relay.emit(lambda: obj.done.emit(1))");
    }

    #[test]
    fn zero_first_line_counts_from_one() {
        let fragment = Fragment::new("\nself.emit(SIGNAL(name))\n", 0);
        assert_eq!(fragment.first_line, 1);

        let mut reg = registry();
        let out = convert_fragment(&fragment, &mut reg);
        assert_eq!(out.unfixable[0].row, 1);
    }
}
