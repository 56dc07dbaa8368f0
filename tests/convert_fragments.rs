use resignal::{convert_fragment, convert_source, Fragment, Registry, RegistryKey, Settings};

fn registry() -> Registry {
    Registry::new(Settings::default())
}

#[test]
fn converts_mixed_module_and_keeps_surrounding_code() {
    let source = r#"from PyQt4 import QtCore


class Spinner(QtCore.QObject):
    def __init__(self, other):
        super(Spinner, self).__init__()
        self.connect(other, QtCore.SIGNAL("valueChanged(int)"), self.on_value)
        QtCore.QObject.connect(self.timer, QtCore.SIGNAL('timeout()'), self.tick)

    def on_value(self, value):
        self.emit(QtCore.SIGNAL("progress(int, QString)"), value * 2, "done, really")
"#;

    let mut reg = registry();
    let out = convert_source(source, &mut reg);

    assert!(out.changed);
    assert_eq!(out.rewrites.len(), 3);
    assert!(out.text.contains("        other.valueChanged.connect(self.on_value)\n"));
    assert!(out.text.contains("        self.timer.timeout.connect(self.tick)\n"));
    assert!(out
        .text
        .contains("        self.progress.emit(value * 2, \"done, really\")\n"));
    assert!(out.text.starts_with("from PyQt4 import QtCore\n\n\nclass Spinner"));
    assert!(out.unfixable.is_empty());
    assert_eq!(reg.len(RegistryKey::Errors), 0);
}

#[test]
fn converted_output_is_a_fixed_point() {
    let source = concat!(
        "self.connect(btn, SIGNAL(\"clicked()\"), self.go)\n",
        "self.emit(SIGNAL(\"done(int)\"), 1)\n",
    );

    let mut reg = registry();
    let first = convert_source(source, &mut reg);
    let second = convert_source(&first.text, &mut reg);

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(second.text, first.text);
}

#[test]
fn rewrite_lines_follow_fragment_offset() {
    let text = "\n\n    self.emit(SIGNAL(\"ready()\"))\n";
    let mut reg = registry();
    let out = convert_fragment(&Fragment::new(text, 40), &mut reg);

    assert_eq!(out.rewrites.len(), 1);
    assert_eq!(out.rewrites[0].line, 42);
    assert_eq!(out.rewrites[0].replacement, "self.ready.emit()");
}

#[test]
fn unfixable_calls_accumulate_across_fragments() {
    let mut reg = registry();
    convert_fragment(&Fragment::new("self.emit(SIGNAL(name), 1)\n", 3), &mut reg);
    convert_fragment(
        &Fragment::new("self.connect(a, SIGNAL(\"x()\"), b, SLOT(\"y()\"))\n", 10),
        &mut reg,
    );

    let rows: Vec<usize> = reg.errors().map(|record| record.row).collect();
    assert_eq!(rows, vec![2, 9]);
}

#[test]
fn same_unfixable_site_is_recorded_once() {
    let mut reg = registry();
    let fragment = Fragment::new("self.emit(SIGNAL(name))\n", 1);
    convert_fragment(&fragment, &mut reg);
    convert_fragment(&fragment, &mut reg);

    assert_eq!(reg.len(RegistryKey::Errors), 1);
}
