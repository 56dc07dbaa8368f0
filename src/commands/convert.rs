use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use resignal::signal::{convert_fragment, Fragment, Rewrite};
use resignal::utils::io;
use resignal::{Error, ErrorRecord, Registry, RegistryKey, Settings};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct ConvertArgs {
    /// Python source files to convert
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Write converted sources back to disk (default is dry-run)
    #[arg(long)]
    write: bool,
    /// Line number the file contents start at, for fragments cut from a larger file
    #[arg(long, default_value_t = 1)]
    first_line: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "command")]
pub enum ConvertOutput {
    #[serde(rename = "convert")]
    Convert {
        dry_run: bool,
        files: Vec<FileSummary>,
        total_rewrites: usize,
        total_unfixable: usize,
        registry: Registry,
    },
}

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub file: String,
    pub changed: bool,
    pub applied: bool,
    pub rewrites: Vec<Rewrite>,
    pub unfixable: Vec<ErrorRecord>,
}

pub fn run(args: ConvertArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ConvertOutput> {
    if args.first_line == 0 {
        return Err(Error::validation_invalid_argument(
            "first_line",
            "Line numbers start at 1",
        ));
    }

    // Bad configuration aborts before any file is touched.
    let settings = Settings::from_env()?;
    let mut run_registry = Registry::new(settings.clone());
    let mut files = Vec::new();

    for path in &args.paths {
        let source = io::read_file(path, &format!("read {}", path.display()))?;

        let mut file_registry = Registry::new(settings.clone());
        let outcome = convert_fragment(&Fragment::new(&source, args.first_line), &mut file_registry);

        let applied = args.write && outcome.changed;
        if applied {
            io::write_file_atomic(path, &outcome.text, &format!("write {}", path.display()))?;
        }

        run_registry.merge_from(&file_registry, None);
        files.push(FileSummary {
            file: path.display().to_string(),
            changed: outcome.changed,
            applied,
            rewrites: outcome.rewrites,
            unfixable: outcome.unfixable,
        });
    }

    let total_rewrites = files.iter().map(|f| f.rewrites.len()).sum();
    let total_unfixable = files.iter().map(|f| f.unfixable.len()).sum();
    let exit_code = if run_registry.len(RegistryKey::Errors) == 0 {
        0
    } else {
        1
    };

    Ok((
        ConvertOutput::Convert {
            dry_run: !args.write,
            files,
            total_rewrites,
            total_unfixable,
            registry: run_registry,
        },
        exit_code,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::GlobalArgs;
    use resignal::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    const CONVERTIBLE: &str = "self.connect(btn, SIGNAL('clicked()'), self.go)\n";
    const UNFIXABLE: &str = "self.emit(SIGNAL(name))\n";

    fn args(paths: Vec<PathBuf>, write: bool) -> ConvertArgs {
        ConvertArgs {
            paths,
            write,
            first_line: 1,
        }
    }

    fn source_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn dry_run_reports_without_touching_files() {
        let dir = TempDir::new().unwrap();
        let path = source_file(&dir, "a.py", CONVERTIBLE);

        let (ConvertOutput::Convert { dry_run, files, total_rewrites, .. }, exit_code) =
            run(args(vec![path.clone()], false), &GlobalArgs {}).unwrap();

        assert_eq!(exit_code, 0);
        assert!(dry_run);
        assert_eq!(total_rewrites, 1);
        assert!(files[0].changed);
        assert!(!files[0].applied);
        assert_eq!(fs::read_to_string(&path).unwrap(), CONVERTIBLE);
    }

    #[test]
    fn write_applies_conversion() {
        let dir = TempDir::new().unwrap();
        let path = source_file(&dir, "a.py", CONVERTIBLE);

        let (ConvertOutput::Convert { files, .. }, exit_code) =
            run(args(vec![path.clone()], true), &GlobalArgs {}).unwrap();

        assert_eq!(exit_code, 0);
        assert!(files[0].applied);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "btn.clicked.connect(self.go)\n"
        );
    }

    #[test]
    fn any_unfixable_site_exits_with_1() {
        let dir = TempDir::new().unwrap();
        let good = source_file(&dir, "good.py", CONVERTIBLE);
        let bad = source_file(&dir, "bad.py", UNFIXABLE);

        let (output, exit_code) = run(args(vec![good, bad.clone()], true), &GlobalArgs {}).unwrap();
        let ConvertOutput::Convert { total_unfixable, .. } = &output;

        assert_eq!(exit_code, 1);
        assert_eq!(*total_unfixable, 1);
        assert_eq!(fs::read_to_string(&bad).unwrap(), UNFIXABLE);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["command"], "convert");
        assert_eq!(json["registry"]["errors"][0]["row"], 0);
    }

    #[test]
    fn zero_first_line_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = source_file(&dir, "a.py", CONVERTIBLE);
        let mut convert_args = args(vec![path], true);
        convert_args.first_line = 0;

        let err = run(convert_args, &GlobalArgs {}).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);

        let (_value, exit_code) = crate::output::map_cmd_result_to_json::<ConvertOutput>(Err(err));
        assert_eq!(exit_code, 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = run(args(vec![dir.path().join("gone.py")], false), &GlobalArgs {}).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalIoError);
    }
}
