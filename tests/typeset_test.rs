//! Integration tests for the typesetting pipeline with a recording runner.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use snp::{CommandOutcome, CommandRunner, Config, Settings, Snp, SnpResult, Target, TypesetOptions};

/// Records every invocation and fakes the files a real TeX run leaves.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    fail_stem: Option<String>,
}

impl RecordingRunner {
    fn failing(stem: &str) -> Self {
        Self {
            fail_stem: Some(stem.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> snp::Result<CommandOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));

        let stem = args.last().cloned().unwrap_or_default();
        if program == "xelatex" {
            fs::write(dir.join(format!("{}.aux", stem)), "aux")?;
            fs::write(dir.join(format!("{}.log", stem)), "log")?;
            if self.fail_stem.as_deref() == Some(stem.as_str()) {
                return Ok(CommandOutcome::failed("! Undefined control sequence."));
            }
            fs::write(dir.join(format!("{}.pdf", stem)), "%PDF-1.5 fake")?;
        }
        Ok(CommandOutcome::ok())
    }
}

fn scanned(source: &str, settings: Settings) -> SnpResult {
    let config = Config {
        settings,
        ..Config::default()
    };
    Snp::new()
        .with_config(config)
        .scan_str(source, "lec")
        .unwrap()
}

const PLAIN: &str = "T Sorting\ns Merge sort\n- divide\n- conquer\n";
const CITED: &str = "T Sorting\ns Merge sort\nSee @knuth98 for details.\n";

#[test]
fn test_successful_build_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(PLAIN, Settings::default());

    let report = result.build(dir.path(), &runner, TypesetOptions::new()).unwrap();

    assert!(report.all_ok());
    assert!(report.typeset_ok());
    assert_eq!(runner.count("xelatex"), 3);
    assert_eq!(runner.count("biber"), 0);
    assert_eq!(runner.count("pandoc"), 1);
    assert!(runner
        .calls()
        .contains(&"xelatex -interaction=nonstopmode lec-notes-2up".to_string()));

    let p = dir.path();
    assert!(p.join("lec-notes.pdf").exists());
    assert!(p.join("lec-slides.pdf").exists());
    assert!(p.join("lec-notes-2up.pdf").exists());
    assert!(p.join("lec-notes.md").exists());
    for gone in [
        "lec-notes.tex",
        "lec-slides.tex",
        "lec-notes-2up.tex",
        "lec-notes.aux",
        "lec-slides.log",
        "lec-notes-2up.aux",
    ] {
        assert!(!p.join(gone).exists(), "{} should be removed", gone);
    }

    let names: Vec<&str> = report.pdf_sizes.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["lec-notes.pdf", "lec-slides.pdf"]);
}

#[test]
fn test_citations_add_bibliography_pass() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(CITED, Settings::default());
    assert!(result.document.has_citations);

    let report = result.build(dir.path(), &runner, TypesetOptions::new()).unwrap();
    assert!(report.all_ok());

    // two passes each for notes and slides, one for the two-up sheet
    assert_eq!(runner.count("xelatex"), 5);
    assert_eq!(runner.count("biber --quiet"), 2);
    assert!(runner.calls().iter().any(|c| c.starts_with("pandoc") && c.contains("--citeproc")));

    let notes = report.get(Target::Notes).unwrap();
    assert_eq!(
        notes.steps[..3],
        [
            "xelatex -interaction=nonstopmode lec-notes".to_string(),
            "biber --quiet lec-notes".to_string(),
            "xelatex -interaction=nonstopmode lec-notes".to_string(),
        ]
    );
}

#[test]
fn test_failed_target_keeps_intermediates() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::failing("lec-slides");
    let result = scanned(PLAIN, Settings::default());

    let report = result.build(dir.path(), &runner, TypesetOptions::new()).unwrap();

    assert!(!report.all_ok());
    assert!(!report.typeset_ok());
    let slides = report.get(Target::Slides).unwrap();
    assert!(!slides.success);
    assert_eq!(slides.failure.as_deref(), Some("! Undefined control sequence."));
    assert!(report.get(Target::Notes).unwrap().success);
    assert!(report.get(Target::Portable).unwrap().success);

    let p = dir.path();
    assert!(p.join("lec-slides.aux").exists());
    assert!(p.join("lec-slides.log").exists());
    assert!(p.join("lec-slides.tex").exists());
    assert!(p.join("lec-notes.tex").exists());
    assert!(!p.join("lec-notes.aux").exists());
    assert!(report.pdf_sizes.is_empty());
}

#[test]
fn test_two_up_failure_does_not_fail_notes() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::failing("lec-notes-2up");
    let result = scanned(PLAIN, Settings::default());

    let report = result.build(dir.path(), &runner, TypesetOptions::new()).unwrap();
    assert!(report.all_ok());
    assert!(dir.path().join("lec-notes-2up.tex").exists());
}

#[test]
fn test_keep_tex() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(PLAIN, Settings::default());

    let options = TypesetOptions::new().with_keep_tex(true);
    let report = result.build(dir.path(), &runner, options).unwrap();
    assert!(report.all_ok());
    assert!(dir.path().join("lec-notes.tex").exists());
    assert!(dir.path().join("lec-slides.tex").exists());
}

#[test]
fn test_without_typesetting_only_writes() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(PLAIN, Settings::default());

    let options = TypesetOptions::new().without_typesetting();
    let report = result.build(dir.path(), &runner, options).unwrap();

    assert!(runner.calls().is_empty());
    assert!(report.all_ok());
    assert_eq!(report.targets.len(), 3);
    for name in ["lec-notes.tex", "lec-slides.tex", "lec-notes.md"] {
        assert!(dir.path().join(name).exists());
    }
}

#[test]
fn test_portable_conversion_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let settings = Settings {
        stylesheet: Some("notes.css".into()),
        ..Settings::default()
    };
    let result = scanned(PLAIN, settings);
    result.build(dir.path(), &runner, TypesetOptions::new()).unwrap();

    let pandoc = runner
        .calls()
        .into_iter()
        .find(|c| c.starts_with("pandoc"))
        .unwrap();
    assert_eq!(
        pandoc,
        "pandoc --standalone --from=markdown+link_attributes+simple_tables+pipe_tables+definition_lists \
         --include-in-header=notes.css --output=lec-notes.html lec-notes.md"
    );
}

#[test]
fn test_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(PLAIN, Settings::default());
    let report = result.build(dir.path(), &runner, TypesetOptions::new()).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"target\":\"Notes\""));
    assert!(json.contains("\"pdf_sizes\""));
}

#[test]
fn test_each_job_writes_its_rendered_target() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(PLAIN, Settings::default());

    let options = TypesetOptions::new().with_keep_tex(true);
    let report = result.build(dir.path(), &runner, options).unwrap();

    let order: Vec<Target> = report.targets.iter().map(|r| r.target).collect();
    assert_eq!(order, Target::ALL.to_vec());
    for (target, artifact) in report.targets.iter().zip(result.artifacts()) {
        assert_eq!(target.artifact, dir.path().join(&artifact.file_name));
        assert_eq!(fs::read_to_string(&target.artifact).unwrap(), artifact.content);
    }
}

#[test]
fn test_unwritable_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let result = scanned(PLAIN, Settings::default());

    let err = result
        .build(dir.path().join("missing"), &runner, TypesetOptions::new())
        .unwrap_err();
    assert!(matches!(err, snp::Error::Io(_)));
    assert!(runner.calls().is_empty());
}
