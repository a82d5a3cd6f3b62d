//! Concurrent per-target typesetting.
//!
//! After the scan, each target is rendered, written and handed to its
//! external formatter on its own rayon task. Results come back over a
//! channel; the build finishes when every target has reported. A failing
//! target keeps its intermediates for inspection and never stops its
//! siblings.

use std::path::{Path, PathBuf};

use crossbeam_channel::unbounded;
use serde::Serialize;

use super::cleanup::{remove_files, remove_intermediates};
use super::runner::CommandRunner;
use crate::error::Result;
use crate::render::{renderers, two_up, two_up_file_name, Artifact, RenderContext, Target, TargetRenderer};

/// Options for a build.
#[derive(Debug, Clone)]
pub struct TypesetOptions {
    /// Run the external tools at all
    pub run_typesetter: bool,
    /// Keep the generated `.tex` files after a successful build
    pub keep_tex: bool,
    /// TeX engine
    pub tex_engine: String,
    /// Bibliography processor
    pub bib_program: String,
    /// Markdown converter
    pub converter: String,
}

impl Default for TypesetOptions {
    fn default() -> Self {
        Self {
            run_typesetter: true,
            keep_tex: false,
            tex_engine: "xelatex".to_string(),
            bib_program: "biber".to_string(),
            converter: "pandoc".to_string(),
        }
    }
}

impl TypesetOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only write the artifacts.
    pub fn without_typesetting(mut self) -> Self {
        self.run_typesetter = false;
        self
    }

    /// Keep the `.tex` sources.
    pub fn with_keep_tex(mut self, keep: bool) -> Self {
        self.keep_tex = keep;
        self
    }
}

/// Outcome for one target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// Which target
    pub target: Target,
    /// Path of the written artifact
    pub artifact: PathBuf,
    /// Whether every required step succeeded
    pub success: bool,
    /// Commands run, in order
    pub steps: Vec<String>,
    /// Output of the failing step, if any
    pub failure: Option<String>,
}

impl TargetReport {
    fn new(target: Target, artifact: PathBuf) -> Self {
        Self {
            target,
            artifact,
            success: true,
            steps: Vec::new(),
            failure: None,
        }
    }

    fn fail(&mut self, output: impl Into<String>) {
        self.success = false;
        self.failure = Some(output.into());
    }
}

/// Outcome of a whole build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// One report per target, in render order
    pub targets: Vec<TargetReport>,
    /// Sizes of the produced PDFs, when the typeset targets succeeded
    pub pdf_sizes: Vec<(String, u64)>,
}

impl BuildReport {
    /// Report for one target.
    pub fn get(&self, target: Target) -> Option<&TargetReport> {
        self.targets.iter().find(|r| r.target == target)
    }

    fn succeeded(&self, target: Target) -> bool {
        self.get(target).is_some_and(|r| r.success)
    }

    /// Notes and slides both typeset.
    pub fn typeset_ok(&self) -> bool {
        self.succeeded(Target::Notes) && self.succeeded(Target::Slides)
    }

    /// Every target succeeded.
    pub fn all_ok(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|r| r.success)
    }
}

/// Writes artifacts and drives the external formatters.
pub struct Pipeline<'r> {
    runner: &'r dyn CommandRunner,
    options: TypesetOptions,
}

impl<'r> Pipeline<'r> {
    /// Create a pipeline over `runner`.
    pub fn new(runner: &'r dyn CommandRunner, options: TypesetOptions) -> Self {
        Self { runner, options }
    }

    /// Render every target, write it into `dir` and typeset it. Each target
    /// is one job on the rayon pool.
    pub fn build(&self, dir: &Path, ctx: &RenderContext<'_>, base: &str) -> Result<BuildReport> {
        let (tx, rx) = unbounded();
        rayon::scope(|s| {
            for renderer in renderers() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let job = self.run_target(dir, renderer, ctx, base);
                    if tx.send(job).is_err() {
                        log::error!("build report channel closed early");
                    }
                });
            }
        });
        drop(tx);

        let mut artifacts = Vec::with_capacity(Target::ALL.len());
        let mut targets = Vec::with_capacity(Target::ALL.len());
        for job in rx.iter() {
            let (artifact, report) = job?;
            artifacts.push(artifact);
            targets.push(report);
        }
        artifacts.sort_by_key(|a| target_order(a.target));
        targets.sort_by_key(|r| target_order(r.target));
        let mut report = BuildReport {
            targets,
            pdf_sizes: Vec::new(),
        };

        if !self.options.run_typesetter {
            log::info!("typesetting disabled, artifacts written only");
            return Ok(report);
        }

        if report.typeset_ok() {
            if !self.options.keep_tex {
                let sources: Vec<&str> = artifacts
                    .iter()
                    .filter(|a| a.target != Target::Portable)
                    .map(|a| a.file_name.as_str())
                    .collect();
                remove_files(dir, &sources);
            }
            report.pdf_sizes = pdf_sizes(dir, &artifacts);
        } else {
            log::warn!("notes or slides failed to typeset; keeping sources and intermediates");
        }
        Ok(report)
    }

    fn run_target(
        &self,
        dir: &Path,
        renderer: &dyn TargetRenderer,
        ctx: &RenderContext<'_>,
        base: &str,
    ) -> Result<(Artifact, TargetReport)> {
        let artifact = renderer.artifact(ctx, base);
        let path = artifact.write_to(dir)?;
        let report = if self.options.run_typesetter {
            self.typeset(dir, &artifact, path, ctx)
        } else {
            TargetReport::new(artifact.target, path)
        };
        Ok((artifact, report))
    }

    fn typeset(&self, dir: &Path, artifact: &Artifact, path: PathBuf, ctx: &RenderContext<'_>) -> TargetReport {
        let mut report = TargetReport::new(artifact.target, path);
        log::info!("====> formatting {}", artifact.target);
        match artifact.target {
            Target::Notes => {
                self.typeset_tex(dir, artifact.stem(), ctx, &mut report);
                if report.success {
                    self.typeset_two_up(dir, artifact.stem(), ctx, &mut report);
                }
            }
            Target::Slides => self.typeset_tex(dir, artifact.stem(), ctx, &mut report),
            Target::Portable => self.convert_portable(dir, artifact, ctx, &mut report),
        }
        report
    }

    fn step(&self, dir: &Path, program: &str, args: Vec<String>, report: &mut TargetReport) -> bool {
        report.steps.push(format!("{} {}", program, args.join(" ")));
        match self.runner.run(program, &args, dir) {
            Ok(outcome) if outcome.success => true,
            Ok(outcome) => {
                report.fail(outcome.output);
                false
            }
            Err(e) => {
                report.fail(e.to_string());
                false
            }
        }
    }

    fn tex_args(stem: &str) -> Vec<String> {
        vec!["-interaction=nonstopmode".to_string(), stem.to_string()]
    }

    fn typeset_tex(&self, dir: &Path, stem: &str, ctx: &RenderContext<'_>, report: &mut TargetReport) {
        let engine = self.options.tex_engine.as_str();
        if !self.step(dir, engine, Self::tex_args(stem), report) {
            log::warn!("because of the previous error, {} cannot be finished", stem);
            return;
        }

        if ctx.document.has_citations {
            let bib_args = vec!["--quiet".to_string(), stem.to_string()];
            if !self.step(dir, &self.options.bib_program, bib_args, report)
                || !self.step(dir, engine, Self::tex_args(stem), report)
            {
                return;
            }
        }

        remove_intermediates(dir, stem);
    }

    fn typeset_two_up(&self, dir: &Path, notes_stem: &str, ctx: &RenderContext<'_>, report: &mut TargetReport) {
        let file_name = two_up_file_name(notes_stem);
        if let Err(e) = std::fs::write(dir.join(&file_name), two_up(ctx.templates, notes_stem)) {
            log::warn!("could not write {}: {}", file_name, e);
            return;
        }

        // the two-up sheet is a convenience; its failure does not fail the notes
        let mut scratch = TargetReport::new(Target::Notes, dir.join(&file_name));
        let stem = file_name.trim_end_matches(".tex");
        if self.step(dir, &self.options.tex_engine, Self::tex_args(stem), &mut scratch) {
            remove_files(dir, &[file_name.as_str()]);
            remove_intermediates(dir, stem);
        } else {
            log::warn!("two-up notes failed; keeping {}", file_name);
        }
        report.steps.extend(scratch.steps);
    }

    fn convert_portable(&self, dir: &Path, artifact: &Artifact, ctx: &RenderContext<'_>, report: &mut TargetReport) {
        let mut args = vec![
            "--standalone".to_string(),
            "--from=markdown+link_attributes+simple_tables+pipe_tables+definition_lists".to_string(),
        ];
        if ctx.document.has_citations {
            args.push("--citeproc".to_string());
        }
        if let Some(css) = &ctx.settings.stylesheet {
            args.push(format!("--include-in-header={}", css));
        }
        args.push(format!("--output={}.html", artifact.stem()));
        args.push(artifact.file_name.clone());

        self.step(dir, &self.options.converter, args, report);
    }
}

fn target_order(target: Target) -> usize {
    Target::ALL.iter().position(|t| *t == target).unwrap_or(Target::ALL.len())
}

fn pdf_sizes(dir: &Path, artifacts: &[Artifact]) -> Vec<(String, u64)> {
    artifacts
        .iter()
        .filter(|a| a.target != Target::Portable)
        .filter_map(|a| {
            let name = format!("{}.pdf", a.stem());
            std::fs::metadata(dir.join(&name)).ok().map(|m| (name, m.len()))
        })
        .collect()
}
