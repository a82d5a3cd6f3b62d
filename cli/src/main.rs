//! snp CLI - lecture notes, slides and Markdown from one source file

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use snp::{find_source_file, BuildReport, Config, Snp, SnpResult, SystemRunner, TypesetOptions};

/// Exit status for a fatal error.
const EXIT_FATAL: u8 = 1;
/// Exit status when some target failed to build.
const EXIT_INCOMPLETE: u8 = 2;

#[derive(Parser)]
#[command(name = "snp")]
#[command(author = "John Williams")]
#[command(version)]
#[command(about = "Turn a Simple Notes source file into notes, slides and Markdown", long_about = None)]
struct Cli {
    #[command(flatten)]
    build: BuildArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct BuildArgs {
    /// Source file (the .sn file in the current directory if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Directory the outputs are written to (defaults to the source's directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Directory holding snp.ini and TeXOptions
    #[arg(short, long, value_name = "DIR", env = "SNP_CONFIG_DIR")]
    config: Option<PathBuf>,

    /// Debug level: 0 warnings, 1 info, 2 debug, 3 trace
    #[arg(short, long, default_value = "0", value_name = "N")]
    debug: u8,

    /// Report graphics and PDF sizes
    #[arg(short, long)]
    sizes: bool,

    /// Write the generated sources without running the typesetters
    #[arg(long)]
    no_typeset: bool,

    /// Keep the generated .tex files after a successful build
    #[arg(short, long)]
    keep_tex: bool,

    /// Print the build report as JSON
    #[arg(long)]
    report_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, render and typeset (the default)
    Build(BuildArgs),

    /// Scan only and report problems in the source
    Check {
        /// Source file (the .sn file in the current directory if omitted)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Directory holding snp.ini and TeXOptions
        #[arg(short, long, value_name = "DIR", env = "SNP_CONFIG_DIR")]
        config: Option<PathBuf>,

        /// Print the scanned document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug = match &cli.command {
        Some(Commands::Build(args)) => args.debug,
        _ => cli.build.debug,
    };
    init_logging(debug);

    let result = match cli.command {
        Some(Commands::Build(args)) => cmd_build(&args),
        Some(Commands::Check {
            input,
            config,
            json,
        }) => cmd_check(input, config, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(true)
        }
        None => cmd_build(&cli.build),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_INCOMPLETE),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Config directory: explicit flag or `SNP_CONFIG_DIR`, then
/// `$XDG_CONFIG_HOME/snp`, then `$HOME/.config/snp`.
fn resolve_config_dir(
    explicit: Option<PathBuf>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    explicit
        .or_else(|| {
            xdg_config_home
                .filter(|dir| !dir.is_empty())
                .map(|dir| PathBuf::from(dir).join("snp"))
        })
        .or_else(|| home.map(|home| PathBuf::from(home).join(".config").join("snp")))
}

fn load_config(explicit: Option<PathBuf>) -> snp::Result<Config> {
    let dir = resolve_config_dir(
        explicit,
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    );
    let config = match dir {
        Some(dir) => Config::load_dir(&dir)?,
        None => {
            log::info!("no config directory found, using built-in defaults");
            Config::default()
        }
    };
    for diagnostic in &config.diagnostics {
        eprintln!("{}: {}", "Warning".yellow(), diagnostic.message);
    }
    Ok(config)
}

fn resolve_input(input: Option<PathBuf>) -> snp::Result<PathBuf> {
    match input {
        Some(path) => Ok(path),
        None => {
            let path = find_source_file(".")?;
            eprintln!(
                "No source file specified, so using '{}'.",
                path.display().to_string().cyan()
            );
            Ok(path)
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_build(args: &BuildArgs) -> snp::Result<bool> {
    let input = resolve_input(args.input.clone())?;
    let config = load_config(args.config.clone())?;

    let result = Snp::new().with_config(config).scan_file(&input)?;
    print_scan_summary(&input, &result);

    let output_dir = args
        .output
        .clone()
        .or_else(|| input.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)?;

    let mut options = TypesetOptions::new().with_keep_tex(args.keep_tex);
    if args.no_typeset {
        options = options.without_typesetting();
    }

    let pb = spinner("Formatting notes, slides and portable export...");
    let report = result.build(&output_dir, &SystemRunner, options);
    pb.finish_and_clear();
    let report = report?;

    if args.report_json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| snp::Error::Render(e.to_string()))?;
        println!("{}", json);
    } else {
        print_build_report(&report);
    }
    if args.sizes {
        print_sizes(&result, &report);
    }

    Ok(report.all_ok())
}

fn cmd_check(input: Option<PathBuf>, config: Option<PathBuf>, json: bool) -> snp::Result<bool> {
    let input = resolve_input(input)?;
    let config = load_config(config)?;
    let result = Snp::new().with_config(config).scan_file(&input)?;

    if json {
        println!("{}", result.to_json()?);
        return Ok(true);
    }

    print_scan_summary(&input, &result);
    let diagnostics = &result.document.diagnostics;
    if diagnostics.is_empty() {
        println!("{}", "No problems found".green());
    } else {
        println!();
        println!("{}", "Problems".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for d in diagnostics {
            println!("{:>5}  {:?}: {}", d.line.to_string().yellow(), d.kind, d.message);
        }
    }
    Ok(true)
}

fn print_scan_summary(input: &Path, result: &SnpResult) {
    let doc = &result.document;
    println!("{}", "Lecture".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    if let Some(title) = &doc.metadata.title {
        println!("{}: {}", "Title".bold(), title.plain);
    }
    if let Some(code) = &doc.metadata.course_code {
        println!("{}: {}", "Course".bold(), code.plain);
    }
    if let Some(date) = &doc.metadata.date {
        println!("{}: {}", "Date".bold(), date.plain);
    }
    println!("{}: {}", "Slides".bold(), doc.slide_count);
    println!("{}: {}", "Graphics".bold(), doc.graphics.len());
    if doc.has_citations {
        println!("{}: {}", "Citations".bold(), doc.citation_list());
    }
    if !doc.pure_markdown {
        println!("{}: {}", "Markup".bold(), "contains TeX".yellow());
    }
}

fn print_build_report(report: &BuildReport) {
    println!();
    println!("{}", "Output files:".green().bold());
    let last = report.targets.len().saturating_sub(1);
    for (i, target) in report.targets.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        let status = if target.success {
            "ok".green()
        } else {
            "FAILED".red().bold()
        };
        println!(
            "  {} {:<8} {} [{}]",
            branch.dimmed(),
            target.target.to_string(),
            target.artifact.display(),
            status
        );
        if let Some(failure) = &target.failure {
            for line in failure.lines().rev().take(5).collect::<Vec<_>>().into_iter().rev() {
                println!("       {}", line.dimmed());
            }
        }
    }
    if !report.all_ok() {
        println!("\n{}", "Build incomplete".yellow().bold());
    }
}

fn print_sizes(result: &SnpResult, report: &BuildReport) {
    let graphics = &result.document.graphics;
    println!();
    println!("{}", "Sizes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for entry in graphics.sorted() {
        println!("  {:>10}  {}", format_bytes(entry.size), entry.name);
    }
    if !graphics.is_empty() {
        println!(
            "  {:>10}  {} graphics files",
            format_bytes(graphics.total_bytes()).bold(),
            graphics.len()
        );
    }
    for (name, size) in &report.pdf_sizes {
        println!("  {:>10}  {}", format_bytes(*size), name);
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn cmd_version() {
    println!("{} {}", "snp".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Simple Notes Processor");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_precedence() {
        let explicit = Some(PathBuf::from("/etc/snp"));
        assert_eq!(
            resolve_config_dir(explicit, Some("/x".into()), Some("/home/u".into())),
            Some(PathBuf::from("/etc/snp"))
        );
        assert_eq!(
            resolve_config_dir(None, Some("/x".into()), Some("/home/u".into())),
            Some(PathBuf::from("/x/snp"))
        );
        assert_eq!(
            resolve_config_dir(None, Some("".into()), Some("/home/u".into())),
            Some(PathBuf::from("/home/u/.config/snp"))
        );
        assert_eq!(resolve_config_dir(None, None, None), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["snp", "lec.sn", "-d", "2", "--no-typeset", "-k"]).unwrap();
        assert_eq!(cli.build.input, Some(PathBuf::from("lec.sn")));
        assert_eq!(cli.build.debug, 2);
        assert!(cli.build.no_typeset);
        assert!(cli.build.keep_tex);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_build_writes_sources_without_typesetting() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Lec01.sn");
        std::fs::write(&input, "T Trees\ns Binary trees\n- nodes\n").unwrap();
        let args = BuildArgs {
            input: Some(input),
            output: None,
            config: Some(dir.path().join("no-config")),
            debug: 0,
            sizes: false,
            no_typeset: true,
            keep_tex: false,
            report_json: false,
        };

        assert!(cmd_build(&args).unwrap());
        assert!(dir.path().join("lec01-notes.tex").exists());
        assert!(dir.path().join("lec01-slides.tex").exists());
        assert!(dir.path().join("lec01-notes.md").exists());
    }
}
