//! Command-line interface for yorbox
//!
//! Usage:
//!   yorbox box --dir `<dir>` [options]       - Wrap yor tag groups in the toggle expression
//!   yorbox unbox --dir `<dir>` [options]     - Remove the wrappers again
//!   yorbox validate [--dir `<dir>`] [options] - Check the templates and preview the result
//!
//! Exit codes: 0 on success, 1 when a file failed (or would change under `--check`), 2 when the
//! configuration or templates are invalid.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use yorbox::boxing::{BoxTemplate, Boxer};
use yorbox::config::{BoxConfig, Loader};
use yorbox::hcl::detokenize;
use yorbox::processor::{
    box_source, process_directory, Action, FileStatus, Options, ProcessError, Report,
};

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let Some((name, sub)) = matches.subcommand() else {
        unreachable!("a subcommand is required")
    };
    init_tracing(sub.get_flag("verbose"));

    let result = match name {
        "box" => handle_run_command(sub, Action::Box),
        "unbox" => handle_run_command(sub, Action::Unbox),
        "validate" => handle_validate_command(sub),
        _ => unreachable!(),
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        ExitCode::from(2)
    })
}

fn cli() -> Command {
    Command::new("yorbox")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Wraps yor-generated tags in Terraform configurations with a toggle expression")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("box")
                .about("Wrap yor tag groups in the box template")
                .arg(dir_arg().required(true))
                .args(config_args())
                .args(run_args()),
        )
        .subcommand(
            Command::new("unbox")
                .about("Remove box template wrappers from yor tag groups")
                .arg(dir_arg().required(true))
                .args(config_args())
                .args(run_args()),
        )
        .subcommand(
            Command::new("validate")
                .about("Compile the box templates and preview a boxed resource")
                .arg(dir_arg().default_value("."))
                .args(config_args()),
        )
}

fn dir_arg() -> Arg {
    Arg::new("dir")
        .long("dir")
        .short('d')
        .help("Directory containing .tf files")
        .value_parser(clap::value_parser!(PathBuf))
}

fn config_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .long("config")
            .short('c')
            .help("TOML configuration file layered over the defaults")
            .value_parser(clap::value_parser!(PathBuf)),
        Arg::new("toggle-name")
            .long("toggle-name")
            .help("Name of the toggle variable (default: yor_toggle)"),
        Arg::new("box-template")
            .long("box-template")
            .help("Box template, with /*<box>*/ and /*</box>*/ around the payload"),
        Arg::new("old-box-template")
            .long("old-box-template")
            .help("Template used by an earlier run; its wrappers are replaced"),
        Arg::new("tags-prefix")
            .long("tags-prefix")
            .help("Prefix yor was configured with for its tag keys"),
        Arg::new("ignore")
            .long("ignore")
            .help("Block kind or resource type to leave alone (repeatable)")
            .action(ArgAction::Append),
        Arg::new("verbose")
            .long("verbose")
            .short('v')
            .help("Log every rewritten block")
            .action(ArgAction::SetTrue),
    ]
}

fn run_args() -> Vec<Arg> {
    vec![
        Arg::new("check")
            .long("check")
            .help("Report files that would change without writing them")
            .action(ArgAction::SetTrue),
        Arg::new("recursive")
            .long("recursive")
            .short('r')
            .help("Also process subdirectories")
            .action(ArgAction::SetTrue),
        Arg::new("format")
            .long("format")
            .short('f')
            .help("Report format")
            .value_parser(["text", "json"])
            .default_value("text"),
    ]
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "yorbox=debug" } else { "yorbox=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<BoxConfig> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    for (arg, key) in [
        ("toggle-name", "toggle_name"),
        ("box-template", "box_template"),
        ("old-box-template", "old_box_template"),
        ("tags-prefix", "tags_prefix"),
    ] {
        loader = loader.set_override_option(key, matches.get_one::<String>(arg).cloned())?;
    }
    if let Some(ignored) = matches.get_many::<String>("ignore") {
        loader = loader.set_override("ignored_block_kinds", ignored.cloned().collect::<Vec<_>>())?;
    }
    loader.build().context("invalid configuration")
}

/// Handle the box and unbox commands
fn handle_run_command(matches: &ArgMatches, action: Action) -> Result<ExitCode> {
    let config = load_config(matches)?;
    let dir = matches
        .get_one::<PathBuf>("dir")
        .context("--dir is required")?;
    // Fail on a broken template before any file is touched.
    Boxer::new(&config, dir).context("invalid box template")?;

    let options = Options {
        action,
        check: matches.get_flag("check"),
        recursive: matches.get_flag("recursive"),
    };
    let report = match process_directory(dir, &config, &options) {
        Ok(report) => report,
        Err(err @ ProcessError::Template { .. }) => {
            return Err(err).context("invalid box template");
        }
        Err(err) => return Err(err.into()),
    };

    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_report(&report),
    }

    let would_change = report.check && report.changed().next().is_some();
    Ok(if report.has_failures() || would_change {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &Report) {
    let verb = match (report.action, report.check) {
        (Action::Box, false) => "boxed",
        (Action::Box, true) => "would box",
        (Action::Unbox, false) => "unboxed",
        (Action::Unbox, true) => "would unbox",
    };
    for file in &report.files {
        match file.status {
            FileStatus::Changed => {
                println!("{verb} {}: {}", file.path.display(), file.blocks.join(", "))
            }
            FileStatus::Failed => eprintln!(
                "failed {}",
                file.error.as_deref().unwrap_or("unknown error")
            ),
            FileStatus::Unchanged => {}
        }
    }
    println!(
        "{} file(s) processed, {} changed, {} failed",
        report.files.len(),
        report.changed().count(),
        report.failed().count()
    );
}

/// Handle the validate command
fn handle_validate_command(matches: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(matches)?;
    let dir = matches
        .get_one::<PathBuf>("dir")
        .map(PathBuf::as_path)
        .unwrap_or(Path::new("."));
    let boxer = Boxer::new(&config, dir).context("invalid box template")?;

    print_halves("box template", boxer.template());
    if let Some(old) = boxer.old_template() {
        print_halves("old box template", old);
    }

    let sample = format!(
        "resource \"aws_s3_bucket\" \"example\" {{\n  tags = {{\n    {}yor_trace = \"00000000-0000-0000-0000-000000000000\"\n  }}\n}}\n",
        config.tags_prefix
    );
    println!("preview:\n{}", box_source(&sample, &boxer)?);
    Ok(ExitCode::SUCCESS)
}

fn print_halves(title: &str, template: &BoxTemplate) {
    println!("{title}:");
    println!("  left:  {}", detokenize(template.left()));
    println!("  right: {}", detokenize(template.right()).trim_start());
}
