use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use git_release::config;
use git_release::flow::{self, FlowSummary};
use git_release::git::Git2Repository;
use git_release::prompt::StdinPrompt;
use git_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    version,
    about = "Two-branch (develop/master) release flow: stash, merge, bump, tag, push"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Manifest file carrying the version field")]
    manifest: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Develop-first release: minor bump via develop, merged into master
    Feat,
    /// Master-first hotfix: patch bump on master, back-merged into develop
    Fix,
}

fn main() -> Result<()> {
    // An unrecognized command gets the usage text and a clean exit,
    // same as no command at all
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
            Args::command().print_help()?;
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    let command = match args.command {
        Some(command) => command,
        None => {
            Args::command().print_help()?;
            return Ok(());
        }
    };

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };
    if let Some(manifest) = args.manifest {
        config.manifest = manifest.into();
    }

    let mut repo = match Git2Repository::discover() {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("Not in a git repository: {}", e));
            std::process::exit(1);
        }
    };
    let mut prompt = StdinPrompt;

    let result = match command {
        Command::Feat => flow::run_feat(&mut repo, &mut prompt, &config),
        Command::Fix => flow::run_fix(&mut repo, &mut prompt, &config),
    };

    match result {
        Ok(summary) => {
            report_summary(&summary);
            Ok(())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn report_summary(summary: &FlowSummary) {
    ui::display_success(&format!(
        "released {} (was {}), tagged {}",
        summary.current_version, summary.previous_version, summary.tag
    ));
    if summary.restored_stash {
        ui::display_success("restored stashed local changes");
    }
}
