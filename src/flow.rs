//! Release flow orchestration.
//!
//! Two flows over a two-branch (develop/master) layout:
//!
//! - [run_feat]: develop-first release. When a remote develop branch
//!   exists, the version gets a minor bump on develop which is then
//!   merged into master; otherwise a patch bump is committed directly.
//! - [run_fix]: master-first hotfix. Patch bump on master, back-merged
//!   into develop when a remote develop branch exists.
//!
//! Both flows are strictly sequential: the first failing operation
//! aborts the rest and the error propagates. Already-applied steps are
//! not rolled back. A stash taken at flow start is popped only when
//! the flow succeeds; on failure it stays in the stash, recoverable
//! with `git stash pop`.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::git::{RepoStatus, Repository};
use crate::manifest;
use crate::prompt::TagMessagePrompt;
use crate::ui;
use crate::version::BumpMode;

/// Outcome of a completed flow, for the dispatcher to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSummary {
    /// Manifest version before the bump
    pub previous_version: String,
    /// Manifest version after the bump; also the tag name
    pub current_version: String,
    /// Name of the annotated tag that was created
    pub tag: String,
    /// Whether stashed local changes were restored at the end
    pub restored_stash: bool,
}

/// Develop-first release flow.
///
/// With a remote develop branch: checkout develop, pull, minor bump,
/// commit, push develop, checkout master, merge develop, tag, push
/// master with tags. Without one: patch bump and commit on the current
/// branch, then tag and push master with tags.
pub fn run_feat<R, P>(repo: &mut R, prompt: &mut P, config: &Config) -> Result<FlowSummary>
where
    R: Repository,
    P: TagMessagePrompt,
{
    let status = repo.status()?;
    let stashed = stash_if_dirty(repo, &status)?;

    let develop_exists = repo.remote_branch_exists(&config.remote, &config.develop_branch)?;

    let (previous, current) = if develop_exists {
        ui::display_step(&format!("checking out {}", config.develop_branch));
        repo.checkout(&config.develop_branch)?;

        ui::display_step(&format!(
            "pulling {} {}",
            config.remote, config.develop_branch
        ));
        repo.pull(&config.remote, &config.develop_branch)?;

        let versions = bump_and_commit(repo, &config.manifest, BumpMode::DevelopMinor)?;

        ui::display_step(&format!(
            "pushing {} {}",
            config.remote, config.develop_branch
        ));
        repo.push(&config.remote, &config.develop_branch, false)?;

        ui::display_step(&format!("checking out {}", config.master_branch));
        repo.checkout(&config.master_branch)?;

        ui::display_step(&format!("merging {}", config.develop_branch));
        repo.merge(&config.develop_branch)?;

        versions
    } else {
        bump_and_commit(repo, &config.manifest, BumpMode::NoDevelopPatch)?
    };

    tag_and_push_master(repo, prompt, config, &current)?;
    let restored_stash = restore_stash(repo, &status, stashed)?;

    Ok(FlowSummary {
        previous_version: previous,
        tag: current.clone(),
        current_version: current,
        restored_stash,
    })
}

/// Master-first hotfix flow.
///
/// Checkout master, pull, patch bump, commit, tag, push master with
/// tags. When a remote develop branch exists, master is then merged
/// back into develop and develop is pushed.
pub fn run_fix<R, P>(repo: &mut R, prompt: &mut P, config: &Config) -> Result<FlowSummary>
where
    R: Repository,
    P: TagMessagePrompt,
{
    let status = repo.status()?;
    let stashed = stash_if_dirty(repo, &status)?;

    ui::display_step(&format!("checking out {}", config.master_branch));
    repo.checkout(&config.master_branch)?;

    ui::display_step(&format!(
        "pulling {} {}",
        config.remote, config.master_branch
    ));
    repo.pull(&config.remote, &config.master_branch)?;

    let (previous, current) = bump_and_commit(repo, &config.manifest, BumpMode::MasterPatch)?;

    tag_and_push_master(repo, prompt, config, &current)?;

    if repo.remote_branch_exists(&config.remote, &config.develop_branch)? {
        ui::display_step(&format!("checking out {}", config.develop_branch));
        repo.checkout(&config.develop_branch)?;

        ui::display_step(&format!("merging {}", config.master_branch));
        repo.merge(&config.master_branch)?;

        ui::display_step(&format!(
            "pushing {} {}",
            config.remote, config.develop_branch
        ));
        repo.push(&config.remote, &config.develop_branch, false)?;
    }

    let restored_stash = restore_stash(repo, &status, stashed)?;

    Ok(FlowSummary {
        previous_version: previous,
        tag: current.clone(),
        current_version: current,
        restored_stash,
    })
}

/// Stash the working tree if the starting snapshot was dirty.
fn stash_if_dirty<R: Repository>(repo: &mut R, status: &RepoStatus) -> Result<bool> {
    if !status.has_changes {
        return Ok(false);
    }
    ui::display_step(&format!(
        "branch {} has local changes, stashing",
        status.branch
    ));
    repo.stash_save()?;
    Ok(true)
}

/// Bump the manifest version and commit it with a chore message.
fn bump_and_commit<R: Repository>(
    repo: &mut R,
    manifest_path: &Path,
    mode: BumpMode,
) -> Result<(String, String)> {
    let (previous, current) = manifest::bump(manifest_path, mode)?;
    ui::display_version_change(&previous, &current);

    let message = format!("chore({}): bump version to {}", manifest_name(manifest_path), current);
    ui::display_step(&format!("committing: {}", message));
    repo.commit_paths(&[manifest_path], &message)?;

    Ok((previous, current))
}

/// Prompt for the tag message, tag HEAD, and push master with tags.
fn tag_and_push_master<R, P>(
    repo: &mut R,
    prompt: &mut P,
    config: &Config,
    version: &str,
) -> Result<()>
where
    R: Repository,
    P: TagMessagePrompt,
{
    ui::display_step(&format!("tag: {}", version));
    let message = prompt.tag_message()?;
    repo.create_annotated_tag(version, &message)?;

    ui::display_step(&format!(
        "pushing {} {} --tags",
        config.remote, config.master_branch
    ));
    repo.push(&config.remote, &config.master_branch, true)?;

    Ok(())
}

/// Return to the original branch and pop the stash taken at flow start.
fn restore_stash<R: Repository>(repo: &mut R, status: &RepoStatus, stashed: bool) -> Result<bool> {
    if !stashed {
        return Ok(false);
    }
    ui::display_step(&format!(
        "restoring stashed changes on {}",
        status.branch
    ));
    repo.checkout(&status.branch)?;
    repo.stash_pop()?;
    Ok(true)
}

/// File name used in the bump commit message.
fn manifest_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
