//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git
//! operations the release flows need, with two implementations:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: a recording implementation for testing
//!
//! The flows depend on the [Repository] trait rather than a concrete
//! implementation, so scenario tests can run against the mock without
//! touching a real repository.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::Path;

use crate::error::Result;

/// Snapshot of the working tree taken once at flow start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Name of the currently checked-out branch
    pub branch: String,
    /// Whether the working tree has uncommitted changes
    pub has_changes: bool,
}

/// Git operations used by the release flows.
///
/// Operations take `&mut self` because several of them (stash, merge,
/// checkout) mutate repository state, and the flows are strictly
/// sequential anyway. Every method maps underlying failures to
/// [crate::error::ReleaseError] and the first failure aborts the flow.
pub trait Repository {
    /// Snapshot the current branch name and dirty state.
    fn status(&self) -> Result<RepoStatus>;

    /// Whether the remote-tracking branch `<remote>/<branch>` exists locally.
    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool>;

    /// Check out an existing local branch, updating the working tree.
    fn checkout(&mut self, branch: &str) -> Result<()>;

    /// Fetch `branch` from `remote` and fast-forward the local branch.
    fn pull(&mut self, remote: &str, branch: &str) -> Result<()>;

    /// Push a local branch to `remote`, optionally including all tags.
    fn push(&mut self, remote: &str, branch: &str, include_tags: bool) -> Result<()>;

    /// Merge the named local branch into the current HEAD.
    ///
    /// Fast-forwards when possible, otherwise creates a merge commit.
    /// Conflicts are an error.
    fn merge(&mut self, branch: &str) -> Result<()>;

    /// Stage the given paths and commit them with `message`.
    fn commit_paths(&mut self, paths: &[&Path], message: &str) -> Result<()>;

    /// Create an annotated tag named `name` on the current HEAD.
    fn create_annotated_tag(&mut self, name: &str, message: &str) -> Result<()>;

    /// Stash the working tree (tracked and untracked changes).
    fn stash_save(&mut self) -> Result<()>;

    /// Pop the most recent stash entry back onto the working tree.
    fn stash_pop(&mut self) -> Result<()>;
}
