use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::git::{RepoStatus, Repository};

/// Mock repository for testing flows without actual git operations.
///
/// Records every operation into an ordered log (one entry per call,
/// e.g. `"checkout develop"`) and simulates the small amount of state
/// the flows observe: current branch, dirty working tree, stash depth,
/// and remote develop existence. A single operation can be made to
/// fail by name for failure-path tests.
pub struct MockRepository {
    current_branch: String,
    dirty: bool,
    remote_branches: Vec<String>,
    stash_depth: usize,
    operations: Vec<String>,
    fail_on: Option<String>,
}

impl MockRepository {
    /// Create a mock on a clean `feature/demo` working tree.
    pub fn new() -> Self {
        MockRepository {
            current_branch: "feature/demo".to_string(),
            dirty: false,
            remote_branches: Vec::new(),
            stash_depth: 0,
            operations: Vec::new(),
            fail_on: None,
        }
    }

    /// Set the branch checked out when the flow starts.
    pub fn with_current_branch(mut self, branch: impl Into<String>) -> Self {
        self.current_branch = branch.into();
        self
    }

    /// Mark the working tree as dirty at flow start.
    pub fn with_uncommitted_changes(mut self) -> Self {
        self.dirty = true;
        self
    }

    /// Register a remote-tracking branch (e.g. `"origin/develop"`).
    pub fn with_remote_branch(mut self, name: impl Into<String>) -> Self {
        self.remote_branches.push(name.into());
        self
    }

    /// Make the first operation whose log entry starts with `op` fail.
    pub fn fail_on(mut self, op: impl Into<String>) -> Self {
        self.fail_on = Some(op.into());
        self
    }

    /// Ordered log of every operation performed so far.
    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Number of entries currently in the stash.
    pub fn stash_depth(&self) -> usize {
        self.stash_depth
    }

    /// Branch currently checked out.
    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    fn record(&mut self, entry: String) -> Result<()> {
        if let Some(fail_on) = &self.fail_on {
            if entry.starts_with(fail_on.as_str()) {
                self.operations.push(format!("{} [FAILED]", entry));
                return Err(ReleaseError::Git(git2::Error::from_str(&format!(
                    "injected failure at '{}'",
                    entry
                ))));
            }
        }
        self.operations.push(entry);
        Ok(())
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn status(&self) -> Result<RepoStatus> {
        Ok(RepoStatus {
            branch: self.current_branch.clone(),
            has_changes: self.dirty,
        })
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        Ok(self
            .remote_branches
            .contains(&format!("{}/{}", remote, branch)))
    }

    fn checkout(&mut self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch))?;
        self.current_branch = branch.to_string();
        Ok(())
    }

    fn pull(&mut self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("pull {} {}", remote, branch))
    }

    fn push(&mut self, remote: &str, branch: &str, include_tags: bool) -> Result<()> {
        if include_tags {
            self.record(format!("push {} {} --tags", remote, branch))
        } else {
            self.record(format!("push {} {}", remote, branch))
        }
    }

    fn merge(&mut self, branch: &str) -> Result<()> {
        self.record(format!("merge {}", branch))
    }

    fn commit_paths(&mut self, paths: &[&Path], message: &str) -> Result<()> {
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        self.record(format!("commit {} [{}]", names.join(","), message))
    }

    fn create_annotated_tag(&mut self, name: &str, message: &str) -> Result<()> {
        self.record(format!("tag {} [{}]", name, message))
    }

    fn stash_save(&mut self) -> Result<()> {
        self.record("stash save".to_string())?;
        self.stash_depth += 1;
        self.dirty = false;
        Ok(())
    }

    fn stash_pop(&mut self) -> Result<()> {
        self.record("stash pop".to_string())?;
        if self.stash_depth == 0 {
            return Err(ReleaseError::Git(git2::Error::from_str(
                "no stash entries to pop",
            )));
        }
        self.stash_depth -= 1;
        self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_operations_in_order() {
        let mut repo = MockRepository::new();

        repo.checkout("develop").unwrap();
        repo.pull("origin", "develop").unwrap();
        repo.push("origin", "master", true).unwrap();

        assert_eq!(
            repo.operations(),
            &[
                "checkout develop".to_string(),
                "pull origin develop".to_string(),
                "push origin master --tags".to_string(),
            ]
        );
    }

    #[test]
    fn test_mock_tracks_current_branch() {
        let mut repo = MockRepository::new().with_current_branch("feature/x");
        assert_eq!(repo.status().unwrap().branch, "feature/x");

        repo.checkout("master").unwrap();
        assert_eq!(repo.status().unwrap().branch, "master");
    }

    #[test]
    fn test_mock_remote_branch_lookup() {
        let repo = MockRepository::new().with_remote_branch("origin/develop");
        assert!(repo.remote_branch_exists("origin", "develop").unwrap());
        assert!(!repo.remote_branch_exists("origin", "release").unwrap());
    }

    #[test]
    fn test_mock_stash_cycle() {
        let mut repo = MockRepository::new().with_uncommitted_changes();
        assert!(repo.status().unwrap().has_changes);

        repo.stash_save().unwrap();
        assert!(!repo.status().unwrap().has_changes);
        assert_eq!(repo.stash_depth(), 1);

        repo.stash_pop().unwrap();
        assert!(repo.status().unwrap().has_changes);
        assert_eq!(repo.stash_depth(), 0);
    }

    #[test]
    fn test_mock_injected_failure() {
        let mut repo = MockRepository::new().fail_on("push");

        repo.checkout("master").unwrap();
        let err = repo.push("origin", "master", false).unwrap_err();
        assert!(err.to_string().contains("injected failure"));
    }
}
