use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, Oid, StashFlags};

use crate::error::{ReleaseError, Result};
use crate::git::{RepoStatus, Repository};

/// Real [Repository] implementation backed by the `git2` crate.
///
/// Discovers the repository from the current working directory (or any
/// parent). Network operations (pull/push) authenticate via SSH keys
/// from `~/.ssh/` or the SSH agent.
pub struct Git2Repository {
    repo: git2::Repository,
}

impl Git2Repository {
    /// Discovers the git repository in the current directory or parent directories.
    ///
    /// # Returns
    /// * `Ok(Git2Repository)` - Successfully initialized repository wrapper
    /// * `Err` - If not in a git repository
    pub fn discover() -> Result<Self> {
        let repo = git2::Repository::discover(".")?;
        Ok(Git2Repository { repo })
    }

    /// Opens the repository at an explicit path. Used by tests.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = git2::Repository::open(path)?;
        Ok(Git2Repository { repo })
    }

    /// Builds remote callbacks with SSH credential resolution.
    ///
    /// Tries key files from `~/.ssh/` in order of preference, then the
    /// SSH agent, then default credentials.
    fn remote_callbacks() -> git2::RemoteCallbacks<'static> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                let key_paths = vec![
                    format!("{}/.ssh/id_ed25519", home),
                    format!("{}/.ssh/id_rsa", home),
                    format!("{}/.ssh/id_ecdsa", home),
                ];

                for key_path in key_paths {
                    let path = std::path::Path::new(&key_path);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(
                            username_from_url.unwrap_or("git"),
                            None,
                            path,
                            None,
                        ) {
                            return Ok(cred);
                        }
                    }
                }

                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
                {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });
        callbacks
    }

    /// Fast-forwards a local branch to its remote-tracking counterpart.
    ///
    /// Creates the local branch from the remote if it does not exist
    /// yet. Diverged branches are left alone; the caller's subsequent
    /// operations work on the local state.
    fn fast_forward_from_remote(&self, branch: &str, remote: &str) -> Result<()> {
        let tracking = format!("{}/{}", remote, branch);
        let remote_ref = match self
            .repo
            .find_reference(&format!("refs/remotes/{}", tracking))
        {
            Ok(r) => r,
            // Remote branch doesn't exist, nothing to update
            Err(_) => return Ok(()),
        };

        let remote_oid = remote_ref.target().ok_or_else(|| {
            ReleaseError::Git(git2::Error::from_str(&format!(
                "remote reference {} is not direct",
                tracking
            )))
        })?;

        let local_oid = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(b) => match b.into_reference().target() {
                Some(oid) => oid,
                None => return Ok(()),
            },
            Err(_) => {
                // Local branch doesn't exist yet, create it from remote
                let remote_commit = self.repo.find_commit(remote_oid)?;
                self.repo.branch(branch, &remote_commit, false)?;
                return Ok(());
            }
        };

        if local_oid == remote_oid {
            return Ok(());
        }

        if !self.repo.graph_descendant_of(remote_oid, local_oid)? {
            // Diverged or local is ahead; not a fast-forward
            return Ok(());
        }

        let mut reference = self
            .repo
            .find_reference(&format!("refs/heads/{}", branch))?;
        reference.set_target(remote_oid, &format!("fast-forward from {}", tracking))?;

        Ok(())
    }

    fn head_oid(&self) -> Result<Oid> {
        let head = self.repo.head()?;
        head.target().ok_or_else(|| {
            ReleaseError::Git(git2::Error::from_str("HEAD is detached or invalid"))
        })
    }
}

impl Repository for Git2Repository {
    fn status(&self) -> Result<RepoStatus> {
        let head = self.repo.head()?;
        let branch = head.shorthand().unwrap_or("HEAD").to_string();

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true);
        let statuses = self.repo.statuses(Some(&mut opts))?;

        Ok(RepoStatus {
            branch,
            has_changes: !statuses.is_empty(),
        })
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        match self
            .repo
            .find_reference(&format!("refs/remotes/{}/{}", remote, branch))
        {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout(&mut self, branch: &str) -> Result<()> {
        let refname = format!("refs/heads/{}", branch);
        let obj = self.repo.revparse_single(&refname)?;

        let mut builder = CheckoutBuilder::new();
        builder.safe();
        self.repo.checkout_tree(&obj, Some(&mut builder))?;
        self.repo.set_head(&refname)?;

        Ok(())
    }

    fn pull(&mut self, remote: &str, branch: &str) -> Result<()> {
        let mut git_remote = self.repo.find_remote(remote)?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(Self::remote_callbacks());

        let refspec = format!("+refs/heads/{b}:refs/remotes/{r}/{b}", b = branch, r = remote);
        git_remote.fetch(&[refspec.as_str()], Some(&mut fetch_options), None)?;

        self.fast_forward_from_remote(branch, remote)?;

        // If the fast-forwarded branch is checked out, sync the working tree
        if self.repo.head()?.shorthand() == Some(branch) {
            let mut builder = CheckoutBuilder::new();
            builder.force();
            self.repo.checkout_head(Some(&mut builder))?;
        }

        Ok(())
    }

    fn push(&mut self, remote: &str, branch: &str, include_tags: bool) -> Result<()> {
        let mut git_remote = self.repo.find_remote(remote)?;

        let mut callbacks = Self::remote_callbacks();
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                Err(git2::Error::from_str(&format!(
                    "push rejected for {}: {}",
                    refname, status
                )))
            } else {
                Ok(())
            }
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let branch_refspec = format!("refs/heads/{b}:refs/heads/{b}", b = branch);
        let mut refspecs = vec![branch_refspec];
        if include_tags {
            refspecs.push("refs/tags/*:refs/tags/*".to_string());
        }
        let refspecs: Vec<&str> = refspecs.iter().map(String::as_str).collect();

        git_remote.push(&refspecs, Some(&mut push_options))?;
        Ok(())
    }

    fn merge(&mut self, branch: &str) -> Result<()> {
        let their_ref = self
            .repo
            .find_branch(branch, BranchType::Local)?
            .into_reference();
        let annotated = self.repo.reference_to_annotated_commit(&their_ref)?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }

        if analysis.is_fast_forward() {
            let target = annotated.id();
            let mut head_ref = self.repo.head()?;
            head_ref.set_target(target, &format!("fast-forward merge of '{}'", branch))?;

            let mut builder = CheckoutBuilder::new();
            builder.force();
            self.repo.checkout_head(Some(&mut builder))?;
            return Ok(());
        }

        // Normal merge: merge into the index, then commit with two parents
        self.repo.merge(&[&annotated], None, None)?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            self.repo.cleanup_state()?;
            return Err(ReleaseError::Git(git2::Error::from_str(&format!(
                "merge of '{}' produced conflicts",
                branch
            ))));
        }

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.repo.signature()?;
        let head_commit = self.repo.find_commit(self.head_oid()?)?;
        let their_commit = self.repo.find_commit(annotated.id())?;

        self.repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &format!("Merge branch '{}'", branch),
            &tree,
            &[&head_commit, &their_commit],
        )?;
        self.repo.cleanup_state()?;

        Ok(())
    }

    fn commit_paths(&mut self, paths: &[&Path], message: &str) -> Result<()> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| {
                ReleaseError::Git(git2::Error::from_str(
                    "repository has no working directory",
                ))
            })?
            .canonicalize()?;

        let mut index = self.repo.index()?;
        for path in paths {
            // Index entries are workdir-relative; callers pass paths
            // relative to the process cwd (or absolute)
            let absolute = path.canonicalize()?;
            let relative = absolute.strip_prefix(&workdir).map_err(|_| {
                ReleaseError::Git(git2::Error::from_str(&format!(
                    "{} is outside the repository working directory",
                    path.display()
                )))
            })?;
            index.add_path(relative)?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.repo.signature()?;
        let parent = self.repo.find_commit(self.head_oid()?)?;

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;
        Ok(())
    }

    fn create_annotated_tag(&mut self, name: &str, message: &str) -> Result<()> {
        let head_obj = self.repo.head()?.peel(git2::ObjectType::Commit)?;
        let sig = self.repo.signature()?;
        self.repo.tag(name, &head_obj, &sig, message, false)?;
        Ok(())
    }

    fn stash_save(&mut self) -> Result<()> {
        let sig = self.repo.signature()?;
        self.repo.stash_save(
            &sig,
            "git-release: auto stash before release flow",
            Some(StashFlags::INCLUDE_UNTRACKED),
        )?;
        Ok(())
    }

    fn stash_pop(&mut self) -> Result<()> {
        self.repo.stash_pop(0, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_repo() -> (TempDir, git2::Repository) {
        let temp_dir = TempDir::new().expect("Could not create temp dir");
        let repo = git2::Repository::init(temp_dir.path()).expect("Could not init git repo");

        {
            let mut config = repo.config().expect("Could not get config");
            config
                .set_str("user.name", "Test User")
                .expect("Could not set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Could not set user.email");
        }

        fs::write(temp_dir.path().join("README.md"), b"Initial content\n")
            .expect("Could not write initial file");

        let mut index = repo.index().expect("Could not get index");
        index
            .add_path(Path::new("README.md"))
            .expect("Could not add file to index");
        index.write().expect("Could not write index");

        let tree_id = index.write_tree().expect("Could not write tree");
        {
            let tree = repo.find_tree(tree_id).expect("Could not find tree");
            let sig = repo.signature().expect("Could not get sig");
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .expect("Could not create commit");
        }

        (temp_dir, repo)
    }

    #[test]
    fn test_status_clean_repo() {
        let (temp_dir, _repo) = setup_test_repo();
        let git = Git2Repository::open(temp_dir.path()).unwrap();

        let status = git.status().unwrap();
        assert!(!status.has_changes);
        // Default branch name depends on git config; existence is enough
        assert!(!status.branch.is_empty());
    }

    #[test]
    fn test_status_dirty_repo() {
        let (temp_dir, _repo) = setup_test_repo();
        fs::write(temp_dir.path().join("untracked.txt"), b"dirty\n").unwrap();

        let git = Git2Repository::open(temp_dir.path()).unwrap();
        let status = git.status().unwrap();
        assert!(status.has_changes);
    }

    #[test]
    fn test_remote_branch_exists_without_remote() {
        let (temp_dir, _repo) = setup_test_repo();
        let git = Git2Repository::open(temp_dir.path()).unwrap();

        assert!(!git.remote_branch_exists("origin", "develop").unwrap());
    }

    #[test]
    fn test_commit_paths_and_tag() {
        let (temp_dir, repo) = setup_test_repo();
        let mut git = Git2Repository::open(temp_dir.path()).unwrap();

        let manifest = temp_dir.path().join("package.json");
        fs::write(&manifest, b"{\"version\": \"1.0.0\"}\n").unwrap();
        git.commit_paths(
            &[manifest.as_path()],
            "chore(package.json): bump version to 1.0.0",
        )
        .unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(
            head.message().unwrap(),
            "chore(package.json): bump version to 1.0.0"
        );

        git.create_annotated_tag("1.0.0", "first release").unwrap();
        let tag_ref = repo.find_reference("refs/tags/1.0.0").unwrap();
        let tag = tag_ref.peel_to_tag().unwrap();
        assert_eq!(tag.message().unwrap().trim(), "first release");
    }

    #[test]
    fn test_commit_paths_accepts_absolute_manifest_path() {
        let (temp_dir, repo) = setup_test_repo();
        let mut git = Git2Repository::open(temp_dir.path()).unwrap();

        // Absolute path, the shape `--manifest /abs/path` produces
        let manifest = temp_dir.path().join("package.json");
        fs::write(&manifest, b"{\"version\": \"0.4.3\"}\n").unwrap();
        git.commit_paths(
            &[manifest.as_path()],
            "chore(package.json): bump version to 0.4.3",
        )
        .unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        let tree = head.tree().unwrap();
        assert!(tree.get_name("package.json").is_some());
    }

    #[test]
    fn test_commit_paths_rejects_path_outside_repo() {
        let (temp_dir, _repo) = setup_test_repo();
        let outside = TempDir::new().unwrap();
        let manifest = outside.path().join("package.json");
        fs::write(&manifest, b"{\"version\": \"0.4.3\"}\n").unwrap();

        let mut git = Git2Repository::open(temp_dir.path()).unwrap();
        let err = git
            .commit_paths(
                &[manifest.as_path()],
                "chore(package.json): bump version to 0.4.3",
            )
            .unwrap_err();
        assert!(err.to_string().contains("outside the repository"));
    }

    #[test]
    fn test_stash_save_and_pop() {
        let (temp_dir, _repo) = setup_test_repo();
        let mut git = Git2Repository::open(temp_dir.path()).unwrap();

        fs::write(temp_dir.path().join("README.md"), b"Modified content\n").unwrap();
        assert!(git.status().unwrap().has_changes);

        git.stash_save().unwrap();
        assert!(!git.status().unwrap().has_changes);

        git.stash_pop().unwrap();
        assert!(git.status().unwrap().has_changes);
        let restored = fs::read_to_string(temp_dir.path().join("README.md")).unwrap();
        assert_eq!(restored, "Modified content\n");
    }

    #[test]
    fn test_checkout_and_merge_fast_forward() {
        let (temp_dir, repo) = setup_test_repo();

        let initial_branch = repo.head().unwrap().shorthand().unwrap().to_string();

        // Create a develop branch with one extra commit
        {
            let head_commit = repo.head().unwrap().peel_to_commit().unwrap();
            repo.branch("develop", &head_commit, false).unwrap();
        }

        let mut git = Git2Repository::open(temp_dir.path()).unwrap();
        git.checkout("develop").unwrap();

        let feature = temp_dir.path().join("feature.txt");
        fs::write(&feature, b"new feature\n").unwrap();
        git.commit_paths(&[feature.as_path()], "feat: add feature")
            .unwrap();
        let develop_oid = repo.head().unwrap().target().unwrap();

        // Back on the initial branch, merging develop fast-forwards
        git.checkout(&initial_branch).unwrap();
        git.merge("develop").unwrap();

        assert_eq!(repo.head().unwrap().target().unwrap(), develop_oid);
        assert!(temp_dir.path().join("feature.txt").exists());
    }
}
