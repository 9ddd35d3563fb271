//! Git repository operations: staging, staged diff, and committing.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{DiffFormat, DiffOptions, Repository, Status, StatusOptions, Tree};
use tracing::debug;

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository containing the current directory, searching
    /// upward like the git CLI does.
    pub fn discover() -> Result<Self> {
        let repo = Repository::discover(".").context("Not in a git repository")?;
        Ok(Self { repo })
    }

    /// Opens the repository at the given path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    /// Returns the paths of files with staged changes, in index order.
    pub fn staged_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false);
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .context("Failed to get repository status")?;

        let staged = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;

        let mut files = Vec::new();
        for entry in statuses.iter() {
            if entry.status().intersects(staged) {
                if let Some(path) = entry.path() {
                    files.push(path.to_string());
                }
            }
        }
        Ok(files)
    }

    /// Whether the index differs from HEAD.
    pub fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.staged_files()?.is_empty())
    }

    /// Stages all changes in the working tree, like `git add -A`.
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index().context("Failed to read index")?;
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .context("Failed to stage changes")?;
        index
            .update_all(["*"].iter(), None)
            .context("Failed to stage deletions")?;
        index.write().context("Failed to write index")?;
        Ok(())
    }

    /// Renders the staged diff (HEAD tree vs. index) as unified patch
    /// text, the same content `git diff --cached` prints.
    pub fn staged_diff(&self) -> Result<String> {
        let head_tree = self.head_tree()?;
        let mut opts = DiffOptions::new();
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
            .context("Failed to diff HEAD against index")?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .context("Failed to render staged diff")?;

        debug!(bytes = text.len(), "collected staged diff");
        Ok(text)
    }

    /// Creates a commit from the index with the given message.
    ///
    /// Returns the short hash of the new commit.
    pub fn commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index().context("Failed to read index")?;
        let tree_id = index.write_tree().context("Failed to write tree")?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .context("Failed to find written tree")?;

        let signature = self
            .repo
            .signature()
            .context("Failed to resolve commit author (set user.name and user.email)")?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().context("Failed to resolve HEAD commit")?),
            // Unborn branch: first commit has no parent.
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e).context("Failed to get HEAD"),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .context("Failed to create commit")?;

        let short = oid.to_string().chars().take(7).collect();
        Ok(short)
    }

    /// HEAD's tree, or `None` on an unborn branch.
    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => {
                let tree = head
                    .peel_to_tree()
                    .context("Failed to peel HEAD to tree")?;
                Ok(Some(tree))
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e).context("Failed to get HEAD"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, GitRepository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        drop(repo);
        let wrapped = GitRepository::open_at(dir.path()).unwrap();
        (dir, wrapped)
    }

    fn write_and_stage(dir: &TempDir, repo: &GitRepository, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
        let mut index = repo.repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn fresh_repo_has_no_staged_changes() {
        let (_dir, repo) = init_repo();
        assert!(!repo.has_staged_changes().unwrap());
        assert!(repo.staged_files().unwrap().is_empty());
    }

    #[test]
    fn staged_file_appears_in_status_and_diff() {
        let (dir, repo) = init_repo();
        write_and_stage(&dir, &repo, "hello.txt", "hello world\n");

        assert!(repo.has_staged_changes().unwrap());
        assert_eq!(repo.staged_files().unwrap(), vec!["hello.txt".to_string()]);

        let diff = repo.staged_diff().unwrap();
        assert!(diff.contains("diff --git a/hello.txt b/hello.txt"));
        assert!(diff.contains("+hello world"));
    }

    #[test]
    fn unstaged_changes_stay_out_of_staged_diff() {
        let (dir, repo) = init_repo();
        write_and_stage(&dir, &repo, "a.txt", "staged\n");
        fs::write(dir.path().join("b.txt"), "not staged\n").unwrap();

        let files = repo.staged_files().unwrap();
        assert_eq!(files, vec!["a.txt".to_string()]);
        let diff = repo.staged_diff().unwrap();
        assert!(!diff.contains("b.txt"));
    }

    #[test]
    fn stage_all_picks_up_new_files() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("new.rs"), "fn main() {}\n").unwrap();

        assert!(!repo.has_staged_changes().unwrap());
        repo.stage_all().unwrap();
        assert_eq!(repo.staged_files().unwrap(), vec!["new.rs".to_string()]);
    }

    #[test]
    fn commit_on_unborn_branch_then_again() {
        let (dir, repo) = init_repo();
        write_and_stage(&dir, &repo, "one.txt", "1\n");
        let first = repo.commit("chore: initial commit").unwrap();
        assert_eq!(first.len(), 7);
        assert!(!repo.has_staged_changes().unwrap());

        write_and_stage(&dir, &repo, "two.txt", "2\n");
        repo.commit("feat: add two").unwrap();

        let head = repo.repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message().unwrap(), "feat: add two");
        assert_eq!(head.parent_count(), 1);
    }

    #[test]
    fn staged_diff_after_commit_shows_only_new_changes() {
        let (dir, repo) = init_repo();
        write_and_stage(&dir, &repo, "file.txt", "v1\n");
        repo.commit("chore: v1").unwrap();

        write_and_stage(&dir, &repo, "file.txt", "v2\n");
        let diff = repo.staged_diff().unwrap();
        assert!(diff.contains("-v1"));
        assert!(diff.contains("+v2"));
    }
}
