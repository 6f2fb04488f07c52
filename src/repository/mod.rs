//! On-disk repository layout: the `.git` skeleton, refs, and working-tree
//! checkout driven by the object graph.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::object::{
        ObjectTrait,
        commit::Commit,
        tree::{Tree, TreeItemMode},
        types::ObjectType,
    },
    storage::LooseStore,
};

/// A local repository: a working directory, its `.git` control directory, and
/// the loose store underneath `.git/objects`.
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
    store: LooseStore,
}

impl Repository {
    /// Create the `.git` skeleton under `work_dir` and point `HEAD` at
    /// `head_ref` (e.g. `refs/heads/main`). Directories that already exist are
    /// left alone.
    pub fn init(work_dir: impl Into<PathBuf>, head_ref: &str) -> Result<Repository, GitError> {
        let work_dir = work_dir.into();
        let git_dir = work_dir.join(".git");
        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs"))?;
        fs::write(git_dir.join("HEAD"), format!("ref: {head_ref}\n"))?;
        tracing::debug!("initialized repository at {}", work_dir.display());

        let store = LooseStore::new(git_dir.join("objects"));
        Ok(Repository {
            work_dir,
            git_dir,
            store,
        })
    }

    /// Open an already-initialized repository.
    pub fn open(work_dir: impl Into<PathBuf>) -> Result<Repository, GitError> {
        let work_dir = work_dir.into();
        let git_dir = work_dir.join(".git");
        if !git_dir.join("HEAD").is_file() {
            return Err(GitError::IOError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no repository at {}", work_dir.display()),
            )));
        }
        let store = LooseStore::new(git_dir.join("objects"));
        Ok(Repository {
            work_dir,
            git_dir,
            store,
        })
    }

    pub fn store(&self) -> &LooseStore {
        &self.store
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Write the tip hash for a ref like `refs/heads/main`.
    pub fn update_ref(&self, ref_name: &str, hash: &ObjectHash) -> Result<(), GitError> {
        let path = self.git_dir.join(ref_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{hash}\n"))?;
        Ok(())
    }

    /// Read the hash a ref currently points at.
    pub fn read_ref(&self, ref_name: &str) -> Result<ObjectHash, GitError> {
        let content = fs::read_to_string(self.git_dir.join(ref_name))
            .map_err(|_| GitError::ObjectNotFound(format!("ref {ref_name}")))?;
        ObjectHash::from_str(content.trim()).map_err(GitError::InvalidHashValue)
    }

    /// Materialize the working tree for a commit: load it, follow its tree
    /// pointer, and write every reachable blob under the working directory.
    pub fn checkout_commit(&self, commit_id: &ObjectHash) -> Result<(), GitError> {
        let body = self.store.get_typed(commit_id, ObjectType::Commit)?;
        let commit = Commit::from_bytes(&body, *commit_id)?;
        tracing::debug!("checking out commit {commit_id}");
        self.checkout_tree(&commit.tree_id, &self.work_dir)
    }

    fn checkout_tree(&self, tree_id: &ObjectHash, dir: &Path) -> Result<(), GitError> {
        let body = self.store.get_typed(tree_id, ObjectType::Tree)?;
        let tree = Tree::from_bytes(&body, *tree_id)?;

        fs::create_dir_all(dir)?;
        for item in &tree.tree_items {
            let target = dir.join(&item.name);
            match item.mode {
                TreeItemMode::Tree => self.checkout_tree(&item.id, &target)?,
                TreeItemMode::Blob | TreeItemMode::BlobExecutable => {
                    let content = self.store.get_typed(&item.id, ObjectType::Blob)?;
                    fs::write(&target, content)?;
                    #[cfg(unix)]
                    if item.mode.is_executable() {
                        use std::os::unix::fs::PermissionsExt;
                        fs::set_permissions(&target, fs::Permissions::from_mode(0o755))?;
                    }
                }
                TreeItemMode::Link => {
                    let content = self.store.get_typed(&item.id, ObjectType::Blob)?;
                    let link_target = PathBuf::from(String::from_utf8_lossy(&content).to_string());
                    #[cfg(unix)]
                    {
                        if target.symlink_metadata().is_ok() {
                            fs::remove_file(&target)?;
                        }
                        std::os::unix::fs::symlink(&link_target, &target)?;
                    }
                    #[cfg(not(unix))]
                    fs::write(&target, link_target.display().to_string())?;
                }
                TreeItemMode::Commit => {
                    tracing::warn!(
                        "skipping submodule entry `{}` at {}",
                        item.name,
                        dir.display()
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::Repository;
    use crate::internal::object::{
        ObjectTrait,
        commit::Commit,
        tree::{Tree, TreeItem, TreeItemMode},
        types::ObjectType,
    };

    #[test]
    fn init_creates_git_skeleton() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path(), "refs/heads/main").unwrap();

        assert!(repo.git_dir().join("objects").is_dir());
        assert!(repo.git_dir().join("refs").is_dir());
        let head = fs::read_to_string(repo.git_dir().join("HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/main\n");
    }

    #[test]
    fn refs_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path(), "refs/heads/main").unwrap();
        let hash = crate::hash::ObjectHash::new(b"tip");
        repo.update_ref("refs/heads/main", &hash).unwrap();
        assert_eq!(repo.read_ref("refs/heads/main").unwrap(), hash);
    }

    #[test]
    fn open_requires_existing_repository() {
        let dir = TempDir::new().unwrap();
        assert!(Repository::open(dir.path()).is_err());
        Repository::init(dir.path(), "refs/heads/main").unwrap();
        assert!(Repository::open(dir.path()).is_ok());
    }

    #[test]
    fn checkout_writes_nested_working_tree() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path(), "refs/heads/main").unwrap();
        let store = repo.store();

        let readme = store.put(ObjectType::Blob, b"read me\n").unwrap();
        let script = store.put(ObjectType::Blob, b"#!/bin/sh\n").unwrap();
        let inner_tree = Tree::from_tree_items(vec![TreeItem::new(
            TreeItemMode::BlobExecutable,
            script,
            "run.sh".to_string(),
        )])
        .unwrap();
        store
            .put(ObjectType::Tree, &inner_tree.to_data().unwrap())
            .unwrap();
        let root_tree = Tree::from_tree_items(vec![
            TreeItem::new(TreeItemMode::Blob, readme, "README.md".to_string()),
            TreeItem::new(TreeItemMode::Tree, inner_tree.id, "bin".to_string()),
        ])
        .unwrap();
        store
            .put(ObjectType::Tree, &root_tree.to_data().unwrap())
            .unwrap();
        let commit =
            Commit::from_tree_id(root_tree.id, None, "Eli Ham", "eli@example.com", "init").unwrap();
        store
            .put(ObjectType::Commit, &commit.to_data().unwrap())
            .unwrap();

        repo.checkout_commit(&commit.id).unwrap();

        assert_eq!(
            fs::read(dir.path().join("README.md")).unwrap(),
            b"read me\n"
        );
        let script_path = dir.path().join("bin").join("run.sh");
        assert_eq!(fs::read(&script_path).unwrap(), b"#!/bin/sh\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&script_path).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0, "executable bit should be set");
        }
    }
}
