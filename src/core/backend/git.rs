//! Git-backed history using libgit2.

use super::HistoryBackend;
use crate::core::history::{CommitCount, CommitInfo, HistoryFilter, Responder};
use crate::error::{HistoryError, ServerError};
use chrono::DateTime;
use git2::{Commit, DiffOptions, ErrorCode, Oid, Repository, Sort};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::debug;

/// Branch and tag names pointing at a commit
#[derive(Debug, Default)]
struct Decoration {
    refs: Vec<String>,
    tags: Vec<String>,
}

/// History backend reading a local git repository
///
/// Every request runs on its own worker thread with its own repository
/// handle, so the caller never blocks on a history walk.
#[derive(Debug, Clone)]
pub struct GitHistoryBackend {
    root: PathBuf,
}

impl GitHistoryBackend {
    /// Open the repository containing `path`
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| HistoryError::Repository {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        let root = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { root })
    }

    /// Working directory (or git directory for bare repositories)
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn spawn<T, F>(&self, responder: Responder<T>, job: F)
    where
        T: 'static,
        F: FnOnce(&Repository) -> Result<T, ServerError> + Send + 'static,
    {
        let root = self.root.clone();
        thread::spawn(move || {
            let result = Repository::open(&root)
                .map_err(|e| ServerError::Unavailable(e.message().to_string()))
                .and_then(|repo| job(&repo));
            responder.respond(result);
        });
    }
}

impl HistoryBackend for GitHistoryBackend {
    fn history_count(&self, filter: &HistoryFilter, responder: Responder<CommitCount>) {
        let filter = filter.clone();
        self.spawn(responder, move |repo| {
            let mut count = 0;
            walk_history(repo, &filter, |_| {
                count += 1;
                ControlFlow::Continue(())
            })?;
            debug!(count, revision = %filter.revision, "counted history");
            Ok(CommitCount { count })
        });
    }

    fn history_page(
        &self,
        filter: &HistoryFilter,
        skip: usize,
        max_entries: usize,
        responder: Responder<Vec<CommitInfo>>,
    ) {
        let filter = filter.clone();
        self.spawn(responder, move |repo| {
            let mut rows = Vec::new();
            if max_entries == 0 {
                return Ok(rows);
            }

            let mut index = 0;
            walk_history(repo, &filter, |info| {
                if index >= skip {
                    rows.push(info);
                }
                index += 1;
                if rows.len() >= max_entries {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })?;
            debug!(skip, rows = rows.len(), "loaded history page");
            Ok(rows)
        });
    }
}

/// Visit matching commits newest first until `visit` breaks
fn walk_history<F>(repo: &Repository, filter: &HistoryFilter, mut visit: F) -> Result<(), ServerError>
where
    F: FnMut(CommitInfo) -> ControlFlow<()>,
{
    let Some(start) = start_commit(repo, &filter.revision)? else {
        return Ok(());
    };

    let path = filter
        .file_filter
        .as_deref()
        .map(|path| relative_to_workdir(repo, path));
    let decorations = decorations(repo)?;

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(start)?;

    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;

        if let Some(path) = &path {
            if !touches(repo, &commit, path)? {
                continue;
            }
        }

        let info = commit_info(&commit, decorations.get(&commit.id()));
        if !filter.matches_text(&info) {
            continue;
        }
        if visit(info).is_break() {
            break;
        }
    }

    Ok(())
}

/// `None` when the revision is empty and HEAD has no commits yet
fn start_commit(repo: &Repository, revision: &str) -> Result<Option<Oid>, ServerError> {
    let revision = revision.trim();

    if revision.is_empty() {
        return match repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        };
    }

    repo.revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .map(|commit| Some(commit.id()))
        .map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous => {
                ServerError::RevisionNotFound {
                    revision: revision.to_string(),
                }
            }
            _ => e.into(),
        })
}

fn relative_to_workdir(repo: &Repository, path: &Path) -> PathBuf {
    repo.workdir()
        .and_then(|workdir| path.strip_prefix(workdir).ok())
        .unwrap_or(path)
        .to_path_buf()
}

fn decorations(repo: &Repository) -> Result<HashMap<Oid, Decoration>, ServerError> {
    let mut decorations: HashMap<Oid, Decoration> = HashMap::new();

    for reference in repo.references()? {
        let reference = reference?;
        let Some(name) = reference.shorthand().map(str::to_string) else {
            continue;
        };
        let Ok(commit) = reference.peel_to_commit() else {
            continue;
        };

        let decoration = decorations.entry(commit.id()).or_default();
        if reference.is_tag() {
            decoration.tags.push(name);
        } else if reference.is_branch() || reference.is_remote() {
            decoration.refs.push(name);
        }
    }

    Ok(decorations)
}

/// Whether `commit` changed anything under `path` relative to its first parent
fn touches(repo: &Repository, commit: &Commit<'_>, path: &Path) -> Result<bool, git2::Error> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut options = DiffOptions::new();
    options.pathspec(path);
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;

    Ok(diff.deltas().len() > 0)
}

fn commit_info(commit: &Commit<'_>, decoration: Option<&Decoration>) -> CommitInfo {
    let signature = commit.author();
    let author = match (signature.name(), signature.email()) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.to_string(),
        (None, Some(email)) => format!("<{}>", email),
        (None, None) => String::new(),
    };

    CommitInfo {
        id: commit.id().to_string(),
        author,
        subject: commit.summary().unwrap_or_default().to_string(),
        description: commit.body().unwrap_or_default().trim_end().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        refs: decoration.map(|d| d.refs.clone()).unwrap_or_default(),
        tags: decoration.map(|d| d.tags.clone()).unwrap_or_default(),
        date: DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default(),
    }
}
