//! Low-level git2 helpers for staging and committing

use crate::error::{convert_git2_error, StorageResult};
use crate::types::{Author, CommitId};
use elasticgit_common::Pretty;
use git2::Repository;
use std::path::Path;
use tracing::debug;

/// Stage files, given relative to the workdir
pub fn add_files(repo: &Repository, paths: &[&str]) -> StorageResult<()> {
    debug!("Adding files to index: {}", Pretty(&paths));

    let mut index = repo
        .index()
        .map_err(|e| convert_git2_error("get_index", e))?;

    for path in paths {
        index
            .add_path(Path::new(path))
            .map_err(|e| convert_git2_error("add_path", e))?;
    }

    index
        .write()
        .map_err(|e| convert_git2_error("write_index", e))?;

    Ok(())
}

/// Unstage and forget files, given relative to the workdir
pub fn remove_files(repo: &Repository, paths: &[&str]) -> StorageResult<()> {
    debug!("Removing files from index: {}", Pretty(&paths));

    let mut index = repo
        .index()
        .map_err(|e| convert_git2_error("get_index", e))?;

    for path in paths {
        index
            .remove_path(Path::new(path))
            .map_err(|e| convert_git2_error("remove_path", e))?;
    }

    index
        .write()
        .map_err(|e| convert_git2_error("write_index", e))?;

    Ok(())
}

/// Commit the current index on HEAD with `author` as author and committer
pub fn create_commit(repo: &Repository, message: &str, author: &Author) -> StorageResult<CommitId> {
    debug!("Creating commit with message: {}", message);

    let signature = git2::Signature::now(&author.name, &author.email)
        .map_err(|e| convert_git2_error("create_signature", e))?;

    let mut index = repo
        .index()
        .map_err(|e| convert_git2_error("get_index", e))?;
    let tree_oid = index
        .write_tree()
        .map_err(|e| convert_git2_error("write_tree", e))?;
    let tree = repo
        .find_tree(tree_oid)
        .map_err(|e| convert_git2_error("find_tree", e))?;

    let parents: Vec<git2::Commit> = match repo.head() {
        Ok(head) => {
            let commit = head
                .peel_to_commit()
                .map_err(|e| convert_git2_error("peel_to_commit", e))?;
            vec![commit]
        }
        Err(_) => Vec::new(), // Initial commit
    };

    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    let commit_oid = repo
        .commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )
        .map_err(|e| convert_git2_error("create_commit", e))?;

    Ok(CommitId::new(commit_oid.to_string()))
}

/// Message and author name of the commit at HEAD
pub fn head_commit_summary(repo: &Repository) -> StorageResult<(String, String)> {
    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .map_err(|e| convert_git2_error("get_head_commit", e))?;
    let message = commit.message().unwrap_or_default().to_string();
    let author = commit.author().name().unwrap_or_default().to_string();
    Ok((message, author))
}
