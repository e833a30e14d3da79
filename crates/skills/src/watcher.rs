//! Filesystem watcher for skill trees.
//!
//! Watches scan roots for changes to `SKILL.md` files, skill attachments and
//! whole directories moved or deleted under a root, and signals through a channel so the owner can rescan and swap in a fresh
//! registry.

use std::path::{Path, PathBuf};

use {
    notify_debouncer_full::{
        DebounceEventResult, Debouncer, RecommendedCache, new_debouncer,
        notify::{
            EventKind, RecommendedWatcher, RecursiveMode,
            event::{CreateKind, ModifyKind, RemoveKind},
        },
    },
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    scan::{ASSETS_DIR, REFERENCES_DIR, SCRIPTS_DIR, SKILL_FILE},
};

/// Events emitted by the skill watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillWatchEvent {
    /// Something a scan would pick up was created, modified, or deleted.
    Changed,
}

/// Debounced watcher over one or more scan roots. Dropping it stops watching.
pub struct SkillWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl SkillWatcher {
    /// Start watching the given directories. Directories that do not exist
    /// are skipped.
    pub fn start(dirs: Vec<PathBuf>) -> Result<(Self, mpsc::UnboundedReceiver<SkillWatchEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(
            std::time::Duration::from_millis(500),
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let changed = events.iter().any(|event| {
                        event.paths.iter().any(|p| {
                            let hit = event_affects_scan(&event.kind, p);
                            if hit {
                                debug!(path = %p.display(), "skill watcher event");
                            }
                            hit
                        })
                    });
                    if changed {
                        let _ = tx.send(SkillWatchEvent::Changed);
                    }
                },
                Err(errors) => {
                    for e in errors {
                        warn!(error = %e, "skill watcher error");
                    }
                },
            },
        )
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        for dir in dirs.iter().filter(|d| d.is_dir()) {
            debouncer
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|e| Error::scan(dir, std::io::Error::other(e)))?;
            info!(dir = %dir.display(), "skill watcher: watching directory");
        }

        Ok((
            Self {
                _debouncer: debouncer,
            },
            rx,
        ))
    }
}

/// Whether a change at `path` can alter the result of a scan.
pub fn affects_scan(path: &Path) -> bool {
    if path.file_name().is_some_and(|n| n == SKILL_FILE) {
        return true;
    }
    path.ancestors().skip(1).any(|dir| {
        dir.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| [ASSETS_DIR, REFERENCES_DIR, SCRIPTS_DIR].contains(&n))
    })
}

/// Whether an event of `kind` at `path` can alter the result of a scan.
///
/// A directory created, removed or renamed may carry whole skills with it,
/// and a path that no longer exists may have been such a directory.
pub fn event_affects_scan(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
            if affects_scan(path) => true,
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => false,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            path.is_dir() || !path.exists()
        },
        EventKind::Modify(_) => affects_scan(path),
        EventKind::Any | EventKind::Access(_) | EventKind::Other => false,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevant_paths() {
        assert!(affects_scan(Path::new("/s/foo/SKILL.md")));
        assert!(affects_scan(Path::new("/s/foo/assets/template.md")));
        assert!(affects_scan(Path::new("/s/foo/references/a/b.md")));
        assert!(affects_scan(Path::new("/s/foo/scripts/run.py")));
        assert!(!affects_scan(Path::new("/s/foo/README.md")));
        assert!(!affects_scan(Path::new("/s/foo/skill.md")));
    }

    #[test]
    fn directory_moves_and_removals_are_relevant() {
        use notify_debouncer_full::notify::event::{DataChange, RenameMode};

        let tmp = tempfile::tempdir().unwrap();
        let moved_in = tmp.path().join("research");
        std::fs::create_dir_all(&moved_in).unwrap();
        std::fs::write(moved_in.join(SKILL_FILE), "---\nname: r\n---\n").unwrap();
        let readme = tmp.path().join("README.md");
        std::fs::write(&readme, "notes").unwrap();
        let gone = tmp.path().join("old-skill");

        let rename_to = EventKind::Modify(ModifyKind::Name(RenameMode::To));
        let rename_from = EventKind::Modify(ModifyKind::Name(RenameMode::From));
        assert!(event_affects_scan(&rename_to, &moved_in));
        assert!(event_affects_scan(&rename_from, &gone));
        assert!(event_affects_scan(
            &EventKind::Remove(RemoveKind::Folder),
            &gone
        ));
        assert!(event_affects_scan(
            &EventKind::Create(CreateKind::Any),
            &moved_in
        ));

        assert!(!event_affects_scan(
            &EventKind::Create(CreateKind::File),
            &readme
        ));
        assert!(!event_affects_scan(
            &EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &readme
        ));
        assert!(event_affects_scan(
            &EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &moved_in.join(SKILL_FILE)
        ));
    }

    #[tokio::test]
    async fn skill_directory_moved_into_root_signals_change() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        let staging = tmp.path().join("staging/market");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(
            staging.join(SKILL_FILE),
            "---\nname: market\ndescription: d\n---\n",
        )
        .unwrap();

        let (_watcher, mut rx) = SkillWatcher::start(vec![root.clone()]).unwrap();
        std::fs::rename(&staging, root.join("market")).unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(10), rx.recv())
            .await
            .expect("no watcher event within timeout");
        assert_eq!(event, Some(SkillWatchEvent::Changed));
    }

    #[tokio::test]
    async fn start_skips_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let (_watcher, _rx) = SkillWatcher::start(vec![
            tmp.path().to_path_buf(),
            PathBuf::from("/nonexistent/skilldex/watch"),
        ])
        .unwrap();
    }
}
