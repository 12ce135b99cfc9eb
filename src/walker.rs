// Copyright [2022] [Mark Benvenuto]
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::CollectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    pub skipped: usize,
}

/// Visit every entry below `root` depth first.
///
/// Symlinks are reported as files and never followed. Errors for a single
/// entry, whether raised while listing it or by `visit`, are logged and the
/// walk moves on. Only a root that cannot be opened stops the walk.
pub fn walk<F>(
    root: &Path,
    max_depth: Option<usize>,
    mut visit: F,
) -> Result<WalkStats, CollectError>
where
    F: FnMut(&Path, EntryKind) -> Result<(), CollectError>,
{
    let mut walker = WalkDir::new(root).follow_links(false);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut stats = WalkStats::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(CollectError::RootUnreachable {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                stats.skipped += 1;
                debug!("{}", CollectError::from(err));
                continue;
            }
        };

        stats.visited += 1;
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        if let Err(err) = visit(entry.path(), kind) {
            stats.skipped += 1;
            debug!("skipping {}: {}", entry.path().display(), err);
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("10/task/10")).unwrap();
        fs::write(dir.path().join("10/environ"), b"A=1\0").unwrap();
        fs::write(dir.path().join("10/task/10/environ"), b"A=1\0").unwrap();
        fs::write(dir.path().join("uptime"), b"1.0 2.0\n").unwrap();
        dir
    }

    #[test]
    fn test_visits_every_entry_once() {
        let dir = fixture();
        let mut seen: HashMap<PathBuf, (EntryKind, usize)> = HashMap::new();

        let stats = walk(dir.path(), None, |path, kind| {
            seen.entry(path.to_path_buf()).or_insert((kind, 0)).1 += 1;
            Ok(())
        })
        .unwrap();

        // root, 10, 10/environ, 10/task, 10/task/10, 10/task/10/environ, uptime
        assert_eq!(stats, WalkStats { visited: 7, skipped: 0 });
        assert_eq!(seen.len(), 7);
        assert!(seen.values().all(|(_, count)| *count == 1));
        assert_eq!(seen[dir.path()].0, EntryKind::Directory);
        assert_eq!(seen[&dir.path().join("10/task")].0, EntryKind::Directory);
        assert_eq!(seen[&dir.path().join("10/environ")].0, EntryKind::File);
        assert_eq!(seen[&dir.path().join("uptime")].0, EntryKind::File);
    }

    #[test]
    fn test_max_depth_limits_walk() {
        let dir = fixture();
        let mut paths = Vec::new();

        walk(dir.path(), Some(2), |path, _| {
            paths.push(path.to_path_buf());
            Ok(())
        })
        .unwrap();

        assert!(paths.contains(&dir.path().join("10/environ")));
        assert!(!paths.contains(&dir.path().join("10/task/10")));
    }

    #[test]
    fn test_visit_errors_do_not_stop_walk() {
        let dir = fixture();
        let mut calls = 0;

        let stats = walk(dir.path(), None, |path, _| {
            calls += 1;
            Err(CollectError::NotARecordPath {
                path: path.to_path_buf(),
            })
        })
        .unwrap();

        assert_eq!(calls, 7);
        assert_eq!(stats, WalkStats { visited: 7, skipped: 7 });
    }

    #[test]
    fn test_vanished_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        for pid in ["20", "21"] {
            fs::create_dir_all(dir.path().join(pid)).unwrap();
            fs::write(dir.path().join(pid).join("cmdline"), b"x\0").unwrap();
        }

        // the first process directory reached takes its sibling down with it
        let mut removed = false;
        let mut files = Vec::new();
        let stats = walk(dir.path(), None, |path, kind| {
            if kind == EntryKind::File {
                files.push(path.to_path_buf());
            } else if path != dir.path() && !removed {
                for pid in ["20", "21"] {
                    let sibling = dir.path().join(pid);
                    if sibling != path {
                        fs::remove_dir_all(&sibling).unwrap();
                    }
                }
                removed = true;
            }
            Ok(())
        })
        .unwrap();

        assert!(removed);
        assert_eq!(files.len(), 1);
        assert!(stats.skipped >= 1, "{stats:?}");
    }

    #[test]
    fn test_symlinks_are_not_followed() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("10"), dir.path().join("self"))
            .unwrap();
        let mut paths = Vec::new();

        walk(dir.path(), None, |path, kind| {
            paths.push((path.to_path_buf(), kind));
            Ok(())
        })
        .unwrap();

        assert!(paths.contains(&(dir.path().join("self"), EntryKind::File)));
        assert!(!paths.iter().any(|(p, _)| p == &dir.path().join("self/environ")));
    }

    #[test]
    fn test_missing_root_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("missing");

        let err = walk(&root, None, |_, _| Ok(())).unwrap_err();
        assert!(
            matches!(err, CollectError::RootUnreachable { ref path, .. } if path == &root)
        );
    }
}
