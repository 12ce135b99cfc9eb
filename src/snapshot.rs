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

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::Serialize;
use tracing::{info, trace};

use crate::error::CollectError;
use crate::filter::{classify, Decision};
use crate::parser::parse_record;
use crate::types::{Pid, ProcessRecord, RecordKind};
use crate::walker::{walk, EntryKind};

/// Conventional mount point of the process information filesystem.
pub const PROC_ROOT: &str = "/proc";

/// Records gathered by a single traversal, keyed by pid.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Snapshot {
    records: BTreeMap<Pid, ProcessRecord>,
}

impl Snapshot {
    /// Store `fields` for `pid`, replacing earlier fields of the same kind.
    pub fn merge(&mut self, pid: Pid, kind: RecordKind, fields: Vec<String>) {
        let rec = self
            .records
            .entry(pid)
            .or_insert_with(|| ProcessRecord::new(pid));

        match kind {
            RecordKind::Environ => rec.environment = Some(fields),
            RecordKind::Cmdline => rec.command_line = Some(fields),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.values()
    }
}

#[cfg(test)]
impl Snapshot {
    pub fn get(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.records.get(&pid)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.records.contains_key(&pid)
    }

    pub fn pids(&self) -> Vec<Pid> {
        self.records.keys().copied().collect()
    }
}

// Linux caps pids at PID_MAX_LIMIT (2^22), well inside i32.
fn current_pid() -> Pid {
    Pid::try_from(std::process::id()).unwrap_or(Pid::MAX)
}

/// Walks a process filesystem and builds a [`Snapshot`] from it.
#[derive(Debug, Clone)]
pub struct Collector {
    root: PathBuf,
    own_pid: Pid,
    max_depth: Option<usize>,
}

impl Collector {
    pub fn new(root: impl Into<PathBuf>) -> Collector {
        Collector {
            root: root.into(),
            own_pid: current_pid(),
            max_depth: None,
        }
    }

    /// Treat `pid` as the collecting process instead of our own.
    #[cfg(test)]
    pub fn with_own_pid(mut self, pid: Pid) -> Collector {
        self.own_pid = pid;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Collector {
        self.max_depth = depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collect(&self) -> Result<Snapshot, CollectError> {
        let mut snapshot = Snapshot::default();

        let stats = walk(&self.root, self.max_depth, |path, entry| {
            self.visit(&mut snapshot, path, entry)
        })?;

        info!(
            "collected {} processes from {} ({} entries visited, {} skipped)",
            snapshot.len(),
            self.root.display(),
            stats.visited,
            stats.skipped
        );

        Ok(snapshot)
    }

    fn visit(
        &self,
        snapshot: &mut Snapshot,
        path: &Path,
        entry: EntryKind,
    ) -> Result<(), CollectError> {
        let (pid, kind) = match classify(&self.root, path, entry, self.own_pid)? {
            Decision::Collect { pid, kind } => (pid, kind),
            Decision::Skip(reason) => {
                if entry == EntryKind::File {
                    trace!("skip {}: {:?}", path.display(), reason);
                }
                return Ok(());
            }
        };

        let data = fs::read(path).map_err(|source| CollectError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let fields = parse_record(&data);
        trace!("pid {}: {} {} fields", pid, fields.len(), kind.file_name());
        snapshot.merge(pid, kind, fields);
        Ok(())
    }
}
