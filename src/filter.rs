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

use std::path::{Component, Path};

use crate::error::CollectError;
use crate::types::{Pid, RecordKind};
use crate::walker::EntryKind;

/// Alias the kernel exposes for the reading process.
pub const SELF_ALIAS: &str = "self";

pub const INIT_PID: Pid = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Directory,
    UnrecognizedFile,
    SelfAlias,
    OwnProcess,
    InitProcess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Collect { pid: Pid, kind: RecordKind },
}

/// Decide whether `path`, found while walking `root`, is a record to collect.
///
/// Only `<root>/<pid>/environ` and `<root>/<pid>/cmdline` are collected.
/// Records of `own_pid`, of the `self` alias and of init are skipped. A
/// recognized file name in any other layout is an error for that entry.
pub fn classify(
    root: &Path,
    path: &Path,
    entry: EntryKind,
    own_pid: Pid,
) -> Result<Decision, CollectError> {
    if entry == EntryKind::Directory {
        return Ok(Decision::Skip(SkipReason::Directory));
    }

    let kind = match path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(RecordKind::from_file_name)
    {
        Some(kind) => kind,
        None => return Ok(Decision::Skip(SkipReason::UnrecognizedFile)),
    };

    let segment = pid_segment(root, path).ok_or_else(|| CollectError::NotARecordPath {
        path: path.to_path_buf(),
    })?;

    if segment == SELF_ALIAS {
        return Ok(Decision::Skip(SkipReason::SelfAlias));
    }

    let pid = segment
        .parse::<Pid>()
        .map_err(|source| CollectError::InvalidPid {
            path: path.to_path_buf(),
            segment: segment.to_owned(),
            source,
        })?;

    if pid <= 0 {
        return Err(CollectError::NotARecordPath {
            path: path.to_path_buf(),
        });
    }
    if pid == own_pid {
        return Ok(Decision::Skip(SkipReason::OwnProcess));
    }
    if pid == INIT_PID {
        return Ok(Decision::Skip(SkipReason::InitProcess));
    }

    Ok(Decision::Collect { pid, kind })
}

// The middle segment of `<root>/<segment>/<file>`, if path has that shape.
fn pid_segment<'a>(root: &Path, path: &'a Path) -> Option<&'a str> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();

    let segment = match components.next()? {
        Component::Normal(segment) => segment.to_str()?,
        _ => return None,
    };
    match components.next()? {
        Component::Normal(_) => {}
        _ => return None,
    }
    if components.next().is_some() {
        return None;
    }

    Some(segment)
}
