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

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Failures met while collecting a snapshot.
///
/// Only `RootUnreachable` ends a traversal; every other variant is reported
/// for a single entry, which is then skipped.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("cannot open process root {}: {source}", .path.display())]
    RootUnreachable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("traversal error: {0}")]
    Traversal(#[from] walkdir::Error),

    #[error("{} is not a <root>/<pid>/<file> path", .path.display())]
    NotARecordPath { path: PathBuf },

    #[error("pid segment {segment:?} of {} is not a number: {source}", .path.display())]
    InvalidPid {
        path: PathBuf,
        segment: String,
        #[source]
        source: ParseIntError,
    },

    #[error("reading {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
