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

use serde_derive::Serialize;

pub type Pid = i32;

/// The per-process files we know how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Environ,
    Cmdline,
}

impl RecordKind {
    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::Environ => "environ",
            RecordKind::Cmdline => "cmdline",
        }
    }

    pub fn from_file_name(name: &str) -> Option<RecordKind> {
        if name == "environ" {
            Some(RecordKind::Environ)
        } else if name == "cmdline" {
            Some(RecordKind::Cmdline)
        } else {
            None
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    #[serde(rename = "env", skip_serializing_if = "is_empty")]
    pub environment: Option<Vec<String>>,
    #[serde(rename = "cmdline", skip_serializing_if = "is_empty")]
    pub command_line: Option<Vec<String>>,
}

impl ProcessRecord {
    pub fn new(pid: Pid) -> ProcessRecord {
        ProcessRecord {
            pid,
            ..Default::default()
        }
    }
}

fn is_empty(fields: &Option<Vec<String>>) -> bool {
    fields.as_ref().map_or(true, Vec::is_empty)
}
