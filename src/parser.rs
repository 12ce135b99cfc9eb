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

use memchr::memchr_iter;

const NUL: u8 = 0;

/// Decodes a NUL separated record such as `/proc/<pid>/environ`.
///
/// The kernel terminates every field, including the last one, so a single
/// trailing NUL is dropped before splitting. `b"\0"` therefore decodes to one
/// empty field, while empty input decodes to none.
pub fn parse_record(data: &[u8]) -> Vec<String> {
    let body = match data.split_last() {
        None => return Vec::new(),
        Some((&NUL, rest)) => rest,
        Some(_) => data,
    };

    let mut fields = Vec::new();
    let mut start = 0;
    for end in memchr_iter(NUL, body) {
        fields.push(to_field(&body[start..end]));
        start = end + 1;
    }
    fields.push(to_field(&body[start..]));

    fields
}

fn to_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
