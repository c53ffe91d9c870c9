// Copyright (C) 2025-2026 Michael S. Klishin and Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Small convenience constructors for terms control messages and the
//! `gen_*` envelopes reach for constantly: the empty list, `ok`/`error`
//! atoms and the two-tuples built around them.

use erltf::OwnedTerm;

/// `[]`
pub fn nil() -> OwnedTerm {
    OwnedTerm::Nil
}

/// `ok`
pub fn ok() -> OwnedTerm {
    OwnedTerm::atom("ok")
}

/// `error`
pub fn error() -> OwnedTerm {
    OwnedTerm::atom("error")
}

/// `{ok, Value}`
pub fn ok_tuple(value: OwnedTerm) -> OwnedTerm {
    OwnedTerm::tuple(vec![ok(), value])
}

/// `{error, Reason}`
pub fn error_tuple(reason: OwnedTerm) -> OwnedTerm {
    OwnedTerm::tuple(vec![error(), reason])
}
