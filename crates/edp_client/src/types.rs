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

//! Small newtypes shared across the handshake, PID allocator and
//! fragmentation modules.

use std::fmt;

/// A node's creation counter, exchanged during the handshake and embedded
/// in every PID/port/reference the node hands out. Distinguishes PIDs from
/// a previous incarnation of the same node name after a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Creation(pub u32);

impl Creation {
    pub fn new(value: u32) -> Self {
        Creation(value)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Creation {
    fn from(value: u32) -> Self {
        Creation(value)
    }
}

impl fmt::Display for Creation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a fragmented distribution message (`DIST_FRAG_HEADER`'s
/// sequence number) so its fragments can be reassembled in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId(pub u64);

impl SequenceId {
    pub fn new(value: u64) -> Self {
        SequenceId(value)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for SequenceId {
    fn from(value: u64) -> Self {
        SequenceId(value)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
