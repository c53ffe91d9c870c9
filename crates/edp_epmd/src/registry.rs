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

//! The port-mapper's in-memory registry: `{alive name -> node info}`,
//! guarded for concurrent access the way a real epmd instance is shared
//! across every connected registrant and every lookup.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// A registered node's `ALIVE2_REQ` payload, kept around so `PORT4_REQ`
/// and `NAMES_REQ` can answer without re-parsing the original request.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub port: u16,
    pub node_type: u8,
    pub protocol: u8,
    pub highest_version: u16,
    pub lowest_version: u16,
    pub extra: Vec<u8>,
    pub creation: u32,
}

/// `{alive -> NodeEntry}`, plus the creation counter every `ALIVE2_RESP`
/// draws from.
pub struct Registry {
    nodes: DashMap<String, NodeEntry>,
    next_creation: AtomicU32,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            next_creation: AtomicU32::new(0),
        }
    }

    /// Cycles through `{1, 2, 3}`, matching the small creation range real
    /// epmd instances hand out.
    fn next_creation(&self) -> u32 {
        let n = self.next_creation.fetch_add(1, Ordering::Relaxed);
        (n % 3) + 1
    }

    /// Registers `alive`, replacing any prior entry under the same name.
    /// Returns the fresh creation value to report back in `ALIVE2_RESP`.
    pub fn publish(
        &self,
        alive: String,
        port: u16,
        node_type: u8,
        protocol: u8,
        highest_version: u16,
        lowest_version: u16,
        extra: Vec<u8>,
    ) -> u32 {
        let creation = self.next_creation();
        self.nodes.insert(
            alive,
            NodeEntry {
                port,
                node_type,
                protocol,
                highest_version,
                lowest_version,
                extra,
                creation,
            },
        );
        creation
    }

    pub fn lookup(&self, alive: &str) -> Option<NodeEntry> {
        self.nodes.get(alive).map(|e| e.clone())
    }

    pub fn names(&self) -> Vec<(String, u16)> {
        self.nodes
            .iter()
            .map(|e| (e.key().clone(), e.value().port))
            .collect()
    }

    pub fn unpublish(&self, alive: &str) {
        self.nodes.remove(alive);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_cycles_through_one_two_three() {
        let registry = Registry::new();
        let c1 = registry.publish("a@host".to_string(), 1, 77, 0, 6, 5, vec![]);
        let c2 = registry.publish("b@host".to_string(), 2, 77, 0, 6, 5, vec![]);
        let c3 = registry.publish("c@host".to_string(), 3, 77, 0, 6, 5, vec![]);
        let c4 = registry.publish("d@host".to_string(), 4, 77, 0, 6, 5, vec![]);
        assert_eq!((c1, c2, c3, c4), (1, 2, 3, 1));
    }

    #[test]
    fn publish_then_lookup_then_names_round_trip() {
        let registry = Registry::new();
        registry.publish("foo@host".to_string(), 9999, 77, 0, 6, 5, vec![]);

        let entry = registry.lookup("foo@host").unwrap();
        assert_eq!(entry.port, 9999);
        assert_eq!(registry.names(), vec![("foo@host".to_string(), 9999)]);
    }

    #[test]
    fn unpublish_removes_the_entry() {
        let registry = Registry::new();
        registry.publish("foo@host".to_string(), 9999, 77, 0, 6, 5, vec![]);
        registry.unpublish("foo@host");
        assert!(registry.lookup("foo@host").is_none());
    }

    #[test]
    fn republishing_replaces_the_prior_entry() {
        let registry = Registry::new();
        registry.publish("foo@host".to_string(), 1111, 77, 0, 6, 5, vec![]);
        registry.publish("foo@host".to_string(), 2222, 77, 0, 6, 5, vec![]);
        assert_eq!(registry.lookup("foo@host").unwrap().port, 2222);
        assert_eq!(registry.names().len(), 1);
    }
}
