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

//! A local Erlang-distribution node built on top of `edp_client`: pid
//! allocation, mailbox registration, an outbound connection cache, and an
//! accept loop, exposed as a small `Node`/`Mailbox` handle pair.

pub mod config;
pub mod errors;
pub mod mailbox;
pub mod node;

pub use config::NodeConfig;
pub use errors::{Error, Result};
pub use mailbox::{Mailbox, Received};
pub use node::Node;
