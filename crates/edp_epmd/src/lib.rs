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

//! A standalone Erlang Port Mapper Daemon (EPMD) server: the other half
//! of the wire protocol `edp_client::epmd_client` speaks.

pub mod errors;
pub mod registry;
pub mod server;

pub use errors::{Error, Result};
pub use registry::{NodeEntry, Registry};
pub use server::serve;

/// Default EPMD port, matching `edp_client::epmd_client::EPMD_PORT`.
pub const EPMD_PORT: u16 = 4369;
