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

use erltf::types::ExternalPid;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("connection: {0}")]
    Connection(#[from] edp_client::errors::Error),

    #[error("no such local process: {0}")]
    NoProc(ExternalPid),

    #[error("name already registered: {0}")]
    NameAlreadyRegistered(String),

    #[error("name not registered: {0}")]
    NameNotRegistered(String),

    #[error("mailbox closed")]
    MailboxClosed,

    #[error("bad rpc response from {node}: {reason}")]
    BadRpc { node: String, reason: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
