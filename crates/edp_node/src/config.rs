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

//! Node configuration: the distribution name, cookie resolution, and the
//! port-mapper host/port a [`crate::node::Node`] registers against.

use edp_client::epmd_client::EPMD_PORT;
use edp_client::flags::DistributionFlags;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub name: String,
    pub cookie: String,
    pub epmd_host: String,
    pub epmd_port: u16,
    pub flags: DistributionFlags,
    pub timeout: Duration,
}

impl NodeConfig {
    /// `name` is the full `alive@host` distribution name. The cookie is
    /// resolved the way `net_kernel` resolves it: an explicit value here,
    /// falling back to the first line of `~/.erlang.cookie`, falling back
    /// to the empty string.
    pub fn new(name: impl Into<String>, cookie: Option<String>) -> Self {
        Self {
            name: name.into(),
            cookie: cookie.unwrap_or_else(resolve_cookie),
            epmd_host: "localhost".to_string(),
            epmd_port: resolve_epmd_port(),
            flags: DistributionFlags::default_otp26(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_epmd_host(mut self, host: impl Into<String>) -> Self {
        self.epmd_host = host.into();
        self
    }

    pub fn with_epmd_port(mut self, port: u16) -> Self {
        self.epmd_port = port;
        self
    }

    pub fn with_flags(mut self, flags: DistributionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `ERL_EPMD_PORT`, parsed as `u16`, defaulting to 4369.
fn resolve_epmd_port() -> u16 {
    std::env::var("ERL_EPMD_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(EPMD_PORT)
}

/// First line of `~/.erlang.cookie`, trimmed; empty string if absent or
/// unreadable. An empty-cookie node can only ever talk to another
/// empty-cookie node, same as real `net_kernel`.
fn resolve_cookie() -> String {
    dirs::home_dir()
        .map(|home| home.join(".erlang.cookie"))
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|contents| contents.lines().next().map(|l| l.trim().to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_cookie_overrides_file_resolution() {
        let cfg = NodeConfig::new("a@localhost", Some("mycookie".to_string()));
        assert_eq!(cfg.cookie, "mycookie");
    }

    #[test]
    fn epmd_port_defaults_to_4369_without_env() {
        // SAFETY: test-only env var removal, single-threaded within this test.
        unsafe {
            std::env::remove_var("ERL_EPMD_PORT");
        }
        assert_eq!(resolve_epmd_port(), 4369);
    }
}
