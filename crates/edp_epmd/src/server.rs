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

//! The daemon side of the port-mapper protocol `edp_client::epmd_client`
//! speaks. One cooperative task per accepted connection, mirroring the
//! wire format the client already encodes/decodes.

use crate::registry::Registry;
use bytes::{Buf, BufMut, BytesMut};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, trace, warn};

const ALIVE2_REQ: u8 = 120;
const ALIVE2_RESP: u8 = 121;
const PORT2_REQ: u8 = 122;
const PORT2_RESP: u8 = 119;
const NAMES_REQ: u8 = 110;
const STOP_REQ: u8 = 115;

/// Accepts connections on `listener` forever, spawning one task per peer.
/// Returns only if `accept` itself errors (the listener socket died).
pub async fn serve(listener: TcpListener, registry: Arc<Registry>, epmd_port: u16) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let registry = Arc::clone(&registry);
        debug!("Accepted connection from {peer}");
        tokio::spawn(async move {
            handle_connection(stream, registry, epmd_port).await;
        });
    }
}

/// Drives one connection through the dispatch table in spec.md §4.4 until
/// the peer disconnects or sends something the protocol doesn't retain
/// the connection for, unpublishing anything this connection registered
/// on the way out.
async fn handle_connection(mut stream: TcpStream, registry: Arc<Registry>, epmd_port: u16) {
    let mut registered_here: Vec<String> = Vec::new();

    loop {
        let len = match stream.read_u16().await {
            Ok(n) => n,
            Err(_) => break,
        };
        let mut body = vec![0u8; len as usize];
        if stream.read_exact(&mut body).await.is_err() {
            break;
        }
        if body.is_empty() {
            break;
        }

        match body[0] {
            ALIVE2_REQ => {
                let Some((alive, reply)) = handle_alive2_req(&body[1..], &registry) else {
                    warn!("Malformed ALIVE2_REQ, closing connection");
                    break;
                };
                if stream.write_all(&reply).await.is_err() {
                    break;
                }
                let _ = stream.flush().await;
                registered_here.push(alive);
                // Retain the connection: the registrant holds it open for
                // the lifetime of the registration.
            }
            PORT2_REQ => {
                let reply = handle_port_req(&body[1..], &registry);
                let _ = stream.write_all(&reply).await;
                let _ = stream.flush().await;
                break;
            }
            NAMES_REQ => {
                let reply = handle_names_req(&registry, epmd_port);
                let _ = stream.write_all(&reply).await;
                let _ = stream.flush().await;
                break;
            }
            STOP_REQ => {
                trace!("STOP_REQ received, closing connection");
                break;
            }
            other => {
                warn!("Unknown EPMD request tag {other}, closing connection");
                break;
            }
        }
    }

    for alive in registered_here {
        debug!("Connection closed, unpublishing {alive}");
        registry.unpublish(&alive);
    }
}

fn handle_alive2_req(mut body: &[u8], registry: &Registry) -> Option<(String, Vec<u8>)> {
    if body.remaining() < 2 + 1 + 1 + 2 + 2 + 2 {
        return None;
    }
    let port = body.get_u16();
    let node_type = body.get_u8();
    let protocol = body.get_u8();
    let highest_version = body.get_u16();
    let lowest_version = body.get_u16();

    let name_len = body.get_u16() as usize;
    if body.remaining() < name_len {
        return None;
    }
    let name = std::str::from_utf8(&body[..name_len]).ok()?.to_owned();
    body.advance(name_len);

    if body.remaining() < 2 {
        return None;
    }
    let extra_len = body.get_u16() as usize;
    if body.remaining() < extra_len {
        return None;
    }
    let extra = body[..extra_len].to_vec();

    let creation = registry.publish(
        name.clone(),
        port,
        node_type,
        protocol,
        highest_version,
        lowest_version,
        extra,
    );

    let mut reply = BytesMut::new();
    reply.put_u8(ALIVE2_RESP);
    reply.put_u8(0);
    reply.put_u16(creation as u16);

    Some((name, reply.to_vec()))
}

fn handle_port_req(body: &[u8], registry: &Registry) -> Vec<u8> {
    let mut reply = BytesMut::new();
    let Ok(alive) = std::str::from_utf8(body) else {
        reply.put_u8(PORT2_RESP);
        reply.put_u8(1);
        return reply.to_vec();
    };

    match registry.lookup(alive) {
        Some(entry) => {
            reply.put_u8(PORT2_RESP);
            reply.put_u8(0);
            reply.put_u16(entry.port);
            reply.put_u8(entry.node_type);
            reply.put_u8(entry.protocol);
            reply.put_u16(entry.highest_version);
            reply.put_u16(entry.lowest_version);
            reply.put_u16(alive.len() as u16);
            reply.put_slice(alive.as_bytes());
            reply.put_u16(entry.extra.len() as u16);
            reply.put_slice(&entry.extra);
        }
        None => {
            reply.put_u8(PORT2_RESP);
            reply.put_u8(1);
        }
    }
    reply.to_vec()
}

fn handle_names_req(registry: &Registry, epmd_port: u16) -> Vec<u8> {
    let mut reply = BytesMut::new();
    reply.put_u32(epmd_port as u32);
    for (name, port) in registry.names() {
        reply.put_slice(format!("name {name} at port {port}\n").as_bytes());
    }
    reply.to_vec()
}
