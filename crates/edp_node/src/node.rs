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

//! The local node: pid allocation, the mailbox registry, the outbound
//! connection cache, and the accept loop that feeds inbound frames to
//! mailboxes. Built on top of `edp_client::connection::Connection`, which
//! does the actual handshaking and framing.

use crate::config::NodeConfig;
use crate::errors::{Error, Result};
use crate::mailbox::{Delivery, Mailbox, MailboxEntry};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use edp_client::connection::{Connection, ConnectionConfig};
use edp_client::control::ControlMessage;
use edp_client::epmd_client::{EpmdClient, NodeType};
use edp_client::flags::DistributionFlags;
use edp_client::pid_allocator::PidAllocator;
use edp_client::types::Creation;
use erltf::OwnedTerm;
use erltf::types::{Atom, ExternalPid, ExternalReference};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

type StatusCallback = Arc<dyn Fn(&str, bool, &str) + Send + Sync>;

const MAILBOX_CAPACITY: usize = 256;

/// One established distribution connection: a single-writer guard around
/// the handshake-completed [`Connection`], with its own reader task
/// already spawned and feeding frames back into the owning node.
pub(crate) struct PeerConnection {
    write: AsyncMutex<Connection>,
    reader: StdMutex<Option<JoinHandle<()>>>,
}

impl PeerConnection {
    pub(crate) async fn send_message(&self, from: ExternalPid, to: ExternalPid, term: OwnedTerm) -> Result<()> {
        self.write.lock().await.send_message(from, to, term).await.map_err(Error::from)
    }

    pub(crate) async fn send_to_name(&self, from: ExternalPid, name: Atom, term: OwnedTerm) -> Result<()> {
        self.write.lock().await.send_to_name(from, name, term).await.map_err(Error::from)
    }

    pub(crate) async fn link(&self, from: &ExternalPid, to: &ExternalPid) -> Result<()> {
        self.write.lock().await.link(from, to).await.map_err(Error::from)
    }

    pub(crate) async fn unlink(&self, from: &ExternalPid, to: &ExternalPid, id: u64) -> Result<()> {
        self.write.lock().await.unlink(from, to, id).await.map_err(Error::from)
    }

    pub(crate) async fn send_exit(&self, from: &ExternalPid, to: &ExternalPid, reason: OwnedTerm) -> Result<()> {
        self.write.lock().await.send_exit(from, to, reason).await.map_err(Error::from)
    }
}

impl Drop for PeerConnection {
    fn drop(&mut self) {
        if let Some(handle) = self.reader.lock().unwrap().take() {
            handle.abort();
        }
    }
}

pub(crate) struct NodeInner {
    node_name: Atom,
    cookie: String,
    epmd_host: String,
    epmd_port: u16,
    flags: DistributionFlags,
    timeout: Duration,
    creation: AtomicU32,
    pid_allocator: PidAllocator,
    ref_seq: AtomicU32,
    unlink_seq: AtomicU64,
    mailboxes_by_pid: DashMap<ExternalPid, Arc<MailboxEntry>>,
    mailboxes_by_name: DashMap<Atom, ExternalPid>,
    connections: DashMap<String, Arc<PeerConnection>>,
    accept_task: StdMutex<Option<JoinHandle<()>>>,
    epmd_conn: StdMutex<Option<TcpStream>>,
    local_status: StdMutex<Option<StatusCallback>>,
    remote_status: StdMutex<Option<StatusCallback>>,
    conn_attempt: StdMutex<Option<StatusCallback>>,
}

impl NodeInner {
    pub(crate) fn node_name(&self) -> &str {
        self.node_name.as_str()
    }

    pub(crate) fn is_local(&self, pid: &ExternalPid) -> bool {
        pid.node.as_str() == self.node_name.as_str()
    }

    pub(crate) fn mailbox_entry(&self, pid: &ExternalPid) -> Option<Arc<MailboxEntry>> {
        self.mailboxes_by_pid.get(pid).map(|e| e.clone())
    }

    pub(crate) fn lookup_name(&self, name: &Atom) -> Option<ExternalPid> {
        self.mailboxes_by_name.get(name).map(|e| e.clone())
    }

    pub(crate) fn remove_mailbox(&self, pid: &ExternalPid, name: Option<&Atom>) {
        self.mailboxes_by_pid.remove(pid);
        if let Some(name) = name {
            self.mailboxes_by_name.remove(name);
        }
    }

    pub(crate) fn deliver_local(&self, to: &ExternalPid, from: Option<ExternalPid>, body: OwnedTerm) -> Result<()> {
        let entry = self
            .mailboxes_by_pid
            .get(to)
            .ok_or_else(|| Error::NoProc(to.clone()))?;
        entry
            .sender
            .try_send(Delivery::Message { from, body })
            .map_err(|_| Error::MailboxClosed)
    }

    pub(crate) fn deliver_local_exit(&self, to: &ExternalPid, from: ExternalPid, reason: OwnedTerm) -> Result<()> {
        let entry = self
            .mailboxes_by_pid
            .get(to)
            .ok_or_else(|| Error::NoProc(to.clone()))?;
        entry
            .sender
            .try_send(Delivery::Exit { from, reason })
            .map_err(|_| Error::MailboxClosed)
    }

    pub(crate) fn make_reference(&self) -> ExternalReference {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let seq = self.ref_seq.fetch_add(1, Ordering::Relaxed);
        ExternalReference::new(
            self.node_name.clone(),
            self.creation.load(Ordering::Relaxed),
            vec![(nanos & 0xFFFF_FFFF) as u32, (nanos >> 32) as u32, seq],
        )
    }

    pub(crate) fn next_unlink_id(&self) -> u64 {
        self.unlink_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// A pseudo-pid standing in for the node's own `net_kernel`. Never
    /// transmitted: `Connection::send_message`'s `from_pid` parameter is
    /// discarded, since the wire-level SEND control message carries no
    /// sender field per the distribution protocol.
    fn local_pseudo_pid(&self) -> ExternalPid {
        ExternalPid::new(self.node_name.clone(), 0, 0, self.creation.load(Ordering::Relaxed))
    }

    /// `getOrCreate` on the connection cache: check under the map, dial
    /// outside it (blocks on EPMD lookup + handshake), then reacquire to
    /// publish — discarding our own connection if a concurrent caller won
    /// the race.
    pub(crate) async fn get_or_create_connection(node: &Arc<NodeInner>, remote: &str) -> Result<Arc<PeerConnection>> {
        if let Some(existing) = node.connections.get(remote) {
            return Ok(existing.clone());
        }

        let dialed = NodeInner::dial(node, remote).await?;

        match node.connections.entry(remote.to_string()) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(dialed.clone());
                Ok(dialed)
            }
        }
    }

    async fn dial(node: &Arc<NodeInner>, remote: &str) -> Result<Arc<PeerConnection>> {
        let config = ConnectionConfig::new(node.node_name.as_str(), remote, node.cookie.clone())
            .with_epmd_host(node.epmd_host.clone())
            .with_flags(node.flags)
            .with_creation(Creation(node.creation.load(Ordering::Relaxed)))
            .with_timeout(node.timeout);

        let mut conn = Connection::new(config);
        conn.connect().await?;
        debug!("Dialed {remote}");
        Ok(spawn_peer_connection(Arc::clone(node), conn, remote.to_string()))
    }

    fn report_connection_failure(&self, remote: &str, err: &edp_client::errors::Error) {
        self.connections.remove(remote);

        for entry in self.mailboxes_by_pid.iter() {
            let stranded: Vec<ExternalPid> = {
                let links = entry.value().links.lock().unwrap();
                links.iter().filter(|p| p.node.as_str() == remote).cloned().collect()
            };
            for peer in stranded {
                let _ = entry.value().sender.try_send(Delivery::Exit {
                    from: peer,
                    reason: OwnedTerm::atom("noconnection"),
                });
            }
        }

        if let Some(cb) = self.remote_status.lock().unwrap().as_ref() {
            cb(remote, false, &err.to_string());
        }
        if let Some(cb) = self.conn_attempt.lock().unwrap().as_ref() {
            cb(remote, true, &err.to_string());
        }
    }
}

/// Wraps a handshake-completed connection in a [`PeerConnection`], splits
/// off its read half, and spawns the reader task that feeds inbound
/// frames to this node's mailboxes until the connection fails.
fn spawn_peer_connection(node: Arc<NodeInner>, mut conn: Connection, remote: String) -> Arc<PeerConnection> {
    let read_half = conn.take_read_half();
    let timeout = node.timeout;

    let peer = Arc::new(PeerConnection {
        write: AsyncMutex::new(conn),
        reader: StdMutex::new(None),
    });

    if let Some(read_half) = read_half {
        let peer_for_task = Arc::clone(&peer);
        let handle = tokio::spawn(reader_loop(node, read_half, peer_for_task, remote, timeout));
        *peer.reader.lock().unwrap() = Some(handle);
    }

    peer
}

async fn reader_loop(
    node: Arc<NodeInner>,
    mut read_half: OwnedReadHalf,
    peer: Arc<PeerConnection>,
    remote: String,
    timeout: Duration,
) {
    loop {
        match Connection::receive_message_from_read_half(&mut read_half, timeout).await {
            Ok((control, payload)) => {
                dispatch_inbound(&node, &peer, &remote, control, payload).await;
            }
            Err(err) => {
                debug!("Connection to {remote} failed: {err}");
                node.report_connection_failure(&remote, &err);
                break;
            }
        }
    }
}

async fn dispatch_inbound(
    node: &Arc<NodeInner>,
    peer: &Arc<PeerConnection>,
    remote: &str,
    control: ControlMessage,
    payload: Option<OwnedTerm>,
) {
    match control {
        ControlMessage::Send { to_pid: OwnedTerm::Pid(to), .. } => {
            if let Some(body) = payload {
                if node.deliver_local(&to, None, body).is_err() {
                    trace!("dropped SEND to unknown local pid {to}");
                }
            }
        }
        ControlMessage::RegSend {
            from_pid: OwnedTerm::Pid(from),
            to_name: OwnedTerm::Atom(name),
            ..
        } => {
            let Some(body) = payload else { return };

            if name.as_str() == "net_kernel" {
                if let Some(reply) = net_kernel_is_auth_reply(&body) {
                    let _ = peer.send_message(node.local_pseudo_pid(), from, reply).await;
                    return;
                }
            }

            if let Some(target) = node.lookup_name(&name) {
                if node.deliver_local(&target, Some(from), body).is_err() {
                    trace!("dropped REG_SEND to {name:?} on {remote}: mailbox gone");
                }
            }
        }
        ControlMessage::Link {
            from_pid: OwnedTerm::Pid(from),
            to_pid: OwnedTerm::Pid(to),
        } => {
            if let Some(entry) = node.mailbox_entry(&to) {
                entry.links.lock().unwrap().insert(from);
            }
        }
        ControlMessage::UnlinkId {
            from_pid: OwnedTerm::Pid(from),
            to_pid: OwnedTerm::Pid(to),
            ..
        } => {
            if let Some(entry) = node.mailbox_entry(&to) {
                entry.links.lock().unwrap().remove(&from);
            }
        }
        ControlMessage::Exit {
            from_pid: OwnedTerm::Pid(from),
            to_pid: OwnedTerm::Pid(to),
            reason,
            ..
        }
        | ControlMessage::Exit2 {
            from_pid: OwnedTerm::Pid(from),
            to_pid: OwnedTerm::Pid(to),
            reason,
            ..
        } => {
            let _ = node.deliver_local_exit(&to, from, reason);
        }
        other => trace!("dropping unhandled control message from {remote}: {other:?}"),
    }
}

/// Matches `{'$gen_call', {FromPid, Ref}, {is_auth, _}}` and, if it
/// matches, returns the `{Ref, yes}` reply that makes `net_adm:ping/1`
/// succeed against us.
fn net_kernel_is_auth_reply(body: &OwnedTerm) -> Option<OwnedTerm> {
    let OwnedTerm::Tuple(items) = body else { return None };
    let [tag, from_and_ref, payload] = items.as_slice() else { return None };

    let OwnedTerm::Atom(tag) = tag else { return None };
    if tag.as_str() != "$gen_call" {
        return None;
    }

    let OwnedTerm::Tuple(from_and_ref) = from_and_ref else { return None };
    let [_from, reference] = from_and_ref.as_slice() else { return None };

    let OwnedTerm::Tuple(payload) = payload else { return None };
    let [kind, _node] = payload.as_slice() else { return None };
    let OwnedTerm::Atom(kind) = kind else { return None };
    if kind.as_str() != "is_auth" {
        return None;
    }

    Some(OwnedTerm::tuple(vec![reference.clone(), OwnedTerm::atom("yes")]))
}

/// A local node: owns pid allocation, the mailbox registry, the outbound
/// connection cache, and (once started) the accept loop and EPMD
/// registration.
pub struct Node {
    inner: Arc<NodeInner>,
}

impl Node {
    #[must_use]
    pub fn new(config: NodeConfig) -> Self {
        let node_name = Atom::new(&config.name);
        let pid_allocator = PidAllocator::new(node_name.clone(), Creation(0));

        let inner = Arc::new(NodeInner {
            node_name,
            cookie: config.cookie,
            epmd_host: config.epmd_host,
            epmd_port: config.epmd_port,
            flags: config.flags,
            timeout: config.timeout,
            creation: AtomicU32::new(0),
            pid_allocator,
            ref_seq: AtomicU32::new(0),
            unlink_seq: AtomicU64::new(0),
            mailboxes_by_pid: DashMap::new(),
            mailboxes_by_name: DashMap::new(),
            connections: DashMap::new(),
            accept_task: StdMutex::new(None),
            epmd_conn: StdMutex::new(None),
            local_status: StdMutex::new(None),
            remote_status: StdMutex::new(None),
            conn_attempt: StdMutex::new(None),
        });

        Self { inner }
    }

    pub fn on_local_status(&self, cb: impl Fn(&str, bool, &str) + Send + Sync + 'static) {
        *self.inner.local_status.lock().unwrap() = Some(Arc::new(cb));
    }

    pub fn on_remote_status(&self, cb: impl Fn(&str, bool, &str) + Send + Sync + 'static) {
        *self.inner.remote_status.lock().unwrap() = Some(Arc::new(cb));
    }

    pub fn on_conn_attempt(&self, cb: impl Fn(&str, bool, &str) + Send + Sync + 'static) {
        *self.inner.conn_attempt.lock().unwrap() = Some(Arc::new(cb));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.node_name()
    }

    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.inner.cookie
    }

    #[must_use]
    pub fn creation(&self) -> u32 {
        self.inner.creation.load(Ordering::Relaxed)
    }

    pub fn make_reference(&self) -> ExternalReference {
        self.inner.make_reference()
    }

    /// Binds `port` (0 picks an ephemeral one), registers with EPMD and
    /// keeps that connection open for the registration's lifetime, and
    /// starts the accept loop.
    pub async fn start(&mut self, port: u16) -> Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let actual_port = listener.local_addr()?.port();

        let (alive, _host) = self
            .inner
            .node_name
            .as_str()
            .split_once('@')
            .ok_or_else(|| edp_client::errors::Error::InvalidNodeName(self.inner.node_name.as_str().to_string()))?;

        let epmd = EpmdClient::with_port(self.inner.epmd_host.clone(), self.inner.epmd_port)
            .with_timeout(self.inner.timeout);
        let (creation, epmd_stream) = epmd
            .register_node_keepalive(actual_port, alive, NodeType::Normal, 6, 5, &[])
            .await?;

        self.inner.creation.store(creation, Ordering::Relaxed);
        self.inner.pid_allocator.set_creation(Creation(creation));
        *self.inner.epmd_conn.lock().unwrap() = Some(epmd_stream);

        if let Some(cb) = self.inner.local_status.lock().unwrap().as_ref() {
            cb(self.inner.node_name(), true, "started");
        }

        let node = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let node = Arc::clone(&node);
                        tokio::spawn(async move {
                            if let Err(err) = accept_connection(node, stream).await {
                                debug!("inbound handshake with {peer} failed: {err}");
                            }
                        });
                    }
                    Err(err) => {
                        warn!("accept loop stopped: {err}");
                        break;
                    }
                }
            }
        });
        *self.inner.accept_task.lock().unwrap() = Some(handle);

        Ok(())
    }

    /// Creates a mailbox, optionally registering it under `name`.
    pub fn create_mailbox(&self, name: Option<&str>) -> Result<Mailbox> {
        let pid = self.inner.pid_allocator.allocate()?;
        let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
        let entry = Arc::new(MailboxEntry::new(sender));

        self.inner.mailboxes_by_pid.insert(pid.clone(), Arc::clone(&entry));

        let name = match name {
            Some(raw) => {
                let atom = Atom::new(raw);
                if self.inner.mailboxes_by_name.contains_key(&atom) {
                    self.inner.mailboxes_by_pid.remove(&pid);
                    return Err(Error::NameAlreadyRegistered(raw.to_string()));
                }
                self.inner.mailboxes_by_name.insert(atom.clone(), pid.clone());
                Some(atom)
            }
            None => None,
        };

        Ok(Mailbox {
            node: Arc::clone(&self.inner),
            pid,
            name,
            entry,
            receiver,
        })
    }

    /// `send(node, "net_kernel", {'$gen_call', {self, ref}, {is_auth,
    /// node}})` from a throwaway mailbox, per `spec.md` §4.7's ping
    /// convenience envelope.
    pub async fn ping(&self, name: &str, timeout: Duration) -> Result<bool> {
        let mut mailbox = self.create_mailbox(None)?;
        mailbox.ping(name, timeout).await
    }

    /// `send(node, "rex", {self, {call, module, function, args, user}})`
    /// from a throwaway mailbox.
    pub async fn rpc(
        &self,
        name: &str,
        timeout: Duration,
        module: &str,
        function: &str,
        args: Vec<OwnedTerm>,
    ) -> Result<OwnedTerm> {
        let mut mailbox = self.create_mailbox(None)?;
        mailbox.rpc(name, timeout, module, function, args).await
    }

    /// Stops accepting, unpublishes from EPMD (dropping the keepalive
    /// connection), closes every cached connection, and drops every
    /// mailbox sender so blocked receivers wake with `MailboxClosed`.
    pub async fn close(&mut self) {
        if let Some(handle) = self.inner.accept_task.lock().unwrap().take() {
            handle.abort();
        }

        self.inner.epmd_conn.lock().unwrap().take();
        self.inner.connections.clear();
        self.inner.mailboxes_by_pid.clear();
        self.inner.mailboxes_by_name.clear();

        if let Some(cb) = self.inner.local_status.lock().unwrap().as_ref() {
            cb(self.inner.node_name(), false, "closed");
        }
    }
}

async fn accept_connection(node: Arc<NodeInner>, stream: TcpStream) -> Result<()> {
    let config = ConnectionConfig::new(node.node_name.as_str(), "", node.cookie.clone())
        .with_flags(node.flags)
        .with_creation(Creation(node.creation.load(Ordering::Relaxed)))
        .with_timeout(node.timeout);

    let conn = Connection::accept(stream, config).await?;
    let remote = conn.remote_node_name().to_string();
    debug!("Accepted connection from {remote}");
    spawn_peer_connection(node, conn, remote);
    Ok(())
}
