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

//! A mailbox: the unit the caller actually drives. Created through
//! [`crate::node::Node::create_mailbox`], it owns its pid, its optional
//! registered name, and the link set that's notified when it closes.

use crate::errors::{Error, Result};
use crate::node::NodeInner;
use erltf::OwnedTerm;
use erltf::types::{Atom, ExternalPid};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::mpsc;

/// What's actually queued for a mailbox: either a regular message, or an
/// EXIT/EXIT2 signal that the next `receive` must surface distinctly.
pub(crate) enum Delivery {
    Message {
        #[allow(dead_code)]
        from: Option<ExternalPid>,
        body: OwnedTerm,
    },
    Exit {
        from: ExternalPid,
        reason: OwnedTerm,
    },
}

/// Shared with the node's by-pid registry: the sending half and link set
/// every other task reaches through, independent of the receiving half a
/// [`Mailbox`] alone owns.
pub(crate) struct MailboxEntry {
    pub(crate) sender: mpsc::Sender<Delivery>,
    pub(crate) links: StdMutex<HashSet<ExternalPid>>,
}

impl MailboxEntry {
    pub(crate) fn new(sender: mpsc::Sender<Delivery>) -> Self {
        Self {
            sender,
            links: StdMutex::new(HashSet::new()),
        }
    }
}

/// The outcome of a `receive`: a delivered message, the distinct "nothing
/// arrived before the deadline" indication, or a dequeued exit signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Message(OwnedTerm),
    Empty,
    Exit { reason: OwnedTerm, from: ExternalPid },
}

pub struct Mailbox {
    pub(crate) node: Arc<NodeInner>,
    pub(crate) pid: ExternalPid,
    pub(crate) name: Option<Atom>,
    pub(crate) entry: Arc<MailboxEntry>,
    pub(crate) receiver: mpsc::Receiver<Delivery>,
}

impl Mailbox {
    #[must_use]
    pub fn pid(&self) -> &ExternalPid {
        &self.pid
    }

    #[must_use]
    pub fn name(&self) -> Option<&Atom> {
        self.name.as_ref()
    }

    /// Blocks until a message arrives, the mailbox is closed, or an
    /// exit signal surfaces.
    pub async fn receive(&mut self) -> Result<Received> {
        match self.receiver.recv().await {
            Some(Delivery::Message { body, .. }) => Ok(Received::Message(body)),
            Some(Delivery::Exit { from, reason }) => Ok(Received::Exit { reason, from }),
            None => Err(Error::MailboxClosed),
        }
    }

    /// Like [`Mailbox::receive`], but returns `Ok(Received::Empty)` instead
    /// of blocking forever when nothing arrives within `timeout`. A timeout
    /// never drains the queue.
    pub async fn receive_timeout(&mut self, timeout: Duration) -> Result<Received> {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Ok(Some(Delivery::Message { body, .. })) => Ok(Received::Message(body)),
            Ok(Some(Delivery::Exit { from, reason })) => Ok(Received::Exit { reason, from }),
            Ok(None) => Err(Error::MailboxClosed),
            Err(_) => Ok(Received::Empty),
        }
    }

    /// Sends `term` to `to`. Local delivery is a direct handoff through
    /// the destination mailbox's channel; `term` is owned by this call, so
    /// there's no shared mutable state between sender and receiver to
    /// begin with. Remote delivery routes through the node's connection
    /// cache, establishing a connection on demand.
    pub async fn send(&self, to: &ExternalPid, term: OwnedTerm) -> Result<()> {
        if self.node.is_local(to) {
            self.node.deliver_local(to, Some(self.pid.clone()), term)
        } else {
            let conn = NodeInner::get_or_create_connection(&self.node, to.node.as_str()).await?;
            conn.send_message(self.pid.clone(), to.clone(), term).await
        }
    }

    /// Same-node named delivery.
    pub async fn send_to_name(&self, name: &str, term: OwnedTerm) -> Result<()> {
        let atom = Atom::new(name);
        let target = self
            .node
            .lookup_name(&atom)
            .ok_or_else(|| Error::NameNotRegistered(name.to_string()))?;
        self.node.deliver_local(&target, Some(self.pid.clone()), term)
    }

    /// Remote named delivery; falls back to same-node delivery when `node`
    /// is this node's own name.
    pub async fn send_remote(&self, node: &str, name: &str, term: OwnedTerm) -> Result<()> {
        if node == self.node.node_name() {
            return self.send_to_name(name, term).await;
        }
        let conn = NodeInner::get_or_create_connection(&self.node, node).await?;
        conn.send_to_name(self.pid.clone(), Atom::new(name), term).await
    }

    /// Idempotent. Linking to a missing local pid fails immediately with
    /// an `Exit("noproc", to)` delivered to this mailbox, rather than
    /// returning an error out-of-band — matching what a real `link/1` to a
    /// dead pid does for a process trapping exits.
    pub async fn link(&self, to: &ExternalPid) -> Result<()> {
        if self.node.is_local(to) {
            match self.node.mailbox_entry(to) {
                Some(peer_entry) => {
                    peer_entry.links.lock().unwrap().insert(self.pid.clone());
                    self.entry.links.lock().unwrap().insert(to.clone());
                    Ok(())
                }
                None => {
                    let _ = self
                        .entry
                        .sender
                        .send(Delivery::Exit {
                            from: to.clone(),
                            reason: OwnedTerm::atom("noproc"),
                        })
                        .await;
                    Ok(())
                }
            }
        } else {
            let conn = NodeInner::get_or_create_connection(&self.node, to.node.as_str()).await?;
            conn.link(&self.pid, to).await?;
            self.entry.links.lock().unwrap().insert(to.clone());
            Ok(())
        }
    }

    /// Removes both directions of the link, locally or remotely.
    pub async fn unlink(&self, to: &ExternalPid) -> Result<()> {
        self.entry.links.lock().unwrap().remove(to);
        if self.node.is_local(to) {
            if let Some(peer_entry) = self.node.mailbox_entry(to) {
                peer_entry.links.lock().unwrap().remove(&self.pid);
            }
            Ok(())
        } else {
            let conn = NodeInner::get_or_create_connection(&self.node, to.node.as_str()).await?;
            conn.unlink(&self.pid, to, self.node.next_unlink_id()).await?;
            Ok(())
        }
    }

    /// Closes the mailbox, notifying every linked peer with `{exit,
    /// reason}` (default `normal`) sourced from this pid. Consumes the
    /// handle: once closed there's nothing left to drive.
    pub async fn close(self, reason: Option<OwnedTerm>) {
        let reason = reason.unwrap_or_else(|| OwnedTerm::atom("normal"));
        self.node.remove_mailbox(&self.pid, self.name.as_ref());

        let peers: Vec<ExternalPid> = self.entry.links.lock().unwrap().iter().cloned().collect();
        for peer in peers {
            if self.node.is_local(&peer) {
                let _ = self.node.deliver_local_exit(&peer, self.pid.clone(), reason.clone());
            } else if let Ok(conn) = NodeInner::get_or_create_connection(&self.node, peer.node.as_str()).await {
                let _ = conn.send_exit(&self.pid, &peer, reason.clone()).await;
            }
        }
    }

    /// `send(node, "net_kernel", {'$gen_call', {self, ref}, {is_auth,
    /// node}})`, awaiting a 2-tuple whose second element is the atom
    /// `yes`. Times out to `false` rather than erroring, matching
    /// `net_adm:ping/1`'s own behavior against a node that never answers.
    pub async fn ping(&mut self, node: &str, timeout: Duration) -> Result<bool> {
        let reference = self.node.make_reference();
        let envelope = OwnedTerm::tuple(vec![
            OwnedTerm::atom("$gen_call"),
            OwnedTerm::tuple(vec![
                OwnedTerm::Pid(self.pid.clone()),
                OwnedTerm::Reference(reference),
            ]),
            OwnedTerm::tuple(vec![OwnedTerm::atom("is_auth"), OwnedTerm::atom(node)]),
        ]);
        if self.send_remote(node, "net_kernel", envelope).await.is_err() {
            return Ok(false);
        }
        match self.receive_timeout(timeout).await? {
            Received::Message(OwnedTerm::Tuple(items)) if items.len() == 2 => {
                Ok(matches!(&items[1], OwnedTerm::Atom(a) if a.as_str() == "yes"))
            }
            _ => Ok(false),
        }
    }

    /// `send(node, "rex", {self, {call, module, function, args, user}})`,
    /// awaiting `{rex, Result}`. A reply tagged with anything else raises
    /// `badrpc`.
    pub async fn rpc(
        &mut self,
        node: &str,
        timeout: Duration,
        module: &str,
        function: &str,
        args: Vec<OwnedTerm>,
    ) -> Result<OwnedTerm> {
        let envelope = OwnedTerm::tuple(vec![
            OwnedTerm::Pid(self.pid.clone()),
            OwnedTerm::tuple(vec![
                OwnedTerm::atom("call"),
                OwnedTerm::atom(module),
                OwnedTerm::atom(function),
                OwnedTerm::list(args),
                OwnedTerm::atom("user"),
            ]),
        ]);
        self.send_remote(node, "rex", envelope).await?;
        match self.receive_timeout(timeout).await? {
            Received::Message(OwnedTerm::Tuple(mut items)) if items.len() == 2 => {
                match &items[0] {
                    OwnedTerm::Atom(a) if a.as_str() == "rex" => Ok(items.remove(1)),
                    _ => Err(Error::BadRpc {
                        node: node.to_string(),
                        reason: "reply not tagged 'rex'".to_string(),
                    }),
                }
            }
            Received::Empty => Err(Error::BadRpc {
                node: node.to_string(),
                reason: "timed out".to_string(),
            }),
            Received::Exit { reason, .. } => Err(Error::BadRpc {
                node: node.to_string(),
                reason: format!("{reason:?}"),
            }),
            _ => Err(Error::BadRpc {
                node: node.to_string(),
                reason: "unexpected reply shape".to_string(),
            }),
        }
    }

    /// `send(node, module, {'$gen_call', {self, ref}, msg})`, returning
    /// the second element of the reply tuple once its reference matches
    /// the one generated for this call.
    pub async fn gen_call(
        &mut self,
        node: &str,
        module: &str,
        msg: OwnedTerm,
        timeout: Duration,
    ) -> Result<OwnedTerm> {
        let reference = self.node.make_reference();
        let envelope = OwnedTerm::tuple(vec![
            OwnedTerm::atom("$gen_call"),
            OwnedTerm::tuple(vec![
                OwnedTerm::Pid(self.pid.clone()),
                OwnedTerm::Reference(reference.clone()),
            ]),
            msg,
        ]);
        self.send_remote(node, module, envelope).await?;
        match self.receive_timeout(timeout).await? {
            Received::Message(OwnedTerm::Tuple(mut items))
                if items.len() == 2 && items[0] == OwnedTerm::Reference(reference) =>
            {
                Ok(items.remove(1))
            }
            Received::Message(_) => Err(Error::BadRpc {
                node: node.to_string(),
                reason: "gen_call reference mismatch".to_string(),
            }),
            Received::Empty => Err(Error::BadRpc {
                node: node.to_string(),
                reason: "timed out".to_string(),
            }),
            Received::Exit { reason, .. } => Err(Error::BadRpc {
                node: node.to_string(),
                reason: format!("{reason:?}"),
            }),
        }
    }

    /// `{'$gen_cast', Msg}`, fire-and-forget.
    pub async fn gen_cast(&self, node: &str, module: &str, msg: OwnedTerm) -> Result<()> {
        let envelope = OwnedTerm::tuple(vec![OwnedTerm::atom("$gen_cast"), msg]);
        self.send_remote(node, module, envelope).await
    }

    /// A plain info message, fire-and-forget, no envelope.
    pub async fn gen_info(&self, node: &str, name: &str, msg: OwnedTerm) -> Result<()> {
        self.send_remote(node, name, msg).await
    }
}
