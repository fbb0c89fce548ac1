// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{FlowError, FlowId, FlowMessage, FlowTransport, Result};
use iou_ledger::PartyId;

use async_trait::async_trait;
use std::{collections::BTreeMap, collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::{mpsc, Mutex};

/// Per-flow mailbox. The sender half is what delivery writes into; the
/// receiver half is taken by whichever task runs that flow locally.
struct Mailbox {
    tx: mpsc::UnboundedSender<FlowMessage>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<FlowMessage>>>,
}

impl Mailbox {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

struct EndpointShared {
    proposals_tx: mpsc::UnboundedSender<FlowMessage>,
    mailboxes: Mutex<HashMap<FlowId, Mailbox>>,
}

impl EndpointShared {
    /// Route an incoming message: fresh proposals go to the responder
    /// queue, everything else to the mailbox of its flow.
    async fn deliver(&self, msg: FlowMessage) -> Result<()> {
        match &msg {
            FlowMessage::Proposal { .. } => self
                .proposals_tx
                .send(msg)
                .map_err(|_| FlowError::Transport("responder queue closed".to_string())),
            _ => {
                let mut mailboxes = self.mailboxes.lock().await;
                let mailbox = mailboxes.entry(msg.flow()).or_insert_with(Mailbox::new);
                mailbox
                    .tx
                    .send(msg)
                    .map_err(|_| FlowError::Transport("flow mailbox closed".to_string()))
            }
        }
    }
}

/// An in-process network of parties used for test cases: reliable,
/// authenticated, in-order within a flow. A proper transport would sit
/// on real wire and identity services.
#[derive(Default)]
pub struct MockNetwork {
    endpoints: Mutex<BTreeMap<PartyId, Arc<EndpointShared>>>,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a party and hand it its endpoint.
    pub async fn join(self: &Arc<Self>, party: PartyId) -> MockEndpoint {
        let (proposals_tx, proposals_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(EndpointShared {
            proposals_tx,
            mailboxes: Mutex::new(HashMap::new()),
        });
        let _ = self
            .endpoints
            .lock()
            .await
            .insert(party, Arc::clone(&shared));
        MockEndpoint {
            me: party,
            network: Arc::clone(self),
            shared,
            proposals_rx: Mutex::new(proposals_rx),
        }
    }
}

/// One party's handle onto the [`MockNetwork`].
pub struct MockEndpoint {
    me: PartyId,
    network: Arc<MockNetwork>,
    shared: Arc<EndpointShared>,
    proposals_rx: Mutex<mpsc::UnboundedReceiver<FlowMessage>>,
}

#[async_trait]
impl FlowTransport for MockEndpoint {
    fn local_party(&self) -> PartyId {
        self.me
    }

    async fn send(&self, to: PartyId, msg: FlowMessage) -> Result<()> {
        let target = {
            let endpoints = self.network.endpoints.lock().await;
            endpoints.get(&to).cloned()
        };
        match target {
            Some(endpoint) => {
                trace!("{:?} -> {to:?}: {msg:?}", self.me);
                endpoint.deliver(msg).await
            }
            None => Err(FlowError::Transport(format!("unknown party {to:?}"))),
        }
    }

    async fn recv_on(&self, flow: FlowId, timeout: Duration) -> Result<FlowMessage> {
        let rx = {
            let mut mailboxes = self.shared.mailboxes.lock().await;
            let mailbox = mailboxes.entry(flow).or_insert_with(Mailbox::new);
            Arc::clone(&mailbox.rx)
        };
        let mut rx = rx.lock().await;
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(msg)) => Ok(msg),
            Ok(None) => Err(FlowError::Transport("flow mailbox closed".to_string())),
            Err(_elapsed) => Err(FlowError::CounterpartyUnresponsive),
        }
    }

    async fn next_proposal(&self) -> Option<FlowMessage> {
        self.proposals_rx.lock().await.recv().await
    }
}
