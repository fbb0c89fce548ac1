// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    AcceptorState, FinalityOutcome, FinalityService, FlowError, FlowId, FlowMessage,
    FlowTransport, InitiatorState, RecordStore, Result,
};
use iou_ledger::{
    sign_transaction, validate, validate_destroy_against, Amount, Command, IouRecord, PartyId,
    PartyKeys, Signature, SignedTransaction, StateRef, Transaction, ValidationError,
};

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};
use tokio::{sync::Mutex, task::JoinHandle};

const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// One party's view of the ledger: its identity, its local store of
/// committed records, and handles onto the external collaborators.
///
/// Each flow runs as its own task; concurrent instances share nothing
/// except the store and the finality service, which serialize conflicting
/// access themselves. The store is mutated exactly once per flow, at
/// commit, after both signatures and the finality confirmation are in hand.
pub struct LedgerNode {
    keys: PartyKeys,
    store: Arc<dyn RecordStore>,
    notary: Arc<dyn FinalityService>,
    transport: Arc<dyn FlowTransport>,
    response_timeout: Duration,
    initiated: Mutex<HashMap<FlowId, InitiatorState>>,
    accepted: Mutex<HashMap<FlowId, AcceptorState>>,
}

impl LedgerNode {
    pub fn new(
        keys: PartyKeys,
        store: Arc<dyn RecordStore>,
        notary: Arc<dyn FinalityService>,
        transport: Arc<dyn FlowTransport>,
    ) -> Arc<Self> {
        Self::with_response_timeout(keys, store, notary, transport, DEFAULT_RESPONSE_TIMEOUT)
    }

    pub fn with_response_timeout(
        keys: PartyKeys,
        store: Arc<dyn RecordStore>,
        notary: Arc<dyn FinalityService>,
        transport: Arc<dyn FlowTransport>,
        response_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            keys,
            store,
            notary,
            transport,
            response_timeout,
            initiated: Mutex::new(HashMap::new()),
            accepted: Mutex::new(HashMap::new()),
        })
    }

    pub fn party_id(&self) -> PartyId {
        self.keys.party_id()
    }

    /// All records this party holds that have not been consumed.
    pub async fn unconsumed(&self) -> Vec<(StateRef, IouRecord)> {
        self.store.unconsumed().await
    }

    /// Terminal and in-flight states of flows this node initiated.
    pub async fn initiated_flows(&self) -> Vec<(FlowId, InitiatorState)> {
        let initiated = self.initiated.lock().await;
        initiated.iter().map(|(flow, state)| (*flow, *state)).collect()
    }

    /// Terminal and in-flight states of flows this node accepted.
    pub async fn accepted_flows(&self) -> Vec<(FlowId, AcceptorState)> {
        let accepted = self.accepted.lock().await;
        accepted.iter().map(|(flow, state)| (*flow, *state)).collect()
    }

    /// Drop the entries of flows that reached a terminal state. In-flight
    /// flows are kept. A long-lived node calls this periodically once it is
    /// done observing finished flows.
    pub async fn prune_finished_flows(&self) {
        self.initiated
            .lock()
            .await
            .retain(|_, state| !state.is_terminal());
        self.accepted
            .lock()
            .await
            .retain(|_, state| !state.is_terminal());
    }

    async fn set_initiator_state(&self, flow: FlowId, state: InitiatorState) {
        debug!("{:?} flow {flow:?} -> {state:?}", self.party_id());
        let _ = self.initiated.lock().await.insert(flow, state);
    }

    async fn set_acceptor_state(&self, flow: FlowId, state: AcceptorState) {
        debug!("{:?} flow {flow:?} -> {state:?}", self.party_id());
        let _ = self.accepted.lock().await.insert(flow, state);
    }

    /// Initiate a Create flow: lend `value` to be owed by `borrower`.
    ///
    /// Builds the candidate transaction, validates it locally before any
    /// message leaves this node, signs it, gathers the borrower's
    /// signature, submits for finality and commits the new record.
    pub async fn create_iou(&self, value: Amount, borrower: PartyId) -> Result<SignedTransaction> {
        let flow = FlowId::random(&mut rand::thread_rng());
        self.set_initiator_state(flow, InitiatorState::Building).await;
        let me = self.party_id();
        info!("{me:?} initiating Create flow {flow:?}: {value} owed by {borrower:?}");

        let tx = Transaction {
            inputs: vec![],
            outputs: vec![IouRecord::new(value, me, borrower)],
            command: Command::Create,
            required_signers: BTreeSet::from_iter([me, borrower]),
        };
        if let Err(reason) = validate(&tx) {
            self.set_initiator_state(flow, InitiatorState::Aborted).await;
            return Err(reason.into());
        }
        self.run_initiator(flow, tx, borrower, None).await
    }

    /// Initiate a Destroy flow: retire the record at `reference`.
    ///
    /// The record must be held unconsumed in our own store and we must be
    /// one of its participants; the counterparty is derived from the record.
    pub async fn destroy_iou(&self, reference: StateRef) -> Result<SignedTransaction> {
        let flow = FlowId::random(&mut rand::thread_rng());
        self.set_initiator_state(flow, InitiatorState::Building).await;
        let me = self.party_id();
        info!("{me:?} initiating Destroy flow {flow:?} for {reference:?}");

        let record = match self.store.lookup(&reference).await {
            Some(record) => record,
            None => {
                self.set_initiator_state(flow, InitiatorState::Aborted).await;
                return Err(FlowError::RecordMismatch(reference));
            }
        };
        let counterparty = match record.counterparty_of(&me) {
            Some(counterparty) => counterparty,
            None => {
                self.set_initiator_state(flow, InitiatorState::Aborted).await;
                return Err(FlowError::NotAParticipant);
            }
        };

        let tx = Transaction {
            inputs: vec![reference],
            outputs: vec![],
            command: Command::Destroy,
            required_signers: BTreeSet::from_iter(record.participants()),
        };
        if let Err(reason) = validate_destroy_against(&tx, &record) {
            self.set_initiator_state(flow, InitiatorState::Aborted).await;
            return Err(reason.into());
        }
        self.run_initiator(flow, tx, counterparty, Some(reference)).await
    }

    /// The shared tail of both initiator flows: sign, exchange, finalize, commit.
    async fn run_initiator(
        &self,
        flow: FlowId,
        tx: Transaction,
        counterparty: PartyId,
        consuming: Option<StateRef>,
    ) -> Result<SignedTransaction> {
        let (me, sig) = sign_transaction(&tx, &self.keys);
        let mut signed = SignedTransaction::new(tx.clone());
        if let Err(reason) = signed.add_signature(me, sig.clone()) {
            self.set_initiator_state(flow, InitiatorState::Aborted).await;
            return Err(reason.into());
        }

        self.set_initiator_state(flow, InitiatorState::AwaitingCounterpartySignature)
            .await;
        if let Err(reason) = self
            .transport
            .send(
                counterparty,
                FlowMessage::Proposal {
                    flow,
                    tx,
                    initiator: me,
                    initiator_sig: sig,
                },
            )
            .await
        {
            self.set_initiator_state(flow, InitiatorState::Rejected).await;
            return Err(reason);
        }

        // Every exit from here on records a terminal state: the flow must
        // never remain observably in-flight after this method returns.
        match self.transport.recv_on(flow, self.response_timeout).await {
            Ok(FlowMessage::Approval { party, sig, .. }) => {
                if let Err(reason) = signed.add_signature(party, sig) {
                    self.set_initiator_state(flow, InitiatorState::Rejected).await;
                    warn!("Flow {flow:?}: approval from {party:?} does not verify");
                    return Err(reason.into());
                }
            }
            Ok(FlowMessage::Rejection { reason, .. }) => {
                self.set_initiator_state(flow, InitiatorState::Rejected).await;
                warn!("Flow {flow:?} rejected by {counterparty:?}: {reason}");
                return Err(FlowError::Rejected { reason });
            }
            Ok(other) => {
                self.set_initiator_state(flow, InitiatorState::Rejected).await;
                return Err(FlowError::Transport(format!(
                    "unexpected message while awaiting approval: {other:?}"
                )));
            }
            Err(reason) => {
                // A transport timeout is handled exactly like a rejection.
                self.set_initiator_state(flow, InitiatorState::Rejected).await;
                return Err(reason);
            }
        }
        if let Err(reason) = signed.verify() {
            self.set_initiator_state(flow, InitiatorState::Rejected).await;
            return Err(reason.into());
        }

        self.set_initiator_state(flow, InitiatorState::AwaitingFinality).await;
        match self.notary.submit(&signed).await {
            Ok(FinalityOutcome::Confirmed) => {}
            Ok(FinalityOutcome::Conflict(reference)) => {
                self.set_initiator_state(flow, InitiatorState::Conflict).await;
                warn!("Flow {flow:?} lost {reference:?} to a concurrent transaction");
                return Err(FlowError::Conflict(reference));
            }
            Err(reason) => {
                self.set_initiator_state(flow, InitiatorState::Rejected).await;
                return Err(reason);
            }
        }

        let txid = signed.tx.hash();
        if let Some(reference) = consuming {
            self.store.mark_consumed(&reference).await;
        }
        self.store.insert(txid, &signed.tx.outputs).await;
        // The transaction is durable and our store is updated: committed,
        // whether or not the finality notice reaches the counterparty.
        self.set_initiator_state(flow, InitiatorState::Committed).await;
        info!("Flow {flow:?} committed {txid:?}");
        if let Err(reason) = self
            .transport
            .send(
                counterparty,
                FlowMessage::Finalized {
                    flow,
                    tx: signed.clone(),
                },
            )
            .await
        {
            warn!("Flow {flow:?}: finality notice to {counterparty:?} failed: {reason}");
        }
        Ok(signed)
    }

    /// Run the acceptor side: handle every incoming proposal until the
    /// transport closes, each in its own task.
    pub fn spawn_responder(self: &Arc<Self>) -> JoinHandle<()> {
        let node = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(proposal) = node.transport.next_proposal().await {
                let node = Arc::clone(&node);
                let _detached = tokio::spawn(async move {
                    let flow = proposal.flow();
                    if let Err(reason) = node.accept(proposal).await {
                        warn!("{:?} acceptor flow {flow:?} ended: {reason}", node.party_id());
                    }
                });
            }
        })
    }

    /// One acceptor flow instance, from proposal to terminal state.
    async fn accept(&self, proposal: FlowMessage) -> Result<()> {
        let FlowMessage::Proposal {
            flow,
            tx,
            initiator,
            initiator_sig,
        } = proposal
        else {
            return Err(FlowError::Transport("expected a proposal".to_string()));
        };
        self.set_acceptor_state(flow, AcceptorState::Validating).await;

        let consuming = match self.evaluate_proposal(&tx, initiator, &initiator_sig).await {
            Ok(consuming) => consuming,
            Err(reason) => {
                self.set_acceptor_state(flow, AcceptorState::Rejected).await;
                warn!("{:?} rejecting proposal {flow:?}: {reason}", self.party_id());
                self.transport
                    .send(
                        initiator,
                        FlowMessage::Rejection {
                            flow,
                            reason: reason.to_string(),
                        },
                    )
                    .await?;
                return Err(reason);
            }
        };

        self.set_acceptor_state(flow, AcceptorState::SigningOrRejecting).await;
        let (me, sig) = sign_transaction(&tx, &self.keys);
        if let Err(reason) = self
            .transport
            .send(initiator, FlowMessage::Approval { flow, party: me, sig })
            .await
        {
            self.set_acceptor_state(flow, AcceptorState::Rejected).await;
            return Err(reason);
        }

        // Our signature is out; this instance now runs to a terminal state.
        self.set_acceptor_state(flow, AcceptorState::AwaitingFinality).await;
        let msg = match self.transport.recv_on(flow, self.response_timeout).await {
            Ok(msg) => msg,
            Err(reason) => {
                self.set_acceptor_state(flow, AcceptorState::Rejected).await;
                return Err(reason);
            }
        };
        let FlowMessage::Finalized { tx: confirmed, .. } = msg else {
            self.set_acceptor_state(flow, AcceptorState::Rejected).await;
            return Err(FlowError::Transport(format!(
                "unexpected message while awaiting finality: {msg:?}"
            )));
        };

        // Never trust the initiator: the finalized transaction must be the
        // one we signed, fully signed, and confirmed by the finality service.
        if confirmed.tx != tx {
            self.set_acceptor_state(flow, AcceptorState::Rejected).await;
            return Err(FlowError::Transport(
                "finalized transaction differs from the proposal".to_string(),
            ));
        }
        if let Err(reason) = confirmed.verify() {
            self.set_acceptor_state(flow, AcceptorState::Rejected).await;
            return Err(reason.into());
        }
        let txid = confirmed.tx.hash();
        if !self.notary.is_confirmed(&txid).await {
            self.set_acceptor_state(flow, AcceptorState::Rejected).await;
            return Err(FlowError::Transport(
                "transaction was never confirmed by the finality service".to_string(),
            ));
        }

        if let Some(reference) = consuming {
            self.store.mark_consumed(&reference).await;
        }
        self.store.insert(txid, &confirmed.tx.outputs).await;
        self.set_acceptor_state(flow, AcceptorState::Committed).await;
        info!("{:?} flow {flow:?} committed {txid:?}", self.party_id());
        Ok(())
    }

    /// Re-run the transition validator independently of the initiator's
    /// judgment, check our own participation, and verify the initiator's
    /// signature. Returns the reference a Destroy consumes, resolved
    /// against our own store.
    async fn evaluate_proposal(
        &self,
        tx: &Transaction,
        initiator: PartyId,
        initiator_sig: &Signature,
    ) -> Result<Option<StateRef>> {
        let mut partially_signed = SignedTransaction::new(tx.clone());
        partially_signed.add_signature(initiator, initiator_sig.clone())?;

        let me = self.party_id();
        if !tx.required_signers.contains(&me) {
            return Err(FlowError::NotAParticipant);
        }

        match tx.command {
            Command::Create => {
                validate(tx)?;
                if !tx.outputs[0].is_participant(&me) {
                    return Err(FlowError::NotAParticipant);
                }
                Ok(None)
            }
            Command::Destroy => {
                validate(tx)?;
                let reference = tx.inputs[0];
                let record = self
                    .store
                    .lookup(&reference)
                    .await
                    .ok_or(FlowError::RecordMismatch(reference))?;
                validate_destroy_against(tx, &record)?;
                if !record.is_participant(&me) {
                    return Err(FlowError::NotAParticipant);
                }
                Ok(Some(reference))
            }
            #[allow(unreachable_patterns)]
            _ => Err(ValidationError::UnrecognizedCommand.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNetwork, MockNotary};
    use crate::InMemoryStore;
    use iou_ledger::{SignatureError, TxHash};

    async fn spawn_party(
        network: &Arc<MockNetwork>,
        notary: &Arc<MockNotary>,
        timeout: Duration,
    ) -> Arc<LedgerNode> {
        let keys = PartyKeys::random();
        let endpoint = network.join(keys.party_id()).await;
        let node = LedgerNode::with_response_timeout(
            keys,
            Arc::new(InMemoryStore::new()),
            Arc::clone(notary) as Arc<dyn FinalityService>,
            Arc::new(endpoint),
            timeout,
        );
        let _responder = node.spawn_responder();
        node
    }

    async fn two_parties() -> (Arc<LedgerNode>, Arc<LedgerNode>, Arc<MockNotary>) {
        let network = MockNetwork::new();
        let notary = Arc::new(MockNotary::new());
        let a = spawn_party(&network, &notary, Duration::from_secs(2)).await;
        let b = spawn_party(&network, &notary, Duration::from_secs(2)).await;
        (a, b, notary)
    }

    /// The acceptor commits asynchronously after the initiator returns;
    /// poll until the given condition holds.
    async fn eventually<F, Fut>(mut condition: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..200 {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn create_flow_records_the_iou_in_both_stores() -> eyre::Result<()> {
        let (a, b, notary) = two_parties().await;

        let signed = a.create_iou(Amount::from(1), b.party_id()).await?;
        assert!(signed.is_fully_signed());
        assert_eq!(signed.verify(), Ok(()));
        assert!(notary.is_confirmed(&signed.tx.hash()).await);

        // Recorded Create has no inputs and a single output, the new IOU.
        assert!(signed.tx.inputs.is_empty());
        assert_eq!(signed.tx.outputs.len(), 1);

        let b_id = b.party_id();
        eventually(|| {
            let b = Arc::clone(&b);
            async move { !b.unconsumed().await.is_empty() }
        })
        .await;

        for node in [&a, &b] {
            let held = node.unconsumed().await;
            assert_eq!(held.len(), 1);
            let (reference, record) = &held[0];
            assert_eq!(reference.txid, signed.tx.hash());
            assert_eq!(record.value, Amount::from(1));
            assert_eq!(record.lender, a.party_id());
            assert_eq!(record.borrower, b_id);
        }

        assert!(a
            .initiated_flows()
            .await
            .iter()
            .any(|(_, state)| *state == InitiatorState::Committed));
        Ok(())
    }

    #[tokio::test]
    async fn create_with_invalid_value_aborts_before_any_message() {
        let (a, b, _notary) = two_parties().await;

        let result = a.create_iou(Amount::from(-1), b.party_id()).await;
        assert_eq!(
            result.err(),
            Some(FlowError::Validation(ValidationError::InvalidValue))
        );

        // Nothing ever reached the counterparty.
        assert!(b.accepted_flows().await.is_empty());
        assert!(b.unconsumed().await.is_empty());
        assert!(a
            .initiated_flows()
            .await
            .iter()
            .any(|(_, state)| *state == InitiatorState::Aborted));
    }

    #[tokio::test]
    async fn create_with_self_as_borrower_aborts() {
        let (a, _b, _notary) = two_parties().await;

        let result = a.create_iou(Amount::from(1), a.party_id()).await;
        assert_eq!(
            result.err(),
            Some(FlowError::Validation(ValidationError::SelfDealing))
        );
    }

    #[tokio::test]
    async fn destroy_flow_retires_the_iou_from_both_stores() -> eyre::Result<()> {
        let (a, b, _notary) = two_parties().await;

        let created = a.create_iou(Amount::from(1), b.party_id()).await?;
        let reference = StateRef::new(created.tx.hash(), 0);
        eventually(|| {
            let b = Arc::clone(&b);
            async move { !b.unconsumed().await.is_empty() }
        })
        .await;

        // The borrower settles: the counterparty of a record can initiate too.
        let destroyed = b.destroy_iou(reference).await?;
        assert_eq!(destroyed.tx.inputs, vec![reference]);
        assert!(destroyed.tx.outputs.is_empty());

        for node in [&a, &b] {
            let node = Arc::clone(node);
            eventually(move || {
                let node = Arc::clone(&node);
                async move { node.unconsumed().await.is_empty() }
            })
            .await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn destroy_of_an_unknown_reference_aborts_locally() {
        let (a, _b, _notary) = two_parties().await;

        let bogus = StateRef::new(TxHash::digest(b"never committed"), 0);
        let result = a.destroy_iou(bogus).await;
        assert_eq!(result.err(), Some(FlowError::RecordMismatch(bogus)));
    }

    #[tokio::test]
    async fn counterparty_rejects_a_record_it_never_committed() {
        let (a, b, _notary) = two_parties().await;

        // Slip a record into the initiator's store only; the counterparty
        // has no trace of it and must refuse to sign its destruction.
        let record = IouRecord::new(Amount::from(9), a.party_id(), b.party_id());
        let txid = TxHash::digest(b"forged provenance");
        a.store.insert(txid, &[record]).await;

        let result = a.destroy_iou(StateRef::new(txid, 0)).await;
        match result {
            Err(FlowError::Rejected { reason }) => {
                assert!(reason.contains("does not match"), "reason was: {reason}");
            }
            other => panic!("expected a rejection, got {other:?}"),
        }
        assert!(a
            .initiated_flows()
            .await
            .iter()
            .any(|(_, state)| *state == InitiatorState::Rejected));
    }

    #[tokio::test]
    async fn silent_counterparty_is_treated_as_a_rejection() {
        let network = MockNetwork::new();
        let notary = Arc::new(MockNotary::new());
        let a = spawn_party(&network, &notary, Duration::from_millis(100)).await;

        // The counterparty is reachable but never responds: no responder task.
        let mute_keys = PartyKeys::random();
        let mute_id = mute_keys.party_id();
        let _mute_endpoint = network.join(mute_id).await;

        let result = a.create_iou(Amount::from(1), mute_id).await;
        assert_eq!(result.err(), Some(FlowError::CounterpartyUnresponsive));
        assert!(a
            .initiated_flows()
            .await
            .iter()
            .any(|(_, state)| *state == InitiatorState::Rejected));
    }

    #[tokio::test]
    async fn concurrent_destroys_retire_the_record_exactly_once() -> eyre::Result<()> {
        let (a, b, _notary) = two_parties().await;

        let created = a.create_iou(Amount::from(5), b.party_id()).await?;
        let reference = StateRef::new(created.tx.hash(), 0);
        eventually(|| {
            let b = Arc::clone(&b);
            async move { !b.unconsumed().await.is_empty() }
        })
        .await;

        // Both parties race to settle the same record.
        let (from_a, from_b) = tokio::join!(a.destroy_iou(reference), b.destroy_iou(reference));

        let outcomes = [from_a, from_b];
        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one flow must commit: {outcomes:?}");
        let loss = outcomes
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one flow must lose");
        // The loser either lost the race at the finality service or was
        // rejected because the record was already gone from the
        // counterparty's store.
        assert!(
            matches!(loss, FlowError::Conflict(_) | FlowError::Rejected { .. }),
            "unexpected losing outcome: {loss:?}"
        );

        // Neither store retains the record, and none retains it twice.
        for node in [&a, &b] {
            let node = Arc::clone(node);
            eventually(move || {
                let node = Arc::clone(&node);
                async move { node.unconsumed().await.is_empty() }
            })
            .await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn bad_approval_signature_terminates_the_flow() -> eyre::Result<()> {
        let network = MockNetwork::new();
        let notary = Arc::new(MockNotary::new());
        let a = spawn_party(&network, &notary, Duration::from_secs(2)).await;

        // A counterparty that approves with a signature over a tampered
        // payload instead of the proposed transaction.
        let crooked = PartyKeys::random();
        let crooked_id = crooked.party_id();
        let crooked_end = Arc::new(network.join(crooked_id).await);
        let replier = Arc::clone(&crooked_end);
        let _responder = tokio::spawn(async move {
            while let Some(FlowMessage::Proposal {
                flow,
                tx,
                initiator,
                ..
            }) = replier.next_proposal().await
            {
                let mut tampered = tx.clone();
                tampered.outputs[0].value = Amount::from(999);
                let (party, sig) = sign_transaction(&tampered, &crooked);
                let _ = replier
                    .send(initiator, FlowMessage::Approval { flow, party, sig })
                    .await;
            }
        });

        let result = a.create_iou(Amount::from(1), crooked_id).await;
        assert_eq!(
            result.err(),
            Some(FlowError::Signature(SignatureError::InvalidSignature(
                crooked_id
            )))
        );
        // The failed flow must not stay observably in-flight.
        assert!(a
            .initiated_flows()
            .await
            .iter()
            .all(|(_, state)| *state == InitiatorState::Rejected));
        Ok(())
    }

    #[tokio::test]
    async fn proposal_omitting_a_participant_signer_is_rejected() -> eyre::Result<()> {
        let network = MockNetwork::new();
        let notary = Arc::new(MockNotary::new());
        let b = spawn_party(&network, &notary, Duration::from_secs(2)).await;

        // A hand-rolled proposal whose required signers omit the borrower.
        let rogue = PartyKeys::random();
        let rogue_end = network.join(rogue.party_id()).await;
        let tx = Transaction {
            inputs: vec![],
            outputs: vec![IouRecord::new(
                Amount::from(1),
                rogue.party_id(),
                b.party_id(),
            )],
            command: Command::Create,
            required_signers: BTreeSet::from_iter([rogue.party_id()]),
        };
        let (initiator, initiator_sig) = sign_transaction(&tx, &rogue);
        let flow = FlowId::random(&mut rand::thread_rng());
        rogue_end
            .send(
                b.party_id(),
                FlowMessage::Proposal {
                    flow,
                    tx,
                    initiator,
                    initiator_sig,
                },
            )
            .await?;

        let reply = rogue_end.recv_on(flow, Duration::from_secs(1)).await?;
        assert!(
            matches!(reply, FlowMessage::Rejection { .. }),
            "expected a rejection, got {reply:?}"
        );
        assert!(b.unconsumed().await.is_empty());
        assert!(b
            .accepted_flows()
            .await
            .iter()
            .any(|(_, state)| *state == AcceptorState::Rejected));
        Ok(())
    }

    #[tokio::test]
    async fn finished_flows_can_be_pruned() -> eyre::Result<()> {
        let (a, b, _notary) = two_parties().await;

        let _committed = a.create_iou(Amount::from(1), b.party_id()).await?;
        let _aborted = a.create_iou(Amount::from(-1), b.party_id()).await;
        assert_eq!(a.initiated_flows().await.len(), 2);

        a.prune_finished_flows().await;
        assert!(a.initiated_flows().await.is_empty());

        eventually(|| {
            let b = Arc::clone(&b);
            async move {
                let accepted = b.accepted_flows().await;
                !accepted.is_empty() && accepted.iter().all(|(_, state)| state.is_terminal())
            }
        })
        .await;
        b.prune_finished_flows().await;
        assert!(b.accepted_flows().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn created_record_round_trips_to_zero_unconsumed() -> eyre::Result<()> {
        let (a, b, _notary) = two_parties().await;

        let created = a.create_iou(Amount::from(7), b.party_id()).await?;
        let reference = StateRef::new(created.tx.hash(), 0);
        eventually(|| {
            let b = Arc::clone(&b);
            async move { !b.unconsumed().await.is_empty() }
        })
        .await;

        let _destroyed = a.destroy_iou(reference).await?;
        for node in [&a, &b] {
            let node = Arc::clone(node);
            eventually(move || {
                let node = Arc::clone(&node);
                async move { node.unconsumed().await.is_empty() }
            })
            .await;
        }
        Ok(())
    }
}
