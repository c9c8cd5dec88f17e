// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests over arbitrary event sequences.
//!
//! Sequences are generated from a small id space so that events collide on
//! the same conversations, prompts and payments.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::U256;
use evmai_core::methods::{BRANCH_FEE, CANCELLATION_FEE, ESCROW_CONTRACT, METADATA_UPDATE_FEE};
use evmai_core::{ChainEvent, PaymentStatus};
use evmai_indexer::{ContractRegistry, Indexer};
use evmai_test_utils::builders::*;
use evmai_test_utils::{
    AGENT, ESCROW, EventFactory, MemoryStore, MockChainReader, OTHER_USER, StoreSnapshot, USER,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Branch(u64, u64),
    Prompt(u64, u64),
    Answer(u64, u64),
    Delta(u64, u64),
    Metadata(u64),
    Submit(u64, u64, u64),
    CancelAgent(u64),
    CancelEscrow(u64),
    BranchFee(u64),
    MetadataFee(u64),
    Escrow(u64, u64),
    Finalize(u64),
    Refund(u64),
    LimitSet(bool, u64),
    LimitCancel(bool),
}

fn op() -> impl Strategy<Value = Op> {
    let id = || 1u64..4;
    let msg = || 10u64..14;
    prop_oneof![
        id().prop_map(Op::Add),
        (id(), id()).prop_map(|(a, b)| Op::Branch(a, b)),
        (id(), msg()).prop_map(|(c, m)| Op::Prompt(c, m)),
        (id(), msg()).prop_map(|(c, m)| Op::Answer(c, m)),
        (id(), msg()).prop_map(|(c, m)| Op::Delta(c, m)),
        id().prop_map(Op::Metadata),
        (id(), msg(), msg()).prop_map(|(c, p, a)| Op::Submit(c, p, a)),
        msg().prop_map(Op::CancelAgent),
        msg().prop_map(Op::CancelEscrow),
        id().prop_map(Op::BranchFee),
        id().prop_map(Op::MetadataFee),
        (msg(), 1u64..1_000).prop_map(|(m, amount)| Op::Escrow(m, amount)),
        msg().prop_map(Op::Finalize),
        msg().prop_map(Op::Refund),
        (any::<bool>(), 0u64..1_000).prop_map(|(other, a)| Op::LimitSet(other, a)),
        any::<bool>().prop_map(Op::LimitCancel),
    ]
}

/// Ops paired with non-decreasing timestamp steps.
fn history() -> impl Strategy<Value = Vec<(u64, Op)>> {
    prop::collection::vec((0u64..5, op()), 1..40)
}

fn build(history: &[(u64, Op)]) -> Vec<ChainEvent> {
    let mut f = EventFactory::default();
    let mut ts = 100;
    history
        .iter()
        .map(|(step, op)| {
            ts += step;
            let user = |other: bool| if other { OTHER_USER } else { USER };
            match *op {
                Op::Add(c) => f.agent(ts, conversation_added(USER, c, "C", "M")),
                Op::Branch(o, c) => f.agent(ts, conversation_branched(USER, o, c, "BR")),
                Op::Prompt(c, m) => f.agent(ts, prompt_message(c, m, "P")),
                Op::Answer(c, m) => f.agent(ts, answer_message(c, m, "A")),
                Op::Delta(c, m) => f.agent(ts, search_delta(c, m, "D")),
                Op::Metadata(c) => f.agent(ts, metadata_updated(c, &format!("M{ts}"))),
                Op::Submit(c, p, a) => f.agent(ts, prompt_submitted(USER, c, p, a)),
                Op::CancelAgent(a) => f.agent(ts, agent_prompt_cancelled(USER, a)),
                Op::CancelEscrow(a) => f.escrow(ts, escrow_prompt_cancelled(USER, a)),
                Op::BranchFee(o) => f.agent(ts, branch_requested(USER, o)),
                Op::MetadataFee(c) => f.agent(ts, metadata_update_requested(USER, c)),
                Op::Escrow(m, amount) => f.escrow(ts, payment_escrowed(m, USER, amount)),
                Op::Finalize(m) => f.escrow(ts, payment_finalized(m)),
                Op::Refund(m) => f.escrow(ts, payment_refunded(m)),
                Op::LimitSet(other, a) => {
                    f.escrow(ts, spending_limit_set(user(other), a, ts + 1_000))
                }
                Op::LimitCancel(other) => f.escrow(ts, spending_limit_cancelled(user(other))),
            }
        })
        .collect()
}

async fn indexer() -> (Arc<MemoryStore>, Indexer) {
    let store = Arc::new(MemoryStore::new());
    let chain = Arc::new(MockChainReader::new());
    chain.set_address(AGENT, ESCROW_CONTRACT, ESCROW).await;
    chain.set_scalar(ESCROW, CANCELLATION_FEE, U256::from(3u64)).await;
    chain.set_scalar(ESCROW, BRANCH_FEE, U256::from(5u64)).await;
    chain
        .set_scalar(ESCROW, METADATA_UPDATE_FEE, U256::from(7u64))
        .await;
    let indexer = Indexer::new(store.clone(), chain, ContractRegistry::new(AGENT, ESCROW));
    (store, indexer)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

async fn apply(events: &[ChainEvent], times: usize) -> StoreSnapshot {
    let (store, indexer) = indexer().await;
    for event in events {
        for _ in 0..times {
            indexer.handle(event).await.unwrap();
        }
    }
    store.snapshot().await
}

fn freshness(snapshot: &StoreSnapshot) -> BTreeMap<String, u64> {
    snapshot
        .conversations
        .iter()
        .map(|(id, c)| (id.clone(), c.last_message_created_at))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn duplicate_delivery_matches_single_delivery(history in history()) {
        let events = build(&history);
        let (once, twice) = block_on(async { (apply(&events, 1).await, apply(&events, 2).await) });
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn freshness_and_flags_never_regress(history in history()) {
        let events = build(&history);
        block_on(async {
            let (store, indexer) = indexer().await;
            let mut previous = StoreSnapshot::default();
            for event in &events {
                indexer.handle(event).await.unwrap();
                let current = store.snapshot().await;

                for (id, before) in freshness(&previous) {
                    let after = current.conversations[&id].last_message_created_at;
                    assert!(
                        after >= before,
                        "conversation {id} went back from {before} to {after}"
                    );
                }
                for (id, before) in &previous.prompt_requests {
                    let after = &current.prompt_requests[id];
                    assert!(after.is_cancelled || !before.is_cancelled);
                    assert!(after.is_answered || !before.is_answered);
                    assert!(after.is_refunded || !before.is_refunded);
                }
                for (id, before) in &previous.payments {
                    if before.status != PaymentStatus::Pending {
                        assert_eq!(current.payments[id].status, before.status);
                    }
                }
                assert!(current.activities.starts_with(&previous.activities));
                previous = current;
            }
        });
    }
}
