// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chain-facing adapters for the EVMAI indexer.
//!
//! [`RpcChainReader`] answers point-in-time `eth_call` view reads over
//! JSON-RPC. [`JsonlEventSource`] replays a decoded, ordered event feed from
//! a newline-delimited JSON file.

pub mod rpc;
pub mod source;

pub use rpc::RpcChainReader;
pub use source::JsonlEventSource;
