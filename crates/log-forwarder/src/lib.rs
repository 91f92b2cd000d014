// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwarding of captured log records to a sequence-token ordered log store.
//!
//! # Architecture
//!
//! ```text
//!   Producer (submit_records)
//!       │
//!       v
//!   ┌──────────────┐
//!   │ RecordQueue  │ (MPMC FIFO)
//!   └──────┬───────┘
//!          │
//!          v
//!   ┌──────────────┐       ┌────────────┐
//!   │  Supervisor  │──────>│ Forwarder  │ x N per cycle
//!   └──────────────┘       └─────┬──────┘
//!                                │   ^
//!                                v   │ tokens
//!                    ┌──────────────┐ ┌────────────┐
//!                    │ RemoteLogSink│ │ TokenStore │
//!                    └──────────────┘ └────────────┘
//! ```
//!
//! - **[`queue`]**: pending records, shared by producers and workers
//! - **[`token_store`]**: last known sequence token per stream
//! - **[`sink`]**: backend abstraction and its CloudWatch Logs implementation
//! - **[`forwarder`]**: per-record retry protocol
//! - **[`supervisor`]**: cycle loop spawning the worker pool
//! - **[`service`]**: wiring, lifecycle and introspection

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod constants;
pub mod error;
pub mod forwarder;
pub mod queue;
pub mod record;
pub mod region;
pub mod service;
pub mod sink;
pub mod stats;
pub mod supervisor;
pub mod token_store;
