// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Database execution gateways.
//!
//! Each backend module implements
//! [`ExecutionGateway`](querybench_core::ExecutionGateway) so the benchmark
//! orchestrator can drive it without knowing the wire protocol.
//!
//! # Backends
//!
//! - [`clickhouse`] - ClickHouse over HTTP(S)

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod clickhouse;

pub use clickhouse::{ClickHouseConfig, ClickHouseError, ClickHouseGateway};
