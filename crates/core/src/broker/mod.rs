// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-poll event broker
//!
//! This module provides:
//! - `EventLog` - Per-key event storage with per-group consumption and TTL expiry
//! - `WaitRegistry` - Per-key FIFO queues of parked consumers with deadlines
//! - `Broker` - The publish / blocking-get dispatcher over both

mod dispatch;
mod log;
mod registry;

pub use dispatch::{Broker, BrokerStats};
pub use log::{Event, EventLog, GroupId};
pub use registry::{Completion, WaitEntry, WaitRegistry, WaiterId};
