// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! evq-core: in-process long-poll event broker
//!
//! Producers publish data under string keys. Consumers, identified by a
//! consumer group, fetch the events their group has not yet seen on a key,
//! either immediately or by waiting for the next publish.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod broker;
pub mod clock;
pub mod config;
pub mod error;

pub use broker::{Broker, BrokerStats, GroupId};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BrokerConfig, DEFAULT_EVENT_TTL, DEFAULT_WAIT_TIMEOUT};
pub use error::ConfigError;
