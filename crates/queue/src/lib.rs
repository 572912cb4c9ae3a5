// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kyu-queue: a resumable work queue over the kyu logs
//!
//! Composes a volatile or durable log with consumer-offset tracking: every
//! commit advances a contiguous low-water mark, and in persistent mode the
//! mark is appended to a durable offset-marker file so a restarted queue
//! resumes at exactly the first un-committed record.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod offset;
pub mod queue;

pub use offset::{OffsetError, OffsetMarker, OffsetTracker};
pub use queue::{Delivery, Queue, QueueError, QueueEvent};
