//! Shared test utilities for billsweep integration tests.
//!
//! This module provides:
//! - `FakeMailbox`, an in-memory `MailboxProvider` with injectable failures
//! - `TestHarness` for scans into an isolated temp directory
//! - Builders for messages and their MIME structure

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FakeFolder, FakeMailbox, TestHarness};
