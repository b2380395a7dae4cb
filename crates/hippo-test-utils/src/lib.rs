// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hippo integration tests.
//!
//! Provides mock collaborators and small-store configurations for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockCompletionProvider`] - Mock LLM with pre-configured responses
//! - [`ScriptedTagExtractor`] - Tag extractor with scripted results, latency and call tracking
//! - [`TestHarness`] - Temp directory plus a config wired to it

pub mod harness;
pub mod mock_provider;
pub mod scripted_extractor;

pub use harness::{TestHarness, small_store_config};
pub use mock_provider::MockCompletionProvider;
pub use scripted_extractor::ScriptedTagExtractor;
