// ABOUTME: Error types shared by the provider adapters and the fetch pipeline
// ABOUTME: Re-exports provider, fetch and table error enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Errors raised by a single provider call
pub mod provider;

/// Errors surfaced to callers of a fetch
pub mod fetch;

/// Errors raised while building or combining tables
pub mod table;

pub use fetch::FetchError;
pub use provider::ProviderError;
pub use table::TableError;
