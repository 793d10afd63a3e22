// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be held as `Arc<dyn Trait>`.

pub mod adapter;
pub mod identity;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use identity::IdentityAdapter;
pub use provider::ProviderAdapter;
pub use storage::ConversationStore;
