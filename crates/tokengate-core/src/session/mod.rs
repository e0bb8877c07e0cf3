// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Revocable session tracking.
//!
//! A session is a single expiring key per subject. Absence of the key is the
//! terminal "inactive" state: a revoked session and an expired one look the
//! same.

mod memory;
mod store;
mod traits;

pub use memory::MemoryExpiringStore;
pub use store::SessionStore;
pub use traits::ExpiringKeyValueStore;
