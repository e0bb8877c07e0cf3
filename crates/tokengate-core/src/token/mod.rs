// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signed token encoding and verification.
//!
//! Tokens are HS256 JWTs signed with a per-subject secret resolved from the
//! directory, so rotating one account's key invalidates only that account's
//! tokens.

mod claims;
mod codec;

pub use claims::Claims;
pub use codec::{IssuedToken, TokenCodec};
