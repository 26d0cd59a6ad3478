// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Middleware modules (session cookies, security headers).

pub mod security;
pub mod session;

pub use security::add_security_headers;
