// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for load/save operations on stored entities.

pub mod activities;
pub mod conversations;
pub mod cursor;
pub mod messages;
pub mod payments;
pub mod prompt_requests;
pub mod spending_limits;
