// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Common Modul for the race replay generator
//!
//! Provides the common data types that are used across every modul:
//! planar and geodetic points, the raw feed record shapes of both source
//! pipelines, driver timelines and the canonical race record.

pub mod boundary;
pub mod historical;
pub mod live;
pub mod point;
pub mod record;
pub mod serde;
pub mod test_helper;
pub mod timeline;

#[cfg(test)]
mod tests;
