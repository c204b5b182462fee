//! Register model for the Aurora link core.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the core's register interface: addresses, bitfield
//! layout, the per-channel address decode, and the decoders that turn raw
//! register words into typed values.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`field`] | Register codec: `extract` / `insert` on 32-bit words |
//! | [`regs`] | Core-level and per-channel register map, field definitions |
//! | [`channel`] | Channel address mapper (stride decode and its inverse) |
//! | [`compat`] | Compat number (major/minor) decoding |
//! | [`config`] | `CoreConfig` decode (core and channel counts) |
//! | [`status`] | `CoreStatus` decode (lanes, link, errors, clock locks) |
//! | [`policy`] | Per-channel `StopPolicy` encoding |
//! | [`events`] | Inbound error codes and outbound event codes |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod compat;
pub mod config;
pub mod events;
pub mod field;
pub mod policy;
pub mod regs;
pub mod status;
