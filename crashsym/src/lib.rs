//! # crashsym - Crash Report Symbolication
//!
//! crashsym rewrites the raw frame addresses of a stripped crash report into
//! function names, source files and line numbers, using the debug symbols of
//! an offline `.dSYM` bundle and the external `atos` tool.
//!
//! ## Architecture Overview
//!
//! ```text
//!   crash report (text)              App.app.dSYM
//!          │                               │
//!          ▼                               ▼
//! ┌──────────────────┐          ┌──────────────────────┐
//! │     extract      │          │    symbolization     │
//! │ 0x... <decimal>  │─records─▶│ DWARF file + atos    │
//! └──────────────────┘          │ load addr = a - off  │
//!                               └──────────┬───────────┘
//!                                          │ resolved records
//!                                          ▼
//!                               ┌──────────────────────┐
//!                               │       rewrite        │
//!                               │ span substitution    │
//!                               └──────────┬───────────┘
//!                                          ▼
//!                                 symbolicated report
//! ```
//!
//! ## Module Structure
//!
//! - [`extract`]: pattern scan producing address records
//! - [`symbolization`]: bundle and tool discovery, load address computation,
//!   the `atos` backend
//! - [`rewrite`]: span-based substitution into the original text
//! - [`pipeline`]: orchestration and the resolver worker pool
//! - [`export`]: JSON report of per-address outcomes
//! - [`domain`]: records and error types
//! - [`cli`], [`preflight`]: command line front end
//!
//! ## Failure Model
//!
//! Only an unreadable crash file aborts a run. Every other failure (no DWARF
//! file, no `atos`, bad address, failed process) is kept per address and
//! shows up inline in the output, so one bad frame never hides the rest of
//! the report.
//!
//! ## Typical Usage
//!
//! ```bash
//! crashsym --dsym App.app.dSYM App.crash
//! crashsym --dsym App.app.dSYM App.crash --batch --report report.json
//! ```

pub mod cli;
pub mod domain;
pub mod export;
pub mod extract;
pub mod pipeline;
pub mod preflight;
pub mod rewrite;
pub mod symbolization;
