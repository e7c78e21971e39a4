//! # Symbol Resolution Against a dSYM Bundle
//!
//! This module turns a raw frame address from a crash report into the
//! function, file and line it belongs to. The DWARF data itself is never
//! parsed here: it is handed to `atos`, which does the lookup.
//!
//! ## Load Address Computation
//!
//! Images are loaded at a randomized base address (ASLR). Crash reports
//! print each frame as the runtime address plus its offset into the image,
//! so the load address falls out directly:
//!
//! ```text
//! 0   App   0x0000000103450b5c 0x0000000102514000 + 16010076
//!
//! load address = 0x103450b5c - 16010076 = 0x102514000
//! ```
//!
//! `atos` takes the load address with `-l` and slides the DWARF addresses
//! accordingly. An offset larger than the address is rejected rather than
//! wrapped.
//!
//! ## Resolution Steps
//!
//! For every record, in order:
//! 1. Find the DWARF file in `<bundle>/Contents/Resources/DWARF`
//! 2. Find the `atos` executable
//! 3. Compute the load address
//! 4. Run the backend and trim its output
//!
//! Each step has its own [`ResolveError`](crate::domain::ResolveError)
//! variant. A failure stays with its record and never stops the batch.
//!
//! ## Module Structure
//!
//! - **`artifact`**: dSYM layout lookup ([`DsymLocator`])
//! - **`tool`**: `atos` discovery ([`FixedPathLocator`], [`LocatorChain`])
//! - **`atos`**: the [`SymbolBackend`] seam and the `atos` subprocess backend
//! - **`resolver`**: [`SymbolResolver`], which ties the three together and
//!   caches discovery results

pub mod artifact;
pub mod atos;
pub mod resolver;
pub mod tool;

pub use artifact::{ArtifactLocator, DsymLocator};
pub use atos::{AtosBackend, Lookup, SymbolBackend};
pub use resolver::SymbolResolver;
pub use tool::{ExplicitToolLocator, FixedPathLocator, LocatorChain, ToolLocator};
