//! Pipeline stages for PDF translation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ translate ──▶ paginate ──▶ render
//! (bytes)   (pdfium)    (backend)     (layout)     (lopdf)
//! ```
//!
//! 1. [`input`]: read the source stream and check the `%PDF` header
//! 2. [`extract`]: load with pdfium in `spawn_blocking`, join page texts
//! 3. [`translate`]: validate the target, chunk, call the backend in order;
//!    the only stage with network I/O
//! 4. [`paginate`]: place lines top-to-bottom on fixed-size pages
//! 5. [`render`]: write the pages as a PDF, with the standard font or an
//!    embedded [`font`]

pub mod extract;
pub mod font;
pub mod input;
pub mod paginate;
pub mod render;
pub mod translate;

#[cfg(test)]
#[path = "../../tests/common/sfnt.rs"]
pub(crate) mod sfnt;
