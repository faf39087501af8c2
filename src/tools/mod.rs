//! External tool invocation. The compiler, the screenshotter and the
//! lossless recompressor are black boxes reached through one trait.
//!
//! | Operation | Tool (default) | Contract |
//! |---|---|---|
//! | **Compile** | `stylus` | artifact bytes on stdout, non-zero exit is an error |
//! | **Screenshot** | `phantomjs screenshot.js` | writes a PNG at the given path |
//! | **Recompress** | `pngcrush` | writes a smaller, equivalent PNG at the given path |
//!
//! The module is split into:
//! - **Parameters**: what to run each tool on, and how that maps to argv
//! - **Backend**: [`ToolBackend`] trait + [`CommandBackend`]

pub mod backend;
pub mod command_backend;
mod params;

pub use backend::{ToolBackend, ToolError};
pub use command_backend::CommandBackend;
pub use params::{CompileParams, RecompressParams, ScreenshotParams};
