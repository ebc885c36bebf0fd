#![deny(unused_must_use)]
#![forbid(unsafe_code)]
//! A hierarchical configuration store made of *blocks* and *parameters*.
//!
//! A [`BlockPar`] is an ordered sequence of named parameters (`name = value`) and
//! named nested blocks. Names may repeat; order is preserved. Trees are loaded from
//! and saved to a small text format (see [`text`](crate::BlockPar::load_from_text)),
//! addressed with paths such as `ship/engine/speed`, and their values are
//! interpreted with [`ParamValue`].
//!
//! ```
//! use blockpar::BlockPar;
//!
//! let mut tree = BlockPar::load_from_text(
//!     "ship {\n    speed = 300\n    cargo = food\n    cargo = ore\n}\n",
//! )?;
//!
//! assert_eq!(tree.param_path_get("ship/speed")?.as_int()?, 300);
//! assert_eq!(tree.block_get("ship")?.param_get("cargo", 1)?.as_str(), "ore");
//!
//! tree.param_path_add("ship/hull/armor", "12")?;
//! assert!(tree.save_to_text(false).contains("armor = 12"));
//! # Ok::<(), blockpar::err::BlockParError>(())
//! ```

pub mod err;
pub mod file;

mod block;
mod json_output;
mod name_index;
mod node;
mod path;
mod settings;
mod text;
mod value;

pub use block::BlockPar;
pub use err::{BlockParError, ParseErrorReason, Result};
pub use node::{Node, NodeKind};
pub use path::PathResolver;
pub use settings::{LoadSettings, OutputEncoding, SaveSettings};
pub use value::ParamValue;

#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}
