//! Probes over the Linux `/proc` filesystem.
//!
//! [`SystemCollector`] reads host-wide files, [`ProcessCollector`] reads
//! `/proc/[pid]/` of the scraped process. Parsing lives in [`parser`].

pub mod parser;
pub mod process;
pub mod system;

pub use process::{CollectError, ProcessCollector};
pub use system::SystemCollector;
