#![doc = include_str!("../README.md")]

mod affinity;
mod cancel;
mod error;
mod oracle;
mod orchestrator;
mod partition;
mod worker;

pub use crate::affinity::*;
pub use crate::cancel::*;
pub use crate::error::*;
pub use crate::oracle::*;
pub use crate::orchestrator::*;
pub use crate::partition::*;
pub use crate::worker::*;
