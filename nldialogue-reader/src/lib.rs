//! Playback of parsed dialogue trees.
//!
//! A [`Reader`] walks a [`nldialogue_core::Tree`] with an explicit stack of
//! frames, so a session can be suspended after every line or choice and
//! resumed by the host on its next call.

pub mod error;
pub mod reader;
pub mod runner;

pub use error::ReaderError;
pub use reader::{Frame, Reader};
pub use runner::{ChoiceOffer, Runner};
