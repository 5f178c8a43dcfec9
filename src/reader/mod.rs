//! XML Reader Module
//!
//! - SliceReader: zero-copy, well-formedness checking event reader
//! - Events: XML event types for pull parsing
//! - Buffered: chunked input from files and streams

pub mod buffered;
pub mod events;
pub mod slice;

pub use events::{EndElement, StartElement, XmlEvent};
pub use slice::SliceReader;
