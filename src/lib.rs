//! fitconv Core Library
//!
//! Converts a stream of decoded FIT activity messages (session, lap, record,
//! sport, and developer field descriptions) into a single JSON document with
//! per-lap aggregate metrics. The binary wire decoder is out of scope: this
//! crate receives already-decoded messages through listener callbacks, queues
//! them across the concurrency boundary, translates them on a single worker,
//! and assembles the document once the stream ends.

pub mod convert;
pub mod enrich;
pub mod error;
pub mod message;
pub mod options;
pub mod profile;
pub mod project;
pub mod translate;
pub mod value;

pub use convert::{DecoderEvent, JsonConverter};
pub use error::ConvertError;
pub use message::{
    DeveloperField, Field, FieldDescription, Message, MessageDefinition, MessageKind, SubField,
};
pub use options::ConvertOptions;
pub use profile::ProfileType;
pub use value::{BaseType, Value};
