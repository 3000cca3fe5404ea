//! Serialization bridge turning inspectable objects into framed payloads.
//!
//! Only registered types can be inspected. Object state is encoded as JSON, and every payload is
//! framed so that the inspector never mistakes an object for a sentinel:
//!
//! ```text
//! ┌──────────────┐
//! │ tag: u8      │  <- 0 object, 1 not serializable, 2 I/O error
//! │ len: u32     │  <- body size in bytes, big endian
//! │ body...      │  <- object bytes or sentinel message
//! └──────────────┘
//! ```

use std::{
    any::{Any, TypeId},
    collections::BTreeMap,
    io::Write,
    panic::{self, AssertUnwindSafe},
};

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// Sentinel message for objects that cannot be serialized.
pub const NOT_SERIALIZABLE: &str = "object is not serializable";

/// Sentinel message for serializations interrupted by the underlying writer.
pub const IO_ERROR: &str = "serialization failed due to an I/O error";

/// Frame header size in bytes.
pub const HEADER_SIZE: usize = 5;

const TAG_OBJECT: u8 = 0;
const TAG_NOT_SERIALIZABLE: u8 = 1;
const TAG_IO_ERROR: u8 = 2;

/// Result of the serialization of an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Serialized object state.
    Object(Vec<u8>),
    /// The object type is not registered, or its serialization failed.
    NotSerializable,
    /// The writer failed during serialization.
    IoError,
}

impl Payload {
    pub fn tag(&self) -> u8 {
        match self {
            Payload::Object(_) => TAG_OBJECT,
            Payload::NotSerializable => TAG_NOT_SERIALIZABLE,
            Payload::IoError => TAG_IO_ERROR,
        }
    }

    /// Object bytes or sentinel message.
    pub fn body(&self) -> &[u8] {
        match self {
            Payload::Object(bytes) => bytes,
            Payload::NotSerializable => NOT_SERIALIZABLE.as_bytes(),
            Payload::IoError => IO_ERROR.as_bytes(),
        }
    }

    /// Encodes the payload with its frame header.
    ///
    /// Fails if the body does not fit the 32-bit length field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = self.body();
        let len = frame_len(body.len())?;
        let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
        bytes.push(self.tag());
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(body);
        Ok(bytes)
    }

    /// Decodes a framed payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some((header, body)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(Error::MalformedFrame("truncated header"));
        };
        let [tag, len @ ..] = *header;
        if u32::from_be_bytes(len) as usize != body.len() {
            return Err(Error::MalformedFrame("body length mismatch"));
        }
        let expect_sentinel = |payload: Payload| {
            if body == payload.body() {
                Ok(payload)
            } else {
                Err(Error::MalformedFrame("unexpected sentinel message"))
            }
        };
        match tag {
            TAG_OBJECT => Ok(Payload::Object(body.to_vec())),
            TAG_NOT_SERIALIZABLE => expect_sentinel(Payload::NotSerializable),
            TAG_IO_ERROR => expect_sentinel(Payload::IoError),
            _ => Err(Error::MalformedFrame("unknown tag")),
        }
    }
}

fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::MalformedFrame("body too large"))
}

/// Falls back to the I/O error sentinel when a payload cannot be framed.
fn frame_or_io_error(framed: Result<Vec<u8>>) -> Vec<u8> {
    framed.unwrap_or_else(|err| {
        warn!("unable to frame payload: {err}");
        // Sentinel bodies always fit
        Payload::IoError.to_bytes().unwrap_or_default()
    })
}

/// Why an object could not be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    NotSerializable,
    IoError,
}

impl From<Failure> for Payload {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::NotSerializable => Payload::NotSerializable,
            Failure::IoError => Payload::IoError,
        }
    }
}

type SerializeFn = fn(&dyn Any, &mut dyn Write) -> Option<serde_json::Result<()>>;

fn serialize_as<T: Serialize + 'static>(
    object: &dyn Any,
    writer: &mut dyn Write,
) -> Option<serde_json::Result<()>> {
    let object = object.downcast_ref::<T>()?;
    Some(serde_json::to_writer(writer, object))
}

/// Registry of the inspectable types.
#[derive(Default)]
pub struct Bridge {
    serializers: BTreeMap<TypeId, SerializeFn>,
}

impl Bridge {
    /// Creates a bridge with no types registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `T` inspectable.
    pub fn register<T: Serialize + 'static>(&mut self) -> &mut Self {
        self.serializers.insert(TypeId::of::<T>(), serialize_as::<T>);
        self
    }

    pub fn is_registered(&self, object: &dyn Any) -> bool {
        self.serializers.contains_key(&object.type_id())
    }

    /// Writes the state of `object` to `writer`.
    ///
    /// Bytes may have been written when this fails.
    pub fn write_object(
        &self,
        object: &dyn Any,
        writer: &mut dyn Write,
    ) -> std::result::Result<(), Failure> {
        let Some(serialize) = self.serializers.get(&object.type_id()) else {
            debug!("object type is not registered");
            return Err(Failure::NotSerializable);
        };
        let serialized = panic::catch_unwind(AssertUnwindSafe(|| serialize(object, &mut *writer)));
        let Ok(serialized) = serialized else {
            error!("panic while serializing object");
            return Err(Failure::NotSerializable);
        };
        match serialized {
            Some(Ok(())) => Ok(()),
            Some(Err(err)) if err.is_io() => {
                debug!("object serialization interrupted: {err}");
                Err(Failure::IoError)
            }
            Some(Err(err)) => {
                debug!("object serialization failed: {err}");
                Err(Failure::NotSerializable)
            }
            None => Err(Failure::NotSerializable),
        }
    }

    /// Serializes `object` in memory.
    pub fn object_to_bytes(&self, object: &dyn Any) -> Payload {
        let mut buffer = Vec::new();
        match self.write_object(object, &mut buffer) {
            Ok(()) => Payload::Object(buffer),
            Err(failure) => failure.into(),
        }
    }

    /// Serializes `object` and frames the result, ready for the inspector.
    pub fn frame_object(&self, object: &dyn Any) -> Vec<u8> {
        frame_or_io_error(self.object_to_bytes(object).to_bytes())
    }
}
