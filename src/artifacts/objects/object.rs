use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Content-derived identity: the SHA-1 of the serialized object
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(ObjectId::digest(&content))
    }
}

/// SHA-1 over a sequence of parts, fed to the hasher back to back
pub fn sha1_of(parts: &[&[u8]]) -> ObjectId {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }

    ObjectId::from_digest(hasher.finalize().as_slice())
}
