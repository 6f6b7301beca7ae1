use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Kind byte, blob id and path length
pub const ENTRY_FIXED_SIZE: usize = 1 + OBJECT_ID_LENGTH / 2 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    Addition,
    Removal,
}

impl StagedKind {
    fn as_byte(self) -> u8 {
        match self {
            StagedKind::Addition => b'+',
            StagedKind::Removal => b'-',
        }
    }

    fn from_byte(byte: u8) -> anyhow::Result<Self> {
        match byte {
            b'+' => Ok(StagedKind::Addition),
            b'-' => Ok(StagedKind::Removal),
            other => Err(anyhow!("Invalid staged entry kind: {other:#04x}")),
        }
    }
}

/// One staged addition or removal as stored in the staging file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StagedEntry {
    pub kind: StagedKind,
    pub path: PathBuf,
    pub oid: ObjectId,
}

impl StagedEntry {
    /// Path length encoded in the fixed-size prefix of an entry
    pub fn path_len(fixed: &[u8]) -> anyhow::Result<usize> {
        let mut length = fixed
            .get(ENTRY_FIXED_SIZE - 2..ENTRY_FIXED_SIZE)
            .ok_or_else(|| anyhow!("Truncated staged entry"))?;

        Ok(length.read_u16::<NetworkEndian>()? as usize)
    }
}

impl Packable for StagedEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let path = self.path.to_string_lossy();
        let path_len = u16::try_from(path.len())
            .map_err(|_| anyhow!("Path too long to stage: {}", self.path.display()))?;

        let mut bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + path.len());
        bytes.write_u8(self.kind.as_byte())?;
        self.oid.write_h40_to(&mut bytes)?;
        bytes.write_u16::<NetworkEndian>(path_len)?;
        bytes.write_all(path.as_bytes())?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for StagedEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let kind = StagedKind::from_byte(reader.read_u8()?)?;
        let oid = ObjectId::read_h40_from(&mut reader)?;
        let path_len = reader.read_u16::<NetworkEndian>()? as usize;

        let mut path = vec![0u8; path_len];
        reader
            .read_exact(&mut path)
            .map_err(|_| anyhow!("Truncated staged entry path"))?;
        let path = String::from_utf8(path)?;

        Ok(StagedEntry::new(kind, PathBuf::from(path), oid))
    }
}
