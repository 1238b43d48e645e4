//! The `.npz` container: a zip file of named `.npy` members.

use crate::error::ArchiveError;
use crate::npy::NpyArray;
use crate::Result;
use std::io::{Read, Seek, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MEMBER_SUFFIX: &str = ".npy";

/// Writes named arrays into an uncompressed `.npz`, like `numpy.savez`.
pub struct NpzWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> NpzWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Add `array` under `name` (stored as `name.npy`).
    pub fn add_array(&mut self, name: &str, array: &NpyArray) -> Result<()> {
        let bytes = array.to_bytes();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(bytes.len() as u64 >= u32::MAX as u64);
        self.zip.start_file(format!("{name}{MEMBER_SUFFIX}"), options)?;
        self.zip.write_all(&bytes)?;
        Ok(())
    }

    /// Write the central directory and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

/// Reads named arrays from an `.npz`.
pub struct NpzReader<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> NpzReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            zip: ZipArchive::new(reader)?,
        })
    }

    /// Names of the arrays in the archive, without the `.npy` suffix.
    pub fn names(&self) -> Vec<String> {
        self.zip
            .file_names()
            .filter_map(|name| name.strip_suffix(MEMBER_SUFFIX))
            .map(str::to_string)
            .collect()
    }

    /// Read the array stored under `name`.
    pub fn by_name(&mut self, name: &str) -> Result<NpyArray> {
        let member = format!("{name}{MEMBER_SUFFIX}");
        let file = match self.zip.by_name(&member) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingArray(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.size();
        NpyArray::read_limited(file, Some(size))
    }
}
