//! Archives of named compiled-function blobs.
//!
//! An archive bundles independently compiled functions so they can be
//! distributed and linked by name instead of being inlined into every
//! artifact. The stream layout is a flat sequence of records,
//! `name_len u16 | name | code_len u32 | code`, terminated by end of stream.
//! Code blobs are opaque to the archive.

use std::io::{self, Read, Write};
use std::path::Path;

use indexmap::IndexMap;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("duplicate function name \"{0}\"")]
    DuplicateFunction(String),
    #[error("corrupt archive: {0}")]
    Corrupt(&'static str),
    #[error("corrupt archive: function name is not valid UTF-8")]
    InvalidName,
    #[error("function name of {0} bytes exceeds the u16 record field")]
    NameTooLong(usize),
    #[error("code blob of {0} bytes exceeds the u32 record field")]
    CodeTooLarge(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One named compiled function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtFunction {
    name: String,
    code: Vec<u8>,
}

impl RtFunction {
    pub fn new(name: impl Into<String>, code: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

/// Derive a function name from its source path: the file stem, with a
/// leading `rt_` prefix stripped.
pub fn function_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix("rt_") {
        Some(rest) if !rest.is_empty() => rest.to_owned(),
        _ => stem,
    }
}

/// Ordered collection of functions keyed by unique name.
#[derive(Debug, Default)]
pub struct Archive {
    functions: IndexMap<String, RtFunction>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an archive from compiled input files. Names derive from the
    /// file stems. All-or-nothing: a missing file or a name collision
    /// produces no archive at all.
    pub fn create<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ArchiveError> {
        let mut archive = Self::new();
        for path in paths {
            let path = path.as_ref();
            let code = std::fs::read(path)?;
            archive.add_function(RtFunction::new(function_name_for(path), code))?;
        }
        Ok(archive)
    }

    /// Insert a function; its name must be unique within the archive.
    pub fn add_function(&mut self, function: RtFunction) -> Result<(), ArchiveError> {
        if self.functions.contains_key(function.name()) {
            return Err(ArchiveError::DuplicateFunction(function.name().to_owned()));
        }
        self.functions.insert(function.name.clone(), function);
        Ok(())
    }

    /// Look a function up by name. Absence means "not found": the archive
    /// never synthesizes a stub.
    pub fn find_function(&self, name: &str) -> Option<&RtFunction> {
        self.functions.get(name)
    }

    /// Read-only view of the function map, in insertion order.
    pub fn get_functions(&self) -> &IndexMap<String, RtFunction> {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Write every record in insertion order.
    pub fn save(&self, out: &mut impl Write) -> Result<(), ArchiveError> {
        for function in self.functions.values() {
            let name = function.name.as_bytes();
            if name.len() > u16::MAX as usize {
                return Err(ArchiveError::NameTooLong(name.len()));
            }
            if function.code.len() > u32::MAX as usize {
                return Err(ArchiveError::CodeTooLarge(function.code.len()));
            }
            out.write_all(&(name.len() as u16).to_le_bytes())?;
            out.write_all(name)?;
            out.write_all(&(function.code.len() as u32).to_le_bytes())?;
            out.write_all(&function.code)?;
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        let mut file = std::fs::File::create(path)?;
        self.save(&mut file)
    }

    /// Read records until end of stream. Fails closed: a declared length
    /// that would read past the end yields `Corrupt` and no archive.
    pub fn load(input: &mut impl Read) -> Result<Self, ArchiveError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Self::from_stream(&bytes)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let bytes = std::fs::read(path)?;
        Self::from_stream(&bytes)
    }

    fn from_stream(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let mut archive = Self::new();
        let mut pos = 0usize;

        while pos < bytes.len() {
            let name_len = read_u16(bytes, &mut pos)
                .ok_or(ArchiveError::Corrupt("truncated name length"))? as usize;
            let name_bytes = read_slice(bytes, &mut pos, name_len)
                .ok_or(ArchiveError::Corrupt("name runs past end of stream"))?;
            let name = std::str::from_utf8(name_bytes).map_err(|_| ArchiveError::InvalidName)?;

            let code_len = read_u32(bytes, &mut pos)
                .ok_or(ArchiveError::Corrupt("truncated code length"))? as usize;
            let code = read_slice(bytes, &mut pos, code_len)
                .ok_or(ArchiveError::Corrupt("code runs past end of stream"))?;

            archive.add_function(RtFunction::new(name, code.to_vec()))?;
        }

        Ok(archive)
    }
}

fn read_slice<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Option<&'a [u8]> {
    let end = pos.checked_add(len)?;
    if end > bytes.len() {
        return None;
    }
    let slice = &bytes[*pos..end];
    *pos = end;
    Some(slice)
}

fn read_u16(bytes: &[u8], pos: &mut usize) -> Option<u16> {
    let slice = read_slice(bytes, pos, 2)?;
    Some(u16::from_le_bytes([slice[0], slice[1]]))
}

fn read_u32(bytes: &[u8], pos: &mut usize) -> Option<u32> {
    let slice = read_slice(bytes, pos, 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
