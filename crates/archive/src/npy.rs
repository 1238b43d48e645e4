//! The `.npy` array format.
//!
//! A file is the magic string, a version, a little-endian header length and
//! an ASCII Python dict literal describing `descr`, `fortran_order` and
//! `shape`, padded with spaces so the data starts on a 64-byte boundary.

use crate::error::ArchiveError;
use crate::Result;
use std::io::Read;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGNMENT: usize = 64;
/// Widest string dtype accepted when reading.
const MAX_UNICODE_WIDTH: usize = 1 << 20;

/// Element storage of an array, row-major.
#[derive(Debug, Clone)]
pub enum ArrayData {
    /// `<u8`
    U64(Vec<u64>),
    /// `<f8`
    F64(Vec<f64>),
    /// `<U{width}`: UCS-4 strings of at most `width` characters.
    Unicode { width: usize, values: Vec<String> },
}

impl ArrayData {
    fn len(&self) -> usize {
        match self {
            Self::U64(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Unicode { values, .. } => values.len(),
        }
    }

    /// NumPy dtype string, e.g. `<u8`.
    pub fn dtype(&self) -> String {
        match self {
            Self::U64(_) => "<u8".to_string(),
            Self::F64(_) => "<f8".to_string(),
            Self::Unicode { width, .. } => format!("<U{width}"),
        }
    }
}

/// An n-dimensional array with a shape and C-ordered data.
#[derive(Debug, Clone)]
pub struct NpyArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NpyArray {
    /// Create an array, checking that `shape` covers exactly the data.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Result<Self> {
        if element_count(&shape) != Some(data.len()) {
            return Err(ArchiveError::ShapeMismatch {
                shape,
                len: data.len(),
            });
        }
        if let ArrayData::Unicode { width, values } = &data {
            if let Some(long) = values.iter().find(|s| s.chars().count() > *width) {
                return Err(ArchiveError::Corruption(format!(
                    "string '{long}' exceeds declared width {width}"
                )));
            }
        }
        Ok(Self { shape, data })
    }

    pub fn from_u64(shape: Vec<usize>, values: Vec<u64>) -> Result<Self> {
        Self::new(shape, ArrayData::U64(values))
    }

    pub fn from_f64(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        Self::new(shape, ArrayData::F64(values))
    }

    /// Create a string array whose width is the longest value (at least 1,
    /// as NumPy never emits `<U0` for a non-empty array).
    pub fn from_strings(shape: Vec<usize>, values: Vec<String>) -> Result<Self> {
        let width = values
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        Self::new(shape, ArrayData::Unicode { width, values })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// NumPy dtype string of the elements.
    pub fn dtype(&self) -> String {
        self.data.dtype()
    }

    pub fn as_u64(&self) -> Option<&[u64]> {
        match &self.data {
            ArrayData::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.data {
            ArrayData::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.data {
            ArrayData::Unicode { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Serialize into `.npy` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = encode_header(&self.data.dtype(), &self.shape);
        match &self.data {
            ArrayData::U64(values) => {
                out.reserve(values.len() * 8);
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            ArrayData::F64(values) => {
                out.reserve(values.len() * 8);
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            ArrayData::Unicode { width, values } => {
                out.reserve(values.len() * width * 4);
                for s in values {
                    let mut written = 0;
                    for c in s.chars() {
                        out.extend_from_slice(&(c as u32).to_le_bytes());
                        written += 1;
                    }
                    for _ in written..*width {
                        out.extend_from_slice(&0u32.to_le_bytes());
                    }
                }
            }
        }
        out
    }

    /// Read one array in `.npy` format.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Self::read_limited(reader, None)
    }

    /// Read one array whose encoding is at most `limit` bytes long, rejecting
    /// headers that declare more data before anything is allocated.
    pub(crate) fn read_limited<R: Read>(mut reader: R, limit: Option<u64>) -> Result<Self> {
        let header = read_header(&mut reader)?;
        let count = element_count(&header.shape).ok_or_else(|| {
            ArchiveError::Header(format!("shape {:?} overflows the address space", header.shape))
        })?;
        let data_len = count
            .checked_mul(header.dtype.item_size())
            .ok_or_else(|| {
                ArchiveError::Header(format!(
                    "shape {:?} of {:?} overflows the address space",
                    header.shape, header.dtype
                ))
            })?;
        if let Some(limit) = limit {
            if data_len as u64 > limit {
                return Err(ArchiveError::Corruption(format!(
                    "header declares {data_len} data bytes but the member holds at most {limit}"
                )));
            }
        }

        let data = match header.dtype {
            Dtype::U64 => {
                let bytes = read_exact_vec(&mut reader, data_len)?;
                ArrayData::U64(
                    bytes
                        .chunks_exact(8)
                        .map(|c| u64::from_le_bytes(word(c)))
                        .collect(),
                )
            }
            Dtype::F64 => {
                let bytes = read_exact_vec(&mut reader, data_len)?;
                ArrayData::F64(
                    bytes
                        .chunks_exact(8)
                        .map(|c| f64::from_le_bytes(word(c)))
                        .collect(),
                )
            }
            Dtype::Unicode(width) => {
                let bytes = read_exact_vec(&mut reader, data_len)?;
                let values = bytes
                    .chunks_exact(width * 4)
                    .map(decode_ucs4)
                    .collect::<Result<Vec<_>>>()?;
                ArrayData::Unicode { width, values }
            }
        };

        Self::new(header.shape, data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    U64,
    F64,
    Unicode(usize),
}

impl Dtype {
    /// Bytes per element; never zero.
    fn item_size(self) -> usize {
        match self {
            Self::U64 | Self::F64 => 8,
            Self::Unicode(width) => width * 4,
        }
    }
}

/// Number of elements `shape` describes, `None` on overflow.
fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

#[derive(Debug)]
struct Header {
    dtype: Dtype,
    shape: Vec<usize>,
}

fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({n},)"),
        dims => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

fn encode_header(descr: &str, shape: &[usize]) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '{descr}', 'fortran_order': False, 'shape': {}, }}",
        format_shape(shape)
    );

    // Version 1.0 stores the header length in a u16; fall back to 2.0.
    let padded_len = |prefix_len: usize| {
        let unpadded = prefix_len + dict.len() + 1;
        dict.len() + 1 + (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT
    };
    let (major, prefix_len) = if padded_len(10) <= u16::MAX as usize {
        (1u8, 10)
    } else {
        (2u8, 12)
    };
    let header_len = padded_len(prefix_len);

    let mut out = Vec::with_capacity(prefix_len + header_len);
    out.extend_from_slice(MAGIC);
    out.push(major);
    out.push(0);
    if major == 1 {
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&(header_len as u32).to_le_bytes());
    }
    out.extend_from_slice(dict.as_bytes());
    out.resize(prefix_len + header_len - 1, b' ');
    out.push(b'\n');
    out
}

fn word(chunk: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(chunk);
    out
}

/// Read exactly `len` bytes, growing the buffer only as data arrives.
fn read_exact_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(ArchiveError::Corruption(format!(
            "truncated array: expected {len} bytes, found {}",
            buf.len()
        )));
    }
    Ok(buf)
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(ArchiveError::Header("missing NUMPY magic string".into()));
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = match version[0] {
        1 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
        v => {
            return Err(ArchiveError::Header(format!(
                "unsupported format version {v}.{}",
                version[1]
            )))
        }
    };

    let raw = read_exact_vec(reader, header_len)?;
    let dict = String::from_utf8(raw)
        .map_err(|e| ArchiveError::Header(format!("header is not valid text: {e}")))?;
    parse_header(&dict)
}

fn value_after<'a>(dict: &'a str, key: &str) -> Result<&'a str> {
    let pattern = format!("'{key}':");
    let start = dict
        .find(&pattern)
        .ok_or_else(|| ArchiveError::Header(format!("missing key '{key}'")))?;
    Ok(dict[start + pattern.len()..].trim_start())
}

fn parse_header(dict: &str) -> Result<Header> {
    let descr_field = value_after(dict, "descr")?;
    let descr = descr_field
        .strip_prefix('\'')
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(|| ArchiveError::Header(format!("unparsable descr in {dict}")))?;
    let dtype = parse_descr(descr)?;

    let order = value_after(dict, "fortran_order")?;
    if order.starts_with("True") {
        return Err(ArchiveError::UnsupportedDtype(
            "Fortran-ordered arrays".into(),
        ));
    } else if !order.starts_with("False") {
        return Err(ArchiveError::Header(format!("unparsable fortran_order in {dict}")));
    }

    let shape_field = value_after(dict, "shape")?;
    let inner = shape_field
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(|| ArchiveError::Header(format!("unparsable shape in {dict}")))?;
    let shape = inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|e| ArchiveError::Header(format!("bad dimension '{part}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Header { dtype, shape })
}

fn parse_descr(descr: &str) -> Result<Dtype> {
    match descr {
        "<u8" => Ok(Dtype::U64),
        "<f8" => Ok(Dtype::F64),
        other => {
            match other.strip_prefix("<U").map(str::parse::<usize>) {
                Some(Ok(width)) if width > 0 && width <= MAX_UNICODE_WIDTH => {
                    Ok(Dtype::Unicode(width))
                }
                _ => Err(ArchiveError::UnsupportedDtype(other.to_string())),
            }
        }
    }
}

fn decode_ucs4(element: &[u8]) -> Result<String> {
    let mut s = String::new();
    for unit in element.chunks_exact(4) {
        let code = u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]);
        if code == 0 {
            break;
        }
        let c = char::from_u32(code).ok_or_else(|| {
            ArchiveError::Corruption(format!("invalid code point {code:#x} in string array"))
        })?;
        s.push(c);
    }
    Ok(s)
}
