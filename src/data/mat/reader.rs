use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;

use super::{
    MatFile, MatValue, NumericArray, NumericClass, StructArray, FLAG_COMPLEX, FLAG_LOGICAL,
    MI_COMPRESSED, MI_DOUBLE, MI_INT16, MI_INT32, MI_INT64, MI_INT8, MI_MATRIX, MI_SINGLE,
    MI_UINT16, MI_UINT32, MI_UINT64, MI_UINT8, MI_UTF16, MI_UTF32, MI_UTF8, MX_CELL, MX_CHAR,
    MX_OBJECT, MX_STRUCT,
};
use crate::error::MatError;

pub(crate) const HEADER_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and decode a Level-5 MAT file from disk.
pub fn read_file(path: &Path) -> Result<MatFile, MatError> {
    let bytes = std::fs::read(path)?;
    parse(&bytes)
}

/// Decode a Level-5 MAT file held in memory.
pub fn parse(bytes: &[u8]) -> Result<MatFile, MatError> {
    if bytes.len() < HEADER_LEN {
        return Err(MatError::BadHeader(format!(
            "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
            bytes.len()
        )));
    }

    let endian = match &bytes[126..128] {
        b"IM" => Endian::Little,
        b"MI" => Endian::Big,
        other => {
            return Err(MatError::BadHeader(format!(
                "unrecognised endian indicator {other:?}"
            )))
        }
    };
    let version_bytes = [bytes[124], bytes[125]];
    let version = match endian {
        Endian::Little => u16::from_le_bytes(version_bytes),
        Endian::Big => u16::from_be_bytes(version_bytes),
    };
    if version != 0x0100 {
        return Err(MatError::BadHeader(format!(
            "unsupported version 0x{version:04x} (only Level 5 is read)"
        )));
    }

    let description = String::from_utf8_lossy(&bytes[..116])
        .trim_end_matches(['\0', ' '])
        .to_string();
    let mut variables = BTreeMap::new();
    let mut reader = ByteReader::new(&bytes[HEADER_LEN..], endian);

    while reader.remaining() >= 8 {
        let element = reader.read_element()?;

        let inflated: Vec<u8>;
        let (data_type, data) = if element.data_type == MI_COMPRESSED {
            inflated = inflate(element.data)?;
            let inner = ByteReader::new(&inflated, endian).read_element()?;
            (inner.data_type, inner.data)
        } else {
            (element.data_type, element.data)
        };

        if data_type != MI_MATRIX {
            log::debug!("Skipping top-level element of type {data_type}");
            continue;
        }

        let (name, value) = parse_matrix(data, endian)?;
        log::debug!("Decoded MAT variable '{name}' ({})", value.kind());
        variables.insert(name, value);
    }

    Ok(MatFile {
        description,
        variables,
    })
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, MatError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Data elements
// ---------------------------------------------------------------------------

struct Element<'a> {
    data_type: u32,
    data: &'a [u8],
}

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8], endian: Endian) -> Self {
        ByteReader {
            buf,
            pos: 0,
            endian,
        }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], MatError> {
        if n > self.remaining() {
            return Err(MatError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, MatError> {
        let b = self.take(4)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    /// Read one tagged element, handling the small-element form and the
    /// 8-byte padding that follows uncompressed payloads.
    fn read_element(&mut self) -> Result<Element<'a>, MatError> {
        let first = self.u32()?;

        if first >> 16 != 0 {
            let nbytes = (first >> 16) as usize;
            let data_type = first & 0xFFFF;
            check_data_type(data_type)?;
            let payload = self.take(4)?;
            if nbytes > 4 {
                return Err(MatError::Malformed {
                    name: String::new(),
                    reason: format!("small element claims {nbytes} bytes"),
                });
            }
            return Ok(Element {
                data_type,
                data: &payload[..nbytes],
            });
        }

        let data_type = first;
        check_data_type(data_type)?;
        let nbytes = self.u32()? as usize;
        let data = self.take(nbytes)?;
        if data_type != MI_COMPRESSED {
            let pad = (8 - nbytes % 8) % 8;
            self.pos = (self.pos + pad).min(self.buf.len());
        }
        Ok(Element { data_type, data })
    }
}

fn check_data_type(data_type: u32) -> Result<(), MatError> {
    match data_type {
        MI_INT8 | MI_UINT8 | MI_INT16 | MI_UINT16 | MI_INT32 | MI_UINT32 | MI_SINGLE
        | MI_DOUBLE | MI_INT64 | MI_UINT64 | MI_MATRIX | MI_COMPRESSED | MI_UTF8 | MI_UTF16
        | MI_UTF32 => Ok(()),
        other => Err(MatError::UnknownDataType(other)),
    }
}

macro_rules! decode_as {
    ($data:expr, $endian:expr, $t:ty) => {{
        const N: usize = std::mem::size_of::<$t>();
        $data
            .chunks_exact(N)
            .map(|chunk| {
                let mut raw = [0u8; N];
                raw.copy_from_slice(chunk);
                let value = match $endian {
                    Endian::Little => <$t>::from_le_bytes(raw),
                    Endian::Big => <$t>::from_be_bytes(raw),
                };
                value as f64
            })
            .collect::<Vec<f64>>()
    }};
}

fn element_width(data_type: u32) -> Option<usize> {
    Some(match data_type {
        MI_INT8 | MI_UINT8 | MI_UTF8 => 1,
        MI_INT16 | MI_UINT16 | MI_UTF16 => 2,
        MI_INT32 | MI_UINT32 | MI_SINGLE | MI_UTF32 => 4,
        MI_DOUBLE | MI_INT64 | MI_UINT64 => 8,
        _ => return None,
    })
}

/// Convert a numeric payload of any storage type to `f64`.
fn decode_numbers(element: &Element<'_>, endian: Endian, name: &str) -> Result<Vec<f64>, MatError> {
    let width = element_width(element.data_type).ok_or_else(|| MatError::Malformed {
        name: name.to_string(),
        reason: format!("element type {} is not numeric", element.data_type),
    })?;
    if element.data.len() % width != 0 {
        return Err(MatError::Malformed {
            name: name.to_string(),
            reason: format!(
                "{} payload bytes are not a multiple of {width}",
                element.data.len()
            ),
        });
    }

    let data = element.data;
    Ok(match element.data_type {
        MI_INT8 => decode_as!(data, endian, i8),
        MI_UINT8 | MI_UTF8 => decode_as!(data, endian, u8),
        MI_INT16 => decode_as!(data, endian, i16),
        MI_UINT16 | MI_UTF16 => decode_as!(data, endian, u16),
        MI_INT32 => decode_as!(data, endian, i32),
        MI_UINT32 | MI_UTF32 => decode_as!(data, endian, u32),
        MI_SINGLE => decode_as!(data, endian, f32),
        MI_DOUBLE => decode_as!(data, endian, f64),
        MI_INT64 => decode_as!(data, endian, i64),
        _ => decode_as!(data, endian, u64),
    })
}

fn decode_text(element: &Element<'_>, endian: Endian, name: &str) -> Result<String, MatError> {
    match element.data_type {
        MI_UTF8 | MI_UINT8 | MI_INT8 => Ok(String::from_utf8_lossy(element.data).into_owned()),
        MI_UTF16 | MI_UINT16 => {
            let units: Vec<u16> = decode_numbers(element, endian, name)?
                .into_iter()
                .map(|u| u as u16)
                .collect();
            Ok(String::from_utf16_lossy(&units))
        }
        _ => Ok(decode_numbers(element, endian, name)?
            .into_iter()
            .filter_map(|c| char::from_u32(c as u32))
            .collect()),
    }
}

// ---------------------------------------------------------------------------
// miMATRIX
// ---------------------------------------------------------------------------

/// Decode the payload of a `miMATRIX` element into its name and value.
fn parse_matrix(data: &[u8], endian: Endian) -> Result<(String, MatValue), MatError> {
    // MATLAB writes `[]` cell/struct slots as zero-length matrices.
    if data.is_empty() {
        return Ok((
            String::new(),
            NumericArray::matrix(0, 0, Vec::new()).into(),
        ));
    }

    let mut r = ByteReader::new(data, endian);

    let flags_el = r.read_element()?;
    let flags = decode_numbers(&flags_el, endian, "")?
        .first()
        .copied()
        .unwrap_or(0.0) as u32;
    let class = (flags & 0xFF) as u8;

    let dims_el = r.read_element()?;
    let dims = decode_numbers(&dims_el, endian, "")?
        .into_iter()
        .map(|d| {
            if d < 0.0 {
                Err(MatError::Malformed {
                    name: String::new(),
                    reason: format!("negative dimension {d}"),
                })
            } else {
                Ok(d as usize)
            }
        })
        .collect::<Result<Vec<usize>, MatError>>()?;

    let name_el = r.read_element()?;
    let name = String::from_utf8_lossy(name_el.data)
        .trim_end_matches('\0')
        .to_string();

    let count = checked_count(&dims, 1, &name)?;

    let value = match class {
        MX_CELL => {
            let mut items = Vec::with_capacity(nested_capacity(count, &r));
            for _ in 0..count {
                items.push(read_nested(&mut r, endian, &name)?);
            }
            MatValue::Cell { dims, items }
        }
        MX_STRUCT | MX_OBJECT => {
            let class_name = if class == MX_OBJECT {
                let el = r.read_element()?;
                Some(String::from_utf8_lossy(el.data).trim_end_matches('\0').to_string())
            } else {
                None
            };

            let len_el = r.read_element()?;
            let name_len = decode_numbers(&len_el, endian, &name)?
                .first()
                .copied()
                .unwrap_or(0.0) as usize;
            let names_el = r.read_element()?;
            let field_names: Vec<String> = if name_len == 0 {
                Vec::new()
            } else {
                names_el
                    .data
                    .chunks(name_len)
                    .map(|chunk| {
                        let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
                        String::from_utf8_lossy(&chunk[..end]).into_owned()
                    })
                    .collect()
            };

            let total = checked_count(&dims, field_names.len(), &name)?;
            let mut values = Vec::with_capacity(nested_capacity(total, &r));
            for _ in 0..total {
                values.push(read_nested(&mut r, endian, &name)?);
            }
            MatValue::Struct(StructArray {
                dims,
                class_name,
                field_names,
                values,
            })
        }
        MX_CHAR => {
            let text = if r.remaining() == 0 {
                String::new()
            } else {
                let el = r.read_element()?;
                decode_text(&el, endian, &name)?
            };
            MatValue::Char { dims, text }
        }
        id => match NumericClass::from_class_id(id) {
            Some(numeric_class) => {
                let real_el = r.read_element()?;
                let values = decode_numbers(&real_el, endian, &name)?;
                if flags & FLAG_COMPLEX != 0 {
                    // Imaginary parts are not needed by any figure.
                    r.read_element()?;
                }
                if values.len() != count {
                    return Err(MatError::Malformed {
                        name,
                        reason: format!(
                            "{} values for dimensions {dims:?}",
                            values.len()
                        ),
                    });
                }
                MatValue::Numeric(NumericArray {
                    dims,
                    data: values,
                    class: numeric_class,
                    logical: flags & FLAG_LOGICAL != 0,
                })
            }
            None => {
                log::warn!("Skipping '{name}': unsupported MAT class {id}");
                MatValue::Unsupported { class: id }
            }
        },
    };

    Ok((name, value))
}

/// Product of `dims` and `per_element`, rejecting sizes that overflow.
fn checked_count(dims: &[usize], per_element: usize, name: &str) -> Result<usize, MatError> {
    dims.iter()
        .try_fold(per_element, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| MatError::Malformed {
            name: name.to_string(),
            reason: format!("dimensions {dims:?} overflow the element count"),
        })
}

/// Pre-allocation for `n` nested elements. Each needs at least an 8-byte tag,
/// so a claim larger than the remaining bytes can hold is not trusted.
fn nested_capacity(n: usize, r: &ByteReader<'_>) -> usize {
    n.min(r.remaining() / 8)
}

fn read_nested(r: &mut ByteReader<'_>, endian: Endian, parent: &str) -> Result<MatValue, MatError> {
    let el = r.read_element()?;
    if el.data_type != MI_MATRIX {
        return Err(MatError::Malformed {
            name: parent.to_string(),
            reason: format!("expected a nested matrix, found element type {}", el.data_type),
        });
    }
    parse_matrix(el.data, endian).map(|(_, value)| value)
}
