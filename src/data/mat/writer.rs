use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::{
    MatValue, FLAG_LOGICAL, MI_COMPRESSED, MI_DOUBLE, MI_INT32, MI_INT8, MI_MATRIX, MI_UINT16,
    MI_UINT32, MX_CELL, MX_CHAR, MX_OBJECT, MX_STRUCT,
};
use crate::error::MatError;

const DESCRIPTION: &str = "MATLAB 5.0 MAT-file, Platform: rust, Created by: magneto-figures";
const MIN_FIELD_NAME_LEN: usize = 32;

/// Encode `variables` and write them to `path`, replacing any existing file.
pub fn write_file(
    path: &Path,
    variables: &[(&str, &MatValue)],
    compress: bool,
) -> Result<(), MatError> {
    let bytes = to_bytes(variables, compress)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encode `variables` as a little-endian Level-5 MAT file.
///
/// With `compress`, every variable is stored as its own zlib stream, which
/// is what MATLAB's default `-v7` format does.
pub fn to_bytes(variables: &[(&str, &MatValue)], compress: bool) -> Result<Vec<u8>, MatError> {
    let mut out = header();
    for (name, value) in variables {
        let element = matrix_element(name, value)?;
        if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&element)?;
            let packed = encoder.finish()?;
            // Compressed elements carry no trailing padding.
            push_tag(&mut out, MI_COMPRESSED, packed.len());
            out.extend_from_slice(&packed);
        } else {
            out.extend_from_slice(&element);
        }
    }
    Ok(out)
}

fn header() -> Vec<u8> {
    let mut out = vec![b' '; 116];
    out[..DESCRIPTION.len()].copy_from_slice(DESCRIPTION.as_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&0x0100u16.to_le_bytes());
    out.extend_from_slice(b"IM");
    out
}

fn push_tag(out: &mut Vec<u8>, data_type: u32, nbytes: usize) {
    out.extend_from_slice(&data_type.to_le_bytes());
    out.extend_from_slice(&(nbytes as u32).to_le_bytes());
}

fn push_element(out: &mut Vec<u8>, data_type: u32, data: &[u8]) {
    push_tag(out, data_type, data.len());
    out.extend_from_slice(data);
    let pad = (8 - data.len() % 8) % 8;
    out.extend(std::iter::repeat(0u8).take(pad));
}

fn push_small_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&((4u32 << 16) | MI_INT32).to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

/// A complete `miMATRIX` element, tag included.
fn matrix_element(name: &str, value: &MatValue) -> Result<Vec<u8>, MatError> {
    let (class, flags, dims) = match value {
        MatValue::Numeric(n) => (
            n.class.class_id(),
            if n.logical { FLAG_LOGICAL } else { 0 },
            &n.dims,
        ),
        MatValue::Char { dims, .. } => (MX_CHAR, 0, dims),
        MatValue::Cell { dims, .. } => (MX_CELL, 0, dims),
        MatValue::Struct(s) if s.class_name.is_some() => (MX_OBJECT, 0, &s.dims),
        MatValue::Struct(s) => (MX_STRUCT, 0, &s.dims),
        MatValue::Unsupported { .. } => return Err(MatError::Unencodable("unsupported-class")),
    };

    let mut body = Vec::new();

    let flag_word = flags | u32::from(class);
    let mut flag_bytes = flag_word.to_le_bytes().to_vec();
    flag_bytes.extend_from_slice(&0u32.to_le_bytes());
    push_element(&mut body, MI_UINT32, &flag_bytes);

    let dim_bytes: Vec<u8> = dims
        .iter()
        .flat_map(|&d| (d as i32).to_le_bytes())
        .collect();
    push_element(&mut body, MI_INT32, &dim_bytes);
    push_element(&mut body, MI_INT8, name.as_bytes());

    match value {
        MatValue::Numeric(n) => {
            let data: Vec<u8> = n.data.iter().flat_map(|v| v.to_le_bytes()).collect();
            push_element(&mut body, MI_DOUBLE, &data);
        }
        MatValue::Char { text, .. } => {
            let data: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
            push_element(&mut body, MI_UINT16, &data);
        }
        MatValue::Cell { items, .. } => {
            for item in items {
                body.extend_from_slice(&matrix_element("", item)?);
            }
        }
        MatValue::Struct(s) => {
            if let Some(class_name) = &s.class_name {
                push_element(&mut body, MI_INT8, class_name.as_bytes());
            }
            let longest = s.field_names.iter().map(String::len).max().unwrap_or(0);
            let name_len = MIN_FIELD_NAME_LEN.max(longest + 1);
            push_small_i32(&mut body, name_len as i32);

            let mut names = vec![0u8; name_len * s.field_names.len()];
            for (i, field) in s.field_names.iter().enumerate() {
                names[i * name_len..i * name_len + field.len()].copy_from_slice(field.as_bytes());
            }
            push_element(&mut body, MI_INT8, &names);

            for v in &s.values {
                body.extend_from_slice(&matrix_element("", v)?);
            }
        }
        MatValue::Unsupported { .. } => unreachable!("rejected above"),
    }

    let mut out = Vec::with_capacity(body.len() + 8);
    push_element(&mut out, MI_MATRIX, &body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mat::{parse, NumericArray, NumericClass, StructArray};

    fn training_record() -> MatValue {
        MatValue::singleton_cell(
            StructArray::scalar(vec![
                ("trainFcn", MatValue::from("trainlm")),
                ("trainInd", NumericArray::row_vector(&[1.0, 3.0]).into()),
                ("testInd", NumericArray::row_vector(&[2.0, 4.0]).into()),
            ])
            .into(),
        )
    }

    #[test]
    fn compressed_bundle_decodes_to_same_values() {
        let tr = training_record();
        let outputs = MatValue::singleton_cell(NumericArray::row_vector(&[0.5, 10.0, 1.5, 20.0]).into());
        let targets: MatValue = NumericArray::column_vector(&[0.0, 10.0, 0.0, 20.0]).into();

        let bytes = to_bytes(
            &[("tr", &tr), ("All_output", &outputs), ("All_X_minus_target_data", &targets)],
            true,
        )
        .unwrap();
        let file = parse(&bytes).unwrap();

        assert_eq!(file.get("tr"), Some(&tr));
        assert_eq!(file.get("All_output"), Some(&outputs));
        assert_eq!(file.get("All_X_minus_target_data"), Some(&targets));
        assert!(file.description.starts_with("MATLAB 5.0 MAT-file"));
    }

    #[test]
    fn uncompressed_keeps_class_and_logical_flag() {
        let mask: MatValue = NumericArray {
            dims: vec![1, 3],
            data: vec![1.0, 0.0, 1.0],
            class: NumericClass::UInt8,
            logical: true,
        }
        .into();
        let counts: MatValue = NumericArray {
            dims: vec![2, 1],
            data: vec![-4.0, 7.0],
            class: NumericClass::Int32,
            logical: false,
        }
        .into();

        let file = parse(&to_bytes(&[("mask", &mask), ("counts", &counts)], false).unwrap()).unwrap();
        assert_eq!(file.get("mask"), Some(&mask));
        assert_eq!(file.get("counts"), Some(&counts));
        assert_eq!(file.names().collect::<Vec<_>>(), vec!["counts", "mask"]);
    }

    #[test]
    fn long_field_names_widen_the_name_table() {
        let long = "performance_goal_reached_at_epoch_count";
        let s: MatValue = StructArray::scalar(vec![
            (long, NumericArray::row_vector(&[12.0]).into()),
            ("empty", NumericArray::matrix(0, 0, Vec::new()).into()),
        ])
        .into();

        let file = parse(&to_bytes(&[("s", &s)], false).unwrap()).unwrap();
        let decoded = file.get("s").unwrap();
        assert_eq!(decoded.field(long).and_then(MatValue::as_numeric).map(|n| n.data.clone()), Some(vec![12.0]));
        assert!(decoded.field("empty").and_then(MatValue::as_numeric).unwrap().is_empty());
    }

    #[test]
    fn unsupported_values_are_not_encodable() {
        let v = MatValue::Unsupported { class: 17 };
        assert!(matches!(
            to_bytes(&[("h", &v)], false),
            Err(MatError::Unencodable(_))
        ));
    }

    #[test]
    fn write_file_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.mat");
        std::fs::write(&path, b"stale").unwrap();

        let v: MatValue = NumericArray::row_vector(&[3.0]).into();
        write_file(&path, &[("v", &v)], true).unwrap();

        let file = crate::data::mat::read_file(&path).unwrap();
        assert_eq!(file.get("v"), Some(&v));
    }
}
