//! MATLAB Level-5 MAT files.
//!
//! Only the parts of the format that training result bundles use are
//! decoded in full: numeric arrays, char arrays, cells and structs.
//! Anything else is kept as [`MatValue::Unsupported`] so the remaining
//! variables of a file still load.

pub mod reader;
pub mod writer;

use std::collections::BTreeMap;

pub use reader::{parse, read_file};
pub use writer::{to_bytes, write_file};

// ---------------------------------------------------------------------------
// Element and class identifiers
// ---------------------------------------------------------------------------

pub(crate) const MI_INT8: u32 = 1;
pub(crate) const MI_UINT8: u32 = 2;
pub(crate) const MI_INT16: u32 = 3;
pub(crate) const MI_UINT16: u32 = 4;
pub(crate) const MI_INT32: u32 = 5;
pub(crate) const MI_UINT32: u32 = 6;
pub(crate) const MI_SINGLE: u32 = 7;
pub(crate) const MI_DOUBLE: u32 = 9;
pub(crate) const MI_INT64: u32 = 12;
pub(crate) const MI_UINT64: u32 = 13;
pub(crate) const MI_MATRIX: u32 = 14;
pub(crate) const MI_COMPRESSED: u32 = 15;
pub(crate) const MI_UTF8: u32 = 16;
pub(crate) const MI_UTF16: u32 = 17;
pub(crate) const MI_UTF32: u32 = 18;

pub(crate) const MX_CELL: u8 = 1;
pub(crate) const MX_STRUCT: u8 = 2;
pub(crate) const MX_OBJECT: u8 = 3;
pub(crate) const MX_CHAR: u8 = 4;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;
pub(crate) const FLAG_LOGICAL: u32 = 0x0200;

/// Storage class of a numeric array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericClass {
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl NumericClass {
    pub(crate) fn from_class_id(id: u8) -> Option<Self> {
        Some(match id {
            6 => NumericClass::Double,
            7 => NumericClass::Single,
            8 => NumericClass::Int8,
            9 => NumericClass::UInt8,
            10 => NumericClass::Int16,
            11 => NumericClass::UInt16,
            12 => NumericClass::Int32,
            13 => NumericClass::UInt32,
            14 => NumericClass::Int64,
            15 => NumericClass::UInt64,
            _ => return None,
        })
    }

    pub(crate) fn class_id(self) -> u8 {
        match self {
            NumericClass::Double => 6,
            NumericClass::Single => 7,
            NumericClass::Int8 => 8,
            NumericClass::UInt8 => 9,
            NumericClass::Int16 => 10,
            NumericClass::UInt16 => 11,
            NumericClass::Int32 => 12,
            NumericClass::UInt32 => 13,
            NumericClass::Int64 => 14,
            NumericClass::UInt64 => 15,
        }
    }
}

// ---------------------------------------------------------------------------
// NumericArray
// ---------------------------------------------------------------------------

/// A real numeric array. `data` is column-major, like MATLAB stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub dims: Vec<usize>,
    pub data: Vec<f64>,
    pub class: NumericClass,
    pub logical: bool,
}

impl NumericArray {
    /// A 2-D double matrix from column-major data.
    pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        NumericArray {
            dims: vec![rows, cols],
            data,
            class: NumericClass::Double,
            logical: false,
        }
    }

    /// A `1×N` double row vector.
    pub fn row_vector(values: &[f64]) -> Self {
        Self::matrix(1, values.len(), values.to_vec())
    }

    /// An `N×1` double column vector.
    pub fn column_vector(values: &[f64]) -> Self {
        Self::matrix(values.len(), 1, values.to_vec())
    }

    /// Size of the first dimension.
    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    /// Product of every dimension after the first.
    pub fn cols(&self) -> usize {
        if self.dims.len() < 2 {
            return usize::from(!self.dims.is_empty());
        }
        self.dims[1..].iter().product()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether at most one dimension is larger than one.
    pub fn is_vector(&self) -> bool {
        self.dims.iter().filter(|&&d| d > 1).count() <= 1
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.data.get(col * self.rows() + row).copied()
    }

    /// The first row of a matrix; the whole sequence for a vector.
    pub fn first_row(&self) -> Vec<f64> {
        if self.is_vector() {
            return self.data.clone();
        }
        (0..self.cols()).filter_map(|c| self.get(0, c)).collect()
    }
}

// ---------------------------------------------------------------------------
// StructArray
// ---------------------------------------------------------------------------

/// A struct (or object) array. `values` holds `field_names.len()` entries
/// per element, elements in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    pub dims: Vec<usize>,
    pub class_name: Option<String>,
    pub field_names: Vec<String>,
    pub values: Vec<MatValue>,
}

impl StructArray {
    /// A `1×1` struct with the given fields in order.
    pub fn scalar(fields: Vec<(&str, MatValue)>) -> Self {
        let (names, values): (Vec<_>, Vec<_>) = fields
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .unzip();
        StructArray {
            dims: vec![1, 1],
            class_name: None,
            field_names: names,
            values,
        }
    }

    /// Number of struct elements.
    pub fn len(&self) -> usize {
        if self.field_names.is_empty() {
            self.dims.iter().product()
        } else {
            self.values.len() / self.field_names.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field `name` of element `index`.
    pub fn get(&self, index: usize, name: &str) -> Option<&MatValue> {
        let field = self.field_names.iter().position(|f| f == name)?;
        self.values.get(index * self.field_names.len() + field)
    }
}

// ---------------------------------------------------------------------------
// MatValue
// ---------------------------------------------------------------------------

/// The decoded value of one MAT variable.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    Numeric(NumericArray),
    Char { dims: Vec<usize>, text: String },
    Cell { dims: Vec<usize>, items: Vec<MatValue> },
    Struct(StructArray),
    /// A class this reader does not decode (sparse, function handle, opaque…).
    Unsupported { class: u8 },
}

impl MatValue {
    /// Wrap a value in a `1×1` cell.
    pub fn singleton_cell(value: MatValue) -> Self {
        MatValue::Cell {
            dims: vec![1, 1],
            items: vec![value],
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            MatValue::Numeric(_) => "numeric",
            MatValue::Char { .. } => "char",
            MatValue::Cell { .. } => "cell",
            MatValue::Struct(_) => "struct",
            MatValue::Unsupported { .. } => "unsupported",
        }
    }

    /// Descend through cells to their first element (column-major), the way
    /// `value[0][0]` does on a loaded object array. Empty cells stay as is.
    pub fn peel(&self) -> &MatValue {
        let mut current = self;
        while let MatValue::Cell { items, .. } = current {
            match items.first() {
                Some(first) => current = first,
                None => break,
            }
        }
        current
    }

    /// Field `name` of the first struct element, looking through cells.
    pub fn field(&self, name: &str) -> Option<&MatValue> {
        match self.peel() {
            MatValue::Struct(s) => s.get(0, name),
            _ => None,
        }
    }

    /// The numeric array behind this value, looking through cells.
    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self.peel() {
            MatValue::Numeric(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.peel() {
            MatValue::Char { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl From<NumericArray> for MatValue {
    fn from(n: NumericArray) -> Self {
        MatValue::Numeric(n)
    }
}

impl From<StructArray> for MatValue {
    fn from(s: StructArray) -> Self {
        MatValue::Struct(s)
    }
}

impl From<&str> for MatValue {
    fn from(s: &str) -> Self {
        MatValue::Char {
            dims: vec![1, s.encode_utf16().count()],
            text: s.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// MatFile
// ---------------------------------------------------------------------------

/// All variables of a MAT file, by name.
#[derive(Debug, Clone, Default)]
pub struct MatFile {
    /// Text of the 116-byte descriptive header.
    pub description: String,
    pub variables: BTreeMap<String, MatValue>,
}

impl MatFile {
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peel_strips_nested_singleton_cells() {
        let inner = MatValue::from(NumericArray::row_vector(&[1.0, 2.0]));
        let wrapped = MatValue::singleton_cell(MatValue::singleton_cell(inner.clone()));
        assert_eq!(wrapped.peel(), &inner);
    }

    #[test]
    fn peel_takes_first_element_of_multi_element_cell() {
        let cell = MatValue::Cell {
            dims: vec![1, 2],
            items: vec![MatValue::from("a"), MatValue::from("b")],
        };
        assert_eq!(cell.peel().as_str(), Some("a"));
    }

    #[test]
    fn peel_stops_at_empty_cell() {
        let cell = MatValue::Cell {
            dims: vec![0, 0],
            items: Vec::new(),
        };
        assert_eq!(cell.peel().kind(), "cell");
        assert!(cell.as_numeric().is_none());
    }

    #[test]
    fn field_looks_through_cells() {
        let tr = StructArray::scalar(vec![
            ("trainFcn", MatValue::from("trainlm")),
            ("testInd", NumericArray::row_vector(&[2.0, 4.0]).into()),
        ]);
        let value = MatValue::singleton_cell(tr.into());
        let ind = value.field("testInd").and_then(MatValue::as_numeric).unwrap();
        assert_eq!(ind.data, vec![2.0, 4.0]);
        assert_eq!(value.field("trainFcn").and_then(MatValue::as_str), Some("trainlm"));
        assert!(value.field("valInd").is_none());
    }

    #[test]
    fn first_row_of_matrix_and_vector() {
        // 2x3, column-major: [[1, 3, 5], [2, 4, 6]]
        let m = NumericArray::matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.first_row(), vec![1.0, 3.0, 5.0]);
        assert_eq!(m.get(1, 2), Some(6.0));
        assert_eq!(m.get(2, 0), None);

        let col = NumericArray::column_vector(&[7.0, 8.0, 9.0]);
        assert!(col.is_vector());
        assert_eq!(col.first_row(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn struct_array_element_lookup() {
        let s = StructArray {
            dims: vec![1, 2],
            class_name: None,
            field_names: vec!["a".into(), "b".into()],
            values: vec![
                MatValue::from("a0"),
                MatValue::from("b0"),
                MatValue::from("a1"),
                MatValue::from("b1"),
            ],
        };
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(1, "a").and_then(MatValue::as_str), Some("a1"));
        assert_eq!(s.get(0, "b").and_then(MatValue::as_str), Some("b0"));
    }
}
