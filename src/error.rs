use thiserror::Error;

/// Failures while decoding or encoding a Level-5 MAT file.
#[derive(Debug, Error)]
pub enum MatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid MAT header: {0}")]
    BadHeader(String),

    #[error("Truncated data element at byte {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unknown data element type {0}")]
    UnknownDataType(u32),

    #[error("Malformed matrix '{name}': {reason}")]
    Malformed { name: String, reason: String },

    #[error("Cannot encode {0} values")]
    Unencodable(&'static str),
}

/// Failures while pulling the test split out of a decoded result bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Variable '{0}' not found in result bundle")]
    MissingVariable(String),

    #[error("Field '{field}' not found in '{variable}'")]
    MissingField { variable: String, field: String },

    #[error("'{0}' is not a numeric array")]
    NotNumeric(String),

    #[error("Test index {value} is not a positive integer")]
    InvalidIndex { value: f64 },

    #[error("Test index {index} is out of range for '{what}' with {len} samples")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Failures while drawing or encoding a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),

    #[error("Pixel buffer of {len} bytes does not fit a {width}x{height} image")]
    Buffer { len: usize, width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
