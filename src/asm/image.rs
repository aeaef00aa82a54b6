//! Program image format for LS-8 programs.
//!
//! An image is a plain text file with one instruction-or-operand byte
//! per line:
//! - Each line holds a base-2 literal (e.g. `10000010`)
//! - Anything after `#` is a comment
//! - Blank lines and comment-only lines are ignored
//!
//! Bytes load into memory starting at address 0 in file order.

use std::path::Path;
use thiserror::Error;

/// A loaded program image.
#[derive(Debug, Clone)]
pub struct ProgramImage {
    /// The program bytes.
    pub bytes: Vec<u8>,
    /// Original source lines (for debugging).
    pub source_lines: Vec<String>,
}

impl ProgramImage {
    /// Create a new empty image.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            source_lines: Vec::new(),
        }
    }

    /// Add a byte.
    pub fn push(&mut self, byte: u8, source: &str) {
        self.bytes.push(byte);
        self.source_lines.push(source.to_string());
    }

    /// Get the number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for ProgramImage {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse image text into program bytes.
///
/// This is the loader contract: the caller hands the resulting bytes to
/// the machine, which assumes they are already valid.
pub fn parse_image(source: &str) -> Result<ProgramImage, ImageError> {
    let mut image = ProgramImage::new();

    for (line_num, line) in source.lines().enumerate() {
        // Everything after '#' is a comment
        let token = line.split('#').next().unwrap_or("").trim();

        if token.is_empty() {
            continue;
        }

        let byte = u8::from_str_radix(token, 2).map_err(|_| ImageError::Parse {
            line: line_num + 1,
            message: format!("`{}` is not a binary byte literal", token),
        })?;

        image.push(byte, line.trim());
    }

    Ok(image)
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImageError::Io(e.to_string()))?;
    parse_image(&source)
}

/// Save an image file to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ProgramImage) -> Result<(), ImageError> {
    use std::io::Write;

    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ImageError::Io(e.to_string()))?;

    writeln!(file, "# LS-8 program image").map_err(|e| ImageError::Io(e.to_string()))?;
    writeln!(file, "# {} bytes", image.len()).map_err(|e| ImageError::Io(e.to_string()))?;
    writeln!(file).map_err(|e| ImageError::Io(e.to_string()))?;

    for (addr, byte) in image.bytes.iter().enumerate() {
        writeln!(file, "{:08b} # {:02}", byte, addr)
            .map_err(|e| ImageError::Io(e.to_string()))?;
    }

    Ok(())
}

/// Errors that can occur while loading or saving an image.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed program on line {line}: {message}")]
    Parse { line: usize, message: String },
}
