//! PDF header sniffing used to pick batch inputs.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Bytes read from the start of a file when sniffing.
const HEADER_LEN: usize = 16;

/// Header of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Read the header of a file on disk.
///
/// # Example
/// ```no_run
/// use pdfnote::detect::sniff_file;
///
/// let header = sniff_file("paper.pdf").unwrap();
/// println!("PDF version: {}", header.version);
/// ```
pub fn sniff_file<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    sniff_bytes(&header)
}

/// Read the header from the first bytes of a file.
///
/// # Returns
/// * `Err(Error::UnknownFormat)` if the data does not start with `%PDF-`
/// * `Err(Error::UnsupportedVersion)` if the version is not `d.d`
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    let Some(rest) = data.strip_prefix(PDF_MAGIC) else {
        return Err(Error::UnknownFormat);
    };
    let Some(version_bytes) = rest.get(..VERSION_LEN) else {
        return Err(Error::UnknownFormat);
    };

    let version = String::from_utf8_lossy(version_bytes).to_string();
    match version_bytes {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(PdfHeader { version })
        }
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

/// Check if a file starts with a PDF header.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    sniff_file(path).is_ok()
}

/// Check if a file name carries the `.pdf` extension, in any case.
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_valid_pdf() {
        let header = sniff_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_sniff_invalid_format() {
        assert!(matches!(
            sniff_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(sniff_bytes(b"%PDF-"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_bad_version() {
        assert!(matches!(
            sniff_bytes(b"%PDF-x.y"),
            Err(Error::UnsupportedVersion(v)) if v == "x.y"
        ));
    }

    #[test]
    fn test_is_pdf_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.PDF");
        let text = dir.path().join("b.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();
        std::fs::write(&text, b"hello").unwrap();

        assert!(is_pdf(&pdf));
        assert!(!is_pdf(&text));
        assert!(has_pdf_extension(&pdf));
        assert!(!has_pdf_extension(dir.path().join("c.txt")));
    }
}
