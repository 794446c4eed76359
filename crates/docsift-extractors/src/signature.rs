//! File signature sniffing.
//!
//! Loaders never pick a format by sniffing; the caller chooses the loader.
//! The signature only refines the internal rejection reason so that a PDF
//! handed to the DOCX loader is logged as the wrong format rather than as a
//! corrupted package.

use docsift_core::InvalidReason;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: &[u8] = b"PK\x05\x06";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Readers tolerate junk before the PDF header within the first kilobyte.
const PDF_HEADER_WINDOW: usize = 1024;

/// Container family recognised from the leading bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSignature {
    Empty,
    Pdf,
    Zip,
    /// OLE compound file: legacy Office binaries and password-protected
    /// OOXML packages.
    OleCompound,
    Unknown,
}

impl FileSignature {
    /// Classify a byte buffer.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return FileSignature::Empty;
        }
        if bytes.starts_with(ZIP_LOCAL_HEADER) || bytes.starts_with(ZIP_EMPTY_ARCHIVE) {
            return FileSignature::Zip;
        }
        if bytes.starts_with(OLE_MAGIC) {
            return FileSignature::OleCompound;
        }

        // Magic at offset 0 wins over a PDF header found further in.
        let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
        if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            FileSignature::Pdf
        } else {
            FileSignature::Unknown
        }
    }

    /// Rejection reason for an OOXML loader given this signature, when the
    /// signature alone decides it.
    pub fn ooxml_rejection(&self, bytes: &[u8]) -> Option<InvalidReason> {
        match self {
            FileSignature::Empty => Some(InvalidReason::EmptyFile),
            FileSignature::Pdf => Some(InvalidReason::WrongFormat),
            FileSignature::OleCompound if is_encrypted_package(bytes) => {
                Some(InvalidReason::PasswordProtected)
            }
            FileSignature::OleCompound => Some(InvalidReason::WrongFormat),
            FileSignature::Zip | FileSignature::Unknown => None,
        }
    }

    /// Rejection reason for the PDF loader given this signature.
    pub fn pdf_rejection(&self) -> Option<InvalidReason> {
        match self {
            FileSignature::Empty => Some(InvalidReason::EmptyFile),
            FileSignature::Zip | FileSignature::OleCompound => Some(InvalidReason::WrongFormat),
            FileSignature::Pdf | FileSignature::Unknown => None,
        }
    }
}

/// Office stores password-protected OOXML packages inside an OLE compound
/// file with an `EncryptedPackage` stream; the directory entry name is
/// UTF-16LE.
fn is_encrypted_package(bytes: &[u8]) -> bool {
    let needle: Vec<u8> = "EncryptedPackage"
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    bytes.windows(needle.len()).any(|w| w == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ole_with_stream(name: &str) -> Vec<u8> {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 56]);
        for unit in name.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_detect() {
        assert_eq!(FileSignature::detect(b""), FileSignature::Empty);
        assert_eq!(FileSignature::detect(b"%PDF-1.7\n"), FileSignature::Pdf);
        assert_eq!(FileSignature::detect(b"junk\n%PDF-1.4"), FileSignature::Pdf);
        assert_eq!(FileSignature::detect(b"PK\x03\x04rest"), FileSignature::Zip);
        assert_eq!(FileSignature::detect(OLE_MAGIC), FileSignature::OleCompound);
        assert_eq!(FileSignature::detect(b"hello world"), FileSignature::Unknown);
    }

    #[test]
    fn test_leading_magic_beats_embedded_pdf_header() {
        let zip = b"PK\x03\x04\x14\x00word/media/%PDF-1.7 stored attachment";
        assert_eq!(FileSignature::detect(zip), FileSignature::Zip);
        assert_eq!(
            FileSignature::detect(zip).pdf_rejection(),
            Some(InvalidReason::WrongFormat)
        );

        let mut ole = OLE_MAGIC.to_vec();
        ole.extend_from_slice(b"%PDF-1.4");
        assert_eq!(FileSignature::detect(&ole), FileSignature::OleCompound);
    }

    #[test]
    fn test_ooxml_rejection() {
        let encrypted = ole_with_stream("EncryptedPackage");
        let sig = FileSignature::detect(&encrypted);
        assert_eq!(
            sig.ooxml_rejection(&encrypted),
            Some(InvalidReason::PasswordProtected)
        );

        let legacy = ole_with_stream("WordDocument");
        assert_eq!(
            FileSignature::detect(&legacy).ooxml_rejection(&legacy),
            Some(InvalidReason::WrongFormat)
        );

        assert_eq!(
            FileSignature::Pdf.ooxml_rejection(b"%PDF-"),
            Some(InvalidReason::WrongFormat)
        );
        assert_eq!(FileSignature::Zip.ooxml_rejection(b"PK\x03\x04"), None);
    }

    #[test]
    fn test_pdf_rejection() {
        assert_eq!(FileSignature::Zip.pdf_rejection(), Some(InvalidReason::WrongFormat));
        assert_eq!(FileSignature::Empty.pdf_rejection(), Some(InvalidReason::EmptyFile));
        assert_eq!(FileSignature::Pdf.pdf_rejection(), None);
    }
}
