//! Container detection from leading bytes

/// Physical container of a document, as told by its magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// `%PDF`
    Pdf,
    /// ZIP archive (`PK\x03\x04`), the OOXML package format
    Zip,
    /// OLE2 compound file (`D0 CF 11 E0 A1 B1 1A E1`), used by Word 97-2003
    Ole,
    /// Anything else
    Unknown,
}

const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Readers accept a PDF header anywhere in the first kilobyte
const PDF_HEADER_WINDOW: usize = 1024;

/// Detect the container from magic bytes (never from the file extension)
pub fn sniff(bytes: &[u8]) -> Container {
    match bytes {
        [0x25, 0x50, 0x44, 0x46, ..] => Container::Pdf,
        [0x50, 0x4B, 0x03, 0x04, ..] => Container::Zip,
        _ if bytes.starts_with(&OLE_MAGIC) => Container::Ole,
        _ => {
            let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
            if window.windows(5).any(|w| w == b"%PDF-") {
                Container::Pdf
            } else {
                Container::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_containers() {
        assert_eq!(sniff(b"%PDF-1.7\n..."), Container::Pdf);
        assert_eq!(sniff(b"PK\x03\x04rest-of-zip"), Container::Zip);
        assert_eq!(sniff(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0]), Container::Ole);
    }

    #[test]
    fn test_sniff_pdf_after_leading_junk() {
        let mut bytes = vec![b' '; 12];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert_eq!(sniff(&bytes), Container::Pdf);
    }

    #[test]
    fn test_sniff_unknown() {
        assert_eq!(sniff(b""), Container::Unknown);
        assert_eq!(sniff(b"plain text contract"), Container::Unknown);
        assert_eq!(sniff(&[0xD0, 0xCF]), Container::Unknown);
    }
}
