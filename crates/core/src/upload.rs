//! Document upload constraints.
//!
//! Identity and health-insurance documents are accepted as PDF, JPEG or PNG up to
//! 5 MiB. The media type is sniffed from the content where `infer` recognises it and
//! falls back to the type the client declared.

use crate::constants::{ACCEPTED_MEDIA_TYPES, MAX_UPLOAD_BYTES};
use crate::value::FileRef;
use sha2::{Digest, Sha256};

pub const TOO_LARGE_MESSAGE: &str = "El archivo no debe superar los 5MB";
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Formato no válido. Use PDF, JPG o PNG";

/// A file as received from the front end.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    /// Media type reported by the client, if any.
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, declared_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            declared_type: declared_type.map(str::to_string),
            bytes,
        }
    }

    /// Best-effort media type: sniffed from content, else the declared type.
    pub fn media_type(&self) -> Option<String> {
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type().to_string())
            .or_else(|| self.declared_type.clone())
    }
}

/// Checks size and media type, returning the reference to store on success.
///
/// Size is checked first, so an oversized file of the wrong type reports the size limit.
pub fn check_upload(upload: &Upload) -> Result<FileRef, &'static str> {
    let size_bytes = upload.bytes.len() as u64;
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(TOO_LARGE_MESSAGE);
    }

    let media_type = upload
        .media_type()
        .filter(|t| ACCEPTED_MEDIA_TYPES.contains(&t.as_str()))
        .ok_or(UNSUPPORTED_TYPE_MESSAGE)?;

    let digest = Sha256::digest(&upload.bytes);

    Ok(FileRef {
        file_name: upload.file_name.clone(),
        media_type,
        size_bytes,
        sha256: hex::encode(digest),
    })
}

#[cfg(test)]
pub(crate) fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(len.max(bytes.len()), b' ');
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_small_pdf() {
        let upload = Upload::new("registro.pdf", Some("application/pdf"), pdf_bytes(1024));
        let file = check_upload(&upload).unwrap();
        assert_eq!(file.media_type, "application/pdf");
        assert_eq!(file.size_bytes, 1024);
        assert_eq!(file.sha256.len(), 64);
    }

    #[test]
    fn test_rejects_six_megabyte_pdf() {
        let upload = Upload::new("big.pdf", Some("application/pdf"), pdf_bytes(6 * 1024 * 1024));
        assert_eq!(check_upload(&upload), Err(TOO_LARGE_MESSAGE));
    }

    #[test]
    fn test_exactly_five_megabytes_is_accepted() {
        let upload = Upload::new("edge.pdf", None, pdf_bytes(5 * 1024 * 1024));
        assert!(check_upload(&upload).is_ok());
    }

    #[test]
    fn test_sniffed_png_wins_over_declared_type() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let upload = Upload::new("foto", Some("text/plain"), png_header);
        assert_eq!(check_upload(&upload).unwrap().media_type, "image/png");
    }

    #[test]
    fn test_rejects_unknown_content_without_accepted_declaration() {
        let upload = Upload::new("notes.txt", Some("text/plain"), b"hola".to_vec());
        assert_eq!(check_upload(&upload), Err(UNSUPPORTED_TYPE_MESSAGE));

        let undeclared = Upload::new("blob", None, b"hola".to_vec());
        assert_eq!(check_upload(&undeclared), Err(UNSUPPORTED_TYPE_MESSAGE));
    }

    #[test]
    fn test_declared_jpg_alias_is_accepted() {
        let upload = Upload::new("doc.jpg", Some("image/jpg"), b"not really sniffable".to_vec());
        assert_eq!(check_upload(&upload).unwrap().media_type, "image/jpg");
    }
}
