//! In-memory multipart/form-data body assembly
//!
//! Upload parts carry their payload directly instead of a path on disk. The
//! body is built by hand so the exact bytes on the wire are predictable and
//! the `Content-Length` can be set up front.

use uuid::Uuid;

/// MIME type used when a part does not declare one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const BOUNDARY_PREFIX: &str = "files";
const EOL: &str = "\r\n";

/// A payload queued for the next upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    pub name: String,
    pub filename: String,
    pub metadata: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadPart {
    /// Declared MIME type, or the default when none or an empty one was given
    pub fn mime_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}

/// An assembled multipart body together with its boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    /// Build a body with a freshly generated boundary
    pub fn build(parts: &[UploadPart], fields: &[(&str, &str)]) -> Self {
        Self::with_boundary(generate_boundary(), parts, fields)
    }

    /// Build a body with a caller-chosen boundary.
    ///
    /// Every part, file or field, is opened by its own `--boundary` line.
    /// With nothing to send the body is just the opening and closing
    /// delimiters. Part names and filenames are written verbatim; field
    /// names go through [`sanitize_field_name`]. Payloads are never escaped.
    pub fn with_boundary(
        boundary: impl Into<String>,
        parts: &[UploadPart],
        fields: &[(&str, &str)],
    ) -> Self {
        let boundary = boundary.into();
        let delimiter = format!("--{}{}", boundary, EOL);
        let mut bytes = Vec::new();

        if parts.is_empty() && fields.is_empty() {
            bytes.extend_from_slice(delimiter.as_bytes());
        }

        for part in parts {
            bytes.extend_from_slice(delimiter.as_bytes());
            bytes.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{}",
                    part.name, part.filename, EOL
                )
                .as_bytes(),
            );
            bytes.extend_from_slice(
                format!("Content-Type: {}{}{}", part.mime_type(), EOL, EOL).as_bytes(),
            );
            bytes.extend_from_slice(&part.metadata);
            bytes.extend_from_slice(EOL.as_bytes());
        }

        for (name, value) in fields {
            bytes.extend_from_slice(delimiter.as_bytes());
            bytes.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"{}{}",
                    sanitize_field_name(name),
                    EOL,
                    EOL
                )
                .as_bytes(),
            );
            bytes.extend_from_slice(value.as_bytes());
            bytes.extend_from_slice(EOL.as_bytes());
        }

        bytes.extend_from_slice(format!("--{}--{}", boundary, EOL).as_bytes());

        Self { boundary, bytes }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` request header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Byte length, used verbatim as `Content-Length`
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Generate a boundary token that is unique per call.
///
/// The body is never scanned for collisions, so the token must be
/// unpredictable; a random v4 UUID provides 122 bits.
pub fn generate_boundary() -> String {
    format!("{}{}", BOUNDARY_PREFIX, Uuid::new_v4().simple())
}

/// Replace characters that would break a quoted `name="..."` attribute
pub fn sanitize_field_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\0' | '"' | '\r' | '\n' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{generate_boundary, sanitize_field_name, MultipartBody, UploadPart};

    fn part(name: &str, filename: &str, metadata: &str, mime_type: Option<&str>) -> UploadPart {
        UploadPart {
            name: name.to_string(),
            filename: filename.to_string(),
            metadata: metadata.as_bytes().to_vec(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    fn body_text(body: &MultipartBody) -> String {
        String::from_utf8(body.as_bytes().to_vec()).expect("utf-8 body")
    }

    #[test]
    fn single_file_and_field_layout() {
        let body = MultipartBody::with_boundary(
            "B",
            &[part("f", "a.txt", "hello", None)],
            &[("x", "1")],
        );
        assert_eq!(
            body_text(&body),
            "--B\r\nContent-Disposition: form-data; name=\"f\"; filename=\"a.txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\nhello\r\n\
             --B\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\n1\r\n--B--\r\n"
        );
    }

    #[test]
    fn empty_body_is_preamble_and_terminator() {
        let body = MultipartBody::with_boundary("B", &[], &[]);
        assert_eq!(body_text(&body), "--B\r\n--B--\r\n");
    }

    #[test]
    fn every_file_part_gets_a_delimiter() {
        let body = MultipartBody::with_boundary(
            "B",
            &[
                part("a", "a.bin", "1", None),
                part("b", "b.json", "{}", Some("application/json")),
            ],
            &[],
        );
        let text = body_text(&body);
        assert_eq!(text.matches("--B\r\n").count(), 2);
        assert!(text.contains("filename=\"b.json\"\r\nContent-Type: application/json\r\n\r\n{}\r\n"));
        assert!(text.ends_with("--B--\r\n"));
    }

    #[test]
    fn fields_only_body_opens_with_one_delimiter() {
        let body = MultipartBody::with_boundary("B", &[], &[("x", "1"), ("y", "2")]);
        assert_eq!(
            body_text(&body),
            "--B\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\n1\r\n\
             --B\r\nContent-Disposition: form-data; name=\"y\"\r\n\r\n2\r\n--B--\r\n"
        );
    }

    #[test]
    fn empty_mime_type_falls_back_to_default() {
        let body = MultipartBody::with_boundary("B", &[part("a", "a", "1", Some(""))], &[]);
        assert_eq!(
            body_text(&body),
            "--B\r\nContent-Disposition: form-data; name=\"a\"; filename=\"a\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n1\r\n--B--\r\n"
        );
    }

    #[test]
    fn field_names_are_sanitized_but_values_are_not() {
        let body = MultipartBody::with_boundary("B", &[], &[("a\"b\r\nc\0d", "x\"y\r\n")]);
        let text = body_text(&body);
        assert!(text.contains("name=\"a_b__c_d\"\r\n\r\nx\"y\r\n\r\n"));
    }

    #[test]
    fn part_names_are_written_verbatim() {
        let body = MultipartBody::with_boundary("B", &[part("we\"ird", "f\".txt", "", None)], &[]);
        assert!(body_text(&body).contains("name=\"we\"ird\"; filename=\"f\".txt\""));
    }

    #[test]
    fn binary_metadata_is_preserved() {
        let mut upload = part("bin", "blob", "", None);
        upload.metadata = vec![0x00, 0xff, 0x10];
        let body = MultipartBody::with_boundary("B", &[upload], &[]);
        let needle = [b"\r\n\r\n".as_slice(), &[0x00, 0xff, 0x10], b"\r\n--B--\r\n"].concat();
        assert!(body.as_bytes().ends_with(&needle));
    }

    #[test]
    fn length_matches_bytes_and_content_type_names_boundary() {
        let body = MultipartBody::build(&[part("f", "a.txt", "héllo", None)], &[("k", "vé")]);
        assert_eq!(body.len(), body.as_bytes().len());
        assert_eq!(
            body.content_type(),
            format!("multipart/form-data; boundary={}", body.boundary())
        );
        assert!(body_text(&body).starts_with(&format!("--{}", body.boundary())));
        assert!(body_text(&body).ends_with(&format!("--{}--\r\n", body.boundary())));
    }

    #[test]
    fn boundaries_are_unique() {
        let first = generate_boundary();
        let second = generate_boundary();
        assert!(first.starts_with("files"));
        assert_ne!(first, second);
    }

    #[test]
    fn sanitize_leaves_clean_names_alone() {
        assert_eq!(sanitize_field_name("user[name]"), "user[name]");
        assert_eq!(sanitize_field_name("\n"), "_");
    }
}
