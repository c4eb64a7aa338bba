pub const FIELD_NAME: &str = "file";
pub const FILE_NAME: &str = "image.jpg";
pub const FILE_CONTENT_TYPE: &str = "image/jpeg";

/// Fresh boundary token for one request.
pub fn new_boundary() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

/// Builds a single-part `multipart/form-data` body carrying `image` as the
/// `file` field. The image bytes are copied verbatim between the part headers
/// and the closing delimiter.
pub fn encode(image: &[u8], boundary: &str) -> Vec<u8> {
    let head = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{FIELD_NAME}\"; filename=\"{FILE_NAME}\"\r\n\
         Content-Type: {FILE_CONTENT_TYPE}\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--\r\n");

    let mut body = Vec::with_capacity(head.len() + image.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(image);
    body.extend_from_slice(tail.as_bytes());
    body
}
