//! Byte-level helpers for the minimal HTTP/1.1 handling done by the server.
//!
//! Requests are never fully parsed: the handler only needs the request method, the
//! value of the `Content-Length` header and the body that follows the header
//! block. Field names are matched case-insensitively at the start of a header line.

use crate::error::BodyError;

pub const NEWLINE: u8 = b'\n';
pub const CR: u8 = b'\r';
pub const SPACE: u8 = b' ';

pub const CONTENT_LENGTH: &[u8] = b"Content-Length";
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
pub const GET_REQUEST: &[u8] = b"GET";
pub const POST_REQUEST: &[u8] = b"POST";

/// Upper bound on the request line plus headers, terminator included.
pub const MAX_HEADER_SIZE: usize = 8192;
/// Upper bound on an accepted `Content-Length`.
pub const MAX_BODY_SIZE: u64 = 8192;
/// Upper bound on bytes buffered for a single request.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_REQUEST_SIZE: usize = MAX_HEADER_SIZE + MAX_BODY_SIZE as usize;

const HASH_BASE: u64 = 31;
const HASH_MODULUS: u64 = 1_000_000_009;

/// Index of the first occurrence of `pattern` in `buffer`.
///
/// Rabin-Karp over a rolling polynomial hash; candidate windows are confirmed
/// byte-for-byte so a hash collision never yields a false match.
#[must_use]
pub fn find_in_buffer(buffer: &[u8], pattern: &[u8]) -> Option<usize> {
    let m = pattern.len();
    let n = buffer.len();
    if m == 0 {
        return Some(0);
    }
    if m > n {
        return None;
    }

    // HASH_BASE^(m-1), used to drop the leading byte of the window.
    let mut lead = 1;
    for _ in 1..m {
        lead = lead * HASH_BASE % HASH_MODULUS;
    }

    let hash = |bytes: &[u8]| {
        bytes
            .iter()
            .fold(0, |acc, &b| (acc * HASH_BASE + u64::from(b)) % HASH_MODULUS)
    };
    let target = hash(pattern);
    let mut window = hash(&buffer[..m]);

    for start in 0..=n - m {
        if window == target && &buffer[start..start + m] == pattern {
            return Some(start);
        }
        if start + m < n {
            let dropped = u64::from(buffer[start]) * lead % HASH_MODULUS;
            window = (window + HASH_MODULUS - dropped) % HASH_MODULUS;
            window = (window * HASH_BASE + u64::from(buffer[start + m])) % HASH_MODULUS;
        }
    }
    None
}

/// Parse the decimal number at the start of `buffer`, stopping at CR, LF or the end.
#[must_use]
pub fn extract_number(buffer: &[u8]) -> Option<u64> {
    let end = buffer
        .iter()
        .position(|&b| b == CR || b == NEWLINE)
        .unwrap_or(buffer.len());
    let digits = &buffer[..end];
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}

fn header_end(buffer: &[u8]) -> Option<usize> {
    find_in_buffer(buffer, HEADER_TERMINATOR).map(|idx| idx + HEADER_TERMINATOR.len())
}

/// Value of the first header line named `name`, ignoring ASCII case and
/// surrounding whitespace. The request line is skipped.
#[must_use]
pub fn header_value<'a>(headers: &'a [u8], name: &[u8]) -> Option<&'a [u8]> {
    headers
        .split(|&b| b == NEWLINE)
        .skip(1)
        .map(|line| line.strip_suffix(&[CR]).unwrap_or(line))
        .take_while(|line| !line.is_empty())
        .find_map(|line| {
            let colon = line.iter().position(|&b| b == b':')?;
            line[..colon]
                .eq_ignore_ascii_case(name)
                .then(|| line[colon + 1..].trim_ascii())
        })
}

fn content_length(headers: &[u8]) -> Result<u64, BodyError> {
    let value = header_value(headers, CONTENT_LENGTH).ok_or(BodyError::MissingLength)?;
    let length = extract_number(value).ok_or(BodyError::InvalidLength)?;
    if length > MAX_BODY_SIZE {
        return Err(BodyError::TooLarge(length));
    }
    Ok(length)
}

/// The request body announced by `Content-Length`.
///
/// # Errors
/// See [`BodyError`]. `MissingLength` is the expected outcome for body-less requests.
pub fn request_body(buffer: &[u8]) -> Result<&[u8], BodyError> {
    let start = header_end(buffer).ok_or(BodyError::NoHeaderEnd)?;
    let expected = usize::try_from(content_length(&buffer[..start])?)
        .map_err(|_| BodyError::InvalidLength)?;
    let received = buffer.len() - start;
    if received < expected {
        return Err(BodyError::Incomplete { expected, received });
    }
    Ok(&buffer[start..start + expected])
}

/// Whether reading can stop: `buffer` holds the header block plus any declared
/// body, or the headers have outgrown `MAX_HEADER_SIZE` without terminating.
#[must_use]
pub fn request_complete(buffer: &[u8]) -> bool {
    let Some(start) = header_end(buffer) else {
        return buffer.len() >= MAX_HEADER_SIZE;
    };
    match content_length(&buffer[..start]) {
        Ok(len) => (buffer.len() - start) as u64 >= len,
        Err(_) => true,
    }
}

/// Request method, as far as the server distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    #[must_use]
    pub fn parse(buffer: &[u8]) -> Self {
        let token = buffer.split(|&b| b == SPACE).next().unwrap_or_default();
        if token == GET_REQUEST {
            Self::Get
        } else if token == POST_REQUEST {
            Self::Post
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Other => "OTHER",
        }
    }
}

/// Response status; the discriminant is the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 200,
    NoContent = 204,
    NotModified = 304,
    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,
    ImATeapot = 418,
}

impl Status {
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NoContent => "No Content",
            Self::NotModified => "Not Modified",
            Self::BadRequest => "Bad Request",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::ImATeapot => "I'm a teapot",
        }
    }
}

/// A complete response with a plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn empty(status: Status) -> Self {
        Self::new(status, String::new())
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: {}\r\n\r\n{}",
            self.status.code(),
            self.status.reason(),
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}
