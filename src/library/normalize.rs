//! Turning arbitrary metadata strings into path segments that are safe on
//! Linux, macOS and Windows filesystems.
//!
//! Only characters that are illegal somewhere are touched. Everything else,
//! including non-ASCII scripts, passes through unchanged.

/// Longest segment we produce, in characters.
pub const MAX_SEGMENT_CHARS: usize = 180;

/// Longest file name Linux and macOS accept, in UTF-8 bytes.
pub const MAX_NAME_BYTES: usize = 255;

pub const DEFAULT_REPLACEMENT: char = '_';

const RESERVED: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

const DEVICE_NAMES: [&str; 4] = ["CON", "PRN", "AUX", "NUL"];

/// Characters that may not appear in a file name on at least one supported platform.
pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// A replacement must not itself need replacing. `.` is out too: it would
/// turn `?x` into a hidden name and `con` into `con.`.
pub fn is_safe_replacement(c: char) -> bool {
    !(is_reserved(c) || c.is_control() || c.is_whitespace() || c == '.')
}

#[derive(Debug, Clone, Copy)]
pub struct PathNormalizer {
    replacement: char,
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self {
            replacement: DEFAULT_REPLACEMENT,
        }
    }
}

impl PathNormalizer {
    /// `replacement` must be a safe, visible character; anything else falls
    /// back to the default. `Settings::validate` rejects such values up front.
    pub fn new(replacement: char) -> Self {
        if !is_safe_replacement(replacement) {
            Self::default()
        } else {
            Self { replacement }
        }
    }

    pub fn normalize(&self, segment: &str) -> String {
        let mut out = String::with_capacity(segment.len());
        let mut pending_space = false;

        for c in segment.chars() {
            if c.is_whitespace() {
                pending_space = !out.is_empty();
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            if is_reserved(c) || c.is_control() {
                out.push(self.replacement);
            } else {
                out.push(c);
            }
        }

        let mut out = trim_tail(&out).to_string();

        // A leading dot would hide the entry from scans.
        if out.starts_with('.') {
            out.insert(0, self.replacement);
        }

        if is_device_name(&out) {
            let base_end = out.find('.').unwrap_or(out.len());
            out.insert(base_end, self.replacement);
        }

        fit_name(&out, MAX_NAME_BYTES)
    }
}

/// Normalize with the default replacement character.
pub fn normalize(segment: &str) -> String {
    PathNormalizer::default().normalize(segment)
}

/// Cut `segment` to at most [`MAX_SEGMENT_CHARS`] characters and `max_bytes`
/// UTF-8 bytes, on a character boundary, then trim the tail again.
pub fn fit_name(segment: &str, max_bytes: usize) -> String {
    let mut end = 0;
    for (count, (i, c)) in segment.char_indices().enumerate() {
        if count == MAX_SEGMENT_CHARS || i + c.len_utf8() > max_bytes {
            break;
        }
        end = i + c.len_utf8();
    }
    if end == segment.len() {
        return segment.to_string();
    }
    trim_tail(&segment[..end]).to_string()
}

fn trim_tail(s: &str) -> &str {
    s.trim_end_matches(|c: char| c == '.' || c.is_whitespace())
}

fn is_device_name(segment: &str) -> bool {
    let base = segment.split('.').next().unwrap_or(segment).trim_end();
    let upper = base.to_ascii_uppercase();
    if DEVICE_NAMES.contains(&upper.as_str()) {
        return true;
    }
    match upper.as_bytes() {
        [b'C', b'O', b'M', d] | [b'L', b'P', b'T', d] => (b'1'..=b'9').contains(d),
        _ => false,
    }
}
