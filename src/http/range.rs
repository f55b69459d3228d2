//! HTTP Range request parsing module
//!
//! Single `bytes=` range parsing for partial responses, compliant with RFC 7233.

/// A resolved, inclusive byte range within a body of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` header value for a body of `total` bytes
    pub fn content_range(&self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Serve only this range (206)
    Satisfiable(ByteRange),
    /// No byte of the body is selected (416)
    NotSatisfiable,
    /// No Range header, multi-range, or malformed: serve the whole body
    Ignored,
}

/// Parse an HTTP Range header against a body of `size` bytes
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Examples
/// ```
/// use txtfile_viewer::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeParseResult::Satisfiable(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::Ignored);
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::Ignored;
    };

    // Multi-range responses are not produced
    if spec.contains(',') {
        return RangeParseResult::Ignored;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::Ignored;
    };
    let (first, last) = (first.trim(), last.trim());

    if size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    if first.is_empty() {
        return suffix_range(last, size);
    }

    let Ok(start) = first.parse::<usize>() else {
        return RangeParseResult::Ignored;
    };
    if start >= size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if last.is_empty() {
        size - 1
    } else {
        let Ok(end) = last.parse::<usize>() else {
            return RangeParseResult::Ignored;
        };
        if end < start {
            return RangeParseResult::Ignored;
        }
        end.min(size - 1)
    };

    RangeParseResult::Satisfiable(ByteRange { start, end })
}

/// `-N`: the final N bytes, clamped to the whole body
fn suffix_range(suffix: &str, size: usize) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<usize>() else {
        return RangeParseResult::Ignored;
    };
    if suffix == 0 {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Satisfiable(ByteRange {
        start: size.saturating_sub(suffix),
        end: size - 1,
    })
}
