//! Conditional request module
//!
//! Evaluates RFC 7232 validators (`If-Match`, `If-Unmodified-Since`,
//! `If-None-Match`, `If-Modified-Since`, `If-Range`) against a resource's
//! strong `ETag` and modification time, and maintains the validator headers
//! on the response.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG,
    IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE, LAST_MODIFIED,
};
use hyper::Method;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Outcome of evaluating a single validator header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Header absent, unparsable, or not applicable
    Unset,
    Holds,
    Fails,
}

/// Combined decision for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve fresh content
    Proceed,
    /// `304 Not Modified`
    NotModified,
    /// `412 Precondition Failed`
    Failed,
}

/// Evaluate all validators for a resource with a strong `etag`.
///
/// Order follows RFC 7232 section 6: `If-Match` (else `If-Unmodified-Since`),
/// then `If-None-Match` (else `If-Modified-Since`).
pub fn evaluate(
    method: &Method,
    headers: &HeaderMap,
    etag: &str,
    modified: SystemTime,
) -> Precondition {
    let mut cond = check_if_match(headers, etag);
    if cond == Condition::Unset {
        cond = check_if_unmodified_since(headers, modified);
    }
    if cond == Condition::Fails {
        return Precondition::Failed;
    }

    match check_if_none_match(headers, etag) {
        Condition::Fails => {
            if is_safe(method) {
                Precondition::NotModified
            } else {
                Precondition::Failed
            }
        }
        Condition::Unset => {
            if check_if_modified_since(method, headers, modified) == Condition::Fails {
                Precondition::NotModified
            } else {
                Precondition::Proceed
            }
        }
        Condition::Holds => Precondition::Proceed,
    }
}

/// `If-None-Match`: fails when `*` is given or any listed tag strongly
/// matches `etag`
pub fn check_if_none_match(headers: &HeaderMap, etag: &str) -> Condition {
    let Some(value) = header_str(headers, &IF_NONE_MATCH) else {
        return Condition::Unset;
    };
    if any_tag_matches(value, etag) {
        Condition::Fails
    } else {
        Condition::Holds
    }
}

/// `If-Match`: holds when `*` is given or any listed tag strongly matches
pub fn check_if_match(headers: &HeaderMap, etag: &str) -> Condition {
    let Some(value) = header_str(headers, &IF_MATCH) else {
        return Condition::Unset;
    };
    if any_tag_matches(value, etag) {
        Condition::Holds
    } else {
        Condition::Fails
    }
}

/// `If-Modified-Since`: fails (not modified) when the truncated modification
/// time is not after the header date. Only GET and HEAD are considered.
pub fn check_if_modified_since(
    method: &Method,
    headers: &HeaderMap,
    modified: SystemTime,
) -> Condition {
    if !is_safe(method) || is_zero_time(modified) {
        return Condition::Unset;
    }
    let Some(since) = header_date(headers, &IF_MODIFIED_SINCE) else {
        return Condition::Unset;
    };
    if truncate_to_second(modified) <= since {
        Condition::Fails
    } else {
        Condition::Holds
    }
}

/// `If-Unmodified-Since`: holds when the truncated modification time is not
/// after the header date
pub fn check_if_unmodified_since(headers: &HeaderMap, modified: SystemTime) -> Condition {
    if is_zero_time(modified) {
        return Condition::Unset;
    }
    let Some(since) = header_date(headers, &IF_UNMODIFIED_SINCE) else {
        return Condition::Unset;
    };
    if truncate_to_second(modified) <= since {
        Condition::Holds
    } else {
        Condition::Fails
    }
}

/// `If-Range`: holds when the validator still identifies the current
/// representation, in which case a `Range` header may be honored
pub fn check_if_range(
    method: &Method,
    headers: &HeaderMap,
    etag: Option<&str>,
    modified: SystemTime,
) -> Condition {
    if !is_safe(method) {
        return Condition::Unset;
    }
    let Some(value) = header_str(headers, &IF_RANGE) else {
        return Condition::Unset;
    };

    if let Some((tag, _)) = scan_etag(value) {
        return if etag.is_some_and(|current| etag_strong_match(tag, current)) {
            Condition::Holds
        } else {
            Condition::Fails
        };
    }

    if is_zero_time(modified) {
        return Condition::Fails;
    }
    match httpdate::parse_http_date(value) {
        Ok(date) if date == truncate_to_second(modified) => Condition::Holds,
        _ => Condition::Fails,
    }
}

/// Turn `headers` into those of a `304 Not Modified` response.
///
/// Representation metadata is removed. `Last-Modified` is kept only when no
/// `ETag` is present to guide cache updates (RFC 7232 section 4.1).
pub fn write_not_modified(headers: &mut HeaderMap) {
    headers.remove(CONTENT_TYPE);
    headers.remove(CONTENT_LENGTH);
    headers.remove(CONTENT_ENCODING);
    if headers.contains_key(ETAG) {
        headers.remove(LAST_MODIFIED);
    }
}

/// Set `ETag` to an already quoted strong tag
pub fn set_etag(headers: &mut HeaderMap, etag: &str) {
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert(ETAG, value);
    }
}

/// Set `Last-Modified` unless the time is unknown
pub fn set_last_modified(headers: &mut HeaderMap, modified: SystemTime) {
    if is_zero_time(modified) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
        headers.insert(LAST_MODIFIED, value);
    }
}

/// Times at or before the Unix epoch are treated as unknown
pub fn is_zero_time(time: SystemTime) -> bool {
    time <= UNIX_EPOCH
}

/// Drop sub-second precision, which HTTP dates cannot carry
pub fn truncate_to_second(time: SystemTime) -> SystemTime {
    time.duration_since(UNIX_EPOCH)
        .map_or(time, |d| UNIX_EPOCH + Duration::from_secs(d.as_secs()))
}

/// Strong comparison: byte-equal and neither tag weak
pub fn etag_strong_match(a: &str, b: &str) -> bool {
    a == b && a.starts_with('"')
}

/// Find a syntactically valid entity-tag at the start of `s`.
///
/// Returns the tag (including any `W/` prefix) and the remaining text.
pub fn scan_etag(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_matches(|c| c == ' ' || c == '\t');
    let start = if s.starts_with("W/") { 2 } else { 0 };
    let bytes = s.as_bytes();
    if bytes.len() < start + 2 || bytes[start] != b'"' {
        return None;
    }
    for (i, &c) in bytes.iter().enumerate().skip(start + 1) {
        match c {
            b'"' => return Some((&s[..=i], &s[i + 1..])),
            0x21 | 0x23..=0x7E | 0x80..=0xFF => {}
            _ => return None,
        }
    }
    None
}

fn any_tag_matches(list: &str, etag: &str) -> bool {
    let mut buf = list;
    loop {
        buf = buf.trim_matches(|c| c == ' ' || c == '\t');
        if buf.is_empty() {
            return false;
        }
        if let Some(rest) = buf.strip_prefix(',') {
            buf = rest;
            continue;
        }
        if buf.starts_with('*') {
            return true;
        }
        let Some((tag, rest)) = scan_etag(buf) else {
            return false;
        };
        if etag_strong_match(tag, etag) {
            return true;
        }
        buf = rest;
    }
}

fn is_safe(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn header_date(headers: &HeaderMap, name: &HeaderName) -> Option<SystemTime> {
    header_str(headers, name).and_then(|v| httpdate::parse_http_date(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "\"3a1f\"";

    fn headers(pairs: &[(HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn at(secs: u64, nanos: u32) -> SystemTime {
        UNIX_EPOCH + Duration::new(secs, nanos)
    }

    #[test]
    fn test_scan_etag() {
        assert_eq!(scan_etag("\"abc\", \"d\""), Some(("\"abc\"", ", \"d\"")));
        assert_eq!(scan_etag("W/\"abc\""), Some(("W/\"abc\"", "")));
        assert_eq!(scan_etag("abc"), None);
        assert_eq!(scan_etag("\"unterminated"), None);
        assert_eq!(scan_etag("\"a b\""), None);
    }

    #[test]
    fn test_if_none_match_exact() {
        let h = headers(&[(IF_NONE_MATCH, TAG)]);
        assert_eq!(check_if_none_match(&h, TAG), Condition::Fails);
    }

    #[test]
    fn test_if_none_match_list() {
        let h = headers(&[(IF_NONE_MATCH, "\"x\", \"3a1f\"")]);
        assert_eq!(check_if_none_match(&h, TAG), Condition::Fails);
        let h = headers(&[(IF_NONE_MATCH, "\"x\", \"y\"")]);
        assert_eq!(check_if_none_match(&h, TAG), Condition::Holds);
    }

    #[test]
    fn test_if_none_match_wildcard() {
        let h = headers(&[(IF_NONE_MATCH, "*")]);
        assert_eq!(check_if_none_match(&h, TAG), Condition::Fails);
    }

    #[test]
    fn test_weak_tag_never_matches() {
        let h = headers(&[(IF_NONE_MATCH, "W/\"3a1f\"")]);
        assert_eq!(check_if_none_match(&h, TAG), Condition::Holds);
        assert!(!etag_strong_match("W/\"3a1f\"", "W/\"3a1f\""));
    }

    #[test]
    fn test_if_none_match_absent() {
        assert_eq!(check_if_none_match(&HeaderMap::new(), TAG), Condition::Unset);
    }

    #[test]
    fn test_if_none_match_garbage_stops_scan() {
        let h = headers(&[(IF_NONE_MATCH, "garbage, \"3a1f\"")]);
        assert_eq!(check_if_none_match(&h, TAG), Condition::Holds);
    }

    #[test]
    fn test_if_modified_since_truncates_subseconds() {
        let modified = at(1_700_000_000, 500_000_000);
        let h = headers(&[(IF_MODIFIED_SINCE, &*httpdate::fmt_http_date(at(1_700_000_000, 0)))]);
        assert_eq!(
            check_if_modified_since(&Method::GET, &h, modified),
            Condition::Fails
        );
    }

    #[test]
    fn test_if_modified_since_newer_resource() {
        let h = headers(&[(IF_MODIFIED_SINCE, &*httpdate::fmt_http_date(at(1_000, 0)))]);
        assert_eq!(
            check_if_modified_since(&Method::GET, &h, at(2_000, 0)),
            Condition::Holds
        );
    }

    #[test]
    fn test_if_modified_since_ignored() {
        let date = httpdate::fmt_http_date(at(5_000, 0));
        let h = headers(&[(IF_MODIFIED_SINCE, &date)]);
        assert_eq!(
            check_if_modified_since(&Method::POST, &h, at(1_000, 0)),
            Condition::Unset
        );
        assert_eq!(
            check_if_modified_since(&Method::GET, &h, UNIX_EPOCH),
            Condition::Unset
        );
        let bad = headers(&[(IF_MODIFIED_SINCE, "yesterday")]);
        assert_eq!(
            check_if_modified_since(&Method::GET, &bad, at(1_000, 0)),
            Condition::Unset
        );
    }

    #[test]
    fn test_evaluate_not_modified_vs_failed() {
        let h = headers(&[(IF_NONE_MATCH, TAG)]);
        let modified = at(1_000, 0);
        assert_eq!(
            evaluate(&Method::GET, &h, TAG, modified),
            Precondition::NotModified
        );
        assert_eq!(
            evaluate(&Method::HEAD, &h, TAG, modified),
            Precondition::NotModified
        );
        assert_eq!(
            evaluate(&Method::POST, &h, TAG, modified),
            Precondition::Failed
        );
    }

    #[test]
    fn test_evaluate_if_none_match_takes_precedence() {
        // A non-matching tag means the date is not consulted
        let h = headers(&[
            (IF_NONE_MATCH, "\"other\""),
            (IF_MODIFIED_SINCE, &*httpdate::fmt_http_date(at(9_000, 0))),
        ]);
        assert_eq!(
            evaluate(&Method::GET, &h, TAG, at(1_000, 0)),
            Precondition::Proceed
        );
    }

    #[test]
    fn test_evaluate_falls_back_to_if_modified_since() {
        let h = headers(&[(IF_MODIFIED_SINCE, &*httpdate::fmt_http_date(at(9_000, 0)))]);
        assert_eq!(
            evaluate(&Method::GET, &h, TAG, at(1_000, 0)),
            Precondition::NotModified
        );
    }

    #[test]
    fn test_evaluate_if_match() {
        let h = headers(&[(IF_MATCH, "\"other\"")]);
        assert_eq!(
            evaluate(&Method::GET, &h, TAG, at(1_000, 0)),
            Precondition::Failed
        );
        let h = headers(&[(IF_MATCH, "*")]);
        assert_eq!(
            evaluate(&Method::GET, &h, TAG, at(1_000, 0)),
            Precondition::Proceed
        );
    }

    #[test]
    fn test_evaluate_if_unmodified_since() {
        let h = headers(&[(
            IF_UNMODIFIED_SINCE,
            &*httpdate::fmt_http_date(at(500, 0)),
        )]);
        assert_eq!(
            evaluate(&Method::GET, &h, TAG, at(1_000, 0)),
            Precondition::Failed
        );
    }

    #[test]
    fn test_if_range() {
        let modified = at(1_000, 250);
        let h = headers(&[(IF_RANGE, TAG)]);
        assert_eq!(
            check_if_range(&Method::GET, &h, Some(TAG), modified),
            Condition::Holds
        );
        let h = headers(&[(IF_RANGE, "W/\"3a1f\"")]);
        assert_eq!(
            check_if_range(&Method::GET, &h, Some(TAG), modified),
            Condition::Fails
        );
        let h = headers(&[(IF_RANGE, &*httpdate::fmt_http_date(at(1_000, 0)))]);
        assert_eq!(
            check_if_range(&Method::GET, &h, Some(TAG), modified),
            Condition::Holds
        );
        let h = headers(&[(IF_RANGE, &*httpdate::fmt_http_date(at(999, 0)))]);
        assert_eq!(
            check_if_range(&Method::GET, &h, Some(TAG), modified),
            Condition::Fails
        );
    }

    #[test]
    fn test_write_not_modified_with_etag() {
        let mut h = headers(&[
            (CONTENT_TYPE, "text/html"),
            (CONTENT_LENGTH, "10"),
            (CONTENT_ENCODING, "gzip"),
            (LAST_MODIFIED, "Tue, 14 Nov 2023 22:13:20 GMT"),
            (ETAG, TAG),
        ]);
        write_not_modified(&mut h);
        assert!(!h.contains_key(CONTENT_TYPE));
        assert!(!h.contains_key(CONTENT_LENGTH));
        assert!(!h.contains_key(CONTENT_ENCODING));
        assert!(!h.contains_key(LAST_MODIFIED));
        assert_eq!(h.get(ETAG).unwrap(), TAG);
    }

    #[test]
    fn test_write_not_modified_keeps_last_modified_without_etag() {
        let mut h = headers(&[(LAST_MODIFIED, "Tue, 14 Nov 2023 22:13:20 GMT")]);
        write_not_modified(&mut h);
        assert!(h.contains_key(LAST_MODIFIED));
    }

    #[test]
    fn test_set_last_modified() {
        let mut h = HeaderMap::new();
        set_last_modified(&mut h, UNIX_EPOCH);
        assert!(!h.contains_key(LAST_MODIFIED));

        set_last_modified(&mut h, at(1_700_000_000, 999));
        assert_eq!(
            h.get(LAST_MODIFIED).unwrap(),
            "Tue, 14 Nov 2023 22:13:20 GMT"
        );
    }
}
