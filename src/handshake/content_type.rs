//! Content-type matching.

use bytes::Bytes;

/// Return the entries of `offered` that also appear in `accepted`.
///
/// Comparison is exact byte equality. The result keeps the order of
/// `offered`, including any duplicates it contains.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use framestream::handshake::match_content_types;
///
/// let offered = [Bytes::from_static(b"a"), Bytes::from_static(b"b")];
/// let accepted = [Bytes::from_static(b"b"), Bytes::from_static(b"c")];
/// assert_eq!(match_content_types(&offered, &accepted), vec![Bytes::from_static(b"b")]);
/// ```
pub fn match_content_types(offered: &[Bytes], accepted: &[Bytes]) -> Vec<Bytes> {
    offered
        .iter()
        .filter(|candidate| accepted.contains(*candidate))
        .cloned()
        .collect()
}

/// Apply the exactly-one-match policy.
///
/// Returns the single match, or the number of matches on failure.
pub(crate) fn single_match(matched: &[Bytes]) -> std::result::Result<Bytes, usize> {
    match matched {
        [only] => Ok(only.clone()),
        _ => Err(matched.len()),
    }
}
