//! RPM epoch-version-release comparison.
//!
//! This is the single authority for version ordering; queries and the solver both
//! call [`evrcmp`] (indirectly, through [`crate::pool::Pool::evrcmp`]) rather than
//! reimplementing comparison logic of their own.

use std::cmp::Ordering;

/// A parsed `[epoch:]version[-release]` string.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Evr<'a> {
    pub epoch: Option<&'a str>,
    pub version: &'a str,
    pub release: Option<&'a str>,
}

impl<'a> Evr<'a> {
    pub fn parse(s: &'a str) -> Self {
        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => (Some(epoch), rest),
            None => (None, s),
        };
        let (version, release) = match rest.split_once('-') {
            Some((version, release)) => (version, Some(release)),
            None => (rest, None),
        };
        Evr {
            epoch,
            version,
            release,
        }
    }
}

fn epoch_value(epoch: Option<&str>) -> i64 {
    match epoch {
        None => 0,
        Some(e) => e.parse().unwrap_or(0),
    }
}

/// Compares two EVR strings using the RPM `rpmvercmp` segment-wise algorithm.
///
/// Splits each side into maximal runs of digits or letters (skipping separator bytes
/// such as `.`, `-`, `_`), comparing numeric runs numerically (leading zeros ignored)
/// and alphabetic runs byte-wise, with a numeric run always outranking an alphabetic
/// one at the same position. A leading `~` sorts lower than anything, including the
/// empty string (RPM's "tilde always loses" pre-release marker); a leading `^` sorts
/// higher than anything comparable (the "caret always wins" post-release marker).
pub fn evrcmp(a: &str, b: &str) -> Ordering {
    let ea = Evr::parse(a);
    let eb = Evr::parse(b);

    let epoch_cmp = epoch_value(ea.epoch).cmp(&epoch_value(eb.epoch));
    if epoch_cmp != Ordering::Equal {
        return epoch_cmp;
    }

    let version_cmp = segment_cmp(ea.version, eb.version);
    if version_cmp != Ordering::Equal {
        return version_cmp;
    }

    match (ea.release, eb.release) {
        (Some(ra), Some(rb)) => segment_cmp(ra, rb),
        _ => Ordering::Equal,
    }
}

/// Compares only epoch+version, ignoring release even when both sides have one.
/// Used by `filter_evr` when a caller's pattern omits the release component.
pub fn evrcmp_without_release(a: &str, b: &str) -> Ordering {
    let ea = Evr::parse(a);
    let eb = Evr::parse(b);
    let epoch_cmp = epoch_value(ea.epoch).cmp(&epoch_value(eb.epoch));
    if epoch_cmp != Ordering::Equal {
        return epoch_cmp;
    }
    segment_cmp(ea.version, eb.version)
}

#[derive(Debug, Eq, PartialEq)]
enum Segment<'a> {
    Numeric(&'a str),
    Alpha(&'a str),
    Tilde,
    Caret,
}

fn next_segment(s: &str) -> Option<(Segment<'_>, &str)> {
    let mut chars = s.char_indices().peekable();
    // skip separator bytes
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '~' || c == '^' {
            break;
        }
        chars.next();
    }
    let (start, first) = chars.next()?;
    if first == '~' {
        return Some((Segment::Tilde, &s[start + 1..]));
    }
    if first == '^' {
        return Some((Segment::Caret, &s[start + 1..]));
    }
    let is_digit = first.is_ascii_digit();
    let mut end = start + first.len_utf8();
    for &(idx, c) in chars.by_ref() {
        if is_digit == c.is_ascii_digit() && c.is_ascii_alphanumeric() {
            end = idx + c.len_utf8();
        } else {
            break;
        }
    }
    let segment = &s[start..end];
    Some((
        if is_digit {
            Segment::Numeric(segment)
        } else {
            Segment::Alpha(segment)
        },
        &s[end..],
    ))
}

fn segment_cmp(mut a: &str, mut b: &str) -> Ordering {
    loop {
        let next_a = next_segment(a);
        let next_b = next_segment(b);
        match (next_a, next_b) {
            (None, None) => return Ordering::Equal,
            (None, Some((Segment::Tilde, _))) => return Ordering::Greater,
            (Some((Segment::Tilde, _)), None) => return Ordering::Less,
            (None, Some((Segment::Caret, _))) => return Ordering::Less,
            (Some((Segment::Caret, _)), None) => return Ordering::Greater,
            (None, Some((Segment::Numeric(_), _))) => return Ordering::Less,
            (Some((Segment::Numeric(_), _)), None) => return Ordering::Greater,
            (None, Some((Segment::Alpha(_), _))) => return Ordering::Greater,
            (Some((Segment::Alpha(_), _)), None) => return Ordering::Less,
            (Some((sa, ra)), Some((sb, rb))) => {
                let cmp = compare_segments(&sa, &sb);
                if cmp != Ordering::Equal {
                    return cmp;
                }
                a = ra;
                b = rb;
            }
        }
    }
}

fn compare_segments(a: &Segment<'_>, b: &Segment<'_>) -> Ordering {
    match (a, b) {
        (Segment::Tilde, Segment::Tilde) => Ordering::Equal,
        (Segment::Tilde, _) => Ordering::Less,
        (_, Segment::Tilde) => Ordering::Greater,
        (Segment::Caret, Segment::Caret) => Ordering::Equal,
        (Segment::Caret, _) => Ordering::Greater,
        (_, Segment::Caret) => Ordering::Less,
        (Segment::Numeric(x), Segment::Numeric(y)) => {
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Segment::Numeric(_), Segment::Alpha(_)) => Ordering::Greater,
        (Segment::Alpha(_), Segment::Numeric(_)) => Ordering::Less,
        (Segment::Alpha(x), Segment::Alpha(y)) => x.cmp(y),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        evrcmp(a, b)
    }

    #[test]
    fn equal_versions() {
        assert_eq!(cmp("1.0-1", "1.0-1"), Ordering::Equal);
    }

    #[test]
    fn numeric_beats_leading_zeros() {
        assert_eq!(cmp("1.007-1", "1.7-1"), Ordering::Equal);
    }

    #[test]
    fn longer_numeric_wins() {
        assert_eq!(cmp("1.10-1", "1.9-1"), Ordering::Greater);
    }

    #[test]
    fn numeric_outranks_alpha() {
        assert_eq!(cmp("1.0a", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.5", "1.5a"), Ordering::Greater);
    }

    #[test]
    fn tilde_always_loses() {
        assert_eq!(cmp("1.0~rc1", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.0~rc1", "1.0~rc2"), Ordering::Less);
    }

    #[test]
    fn caret_always_wins() {
        assert_eq!(cmp("1.0^git1", "1.0"), Ordering::Greater);
    }

    #[test]
    fn epoch_dominates() {
        assert_eq!(cmp("1:1.0-1", "2:0.1-1"), Ordering::Less);
        assert_eq!(cmp("0:1.0-1", "1.0-1"), Ordering::Equal);
    }

    #[test]
    fn release_only_compared_when_present_both_sides() {
        assert_eq!(evrcmp_without_release("1.0-5", "1.0-1"), Ordering::Equal);
    }

    #[test]
    fn total_and_antisymmetric() {
        let samples = ["1.0-1", "1.0-2", "2.0-1", "1.0~rc1-1", "1.0^git1-1", "1:1.0-1"];
        for a in samples {
            for b in samples {
                let fwd = evrcmp(a, b);
                let back = evrcmp(b, a);
                assert_eq!(fwd, back.reverse(), "evrcmp({a}, {b}) not antisymmetric with evrcmp({b}, {a})");
            }
        }
    }
}
