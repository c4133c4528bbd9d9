/// Capture group substituted for `[VER]` in property patterns.
pub(crate) const VER: &str = r"([\w._\+]+)";

/// Turn a raw version token into a comparable float: `_`, space and `/`
/// become dots, everything after the first dot is collapsed into the
/// fraction (`"5_1_1"` → `5.11`), and the leading numeric part is parsed.
/// Tokens without a leading number yield `0.0`.
pub fn prepare_version_no(ver: &str) -> f64 {
    let ver = ver.replace(['_', ' ', '/'], ".");
    let normalized = match ver.split_once('.') {
        Some((major, rest)) => format!("{major}.{}", rest.replace('.', "")),
        None => ver,
    };
    leading_float(&normalized)
}

/// Parse the longest `[+-]digits[.digits]` prefix, ignoring leading
/// whitespace.
fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || end > digits_start {
            end = frac_end;
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// Cut a user-agent down to at most 500 characters after trimming.
pub(crate) fn prepare_user_agent(ua: &str) -> String {
    let ua = ua.trim();
    match ua.char_indices().nth(500) {
        Some((idx, _)) => ua[..idx].to_string(),
        None => ua.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_collapse_into_one_fraction() {
        assert_eq!(prepare_version_no("5_1_1"), 5.11);
        assert_eq!(prepare_version_no("4.3.2"), 4.32);
        assert_eq!(prepare_version_no("10 3"), 10.3);
        assert_eq!(prepare_version_no("2/1"), 2.1);
    }

    #[test]
    fn plain_numbers() {
        assert_eq!(prepare_version_no("18"), 18.0);
        assert_eq!(prepare_version_no("120.0.6099.109"), 120.06099109);
    }

    #[test]
    fn trailing_garbage_is_ignored() {
        assert_eq!(prepare_version_no("7.0b2"), 7.0);
        assert_eq!(prepare_version_no("9B179"), 9.0);
    }

    #[test]
    fn non_numeric_is_zero() {
        assert_eq!(prepare_version_no("abc"), 0.0);
        assert_eq!(prepare_version_no(""), 0.0);
    }

    #[test]
    fn user_agent_is_trimmed_and_truncated() {
        assert_eq!(prepare_user_agent("  Opera  "), "Opera");
        let long = "x".repeat(600);
        assert_eq!(prepare_user_agent(&long).len(), 500);
    }
}
