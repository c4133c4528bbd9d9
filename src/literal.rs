use regex_syntax::{hir::literal::Extractor, parse};

/// Extract the literal prefixes a rule pattern requires, for use as
/// Aho-Corasick pre-filter candidates. Every match of the pattern contains at
/// least one of the returned literals (compared ASCII case-insensitively).
///
/// Returns an empty vec when no such set exists: the pattern can't be parsed
/// by `regex_syntax` (lookaround, backreferences), its prefix set is
/// infinite, or one of the prefixes is shorter than `min_len` bytes. The rule
/// then becomes an "always candidate" that is checked on every input.
pub(crate) fn extract_literals(pattern: &str, min_len: usize) -> Vec<String> {
    let hir = match parse(pattern) {
        Ok(h) => h,
        Err(_) => return Vec::new(),
    };

    let mut extractor = Extractor::new();
    extractor.kind(regex_syntax::hir::literal::ExtractKind::Prefix);

    let seq = extractor.extract(&hir);
    let Some(literals) = seq.literals() else {
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::with_capacity(literals.len());
    for lit in literals {
        let Ok(s) = std::str::from_utf8(lit.as_bytes()) else {
            return Vec::new();
        };
        if s.len() < min_len {
            return Vec::new();
        }
        let lower = s.to_ascii_lowercase();
        if !out.contains(&lower) {
            out.push(lower);
        }
    }

    out
}
