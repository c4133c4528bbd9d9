use std::collections::HashMap;

use aho_corasick::{AhoCorasick, MatchKind};
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::Result;
use crate::literal::extract_literals;

/// Shortest literal worth feeding to the prefilter.
const MIN_LITERAL_LEN: usize = 3;

/// Compile a rule with the case-insensitive, dot-matches-newline flags every
/// signature and ad-hoc pattern is matched with.
pub(crate) fn compile_rule(pattern: &str) -> Result<fancy_regex::Regex> {
    Ok(fancy_regex::Regex::new(&format!("(?is){}", pattern))?)
}

/// The table a signature comes from. `Utility` signatures are only consulted
/// in extended detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleGroup {
    Phone,
    Tablet,
    OperatingSystem,
    Browser,
    Utility,
}

impl RuleGroup {
    pub fn is_mobile_rule(self) -> bool {
        !matches!(self, Self::Utility)
    }
}

pub(crate) struct RuleEntry {
    pub key: String,
    pub group: RuleGroup,
    pub pattern: String,
    pub regex: fancy_regex::Regex,
}

/// Result of a successful scan.
pub(crate) struct RuleMatch<'a> {
    pub entry: &'a RuleEntry,
    pub captures: Vec<String>,
}

/// Signature table with an Aho-Corasick prefilter.
///
/// Each rule contributes the literal prefixes its pattern requires; a scan
/// only evaluates rules whose literals occur in the user-agent, plus the
/// rules no literal set could be derived for.
pub(crate) struct RuleTable {
    entries: Vec<RuleEntry>,
    /// Lower-cased key → entry index.
    by_key: HashMap<String, usize>,
    prefilter: Option<AhoCorasick>,
    /// Maps prefilter pattern index → entry index.
    literal_to_entry: Vec<usize>,
    /// Entries that must be evaluated on every scan.
    always: Vec<bool>,
}

impl RuleTable {
    /// Build a table from `(key, group, pattern)` triples in match order.
    ///
    /// A key repeated later in the input replaces the earlier pattern but
    /// keeps its position.
    pub fn build(items: impl IntoIterator<Item = (String, RuleGroup, String)>) -> Result<Self> {
        let mut merged: IndexMap<String, (RuleGroup, String)> = IndexMap::new();
        for (key, group, pattern) in items {
            merged.insert(key, (group, pattern));
        }
        let items: Vec<(String, RuleGroup, String)> = merged
            .into_iter()
            .map(|(key, (group, pattern))| (key, group, pattern))
            .collect();

        // Phase 1: compile every rule in parallel.
        let regexes: Vec<fancy_regex::Regex> = items
            .par_iter()
            .map(|(_, _, pattern)| compile_rule(pattern))
            .collect::<Result<Vec<_>>>()?;

        // Phase 2: derive prefilter literals.
        let literal_sets: Vec<Vec<String>> = items
            .par_iter()
            .map(|(_, _, pattern)| extract_literals(pattern, MIN_LITERAL_LEN))
            .collect();

        let mut literals: Vec<String> = Vec::new();
        let mut literal_to_entry: Vec<usize> = Vec::new();
        let mut always: Vec<bool> = Vec::with_capacity(items.len());
        for (idx, set) in literal_sets.into_iter().enumerate() {
            always.push(set.is_empty());
            for lit in set {
                literals.push(lit);
                literal_to_entry.push(idx);
            }
        }

        let prefilter = if literals.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::Standard)
                    .build(&literals)?,
            )
        };

        let mut by_key = HashMap::with_capacity(items.len());
        let entries: Vec<RuleEntry> = items
            .into_iter()
            .zip(regexes)
            .enumerate()
            .map(|(idx, ((key, group, pattern), regex))| {
                by_key.insert(key.to_lowercase(), idx);
                RuleEntry {
                    key,
                    group,
                    pattern,
                    regex,
                }
            })
            .collect();

        tracing::debug!(
            rules = entries.len(),
            prefiltered = always.iter().filter(|a| !**a).count(),
            literals = literal_to_entry.len(),
            "rule table built"
        );

        Ok(Self {
            entries,
            by_key,
            prefilter,
            literal_to_entry,
            always,
        })
    }

    /// Look a signature up by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&RuleEntry> {
        self.by_key.get(&key.to_lowercase()).map(|&i| &self.entries[i])
    }

    /// Find the first rule (in table order) accepted by `filter` that matches
    /// `ua`.
    pub fn first_match<'a>(
        &'a self,
        ua: &str,
        filter: impl Fn(RuleGroup) -> bool,
    ) -> Option<RuleMatch<'a>> {
        let candidates = self.candidates(ua);
        self.entries
            .iter()
            .zip(candidates)
            .filter(|(entry, candidate)| *candidate && filter(entry.group))
            .find_map(|(entry, _)| capture_all(&entry.regex, ua).map(|captures| RuleMatch { entry, captures }))
    }

    /// Same as `first_match` but evaluates every rule.
    #[cfg(test)]
    pub fn first_match_unfiltered<'a>(
        &'a self,
        ua: &str,
        filter: impl Fn(RuleGroup) -> bool,
    ) -> Option<RuleMatch<'a>> {
        self.entries
            .iter()
            .filter(|entry| filter(entry.group))
            .find_map(|entry| capture_all(&entry.regex, ua).map(|captures| RuleMatch { entry, captures }))
    }

    fn candidates(&self, ua: &str) -> Vec<bool> {
        // The automaton folds ASCII case only; the rules fold Unicode
        // (`ſ` matches `s`, `K` matches `k`).
        if !ua.is_ascii() {
            return vec![true; self.entries.len()];
        }
        let mut candidates = self.always.clone();
        if let Some(ac) = &self.prefilter {
            for m in ac.find_overlapping_iter(ua) {
                candidates[self.literal_to_entry[m.pattern().as_usize()]] = true;
            }
        }
        candidates
    }
}

/// Match `regex` against `text`, returning every capture group (group 0
/// first). Groups that did not participate are empty strings.
pub(crate) fn capture_all(regex: &fancy_regex::Regex, text: &str) -> Option<Vec<String>> {
    match regex.captures(text) {
        Ok(Some(caps)) => Some(
            caps.iter()
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    }
}
