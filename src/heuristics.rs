use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::compile_rule;

/// Pattern lists behind the derived bot predicates.
///
/// Each list is joined into one case-insensitive alternation. `bot` hits
/// are discounted when the engine reports the mobile-bot signature;
/// `always_bot` hits never are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotHeuristics {
    pub bot: Vec<String>,
    pub always_bot: Vec<String>,
    /// Engine signature for crawlers that present as mobile devices.
    pub mobile_bot_signature: String,
    /// Engine signature for generic crawlers.
    pub generic_bot_signature: String,
}

impl Default for BotHeuristics {
    fn default() -> Self {
        Self {
            bot: vec!["bot".into(), "spider".into()],
            always_bot: vec!["yeti".into(), "ichiro".into()],
            mobile_bot_signature: "MobileBot".into(),
            generic_bot_signature: "Bot".into(),
        }
    }
}

impl BotHeuristics {
    pub fn compile(&self) -> Result<BotMatcher> {
        let any: Vec<String> = self.bot.iter().chain(&self.always_bot).cloned().collect();
        Ok(BotMatcher {
            bot: alternation(&self.bot)?,
            always_bot: alternation(&self.always_bot)?,
            any_bot: alternation(&any)?,
            mobile_bot_signature: self.mobile_bot_signature.clone(),
            generic_bot_signature: self.generic_bot_signature.clone(),
        })
    }
}

/// Compiled form of `BotHeuristics`. An empty pattern list never matches.
#[derive(Debug)]
pub struct BotMatcher {
    bot: Option<fancy_regex::Regex>,
    always_bot: Option<fancy_regex::Regex>,
    any_bot: Option<fancy_regex::Regex>,
    mobile_bot_signature: String,
    generic_bot_signature: String,
}

impl BotMatcher {
    pub fn matches_bot(&self, ua: &str) -> bool {
        is_match(&self.bot, ua)
    }

    pub fn matches_always_bot(&self, ua: &str) -> bool {
        is_match(&self.always_bot, ua)
    }

    pub fn matches_any_bot(&self, ua: &str) -> bool {
        is_match(&self.any_bot, ua)
    }

    pub fn mobile_bot_signature(&self) -> &str {
        &self.mobile_bot_signature
    }

    pub fn generic_bot_signature(&self) -> &str {
        &self.generic_bot_signature
    }
}

fn alternation(patterns: &[String]) -> Result<Option<fancy_regex::Regex>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    Ok(Some(compile_rule(&format!("({})", patterns.join("|")))?))
}

fn is_match(re: &Option<fancy_regex::Regex>, ua: &str) -> bool {
    re.as_ref()
        .map_or(false, |re| re.is_match(ua).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> BotMatcher {
        BotHeuristics::default().compile().unwrap()
    }

    #[test]
    fn default_groups() {
        let m = matcher();
        assert!(m.matches_bot("Mozilla/5.0 (compatible; Baiduspider/2.0)"));
        assert!(m.matches_bot("SomeBOT/1.0"));
        assert!(!m.matches_bot("Yeti/1.1 (Naver Corp.)"));
        assert!(m.matches_always_bot("Yeti/1.1 (Naver Corp.)"));
        assert!(m.matches_always_bot("ICHIRO/2.0"));
        assert!(!m.matches_always_bot("Googlebot/2.1"));
    }

    #[test]
    fn any_bot_is_the_union() {
        let m = matcher();
        for ua in ["Googlebot/2.1", "Baiduspider", "Yeti/1.1", "ichiro/2.0"] {
            assert!(m.matches_any_bot(ua), "{ua}");
        }
        assert!(!m.matches_any_bot("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
        assert!(!m.matches_any_bot(""));
    }

    #[test]
    fn empty_list_never_matches() {
        let m = BotHeuristics {
            always_bot: vec![],
            ..BotHeuristics::default()
        }
        .compile()
        .unwrap();
        assert!(!m.matches_always_bot("Yeti/1.1"));
        assert!(m.matches_any_bot("crawler-bot"));
    }

    #[test]
    fn loads_from_yaml_with_defaults() {
        let h: BotHeuristics = serde_yaml::from_str("bot: [bot, spider, crawler]\n").unwrap();
        assert_eq!(h.bot.len(), 3);
        assert_eq!(h.always_bot, vec!["yeti", "ichiro"]);
        assert_eq!(h.mobile_bot_signature, "MobileBot");
        assert!(h.compile().unwrap().matches_bot("SiteCrawler/1.0"));
    }
}
