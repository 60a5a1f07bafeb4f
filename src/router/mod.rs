//! Query router.
//!
//! A [`Router`] is an ordered table of [`Rule`]s. Each rule pairs a matcher
//! with a [`Route`]; the first rule whose matcher accepts the query decides
//! the route, and [`Route::Default`] is returned when none do. Routing is a
//! pure function of the query and the table.

pub mod rules;

use serde::{Deserialize, Serialize};

use crate::query::{words, Query};

/// Handler category for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Emotional,
    Code,
    Recipe,
    Art,
    Music,
    Game,
    Knowledge,
    Default,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Code => "code",
            Self::Recipe => "recipe",
            Self::Art => "art",
            Self::Music => "music",
            Self::Game => "game",
            Self::Knowledge => "knowledge",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emotional" => Ok(Self::Emotional),
            "code" => Ok(Self::Code),
            "recipe" => Ok(Self::Recipe),
            "art" => Ok(Self::Art),
            "music" => Ok(Self::Music),
            "game" => Ok(Self::Game),
            "knowledge" => Ok(Self::Knowledge),
            "default" => Ok(Self::Default),
            _ => Err(format!("unknown route: {s}")),
        }
    }
}

/// Query text prepared once for all matchers.
#[derive(Debug, Clone)]
pub struct RouteInput<'a> {
    pub query: &'a Query,
    /// Lowercased, whitespace-collapsed, padded with one space on each side so
    /// phrases can be matched on word boundaries.
    padded: String,
    words: Vec<String>,
}

impl<'a> RouteInput<'a> {
    pub fn new(query: &'a Query) -> Self {
        let words = words(&query.text);
        let padded = format!(" {} ", words.join(" "));
        Self {
            query,
            padded,
            words,
        }
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// `phrase` (lowercase, single-spaced) appears as whole words.
    pub fn has_phrase(&self, phrase: &str) -> bool {
        self.padded.contains(&format!(" {phrase} "))
    }

    /// Single-word terms match tokens; multi-word terms match phrases.
    pub fn has_term(&self, term: &str) -> bool {
        if term.contains(' ') {
            self.has_phrase(term)
        } else {
            self.has_word(term)
        }
    }

    pub fn is_question(&self) -> bool {
        self.query.text.trim_end().ends_with('?')
    }
}

/// Include/exclude term lists. Exclusions are checked first and veto a match.
#[derive(Debug, Clone, Copy)]
pub struct KeywordMatcher {
    pub include: &'static [&'static str],
    pub exclude: &'static [&'static str],
}

impl KeywordMatcher {
    pub fn matches(&self, input: &RouteInput<'_>) -> bool {
        if self.exclude.iter().any(|t| input.has_term(t)) {
            return false;
        }
        self.include.iter().any(|t| input.has_term(t))
    }
}

type MatchFn = Box<dyn Fn(&RouteInput<'_>) -> bool + Send + Sync>;

enum Matcher {
    Keywords(KeywordMatcher),
    Custom(MatchFn),
}

/// One `(matcher, route)` entry of the routing table.
pub struct Rule {
    pub name: &'static str,
    pub route: Route,
    matcher: Matcher,
}

impl Rule {
    pub fn keywords(name: &'static str, route: Route, matcher: KeywordMatcher) -> Self {
        Self {
            name,
            route,
            matcher: Matcher::Keywords(matcher),
        }
    }

    pub fn custom(
        name: &'static str,
        route: Route,
        matcher: impl Fn(&RouteInput<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            route,
            matcher: Matcher::Custom(Box::new(matcher)),
        }
    }

    pub fn matches(&self, input: &RouteInput<'_>) -> bool {
        match &self.matcher {
            Matcher::Keywords(k) => k.matches(input),
            Matcher::Custom(f) => f(input),
        }
    }
}

/// The chosen route and the rule that chose it (`None` for the default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub route: Route,
    pub rule: Option<&'static str>,
}

/// Ordered routing table.
pub struct Router {
    rules: Vec<Rule>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(rules::standard_rules())
    }
}

impl Router {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn decide(&self, query: &Query) -> RouteDecision {
        let input = RouteInput::new(query);
        self.rules
            .iter()
            .find(|rule| rule.matches(&input))
            .map(|rule| RouteDecision {
                route: rule.route,
                rule: Some(rule.name),
            })
            .unwrap_or(RouteDecision {
                route: Route::Default,
                rule: None,
            })
    }

    pub fn route(&self, query: &Query) -> Route {
        self.decide(query).route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_match_on_word_boundaries() {
        let q = Query::new("Can you WRITE  a program?");
        let input = RouteInput::new(&q);
        assert!(input.has_phrase("write a program"));
        assert!(!input.has_phrase("rite a prog"));
        assert!(input.is_question());
    }

    #[test]
    fn exclusion_vetoes_inclusion() {
        let matcher = KeywordMatcher {
            include: &["python"],
            exclude: &["soup"],
        };
        let q = Query::new("python soup");
        assert!(!matcher.matches(&RouteInput::new(&q)));
        let q = Query::new("python script");
        assert!(matcher.matches(&RouteInput::new(&q)));
    }

    #[test]
    fn first_matching_rule_wins() {
        let router = Router::new(vec![
            Rule::custom("always-code", Route::Code, |_| true),
            Rule::custom("always-art", Route::Art, |_| true),
        ]);
        let decision = router.decide(&Query::new("anything"));
        assert_eq!(decision.route, Route::Code);
        assert_eq!(decision.rule, Some("always-code"));
    }

    #[test]
    fn empty_table_routes_default() {
        let router = Router::new(Vec::new());
        assert_eq!(router.decide(&Query::new("hello")).rule, None);
        assert_eq!(router.route(&Query::new("hello")), Route::Default);
    }

    #[test]
    fn route_round_trips_through_str() {
        for route in [Route::Emotional, Route::Code, Route::Knowledge, Route::Default] {
            assert_eq!(route.as_str().parse::<Route>().unwrap(), route);
        }
    }
}
