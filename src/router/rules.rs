//! The standard routing table.
//!
//! Order matters: emotional expressions are recognised before task requests,
//! task requests before general questions. Multi-word terms are matched as
//! whole-word phrases, single words as tokens.

use super::{KeywordMatcher, Route, RouteInput, Rule};

pub const EMOTIONAL: KeywordMatcher = KeywordMatcher {
    include: &[
        "i feel", "i'm feeling", "i am feeling", "i've been feeling", "feeling so", "i'm so",
        "i am so", "sad", "unhappy", "depressed", "anxious", "anxiety", "lonely", "stressed",
        "overwhelmed", "heartbroken", "scared", "afraid", "angry", "furious", "frustrated",
        "worried", "grateful", "thankful",
    ],
    exclude: &["feel free", "i feel like cooking", "i'm so hungry"],
};

pub const CODE: KeywordMatcher = KeywordMatcher {
    include: &[
        "python", "javascript", "typescript", "rust", "java", "golang", "html", "css",
        "sql", "code", "coding", "programming", "debug", "debugging", "compile", "compiler",
        "algorithm", "regex", "api", "write a program", "write a function", "a function that",
        "write code", "write a script", "fix my code", "fix this bug", "syntax error",
        "stack trace",
    ],
    // Food, animal, metal and place contexts where programming words turn up innocently.
    exclude: &[
        "recipe", "recipes", "soup", "chicken", "cook", "cooking", "bake", "baking", "ingredient",
        "ingredients", "food", "dinner", "lunch", "breakfast", "python snake", "pet python",
        "ball python", "monty python", "rust stain", "rust stains", "remove rust", "iron",
        "metal", "metals", "steel", "corrosion", "corrode", "oxidation", "island", "indonesia",
        "jakarta", "java sea", "coffee",
    ],
};

pub const RECIPE: KeywordMatcher = KeywordMatcher {
    include: &[
        "recipe", "recipes", "cook", "cooking", "bake", "baking", "ingredients", "soup",
        "how to make", "how do i make", "how do you make", "what can i cook",
    ],
    exclude: &[
        "website", "app", "program", "code", "game", "music", "song", "beat", "art", "drawing",
        "money", "friends",
    ],
};

pub const ART: KeywordMatcher = KeywordMatcher {
    include: &[
        "draw", "drawing", "paint", "painting", "art", "artwork", "sketch", "generate art",
        "make art", "create an image", "make a picture",
    ],
    exclude: &["state of the art", "art of war", "martial art"],
};

pub const MUSIC: KeywordMatcher = KeywordMatcher {
    include: &[
        "music", "song", "melody", "tune", "compose", "soundtrack", "beat", "play a song",
        "make music",
    ],
    exclude: &["beat the", "history of music"],
};

pub const GAME: KeywordMatcher = KeywordMatcher {
    include: &[
        "game", "games", "play a game", "let's play", "snake", "tetris", "pong", "breakout",
        "sudoku", "minesweeper", "tic tac toe",
    ],
    exclude: &["game theory", "python snake"],
};

pub const KNOWLEDGE_PHRASES: &[&str] = &[
    "what is", "what are", "what was", "what causes", "what makes", "why is", "why are",
    "why do", "why does", "how does", "how do", "how is", "how fast", "how far", "how many",
    "who is", "who was", "who built", "who invented", "when did", "when was", "where is",
    "where are", "explain", "tell me about", "define", "at what",
];

fn is_knowledge_question(input: &RouteInput<'_>) -> bool {
    input.is_question() || KNOWLEDGE_PHRASES.iter().any(|p| input.has_term(p))
}

/// The default table: emotional, code, recipe, art, music, game, knowledge.
pub fn standard_rules() -> Vec<Rule> {
    vec![
        Rule::keywords("emotional-expression", Route::Emotional, EMOTIONAL),
        Rule::keywords("code-request", Route::Code, CODE),
        Rule::keywords("recipe-request", Route::Recipe, RECIPE),
        Rule::keywords("art-request", Route::Art, ART),
        Rule::keywords("music-request", Route::Music, MUSIC),
        Rule::keywords("game-request", Route::Game, GAME),
        Rule::custom("knowledge-question", Route::Knowledge, is_knowledge_question),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::router::Router;

    fn route(text: &str) -> Route {
        Router::default().route(&Query::new(text))
    }

    #[test]
    fn routes_each_category() {
        assert_eq!(route("I feel so lonely tonight"), Route::Emotional);
        assert_eq!(route("write a python function to reverse a list"), Route::Code);
        assert_eq!(route("give me a pancake recipe"), Route::Recipe);
        assert_eq!(route("draw me a sunset"), Route::Art);
        assert_eq!(route("compose a calm melody"), Route::Music);
        assert_eq!(route("let's play tetris"), Route::Game);
        assert_eq!(route("Why is the sky blue?"), Route::Knowledge);
        assert_eq!(route("hello there"), Route::Default);
    }

    #[test]
    fn cooking_context_overrides_code_words() {
        assert_eq!(route("chicken soup recipe python"), Route::Recipe);
        assert_ne!(route("how do I remove rust stains from a pan"), Route::Code);
        assert_eq!(route("what is the function of the liver?"), Route::Knowledge);
    }

    #[test]
    fn metal_and_place_senses_are_not_code() {
        assert_eq!(route("why does iron rust?"), Route::Knowledge);
        assert_eq!(route("how does corrosion turn steel to rust?"), Route::Knowledge);
        assert_eq!(route("where is the island of java?"), Route::Knowledge);
        assert_eq!(route("what is the capital of indonesia, on java?"), Route::Knowledge);
        assert_eq!(route("why is rust memory safe?"), Route::Code);
    }

    #[test]
    fn knowledge_phrase_without_question_mark() {
        assert_eq!(route("tell me about the roman empire"), Route::Knowledge);
    }

    #[test]
    fn state_of_the_art_is_not_an_art_request() {
        assert_eq!(route("what is the state of the art in batteries"), Route::Knowledge);
    }

    #[test]
    fn feel_free_is_not_emotional() {
        assert_eq!(route("feel free to explain gravity"), Route::Knowledge);
    }
}
