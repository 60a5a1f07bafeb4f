//! Fixed replies for the non-knowledge routes.

use crate::emotion::EmotionRecord;
use crate::query::words;

pub const CLARIFY_MESSAGE: &str =
    "I didn't catch a question there. What would you like to talk about?";

pub const TOO_LONG_MESSAGE: &str =
    "That message is a bit long for me. Could you shorten it or split it into smaller questions?";

pub const CODE_UNAVAILABLE_MESSAGE: &str = "I can't reach my coding assistant right now. \
    Try again in a moment, or describe the problem in more detail.";

pub const RECIPE_UNAVAILABLE_MESSAGE: &str = "I don't have that recipe yet. \
    Try asking for chicken soup, pancakes, guacamole, tomato pasta or scrambled eggs.";

pub const NEUTRAL_MESSAGE: &str = "I'm here and listening. Tell me more, ask me a question, \
    or ask for a recipe, some code, art, music or a game.";

struct Recipe {
    /// All of these words must appear in the message.
    keys: &'static [&'static str],
    text: &'static str,
}

const RECIPES: &[Recipe] = &[
    Recipe {
        keys: &["chicken", "soup"],
        text: "Chicken soup\n\nIngredients: 1 kg chicken pieces, 2 carrots, 2 celery sticks, 1 onion, \
               2 garlic cloves, 2 L water, salt, pepper, parsley, 150 g egg noodles.\n\n\
               1. Simmer the chicken in the water with the onion and garlic for 45 minutes, skimming the top.\n\
               2. Lift out the chicken, shred the meat and discard the bones.\n\
               3. Add sliced carrots and celery to the broth and cook for 10 minutes.\n\
               4. Add the noodles and shredded chicken; cook until the noodles are tender.\n\
               5. Season with salt and pepper and finish with chopped parsley.",
    },
    Recipe {
        keys: &["pancakes"],
        text: "Pancakes\n\nIngredients: 200 g flour, 2 tsp baking powder, 1 tbsp sugar, a pinch of salt, \
               300 ml milk, 1 egg, 30 g melted butter.\n\n\
               1. Whisk the dry ingredients in a bowl.\n\
               2. Beat the milk, egg and butter together and stir into the dry mix until just combined.\n\
               3. Heat a lightly oiled pan over medium heat.\n\
               4. Pour in a ladle of batter; flip when bubbles appear on the surface.\n\
               5. Cook the other side until golden and serve warm.",
    },
    Recipe {
        keys: &["guacamole"],
        text: "Guacamole\n\nIngredients: 3 ripe avocados, 1 lime, 1/2 red onion, 1 tomato, \
               a handful of coriander, 1 small chilli, salt.\n\n\
               1. Mash the avocados with the lime juice.\n\
               2. Finely chop the onion, tomato, coriander and chilli and fold them in.\n\
               3. Season with salt and serve straight away.",
    },
    Recipe {
        keys: &["tomato", "pasta"],
        text: "Tomato pasta\n\nIngredients: 400 g pasta, 2 tbsp olive oil, 3 garlic cloves, \
               800 g tinned tomatoes, salt, pepper, basil, parmesan.\n\n\
               1. Cook the pasta in salted water until al dente.\n\
               2. Meanwhile soften the sliced garlic in the olive oil, add the tomatoes and simmer for 15 minutes.\n\
               3. Season the sauce, toss with the drained pasta and a splash of pasta water.\n\
               4. Serve with torn basil and grated parmesan.",
    },
    Recipe {
        keys: &["scrambled", "eggs"],
        text: "Scrambled eggs\n\nIngredients: 3 eggs, 1 tbsp butter, 2 tbsp milk, salt, pepper.\n\n\
               1. Beat the eggs with the milk and a pinch of salt.\n\
               2. Melt the butter in a pan over low heat.\n\
               3. Add the eggs and stir gently until softly set.\n\
               4. Take off the heat while still glossy and season with pepper.",
    },
];

/// Canned recipe whose key words all appear in `text`.
pub fn recipe(text: &str) -> Option<&'static str> {
    let tokens = words(text);
    RECIPES
        .iter()
        .find(|r| r.keys.iter().all(|k| tokens.iter().any(|t| t == k)))
        .map(|r| r.text)
}

/// The static game library served by the frontend.
pub const GAME_CATALOG: &[&str] = &[
    "Snake",
    "Tetris",
    "Pong",
    "Breakout",
    "Memory Match",
    "Minesweeper",
    "Tic Tac Toe",
    "Sudoku",
];

pub fn game_reply() -> String {
    format!(
        "Let's play! Here's what's in the arcade: {}. Pick one and I'll open it for you.",
        GAME_CATALOG.join(", ")
    )
}

pub fn art_reply() -> String {
    "Let's make some art! I'm opening the art studio. Describe a mood, colours or shapes \
     and I'll turn them into a pattern."
        .to_string()
}

pub fn music_reply() -> String {
    "Let's make some music! I'm opening the music studio. Tell me a mood or a tempo \
     and I'll compose something to match."
        .to_string()
}

/// Reply for a detected emotion, naming the catalog label.
pub fn emotion_reply(record: &EmotionRecord) -> String {
    let opener = match record.emotion_name {
        "anxious" => "It sounds like you're carrying a lot of worry right now. Try a slow breath in for four counts and out for six.",
        "sad" => "I'm sorry you're feeling down. It's okay to feel sad, and I'm here to listen.",
        "angry" => "That sounds really frustrating. Want to tell me what happened?",
        "afraid" => "Feeling scared is hard. You're not alone in this; let's take it one step at a time.",
        "lonely" => "Feeling lonely is tough. I'm glad you reached out, and I'm happy to keep you company.",
        "tired" => "You sound worn out. Rest is productive too; be gentle with yourself today.",
        "happy" => "That's wonderful to hear! What's making today a good one?",
        "grateful" => "Gratitude is a lovely feeling. Thanks for sharing it with me.",
        "calm" => "It's great that you're feeling calm. Let's keep that peaceful energy going.",
        "loved" => "Feeling loved matters so much. I'm really glad you have that.",
        _ => "Thank you for sharing how you feel.",
    };
    format!(
        "{opener} (Mood: {}, mapped to {} at {} Hz in the {} catalog.)",
        record.emotion_name, record.basis_label, record.frequency_value, record.catalog
    )
}

/// Reply when the message reads as emotional but no known emotion word appears.
pub fn unnamed_feeling_reply() -> String {
    "Thank you for sharing how you feel. Would you like to tell me more about it?".to_string()
}
