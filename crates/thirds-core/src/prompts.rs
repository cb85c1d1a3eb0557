//! Daily photography themes.

use rand::Rng;
use rand::seq::IndexedRandom;

/// The themes a daily prompt is drawn from.
pub const PHOTO_PROMPTS: [&str; 10] = [
    "a close-up of colorful autumn leaves",
    "reflections in a still pond",
    "a portrait shot in natural window light",
    "symmetry in architectural structures",
    "a city skyline at golden hour",
    "interesting shadow and light patterns",
    "street photography capturing candid moments",
    "a macro shot of a vibrant flower",
    "a silhouette against a sunset sky",
    "abstract textures and patterns",
];

/// Pick a theme using `rng`.
pub fn pick_prompt<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PHOTO_PROMPTS.choose(rng).copied().unwrap_or(PHOTO_PROMPTS[0])
}

/// Pick a theme using the thread-local generator.
pub fn daily_prompt() -> &'static str {
    pick_prompt(&mut rand::rng())
}
