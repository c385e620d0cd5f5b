use rand::seq::SliceRandom;
use uuid::Uuid;

/// Length of every opaque token handed to the site service.
pub const TOKEN_LEN: usize = 25;

/// Palette the session color tag is drawn from.
pub const COLOR_NAMES: [&str; 23] = [
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "brown", "black", "white",
    "gray", "cyan", "magenta", "lime", "teal", "indigo", "violet", "gold", "silver", "maroon",
    "olive", "navy", "aqua",
];

/// Source of session/lecture identifiers and session color tags.
pub trait IdGenerator {
    /// A fresh `TOKEN_LEN`-character opaque token.
    fn unique_id(&self) -> String;

    fn color(&self) -> String;
}

/// Tokens cut from random (v4) UUIDs, which draw on OS randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn unique_id(&self) -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(TOKEN_LEN);
        token
    }

    fn color(&self) -> String {
        COLOR_NAMES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("gray")
            .to_string()
    }
}
