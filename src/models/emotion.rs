use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reference data seeded by migration; read-only at runtime. Ids are short
/// slugs ("joy", "sadness", ...) rather than UUIDs so clients can key display
/// themes off them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Emotion {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color_primary: String,
    pub color_secondary: String,
}
