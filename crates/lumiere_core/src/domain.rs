//! crates/lumiere_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// The ambient lighting color of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightingColor {
    Original,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl LightingColor {
    /// The colors a generation session attempts, in the order it attempts them.
    pub const GENERATED: [LightingColor; 6] = [
        LightingColor::Red,
        LightingColor::Orange,
        LightingColor::Yellow,
        LightingColor::Green,
        LightingColor::Blue,
        LightingColor::Purple,
    ];

    /// The display label, also used verbatim in generation prompts.
    pub fn label(self) -> &'static str {
        match self {
            LightingColor::Original => "Original",
            LightingColor::Red => "Red",
            LightingColor::Orange => "Orange",
            LightingColor::Yellow => "Yellow",
            LightingColor::Green => "Green",
            LightingColor::Blue => "Blue",
            LightingColor::Purple => "Purple",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        [LightingColor::Original]
            .into_iter()
            .chain(Self::GENERATED)
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for LightingColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A static catalog entry that can be dropped onto the room canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image: String,
    pub description: String,
}

/// A normalized canvas position, both axes in percent of the canvas size.
///
/// Constructed only through [`Position::clamped`], so both coordinates are
/// always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

fn clamp_percent(value: f64) -> f64 {
    // NaN has no meaningful place on the canvas; pin it to the origin.
    if value.is_nan() {
        return Position::MIN;
    }
    value.clamp(Position::MIN, Position::MAX)
}

/// A product anchored on the room canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedProduct {
    pub unique_id: Uuid,
    pub product: Product,
    pub position: Position,
}

/// An uploaded room photo, already normalized to JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomImage {
    pub id: Uuid,
    pub jpeg: Bytes,
}

impl RoomImage {
    pub fn new(jpeg: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            jpeg,
        }
    }
}

/// One lighting-variant result of a generation session.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub id: Uuid,
    pub jpeg: Bytes,
    pub color: LightingColor,
    pub created_at: DateTime<Utc>,
}

/// A completed generation session, kept in the in-memory history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub id: Uuid,
    pub original: RoomImage,
    /// The original image first, then every successful variant in generation order.
    pub generated_variants: Vec<GeneratedImage>,
    pub date: DateTime<Utc>,
}
