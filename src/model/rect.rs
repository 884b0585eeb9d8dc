use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of a detection.
///
/// Stored as TLBR (top-left x, top-left y, bottom-right x, bottom-right y),
/// which is both the persisted array layout and the legacy CSV column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rect {
    /// Top-left x coordinate
    pub x1: f64,
    /// Top-left y coordinate
    pub y1: f64,
    /// Bottom-right x coordinate
    pub x2: f64,
    /// Bottom-right y coordinate
    pub y2: f64,
}

impl Rect {
    /// Create a Rect from TLBR coordinates.
    #[inline]
    pub fn from_tlbr(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// All four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.to_tlbr().iter().all(|c| c.is_finite())
    }
}

impl From<[f64; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self::from_tlbr(x1, y1, x2, y2)
    }
}

impl From<Rect> for [f64; 4] {
    fn from(rect: Rect) -> Self {
        rect.to_tlbr()
    }
}
