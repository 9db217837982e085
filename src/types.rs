//! Core types for spark-folio.
//!
//! Shared vocabulary for every component: region handles, page geometry,
//! root-margin edges and reveal delay ranks. Geometry is in page pixels,
//! with `y` growing downward like a document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

// =============================================================================
// Region
// =============================================================================

/// Handle identifying one observed region of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

// =============================================================================
// Rect
// =============================================================================

/// Axis-aligned rectangle in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area, treating negative extents as empty.
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles.
    ///
    /// Edge-adjacent rectangles produce a zero-area overlap rather than
    /// `None`, matching how browsers report a target touching the root.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }

        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grow each side by the matching edge (negative values shrink).
    pub fn expand(&self, edges: &Edges) -> Rect {
        Rect::new(
            self.x - edges.left,
            self.y - edges.top,
            self.width + edges.left + edges.right,
            self.height + edges.top + edges.bottom,
        )
    }

    /// Same rectangle moved by (dx, dy).
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

// =============================================================================
// Edges
// =============================================================================

/// Per-edge pixel offsets, written in CSS order: top, right, bottom, left.
///
/// Used as the viewport root margin. Serializes as a CSS margin string
/// (`"0px 0px -40px 0px"`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Parse a CSS margin shorthand of one to four pixel lengths.
    ///
    /// Follows CSS expansion: `a` → all sides, `a b` → vertical/horizontal,
    /// `a b c` → top/horizontal/bottom, `a b c d` → top/right/bottom/left.
    /// Bare `0` is accepted without a unit; every other value needs `px`.
    pub fn parse_css(input: &str) -> Result<Self> {
        let invalid = |reason: &'static str| FolioError::InvalidRootMargin {
            input: input.to_string(),
            reason,
        };

        let values = input
            .split_whitespace()
            .map(|token| parse_px(token).ok_or_else(|| invalid("expected a pixel length like `-40px`")))
            .collect::<Result<Vec<f32>>>()?;

        match values.as_slice() {
            [all] => Ok(Self::new(*all, *all, *all, *all)),
            [vertical, horizontal] => Ok(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Ok(Self::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            [] => Err(invalid("margin is empty")),
            _ => Err(invalid("at most four values are allowed")),
        }
    }
}

fn parse_px(token: &str) -> Option<f32> {
    let number = match token.strip_suffix("px") {
        Some(number) => number,
        None if token == "0" => token,
        None => return None,
    };
    number.parse::<f32>().ok().filter(|value| value.is_finite())
}

fn format_px(value: f32) -> String {
    if value == 0.0 {
        "0px".to_string()
    } else {
        format!("{value}px")
    }
}

impl fmt::Display for Edges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_px(self.top),
            format_px(self.right),
            format_px(self.bottom),
            format_px(self.left)
        )
    }
}

impl FromStr for Edges {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_css(s)
    }
}

impl TryFrom<String> for Edges {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_css(&value)
    }
}

impl From<Edges> for String {
    fn from(edges: Edges) -> Self {
        edges.to_string()
    }
}

// =============================================================================
// RevealDelay
// =============================================================================

/// Stagger rank (1..=4) for regions revealed at the same moment.
///
/// The controller never acts on it; the rank only feeds the presentation
/// class (`reveal-d{rank}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RevealDelay(u8);

impl RevealDelay {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(rank: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&rank) {
            Ok(Self(rank))
        } else {
            Err(FolioError::InvalidDelay(rank))
        }
    }

    pub fn rank(self) -> u8 {
        self.0
    }

    /// Presentation class for this rank, e.g. `reveal-d2`.
    pub fn class_name(self) -> String {
        format!("reveal-d{}", self.0)
    }
}

impl TryFrom<u8> for RevealDelay {
    type Error = FolioError;

    fn try_from(rank: u8) -> Result<Self> {
        Self::new(rank)
    }
}

impl From<RevealDelay> for u8 {
    fn from(delay: RevealDelay) -> Self {
        delay.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);

        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
        assert_eq!(a.intersection(&Rect::new(200.0, 0.0, 10.0, 10.0)), None);
    }

    #[test]
    fn test_rect_touching_edges_intersect_with_zero_area() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let below = Rect::new(0.0, 100.0, 100.0, 50.0);

        let overlap = a.intersection(&below).unwrap();
        assert_eq!(overlap.area(), 0.0);
    }

    #[test]
    fn test_rect_expand_negative_bottom() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let shrunk = viewport.expand(&Edges::new(0.0, 0.0, -40.0, 0.0));

        assert_eq!(shrunk, Rect::new(0.0, 0.0, 800.0, 560.0));
    }

    #[test]
    fn test_edges_parse_four_values() {
        let edges = Edges::parse_css("0px 0px -40px 0px").unwrap();
        assert_eq!(edges, Edges::new(0.0, 0.0, -40.0, 0.0));
    }

    #[test]
    fn test_edges_parse_shorthand() {
        assert_eq!(Edges::parse_css("10px").unwrap(), Edges::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(Edges::parse_css("5px 0").unwrap(), Edges::new(5.0, 0.0, 5.0, 0.0));
        assert_eq!(
            Edges::parse_css("1px 2px 3px").unwrap(),
            Edges::new(1.0, 2.0, 3.0, 2.0)
        );
    }

    #[test]
    fn test_edges_parse_rejects_garbage() {
        assert!(matches!(
            Edges::parse_css(""),
            Err(FolioError::InvalidRootMargin { .. })
        ));
        assert!(Edges::parse_css("10%").is_err());
        assert!(Edges::parse_css("1px 2px 3px 4px 5px").is_err());
        assert!(Edges::parse_css("abcpx").is_err());
    }

    #[test]
    fn test_edges_display_round_trips() {
        let edges = Edges::new(0.0, 0.0, -40.0, 0.0);
        assert_eq!(edges.to_string(), "0px 0px -40px 0px");
        assert_eq!(edges.to_string().parse::<Edges>().unwrap(), edges);
    }

    #[test]
    fn test_reveal_delay_bounds() {
        assert!(RevealDelay::new(0).is_err());
        assert_eq!(RevealDelay::new(1).unwrap().rank(), 1);
        assert_eq!(RevealDelay::new(4).unwrap().class_name(), "reveal-d4");
        assert!(matches!(RevealDelay::new(5), Err(FolioError::InvalidDelay(5))));
    }

    #[test]
    fn test_region_display() {
        assert_eq!(RegionId(7).to_string(), "region#7");
    }
}
