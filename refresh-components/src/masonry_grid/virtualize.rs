//! Virtualization policy and visible window computation.
//!
//! A virtualized grid keeps its container at a fixed height and mounts only
//! items that intersect the scroll window widened by an overscan buffer.
//! Columns keep reporting their full height, so every item can still be
//! scrolled into view.

use std::{fmt, str::FromStr};

use refresh_ui::Px;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fallback-height items assumed visible when the container height
/// cannot be resolved.
const DEFAULT_VIEWPORT_ITEMS: usize = 8;

/// When the grid virtualizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualizationMode {
    /// Always render every item.
    #[default]
    Disabled,
    /// Virtualize once the item count exceeds the threshold.
    Threshold(usize),
    /// Always virtualize.
    Always,
}

impl VirtualizationMode {
    /// Returns `true` if a grid with `item_count` items virtualizes.
    pub fn applies_to(self, item_count: usize) -> bool {
        match self {
            Self::Disabled => false,
            Self::Threshold(threshold) => item_count > threshold,
            Self::Always => true,
        }
    }
}

/// Height of a virtualized container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContainerHeightRepr", into = "String")]
pub enum ContainerHeight {
    /// An absolute height.
    Fixed(Px),
    /// A fraction of the viewport height; `"80vh"` parses to `0.8`.
    ViewportRelative(f32),
}

impl Default for ContainerHeight {
    fn default() -> Self {
        Self::ViewportRelative(0.8)
    }
}

impl ContainerHeight {
    /// Resolves the height against the viewport height.
    ///
    /// Returns `None` when the result is not positive, for example while the
    /// viewport is unmeasured.
    pub fn resolve(self, viewport_height: Px) -> Option<Px> {
        let height = match self {
            Self::Fixed(height) => height,
            Self::ViewportRelative(fraction) => viewport_height.mul_f32(fraction),
        };
        (height > Px::ZERO).then_some(height)
    }

    /// Resolves the height, estimating it from the item height when it cannot
    /// be resolved.
    pub fn resolve_or_estimate(self, viewport_height: Px, estimated_item: Px) -> Px {
        self.resolve(viewport_height)
            .unwrap_or_else(|| estimated_item.saturating_mul_count(DEFAULT_VIEWPORT_ITEMS))
    }
}

/// Errors from parsing a [`ContainerHeight`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerHeightParseError {
    /// The value is neither a pixel count nor a `vh` fraction.
    #[error("invalid container height {0:?}, expected pixels like \"600px\" or \"80vh\"")]
    Invalid(String),
    /// The value parsed but is not positive.
    #[error("container height {0:?} must be positive")]
    NotPositive(String),
}

impl FromStr for ContainerHeight {
    type Err = ContainerHeightParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ContainerHeightParseError::Invalid(s.to_owned());
        if let Some(number) = trimmed.strip_suffix("vh") {
            let percent: f32 = number.trim().parse().map_err(|_| invalid())?;
            if !percent.is_finite() || percent <= 0.0 {
                return Err(ContainerHeightParseError::NotPositive(s.to_owned()));
            }
            return Ok(Self::ViewportRelative(percent / 100.0));
        }
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
        let pixels: i32 = number.parse().map_err(|_| invalid())?;
        if pixels <= 0 {
            return Err(ContainerHeightParseError::NotPositive(s.to_owned()));
        }
        Ok(Self::Fixed(Px(pixels)))
    }
}

impl fmt::Display for ContainerHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(height) => write!(f, "{height}"),
            Self::ViewportRelative(fraction) => write!(f, "{}vh", fraction * 100.0),
        }
    }
}

impl From<ContainerHeight> for String {
    fn from(height: ContainerHeight) -> Self {
        height.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContainerHeightRepr {
    Pixels(i32),
    Text(String),
}

impl TryFrom<ContainerHeightRepr> for ContainerHeight {
    type Error = ContainerHeightParseError;

    fn try_from(repr: ContainerHeightRepr) -> Result<Self, Self::Error> {
        match repr {
            ContainerHeightRepr::Pixels(pixels) if pixels > 0 => Ok(Self::Fixed(Px(pixels))),
            ContainerHeightRepr::Pixels(pixels) => {
                Err(ContainerHeightParseError::NotPositive(pixels.to_string()))
            }
            ContainerHeightRepr::Text(text) => text.parse(),
        }
    }
}

/// Vertical range of content that is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleWindow {
    /// Top edge, inclusive.
    pub start: Px,
    /// Bottom edge, inclusive.
    pub end: Px,
}

impl VisibleWindow {
    /// Computes the window for a scroll offset, container height and overscan.
    pub fn new(scroll_offset: Px, container_height: Px, overscan: Px) -> Self {
        let overscan = overscan.max(Px::ZERO);
        let scroll_offset = scroll_offset.max(Px::ZERO);
        Self {
            start: scroll_offset.saturating_sub(overscan).max(Px::ZERO),
            end: scroll_offset
                .saturating_add(container_height.max(Px::ZERO))
                .saturating_add(overscan),
        }
    }

    /// Returns `true` if an item spanning `offset..offset + height` is inside
    /// the window.
    pub fn intersects(&self, offset: Px, height: Px) -> bool {
        let item_end = offset.saturating_add(height);
        item_end >= self.start && offset <= self.end
    }
}

/// Largest valid scroll offset for a content and container height.
pub fn max_scroll_offset(content_height: Px, container_height: Px) -> Px {
    content_height.saturating_sub(container_height).max(Px::ZERO)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(VirtualizationMode::Disabled, 10_000, false)]
    #[case(VirtualizationMode::Threshold(50), 50, false)]
    #[case(VirtualizationMode::Threshold(50), 51, true)]
    #[case(VirtualizationMode::Threshold(50), 10, false)]
    #[case(VirtualizationMode::Always, 0, true)]
    fn test_mode_applies(
        #[case] mode: VirtualizationMode,
        #[case] count: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(mode.applies_to(count), expected);
    }

    #[rstest]
    #[case("80vh", ContainerHeight::ViewportRelative(0.8))]
    #[case(" 50 vh", ContainerHeight::ViewportRelative(0.5))]
    #[case("600px", ContainerHeight::Fixed(Px(600)))]
    #[case("420", ContainerHeight::Fixed(Px(420)))]
    fn test_parse_container_height(#[case] text: &str, #[case] expected: ContainerHeight) {
        assert_eq!(text.parse::<ContainerHeight>(), Ok(expected));
    }

    #[rstest]
    #[case("tall")]
    #[case("vh")]
    #[case("12em")]
    fn test_parse_rejects_garbage(#[case] text: &str) {
        assert_eq!(
            text.parse::<ContainerHeight>(),
            Err(ContainerHeightParseError::Invalid(text.to_owned()))
        );
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(matches!(
            "0px".parse::<ContainerHeight>(),
            Err(ContainerHeightParseError::NotPositive(_))
        ));
        assert!(matches!(
            "-10vh".parse::<ContainerHeight>(),
            Err(ContainerHeightParseError::NotPositive(_))
        ));
    }

    #[test]
    fn test_container_height_from_json() {
        let fixed: ContainerHeight = serde_json::from_str("600").expect("pixels");
        assert_eq!(fixed, ContainerHeight::Fixed(Px(600)));
        let relative: ContainerHeight = serde_json::from_str(r#""75vh""#).expect("vh");
        assert_eq!(relative, ContainerHeight::ViewportRelative(0.75));
        assert!(serde_json::from_str::<ContainerHeight>("-1").is_err());
    }

    #[test]
    fn test_resolve_relative_height() {
        let height = ContainerHeight::ViewportRelative(0.5);
        assert_eq!(height.resolve(Px(900)), Some(Px(450)));
        assert_eq!(height.resolve(Px::ZERO), None);
        assert_eq!(height.resolve_or_estimate(Px::ZERO, Px(100)), Px(800));
    }

    #[test]
    fn test_window_intersection() {
        let window = VisibleWindow::new(Px(1000), Px(500), Px(100));
        assert_eq!(window, VisibleWindow { start: Px(900), end: Px(1600) });
        assert!(window.intersects(Px(850), Px(60)));
        assert!(!window.intersects(Px(700), Px(150)));
        assert!(window.intersects(Px(1600), Px(10)));
        assert!(!window.intersects(Px(1601), Px(10)));
    }

    #[test]
    fn test_window_clamps_at_top() {
        let window = VisibleWindow::new(Px(20), Px(300), Px(200));
        assert_eq!(window.start, Px::ZERO);
        assert_eq!(window.end, Px(520));
    }

    #[test]
    fn test_max_scroll_offset() {
        assert_eq!(max_scroll_offset(Px(3000), Px(800)), Px(2200));
        assert_eq!(max_scroll_offset(Px(300), Px(800)), Px::ZERO);
    }
}
