//! L4 Atomic Layer: static skew of the container

use tracing::debug;

use crate::host::{StyleProperty, Surface};

/// Cross-axis growth per degree of skew, applied in both vh and vw
pub const MIN_HEIGHT_FACTOR: f64 = 1.25;

const SKEW_PROPERTIES: [StyleProperty; 3] = [
    StyleProperty::TransformOrigin,
    StyleProperty::Transform,
    StyleProperty::MinHeight,
];

/// Inline values the skew overwrote, restored on revert
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkewSnapshot {
    previous: Vec<(StyleProperty, Option<String>)>,
}

/// The three declarations written for `angle` degrees
pub fn skew_declarations(angle: f64) -> [(StyleProperty, String); 3] {
    let grow = angle.abs() * MIN_HEIGHT_FACTOR;
    [
        (StyleProperty::TransformOrigin, "center center".to_string()),
        (StyleProperty::Transform, format!("skew(0deg, {}deg)", angle)),
        (
            StyleProperty::MinHeight,
            format!("calc({}vh + {}vw)", grow, grow),
        ),
    ]
}

/// Skew the container along the vertical axis
pub fn apply_skew<S: Surface + ?Sized>(surface: &mut S, angle: f64) -> SkewSnapshot {
    let previous = SKEW_PROPERTIES
        .iter()
        .map(|&property| (property, surface.style(property)))
        .collect();

    for (property, value) in skew_declarations(angle) {
        surface.set_style(property, value);
    }

    debug!(angle, "Applied skew");
    SkewSnapshot { previous }
}

/// Put back exactly what `apply_skew` replaced
pub fn revert_skew<S: Surface + ?Sized>(surface: &mut S, snapshot: SkewSnapshot) {
    for (property, value) in snapshot.previous {
        match value {
            Some(value) => surface.set_style(property, value),
            None => surface.remove_style(property),
        }
    }
    debug!("Reverted skew");
}
