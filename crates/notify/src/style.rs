// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bubble sizing and screen-anchor placement.
//!
//! Grounded on `original_source/plugins/nd/src/style.c` (width clamp
//! defaults: `min_width` 200, `max_width` -1/unlimited) and
//! `notification.c`'s `_eventd_nd_notification_refresh_list` placement
//! loop (anchor-relative `bx`/`by` walk, `bottom` stacking direction).

/// Screen corner/edge a queue's notifications stack from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    fn is_right(self) -> bool {
        matches!(self, Anchor::TopRight | Anchor::BottomRight)
    }
    fn is_center(self) -> bool {
        matches!(self, Anchor::Top | Anchor::Bottom)
    }
    fn is_bottom(self) -> bool {
        matches!(self, Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight)
    }
}

/// Per-queue bubble style: width clamp and placement geometry.
///
/// Resolved Open Question (DESIGN.md #3): `min_width` always sets the
/// bubble's logical width floor before any RTL mirroring is applied —
/// text direction only changes where content sits *within* that width,
/// never the width computation itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub min_width: i32,
    /// `<= 0` means unlimited.
    pub max_width: i32,
    pub padding: i32,
    pub border: i32,
    pub spacing: i32,
    pub margin_x: i32,
    pub margin_y: i32,
    pub anchor: Anchor,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            min_width: 200,
            max_width: -1,
            padding: 8,
            border: 1,
            spacing: 4,
            margin_x: 8,
            margin_y: 8,
            anchor: Anchor::TopRight,
        }
    }
}

impl Style {
    /// Clamp a bubble's natural content width to `[min_width, max_width]`
    /// (`max_width <= 0` leaves the upper bound open).
    pub fn clamp_width(&self, content_width: i32) -> i32 {
        let w = content_width.max(self.min_width);
        if self.max_width > 0 {
            w.min(self.max_width)
        } else {
            w
        }
    }

    pub fn border_size(&self, content_width: i32, content_height: i32) -> (i32, i32) {
        let w = self.clamp_width(content_width) + 2 * (self.padding + self.border);
        let h = content_height + 2 * (self.padding + self.border);
        (w, h)
    }
}

/// A screen/output rectangle the queue stacks notifications within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
}

/// Compute the top-left `(x, y)` position for each bubble in `sizes`
/// (already in visible-list order), stacked from `style.anchor` outward.
pub fn layout(style: &Style, geometry: Geometry, sizes: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let anchor = style.anchor;
    let mut bx = style.margin_x;
    let mut by = style.margin_y;
    if anchor.is_center() {
        bx = geometry.width;
    } else if anchor.is_right() {
        bx = geometry.width - bx;
    }
    if anchor.is_bottom() {
        by = geometry.height - by;
    }

    let mut positions = Vec::with_capacity(sizes.len());
    for &(w, h) in sizes {
        if anchor.is_bottom() {
            by -= h;
        }
        let x = if anchor.is_center() {
            (bx / 2) - (w / 2)
        } else if anchor.is_right() {
            bx - w
        } else {
            bx
        };
        positions.push((x, by));
        if anchor.is_bottom() {
            by -= style.spacing;
        } else {
            by += h + style.spacing;
        }
    }
    positions
}

#[cfg(test)]
#[path = "style_tests.rs"]
mod tests;
