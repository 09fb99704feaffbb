// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the `understory_quadtree` demos.

use kurbo::{Point, Rect};

/// Horizontal advance of every glyph in the toy monospace font.
pub const ADVANCE: f64 = 9.0;
/// Height of one text line.
pub const LINE_HEIGHT: f64 = 16.0;

/// Monospace layout with greedy wrapping at `wrap_width`.
///
/// Yields one box per character, tagged with the character's byte index. Newlines
/// start a new line and get no box.
pub fn layout_monospace(text: &str, wrap_width: f64) -> Vec<(Rect, usize)> {
    let mut boxes = Vec::with_capacity(text.len());
    let mut pen = Point::ZERO;
    for (index, ch) in text.char_indices() {
        if ch == '\n' || pen.x + ADVANCE > wrap_width {
            pen = Point::new(0.0, pen.y + LINE_HEIGHT);
            if ch == '\n' {
                continue;
            }
        }
        let glyph = Rect::new(pen.x, pen.y, pen.x + ADVANCE, pen.y + LINE_HEIGHT);
        boxes.push((glyph, index));
        pen.x += ADVANCE;
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_skips_newlines() {
        let boxes = layout_monospace("ab\ncd", 100.0);
        let indices: Vec<usize> = boxes.iter().map(|(_, i)| *i).collect();
        assert_eq!(indices, vec![0, 1, 3, 4]);
        let second_line = Rect::new(0.0, LINE_HEIGHT, ADVANCE, 2.0 * LINE_HEIGHT);
        assert_eq!(boxes[2].0, second_line);

        let wrapped = layout_monospace("abc", 2.0 * ADVANCE);
        assert_eq!(wrapped[2].0.origin(), Point::new(0.0, LINE_HEIGHT));
    }
}
