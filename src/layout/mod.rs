//! Geometry helpers shared by the window manager, taskbar and icon grid.

use ratatui::prelude::Rect;

use crate::window::FloatRect;

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

/// The part of a signed rectangle that lands inside `bounds`.
pub fn float_rect_visible(rect: FloatRect, bounds: Rect) -> Rect {
    let x0 = rect.x.max(bounds.x as i32);
    let y0 = rect.y.max(bounds.y as i32);
    let x1 = (rect.x + rect.width as i32).min(bounds.x as i32 + bounds.width as i32);
    let y1 = (rect.y + rect.height as i32).min(bounds.y as i32 + bounds.height as i32);
    if x1 <= x0 || y1 <= y0 {
        return Rect::default();
    }
    Rect {
        x: x0 as u16,
        y: y0 as u16,
        width: (x1 - x0) as u16,
        height: (y1 - y0) as u16,
    }
}

/// Keep a window's title bar reachable: the top row stays inside `bounds`
/// vertically and at least `margin` columns stay visible horizontally.
///
/// An empty `bounds` (nothing laid out yet) leaves the rect untouched.
pub fn clamp_to_bounds(rect: FloatRect, bounds: Rect, margin: u16) -> FloatRect {
    if bounds.width == 0 || bounds.height == 0 {
        return rect;
    }
    let margin = margin.min(rect.width).max(1) as i32;
    let min_x = bounds.x as i32 - rect.width as i32 + margin;
    let max_x = bounds.x as i32 + bounds.width as i32 - margin;
    let min_y = bounds.y as i32;
    let max_y = bounds.y as i32 + bounds.height as i32 - 1;
    FloatRect {
        x: rect.x.clamp(min_x, max_x.max(min_x)),
        y: rect.y.clamp(min_y, max_y.max(min_y)),
        ..rect
    }
}

/// Linear interpolation between two rectangles; `t` is clamped to `0..=1`.
pub fn lerp_rect(from: FloatRect, to: FloatRect, t: f32) -> FloatRect {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: f32, b: f32| a + (b - a) * t;
    FloatRect {
        x: mix(from.x as f32, to.x as f32).round() as i32,
        y: mix(from.y as f32, to.y as f32).round() as i32,
        width: mix(from.width as f32, to.width as f32).round().max(1.0) as u16,
        height: mix(from.height as f32, to.height as f32).round().max(1.0) as u16,
    }
}

/// Shrink `rect` around its center by `scale`, never below one cell.
pub fn scale_rect(rect: FloatRect, scale: f32) -> FloatRect {
    let width = ((rect.width as f32 * scale).round() as u16).max(1);
    let height = ((rect.height as f32 * scale).round() as u16).max(1);
    FloatRect {
        x: rect.x + (rect.width as i32 - width as i32) / 2,
        y: rect.y + (rect.height as i32 - height as i32) / 2,
        width,
        height,
    }
}

/// Cubic ease-out; matches the feel of a CSS `ease-out` transition.
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr(x: i32, y: i32, width: u16, height: u16) -> FloatRect {
        FloatRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn rect_contains_edge_cases() {
        let r = Rect::new(2, 2, 3, 2);
        assert!(rect_contains(r, 2, 2));
        assert!(rect_contains(r, 4, 3));
        assert!(!rect_contains(r, 5, 3));
        assert!(!rect_contains(r, 4, 4));
        assert!(!rect_contains(Rect::new(0, 0, 0, 5), 0, 0));
    }

    #[test]
    fn float_rect_visible_clips_negative_offsets() {
        let bounds = Rect::new(0, 0, 80, 24);
        let visible = float_rect_visible(fr(-5, 3, 20, 6), bounds);
        assert_eq!(visible, Rect::new(0, 3, 15, 6));
        assert_eq!(float_rect_visible(fr(-50, 3, 20, 6), bounds), Rect::default());
    }

    #[test]
    fn clamp_keeps_title_bar_reachable() {
        let bounds = Rect::new(0, 0, 80, 23);
        let clamped = clamp_to_bounds(fr(-40, -3, 20, 6), bounds, 4);
        assert_eq!(clamped.x, -16);
        assert_eq!(clamped.y, 0);
        let clamped = clamp_to_bounds(fr(200, 40, 20, 6), bounds, 4);
        assert_eq!(clamped.x, 76);
        assert_eq!(clamped.y, 22);
    }

    #[test]
    fn clamp_ignores_empty_bounds() {
        let rect = fr(-9, -9, 10, 4);
        assert_eq!(clamp_to_bounds(rect, Rect::default(), 4), rect);
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = fr(10, 10, 40, 12);
        let b = fr(2, 22, 8, 1);
        assert_eq!(lerp_rect(a, b, 0.0), a);
        assert_eq!(lerp_rect(a, b, 1.0), b);
        let mid = lerp_rect(a, b, 0.5);
        assert_eq!(mid.x, 6);
        assert_eq!(mid.y, 16);
    }

    #[test]
    fn scale_rect_keeps_center() {
        let scaled = scale_rect(fr(0, 0, 40, 10), 0.2);
        assert_eq!(scaled, fr(16, 4, 8, 2));
    }

    #[test]
    fn ease_out_is_monotonic() {
        let mut last = 0.0;
        for step in 0..=10 {
            let v = ease_out(step as f32 / 10.0);
            assert!(v >= last);
            last = v;
        }
        assert!((ease_out(1.0) - 1.0).abs() < f32::EPSILON);
    }
}
