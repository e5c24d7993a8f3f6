use super::Anchor;

/// Destination rectangle of the scaled watermark inside the photo, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Computes where the watermark goes.
///
/// The watermark always spans the full photo width with its aspect ratio kept,
/// so `x` is always 0 and only `y` depends on the anchor. Offsets are rounded
/// and clamped at 0, which keeps a watermark taller than the photo pinned to the top.
pub fn compute(photo_w: u32, photo_h: u32, mark_w: u32, mark_h: u32, anchor: Anchor) -> Placement {
    let w = photo_w;
    let h = if mark_w == 0 {
        0.0
    } else {
        (f64::from(mark_h) / f64::from(mark_w) * f64::from(photo_w)).round()
    };

    let y = match anchor {
        Anchor::Top | Anchor::TopLeft | Anchor::TopRight => 0.0,
        Anchor::Center => ((f64::from(photo_h) - h) / 2.0).round(),
        Anchor::Bottom | Anchor::BottomLeft | Anchor::BottomRight => f64::from(photo_h) - h,
    };

    Placement {
        x: 0,
        y: y.max(0.0) as u32,
        w,
        h: h as u32,
    }
}
