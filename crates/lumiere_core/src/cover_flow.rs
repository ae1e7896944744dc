//! crates/lumiere_core/src/cover_flow.rs
//!
//! The vertical cover-flow view state: which result is centered, how input
//! gestures move it, and where every visible item sits relative to it.

/// Items farther than this from the center are not rendered.
pub const CULL_DISTANCE: usize = 4;
/// Vertical spacing between neighbouring items, in pixels.
pub const SPACING: f64 = 90.0;
/// Depth step per item of distance, in pixels (negative pushes back).
pub const DEPTH_STEP: f64 = -100.0;
/// Base tilt angle in degrees.
pub const TILT: f64 = 45.0;
/// Wheel deltas smaller than this are ignored.
pub const WHEEL_THRESHOLD: f64 = 10.0;
/// A touch has to travel more than this before it counts as a swipe.
pub const SWIPE_THRESHOLD: f64 = 40.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoverFlowError {
    #[error("Index {index} is out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Visual transform parameters of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemLayout {
    pub offset: i64,
    pub translate_y: f64,
    pub translate_z: f64,
    pub rotate_x: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i64,
}

impl ItemLayout {
    pub fn is_centered(&self) -> bool {
        self.offset == 0
    }
}

/// Computes the layout of the item at `index` when `center` is in front.
/// Returns `None` for items that are culled.
pub fn layout_of(index: usize, center: usize) -> Option<ItemLayout> {
    let offset = index as i64 - center as i64;
    let abs_offset = offset.unsigned_abs();
    if abs_offset > CULL_DISTANCE as u64 {
        return None;
    }

    let offset_f = offset as f64;
    let abs_f = abs_offset as f64;
    Some(ItemLayout {
        offset,
        translate_y: offset_f * SPACING,
        translate_z: abs_f * DEPTH_STEP,
        rotate_x: -offset_f * TILT * 0.8,
        scale: (1.0 - abs_f * 0.1).max(0.7),
        opacity: (1.0 - abs_f * 0.3).max(0.0),
        z_index: 100 - abs_offset as i64,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverFlow {
    len: usize,
    center: usize,
    swipe_anchor: Option<f64>,
}

impl CoverFlow {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            center: 0,
            swipe_anchor: None,
        }
    }

    /// Starts over for a new or changed item list.
    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn center(&self) -> usize {
        self.center
    }

    /// Moves one step in the direction of the sign of `direction`, staying
    /// inside the list. Zero, or moving past either end, changes nothing.
    pub fn move_by(&mut self, direction: i64) {
        if self.len == 0 {
            return;
        }
        let last = self.len - 1;
        self.center = match direction.signum() {
            1 => (self.center + 1).min(last),
            -1 => self.center.saturating_sub(1),
            _ => self.center,
        };
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), CoverFlowError> {
        if index >= self.len {
            return Err(CoverFlowError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.center = index;
        Ok(())
    }

    /// Handles a scroll-wheel event; returns whether it moved the view.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if delta_y.is_nan() || delta_y.abs() < WHEEL_THRESHOLD {
            return false;
        }
        let before = self.center;
        self.move_by(if delta_y > 0.0 { 1 } else { -1 });
        before != self.center
    }

    pub fn touch_start(&mut self, client_y: f64) {
        self.swipe_anchor = Some(client_y);
    }

    /// Handles a touch move; each swipe past the threshold moves one step and
    /// re-anchors at the current point. Returns whether the view moved.
    pub fn touch_move(&mut self, client_y: f64) -> bool {
        let Some(anchor) = self.swipe_anchor else {
            return false;
        };
        let diff = anchor - client_y;
        if diff.abs() <= SWIPE_THRESHOLD {
            return false;
        }
        let before = self.center;
        self.move_by(if diff > 0.0 { 1 } else { -1 });
        self.swipe_anchor = Some(client_y);
        before != self.center
    }

    pub fn touch_end(&mut self) {
        self.swipe_anchor = None;
    }

    pub fn layout_of(&self, index: usize) -> Option<ItemLayout> {
        if index >= self.len {
            return None;
        }
        layout_of(index, self.center)
    }

    /// Every rendered item with its layout, in list order.
    pub fn layouts(&self) -> Vec<(usize, ItemLayout)> {
        let first = self.center.saturating_sub(CULL_DISTANCE);
        let end = (self.center + CULL_DISTANCE + 1).min(self.len);
        (first..end)
            .filter_map(|i| layout_of(i, self.center).map(|l| (i, l)))
            .collect()
    }
}
