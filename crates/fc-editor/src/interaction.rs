//! Per-entity pointer interaction: drag start, move, resize, and the
//! two-press text-edit trigger.
//!
//! ```text
//! Unselected ─press─▶ Selected ─drag in inner box─▶ Moving   ─release─▶ Selected
//!                        │      ─drag on corner──▶ Resizing ─release─▶ Selected
//!                        └─press, press─▶ TextEditing ─Enter─▶ Selected
//! ```
//!
//! The editor owns the transitions into and out of `Selected`; everything
//! here mutates a single entity's own geometry and interaction record.

use fc_core::geom::Bounds;
use fc_core::model::{EditArm, Entity, ResizeHandle, SelectionState};
use fc_core::{Canvas, EditorConfig};
use kurbo::{Point, Size, Vec2};

/// What part of a selected box the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grab {
    /// The inner box: drag moves the entity.
    Body,
    /// A corner hot zone: drag resizes from that corner.
    Corner(ResizeHandle),
}

/// Square hot zone of side `zone` tucked into the given corner of `b`.
pub fn hot_zone(b: &Bounds, handle: ResizeHandle, zone: f64) -> Option<Bounds> {
    let (sx, sy) = handle.signs()?;
    let x = if sx > 0.0 { b.max_x() - zone } else { b.x() };
    let y = if sy > 0.0 { b.max_y() - zone } else { b.y() };
    Some(Bounds::from_xywh(x, y, zone, zone))
}

/// Classify a press at `p` on a box.
pub fn grab_at(b: &Bounds, p: Point, config: &EditorConfig) -> Option<Grab> {
    if b.inset(config.inner_inset).contains(p) {
        return Some(Grab::Body);
    }
    ResizeHandle::CORNERS
        .into_iter()
        .find(|&h| hot_zone(b, h, config.handle_hot_zone).is_some_and(|z| z.contains(p)))
        .map(Grab::Corner)
}

/// Enter `Moving` or `Resizing`, capturing the pointer-to-corner grips.
pub fn begin_drag(entity: &mut Entity, pointer: Point, grab: Grab) {
    let corners = entity.bound.corners();
    let ix = &mut entity.interaction;
    for (grip, corner) in ix.grips.iter_mut().zip(corners) {
        *grip = corner - pointer;
    }
    ix.edit_arm = EditArm::Idle;
    match grab {
        Grab::Body => {
            ix.state = SelectionState::Moving;
            ix.handle = ResizeHandle::None;
        }
        Grab::Corner(handle) => {
            ix.state = SelectionState::Resizing;
            ix.handle = handle;
        }
    }
    log::debug!("{} drag start {:?}", entity.id, entity.interaction.state);
}

/// Leave `Moving` / `Resizing`. Returns true if a drag was in progress.
pub fn end_drag(entity: &mut Entity) -> bool {
    match entity.interaction.state {
        SelectionState::Moving | SelectionState::Resizing => {
            entity.interaction.state = SelectionState::Selected;
            entity.interaction.handle = ResizeHandle::None;
            true
        }
        _ => false,
    }
}

/// Grip offset along one axis, kept so the pointer stays at least `inset`
/// inside a box of `extent`.
fn clamp_grip(grip: f64, extent: f64, inset: f64) -> f64 {
    let lo = -(extent - inset);
    let hi = -inset;
    if lo > hi {
        return -extent / 2.0;
    }
    grip.max(lo).min(hi)
}

/// Follow the pointer while `Moving`. Returns true if the box moved.
///
/// A candidate that leaves the canvas is clamped axis by axis. After a
/// clamp the grip on that axis is re-derived from the clamped box, so the
/// box does not lag behind when the pointer comes back.
pub fn drag_move(entity: &mut Entity, pointer: Point, canvas: &Canvas, config: &EditorConfig) -> bool {
    if entity.interaction.state != SelectionState::Moving {
        return false;
    }
    let grip = entity.interaction.grips[0];
    let candidate = entity.bound.with_origin(pointer + grip);
    if canvas.admits(&candidate) {
        entity.bound = candidate;
        return true;
    }

    let size = candidate.size();
    let (Some(x), Some(y)) = (
        canvas.clamp_x(candidate.x(), size.width),
        canvas.clamp_y(candidate.y(), size.height),
    ) else {
        log::debug!("{} move rejected: larger than canvas", entity.id);
        return false;
    };
    let clamped = candidate.with_origin(Point::new(x, y));
    if !canvas.admits(&clamped) {
        return false;
    }

    let mut grip = grip;
    if x != candidate.x() {
        grip.x = clamp_grip(x - pointer.x, size.width, config.grip_inset);
    }
    if y != candidate.y() {
        grip.y = clamp_grip(y - pointer.y, size.height, config.grip_inset);
    }
    set_grips(entity, grip, size);
    entity.bound = clamped;
    true
}

/// Re-derive all four corner grips from the top-left one.
fn set_grips(entity: &mut Entity, top_left: Vec2, size: Size) {
    entity.interaction.grips = [
        top_left,
        top_left + Vec2::new(size.width, 0.0),
        top_left + Vec2::new(0.0, size.height),
        top_left + Vec2::new(size.width, size.height),
    ];
}

/// Follow the pointer with the latched corner while `Resizing`.
/// Returns true if the box changed.
///
/// The opposite corner is the anchor. Each axis is floored at
/// `min_node_size`; a floored axis keeps its edge on the anchor. Results
/// that leave the canvas are rejected outright.
pub fn drag_resize(
    entity: &mut Entity,
    pointer: Point,
    canvas: &Canvas,
    config: &EditorConfig,
) -> bool {
    if entity.interaction.state != SelectionState::Resizing {
        return false;
    }
    let handle = entity.interaction.handle;
    let (Some(corner), Some((sx, sy))) = (handle.corner_index(), handle.signs()) else {
        return false;
    };
    let b = entity.bound;
    let moving = pointer + entity.interaction.grips[corner];
    let min = config.min_node_size;

    let (x, width) = resize_axis(sx, b.x(), b.max_x(), moving.x, min);
    let (y, height) = resize_axis(sy, b.y(), b.max_y(), moving.y, min);
    let candidate = Bounds::from_xywh(x, y, width, height);
    if !canvas.admits(&candidate) {
        log::trace!("{} resize rejected: {candidate:?} leaves canvas", entity.id);
        return false;
    }
    let changed = candidate != b;
    entity.bound = candidate;
    changed
}

/// One axis of a resize: `(origin, extent)` given the moving edge.
fn resize_axis(sign: f64, lo: f64, hi: f64, moving: f64, min: f64) -> (f64, f64) {
    if sign > 0.0 {
        let anchor = lo;
        (anchor, (moving - anchor).max(min))
    } else {
        let anchor = hi;
        let extent = (anchor - moving).max(min);
        (anchor - extent, extent)
    }
}

/// What a press on the already-selected entity did to its edit arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPress {
    Armed,
    EditStarted,
    Ignored,
}

/// Two-step label edit trigger: the first press arms, the next press while
/// still armed enters `TextEditing`. Connectors carry no label.
pub fn press_selected(entity: &mut Entity, frame: u64) -> EditPress {
    if entity.is_connector() || entity.interaction.state != SelectionState::Selected {
        return EditPress::Ignored;
    }
    match entity.interaction.edit_arm {
        EditArm::Idle => {
            entity.interaction.edit_arm = EditArm::Armed;
            EditPress::Armed
        }
        EditArm::Armed => {
            entity.interaction.edit_arm = EditArm::Idle;
            entity.interaction.state = SelectionState::TextEditing;
            entity.label.edit_started = frame;
            log::debug!("{} text editing", entity.id);
            EditPress::EditStarted
        }
    }
}

/// Leave `TextEditing`. Returns true if editing was active.
pub fn finish_editing(entity: &mut Entity) -> bool {
    if entity.interaction.state != SelectionState::TextEditing {
        return false;
    }
    entity.interaction.state = SelectionState::Selected;
    true
}
