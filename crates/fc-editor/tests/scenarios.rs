//! Integration tests: end-to-end editor scenarios (fc-editor).
//!
//! Drives the public `Editor` API the way a host window would: pointer
//! moves, button presses, key codes, and one `process_frame` per frame.

use fc_core::geom::Bounds;
use fc_core::id::EntityId;
use fc_core::model::{ConnectorStatus, SelectionState, ShapeKind};
use fc_core::EditorConfig;
use fc_editor::connector::{self, TrimOutcome};
use fc_editor::{BindError, Editor, ToolMode};
use fc_render::{ConnectorPaint, Frame, PaintItem};
use kurbo::Point;
use pretty_assertions::assert_eq;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 800.0;
const LEFT: u32 = 0;
const KEY_DELETE: i32 = 261;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor() -> Editor {
    init();
    Editor::new(EditorConfig::default(), WIDTH, HEIGHT).unwrap()
}

fn frame(ed: &mut Editor) -> Frame {
    ed.process_frame(WIDTH, HEIGHT, &mut ())
}

fn click(ed: &mut Editor, x: f64, y: f64) {
    ed.on_pointer_move(x, y);
    ed.on_button(LEFT, true);
    ed.on_button(LEFT, false);
}

fn drag(ed: &mut Editor, from: Point, to: Point) {
    ed.on_pointer_move(from.x, from.y);
    ed.on_button(LEFT, true);
    ed.on_pointer_move(to.x, to.y);
    ed.on_button(LEFT, false);
}

fn connectors(ed: &Editor) -> Vec<EntityId> {
    ed.diagram()
        .iter()
        .filter(|e| e.is_connector())
        .map(|e| e.id)
        .collect()
}

fn draw_connector(ed: &mut Editor, from: Point, to: Point) -> Option<EntityId> {
    ed.set_tool(ToolMode::DrawingConnector);
    let before = connectors(ed);
    drag(ed, from, to);
    ed.set_tool(ToolMode::Selection);
    connectors(ed).into_iter().find(|id| !before.contains(id))
}

fn connector_paint(frame: &Frame, id: EntityId) -> ConnectorPaint {
    frame
        .items
        .iter()
        .find_map(|item| match item {
            PaintItem::Connector { id: cid, paint, .. } if *cid == id => Some(*paint),
            _ => None,
        })
        .expect("connector painted")
}

fn depth(ed: &Editor, id: EntityId) -> usize {
    ed.diagram().get(id).unwrap().depth
}

// ─── Scenario A: index split ─────────────────────────────────────────────

#[test]
fn seven_shapes_split_the_index() {
    let mut ed = editor();
    let bounds: Vec<Bounds> = (0..7)
        .map(|i| Bounds::from_xywh(120.0 + 60.0 * i as f64, 40.0 + 50.0 * i as f64, 1.0, 1.0))
        .collect();
    for b in &bounds {
        ed.add_shape(ShapeKind::Process, *b);
    }
    frame(&mut ed);

    let root = ed.index().root();
    assert!(!root.is_leaf());
    assert_eq!(root.children().map(|c| c.len()), Some(4));
    for (e, b) in ed.diagram().iter().zip(&bounds) {
        assert!(ed.index().retrieve(b).contains(&e.id));
    }
}

// ─── Scenario B: occlusion ───────────────────────────────────────────────

#[test]
fn shape_on_top_of_a_connector_trims_it() {
    let mut ed = editor();
    ed.add_shape(ShapeKind::Process, Bounds::from_xywh(150.0, 200.0, 100.0, 100.0));
    ed.add_shape(ShapeKind::Process, Bounds::from_xywh(650.0, 200.0, 100.0, 100.0));
    let c = draw_connector(&mut ed, Point::new(200.0, 250.0), Point::new(700.0, 250.0))
        .expect("connector bound");

    let f = frame(&mut ed);
    assert_eq!(
        connector_paint(&f, c),
        ConnectorPaint::Visible(kurbo::Line::new((250.0, 250.0), (650.0, 250.0)))
    );

    ed.add_shape(ShapeKind::Process, Bounds::from_xywh(400.0, 150.0, 100.0, 200.0));
    let f = frame(&mut ed);
    let trim = connector::trim(ed.diagram(), ed.index(), c).unwrap();
    for p in [trim.visible_start, trim.visible_end] {
        assert!(p.x > 250.0 && p.x < 650.0, "{p:?} not strictly inside");
    }
    assert_eq!(trim.outcome, TrimOutcome::Hidden);
    assert_eq!(connector_paint(&f, c), ConnectorPaint::Hidden);

    // Binding is untouched by occlusion.
    let conn = ed.diagram().get(c).unwrap().as_connector().unwrap();
    assert_eq!(conn.status, ConnectorStatus::Completed);
}

#[test]
fn connector_follows_a_moved_shape() {
    let mut ed = editor();
    ed.add_shape(ShapeKind::Process, Bounds::from_xywh(150.0, 200.0, 100.0, 100.0));
    let b = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(650.0, 200.0, 100.0, 100.0));
    let c = draw_connector(&mut ed, Point::new(200.0, 250.0), Point::new(700.0, 250.0)).unwrap();
    frame(&mut ed);

    click(&mut ed, 700.0, 250.0);
    assert_eq!(ed.selected(), Some(b));
    drag(&mut ed, Point::new(700.0, 250.0), Point::new(700.0, 450.0));
    assert_eq!(ed.diagram().get(b).unwrap().bound, Bounds::from_xywh(650.0, 400.0, 100.0, 100.0));

    let f = frame(&mut ed);
    assert_eq!(
        connector_paint(&f, c),
        ConnectorPaint::Visible(kurbo::Line::new((250.0, 250.0), (650.0, 450.0)))
    );
}

#[test]
fn connector_near_a_split_line_can_be_picked() {
    let mut ed = editor();
    ed.add_shape(ShapeKind::Process, Bounds::from_xywh(120.0, 348.0, 100.0, 100.0));
    let b = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(340.0, 348.0, 100.0, 100.0));
    let c = draw_connector(&mut ed, Point::new(170.0, 398.0), Point::new(390.0, 398.0)).unwrap();
    for i in 0..6 {
        let y = if i < 3 { 100.0 } else { 550.0 };
        ed.add_shape(
            ShapeKind::Process,
            Bounds::from_xywh(600.0 + 100.0 * (i % 3) as f64, y, 50.0, 50.0),
        );
    }
    frame(&mut ed);
    assert!(!ed.index().root().is_leaf());

    // 3 px below the line, across the root's horizontal centre line.
    ed.on_pointer_move(280.0, 401.0);
    ed.on_pointer_move(280.0, 401.0);
    ed.on_button(LEFT, true);
    ed.on_button(LEFT, false);
    assert_eq!(ed.selected(), Some(c));

    ed.on_key(KEY_DELETE, true);
    assert!(connectors(&ed).is_empty());
    assert!(ed.diagram().contains(b));
}

#[test]
fn second_press_settles_a_connector_left_drawing() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(150.0, 200.0, 100.0, 100.0));
    let b = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(650.0, 200.0, 100.0, 100.0));
    ed.set_tool(ToolMode::DrawingConnector);
    ed.on_pointer_move(200.0, 250.0);
    ed.on_button(LEFT, true);
    ed.on_pointer_move(700.0, 250.0);
    // The release never arrives.
    ed.on_button(LEFT, true);
    ed.on_button(LEFT, false);

    let ids = connectors(&ed);
    assert_eq!(ids.len(), 1);
    let conn = ed.diagram().get(ids[0]).unwrap().as_connector().unwrap();
    assert_eq!(conn.status, ConnectorStatus::Completed);
    assert!(conn.references(a) && conn.references(b));
    assert_eq!(ed.last_bind_error(), Some(&BindError::SameShape));

    let f = frame(&mut ed);
    assert!(matches!(connector_paint(&f, ids[0]), ConnectorPaint::Visible(_)));
}

// ─── Scenario C: failed binding ──────────────────────────────────────────

#[test]
fn connector_from_empty_space_is_removed() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(150.0, 200.0, 100.0, 100.0));
    let c = draw_connector(&mut ed, Point::new(600.0, 600.0), Point::new(200.0, 250.0));
    assert_eq!(c, None);
    assert_eq!(ed.last_bind_error(), Some(&BindError::NoShapeAtStart));
    assert_eq!(ed.diagram().ids(), vec![a]);
}

#[test]
fn connector_within_one_shape_is_removed() {
    let mut ed = editor();
    ed.add_shape(ShapeKind::Process, Bounds::from_xywh(150.0, 200.0, 100.0, 100.0));
    assert_eq!(
        draw_connector(&mut ed, Point::new(170.0, 220.0), Point::new(230.0, 280.0)),
        None
    );
    assert_eq!(ed.last_bind_error(), Some(&BindError::SameShape));
    assert!(connectors(&ed).is_empty());
}

// ─── Scenario D: bring to front ──────────────────────────────────────────

#[test]
fn selecting_brings_to_front_and_keeps_depth_dense() {
    let mut ed = editor();
    let ids: Vec<EntityId> = (0..5)
        .map(|i| {
            ed.add_shape(
                ShapeKind::Process,
                Bounds::from_xywh(110.0 + 170.0 * i as f64, 100.0, 150.0, 100.0),
            )
        })
        .collect();
    frame(&mut ed);
    assert_eq!(depth(&ed, ids[2]), 2);

    click(&mut ed, 525.0, 150.0);
    assert_eq!(ed.selected(), Some(ids[2]));
    assert_eq!(depth(&ed, ids[2]), 4);
    for (before, id) in ids.iter().enumerate() {
        let after = depth(&ed, *id);
        if *id != ids[2] {
            assert!(before - after <= 1, "{id} moved from {before} to {after}");
        }
    }
    let mut depths: Vec<usize> = ed.diagram().iter().map(|e| e.depth).collect();
    depths.sort_unstable();
    assert_eq!(depths, vec![0, 1, 2, 3, 4]);
}

#[test]
fn pressing_empty_space_deselects() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(200.0, 200.0, 150.0, 100.0));
    click(&mut ed, 275.0, 250.0);
    assert_eq!(ed.selected(), Some(a));
    click(&mut ed, 800.0, 700.0);
    assert_eq!(ed.selected(), None);
    assert_eq!(ed.diagram().get(a).unwrap().state(), SelectionState::Unselected);
}

// ─── Scenario E: move clamping ───────────────────────────────────────────

#[test]
fn dragging_past_the_right_margin_clamps() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(600.0, 300.0, 150.0, 100.0));
    click(&mut ed, 675.0, 350.0);
    drag(&mut ed, Point::new(675.0, 350.0), Point::new(5000.0, 350.0));

    let bound = ed.diagram().get(a).unwrap().bound;
    assert_eq!(bound.max_x(), WIDTH - ed.config().margins.right);
    assert_eq!(bound.y(), 300.0);
    assert_eq!(ed.diagram().get(a).unwrap().state(), SelectionState::Selected);
}

#[test]
fn resize_from_a_corner_handle() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(200.0, 200.0, 150.0, 100.0));
    click(&mut ed, 275.0, 250.0);
    drag(&mut ed, Point::new(345.0, 295.0), Point::new(395.0, 345.0));
    assert_eq!(ed.diagram().get(a).unwrap().bound, Bounds::from_xywh(200.0, 200.0, 200.0, 150.0));

    // Shrinking past the floor stops at the minimum size.
    drag(&mut ed, Point::new(395.0, 345.0), Point::new(0.0, 0.0));
    assert_eq!(ed.diagram().get(a).unwrap().bound, Bounds::from_xywh(200.0, 200.0, 50.0, 50.0));
}

#[test]
fn press_on_the_border_ring_never_drags() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(200.0, 200.0, 150.0, 100.0));

    // Between the inner box and the corner hot zones, then into the body.
    ed.on_pointer_move(205.0, 250.0);
    ed.on_button(LEFT, true);
    assert_eq!(ed.selected(), Some(a));
    ed.on_pointer_move(260.0, 250.0);
    ed.on_pointer_move(300.0, 260.0);
    assert_eq!(ed.diagram().get(a).unwrap().state(), SelectionState::Selected);
    ed.on_button(LEFT, false);
    assert_eq!(ed.diagram().get(a).unwrap().bound, Bounds::from_xywh(200.0, 200.0, 150.0, 100.0));

    // The next press gets its own chance.
    drag(&mut ed, Point::new(275.0, 250.0), Point::new(325.0, 250.0));
    assert_eq!(ed.diagram().get(a).unwrap().bound, Bounds::from_xywh(250.0, 200.0, 150.0, 100.0));
}

// ─── Cascade delete ──────────────────────────────────────────────────────

#[test]
fn deleting_a_shape_removes_its_connectors() {
    let mut ed = editor();
    let a = ed.add_shape(ShapeKind::Process, Bounds::from_xywh(150.0, 200.0, 100.0, 100.0));
    let b = ed.add_shape(ShapeKind::Decision, Bounds::from_xywh(650.0, 200.0, 100.0, 100.0));
    let d = ed.add_shape(ShapeKind::InputOutput, Bounds::from_xywh(400.0, 500.0, 150.0, 100.0));
    let ab = draw_connector(&mut ed, Point::new(200.0, 250.0), Point::new(700.0, 250.0)).unwrap();
    let bd = draw_connector(&mut ed, Point::new(700.0, 250.0), Point::new(475.0, 550.0)).unwrap();
    frame(&mut ed);

    click(&mut ed, 200.0, 250.0);
    assert_eq!(ed.selected(), Some(a));
    ed.on_key(KEY_DELETE, true);

    assert_eq!(ed.selected(), None);
    assert!(ed.diagram().get(a).is_none());
    assert!(ed.diagram().get(ab).is_none());
    assert!(ed.diagram().get(bd).is_some());
    assert_eq!(ed.diagram().len(), 3);
    assert!(ed.diagram().contains(b) && ed.diagram().contains(d));

    // Stale index entries are harmless until the next rebuild.
    click(&mut ed, 200.0, 250.0);
    assert_eq!(ed.selected(), None);
    frame(&mut ed);
}
