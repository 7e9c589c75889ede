//! The editor context.
//!
//! `Editor` owns everything mutable: the diagram, the spatial index, the
//! canvas, the active tool, the selection, and the pointer. Hosts feed it
//! input events and call [`Editor::process_frame`] once per displayed frame.
//! All mutation happens on the caller's thread, one event at a time.

use crate::caret::{FrameCounter, caret_visible};
use crate::connector::{self, BindError};
use crate::input::{InputEvent, Key, MouseButton};
use crate::interaction::{self, EditPress};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{self, ToolMode};
use fc_core::geom::Bounds;
use fc_core::id::EntityId;
use fc_core::model::{ConnectorStatus, Entity, SelectionState, ShapeKind};
use fc_core::{Canvas, ConfigError, Diagram, EditorConfig, QuadTree};
use fc_render::paint::{self, ConnectorPaint, Frame, LabelRenderer};
use fc_render::hit;
use kurbo::Point;
use std::collections::HashMap;

pub struct Editor {
    config: EditorConfig,
    canvas: Canvas,
    diagram: Diagram,
    /// Rebuilt from `diagram` at the start of every frame.
    index: QuadTree<EntityId>,
    tool: ToolMode,
    selected: Option<EntityId>,
    /// Connector currently following the pointer.
    drawing: Option<EntityId>,
    pointer: Point,
    /// Pointer travel since the previous move event.
    velocity: f64,
    left_down: bool,
    /// The current press already had its one chance to start a drag.
    grab_tried: bool,
    clock: FrameCounter,
    last_bind_error: Option<BindError>,
}

impl Editor {
    /// Create an editor over a `width × height` canvas.
    pub fn new(config: EditorConfig, width: f64, height: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let canvas = Canvas::new(width, height, config.margins);
        let index = QuadTree::new(canvas.bounds(), config.split_policy());
        Ok(Self {
            config,
            canvas,
            diagram: Diagram::new(),
            index,
            tool: ToolMode::default(),
            selected: None,
            drawing: None,
            pointer: Point::ZERO,
            velocity: 0.0,
            left_down: false,
            grab_tried: false,
            clock: FrameCounter::default(),
            last_bind_error: None,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn index(&self) -> &QuadTree<EntityId> {
        &self.index
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.now()
    }

    /// Why the most recent connector failed to bind, if it did.
    pub fn last_bind_error(&self) -> Option<&BindError> {
        self.last_bind_error.as_ref()
    }

    // ─── Diagram edits ───────────────────────────────────────────────────

    /// Add a shape on top of the draw order. It is indexed immediately so it
    /// can be hit before the next frame.
    pub fn add_shape(&mut self, kind: ShapeKind, bound: Bounds) -> EntityId {
        let entity = Entity::shape(kind, bound);
        let filed = entity.index_bound();
        let id = self.diagram.push(entity);
        self.index.insert(id, filed);
        log::debug!("added {id} at {bound:?}");
        id
    }

    /// Remove an entity and every connector attached to it.
    pub fn delete(&mut self, id: EntityId) -> Vec<EntityId> {
        let removed = self.diagram.remove(id);
        if self.selected.is_some_and(|s| removed.contains(&s)) {
            self.selected = None;
        }
        if self.drawing.is_some_and(|d| removed.contains(&d)) {
            self.drawing = None;
        }
        removed
    }

    /// Remove the selected entity, unless its label is being edited.
    pub fn delete_selected(&mut self) -> Vec<EntityId> {
        match self.selected_entity() {
            Some(e) if e.state() != SelectionState::TextEditing => {
                let id = e.id;
                self.delete(id)
            }
            _ => Vec::new(),
        }
    }

    // ─── Selection and tools ─────────────────────────────────────────────

    fn selected_entity(&self) -> Option<&Entity> {
        self.selected.and_then(|id| self.diagram.get(id))
    }

    fn selected_entity_mut(&mut self) -> Option<&mut Entity> {
        self.selected.and_then(|id| self.diagram.get_mut(id))
    }

    /// Select `id`, bringing it to the front. Any previous selection drops
    /// back to `Unselected`.
    pub fn select(&mut self, id: EntityId) {
        if self.selected == Some(id) {
            return;
        }
        self.deselect();
        let Some(entity) = self.diagram.get_mut(id) else {
            return;
        };
        entity.interaction.state = SelectionState::Selected;
        self.diagram.bring_to_front(id);
        self.selected = Some(id);
        log::debug!("selected {id}");
    }

    pub fn deselect(&mut self) {
        if let Some(entity) = self.selected_entity_mut() {
            entity.unselect();
            log::debug!("deselected {}", entity.id);
        }
        self.selected = None;
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        if tool == self.tool {
            return;
        }
        if !tool.is_selection() {
            self.deselect();
        }
        log::debug!("tool {:?} -> {tool:?}", self.tool);
        self.tool = tool;
    }

    // ─── Event intake ────────────────────────────────────────────────────

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::Button { button, pressed } => self.on_mouse_button(button, pressed),
            InputEvent::Key { key, pressed } => self.on_key_event(key, pressed),
            InputEvent::Char(c) => self.on_char_event(c),
            InputEvent::Resize { width, height } => self.on_resize(width, height),
        }
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        let previous = self.pointer;
        self.pointer = Point::new(x, y);
        self.velocity = (self.pointer - previous).hypot();

        if let Some(id) = self.drawing {
            if let Some(entity) = self.diagram.get_mut(id) {
                if let Some(c) = entity.as_connector_mut() {
                    c.end_point = self.pointer;
                    c.status = ConnectorStatus::Drawing;
                }
                entity.sync_connector_bound();
            }
            return;
        }
        if !self.left_down || !self.tool.is_selection() {
            return;
        }
        self.drag(previous);
    }

    /// Continue a drag, or start one on the first move after a press. A
    /// press that misses both the inner box and the corners never drags.
    fn drag(&mut self, previous: Point) {
        let Some(id) = self.selected else {
            return;
        };
        let state = match self.diagram.get(id) {
            Some(e) if !e.is_connector() => e.state(),
            _ => return,
        };
        if state == SelectionState::Selected {
            if std::mem::replace(&mut self.grab_tried, true) {
                return;
            }
            let pad = self.velocity * 2.0;
            if hit::pick_topmost(&self.diagram, &self.index, previous, pad) != Some(id) {
                return;
            }
            let Some(entity) = self.diagram.get_mut(id) else {
                return;
            };
            let Some(grab) = interaction::grab_at(&entity.bound, previous, &self.config) else {
                return;
            };
            interaction::begin_drag(entity, previous, grab);
        }

        let (pointer, canvas, config) = (self.pointer, self.canvas, &self.config);
        let Some(entity) = self.diagram.get_mut(id) else {
            return;
        };
        match entity.state() {
            SelectionState::Moving => {
                interaction::drag_move(entity, pointer, &canvas, config);
            }
            SelectionState::Resizing => {
                interaction::drag_resize(entity, pointer, &canvas, config);
            }
            _ => {}
        }
    }

    /// Raw button intake: `index` is the host's button number.
    pub fn on_button(&mut self, index: u32, pressed: bool) {
        self.on_mouse_button(MouseButton::from_index(index), pressed);
    }

    fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        self.left_down = pressed;
        if pressed {
            self.grab_tried = false;
            self.press();
        } else {
            self.release();
        }
    }

    fn press(&mut self) {
        let pointer = self.pointer;
        if self.canvas.in_palette(pointer) {
            match ToolMode::from_palette(&self.canvas, self.config.palette_slot, pointer) {
                Some(tool) => self.set_tool(tool),
                None => log::debug!("press below the palette slots at {pointer:?}"),
            }
            return;
        }
        match self.tool {
            ToolMode::Selection => self.press_select(),
            ToolMode::PlacingNode(kind) => {
                match tools::placement(&self.canvas, self.config.node_size(), pointer) {
                    Some(bound) => {
                        self.add_shape(kind, bound);
                    }
                    None => log::debug!("no room for a {kind:?} at {pointer:?}"),
                }
            }
            ToolMode::DrawingConnector => {
                // A release got lost: settle the old connector where it stands.
                if let Some(pending) = self.drawing.take() {
                    self.finish_connector(pending);
                }
                let mut entity = Entity::connector(pointer, self.config.connector_tolerance);
                if let Some(c) = entity.as_connector_mut() {
                    c.status = ConnectorStatus::Drawing;
                }
                self.drawing = Some(self.diagram.push(entity));
            }
        }
    }

    fn press_select(&mut self) {
        let Some(hit) = hit::pick_topmost(&self.diagram, &self.index, self.pointer, self.velocity)
        else {
            self.deselect();
            return;
        };
        if self.selected != Some(hit) {
            self.select(hit);
            return;
        }
        let frame = self.clock.now();
        if let Some(entity) = self.diagram.get_mut(hit)
            && interaction::press_selected(entity, frame) == EditPress::EditStarted
        {
            log::debug!("{hit} editing label {:?}", entity.label.text);
        }
    }

    fn release(&mut self) {
        if let Some(id) = self.drawing.take() {
            self.finish_connector(id);
        }
        if let Some(entity) = self.selected_entity_mut() {
            interaction::end_drag(entity);
        }
    }

    fn finish_connector(&mut self, id: EntityId) {
        if let Some(entity) = self.diagram.get_mut(id) {
            if let Some(c) = entity.as_connector_mut() {
                c.end_point = self.pointer;
            }
            entity.sync_connector_bound();
        }
        match connector::bind(&mut self.diagram, &self.index, id) {
            Ok(_) => {
                self.last_bind_error = None;
                if let Some(entity) = self.diagram.get(id) {
                    self.index.insert(id, entity.index_bound());
                }
            }
            Err(err) => {
                log::debug!("connector {id} failed: {err}");
                if let Some(c) = self.diagram.get_mut(id).and_then(Entity::as_connector_mut) {
                    c.status = ConnectorStatus::Failed;
                }
                self.delete(id);
                self.last_bind_error = Some(err);
            }
        }
    }

    /// Raw key intake: `code` is a GLFW key code.
    pub fn on_key(&mut self, code: i32, pressed: bool) {
        self.on_key_event(Key::from_code(code), pressed);
    }

    fn on_key_event(&mut self, key: Key, pressed: bool) {
        if !pressed {
            return;
        }
        if let Some(entity) = self.selected_entity_mut()
            && entity.state() == SelectionState::TextEditing
        {
            match key {
                Key::Enter | Key::Escape => {
                    interaction::finish_editing(entity);
                }
                Key::Backspace => {
                    entity.label.text.pop();
                }
                _ => {}
            }
            return;
        }
        match ShortcutMap::resolve(key) {
            Some(ShortcutAction::Tool(tool)) => self.set_tool(tool),
            Some(ShortcutAction::Delete) => {
                self.delete_selected();
            }
            Some(ShortcutAction::Deselect) => self.deselect(),
            None => {}
        }
    }

    /// Raw text intake: `codepoint` is a Unicode scalar value.
    pub fn on_char(&mut self, codepoint: u32) {
        if let Some(c) = char::from_u32(codepoint) {
            self.on_char_event(c);
        }
    }

    fn on_char_event(&mut self, c: char) {
        if let Some(entity) = self.selected_entity_mut()
            && entity.state() == SelectionState::TextEditing
        {
            entity.label.text.push(c);
        }
    }

    pub fn on_resize(&mut self, width: f64, height: f64) {
        self.canvas.width = width.max(0.0);
        self.canvas.height = height.max(0.0);
        log::debug!("canvas {}x{}", self.canvas.width, self.canvas.height);
    }

    // ─── Frame ───────────────────────────────────────────────────────────

    /// Rebuild derived state and produce this frame's display list.
    ///
    /// Connector endpoints are re-derived from their ports, the index is
    /// rebuilt over the canvas, completed connectors are trimmed, and every
    /// shape label goes to `labels`.
    pub fn process_frame(&mut self, width: f64, height: f64, labels: &mut dyn LabelRenderer) -> Frame {
        if width != self.canvas.width || height != self.canvas.height {
            self.on_resize(width, height);
        }
        self.refresh_connectors();
        self.index.rebuild(
            self.canvas.bounds(),
            self.diagram.iter().map(|e| (e.id, e.index_bound())),
        );
        let now = self.clock.tick();

        let trims: HashMap<EntityId, ConnectorPaint> = self
            .diagram
            .iter()
            .filter(|e| e.is_connector())
            .filter_map(|e| {
                connector::trim(&self.diagram, &self.index, e.id).map(|t| (e.id, t.paint()))
            })
            .collect();
        let mut frame = paint::paint_diagram(&self.diagram, self.config.handle_size, |e| {
            trims.get(&e.id).copied().unwrap_or(ConnectorPaint::Hidden)
        });
        frame.preview = self.preview();

        let period = self.config.caret_blink_period;
        paint::paint_labels(&self.diagram, self.config.inner_inset, labels, |e| {
            e.state() == SelectionState::TextEditing
                && caret_visible(now.wrapping_sub(e.label.edit_started), period)
        });
        frame
    }

    /// Re-derive every completed connector's endpoints. Connectors whose
    /// shapes vanished are dropped.
    fn refresh_connectors(&mut self) {
        let completed: Vec<EntityId> = self
            .diagram
            .iter()
            .filter(|e| {
                e.as_connector()
                    .is_some_and(|c| c.status == ConnectorStatus::Completed)
            })
            .map(|e| e.id)
            .collect();
        for id in completed {
            if let Err(err) = connector::refresh_endpoints(&mut self.diagram, id) {
                log::warn!("dropping connector {id}: {err}");
                self.delete(id);
            }
        }
    }

    fn preview(&self) -> Option<paint::ShapePaint> {
        let ToolMode::PlacingNode(kind) = self.tool else {
            return None;
        };
        if self.canvas.in_palette(self.pointer) {
            return None;
        }
        let bound = tools::placement(&self.canvas, self.config.node_size(), self.pointer)?;
        Some(paint::shape_paint(kind, bound, false, self.config.handle_size))
    }
}
