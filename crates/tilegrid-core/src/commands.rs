use std::collections::VecDeque;

use crate::error::{check_dimensions, Result};
use crate::geometry::{GridPos, GridRect};
use crate::layer::{Layer, LayerKind};
use crate::map::GridMap;
use crate::marker::Marker;
use crate::record::MapRecord;

/// A reversible edit for the undo/redo system.
pub trait Command: std::fmt::Debug + Send {
    /// Apply the edit to the map.
    fn execute(&mut self, map: &mut GridMap);
    /// Reverse the edit.
    fn undo(&mut self, map: &mut GridMap);
    /// Human-readable description for the undo/redo history.
    fn description(&self) -> &str;
}

// ══════════════════════════════════════════════════════════════════════
// Concrete Commands
// ══════════════════════════════════════════════════════════════════════

/// Paint one cell on one layer.
#[derive(Debug)]
pub struct SetCellCommand {
    pub kind: LayerKind,
    pub pos: GridPos,
    pub marker: Marker,
    /// The overwritten marker (set on execute, `None` when out of bounds).
    previous: Option<Marker>,
}

impl SetCellCommand {
    pub fn new(kind: LayerKind, x: i32, y: i32, marker: impl Into<Marker>) -> Self {
        Self {
            kind,
            pos: GridPos::new(x, y),
            marker: marker.into(),
            previous: None,
        }
    }
}

impl Command for SetCellCommand {
    fn execute(&mut self, map: &mut GridMap) {
        let layer = map.layer_mut(self.kind);
        let previous = layer.get(self.pos.x, self.pos.y).clone();
        self.previous = layer
            .set(self.pos.x, self.pos.y, self.marker.clone())
            .then_some(previous);
    }

    fn undo(&mut self, map: &mut GridMap) {
        if let Some(previous) = self.previous.take() {
            map.layer_mut(self.kind).set(self.pos.x, self.pos.y, previous);
        }
    }

    fn description(&self) -> &str {
        "Paint cell"
    }
}

/// Fill a rectangle of cells on one layer.
#[derive(Debug)]
pub struct FillRectCommand {
    pub kind: LayerKind,
    pub rect: GridRect,
    pub marker: Marker,
    /// Overwritten cells inside the map bounds.
    previous: Vec<(GridPos, Marker)>,
}

impl FillRectCommand {
    pub fn new(kind: LayerKind, x0: i32, y0: i32, x1: i32, y1: i32, marker: impl Into<Marker>) -> Self {
        Self {
            kind,
            rect: GridRect::new(x0, y0, x1, y1),
            marker: marker.into(),
            previous: Vec::new(),
        }
    }
}

impl Command for FillRectCommand {
    fn execute(&mut self, map: &mut GridMap) {
        let layer = map.layer_mut(self.kind);
        self.previous = match self.rect.clip(layer.width(), layer.height()) {
            Some(area) => area
                .positions()
                .map(|pos| (pos, layer.get(pos.x, pos.y).clone()))
                .collect(),
            None => Vec::new(),
        };
        layer.fill_area(self.rect, self.marker.clone());
    }

    fn undo(&mut self, map: &mut GridMap) {
        let layer = map.layer_mut(self.kind);
        for (pos, marker) in self.previous.drain(..) {
            layer.set(pos.x, pos.y, marker);
        }
    }

    fn description(&self) -> &str {
        "Fill rectangle"
    }
}

/// Erase every cell of one layer.
#[derive(Debug)]
pub struct ClearLayerCommand {
    pub kind: LayerKind,
    previous: Option<Layer>,
}

impl ClearLayerCommand {
    pub fn new(kind: LayerKind) -> Self {
        Self { kind, previous: None }
    }
}

impl Command for ClearLayerCommand {
    fn execute(&mut self, map: &mut GridMap) {
        let layer = map.layer_mut(self.kind);
        self.previous = Some(layer.clone());
        layer.clear();
    }

    fn undo(&mut self, map: &mut GridMap) {
        // Undo runs in stack order, so the map still has the saved size.
        if let Some(previous) = self.previous.take() {
            *map.layer_mut(self.kind) = previous;
        }
    }

    fn description(&self) -> &str {
        "Clear layer"
    }
}

/// Resize the whole map.
#[derive(Debug)]
pub struct ResizeCommand {
    pub width: u32,
    pub height: u32,
    /// Full snapshot taken before resizing, so cropped cells come back.
    previous: Option<MapRecord>,
}

impl ResizeCommand {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            previous: None,
        })
    }
}

impl Command for ResizeCommand {
    fn execute(&mut self, map: &mut GridMap) {
        self.previous = Some(map.export_data());
        if let Err(e) = map.resize(self.width, self.height) {
            log::warn!("Resize to {}x{} failed: {}", self.width, self.height, e);
        }
    }

    fn undo(&mut self, map: &mut GridMap) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = map.import_record(&previous) {
                log::warn!("Could not restore map before resize: {}", e);
            }
        }
    }

    fn description(&self) -> &str {
        "Resize map"
    }
}

/// Strokes kept by a [`CommandHistory`] built with [`CommandHistory::new`].
pub const DEFAULT_HISTORY_DEPTH: usize = 256;

/// Undo/redo journal for map edits.
///
/// At most `max_depth` strokes are kept; executing past that drops the
/// oldest one, which can then no longer be undone.
#[derive(Debug)]
pub struct CommandHistory {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_depth: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// A journal keeping at most `max_depth` strokes (at least one).
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn execute(&mut self, mut command: Box<dyn Command>, map: &mut GridMap) {
        command.execute(map);
        self.undo_stack.push_back(command);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.max_depth {
            if let Some(dropped) = self.undo_stack.pop_front() {
                log::debug!("History full, dropped '{}'", dropped.description());
            }
        }
    }

    pub fn undo(&mut self, map: &mut GridMap) -> bool {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return false;
        };
        log::debug!("Undo '{}'", command.description());
        command.undo(map);
        self.redo_stack.push(command);
        true
    }

    pub fn redo(&mut self, map: &mut GridMap) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("Redo '{}'", command.description());
        command.execute(map);
        self.undo_stack.push_back(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of strokes that can currently be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
