//! Device events to per-tick input
//!
//! Browsers deliver events between frames; the adapter latches them so that
//! every simulation tick sees one deterministic [`TickInput`]. One-shot intents
//! are consumed by the first tick that takes them.

use glam::Vec2;

use crate::settings::Difficulty;
use crate::sim::{Held, PointerState, TickInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other(String),
}

impl Key {
    /// From a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            " " | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }
}

/// Raw device event, positions already in field coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key, repeat: bool },
    KeyUp { key: Key },
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp,
    TouchStart(Vec2),
    TouchMove(Vec2),
    TouchEnd,
}

/// Map a client-space point into the game field, given the canvas rectangle
pub fn to_field(client: Vec2, rect_origin: Vec2, rect_size: Vec2, field: Vec2) -> Vec2 {
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return client - rect_origin;
    }
    (client - rect_origin) * (field / rect_size)
}

#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    /// One-shot intents waiting for the next tick
    pending: TickInput,
    held: Held,
    pointer: Option<Vec2>,
    dragging: bool,
    began: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key, repeat } => self.key_down(key, repeat),
            InputEvent::KeyUp { key } => self.set_held(&key, false),
            InputEvent::PointerDown(pos) | InputEvent::TouchStart(pos) => {
                self.pending.click = Some(pos);
                self.pointer = Some(pos);
                self.dragging = true;
                self.began = true;
            }
            InputEvent::PointerMove(pos) | InputEvent::TouchMove(pos) => self.pointer = Some(pos),
            InputEvent::PointerUp | InputEvent::TouchEnd => self.dragging = false,
        }
    }

    fn key_down(&mut self, key: Key, repeat: bool) {
        self.set_held(&key, true);
        if repeat {
            return;
        }
        match key {
            Key::Space | Key::Enter | Key::ArrowUp => self.pending.primary = true,
            Key::Escape | Key::Char('p') => self.pending.pause = true,
            Key::Char('r') => self.pending.reset = true,
            Key::Char('1') => self.request_difficulty(Difficulty::Easy),
            Key::Char('2') => self.request_difficulty(Difficulty::Medium),
            Key::Char('3') => self.request_difficulty(Difficulty::Hard),
            _ => {}
        }
    }

    fn set_held(&mut self, key: &Key, down: bool) {
        match key {
            Key::ArrowUp => self.held.up = down,
            Key::ArrowDown => self.held.down = down,
            Key::ArrowLeft => self.held.left = down,
            Key::ArrowRight => self.held.right = down,
            _ => {}
        }
    }

    /// Pause toggle from outside the keyboard (menu button, page hidden)
    pub fn request_pause(&mut self) {
        self.pending.pause = true;
    }

    pub fn request_reset(&mut self) {
        self.pending.reset = true;
    }

    pub fn request_difficulty(&mut self, difficulty: Difficulty) {
        self.pending.difficulty = Some(difficulty);
    }

    /// Drop held keys and drag state (window lost focus)
    pub fn release_all(&mut self) {
        self.held = Held::default();
        self.dragging = false;
    }

    /// Input for the next tick; one-shot intents are cleared
    pub fn take_tick_input(&mut self) -> TickInput {
        let mut input = std::mem::take(&mut self.pending);
        input.held = self.held;
        input.pointer = self.pointer.map(|pos| PointerState {
            pos,
            dragging: self.dragging,
            began: self.began,
        });
        self.began = false;
        input
    }
}
