#![forbid(unsafe_code)]

//! Resize and collapse state of the sidebar.
//!
//! Independent of content routing. A drag on the resizer handle changes the
//! width continuously; releasing it either keeps the new width or, below
//! [`MIN_WIDTH_PX`], collapses the sidebar while remembering the width to
//! restore on the next expand. A press and release that barely moved is a
//! click and toggles instead.
//!
//! # Invariants
//!
//! 1. `expand_width >= min_width` at all times.
//! 2. Only the pointer that started a drag can move or end it.
//! 3. Preferences are written after every completed gesture or toggle.
//!
//! # Failure Modes
//!
//! A store that refuses a write is logged at `warn`; the in-memory state
//! still changes.

use std::rc::Rc;

use rapid_core::PersistentStore;

use crate::config::SidebarConfig;

pub const MIN_WIDTH_PX: f64 = 240.0;
pub const DEFAULT_WIDTH_PX: f64 = 400.0;
pub const CLICK_TOLERANCE_PX: f64 = 4.0;

pub const COLLAPSED_KEY: &str = "inspector.collapsed";
pub const WIDTH_KEY: &str = "inspector.width";

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: u32,
    /// 0 is the primary button.
    pub button: u16,
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    #[must_use]
    pub const fn primary(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            button: 0,
            x,
            y,
        }
    }
}

/// What a released gesture did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// Not our pointer, or no drag in progress.
    Ignored,
    Resized { width_px: f64 },
    /// Released below the minimum width.
    Collapsed,
    /// Barely moved: treated as a click on the handle.
    Toggled { collapsed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    pointer_id: u32,
    start: (f64, f64),
    last_x: f64,
    last_width: f64,
}

pub struct SidebarResizer {
    storage: Rc<dyn PersistentStore>,
    min_width: f64,
    click_tolerance: f64,
    rtl: bool,
    collapsed: bool,
    expand_width: f64,
    drag: Option<Drag>,
    locked: bool,
}

impl std::fmt::Debug for SidebarResizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidebarResizer")
            .field("collapsed", &self.collapsed)
            .field("expand_width", &self.expand_width)
            .field("drag", &self.drag)
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

impl SidebarResizer {
    /// Restore the stored layout preference.
    #[must_use]
    pub fn load(storage: Rc<dyn PersistentStore>, config: &SidebarConfig, rtl: bool) -> Self {
        let collapsed = storage.get_item(COLLAPSED_KEY).as_deref() == Some("true");
        let stored = storage
            .get_item(WIDTH_KEY)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|w| w.is_finite())
            .unwrap_or(config.default_width_px);
        let expand_width = stored.max(config.min_width_px);
        tracing::debug!(message = "sidebar.layout.load", collapsed, expand_width);
        Self {
            storage,
            min_width: config.min_width_px,
            click_tolerance: config.click_tolerance_px,
            rtl,
            collapsed,
            expand_width,
            drag: None,
            locked: false,
        }
    }

    #[must_use]
    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    /// Width to restore on expand.
    #[must_use]
    pub fn expand_width(&self) -> f64 {
        self.expand_width
    }

    /// Width currently on screen.
    #[must_use]
    pub fn width_px(&self) -> f64 {
        match self.drag {
            Some(drag) => drag.last_width,
            None if self.collapsed => 0.0,
            None => self.expand_width,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Dragged below the minimum; releasing now would collapse.
    #[must_use]
    pub fn is_collapsing(&self) -> bool {
        self.drag.is_some_and(|d| d.last_width < self.min_width)
    }

    /// Block toggling, e.g. during the walkthrough.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn set_rtl(&mut self, rtl: bool) {
        self.rtl = rtl;
    }

    /// Start a drag. Returns false if one is already running or the button
    /// is not the primary one.
    pub fn pointer_down(&mut self, pointer: Pointer) -> bool {
        if self.drag.is_some() || pointer.button != 0 {
            return false;
        }
        let width = self.width_px();
        self.drag = Some(Drag {
            pointer_id: pointer.id,
            start: (pointer.x, pointer.y),
            last_x: pointer.x,
            last_width: width,
        });
        true
    }

    /// Follow the drag; returns the new width.
    pub fn pointer_move(&mut self, pointer: Pointer) -> Option<f64> {
        let scale = if self.rtl { -1.0 } else { 1.0 };
        let drag = self.drag.as_mut().filter(|d| d.pointer_id == pointer.id)?;
        let dx = (pointer.x - drag.last_x) * scale;
        drag.last_x = pointer.x;
        drag.last_width += dx;
        Some(drag.last_width)
    }

    /// End the drag (pointer up or cancel).
    pub fn pointer_up(&mut self, pointer: Pointer) -> ResizeOutcome {
        let Some(drag) = self.drag.filter(|d| d.pointer_id == pointer.id) else {
            return ResizeOutcome::Ignored;
        };
        self.drag = None;

        let end_width = drag.last_width;
        let end_collapsed = end_width < self.min_width;
        // Collapsing by drag keeps the width the user had before.
        if !end_collapsed {
            self.expand_width = end_width;
        }
        self.collapsed = end_collapsed;

        let dist = (pointer.x - drag.start.0).hypot(pointer.y - drag.start.1);
        if dist < self.click_tolerance {
            return if self.toggle() {
                ResizeOutcome::Toggled {
                    collapsed: self.collapsed,
                }
            } else {
                ResizeOutcome::Ignored
            };
        }

        self.store_preferences();
        tracing::debug!(
            message = "sidebar.resize",
            width = end_width,
            collapsed = end_collapsed
        );
        if end_collapsed {
            ResizeOutcome::Collapsed
        } else {
            ResizeOutcome::Resized {
                width_px: end_width,
            }
        }
    }

    /// Flip between collapsed and expanded. Refused while locked.
    pub fn toggle(&mut self) -> bool {
        if self.locked {
            tracing::debug!(message = "sidebar.toggle.locked");
            return false;
        }
        self.collapsed = !self.collapsed;
        self.store_preferences();
        tracing::debug!(message = "sidebar.toggle", collapsed = self.collapsed);
        true
    }

    pub fn expand(&mut self) -> bool {
        self.collapsed && self.toggle()
    }

    pub fn collapse(&mut self) -> bool {
        !self.collapsed && self.toggle()
    }

    fn store_preferences(&self) {
        let collapsed = if self.collapsed { "true" } else { "false" };
        let width = format!("{}", self.expand_width.round());
        for (key, value) in [(COLLAPSED_KEY, collapsed), (WIDTH_KEY, width.as_str())] {
            if let Err(err) = self.storage.set_item(key, value) {
                tracing::warn!(message = "sidebar.layout.store_failed", key, error = %err);
            }
        }
    }
}
