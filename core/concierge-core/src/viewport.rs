//! Viewport classification.
//!
//! The shell reports raw widths; everything downstream only cares whether the
//! viewport is mobile or desktop. [`Viewport`] publishes the class on a watch
//! channel and only wakes subscribers when the class actually flips.

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    /// Widths strictly below `breakpoint_px` are mobile.
    pub fn from_width(width_px: u32, breakpoint_px: u32) -> Self {
        if width_px < breakpoint_px {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == ViewportClass::Mobile
    }
}

#[derive(Debug)]
pub struct Viewport {
    breakpoint_px: u32,
    tx: watch::Sender<ViewportClass>,
}

impl Viewport {
    pub fn new(initial_width_px: u32, breakpoint_px: u32) -> Self {
        let (tx, _rx) = watch::channel(ViewportClass::from_width(initial_width_px, breakpoint_px));
        Self { breakpoint_px, tx }
    }

    pub fn class(&self) -> ViewportClass {
        *self.tx.borrow()
    }

    /// Re-classifies for a new width. Returns true when the class changed.
    pub fn resize(&self, width_px: u32) -> bool {
        let next = ViewportClass::from_width(width_px, self.breakpoint_px);
        let changed = self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            tracing::debug!(width_px, class = ?next, "Viewport class changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewportClass> {
        self.tx.subscribe()
    }
}
