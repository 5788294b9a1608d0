//! Render-engine boundary.
//!
//! The crate composes configuration; an external engine draws it. `RenderEngine`
//! creates a live chart from an option tree and returns a handle exposing the
//! per-series update, redraw, and teardown operations the orchestrator drives.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::ChartOptions;
use crate::core::SeriesDataUpdate;

/// Live chart handle returned by a render engine.
///
/// Updates address series by the stable key assigned at build time. A handle
/// must tolerate updates for unknown keys as no-ops: a chart torn down while
/// loads are outstanding simply discards late resolutions.
pub trait ChartHandle {
    fn update_series(&mut self, key: &str, update: SeriesDataUpdate, redraw: bool);
    fn redraw(&mut self);
    /// Selects the engine's default visible range window (range-selector
    /// button index for stock-style engines).
    fn select_default_range(&mut self, button: usize);
    fn destroy(&mut self);
}

/// Contract implemented by any rendering backend.
pub trait RenderEngine {
    type Handle: ChartHandle;

    fn create(&mut self, container: &str, options: &ChartOptions) -> Self::Handle;
}

/// One recorded `update_series` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub key: String,
    pub update: SeriesDataUpdate,
    pub redraw: bool,
}

/// Call log shared between a `RecordingEngine` and the handles it creates.
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub created: usize,
    pub last_container: Option<String>,
    pub last_options: Option<ChartOptions>,
    pub updates: Vec<RecordedUpdate>,
    pub redraws: usize,
    pub selected_range: Option<usize>,
    pub destroyed: usize,
}

/// No-op engine used by tests and headless usage.
///
/// It records every call so tests can assert on the exact sequence of series
/// updates, redraws, and teardowns without a real backend.
#[derive(Debug, Default, Clone)]
pub struct RecordingEngine {
    log: Rc<RefCell<RecordingLog>>,
}

impl RecordingEngine {
    #[must_use]
    pub fn log(&self) -> Rc<RefCell<RecordingLog>> {
        Rc::clone(&self.log)
    }
}

impl RenderEngine for RecordingEngine {
    type Handle = RecordingHandle;

    fn create(&mut self, container: &str, options: &ChartOptions) -> Self::Handle {
        let mut log = self.log.borrow_mut();
        log.created += 1;
        log.last_container = Some(container.to_owned());
        log.last_options = Some(options.clone());
        drop(log);
        RecordingHandle {
            log: Rc::clone(&self.log),
        }
    }
}

/// Handle created by `RecordingEngine`.
#[derive(Debug)]
pub struct RecordingHandle {
    log: Rc<RefCell<RecordingLog>>,
}

impl ChartHandle for RecordingHandle {
    fn update_series(&mut self, key: &str, update: SeriesDataUpdate, redraw: bool) {
        self.log.borrow_mut().updates.push(RecordedUpdate {
            key: key.to_owned(),
            update,
            redraw,
        });
    }

    fn redraw(&mut self) {
        self.log.borrow_mut().redraws += 1;
    }

    fn select_default_range(&mut self, button: usize) {
        self.log.borrow_mut().selected_range = Some(button);
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().destroyed += 1;
    }
}
