// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Explicit modelling session
//!
//! A session owns the notebook and the study. It is created with
//! [`Session::init`], passed by reference to every operation, and ends with
//! [`Session::shutdown`], which hands back the study.

use crate::geometry::GeomBuilder;
use crate::notebook::Notebook;
use crate::study::Study;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Default name given to the study of a new session
pub const DEFAULT_STUDY_NAME: &str = "Study1";

/// Display attached to a session
pub trait Desktop: Send {
    fn name(&self) -> &str;

    /// Redraw the object browser from the current study
    fn update_object_browser(&mut self, study: &Study);
}

/// Desktop that only counts refreshes and keeps the last browser listing.
///
/// Clones share the same log, so a clone kept outside the session observes
/// the refreshes made through it.
#[derive(Debug, Default, Clone)]
pub struct RecordingDesktop {
    log: Arc<Mutex<BrowserLog>>,
}

#[derive(Debug, Default)]
struct BrowserLog {
    refreshes: usize,
    listing: Vec<String>,
}

impl RecordingDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, BrowserLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn refreshes(&self) -> usize {
        self.log().refreshes
    }

    /// Entry names shown by the last refresh
    pub fn last_listing(&self) -> Vec<String> {
        self.log().listing.clone()
    }
}

impl Desktop for RecordingDesktop {
    fn name(&self) -> &str {
        "recording"
    }

    fn update_object_browser(&mut self, study: &Study) {
        let mut log = self.log();
        log.refreshes += 1;
        log.listing = study.entries().iter().map(|e| e.name.clone()).collect();
    }
}

pub struct Session {
    notebook: Notebook,
    study: Study,
    desktop: Option<Box<dyn Desktop>>,
}

impl Session {
    /// Start a headless session with an empty notebook and study
    pub fn init() -> Self {
        info!(study = DEFAULT_STUDY_NAME, "session initialized");
        Self {
            notebook: Notebook::new(),
            study: Study::new(DEFAULT_STUDY_NAME),
            desktop: None,
        }
    }

    /// Start a session with a desktop attached
    pub fn with_desktop(desktop: Box<dyn Desktop>) -> Self {
        let mut session = Self::init();
        session.attach_desktop(desktop);
        session
    }

    pub fn attach_desktop(&mut self, desktop: Box<dyn Desktop>) {
        info!(desktop = desktop.name(), "desktop attached");
        self.desktop = Some(desktop);
    }

    pub fn detach_desktop(&mut self) -> Option<Box<dyn Desktop>> {
        self.desktop.take()
    }

    pub fn has_desktop(&self) -> bool {
        self.desktop.is_some()
    }

    /// Refresh the object browser; returns false when no desktop is attached
    pub fn update_object_browser(&mut self) -> bool {
        match self.desktop.as_mut() {
            Some(desktop) => {
                debug!(desktop = desktop.name(), entries = self.study.len(), "refreshing object browser");
                desktop.update_object_browser(&self.study);
                true
            }
            None => false,
        }
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn notebook_mut(&mut self) -> &mut Notebook {
        &mut self.notebook
    }

    pub fn study(&self) -> &Study {
        &self.study
    }

    pub fn study_mut(&mut self) -> &mut Study {
        &mut self.study
    }

    /// Geometry builder reading the current notebook
    pub fn geom(&self) -> GeomBuilder<'_> {
        GeomBuilder::new(&self.notebook)
    }

    /// End the session and return its study
    pub fn shutdown(self) -> Study {
        info!(entries = self.study.len(), "session closed");
        self.study
    }
}
