//! Session: owns the catalog and wires intake and conversion to a frontend.

use crate::archive::ArchiveLayout;
use crate::catalog::{Catalog, CatalogError, Selection};
use crate::convert::{
    BatchConverter, BatchError, BatchSummary, ConversionRequest, Delivery, Encoder, ModePolicy,
};
use crate::entry::{EntryId, FileInput, ImageEntry};
use crate::format::{OutputFormat, Quality};
use crate::intake::{IntakeReport, Probe, ingest};
use crate::notice::Notice;
use crate::progress::ProgressReporter;
use tracing::warn;

/// The user-facing side of a session: list view, notifications, prompts.
pub trait Frontend {
    /// Show the current catalog contents.
    fn render(&mut self, catalog: &Catalog);

    /// Show a one-off notification.
    fn notify(&mut self, notice: Notice);

    /// Ask the user to confirm a destructive action.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Conversion settings and workflow knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub format: OutputFormat,
    pub quality: Quality,
    pub mode: ModePolicy,
    pub layout: ArchiveLayout,
    /// Offer converting a single entry on its own.
    pub allow_single: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
            mode: ModePolicy::default(),
            layout: ArchiveLayout::default(),
            allow_single: false,
        }
    }
}

impl SessionConfig {
    fn request(&self) -> ConversionRequest {
        ConversionRequest::new(self.format)
            .quality(self.quality)
            .mode(self.mode)
            .layout(self.layout.clone())
    }
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("single-image conversion is disabled")]
    SingleDisabled,
}

/// One user session over a catalog.
///
/// All catalog mutation goes through `&mut self`, and every mutation is
/// followed by a render.
pub struct Session<F: Frontend> {
    catalog: Catalog,
    config: SessionConfig,
    probe: Box<dyn Probe>,
    encoder: Box<dyn Encoder>,
    frontend: F,
}

impl<F: Frontend> Session<F> {
    pub fn new(
        probe: Box<dyn Probe>,
        encoder: Box<dyn Encoder>,
        frontend: F,
        config: SessionConfig,
    ) -> Self {
        Self {
            catalog: Catalog::new(),
            config,
            probe,
            encoder,
            frontend,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// Run intake over `inputs`; renders once afterwards.
    pub fn add_files(&mut self, inputs: Vec<FileInput>) -> IntakeReport {
        if inputs.is_empty() {
            return IntakeReport::default();
        }
        let report = ingest(&mut self.catalog, inputs, self.probe.as_ref());
        if let Some(notice) = report.notice() {
            self.frontend.notify(notice);
        }
        self.frontend.render(&self.catalog);
        report
    }

    pub fn remove(&mut self, id: EntryId) -> Result<ImageEntry, SessionError> {
        let entry = self.catalog.remove_id(id).inspect_err(|e| {
            warn!(error = %e, "ignoring remove of stale entry");
        })?;
        self.frontend.render(&self.catalog);
        Ok(entry)
    }

    pub fn toggle(&mut self, id: EntryId) -> Result<bool, SessionError> {
        let included = self.catalog.toggle_id(id).inspect_err(|e| {
            warn!(error = %e, "ignoring toggle of stale entry");
        })?;
        self.frontend.render(&self.catalog);
        Ok(included)
    }

    /// Clear the catalog after the frontend confirms. Returns whether it was cleared.
    pub fn clear(&mut self) -> bool {
        if !self
            .frontend
            .confirm("Remove all loaded images? This cannot be undone.")
        {
            return false;
        }
        self.catalog.clear();
        self.frontend.render(&self.catalog);
        self.frontend.notify(Notice::success("All images removed"));
        true
    }

    /// Convert every entry.
    pub fn convert_all(
        &mut self,
        delivery: &mut dyn Delivery,
        progress: &mut dyn ProgressReporter,
    ) -> Result<BatchSummary, SessionError> {
        self.convert_selection(Selection::All, delivery, progress)
    }

    /// Convert entries whose inclusion flag is set.
    pub fn convert_selected(
        &mut self,
        delivery: &mut dyn Delivery,
        progress: &mut dyn ProgressReporter,
    ) -> Result<BatchSummary, SessionError> {
        self.convert_selection(Selection::Included, delivery, progress)
    }

    /// Convert one entry, when single conversion is enabled.
    pub fn convert_one(
        &mut self,
        id: EntryId,
        delivery: &mut dyn Delivery,
        progress: &mut dyn ProgressReporter,
    ) -> Result<BatchSummary, SessionError> {
        if !self.config.allow_single {
            return Err(SessionError::SingleDisabled);
        }
        let entry = self
            .catalog
            .get_id(id)
            .cloned()
            .ok_or(CatalogError::UnknownId(id))?;
        self.run(&[entry], delivery, progress)
    }

    pub fn convert_selection(
        &mut self,
        selection: Selection,
        delivery: &mut dyn Delivery,
        progress: &mut dyn ProgressReporter,
    ) -> Result<BatchSummary, SessionError> {
        let images = self.catalog.select(selection);
        self.run(&images, delivery, progress)
    }

    fn run(
        &mut self,
        images: &[ImageEntry],
        delivery: &mut dyn Delivery,
        progress: &mut dyn ProgressReporter,
    ) -> Result<BatchSummary, SessionError> {
        let request = self.config.request();
        let result = BatchConverter::new(self.encoder.as_ref()).convert(
            images, &request, delivery, progress,
        );

        match &result {
            Ok(_) => self
                .frontend
                .notify(Notice::success("Images converted successfully")),
            Err(BatchError::EmptySelection) => self
                .frontend
                .notify(Notice::error("Please add images to convert")),
            Err(e) => {
                warn!(error = %e, "batch conversion failed");
                self.frontend
                    .notify(Notice::error(format!("Conversion failed: {}", e)));
            }
        }

        result.map_err(SessionError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DeliveryMode;
    use crate::notice::NoticeLevel;
    use crate::progress::ProgressState;
    use crate::test_support::{
        FakeEncoder, FakeProbe, RecordingDelivery, RecordingFrontend, image_input,
    };

    fn session(frontend: RecordingFrontend) -> Session<RecordingFrontend> {
        let config = SessionConfig {
            format: OutputFormat::Png,
            mode: ModePolicy::Explicit(DeliveryMode::Individual),
            ..Default::default()
        };
        Session::new(Box::new(FakeProbe), Box::new(FakeEncoder), frontend, config)
    }

    fn loaded(names: &[&str]) -> Session<RecordingFrontend> {
        let mut s = session(RecordingFrontend::default());
        s.add_files(names.iter().map(|n| image_input(n, 8, 8)).collect());
        s
    }

    #[test]
    fn test_add_renders_once() {
        let s = loaded(&["a.png", "b.png"]);
        assert_eq!(s.frontend().renders, vec![2]);
        assert!(s.frontend().notices.is_empty());
    }

    #[test]
    fn test_add_warns_on_non_images() {
        let mut s = session(RecordingFrontend::default());
        s.add_files(vec![
            image_input("a.png", 1, 1),
            FileInput::new("a.pdf", "application/pdf", vec![0]),
        ]);
        assert_eq!(s.catalog().len(), 1);
        assert_eq!(s.frontend().levels(), vec![NoticeLevel::Warning]);
    }

    #[test]
    fn test_remove_and_toggle_render() {
        let mut s = loaded(&["a.png", "b.png", "c.png"]);
        let b = s.catalog().get(1).unwrap().id();
        let c = s.catalog().get(2).unwrap().id();

        s.remove(b).unwrap();
        assert!(!s.toggle(c).unwrap());
        assert_eq!(s.frontend().renders, vec![3, 2, 2]);

        // stale id fails closed and does not render
        assert!(matches!(
            s.remove(b),
            Err(SessionError::Catalog(CatalogError::UnknownId(_)))
        ));
        assert_eq!(s.frontend().renders.len(), 3);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut s = loaded(&["a.png"]);
        s.frontend_mut().confirm_answer = false;
        assert!(!s.clear());
        assert_eq!(s.catalog().len(), 1);

        s.frontend_mut().confirm_answer = true;
        assert!(s.clear());
        assert!(s.catalog().is_empty());
        assert_eq!(s.frontend().levels(), vec![NoticeLevel::Success]);
        assert_eq!(s.frontend().prompts, 2);
    }

    #[test]
    fn test_convert_empty_reports_error() {
        let mut s = session(RecordingFrontend::default());
        let mut delivery = RecordingDelivery::default();
        let mut progress = ProgressState::new();

        let err = s.convert_all(&mut delivery, &mut progress).unwrap_err();

        assert!(matches!(err, SessionError::Batch(BatchError::EmptySelection)));
        assert!(delivery.downloads.is_empty());
        assert_eq!(s.frontend().levels(), vec![NoticeLevel::Error]);
    }

    #[test]
    fn test_convert_selected_skips_excluded() {
        let mut s = loaded(&["a.png", "b.png", "c.png"]);
        let b = s.catalog().get(1).unwrap().id();
        s.toggle(b).unwrap();
        let mut delivery = RecordingDelivery::default();
        let mut progress = ProgressState::new();

        let summary = s.convert_selected(&mut delivery, &mut progress).unwrap();

        assert_eq!(summary.converted, 2);
        assert_eq!(delivery.downloads[1].data, b"png:c.png".to_vec());
        assert_eq!(s.frontend().levels(), vec![NoticeLevel::Success]);
    }

    #[test]
    fn test_convert_failure_emits_single_error() {
        let mut s = loaded(&["a.png", "fail.png", "c.png"]);
        let mut delivery = RecordingDelivery::default();
        let mut progress = ProgressState::new();

        assert!(s.convert_all(&mut delivery, &mut progress).is_err());
        assert_eq!(s.frontend().levels(), vec![NoticeLevel::Error]);
        assert!(!progress.is_active());
    }

    #[test]
    fn test_convert_one_respects_knob() {
        let mut s = loaded(&["a.png", "b.png"]);
        let b = s.catalog().get(1).unwrap().id();
        let mut delivery = RecordingDelivery::default();
        let mut progress = ProgressState::new();

        assert!(matches!(
            s.convert_one(b, &mut delivery, &mut progress),
            Err(SessionError::SingleDisabled)
        ));

        s.config_mut().allow_single = true;
        let summary = s.convert_one(b, &mut delivery, &mut progress).unwrap();
        assert_eq!(summary.downloads, vec!["converted_1.png".to_string()]);
        assert_eq!(delivery.downloads[0].data, b"png:b.png".to_vec());
    }
}
