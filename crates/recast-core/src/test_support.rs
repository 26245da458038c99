//! In-memory fakes shared by the unit tests.

use crate::archive::{ArchiveBuilder, ArchiveError};
use crate::catalog::Catalog;
use crate::convert::{Delivery, DeliveryError, Download, EncodeError, Encoder};
use crate::entry::{FileInput, ImageEntry};
use crate::format::{OutputFormat, Quality};
use crate::intake::{Dimensions, Probe, ProbeError};
use crate::notice::{Notice, NoticeLevel};
use crate::progress::{ProgressReporter, percent};
use crate::session::Frontend;

/// An input the fake probe decodes as a `width`×`height` image.
pub fn image_input(name: &str, width: u32, height: u32) -> FileInput {
    FileInput::new(
        name,
        "image/png",
        format!("IMG {}x{}", width, height).into_bytes(),
    )
}

pub fn entry(name: &str) -> ImageEntry {
    ImageEntry::new(image_input(name, 8, 8), 8, 8)
}

/// Decodes `IMG <w>x<h>` payloads; anything else fails.
pub struct FakeProbe;

impl Probe for FakeProbe {
    fn probe(&self, data: &[u8]) -> Result<Dimensions, ProbeError> {
        let text = std::str::from_utf8(data).map_err(|e| ProbeError::Decode(e.to_string()))?;
        let dims = text
            .strip_prefix("IMG ")
            .ok_or_else(|| ProbeError::Decode("bad header".into()))?;
        let (w, h) = dims
            .split_once('x')
            .ok_or_else(|| ProbeError::Decode("bad size".into()))?;
        let parse = |s: &str| s.parse::<u32>().map_err(|e| ProbeError::Decode(e.to_string()));
        Ok(Dimensions::new(parse(w)?, parse(h)?))
    }
}

/// Encodes to `<ext>:<name>`; entries named `fail*` fail.
pub struct FakeEncoder;

impl Encoder for FakeEncoder {
    fn encode(
        &self,
        entry: &ImageEntry,
        format: OutputFormat,
        _quality: Quality,
    ) -> Result<Vec<u8>, EncodeError> {
        if entry.name().starts_with("fail") {
            return Err(EncodeError::Failed(format!("cannot encode {}", entry.name())));
        }
        Ok(format!("{}:{}", format.extension(), entry.name()).into_bytes())
    }
}

#[derive(Default)]
pub struct RecordingDelivery {
    pub downloads: Vec<Download>,
    fail_on: Option<String>,
}

impl RecordingDelivery {
    pub fn failing_on(file_name: &str) -> Self {
        Self {
            downloads: Vec::new(),
            fail_on: Some(file_name.to_string()),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.downloads.iter().map(|d| d.file_name.as_str()).collect()
    }
}

impl Delivery for RecordingDelivery {
    fn deliver(&mut self, download: Download) -> Result<(), DeliveryError> {
        if self.fail_on.as_deref() == Some(download.file_name.as_str()) {
            return Err(DeliveryError::Rejected(download.file_name));
        }
        self.downloads.push(download);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Start(usize),
    Update(usize, String),
}

#[derive(Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
    pub finished: usize,
    total: usize,
}

impl RecordingProgress {
    pub fn percents(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Update(done, _) => Some(percent(*done, self.total)),
                ProgressEvent::Start(_) => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Update(_, msg) => Some(msg.clone()),
                ProgressEvent::Start(_) => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.events.push(ProgressEvent::Start(total));
    }

    fn update(&mut self, completed: usize, message: &str) {
        self.events
            .push(ProgressEvent::Update(completed, message.to_string()));
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}

/// Accepts entries, then fails to finalize.
#[derive(Default)]
pub struct FailingArchive {
    entries: usize,
}

impl ArchiveBuilder for FailingArchive {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn add(&mut self, _path: &str, _data: &[u8]) -> Result<(), ArchiveError> {
        self.entries += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, ArchiveError> {
        Err(ArchiveError::Finalize(format!(
            "disk full after {} entries",
            self.entries
        )))
    }
}

/// Records renders (as catalog length), notices and prompts.
#[derive(Default)]
pub struct RecordingFrontend {
    pub renders: Vec<usize>,
    pub notices: Vec<Notice>,
    pub prompts: usize,
    pub confirm_answer: bool,
}

impl RecordingFrontend {
    pub fn levels(&self) -> Vec<NoticeLevel> {
        self.notices.iter().map(|n| n.level).collect()
    }
}

impl Frontend for RecordingFrontend {
    fn render(&mut self, catalog: &Catalog) {
        self.renders.push(catalog.len());
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn confirm(&mut self, _prompt: &str) -> bool {
        self.prompts += 1;
        self.confirm_answer
    }
}
