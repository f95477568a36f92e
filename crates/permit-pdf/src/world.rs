//! In-memory Typst world for a single generated form
//!
//! The form layout is the only source file. Field values never enter the
//! source text: they are exposed as `sys.inputs` so user input cannot change
//! the markup.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime, Dict};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use crate::fonts::FontCache;

const MAIN_PATH: &str = "/permit.typ";

pub struct PermitWorld {
    main: Source,
    fonts: Arc<FontCache>,
    library: LazyHash<Library>,
    time: DateTime<Utc>,
}

impl PermitWorld {
    pub fn new(source: String, inputs: Dict, fonts: Arc<FontCache>) -> Self {
        let id = FileId::new(None, VirtualPath::new(MAIN_PATH));
        Self {
            main: Source::new(id, source),
            fonts,
            library: LazyHash::new(Library::builder().with_inputs(inputs).build()),
            time: Utc::now(),
        }
    }
}

impl World for PermitWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.fonts.book()
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.font(index)
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let adjusted = self.time + Duration::hours(offset.unwrap_or(0));

        Datetime::from_ymd_hms(
            adjusted.year(),
            adjusted.month() as u8,
            adjusted.day() as u8,
            adjusted.hour() as u8,
            adjusted.minute() as u8,
            adjusted.second() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_source_is_served() {
        let world = PermitWorld::new(
            "Hello".to_string(),
            Dict::new(),
            Arc::new(FontCache::embedded()),
        );
        let source = world.source(world.main()).unwrap();
        assert_eq!(source.text(), "Hello");
    }

    #[test]
    fn test_other_files_are_not_found() {
        let world = PermitWorld::new(String::new(), Dict::new(), Arc::new(FontCache::embedded()));
        let other = FileId::new(None, VirtualPath::new("/other.typ"));
        assert!(world.source(other).is_err());
        assert!(world.file(other).is_err());
    }

    #[test]
    fn test_today() {
        let world = PermitWorld::new(String::new(), Dict::new(), Arc::new(FontCache::embedded()));
        assert!(world.today(Some(9)).is_some());
    }
}
