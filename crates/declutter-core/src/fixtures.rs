//! Demo data used by the CLI and tests.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{DuplicateFile, DuplicateGroup};

/// Midnight UTC on the given day.
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// The duplicate groups shown by the demo dashboard.
pub fn demo_groups() -> Vec<DuplicateGroup> {
    vec![
        DuplicateGroup::new(
            "1",
            vec![
                DuplicateFile::new(
                    "1a",
                    "document.pdf",
                    "/Documents/document.pdf",
                    1_024_000,
                    date(2023, 3, 15),
                ),
                DuplicateFile::new(
                    "1b",
                    "document_copy.pdf",
                    "/Downloads/document_copy.pdf",
                    1_024_000,
                    date(2023, 3, 14),
                ),
            ],
        ),
        DuplicateGroup::new(
            "2",
            vec![
                DuplicateFile::new(
                    "2a",
                    "image.jpg",
                    "/Pictures/image.jpg",
                    2_048_000,
                    date(2023, 3, 13),
                ),
                DuplicateFile::new(
                    "2b",
                    "image_backup.jpg",
                    "/Backups/image_backup.jpg",
                    2_048_000,
                    date(2023, 3, 12),
                ),
                DuplicateFile::new(
                    "2c",
                    "image_copy.jpg",
                    "/Downloads/image_copy.jpg",
                    2_048_000,
                    date(2023, 3, 11),
                ),
            ],
        ),
    ]
}

/// Path and content pairs backing the demo file store.
pub fn demo_store_entries() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("/Documents/document.pdf", "Mock PDF content".as_bytes()),
        ("/Downloads/document_copy.pdf", "Mock PDF content".as_bytes()),
        ("/Pictures/image.jpg", "Mock JPG content".as_bytes()),
        ("/Backups/image_backup.jpg", "Mock JPG content".as_bytes()),
        ("/Downloads/image_copy.jpg", "Mock JPG content".as_bytes()),
        ("/Documents/report.pdf", "Mock PDF content".as_bytes()),
        ("/Documents/presentation.pptx", "Mock PPTX content".as_bytes()),
        ("/Downloads/report_copy.pdf", "Mock PDF content".as_bytes()),
        ("/Pictures/vacation.jpg", "Mock JPG content".as_bytes()),
        ("/Pictures/beach.jpg", "Mock JPG content".as_bytes()),
        ("/Backups/vacation_backup.jpg", "Mock JPG content".as_bytes()),
    ]
}
