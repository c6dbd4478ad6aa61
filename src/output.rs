//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Styles
//!
//! ```text
//! Anime & Manga
//!     001 Studio Ghibli [studio-ghibli] (3420 uses)
//!         A Studio Ghibli style hand-painted anime scene with warm...
//! ```
//!
//! ## Collage
//!
//! ```text
//! 001 Film Noir
//!     Saved: 2024-06-10 12:00:00 UTC
//!     Image: png, 1.2 KB
//! ```
//!
//! ## Results and notices
//!
//! ```text
//! Preview (png, 48.0 KB) → ./artify_1718000000000.png
//! [!] Preview Failed
//!     The model is overloaded.
//! ```
//!
//! # Architecture
//!
//! Each entity has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::artifact::PhotoArtifact;
use crate::codec::DataUri;
use crate::collage::CollageEntry;
use crate::notice::Notice;
use crate::presets::{self, StyleCategory};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// Human-readable byte count.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Styles
// ============================================================================

/// List styles grouped by category, most used first.
pub fn format_styles(only: Option<StyleCategory>) -> Vec<String> {
    let mut lines = Vec::new();
    for &category in presets::categories() {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(category.label().to_string());
        for (i, preset) in presets::presets_in(category).into_iter().enumerate() {
            lines.push(format!(
                "{}{} {} [{}] ({} uses)",
                indent(1),
                format_index(i + 1),
                preset.name,
                preset.id,
                preset.usage_count
            ));
            lines.push(format!(
                "{}{}",
                indent(2),
                truncate_desc(preset.prompt_text, 60)
            ));
        }
    }
    lines
}

pub fn print_styles(only: Option<StyleCategory>) {
    for line in format_styles(only) {
        println!("{}", line);
    }
}

// ============================================================================
// Collage
// ============================================================================

/// Describe an inline image without dumping its payload.
fn image_summary(data_uri: &str) -> String {
    match DataUri::parse(data_uri) {
        Ok(uri) => format!(
            "{}, {}",
            uri.encoding().extension(),
            format_bytes(uri.byte_len())
        ),
        Err(_) => "unreadable".to_string(),
    }
}

pub fn format_collage(entries: &[CollageEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["Collage is empty".to_string()];
    }
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.style_name));
        let saved = chrono::DateTime::from_timestamp_millis(entry.id)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| entry.id.to_string());
        lines.push(format!("{}Saved: {}", indent(1), saved));
        lines.push(format!(
            "{}Image: {}",
            indent(1),
            image_summary(&entry.image_data_uri)
        ));
    }
    lines
}

pub fn print_collage(entries: &[CollageEntry]) {
    for line in format_collage(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Results and notices
// ============================================================================

/// One line describing a produced image and where it went.
pub fn format_artifact(artifact: &PhotoArtifact, saved_to: Option<&Path>) -> Vec<String> {
    let kind = artifact.source_kind().label();
    let mut label = kind[..1].to_ascii_uppercase();
    label.push_str(&kind[1..]);
    let summary = format!(
        "{} ({}, {})",
        label,
        artifact.encoding().extension(),
        format_bytes(artifact.payload().byte_len())
    );
    match saved_to {
        Some(path) => vec![format!("{} → {}", summary, path.display())],
        None => vec![summary],
    }
}

pub fn print_artifact(artifact: &PhotoArtifact, saved_to: Option<&Path>) {
    for line in format_artifact(artifact, saved_to) {
        println!("{}", line);
    }
}

pub fn format_notice(notice: &Notice) -> Vec<String> {
    let title = if notice.is_destructive() {
        format!("[!] {}", notice.title)
    } else {
        notice.title.clone()
    };
    vec![title, format!("{}{}", indent(1), notice.description)]
}

/// Notices go to stderr so stdout stays clean for results.
pub fn print_notice(notice: &Notice) {
    for line in format_notice(notice) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::SourceKind;
    use crate::codec::ImageEncoding;
    use crate::codec::validate_and_encode;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn truncate_desc_on_char_boundary() {
        assert_eq!(truncate_desc("short", 10), "short");
        assert_eq!(truncate_desc("abcdef", 3), "abc...");
        assert_eq!(truncate_desc("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn styles_grouped_by_category() {
        let lines = format_styles(None);
        assert_eq!(lines[0], "Painting Styles");
        assert!(lines.contains(&"Photography Effects".to_string()));
        assert!(lines.iter().any(|l| l.contains("[pixel-art]")));
    }

    #[test]
    fn styles_filtered_and_ordered() {
        let lines = format_styles(Some(StyleCategory::Anime));
        assert_eq!(lines[0], "Anime & Manga");
        assert_eq!(
            lines[1],
            "    001 Studio Ghibli [studio-ghibli] (3420 uses)"
        );
        assert!(!lines.iter().any(|l| l == "Painting Styles"));
    }

    #[test]
    fn empty_collage() {
        assert_eq!(format_collage(&[]), vec!["Collage is empty"]);
    }

    #[test]
    fn collage_entry_lines() {
        let uri = DataUri::encode(ImageEncoding::Png, &[0u8; 2048]);
        let entries = vec![CollageEntry {
            id: 1_718_020_800_000,
            image_data_uri: uri.as_str().to_string(),
            style_name: "Film Noir".into(),
        }];
        let lines = format_collage(&entries);
        assert_eq!(lines[0], "001 Film Noir");
        assert_eq!(lines[1], "    Saved: 2024-06-10 12:00:00 UTC");
        assert_eq!(lines[2], "    Image: png, 2.0 KB");
    }

    #[test]
    fn artifact_line_with_path() {
        let artifact = validate_and_encode(&[0u8; 100], "image/jpeg").unwrap();
        assert_eq!(artifact.source_kind(), SourceKind::Uploaded);
        let lines = format_artifact(&artifact, Some(Path::new("out/artify_1.jpg")));
        assert_eq!(lines, vec!["Uploaded (jpg, 100 B) → out/artify_1.jpg"]);
    }

    #[test]
    fn destructive_notice_is_flagged() {
        let lines = format_notice(&Notice::nothing_to_download());
        assert_eq!(lines[0], "[!] No Image to Download");
        assert_eq!(
            lines[1],
            "    Please select a photo and art style first."
        );
        assert_eq!(format_notice(&Notice::photo_captured())[0], "Photo Captured!");
    }
}
