//! Summary artifact: total count, refresh time and the top countries by
//! estimated GDP, rendered as an SVG document.

use super::country::{PersistedCountry, iso8601};
use super::error::RenderError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TOP_N: usize = 5;

const SVG_WIDTH: u32 = 900;
const SVG_MIN_HEIGHT: u32 = 200;
const FIRST_ENTRY_Y: u32 = 130;
const LINE_HEIGHT: u32 = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub name: String,
    pub currency_code: Option<String>,
    pub estimated_gdp: f64,
}

impl SummaryEntry {
    pub fn display_line(&self) -> String {
        format!(
            "{} — {} — est_gdp: {:.2}",
            self.name,
            self.currency_code.as_deref().unwrap_or("N/A"),
            self.estimated_gdp
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub total: usize,
    pub last_refreshed_at: DateTime<Utc>,
    pub top: Vec<SummaryEntry>,
}

impl SummaryReport {
    pub fn from_rows(rows: &[PersistedCountry], last_refreshed_at: DateTime<Utc>) -> Self {
        let mut ranked: Vec<SummaryEntry> = rows
            .iter()
            .filter_map(|row| {
                let gdp = row.estimated_gdp.filter(|g| !g.is_nan())?;
                Some(SummaryEntry {
                    name: row.name.clone(),
                    currency_code: row.currency_code.clone(),
                    estimated_gdp: gdp,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.estimated_gdp.total_cmp(&a.estimated_gdp));
        ranked.truncate(TOP_N);

        Self {
            total: rows.len(),
            last_refreshed_at,
            top: ranked,
        }
    }

    pub fn to_svg(&self) -> String {
        let mut lines = vec![
            format!(
                r#"<text x="20" y="40" font-size="20">Total countries: {}</text>"#,
                self.total
            ),
            format!(
                r#"<text x="20" y="70" font-size="16">Last refreshed: {}</text>"#,
                escape_xml(&iso8601(&self.last_refreshed_at))
            ),
            format!(
                r#"<text x="20" y="100" font-size="16">Top {} by estimated GDP:</text>"#,
                self.top.len()
            ),
        ];

        let mut y = FIRST_ENTRY_Y;
        for entry in &self.top {
            lines.push(format!(
                r#"<text x="30" y="{y}" font-size="14">{}</text>"#,
                escape_xml(&entry.display_line())
            ));
            y += LINE_HEIGHT;
        }

        let height = SVG_MIN_HEIGHT.max(y + 20);
        let body = lines
            .iter()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SVG_WIDTH}" height="{height}">"#
        );
        svg.push('\n');
        svg.push_str(r##"  <rect width="100%" height="100%" fill="#fff"/>"##);
        svg.push('\n');
        svg.push_str(&body);
        svg.push_str("\n</svg>\n");
        svg
    }
}

pub fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn io_error(path: &Path, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Writes `contents` next to `path` first and renames it into place, so a
/// reader sees either the previous artifact or the complete new one.
async fn write_replacing(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| RenderError::InvalidPath(path.display().to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| io_error(&tmp_path, e))?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(io_error(path, e));
    }
    Ok(())
}

/// Renders the summary of `rows` and replaces the artifact at `path`.
pub async fn render_summary(
    rows: &[PersistedCountry],
    last_refreshed_at: DateTime<Utc>,
    path: &Path,
) -> Result<PathBuf, RenderError> {
    let report = SummaryReport::from_rows(rows, last_refreshed_at);
    let svg = report.to_svg();
    write_replacing(path, svg.as_bytes()).await?;
    debug!(path = %path.display(), entries = report.top.len(), "Wrote summary artifact");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::country::fixtures::row;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 22, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_report_ranks_top_five_descending() {
        let rows: Vec<_> = (1..=8)
            .map(|i| row(i, &format!("C{i}"), "R", Some("USD"), Some(i as f64 * 10.0)))
            .chain([
                row(9, "Unknown", "R", Some("ZZZ"), None),
                row(10, "Broken", "R", Some("YYY"), Some(f64::NAN)),
            ])
            .collect();

        let report = SummaryReport::from_rows(&rows, ts());
        assert_eq!(report.total, 10);
        let names: Vec<_> = report.top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["C8", "C7", "C6", "C5", "C4"]);
    }

    #[test]
    fn test_report_with_fewer_qualifying_rows() {
        let rows = vec![
            row(1, "A", "R", None, Some(0.0)),
            row(2, "B", "R", Some("ZZZ"), None),
        ];
        let report = SummaryReport::from_rows(&rows, ts());
        assert_eq!(report.top.len(), 1);
        assert_eq!(report.top[0].display_line(), "A — N/A — est_gdp: 0.00");
    }

    #[test]
    fn test_svg_escapes_markup_in_names() {
        let rows = vec![row(1, "<Tom & Jerry's>", "R", Some("USD"), Some(1234.5678))];
        let svg = SummaryReport::from_rows(&rows, ts()).to_svg();

        assert!(svg.contains("&lt;Tom &amp; Jerry&apos;s&gt; — USD — est_gdp: 1234.57"));
        assert!(!svg.contains("<Tom"));
        assert!(svg.contains("Total countries: 1"));
        assert!(svg.contains("Last refreshed: 2025-10-22T08:30:00.000Z"));
        assert!(svg.contains(r#"height="200""#));
    }

    #[test]
    fn test_svg_document_layout() {
        let rows: Vec<_> = (1..=5)
            .map(|i| row(i, &format!("C{i}"), "R", Some("USD"), Some(i as f64)))
            .collect();
        let svg = SummaryReport::from_rows(&rows, ts()).to_svg();
        let lines: Vec<_> = svg.lines().collect();

        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("<svg ") && lines[0].contains(r#"height="270""#));
        assert!(lines[1].starts_with("  <rect"));
        assert!(lines[5].contains(r#"y="130""#) && lines[5].contains("C5"));
        assert!(lines[9].contains(r#"y="226""#) && lines[9].contains("C1"));
        assert_eq!(lines[10], "</svg>");
        assert!(svg.ends_with("</svg>\n"));
    }

    #[tokio::test]
    async fn test_render_summary_creates_parents_and_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache").join("summary.svg");

        let first = vec![row(1, "Old", "R", Some("USD"), Some(1.0))];
        render_summary(&first, ts(), &path).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Old"));

        let second = vec![row(2, "New", "R", Some("EUR"), Some(2.0))];
        let written = render_summary(&second, ts(), &path).await.unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("New"));
        assert!(!contents.contains("Old"));
        assert!(!path.with_file_name("summary.svg.tmp").exists());
    }

    #[tokio::test]
    async fn test_render_summary_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = render_summary(&[], ts(), &blocker.join("summary.svg")).await;
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }
}
