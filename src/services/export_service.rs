use crate::error::Result;
use crate::models::candidate::{ApplicationStatus, Candidate};
use rust_xlsxwriter::*;

pub struct ExportService;

const HEADERS: [(&str, f64); 11] = [
    ("#", 6.0),
    ("Full name", 30.0),
    ("Email", 30.0),
    ("Phone", 18.0),
    ("Date of birth", 14.0),
    ("Age", 8.0),
    ("Experience (years)", 18.0),
    ("Department", 24.0),
    ("Status", 22.0),
    ("Registered", 18.0),
    ("Last updated", 18.0),
];

const LAST_COL: u16 = HEADERS.len() as u16 - 1;
const DASH: &str = "—";

const INK: Color = Color::RGB(0x1E293B);
const HEADER_FILL: Color = Color::RGB(0x0F172A);
const STRIPE: Color = Color::RGB(0xF8FAFC);
const GRID: Color = Color::RGB(0xE2E8F0);

fn cell(fill: Color) -> Format {
    Format::new()
        .set_font_size(10)
        .set_background_color(fill)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(GRID)
}

fn banner(size: u32) -> Format {
    Format::new()
        .set_font_size(size)
        .set_background_color(INK)
        .set_align(FormatAlign::CenterAcross)
        .set_align(FormatAlign::VerticalCenter)
}

fn status_fill(status: Option<ApplicationStatus>) -> Color {
    match status.map(ApplicationStatus::color) {
        Some("blue") => Color::RGB(0x3B82F6),
        Some("yellow") => Color::RGB(0xEAB308),
        Some("orange") => Color::RGB(0xF97316),
        Some("green") => Color::RGB(0x10B981),
        Some("red") => Color::RGB(0xEF4444),
        _ => Color::RGB(0x64748B),
    }
}

fn date_text(date: Option<String>) -> String {
    date.unwrap_or_else(|| DASH.to_string())
}

impl ExportService {
    /// Renders candidates into a single-sheet workbook: banner, one row per
    /// candidate with a colored status cell, then a per-status summary row.
    pub fn generate_candidates_xlsx(candidates: &[Candidate], title: &str) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Candidates")?;

        for (col, (_, width)) in HEADERS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }

        sheet.set_row_height(0, 36)?;
        sheet.merge_range(
            0,
            0,
            0,
            LAST_COL,
            title,
            &banner(16).set_bold().set_font_color(Color::White),
        )?;

        let exported = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
        sheet.set_row_height(1, 22)?;
        sheet.merge_range(
            1,
            0,
            1,
            LAST_COL,
            &format!("Exported: {}  •  Candidates: {}", exported, candidates.len()),
            &banner(10).set_italic().set_font_color(Color::RGB(0x94A3B8)),
        )?;

        let header = cell(HEADER_FILL)
            .set_bold()
            .set_font_color(Color::White)
            .set_align(FormatAlign::Center)
            .set_text_wrap();
        sheet.set_row_height(2, 28)?;
        for (col, (name, _)) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(2, col as u16, *name, &header)?;
        }

        let first_row = 3u32;
        for (idx, candidate) in candidates.iter().enumerate() {
            let row = first_row + idx as u32;
            let text = cell(if idx % 2 == 0 { STRIPE } else { Color::White });
            let centered = text.clone().set_align(FormatAlign::Center);

            sheet.set_row_height(row, 20)?;
            sheet.write_number_with_format(row, 0, (idx + 1) as f64, &centered)?;
            sheet.write_string_with_format(row, 1, &candidate.full_name, &text.clone().set_bold())?;
            sheet.write_string_with_format(row, 2, &candidate.email, &text)?;
            sheet.write_string_with_format(row, 3, candidate.phone.as_deref().unwrap_or(DASH), &text)?;
            sheet.write_string_with_format(
                row,
                4,
                &date_text(candidate.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string())),
                &centered,
            )?;
            for (col, value) in [(5, candidate.age), (6, candidate.years_of_experience)] {
                match value {
                    Some(n) => sheet.write_number_with_format(row, col, n as f64, &centered)?,
                    None => sheet.write_string_with_format(row, col, DASH, &centered)?,
                };
            }
            sheet.write_string_with_format(
                row,
                7,
                candidate.department.map(|d| d.label()).unwrap_or(DASH),
                &text,
            )?;

            let status = cell(status_fill(candidate.current_status))
                .set_bold()
                .set_font_color(Color::White)
                .set_align(FormatAlign::Center);
            sheet.write_string_with_format(
                row,
                8,
                candidate.current_status.map(|s| s.label()).unwrap_or(DASH),
                &status,
            )?;

            let stamps = [candidate.created_at, candidate.updated_at];
            for (col, stamp) in (9u16..).zip(stamps) {
                let value = date_text(stamp.map(|t| t.format("%Y-%m-%d %H:%M").to_string()));
                sheet.write_string_with_format(row, col, &value, &centered)?;
            }
        }

        let summary_row = first_row + candidates.len() as u32 + 1;
        let summary = cell(Color::RGB(0xE0E7FF))
            .set_bold()
            .set_font_color(INK)
            .set_align(FormatAlign::Center);
        sheet.set_row_height(summary_row, 24)?;
        sheet.merge_range(
            summary_row,
            0,
            summary_row,
            1,
            &format!("Total: {} candidates", candidates.len()),
            &summary,
        )?;
        sheet.merge_range(
            summary_row,
            2,
            summary_row,
            LAST_COL,
            &Self::status_summary(candidates),
            &summary,
        )?;

        sheet.set_freeze_panes(first_row, 0)?;
        let last_data_row = (first_row + candidates.len() as u32).saturating_sub(1).max(2);
        sheet.autofilter(2, 0, last_data_row, LAST_COL)?;

        Ok(workbook.save_to_buffer()?)
    }

    pub fn status_summary(candidates: &[Candidate]) -> String {
        ApplicationStatus::ALL
            .iter()
            .map(|status| {
                let count = candidates
                    .iter()
                    .filter(|c| c.current_status == Some(*status))
                    .count();
                format!("{}: {}", status.label(), count)
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
