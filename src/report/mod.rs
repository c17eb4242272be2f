//! PDF salary report rendering

use crate::error::{Result, SalaryError};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 30.0;

/// Everything the report renders
#[derive(Debug, Clone)]
pub struct SalaryReport {
    pub title: String,
    /// Employee input as display key-value pairs
    pub employee: Vec<(String, String)>,
    pub predicted_salary: f64,
    pub model_r2: f64,
    /// Free-text role comparison block
    pub comparison: String,
    /// Free-text career suggestions block
    pub suggestions: String,
}

impl SalaryReport {
    pub fn new(employee: Vec<(String, String)>, predicted_salary: f64, model_r2: f64) -> Self {
        Self {
            title: "Smart Salary - Salary Report".to_string(),
            employee,
            predicted_salary,
            model_r2,
            comparison: String::new(),
            suggestions: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_comparison(mut self, text: impl Into<String>) -> Self {
        self.comparison = text.into();
        self
    }

    pub fn with_suggestions(mut self, text: impl Into<String>) -> Self {
        self.suggestions = text.into();
        self
    }
}

/// Format a salary with thousands separators, e.g. `Rs 1,250,000`.
pub fn format_salary(salary: f64) -> String {
    let value = salary.round() as i64;
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("Rs -{}", grouped)
    } else {
        format!("Rs {}", grouped)
    }
}

struct Cursor<'a> {
    layer: &'a PdfLayerReference,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn text(&mut self, text: &str, size: f32, font: &IndirectFontRef, indent: f32, step: f32) {
        self.layer
            .use_text(text, size, Mm(MARGIN_MM + indent), Mm(self.y), font);
        self.y -= step;
    }

    fn gap(&mut self, step: f32) {
        self.y -= step;
    }
}

/// Render a single-page A4 report to `path`.
pub fn generate_salary_report(path: impl AsRef<Path>, report: &SalaryReport) -> Result<()> {
    let path = path.as_ref();
    let (doc, page, layer) =
        PdfDocument::new(&report.title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "report");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| SalaryError::ReportError(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| SalaryError::ReportError(e.to_string()))?;

    let ink = Color::Rgb(Rgb::new(0.15, 0.15, 0.17, None));
    let accent = Color::Rgb(Rgb::new(0.0, 0.6, 0.5, None));

    let mut cursor = Cursor {
        layer: &layer,
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    // Header
    layer.set_fill_color(accent.clone());
    cursor.text(&report.title, 20.0, &bold, 0.0, 15.0);

    // Employee details
    layer.set_fill_color(ink.clone());
    cursor.text("Employee Input", 14.0, &bold, 0.0, 10.0);
    for (key, value) in &report.employee {
        cursor.text(&format!("{}: {}", key, value), 12.0, &regular, 2.0, 7.0);
    }

    // Prediction
    cursor.gap(5.0);
    layer.set_fill_color(accent);
    cursor.text(
        &format!("Predicted Salary: {}", format_salary(report.predicted_salary)),
        16.0,
        &bold,
        0.0,
        10.0,
    );

    layer.set_fill_color(ink);
    cursor.text(
        &format!("Model R2 Score: {:.4}", report.model_r2),
        12.0,
        &regular,
        0.0,
        10.0,
    );

    // Comparison
    cursor.text("Role Comparison", 14.0, &bold, 0.0, 7.0);
    for line in report.comparison.lines() {
        cursor.text(line, 12.0, &regular, 2.0, 6.0);
    }

    // Suggestions
    cursor.gap(5.0);
    cursor.text("Career Suggestions", 14.0, &bold, 0.0, 7.0);
    for line in report.suggestions.lines() {
        cursor.text(line, 12.0, &regular, 2.0, 6.0);
    }

    let file = File::create(path)
        .map_err(|e| SalaryError::ReportError(format!("{}: {}", path.display(), e)))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| SalaryError::ReportError(e.to_string()))?;

    Ok(())
}
