//! Export of a stored résumé to a downloadable PDF or DOCX document.
//!
//! Both writers consume the same line layout, so the two formats always
//! carry the same content in the same order.

use std::io::Cursor;

use anyhow::{anyhow, Result};
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::Deserialize;

use crate::cv::render_text::{contact_parts, period};
use crate::models::cv::{CvContent, Language};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Name,
    Heading,
    Entry,
    Body,
    Bullet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub style: LineStyle,
    pub text: String,
}

impl Line {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

struct Headings {
    summary: &'static str,
    experience: &'static str,
    education: &'static str,
    skills: &'static str,
    present: &'static str,
}

fn headings(language: Language) -> Headings {
    match language {
        Language::Id => Headings {
            summary: "Ringkasan",
            experience: "Pengalaman Kerja",
            education: "Pendidikan",
            skills: "Keahlian",
            present: "Sekarang",
        },
        Language::En => Headings {
            summary: "Summary",
            experience: "Work Experience",
            education: "Education",
            skills: "Skills",
            present: "Present",
        },
    }
}

/// Lays the résumé out as styled lines. Empty sections are skipped.
pub fn layout_lines(cv: &CvContent) -> Vec<Line> {
    let h = headings(cv.language);
    let mut lines = vec![Line::new(LineStyle::Name, cv.full_name())];
    if !cv.job_title.is_empty() {
        lines.push(Line::new(LineStyle::Body, cv.job_title.clone()));
    }
    let contact = contact_parts(cv);
    if !contact.is_empty() {
        lines.push(Line::new(LineStyle::Body, contact.join(" | ")));
    }

    if !cv.summary.is_empty() {
        lines.push(Line::new(LineStyle::Heading, h.summary));
        lines.push(Line::new(LineStyle::Body, cv.summary.clone()));
    }

    if !cv.work_experiences.is_empty() {
        lines.push(Line::new(LineStyle::Heading, h.experience));
        for exp in &cv.work_experiences {
            let mut title = exp.job_title.clone();
            if !exp.company.is_empty() {
                title.push_str(&format!(" - {}", exp.company));
            }
            lines.push(Line::new(LineStyle::Entry, title));
            let meta = [
                exp.location.clone(),
                period(&exp.start_date, exp.end_date.as_deref(), exp.is_current, h.present),
            ]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
            if !meta.is_empty() {
                lines.push(Line::new(LineStyle::Body, meta));
            }
            if !exp.description.is_empty() {
                lines.push(Line::new(LineStyle::Body, exp.description.clone()));
            }
            for achievement in &exp.achievements {
                lines.push(Line::new(LineStyle::Bullet, achievement.clone()));
            }
        }
    }

    if !cv.educations.is_empty() {
        lines.push(Line::new(LineStyle::Heading, h.education));
        for edu in &cv.educations {
            let mut title = edu.degree.clone();
            if !edu.institution.is_empty() {
                title.push_str(&format!(" - {}", edu.institution));
            }
            lines.push(Line::new(LineStyle::Entry, title));
            let mut meta = vec![
                edu.location.clone(),
                period(&edu.start_date, edu.end_date.as_deref(), edu.is_current, h.present),
            ];
            if let Some(gpa) = &edu.gpa {
                meta.push(format!("GPA {gpa}"));
            }
            let meta = meta
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !meta.is_empty() {
                lines.push(Line::new(LineStyle::Body, meta));
            }
        }
    }

    if !cv.skills.is_empty() {
        lines.push(Line::new(LineStyle::Heading, h.skills));
        lines.push(Line::new(LineStyle::Body, cv.skills.join(", ")));
    }

    lines
}

/// `Ana_Putri_CV.pdf`; non-ASCII-alphanumeric characters are dropped.
pub fn download_filename(cv: &CvContent, format: ExportFormat) -> String {
    let stem: String = cv
        .full_name()
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        format!("CV.{}", format.extension())
    } else {
        format!("{stem}_CV.{}", format.extension())
    }
}

pub fn export(cv: &CvContent, format: ExportFormat) -> Result<Vec<u8>> {
    let lines = layout_lines(cv);
    match format {
        ExportFormat::Pdf => render_pdf(&lines),
        ExportFormat::Docx => render_docx(&lines),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PDF (A4, Helvetica)
// ────────────────────────────────────────────────────────────────────────────

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

struct PdfStyle {
    font: &'static str,
    size: f32,
    space_before: f32,
    indent: f32,
}

fn pdf_style(style: LineStyle) -> PdfStyle {
    match style {
        LineStyle::Name => PdfStyle { font: "F2", size: 18.0, space_before: 0.0, indent: 0.0 },
        LineStyle::Heading => PdfStyle { font: "F2", size: 13.0, space_before: 10.0, indent: 0.0 },
        LineStyle::Entry => PdfStyle { font: "F2", size: 10.5, space_before: 4.0, indent: 0.0 },
        LineStyle::Body => PdfStyle { font: "F1", size: 10.0, space_before: 0.0, indent: 0.0 },
        LineStyle::Bullet => PdfStyle { font: "F1", size: 10.0, space_before: 0.0, indent: 12.0 },
    }
}

/// Greedy word wrap to at most `max_chars` per line. Overlong words are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            out.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// WinAnsi-compatible bytes; characters outside Latin-1 become '?'.
fn pdf_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95,
            c if (c as u32) < 0x100 => c as u8,
            _ => b'?',
        })
        .collect()
}

fn render_pdf(lines: &[Line]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut pages: Vec<Vec<Operation>> = vec![Vec::new()];
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let style = pdf_style(line.style);
        let leading = style.size * 1.35;
        let usable = PAGE_WIDTH - 2.0 * MARGIN - style.indent;
        let max_chars = (usable / (style.size * AVG_GLYPH_WIDTH)) as usize;
        y -= style.space_before;

        for (i, chunk) in wrap(&line.text, max_chars).into_iter().enumerate() {
            if y - leading < MARGIN {
                pages.push(Vec::new());
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= leading;
            let text = if line.style == LineStyle::Bullet && i == 0 {
                format!("\u{2022} {chunk}")
            } else {
                chunk
            };
            let x = MARGIN + style.indent;
            if let Some(ops) = pages.last_mut() {
                ops.extend([
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![style.font.into(), style.size.into()]),
                    Operation::new("Td", vec![x.into(), y.into()]),
                    Operation::new("Tj", vec![Object::string_literal(pdf_bytes(&text))]),
                    Operation::new("ET", vec![]),
                ]);
            }
        }
    }

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| anyhow!("PDF content encoding failed: {e}"))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        PAGE_WIDTH.into(),
        PAGE_HEIGHT.into(),
    ];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| anyhow!("PDF serialization failed: {e}"))?;
    Ok(buf)
}

// ────────────────────────────────────────────────────────────────────────────
// DOCX
// ────────────────────────────────────────────────────────────────────────────

fn docx_paragraph(line: &Line) -> Paragraph {
    // Run sizes are in half-points
    let run = match line.style {
        LineStyle::Name => Run::new().add_text(&line.text).bold().size(36),
        LineStyle::Heading => Run::new().add_text(&line.text).bold().size(26),
        LineStyle::Entry => Run::new().add_text(&line.text).bold().size(21),
        LineStyle::Body => Run::new().add_text(&line.text).size(20),
        LineStyle::Bullet => Run::new().add_text(format!("\u{2022} {}", line.text)).size(20),
    };
    Paragraph::new().add_run(run)
}

fn render_docx(lines: &[Line]) -> Result<Vec<u8>> {
    let docx = lines
        .iter()
        .fold(Docx::new(), |docx, line| docx.add_paragraph(docx_paragraph(line)));

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| anyhow!("DOCX packing failed: {e}"))?;
    Ok(cursor.into_inner())
}
