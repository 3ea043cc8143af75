//! Crop health certificate generation
//!
//! Renders a single fixed-layout A4 page and writes it to
//! `<cert_dir>/<farmer name>_certificate.pdf`. Regenerating for the same name
//! overwrites the previous file.

use agro_common::Result;
use chrono::{Local, NaiveDate};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::path::{Path, PathBuf};
use tracing::info;

/// Status printed on every certificate
pub const CERTIFICATE_STATUS: &str = "Healthy";

/// File name offered to the browser on download
pub const DOWNLOAD_FILE_NAME: &str = "crop_certificate.pdf";

const PAGE_WIDTH: f32 = 595.2756;
const PAGE_HEIGHT: f32 = 841.8898;
const BORDER_INSET: f32 = 40.0;
const BORDER_WIDTH: f32 = 6.0;
const TITLE_SIZE: f32 = 30.0;
const BODY_SIZE: f32 = 18.0;

/// A certificate for one farmer on one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub farmer_name: String,
    pub status: &'static str,
    pub issue_date: NaiveDate,
}

impl Certificate {
    pub fn new(farmer_name: &str, issue_date: NaiveDate) -> Self {
        Self {
            farmer_name: farmer_name.to_string(),
            status: CERTIFICATE_STATUS,
            issue_date,
        }
    }

    /// Issue date as day, month name, year (e.g. "05 March 2025")
    pub fn formatted_issue_date(&self) -> String {
        self.issue_date.format("%d %B %Y").to_string()
    }

    /// Render the certificate as a complete PDF document
    pub fn render_pdf(&self) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let regular_id = Ref::new(5);
        let bold_id = Ref::new(6);
        let info_id = Ref::new(7);
        let regular = Name(b"F1");
        let bold = Name(b"F2");

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(content_id);
        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(regular, regular_id);
            fonts.pair(bold, bold_id);
        }
        page.finish();

        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.document_info(info_id)
            .title(TextStr("Crop Health Certificate"))
            .creator(TextStr("AgroDetect"));

        let mut content = Content::new();

        // Dark blue border
        content.set_stroke_rgb(0.0, 0.0, 0.545);
        content.set_line_width(BORDER_WIDTH);
        content.rect(
            BORDER_INSET,
            BORDER_INSET,
            PAGE_WIDTH - 2.0 * BORDER_INSET,
            PAGE_HEIGHT - 2.0 * BORDER_INSET,
        );
        content.stroke();

        let name_line = format!("Farmer Name: {}", self.farmer_name);
        let status_line = format!("Crop Status: {}", self.status);
        let date_line = format!("Issue Date: {}", self.formatted_issue_date());

        draw_centered(&mut content, bold, Font::HelveticaBold, TITLE_SIZE, 140.0, "CROP HEALTH CERTIFICATE");
        draw_centered(&mut content, regular, Font::Helvetica, BODY_SIZE, 260.0, &name_line);
        draw_centered(&mut content, regular, Font::Helvetica, BODY_SIZE, 320.0, &status_line);
        draw_centered(&mut content, regular, Font::Helvetica, BODY_SIZE, 420.0, &date_line);

        pdf.stream(content_id, &content.finish());
        pdf.finish()
    }
}

/// Writes certificates into a directory
#[derive(Debug, Clone)]
pub struct CertificateGenerator {
    cert_dir: PathBuf,
}

impl CertificateGenerator {
    pub fn new(cert_dir: PathBuf) -> Self {
        Self { cert_dir }
    }

    pub fn cert_dir(&self) -> &Path {
        &self.cert_dir
    }

    /// Output path for a farmer's certificate
    ///
    /// Path separators in the name are replaced so the file stays inside the
    /// certificate directory.
    pub fn path_for(&self, farmer_name: &str) -> PathBuf {
        let stem: String = farmer_name
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '_',
                other => other,
            })
            .collect();
        let stem = if stem.trim_matches('.').is_empty() {
            stem.replace('.', "_")
        } else {
            stem
        };
        self.cert_dir.join(format!("{}_certificate.pdf", stem))
    }

    /// Generate a certificate dated today
    pub async fn generate(&self, farmer_name: &str) -> Result<PathBuf> {
        self.generate_on(farmer_name, Local::now().date_naive()).await
    }

    /// Generate a certificate with an explicit issue date
    pub async fn generate_on(&self, farmer_name: &str, issue_date: NaiveDate) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.cert_dir).await?;

        let path = self.path_for(farmer_name);
        let bytes = Certificate::new(farmer_name, issue_date).render_pdf();
        tokio::fs::write(&path, bytes).await?;

        info!("Certificate written: {}", path.display());
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Helvetica,
    HelveticaBold,
}

fn draw_centered(content: &mut Content, name: Name, font: Font, size: f32, from_top: f32, text: &str) {
    let encoded = encode_win_ansi(text);
    let x = (PAGE_WIDTH - text_width(&encoded, font, size)) / 2.0;
    let y = PAGE_HEIGHT - from_top;

    content.begin_text();
    content.set_font(name, size);
    content.next_line(x, y);
    content.show(Str(&encoded));
    content.end_text();
}

/// Encode text for the WinAnsi-encoded base fonts; unmapped characters print as '?'
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

/// Windows-1252 code for `c`
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

fn text_width(text: &[u8], font: Font, size: f32) -> f32 {
    let units: u32 = text.iter().map(|&b| glyph_width(b, font)).sum();
    units as f32 * size / 1000.0
}

/// Glyph advance widths (1/1000 em) from the Helvetica AFM metrics under WinAnsiEncoding
fn glyph_width(byte: u8, font: Font) -> u32 {
    const HELVETICA: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        278, 278, 278, 469, 556, 333, // '['..'`'
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
        334, 260, 334, 584, // '{'..'~'
    ];
    const HELVETICA_HIGH: [u16; 128] = [
        556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80
        350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667, // 0x90
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
    ];
    const HELVETICA_BOLD: [u16; 95] = [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ];
    const HELVETICA_BOLD_HIGH: [u16; 128] = [
        556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
        350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
        611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
    ];

    let (low, high) = match font {
        Font::Helvetica => (&HELVETICA, &HELVETICA_HIGH),
        Font::HelveticaBold => (&HELVETICA_BOLD, &HELVETICA_BOLD_HIGH),
    };

    match byte {
        32..=126 => u32::from(low[usize::from(byte - 32)]),
        128..=255 => u32::from(high[usize::from(byte - 128)]),
        _ => 556,
    }
}
