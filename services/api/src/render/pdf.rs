//! services/api/src/render/pdf.rs
//!
//! Minimal PDF 1.4 writer for the exported deck. Each slide starts on its own
//! A4 page with a bold title and wrapped body text; slides that run past the
//! bottom margin continue on a fresh page. Only the two built-in Helvetica
//! faces are used, so no fonts need embedding.

use super::metrics;
use pitchdeck_core::catalog::{SlideType, DECK_ORDER};
use pitchdeck_core::domain::{Language, Slide};
use std::collections::HashMap;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 60.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 14.0;

//=========================================================================================
// Page Assembly
//=========================================================================================

struct PageWriter {
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Draws one line of text, breaking to a new page first if the cursor has
    /// passed the bottom margin.
    fn draw_line(&mut self, font: &str, size: f32, x: f32, text: &str) {
        if self.y < MARGIN {
            self.new_page();
        }
        self.current.extend_from_slice(
            format!("BT /{} {:.1} Tf {:.1} {:.1} Td (", font, size, x, self.y).as_bytes(),
        );
        self.current.extend_from_slice(&encode_text(text));
        self.current.extend_from_slice(b") Tj ET\n");
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        if !self.current.is_empty() {
            self.pages.push(self.current);
        }
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self.pages
    }
}

/// Encodes `text` as a WinAnsi PDF string, escaping the string delimiters.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            c if (c as u32) < 0x80 || (0xa0..=0xff).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        };
        if byte == b'(' || byte == b')' || byte == b'\\' {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

//=========================================================================================
// Rendering
//=========================================================================================

/// Renders the deck to PDF bytes. Slides appear in canonical deck order, one
/// page per slide.
pub fn render_pdf(slides: &[Slide], language: Language) -> Vec<u8> {
    let by_type: HashMap<SlideType, &Slide> =
        slides.iter().map(|s| (s.slide_type, s)).collect();
    let bullet = language.bullet();

    let mut writer = PageWriter::new();
    let mut first_slide = true;

    for slide_type in DECK_ORDER {
        let Some(slide) = by_type.get(slide_type) else {
            continue;
        };
        if !first_slide {
            writer.new_page();
        }
        first_slide = false;

        writer.draw_line("F2", TITLE_SIZE, MARGIN, slide_type.display_name(language));
        writer.advance(TITLE_SIZE + 12.0);

        if *slide_type == SlideType::Introduction {
            // The introduction reads as one paragraph, so newlines collapse.
            let paragraph = slide.content.split_whitespace().collect::<Vec<_>>().join(" ");
            for line in metrics::wrap(&paragraph, BODY_SIZE, PAGE_WIDTH - 2.0 * MARGIN) {
                writer.draw_line("F1", BODY_SIZE, MARGIN, &line);
                writer.advance(LINE_HEIGHT);
            }
        } else {
            let indent = MARGIN + 10.0;
            let width = PAGE_WIDTH - 2.0 * MARGIN - 20.0;
            for raw in slide.content.lines() {
                let line = raw.trim();
                if line.is_empty() {
                    continue;
                }
                let line = line.strip_prefix("- ").unwrap_or(line);
                let bulleted = format!("{} {}", bullet, line);
                for wrapped in metrics::wrap(&bulleted, BODY_SIZE, width) {
                    writer.draw_line("F1", BODY_SIZE, indent, &wrapped);
                    writer.advance(LINE_HEIGHT);
                }
            }
        }
    }

    assemble(writer.finish())
}

/// Serializes content streams into a complete PDF file with catalog, page
/// tree, font resources, xref table and trailer.
fn assemble(pages: Vec<Vec<u8>>) -> Vec<u8> {
    let page_count = pages.len();
    let total_objects = 4 + 2 * page_count;
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::with_capacity(total_objects);

    out.extend_from_slice(b"%PDF-1.4\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 5 + 2 * i)).collect();

    let write_obj = |out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &[u8]| {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    };

    write_obj(
        &mut out,
        &mut offsets,
        1,
        b"<< /Type /Catalog /Pages 2 0 R >>",
    );
    write_obj(
        &mut out,
        &mut offsets,
        2,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .as_bytes(),
    );
    write_obj(
        &mut out,
        &mut offsets,
        3,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    write_obj(
        &mut out,
        &mut offsets,
        4,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (i, content) in pages.iter().enumerate() {
        write_obj(
            &mut out,
            &mut offsets,
            5 + 2 * i,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH as u32,
                PAGE_HEIGHT as u32,
                6 + 2 * i
            )
            .as_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        write_obj(&mut out, &mut offsets, 6 + 2 * i, &stream);
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", total_objects + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            total_objects + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}

//=========================================================================================
// Unit Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn slide(slide_type: SlideType, content: &str) -> Slide {
        Slide {
            slide_type,
            content: content.to_string(),
            language: Language::English,
            updated_at: Utc::now(),
        }
    }

    fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn output_has_pdf_header_and_trailer() {
        let bytes = render_pdf(&[slide(SlideType::Title, "Acme Robotics")], Language::English);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn each_slide_gets_its_own_page() {
        let slides = vec![
            slide(SlideType::Title, "Acme"),
            slide(SlideType::Problem, "- Costs too high\n- No tooling"),
            slide(SlideType::Solution, "- Automate it"),
        ];
        let bytes = render_pdf(&slides, Language::English);
        assert_eq!(count_occurrences(&bytes, b"/Type /Page "), 3);
    }

    #[test]
    fn long_slides_spill_onto_extra_pages() {
        let body = (0..120)
            .map(|i| format!("- Bullet point number {} with a reasonably long tail", i))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = render_pdf(&[slide(SlideType::Market, &body)], Language::English);
        assert!(count_occurrences(&bytes, b"/Type /Page ") > 1);
    }

    #[test]
    fn parens_in_content_are_escaped() {
        let bytes = render_pdf(
            &[slide(SlideType::Ask, "- Raising $2M (seed)")],
            Language::English,
        );
        assert!(count_occurrences(&bytes, b"\\(seed\\)") == 1);
    }

    #[test]
    fn norwegian_decks_use_dash_bullets() {
        let bytes = render_pdf(
            &[slide(SlideType::Problem, "Dyrt og tungvint")],
            Language::Norwegian,
        );
        assert!(count_occurrences(&bytes, b"(- Dyrt og tungvint)") == 1);
    }

    #[test]
    fn empty_deck_still_produces_a_valid_file() {
        let bytes = render_pdf(&[], Language::English);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(count_occurrences(&bytes, b"/Type /Page "), 1);
    }
}
