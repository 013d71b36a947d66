//! services/api/src/render/html.rs
//!
//! HTML preview of the deck. Dark background with white text, one `slide` div
//! per generated slide, matching the look of the exported document closely
//! enough to proofread against.

use pitchdeck_core::catalog::{SlideType, DECK_ORDER};
use pitchdeck_core::domain::{Language, Slide};
use std::collections::HashMap;

const STYLE: &str = r#"
        body {
            background-color: #0e1117;
            color: white;
            font-family: Arial, sans-serif;
            padding: 20px;
        }
        .slide {
            margin-bottom: 40px;
            color: white;
        }
        .slide-title {
            color: white;
            font-size: 24px;
            margin-bottom: 15px;
            border-bottom: 1px solid #ffffff40;
            padding-bottom: 10px;
        }
        .slide-content {
            color: white;
            font-size: 16px;
            line-height: 1.5;
            padding-left: 20px;
        }
        .bullet-point {
            color: white;
            margin-bottom: 8px;
            padding-left: 15px;
            position: relative;
        }
        .bullet-point:before {
            content: "\2022";
            position: absolute;
            left: 0;
            color: white;
        }
        .introduction-text {
            color: white;
            font-size: 16px;
            line-height: 1.6;
            padding-left: 20px;
            margin-bottom: 20px;
        }
"#;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the deck as a standalone HTML page, slides in canonical deck order.
pub fn render_html(slides: &[Slide], language: Language) -> String {
    let by_type: HashMap<SlideType, &Slide> =
        slides.iter().map(|s| (s.slide_type, s)).collect();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!("<html lang=\"{}\">\n", language.code()));
    html.push_str("<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    for slide_type in DECK_ORDER {
        let Some(slide) = by_type.get(slide_type) else {
            continue;
        };
        html.push_str("<div class=\"slide\">");
        html.push_str(&format!(
            "<div class=\"slide-title\">{}</div>",
            escape(slide_type.display_name(language))
        ));

        if *slide_type == SlideType::Introduction {
            let paragraph = slide.content.split_whitespace().collect::<Vec<_>>().join(" ");
            html.push_str(&format!(
                "<div class=\"introduction-text\">{}</div>",
                escape(&paragraph)
            ));
        } else {
            html.push_str("<div class=\"slide-content\">");
            for raw in slide.content.lines() {
                let line = raw.trim();
                if line.is_empty() {
                    continue;
                }
                let line = line.strip_prefix("- ").unwrap_or(line);
                html.push_str(&format!(
                    "<div class=\"bullet-point\">{}</div>",
                    escape(line)
                ));
            }
            html.push_str("</div>");
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
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

    #[test]
    fn slides_render_in_deck_order() {
        let slides = vec![
            slide(SlideType::Ask, "- Raising seed"),
            slide(SlideType::Title, "Acme"),
        ];
        let html = render_html(&slides, Language::English);
        let title_pos = html.find("Title Slide").unwrap();
        let ask_pos = html.find("Ask").unwrap();
        assert!(title_pos < ask_pos);
    }

    #[test]
    fn introduction_renders_as_paragraph() {
        let slides = vec![slide(SlideType::Introduction, "We are Acme.\nWe build robots.")];
        let html = render_html(&slides, Language::English);
        assert!(html.contains("introduction-text"));
        assert!(html.contains("We are Acme. We build robots."));
        assert!(!html.contains("bullet-point\">We are"));
    }

    #[test]
    fn dash_prefixes_become_bullet_points() {
        let slides = vec![slide(SlideType::Problem, "- Costs too high")];
        let html = render_html(&slides, Language::English);
        assert!(html.contains("<div class=\"bullet-point\">Costs too high</div>"));
    }

    #[test]
    fn markup_in_content_is_escaped() {
        let slides = vec![slide(SlideType::Problem, "- Costs <b>way</b> too high & rising")];
        let html = render_html(&slides, Language::English);
        assert!(html.contains("&lt;b&gt;way&lt;/b&gt;"));
        assert!(html.contains("&amp; rising"));
    }

    #[test]
    fn norwegian_deck_uses_norwegian_titles_and_lang() {
        let slides = vec![slide(SlideType::Title, "Acme")];
        let html = render_html(&slides, Language::Norwegian);
        assert!(html.contains("<html lang=\"no\">"));
        assert!(html.contains("Tittelside"));
    }
}
