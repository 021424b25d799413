//! Printable HTML rendering of a receipt layout.
//!
//! Used when no thermal printer is reachable: the document is sized for
//! 58 mm paper and opens the browser's print dialog once loaded.

use std::fmt::Write;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use qrcode::{EcLevel, QrCode, render::svg};

use crate::{Align, Op, Receipt};

const STYLE: &str = "\
@page { size: 58mm auto; margin: 0; }
body { width: 58mm; margin: 0 auto; padding: 2mm; font-family: 'Courier New', monospace; font-size: 11px; }
.line { white-space: pre; }
.center { text-align: center; }
.bold { font-weight: bold; }
.big { font-size: 22px; }
.rule { border-top: 1px dashed #000; margin: 2px 0; }
.feed { height: 1em; }
.qr { text-align: center; word-break: break-all; margin: 4px 0; }
.cut { border-bottom: 1px dotted #999; margin-top: 6px; }
@media print { .cut { border: none; } }
";

/// Rendered QR edge in CSS pixels, about 38 mm on paper.
const QR_SIZE: u32 = 144;

#[derive(Default)]
struct Style {
    align: Option<Align>,
    bold: bool,
    big: bool,
}

impl Style {
    fn classes(&self) -> String {
        let mut classes = String::from("line");
        if self.align == Some(Align::Center) {
            classes.push_str(" center");
        }
        if self.bold {
            classes.push_str(" bold");
        }
        if self.big {
            classes.push_str(" big");
        }
        classes
    }
}

/// Renders the receipt as a standalone HTML document.
pub fn render(receipt: &Receipt) -> String {
    let mut body = String::new();
    let mut style = Style::default();

    for op in &receipt.ops {
        match op {
            Op::Align(align) => style.align = Some(*align),
            Op::Bold(on) => style.bold = *on,
            Op::Size(width, height) => style.big = *width > 1 || *height > 1,
            Op::Line(text) => {
                let _ = writeln!(
                    body,
                    r#"<div class="{}">{}</div>"#,
                    style.classes(),
                    escape(text)
                );
            }
            Op::Rule => body.push_str("<div class=\"rule\"></div>\n"),
            Op::Feed(lines) => {
                for _ in 0..*lines {
                    body.push_str("<div class=\"feed\"></div>\n");
                }
            }
            Op::Qr(url) => {
                if let Some(image) = qr_image(url) {
                    let _ = writeln!(
                        body,
                        r#"<div class="qr"><img class="qr-code" src="{image}" alt="QR code" width="{QR_SIZE}" height="{QR_SIZE}"></div>"#
                    );
                }
                let url = escape(url);
                let _ = writeln!(body, r#"<div class="qr"><a href="{url}">{url}</a></div>"#);
            }
            Op::Cut => body.push_str("<div class=\"cut\"></div>\n"),
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Receipt {}</title>\n<style>\n{STYLE}</style>\n</head>\n<body onload=\"window.print()\">\n{body}</body>\n</html>\n",
        escape(&receipt.payment_id)
    )
}

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// SVG QR code as a data URI, same error correction level as the printed one.
fn qr_image(data: &str) -> Option<String> {
    let code = QrCode::with_error_correction_level(data, EcLevel::M).ok()?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build();
    Some(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}
