use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, instrument};

use crate::model::quote::QuoteRequest;

const PAGE_WIDTH_PT: f32 = 595.0;
const PAGE_HEIGHT_PT: f32 = 842.0;
const PAGE_MARGIN: f32 = 72.0;

const FONT_NORMAL: &str = "F1";
const FONT_BOLD: &str = "F2";

const SIZE_TITLE: f32 = 16.0;
const SIZE_NORMAL: f32 = 12.0;
const SIZE_ITEM: f32 = 11.0;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF build error: {0}")]
    Build(#[from] lopdf::Error),

    #[error("PDF write error: {0}")]
    Io(#[from] std::io::Error),
}

/// How monetary amounts are printed on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyStyle {
    /// `$1,234.56`: dollar prefix, two decimals (inline-PDF variant)
    DollarPrefix,
    /// `1,234 USD`: zero decimals, currency code suffix (email variant)
    CodeSuffix,
}

struct Line {
    text: String,
    font: &'static str,
    size: f32,
    gap_before: f32,
}

impl Line {
    fn new(text: impl Into<String>, font: &'static str, size: f32) -> Self {
        Line {
            text: text.into(),
            font,
            size,
            gap_before: 0.0,
        }
    }

    fn with_gap(mut self, gap: f32) -> Self {
        self.gap_before = gap;
        self
    }
}

/// Renders a canonical quote record into PDF bytes.
///
/// Output is byte-deterministic for identical input: the document embeds no
/// timestamps or random identifiers beyond the quote id passed in, and
/// object numbering follows insertion order. Content streams are left
/// uncompressed. When the text cursor would cross the bottom margin the
/// renderer starts a new page, so long selection lists never clip.
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        PdfRenderer
    }

    #[instrument(skip(self, quote), fields(quote_id = %quote_id, selections = quote.selections.len()))]
    pub fn render(
        &self,
        quote: &QuoteRequest,
        quote_id: &str,
        style: MoneyStyle,
    ) -> Result<Vec<u8>, PdfError> {
        let lines = self.layout_lines(quote, quote_id, style);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        let mut operations: Vec<Operation> = Vec::new();
        let mut y = PAGE_HEIGHT_PT - PAGE_MARGIN;

        for line in &lines {
            y -= line.gap_before;
            let advance = line.size + 6.0;
            if y - advance < PAGE_MARGIN {
                flush_page(&mut doc, pages_id, &mut kids, std::mem::take(&mut operations))?;
                y = PAGE_HEIGHT_PT - PAGE_MARGIN;
            }
            y -= advance;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![line.font.into(), line.size.into()],
            ));
            operations.push(Operation::new("Td", vec![PAGE_MARGIN.into(), y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.text.as_str())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        flush_page(&mut doc, pages_id, &mut kids, operations)?;

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        debug!(size = bytes.len(), pages = page_count, "PDF rendered");
        Ok(bytes)
    }

    fn layout_lines(&self, quote: &QuoteRequest, quote_id: &str, style: MoneyStyle) -> Vec<Line> {
        let money = |amount: f64| format_money(amount, style, &quote.currency);

        let mut lines = vec![
            Line::new("VC999 Quote", FONT_BOLD, SIZE_TITLE),
            Line::new(format!("Quote ID: {}", quote_id), FONT_NORMAL, SIZE_NORMAL),
            Line::new(format!("Model: {}", quote.model), FONT_NORMAL, SIZE_NORMAL),
            Line::new(
                format!("Customer: {}", quote.customer_name),
                FONT_NORMAL,
                SIZE_NORMAL,
            ),
        ];
        if !quote.customer_email.is_empty() {
            lines.push(Line::new(
                format!("Email: {}", quote.customer_email),
                FONT_NORMAL,
                SIZE_NORMAL,
            ));
        }
        lines.push(Line::new(
            format!("Base price: {}", money(quote.base_price)),
            FONT_NORMAL,
            SIZE_NORMAL,
        ));
        lines.push(Line::new(
            format!("Total: {}", money(quote.total_price)),
            FONT_NORMAL,
            SIZE_NORMAL,
        ));

        lines.push(Line::new("Selections:", FONT_BOLD, SIZE_NORMAL).with_gap(10.0));
        if quote.selections.is_empty() {
            lines.push(Line::new("- No selections", FONT_NORMAL, SIZE_ITEM));
        } else {
            for sel in &quote.selections {
                let step = sel.step.as_deref().unwrap_or("Step");
                let option = sel.option.as_deref().unwrap_or("-");
                lines.push(Line::new(
                    format!("- {}: {} (+{})", step, option, money(sel.price)),
                    FONT_NORMAL,
                    SIZE_ITEM,
                ));
            }
        }
        lines
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        PdfRenderer::new()
    }
}

fn flush_page(
    doc: &mut Document,
    pages_id: lopdf::ObjectId,
    kids: &mut Vec<Object>,
    operations: Vec<Operation>,
) -> Result<(), PdfError> {
    if operations.is_empty() && !kids.is_empty() {
        return Ok(());
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => dictionary! {
            "Font" => dictionary! {
                FONT_NORMAL => dictionary! {
                    "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Helvetica",
                },
                FONT_BOLD => dictionary! {
                    "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Helvetica-Bold",
                },
            },
        },
        "MediaBox" => vec![0f32.into(), 0f32.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
        "Contents" => content_id,
    });
    kids.push(Object::Reference(page_id));
    Ok(())
}

/// Locale-style amount formatting with thousands separators.
pub fn format_money(amount: f64, style: MoneyStyle, currency: &str) -> String {
    match style {
        MoneyStyle::DollarPrefix => format!("${}", format_thousands(amount, 2)),
        MoneyStyle::CodeSuffix => format!("{} {}", format_thousands(amount, 0), currency),
    }
}

fn format_thousands(amount: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands_grouping() {
        assert_eq!(format_thousands(100.0, 0), "100");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1234567.0, 0), "1,234,567");
        assert_eq!(format_thousands(1234.5, 2), "1,234.50");
        assert_eq!(format_thousands(-9876.0, 0), "-9,876");
    }

    #[test]
    fn test_format_money_styles() {
        assert_eq!(
            format_money(1234.5, MoneyStyle::DollarPrefix, "USD"),
            "$1,234.50"
        );
        assert_eq!(
            format_money(1234.6, MoneyStyle::CodeSuffix, "MXN"),
            "1,235 MXN"
        );
        assert_eq!(format_money(100.0, MoneyStyle::CodeSuffix, "USD"), "100 USD");
    }
}
