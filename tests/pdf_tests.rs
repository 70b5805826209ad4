use cotizador_backend::model::quote::{QuoteRequest, Selection};
use cotizador_backend::util::pdf::{MoneyStyle, PdfRenderer};

fn sample_quote(selections: Vec<Selection>) -> QuoteRequest {
    QuoteRequest {
        model: "X1".to_string(),
        customer_name: "Ana".to_string(),
        customer_email: "a@b.com".to_string(),
        base_price: 1000.0,
        total_price: 1234.5,
        currency: "USD".to_string(),
        selections,
    }
}

fn pdf_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn test_rendering_is_deterministic() {
    let renderer = PdfRenderer::new();
    let quote = sample_quote(vec![Selection {
        step: Some("Bomba".to_string()),
        option: Some("100 m3".to_string()),
        price: 250.0,
    }]);

    let first = renderer
        .render(&quote, "Quote_X1_Ana_20260101_000000_abcd1234", MoneyStyle::DollarPrefix)
        .unwrap();
    let second = renderer
        .render(&quote, "Quote_X1_Ana_20260101_000000_abcd1234", MoneyStyle::DollarPrefix)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_document_lines_in_order() {
    let renderer = PdfRenderer::new();
    let quote = sample_quote(vec![Selection {
        step: Some("Bomba".to_string()),
        option: Some("100 m3".to_string()),
        price: 250.0,
    }]);

    let bytes = renderer.render(&quote, "q-1", MoneyStyle::DollarPrefix).unwrap();
    let text = pdf_text(&bytes);

    let expected = [
        "VC999 Quote",
        "Quote ID: q-1",
        "Model: X1",
        "Customer: Ana",
        "Email: a@b.com",
        "Base price: $1,000.00",
        "Total: $1,234.50",
        "Selections:",
        "- Bomba: 100 m3 ",
        "+$250.00",
    ];
    let mut cursor = 0;
    for line in expected {
        let pos = text[cursor..]
            .find(line)
            .unwrap_or_else(|| panic!("missing line {line:?}"));
        cursor += pos + 1;
    }
}

#[test]
fn test_empty_selections_render_placeholder() {
    let renderer = PdfRenderer::new();
    let quote = sample_quote(vec![]);

    let bytes = renderer.render(&quote, "q-2", MoneyStyle::DollarPrefix).unwrap();
    assert!(pdf_text(&bytes).contains("- No selections"));
}

#[test]
fn test_missing_step_and_option_get_placeholders() {
    let renderer = PdfRenderer::new();
    let quote = sample_quote(vec![Selection {
        step: None,
        option: None,
        price: 0.0,
    }]);

    let bytes = renderer.render(&quote, "q-3", MoneyStyle::DollarPrefix).unwrap();
    let text = pdf_text(&bytes);
    assert!(text.contains("- Step: - "));
    assert!(text.contains("+$0.00"));
}

#[test]
fn test_email_style_uses_currency_code() {
    let renderer = PdfRenderer::new();
    let mut quote = sample_quote(vec![]);
    quote.currency = "MXN".to_string();
    quote.total_price = 2500.0;
    quote.base_price = 2500.0;

    let bytes = renderer.render(&quote, "q-4", MoneyStyle::CodeSuffix).unwrap();
    let text = pdf_text(&bytes);
    assert!(text.contains("Total: 2,500 MXN"));
}

#[test]
fn test_long_selection_list_spills_to_new_page() {
    let renderer = PdfRenderer::new();
    let selections = (0..120)
        .map(|i| Selection {
            step: Some(format!("Paso {i}")),
            option: Some(format!("Opcion {i}")),
            price: i as f64,
        })
        .collect();
    let quote = sample_quote(selections);

    let bytes = renderer.render(&quote, "q-5", MoneyStyle::DollarPrefix).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).expect("output must parse as PDF");
    assert!(
        doc.get_pages().len() >= 2,
        "expected overflow onto a second page, got {} page(s)",
        doc.get_pages().len()
    );

    // every line made it into some page's content
    let text = pdf_text(&bytes);
    assert!(text.contains("Paso 0"));
    assert!(text.contains("Paso 119"));
}

#[test]
fn test_single_page_for_short_quotes() {
    let renderer = PdfRenderer::new();
    let quote = sample_quote(vec![]);

    let bytes = renderer.render(&quote, "q-6", MoneyStyle::DollarPrefix).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}
