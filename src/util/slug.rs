use chrono::Utc;
use uuid::Uuid;

/// ASCII-only, alphanumeric-and-underscore derivation of a display string,
/// safe for filenames. Common Spanish accents are folded to their base
/// letter; everything else non-alphanumeric becomes an underscore, runs of
/// underscores collapse, and an empty result falls back to "quote".
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_sep = true;
    for ch in value.chars() {
        let folded = fold_accent(ch);
        if folded.is_ascii_alphanumeric() {
            out.push(folded);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "quote".to_string()
    } else {
        trimmed.to_string()
    }
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        other => other,
    }
}

/// Deterministic-format output filename:
/// `Quote_<slug(model)>_<slug(customer)>_<YYYYmmdd_HHMMSS>_<uid8>.pdf`.
///
/// The 8-hex uuid suffix keeps two requests with identical model and
/// customer within the same second from colliding in the output directory.
pub fn build_filename(model: &str, customer_name: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let uid = Uuid::new_v4().simple().to_string();
    format!(
        "Quote_{}_{}_{}_{}.pdf",
        slugify(model),
        slugify(customer_name),
        timestamp,
        &uid[..8]
    )
}
