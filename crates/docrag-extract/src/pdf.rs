use lopdf::Document;
use tracing::debug;

use docrag_core::ExtractError;

/// Text of every page in order, one page per line. Pages that fail to decode
/// or carry no text are skipped.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;
    let mut pages = Vec::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => debug!(page = page_num, error = %e, "skipping unreadable page"),
        }
    }
    Ok(pages.join("\n"))
}
