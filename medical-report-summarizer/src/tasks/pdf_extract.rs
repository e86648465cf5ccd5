use crate::error::{ReportError, Result};
use crate::models::ReportText;
use lopdf::Document;
use std::path::Path;
use tracing::{info, warn};

/// Extracts the text layer of every page, in page order, joined by newlines.
/// Pages without extractable text are skipped; a page whose content cannot
/// be parsed fails the whole document.
pub fn extract_text_from_pdf(pdf_path: impl AsRef<Path>) -> Result<ReportText> {
    let pdf_path = pdf_path.as_ref();
    info!("Extracting text from PDF: {}", pdf_path.display());

    let document = Document::load(pdf_path).map_err(|e| ReportError::PdfRead(e.to_string()))?;
    collect_page_text(&document)
}

/// Same as [`extract_text_from_pdf`] for a PDF already held in memory.
pub fn extract_text_from_pdf_bytes(pdf_bytes: &[u8]) -> Result<ReportText> {
    let document =
        Document::load_mem(pdf_bytes).map_err(|e| ReportError::PdfRead(e.to_string()))?;
    collect_page_text(&document)
}

fn collect_page_text(document: &Document) -> Result<ReportText> {
    let pages = document.get_pages();
    info!("PDF has {} page(s)", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let text = document.extract_text(&[*page_number]).map_err(|e| {
            warn!("Failed to read text of page {}: {}", page_number, e);
            ReportError::PdfRead(format!("page {}: {}", page_number, e))
        })?;

        // The text layer ends each text object with a line break.
        let text = text.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            info!("Page {} has no extractable text", page_number);
            continue;
        }
        page_texts.push(text.to_string());
    }

    let joined = page_texts.join("\n");
    info!(
        "Extracted {} characters from {} page(s)",
        joined.chars().count(),
        page_texts.len()
    );
    Ok(joined)
}

/// Builds a PDF with one page per entry. An empty entry gives a page with
/// an empty content stream, like a scanned page with no text layer.
#[cfg(test)]
pub(crate) fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = pages
        .iter()
        .map(|text| {
            if text.is_empty() {
                Vec::new()
            } else {
                format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text).into_bytes()
            }
        })
        .collect();
    make_test_pdf_from_contents(&contents)
}

/// Builds a PDF whose pages carry the given raw content streams.
#[cfg(test)]
pub(crate) fn make_test_pdf_from_contents(contents: &[Vec<u8>]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };

    let mut kids: Vec<Object> = Vec::with_capacity(contents.len());
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources.clone(),
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
