use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

use super::InputError;

/// Text of every body paragraph in document order, one paragraph per line.
///
/// Tables, headers and embedded objects are skipped. An empty paragraph
/// contributes an empty line.
pub fn paragraph_text(bytes: &[u8]) -> Result<String, InputError> {
    let docx = read_docx(bytes).map_err(|err| InputError::InvalidDocument(err.to_string()))?;
    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(flatten(paragraph)),
            _ => None,
        })
        .collect();
    Ok(paragraphs.join("\n"))
}

fn flatten(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
