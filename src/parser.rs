use crate::ast::RawDocument;
use crate::error::ParseError;
use crate::utils::offset_of;
use miette::NamedSource;
use serde_json::error::Category;

/// Reads a raw specification document.
///
/// Only the shape of the tree is checked here. Any failure is structural and applies to
/// this one document; semantic problems are left to the validator.
///
/// # Errors
/// Returns [`ParseError::Syntax`] when the text is not valid JSON and
/// [`ParseError::Shape`] when it is JSON of the wrong shape.
pub fn parse_document(source: &str, file_name: &str) -> Result<RawDocument, ParseError> {
    serde_json::from_str(source).map_err(|err| {
        let offset = offset_of(source, err.line(), err.column());
        let span = (offset, 0).into();
        let src = NamedSource::new(file_name, source.to_string());
        let message = strip_position(&err);
        log::debug!("{file_name}: structural parse failure: {message}");
        match err.classify() {
            Category::Data => ParseError::Shape { message, src, span },
            Category::Syntax | Category::Eof | Category::Io => {
                ParseError::Syntax { message, src, span }
            }
        }
    })
}

// serde_json appends " at line X column Y"; the span already carries that.
fn strip_position(err: &serde_json::Error) -> String {
    let text = err.to_string();
    match text.rfind(" at line ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}
