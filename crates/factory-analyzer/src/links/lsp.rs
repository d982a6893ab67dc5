use tower_lsp::lsp_types::{DocumentLink, Location, Position, Range, Url};

use crate::{document::Document, index::DefinitionLocation, links::provider::FactoryLink};

/// `file://` URI of the definition with a `#L<line>` fragment (1-based), the
/// form editors use to open a link target at a given line.
pub fn definition_target_uri(target: &DefinitionLocation) -> Option<Url> {
    let mut uri = Url::from_file_path(&target.source_path).ok()?;
    uri.set_fragment(Some(&format!("L{}", target.line + 1)));
    Some(uri)
}

pub fn to_document_link(
    document: &Document,
    link: &FactoryLink,
) -> Option<DocumentLink> {
    let target = definition_target_uri(&link.target)?;
    Some(DocumentLink {
        range: Range {
            start: document.position_of(link.range.start),
            end: document.position_of(link.range.end),
        },
        target: Some(target),
        tooltip: Some(format!("Jump to factory definition: {}", link.name)),
        data: None,
    })
}

/// Go-to-definition target: the start of the definition line.
pub fn to_location(target: &DefinitionLocation) -> Option<Location> {
    let uri = Url::from_file_path(&target.source_path).ok()?;
    let start = Position::new(target.line, 0);
    Some(Location {
        uri,
        range: Range {
            start,
            end: start,
        },
    })
}

#[cfg(test)]
#[path = "../../tests/src/links/lsp_tests.rs"]
mod tests;
