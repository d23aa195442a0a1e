use crate::binding::{resolve, resolve_metadata, Shape};
use crate::envelope::InvocationRequest;
use crate::error::ResolveError;

/// A blob-trigger binding: content from `Data`, location from `Metadata`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobData {
    pub name: String,
    pub uri: String,
    pub content: String,
}

impl BlobData {
    pub fn resolve(request: &InvocationRequest, binding: &str) -> Result<Self, ResolveError> {
        let content = resolve(request, binding, Shape::Text)?.into_text().unwrap_or_default();
        let uri = resolve_metadata(request, "Uri", Shape::Text)?.into_text().unwrap_or_default();
        let name = resolve_metadata(request, "Name", Shape::Text)?.into_text().unwrap_or_default();

        Ok(Self { name, uri, content })
    }
}
