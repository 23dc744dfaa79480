use crate::error::{EmbedError, ExtractError};

/// Maps text to a fixed-dimension vector via some embedding backend.
pub trait Embedder: Send + Sync {
    /// Stable identifier of the backend/model (e.g. `openai:text-embedding-3-small`).
    fn model_id(&self) -> &str;
    /// Embedding dimensionality when known up front; remote services may only
    /// reveal it with the first response.
    fn dim(&self) -> Option<usize>;
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Turns image bytes into a textual description suitable for retrieval.
pub trait VisionDescriber: Send + Sync {
    fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractError>;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn model_id(&self) -> &str { (**self).model_id() }
    fn dim(&self) -> Option<usize> { (**self).dim() }
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> { (**self).embed(text) }
}

impl<T: VisionDescriber + ?Sized> VisionDescriber for Box<T> {
    fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractError> { (**self).describe(image, mime_type) }
}
