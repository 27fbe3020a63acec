mod collections;
mod position;
mod render;
mod span;

pub use collections::FxDashMap;
pub use collections::FxHashMap;
pub use position::ByteOffset;
pub use position::LineCol;
pub use position::LineIndex;
pub use render::Diagnostic;
pub use render::DiagnosticRenderer;
pub use render::Severity;
pub use span::Span;
