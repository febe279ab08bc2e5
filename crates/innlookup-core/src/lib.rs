pub mod error;
pub mod extract;
pub mod inn;
pub mod record;

pub use error::{LookupError, Upstream};
pub use extract::{SENTINEL, extract_summary, scalar_text, text_at};
pub use inn::{INN_LEN, Inn, is_valid_inn};
pub use record::{CodeKind, EnrichmentRecord, Summary, SupplementaryCodes};
