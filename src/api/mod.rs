pub mod extract;
pub mod format;
pub mod payload;

pub use extract::{ApiJson, ApiMultipart, ApiPath};
pub use format::{DishResponse, MenuDetail};
pub use payload::{DishPayload, MenuPayload};
