pub mod dish_service;
pub mod menu_service;

pub use dish_service::DishService;
pub use menu_service::MenuService;

use crate::auth::AuthUser;
use crate::media::ImageStore;

/// Who is asking; anonymous callers may see less
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated,
}

impl From<Option<&AuthUser>> for Viewer {
    fn from(user: Option<&AuthUser>) -> Self {
        match user {
            Some(_) => Viewer::Authenticated,
            None => Viewer::Anonymous,
        }
    }
}

/// Release blobs that no row points at any more. Failures are logged and
/// swallowed; the rows are already gone.
pub(crate) async fn release_images<I>(images: &dyn ImageStore, references: I)
where
    I: IntoIterator<Item = String>,
{
    for reference in references {
        if let Err(e) = images.remove(&reference).await {
            tracing::warn!("Failed to remove image {}: {}", reference, e);
        }
    }
}
