use std::sync::Arc;

use crate::auth::Authenticator;
use crate::database::MenuStore;
use crate::media::ImageStore;

/// Behaviour switches taken from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceOptions {
    pub hide_empty_menus_from_public: bool,
}

/// Collaborators shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MenuStore>,
    pub images: Arc<dyn ImageStore>,
    pub auth: Arc<dyn Authenticator>,
    pub options: ServiceOptions,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MenuStore>,
        images: Arc<dyn ImageStore>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            store,
            images,
            auth,
            options: ServiceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }
}
