//! Home page: the landing page when signed out, the config list otherwise

use crate::error::ViewError;
use crate::lifetime::ViewLifetime;
use crate::routes::Route;
use crate::state::ViewState;
use crate::ui::AppContext;
use crate::views::report;
use confstore_core::format::format_created_at;
use confstore_core::{ConfigId, ConfigItem};

pub const LANDING_TITLE: &str = "Hello";
pub const LANDING_TAGLINE: &str = "A simple config store app";
pub const LIST_HEADING: &str = "Your Configs";
pub const CREATE_LABEL: &str = "Create a new config";

/// Link to the create view, present whenever the list is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEntry {
    pub label: &'static str,
    pub route: Route,
}

/// One row of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: ConfigId,
    pub name: String,
    /// Creation date formatted for display, empty when unknown
    pub created: String,
    pub route: Route,
}

impl ListEntry {
    fn from_item(item: &ConfigItem) -> Self {
        Self {
            id: item.config_id.clone(),
            name: item.config_name.clone(),
            created: format_created_at(item.created_at),
            route: Route::Config(item.config_id.clone()),
        }
    }
}

/// What the home page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRender {
    Landing {
        title: &'static str,
        tagline: &'static str,
    },
    Configs {
        heading: &'static str,
        create: CreateEntry,
        /// `None` while the list is loading
        items: Option<Vec<ListEntry>>,
    },
}

/// List view
#[derive(Debug)]
pub struct ListView {
    ctx: AppContext,
    lifetime: ViewLifetime,
    state: ViewState,
    items: Vec<ConfigItem>,
}

impl ListView {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifetime: ViewLifetime::new(),
            state: ViewState::Idle,
            items: Vec::new(),
        }
    }

    /// Load the list; signed-out users get the landing page and no call
    ///
    /// # Errors
    /// The reported load failure, or `ViewError::Unmounted`
    pub async fn mount(&mut self) -> Result<(), ViewError> {
        if !self.ctx.session.is_authenticated() {
            tracing::debug!("signed out, showing landing page");
            return Ok(());
        }

        self.state.begin(ViewState::Loading)?;
        match self.lifetime.run(self.ctx.api.list()).await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "config list loaded");
                self.items = items;
                self.state.transition_to(ViewState::Loaded)
            }
            Err(ViewError::Unmounted) => Err(ViewError::Unmounted),
            Err(err) => {
                report(&self.ctx, &err);
                self.items.clear();
                self.state.transition_to(ViewState::Failed(err.to_string()))?;
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn render(&self) -> ListRender {
        if !self.ctx.session.is_authenticated() {
            return ListRender::Landing {
                title: LANDING_TITLE,
                tagline: LANDING_TAGLINE,
            };
        }

        let items = match self.state {
            ViewState::Loaded | ViewState::Failed(_) => {
                Some(self.items.iter().map(ListEntry::from_item).collect())
            }
            _ => None,
        };
        ListRender::Configs {
            heading: LIST_HEADING,
            create: CreateEntry {
                label: CREATE_LABEL,
                route: Route::NewConfig,
            },
            items,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }
}
