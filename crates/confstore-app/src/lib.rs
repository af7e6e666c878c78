//! confstore app - views and route guards
//!
//! The front-end-agnostic half of the config store client:
//! - [`routes`]: the route table and the auth guards
//! - [`views`]: list, create and detail views as explicit state machines
//! - [`lifetime`]: aborts in-flight calls when a view goes away
//! - [`ui`]: the notifier and prompt seams a front end implements
//!
//! # Example
//!
//! ```rust,ignore
//! use confstore_app::prelude::*;
//!
//! # async fn example(config: AppConfig, session: Session) -> anyhow::Result<()> {
//! let ctx = AppContext::from_config(&config, session.reader())?;
//! if let Resolution::Render(Route::Home) = Router::new(session.reader()).resolve("/") {
//!     let mut list = ListView::new(ctx);
//!     list.mount().await?;
//!     println!("{:?}", list.render());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod lifetime;
pub mod routes;
pub mod state;
pub mod terminal;
pub mod ui;
pub mod views;

pub use error::ViewError;
pub use lifetime::{UnmountHandle, ViewLifetime};
pub use routes::{Guard, Resolution, Route, Router};
pub use state::ViewState;
pub use ui::{
    AcceptPrompt, AppContext, ConfirmPrompt, DeclinePrompt, LogNotifier, Notice, Notifier,
};
pub use views::{CreateView, DetailView, ListRender, ListView};

/// Prelude for front ends
pub mod prelude {
    pub use crate::routes::{Resolution, Route, Router};
    pub use crate::ui::{AppContext, ConfirmPrompt, Notice, Notifier};
    pub use crate::views::{CreateView, DetailView, ListRender, ListView};
    pub use crate::ViewError;
    pub use confstore_core::{AppConfig, ConfigId, LocalFile, Session};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
