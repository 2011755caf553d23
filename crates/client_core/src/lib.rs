pub mod agenda;
pub mod controller;
pub mod error;
pub mod import;
pub mod repository;
pub mod store;
pub mod transport;
pub mod views;

pub use agenda::{AgendaClient, DEFAULT_PROJECTOR_ID};
pub use controller::{AgendaController, Alert, Saved};
pub use error::{ClientError, Result};
pub use import::{BulkImporter, ImportOutcome, ImportProgress, ImportReport};
pub use repository::{Repository, Resource, RestRepository};
pub use store::{ResourceStore, StoreEvent, Subscription};
pub use views::{resolve, resolve_slide, Route, Slide, View};

#[cfg(test)]
#[path = "tests/mock_server.rs"]
mod mock_server;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
