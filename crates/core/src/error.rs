use thiserror::Error;

use crate::model::{AppSettingsError, CatalogueError};
use crate::time::DateParseError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error(transparent)]
    DateParse(#[from] DateParseError),
    #[error(transparent)]
    AppSettings(#[from] AppSettingsError),
}
