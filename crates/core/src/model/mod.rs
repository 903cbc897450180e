mod app_settings;
mod catalogue;
mod ids;
mod item;
pub mod material;
mod user_settings;

pub use app_settings::{AppSettings, AppSettingsDraft, AppSettingsError};
pub use catalogue::{Catalogue, CatalogueError, Category};
pub use ids::{CategoryId, ItemId, ParseIdError};
pub use item::StudyItem;
pub use material::{Formula, PracticeQuestion, SolvedQuestion, StudyContent};
pub use user_settings::{DEFAULT_PLAN_LENGTH_DAYS, UserSettings};
