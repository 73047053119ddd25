//! Domain services. Every rule the portal enforces lives here behind a
//! constructor-injected gateway; HTTP handlers stay parse-and-render thin.

pub mod catalog;
pub mod enrollment;
pub mod favorites;
pub mod profile;
pub mod reports;

pub use catalog::CatalogService;
pub use enrollment::EnrollmentService;
pub use favorites::FavoriteService;
pub use profile::ProfileService;
pub use reports::StatsService;
