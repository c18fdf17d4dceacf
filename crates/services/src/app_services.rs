use std::sync::Arc;

use storage::repository::Storage;
use train_core::model::Catalog;

use crate::Clock;
use crate::error::AppServicesError;
use crate::feedback::Feedback;
use crate::report_service::ReportService;
use crate::sessions::TrainingLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    training: Arc<TrainingLoopService>,
    reports: Arc<ReportService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and restore history.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or history loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, seed, ReportService::from_env()).await
    }

    /// Build services over any storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the level catalog is malformed or history
    /// cannot be loaded.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        seed: Option<u64>,
        reports: ReportService,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::standard()?);
        let mut training = TrainingLoopService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.results),
            Feedback::tracing(),
        );
        if let Some(seed) = seed {
            training = training.with_seed(seed);
        }
        training.load_history().await?;

        Ok(Self {
            catalog,
            training: Arc::new(training),
            reports: Arc::new(reports),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn training(&self) -> Arc<TrainingLoopService> {
        Arc::clone(&self.training)
    }

    #[must_use]
    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.reports)
    }
}
