use clap::Args;
use metrics_exporter_prometheus::PrometheusHandle;
use reimbursement_engine::config::{AppConfig, EngineSettings};
use reimbursement_engine::engine::ReimbursementEngine;
use reimbursement_engine::error::AppError;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Command-line overrides for the engine's calibration inputs.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct EngineArgs {
    /// JSON engine configuration (defaults to the built-in reference calibration)
    #[arg(long)]
    pub(crate) engine_config: Option<PathBuf>,
    /// CSV of additional exact overrides
    #[arg(long)]
    pub(crate) overrides_csv: Option<PathBuf>,
    /// Trained general long-trip model artifact
    #[arg(long)]
    pub(crate) general_model: Option<PathBuf>,
    /// Trained high-receipt long-trip model artifact
    #[arg(long)]
    pub(crate) outlier_model: Option<PathBuf>,
}

impl EngineArgs {
    pub(crate) fn apply(self, settings: &mut EngineSettings) {
        if let Some(path) = self.engine_config {
            settings.config_path = Some(path);
        }
        if let Some(path) = self.overrides_csv {
            settings.overrides_csv = Some(path);
        }
        if let Some(path) = self.general_model {
            settings.general_model = path;
        }
        if let Some(path) = self.outlier_model {
            settings.outlier_model = path;
        }
    }
}

/// Load configuration from the environment and build the engine once.
pub(crate) fn load_engine(args: EngineArgs) -> Result<Arc<ReimbursementEngine>, AppError> {
    let mut config = AppConfig::load()?;
    args.apply(&mut config.engine);
    let engine = ReimbursementEngine::load(&config.engine)?;
    Ok(Arc::new(engine))
}
