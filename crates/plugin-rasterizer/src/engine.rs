//! The `RenderEngine` trait and provider selection.

use std::sync::Arc;

use tracing::info;

use rasterhub_core::config::engine::EngineConfig;
use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_entity::op::OperationDescriptor;

/// Stateless rasterization capability.
///
/// `render` mutates the RGBA buffer in place. The buffer is exclusively
/// owned by the caller for the duration of the call; implementations must
/// not retain references to it. A non-zero engine status surfaces as an
/// `ErrorKind::RenderEngine` error carrying the verbatim code.
pub trait RenderEngine: Send + Sync + std::fmt::Debug + 'static {
    /// Apply one operation to the pixel buffer.
    fn render(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        op: &OperationDescriptor,
    ) -> AppResult<()>;
}

/// Build the configured rasterization engine.
pub fn build_engine(config: &EngineConfig) -> AppResult<Arc<dyn RenderEngine>> {
    match config.provider.as_str() {
        "native" => {
            if config.library_path.is_empty() {
                return Err(AppError::configuration(
                    "engine.library_path is required for the native provider",
                ));
            }
            info!(path = %config.library_path, "Loading native rasterizer");
            let engine = crate::ffi::wrapper::NativeRasterizer::load(&config.library_path)?;
            Ok(Arc::new(engine))
        }
        "mock" => {
            info!("Using mock rasterizer");
            Ok(Arc::new(crate::mock::MockRasterizer::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown engine provider: '{other}'. Supported: native, mock"
        ))),
    }
}
