use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

/// Selects the compute device for `component` based on enabled features.
///
/// GPU backends are tried in order (Metal, then CUDA). Every failure falls
/// back to CPU, so a device is always available.
pub fn select_device(component: &'static str) -> Device {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    {
        let mut failures: Vec<String> = Vec::new();

        #[cfg(feature = "metal")]
        {
            match Device::new_metal(0) {
                Ok(device) => {
                    info!(component, "Using Metal GPU acceleration");
                    return device;
                }
                Err(e) => failures.push(format!("metal failed: {e}")),
            }
        }

        #[cfg(feature = "cuda")]
        {
            match Device::new_cuda(0) {
                Ok(device) => {
                    info!(component, "Using CUDA GPU acceleration");
                    return device;
                }
                Err(e) => failures.push(format!("cuda failed: {e}")),
            }
        }

        warn!(
            component,
            reason = %failures.join("; "),
            "Falling back to CPU device"
        );
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        debug!(component, "No GPU backend compiled, using CPU");
    }

    Device::Cpu
}
