use candle_core::Device;
use tracing::warn;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::EmbeddingError;

/// Picks the inference device for the vision models.
///
/// Tries Metal, then CUDA, depending on which cargo features are compiled in, and
/// falls back to CPU. Never fails today; the `Result` leaves room for a strict mode.
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!(backend = "metal", "Vision models will run on GPU");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(backend = "metal", error = %msg, "GPU device unavailable");
                failures.push(format!("metal: {msg}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!(backend = "cuda", "Vision models will run on GPU");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(backend = "cuda", error = %msg, "GPU device unavailable");
                failures.push(format!("cuda: {msg}"));
            }
        }
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        debug!("Built without GPU features");
        return Ok(Device::Cpu);
    }

    #[allow(unreachable_code)]
    {
        let reason = if failures.is_empty() {
            "no GPU device available".to_string()
        } else {
            failures.join("; ")
        };
        warn!(reason = %reason, "Vision models falling back to CPU");
        Ok(Device::Cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    fn test_select_device_defaults_to_cpu() {
        let device = select_device().unwrap();
        assert!(matches!(device, Device::Cpu));
    }
}
