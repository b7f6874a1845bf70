use candle_core::Device;
use tracing::{info, warn};

/// Pick the compute device for `preference` (`auto`, `cpu` or `metal`).
///
/// Metal is only reachable when the crate is built with the `metal` feature;
/// anything that fails to initialize falls back to CPU.
pub fn select_device(preference: &str) -> Device {
    if preference == "cpu" {
        info!("device: CPU");
        return Device::Cpu;
    }
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => {
                info!("device: Metal");
                return dev;
            }
            Err(e) => warn!(error = %e, "Metal unavailable, using CPU"),
        }
    }
    #[cfg(not(feature = "metal"))]
    {
        if preference == "metal" {
            warn!("built without the `metal` feature, using CPU");
        }
    }
    info!("device: CPU");
    Device::Cpu
}
