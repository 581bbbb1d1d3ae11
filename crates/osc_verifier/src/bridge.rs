use {
    std::fmt::{Display, Formatter},
    thiserror::Error,
};

/// Where the memory under test lives. Chosen by configuration, never probed.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Accelerator {
    #[default]
    None,
    Cuda,
    Rocm,
    OpenAcc,
}

impl Display for Accelerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Accelerator::None => "host",
            Accelerator::Cuda => "CUDA",
            Accelerator::Rocm => "ROCm",
            Accelerator::OpenAcc => "OpenACC",
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("no buffer bridge is implemented for {0} memory")]
    Unimplemented(Accelerator),
    #[error("cannot stage {src} bytes into a {dst}-byte buffer")]
    LengthMismatch { dst: usize, src: usize },
}

/// Copies blocks between host memory and the memory space holding the values under test.
pub trait BufferBridge {
    /// Host `src` into value-space `dst`.
    fn stage_in(&self, dst: &mut [u8], src: &[u8]) -> Result<(), BridgeError>;
    /// Value-space `src` into host `dst`.
    fn stage_out(&self, dst: &mut [u8], src: &[u8]) -> Result<(), BridgeError>;
}

/// The value space is ordinary host memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostBridge;

impl HostBridge {
    fn copy(dst: &mut [u8], src: &[u8]) -> Result<(), BridgeError> {
        if dst.len() != src.len() {
            return Err(BridgeError::LengthMismatch {
                dst: dst.len(),
                src: src.len(),
            });
        }
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl BufferBridge for HostBridge {
    fn stage_in(&self, dst: &mut [u8], src: &[u8]) -> Result<(), BridgeError> {
        HostBridge::copy(dst, src)
    }

    fn stage_out(&self, dst: &mut [u8], src: &[u8]) -> Result<(), BridgeError> {
        HostBridge::copy(dst, src)
    }
}

/// Stands in for a device backend this build has no driver for. Every call fails.
#[derive(Clone, Copy, Debug)]
pub struct UnavailableBridge(Accelerator);

impl BufferBridge for UnavailableBridge {
    fn stage_in(&self, _dst: &mut [u8], _src: &[u8]) -> Result<(), BridgeError> {
        Err(BridgeError::Unimplemented(self.0))
    }

    fn stage_out(&self, _dst: &mut [u8], _src: &[u8]) -> Result<(), BridgeError> {
        Err(BridgeError::Unimplemented(self.0))
    }
}

pub fn bridge_for(accelerator: Accelerator) -> Box<dyn BufferBridge> {
    match accelerator {
        Accelerator::None => Box::new(HostBridge),
        other => Box::new(UnavailableBridge(other)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn host_bridge_copies_both_ways() {
        let bridge = bridge_for(Accelerator::None);
        let mut device = [0u8; 4];
        bridge.stage_in(&mut device, &[1, 2, 3, 4]).unwrap();
        let mut host = [0u8; 4];
        bridge.stage_out(&mut host, &device).unwrap();
        assert_eq!(host, [1, 2, 3, 4]);
    }

    #[test]
    fn length_mismatch_fails() {
        assert_eq!(
            HostBridge.stage_in(&mut [0u8; 2], &[0u8; 3]),
            Err(BridgeError::LengthMismatch { dst: 2, src: 3 })
        );
    }

    #[test]
    fn accelerators_fail_loudly() {
        for accelerator in [Accelerator::Cuda, Accelerator::Rocm, Accelerator::OpenAcc] {
            let bridge = bridge_for(accelerator);
            let err = bridge.stage_out(&mut [0u8; 1], &[0u8; 1]).unwrap_err();
            assert_eq!(err, BridgeError::Unimplemented(accelerator));
        }
        assert_eq!(
            BridgeError::Unimplemented(Accelerator::Rocm).to_string(),
            "no buffer bridge is implemented for ROCm memory"
        );
    }
}
