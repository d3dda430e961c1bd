//! Weight loading for the classifier.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use safetensors::SafeTensors;
use tracing::debug;

/// Reads every tensor of a safetensors file onto `device`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid safetensors, is
/// empty, or holds a dtype candle does not support.
pub fn read_tensors(path: impl AsRef<Path>, device: &Device) -> Result<HashMap<String, Tensor>> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read weights: {}", path.display()))?;
    let file = SafeTensors::deserialize(&data)
        .with_context(|| format!("Failed to parse safetensors: {}", path.display()))?;

    let mut tensors = HashMap::new();
    for (name, view) in file.tensors() {
        let dtype = to_candle_dtype(view.dtype())
            .with_context(|| format!("Tensor '{name}' in {}", path.display()))?;
        let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
            .with_context(|| format!("Failed to create tensor '{name}'"))?;
        tensors.insert(name, tensor);
    }

    if tensors.is_empty() {
        anyhow::bail!("No tensors in {}", path.display());
    }
    debug!("Read {} tensors from {}", tensors.len(), path.display());
    Ok(tensors)
}

/// Loads a safetensors file into an F32 `VarBuilder`.
///
/// # Errors
///
/// See [`read_tensors`].
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let tensors = read_tensors(path, device)?;
    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

fn to_candle_dtype(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    match dtype {
        S::F32 => Ok(DType::F32),
        S::F64 => Ok(DType::F64),
        S::F16 => Ok(DType::F16),
        S::BF16 => Ok(DType::BF16),
        S::I64 => Ok(DType::I64),
        S::U8 => Ok(DType::U8),
        S::U32 => Ok(DType::U32),
        other => anyhow::bail!("Unsupported dtype: {other:?}"),
    }
}
