//! ViT encoder returning the final hidden states.
//!
//! The classification head of `google/vit-base-patch16-224` is ignored: the
//! embedding is the post-layernorm CLS token of the last layer, the same vector
//! `ViTModel(...).last_hidden_state[:, 0, :]` yields.

use candle_core::{DType, Device, IndexOp, Module, Result, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use std::path::Path;

use crate::embedding::utils::{read_model_config, weights_path};

fn default_hidden_size() -> usize {
    768
}
fn default_num_layers() -> usize {
    12
}
fn default_num_heads() -> usize {
    12
}
fn default_intermediate_size() -> usize {
    3072
}
fn default_layer_norm_eps() -> f64 {
    1e-12
}
fn default_image_size() -> usize {
    224
}
fn default_patch_size() -> usize {
    16
}
fn default_num_channels() -> usize {
    3
}

/// Subset of the Hugging Face `ViTConfig` needed for the forward pass.
#[derive(Debug, Clone, Deserialize)]
pub struct VitConfig {
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    #[serde(default = "default_num_layers")]
    pub num_hidden_layers: usize,
    #[serde(default = "default_num_heads")]
    pub num_attention_heads: usize,
    #[serde(default = "default_intermediate_size")]
    pub intermediate_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
    #[serde(default = "default_image_size")]
    pub image_size: usize,
    #[serde(default = "default_patch_size")]
    pub patch_size: usize,
    #[serde(default = "default_num_channels")]
    pub num_channels: usize,
}

impl Default for VitConfig {
    fn default() -> Self {
        Self {
            hidden_size: default_hidden_size(),
            num_hidden_layers: default_num_layers(),
            num_attention_heads: default_num_heads(),
            intermediate_size: default_intermediate_size(),
            layer_norm_eps: default_layer_norm_eps(),
            image_size: default_image_size(),
            patch_size: default_patch_size(),
            num_channels: default_num_channels(),
        }
    }
}

impl VitConfig {
    fn num_patches(&self) -> usize {
        let per_side = self.image_size / self.patch_size;
        per_side * per_side
    }

    fn head_dim(&self) -> usize {
        self.hidden_size / self.num_attention_heads
    }
}

struct PatchEmbeddings {
    cls_token: Tensor,
    position_embeddings: Tensor,
    projection: Conv2d,
}

impl PatchEmbeddings {
    fn load(vb: VarBuilder, config: &VitConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        let cls_token = vb.get((1, 1, hidden), "cls_token")?;
        let position_embeddings =
            vb.get((1, config.num_patches() + 1, hidden), "position_embeddings")?;
        let conv_config = Conv2dConfig {
            stride: config.patch_size,
            ..Default::default()
        };
        let projection = candle_nn::conv2d(
            config.num_channels,
            hidden,
            config.patch_size,
            conv_config,
            vb.pp("patch_embeddings.projection"),
        )?;

        Ok(Self {
            cls_token,
            position_embeddings,
            projection,
        })
    }

    fn forward(&self, pixel_values: &Tensor) -> Result<Tensor> {
        // [b, hidden, h/p, w/p] -> [b, num_patches, hidden]
        let patches = self
            .projection
            .forward(pixel_values)?
            .flatten_from(2)?
            .transpose(1, 2)?;
        let (batch, _, hidden) = patches.dims3()?;
        let cls = self.cls_token.expand((batch, 1, hidden))?;
        Tensor::cat(&[&cls, &patches], 1)?.broadcast_add(&self.position_embeddings)
    }
}

struct SelfAttention {
    query: Linear,
    key: Linear,
    value: Linear,
    output: Linear,
    num_heads: usize,
    head_dim: usize,
}

impl SelfAttention {
    fn load(vb: VarBuilder, config: &VitConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        let inner = vb.pp("attention");
        Ok(Self {
            query: candle_nn::linear(hidden, hidden, inner.pp("query"))?,
            key: candle_nn::linear(hidden, hidden, inner.pp("key"))?,
            value: candle_nn::linear(hidden, hidden, inner.pp("value"))?,
            output: candle_nn::linear(hidden, hidden, vb.pp("output.dense"))?,
            num_heads: config.num_attention_heads,
            head_dim: config.head_dim(),
        })
    }

    fn split_heads(&self, x: &Tensor) -> Result<Tensor> {
        let (batch, seq, _) = x.dims3()?;
        x.reshape((batch, seq, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let (batch, seq, hidden) = x.dims3()?;
        let q = self.split_heads(&self.query.forward(x)?)?;
        let k = self.split_heads(&self.key.forward(x)?)?;
        let v = self.split_heads(&self.value.forward(x)?)?;

        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let scores = (q.matmul(&k.t()?.contiguous()?)? * scale)?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;

        let context = probs
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch, seq, hidden))?;
        self.output.forward(&context)
    }
}

struct EncoderLayer {
    layernorm_before: LayerNorm,
    attention: SelfAttention,
    layernorm_after: LayerNorm,
    intermediate: Linear,
    output: Linear,
}

impl EncoderLayer {
    fn load(vb: VarBuilder, config: &VitConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        let eps = config.layer_norm_eps;
        Ok(Self {
            layernorm_before: candle_nn::layer_norm(hidden, eps, vb.pp("layernorm_before"))?,
            attention: SelfAttention::load(vb.pp("attention"), config)?,
            layernorm_after: candle_nn::layer_norm(hidden, eps, vb.pp("layernorm_after"))?,
            intermediate: candle_nn::linear(
                hidden,
                config.intermediate_size,
                vb.pp("intermediate.dense"),
            )?,
            output: candle_nn::linear(config.intermediate_size, hidden, vb.pp("output.dense"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let attended = self
            .attention
            .forward(&self.layernorm_before.forward(x)?)?;
        let x = x.add(&attended)?;

        let mlp = self
            .intermediate
            .forward(&self.layernorm_after.forward(&x)?)?
            .gelu_erf()?;
        let mlp = self.output.forward(&mlp)?;
        x.add(&mlp)
    }
}

/// ViT backbone (embeddings + encoder + final layernorm).
pub struct VitEncoder {
    embeddings: PatchEmbeddings,
    layers: Vec<EncoderLayer>,
    layernorm: LayerNorm,
    config: VitConfig,
}

impl VitEncoder {
    /// Builds the encoder from a var builder rooted at the ViT backbone.
    ///
    /// Accepts both bare `ViTModel` checkpoints and `ViTForImageClassification`
    /// checkpoints (weights under a `vit.` prefix).
    pub fn new(vb: VarBuilder, config: VitConfig) -> Result<Self> {
        let vb = if vb.contains_tensor("vit.embeddings.cls_token") {
            vb.pp("vit")
        } else {
            vb
        };

        let embeddings = PatchEmbeddings::load(vb.pp("embeddings"), &config)?;
        let layers = (0..config.num_hidden_layers)
            .map(|i| EncoderLayer::load(vb.pp(format!("encoder.layer.{i}")), &config))
            .collect::<Result<Vec<_>>>()?;
        let layernorm =
            candle_nn::layer_norm(config.hidden_size, config.layer_norm_eps, vb.pp("layernorm"))?;

        Ok(Self {
            embeddings,
            layers,
            layernorm,
            config,
        })
    }

    /// Loads `config.json` + `model.safetensors` from a model directory.
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config: VitConfig = read_model_config(model_dir)?;

        // SAFETY: the weights file is only read, and stays mapped for the model lifetime.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path(model_dir)], DType::F32, device)?
        };

        Self::new(vb, config)
    }

    /// Returns `last_hidden_state` with shape `[batch, num_patches + 1, hidden]`.
    pub fn forward(&self, pixel_values: &Tensor) -> Result<Tensor> {
        let mut hidden = self.embeddings.forward(pixel_values)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden)?;
        }
        self.layernorm.forward(&hidden)
    }

    /// Returns the CLS embedding with shape `[batch, hidden]`.
    pub fn embed_cls(&self, pixel_values: &Tensor) -> Result<Tensor> {
        self.forward(pixel_values)?.i((.., 0, ..))
    }

    pub fn config(&self) -> &VitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    fn tiny_config() -> VitConfig {
        VitConfig {
            hidden_size: 16,
            num_hidden_layers: 2,
            num_attention_heads: 4,
            intermediate_size: 32,
            layer_norm_eps: 1e-12,
            image_size: 8,
            patch_size: 4,
            num_channels: 3,
        }
    }

    #[test]
    fn test_config_defaults_match_vit_base() {
        let config: VitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.hidden_size, 768);
        assert_eq!(config.num_patches(), 196);
        assert_eq!(config.head_dim(), 64);
    }

    #[test]
    fn test_forward_shapes_with_random_weights() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let encoder = VitEncoder::new(vb, tiny_config()).unwrap();

        let pixels = Tensor::zeros((2, 3, 8, 8), DType::F32, &device).unwrap();
        let hidden = encoder.forward(&pixels).unwrap();
        assert_eq!(hidden.dims(), &[2, 5, 16]);

        let cls = encoder.embed_cls(&pixels).unwrap();
        assert_eq!(cls.dims(), &[2, 16]);
    }

    #[test]
    fn test_forward_is_deterministic() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let encoder = VitEncoder::new(vb, tiny_config()).unwrap();

        let pixels = Tensor::ones((1, 3, 8, 8), DType::F32, &device).unwrap();
        let a = encoder.embed_cls(&pixels).unwrap().to_vec2::<f32>().unwrap();
        let b = encoder.embed_cls(&pixels).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(a, b);
    }
}
