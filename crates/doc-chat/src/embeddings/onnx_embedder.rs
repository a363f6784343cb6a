//! ONNX-based embedding generation
//!
//! Uses all-MiniLM-L6-v2 for 384-dimensional sentence embeddings.

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokenizers::Tokenizer;

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// ONNX-based text embedder
#[derive(Clone)]
pub struct OnnxEmbedder {
    inner: Arc<OnnxModel>,
    model: String,
}

struct OnnxModel {
    /// ONNX Runtime session; `run` needs exclusive access
    session: Mutex<Session>,
    /// HuggingFace tokenizer
    tokenizer: Tokenizer,
    /// Embedding dimensions
    dimensions: usize,
    /// Maximum sequence length
    max_length: usize,
    /// Texts per inference run
    batch_size: usize,
}

impl OnnxEmbedder {
    /// Load the model, downloading it into the cache directory on first use
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        tracing::info!("Initializing ONNX embedder with model: {}", config.model);

        tokio::fs::create_dir_all(&config.cache_dir).await.map_err(|e| {
            Error::Config(format!("Failed to create cache directory: {}", e))
        })?;

        let model_dir = config.cache_dir.join(&config.model);
        tokio::fs::create_dir_all(&model_dir).await?;

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        let base = format!(
            "https://huggingface.co/sentence-transformers/{}/resolve/main",
            config.model
        );

        if !model_path.exists() {
            download_file(&format!("{}/onnx/model.onnx", base), &model_path).await?;
        }

        if !tokenizer_path.exists() {
            download_file(&format!("{}/tokenizer.json", base), &tokenizer_path).await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::embedding(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::embedding(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::embedding(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!("ONNX embedder initialized successfully");

        Ok(Self {
            inner: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
                dimensions: config.dimensions,
                max_length: config.max_length,
                batch_size: config.batch_size,
            }),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.inner);
        let texts = texts.to_vec();
        let cancel = CancelOnDrop::default();
        let cancelled = Arc::clone(&cancel.0);

        tokio::task::spawn_blocking(move || {
            embed_in_batches(&texts, model.batch_size, &cancelled, |batch| {
                model.embed_chunk(batch)
            })
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Raises its flag when dropped, i.e. when the awaiting future goes away
#[derive(Default)]
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Run `embed` over `batch_size` slices of `texts`, stopping before the next
/// slice once `cancelled` is set
fn embed_in_batches<F>(
    texts: &[String],
    batch_size: usize,
    cancelled: &AtomicBool,
    mut embed: F,
) -> Result<Vec<Vec<f32>>>
where
    F: FnMut(&[String]) -> Result<Vec<Vec<f32>>>,
{
    let mut all_embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        if cancelled.load(Ordering::Relaxed) {
            return Err(Error::embedding("Embedding abandoned by caller"));
        }
        all_embeddings.extend(embed(batch)?);
    }
    Ok(all_embeddings)
}

impl OnnxModel {
    /// Tokenize, run inference, mean-pool and L2-normalize one batch
    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.max_length)
            .max(1);

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();

            for j in 0..ids.len().min(max_len) {
                input_ids[i * max_len + j] = ids[j] as i64;
                attention_mask[i * max_len + j] = mask[j] as i64;
                token_type_ids[i * max_len + j] = types[j] as i64;
            }
        }

        let shape = (batch_size, max_len);
        let to_tensor = |data: Vec<i64>, what: &str| -> Result<Tensor<i64>> {
            let array = Array2::from_shape_vec(shape, data)
                .map_err(|e| Error::embedding(format!("Bad {} shape: {}", what, e)))?;
            Tensor::from_array(array)
                .map_err(|e| Error::embedding(format!("{} tensor creation failed: {}", what, e)))
        };

        let inputs = ort::inputs![
            "input_ids" => to_tensor(input_ids, "input_ids")?,
            "attention_mask" => to_tensor(attention_mask.clone(), "attention_mask")?,
            "token_type_ids" => to_tensor(token_type_ids, "token_type_ids")?
        ];

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::embedding(format!("Inference failed: {}", e)))?;

        // last_hidden_state: [batch, seq_len, hidden]
        let output = outputs
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| outputs.iter().next())
            .map(|(_, value)| value)
            .ok_or_else(|| Error::embedding("No output tensor"))?;

        let hidden = output
            .try_extract_array::<f32>()
            .map_err(|e| Error::embedding(format!("Failed to extract tensor: {}", e)))?;

        let dims = hidden.shape().to_vec();
        if dims.len() != 3 {
            return Err(Error::embedding(format!(
                "Unexpected output rank {} (expected 3)",
                dims.len()
            )));
        }
        let hidden_size = dims[2];
        if hidden_size != self.dimensions {
            return Err(Error::embedding(format!(
                "Unexpected embedding dimension: {} (expected {})",
                hidden_size, self.dimensions
            )));
        }

        let mut embeddings = Vec::with_capacity(batch_size);

        for i in 0..batch_size {
            let mut sum = vec![0.0f32; hidden_size];
            let mut count = 0.0f32;

            for j in 0..dims[1].min(max_len) {
                let mask_val = attention_mask[i * max_len + j] as f32;
                if mask_val > 0.0 {
                    for (k, val) in sum.iter_mut().enumerate() {
                        *val += hidden[[i, j, k]] * mask_val;
                    }
                    count += mask_val;
                }
            }

            if count > 0.0 {
                for val in &mut sum {
                    *val /= count;
                }
            }

            let norm: f32 = sum.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for val in &mut sum {
                    *val /= norm;
                }
            }

            embeddings.push(sum);
        }

        Ok(embeddings)
    }
}

/// Download a model artifact into the cache
async fn download_file(url: &str, path: &Path) -> Result<()> {
    tracing::info!("Downloading {}", url);

    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::embedding(format!("Failed to download {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(Error::embedding(format!(
            "Download of {} failed: HTTP {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::embedding(format!("Failed to read {}: {}", url, e)))?;

    // A partial download never lands at the cached path
    let partial = path.with_extension("part");
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, path).await?;

    tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("passage {}", i)).collect()
    }

    #[test]
    fn test_batches_preserve_order() {
        let cancelled = AtomicBool::new(false);
        let mut calls = 0;
        let result = embed_in_batches(&texts(5), 2, &cancelled, |batch| {
            calls += 1;
            Ok(batch.iter().map(|t| vec![t.len() as f32]).collect())
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(result.len(), 5);
        assert_eq!(result[4], vec!["passage 4".len() as f32]);
    }

    #[test]
    fn test_stops_after_caller_goes_away() {
        let guard = CancelOnDrop::default();
        let cancelled = Arc::clone(&guard.0);
        let mut guard = Some(guard);
        let mut calls = 0;

        let result = embed_in_batches(&texts(6), 2, &cancelled, |batch| {
            calls += 1;
            // The awaiting side times out during the first batch
            guard.take();
            Ok(vec![vec![0.0]; batch.len()])
        });

        assert_eq!(calls, 1);
        assert!(matches!(result, Err(Error::Embedding(_))));
    }
}
