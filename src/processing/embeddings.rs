//! Embeddings generation using Model2Vec

use crate::config::Config;
use crate::error::{Result, SkillMatcherError};
use crate::processing::semantic::EmbeddingModel;
use log::info;
use model2vec_rs::model::StaticModel;
use std::time::Instant;

/// Model2Vec static embedding model, loaded once per process
pub struct StaticEmbedder {
    model: StaticModel,
    model_name: String,
    batch_size: usize,
}

impl StaticEmbedder {
    /// Load from a HuggingFace repo id or a local model folder. Blocking.
    pub fn load(repo_or_path: &str, batch_size: usize) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", repo_or_path);

        let model = StaticModel::from_pretrained(
            repo_or_path,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: repo_or_path.to_string(),
            batch_size: batch_size.max(1),
        })
    }

    /// Load the configured model on a blocking thread
    pub async fn from_config(config: &Config) -> Result<Self> {
        let model_name = config.models.embedding_model.clone();
        let batch_size = config.models.batch_size;

        tokio::task::spawn_blocking(move || Self::load(&model_name, batch_size))
            .await
            .map_err(|e| SkillMatcherError::ModelLoading(format!("Model loading task failed: {}", e)))?
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl EmbeddingModel for StaticEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let vectors = self.model.encode(batch);
            if vectors.len() != batch.len() {
                return Err(SkillMatcherError::Embedding(format!(
                    "{} returned {} vectors for a batch of {}",
                    self.model_name,
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
