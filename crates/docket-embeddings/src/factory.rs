//! Provider selection from configuration.

use std::sync::Arc;

use docket_core::config::EmbeddingConfig;
use docket_core::errors::{EmbeddingError, EmbeddingResult};
use docket_core::traits::EmbeddingFunction;

use crate::{CachedEmbedder, HashEmbedder};

/// Build the embedder named by `config.provider`.
///
/// A non-zero `cache_size` wraps the provider in a [`CachedEmbedder`].
pub fn create_embedder(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingFunction>> {
    if config.dimensions == 0 {
        return Err(EmbeddingError::DimensionMismatch {
            expected: 1,
            actual: 0,
        });
    }

    let provider = match config.provider.trim().to_ascii_lowercase().as_str() {
        "hash" | "local-hash" => HashEmbedder::new(config.dimensions),
        other => {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: other.to_string(),
            })
        }
    };

    tracing::debug!(
        provider = %config.provider,
        dimensions = config.dimensions,
        cache_size = config.cache_size,
        "embedding provider created"
    );

    if config.cache_size > 0 {
        Ok(Arc::new(CachedEmbedder::new(provider, config.cache_size)))
    } else {
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_hash_provider() {
        let e = create_embedder(&EmbeddingConfig::default()).unwrap();
        assert_eq!(e.name(), "hash");
        assert_eq!(e.dimensions(), 384);
    }

    #[test]
    fn unknown_provider_is_unavailable() {
        let config = EmbeddingConfig {
            provider: "onnx".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            create_embedder(&config),
            Err(EmbeddingError::ProviderUnavailable { .. })
        ));
    }
}
