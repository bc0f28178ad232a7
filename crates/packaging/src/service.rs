use crate::{context, dockerfile, ImageBuilder, ImageCache};
use georisk_models::{GeoRiskError, ImageSpec};
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub enum AssembleOutcome {
    /// Inputs unchanged since a previous build; nothing was rebuilt.
    Cached { image_ref: String },
    Built { image_ref: String, digest: String },
}

impl AssembleOutcome {
    pub fn image_ref(&self) -> &str {
        match self {
            AssembleOutcome::Cached { image_ref } => image_ref,
            AssembleOutcome::Built { image_ref, .. } => image_ref,
        }
    }
}

/// The assembler pipeline: stage → digest → cache check → render →
/// build → record. Single linear pass; the first failing stage aborts
/// the whole build.
pub struct PackagingService {
    cache: ImageCache,
}

impl PackagingService {
    pub fn new(cache_dir: PathBuf) -> Result<Self, GeoRiskError> {
        Ok(Self {
            cache: ImageCache::open(cache_dir)?,
        })
    }

    #[instrument(skip(self, spec), fields(name = %spec.name))]
    pub async fn assemble(
        &mut self,
        spec: &ImageSpec,
        image_ref: &str,
    ) -> Result<AssembleOutcome, GeoRiskError> {
        let context = context::stage(spec)?;

        if let Some(existing) = self.cache.get(context.digest()) {
            info!(
                "Context digest {} already built as {}",
                context.digest(),
                existing
            );
            return Ok(AssembleOutcome::Cached {
                image_ref: existing.to_string(),
            });
        }

        let recipe = dockerfile::render(spec);
        ImageBuilder::build(&context, &recipe, image_ref).await?;

        self.cache
            .insert(context.digest().to_string(), image_ref.to_string());
        self.cache.save()?;

        Ok(AssembleOutcome::Built {
            image_ref: image_ref.to_string(),
            digest: context.digest().to_string(),
        })
    }
}
