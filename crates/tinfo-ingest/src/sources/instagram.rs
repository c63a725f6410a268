use async_trait::async_trait;
use tinfo_core::{RawPost, Target};
use tinfo_scraper::InstagramClient;

use super::SourceFetcher;
use crate::error::IngestError;

#[async_trait]
impl SourceFetcher for InstagramClient {
    async fn fetch(&self, target: &Target) -> Result<Vec<RawPost>, IngestError> {
        self.fetch_target_posts(target)
            .await
            .map_err(|e| IngestError::Fetch {
                target: target.to_string(),
                message: e.to_string(),
            })
    }
}
