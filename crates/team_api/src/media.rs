use shared::{
    domain::{matches_search, Choice, MediaFileId},
    error::ApiError,
    records::{MediaFile, NewMediaFile},
};
use tracing::info;

use crate::{
    directory::{require_current, require_lead, UserDirectory},
    internal, required, ApiContext,
};

#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    /// Matched against the file name and every tag.
    pub search: String,
    pub category: Choice<String>,
    pub file_type: Choice<String>,
}

impl MediaFilter {
    fn matches(&self, file: &MediaFile) -> bool {
        let name_hit = matches_search(&self.search, &[file.name.as_str()]);
        let tag_hit = file
            .tags
            .iter()
            .any(|tag| matches_search(&self.search, &[tag.as_str()]));
        (name_hit || tag_hit)
            && self.category.matches_opt(file.category.as_ref())
            && self.file_type.matches(&file.file_type)
    }
}

pub async fn register_media(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    mut new: NewMediaFile,
) -> Result<MediaFile, ApiError> {
    let uploader = require_current(directory).await?;
    new.name = required(&new.name, "name")?;
    new.file_url = required(&new.file_url, "file url")?;
    new.tags = new
        .tags
        .iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let file = ctx
        .storage
        .insert_media_file(&new, uploader.id)
        .await
        .map_err(internal)?;
    info!(media_id = %file.id, file_type = %file.file_type, "media registered");
    Ok(file)
}

pub async fn search_media(
    ctx: &ApiContext,
    filter: &MediaFilter,
) -> Result<Vec<MediaFile>, ApiError> {
    let files = ctx.storage.list_media_files().await.map_err(internal)?;
    Ok(files.into_iter().filter(|file| filter.matches(file)).collect())
}

pub async fn delete_media(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    media_id: MediaFileId,
) -> Result<(), ApiError> {
    require_lead(directory).await?;
    let deleted = ctx
        .storage
        .delete_media_file(media_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::not_found(format!("media file {media_id}")));
    }
    Ok(())
}
