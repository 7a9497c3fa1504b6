//! File upload/delete against the CMS media surface.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tienda_core::{MediaAsset, MediaId};
use tracing::instrument;

use crate::CmsError;
use crate::client::ContentClient;
use crate::envelope::normalize_record;

impl ContentClient {
    /// Upload a file. The CMS answers with the created media records (it
    /// accepts batches, so the response is always an array).
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<MediaAsset>, CmsError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(mime_type)
            .map_err(|e| CmsError::Config(format!("invalid mime type: {e}")))?;
        let form = Form::new().part("files", part);

        let request = self.raw().post(self.url("/api/upload")).multipart(form);
        let body = Self::execute(request).await?;

        let Value::Array(records) = body else {
            return Err(CmsError::Shape(
                "upload response is not an array".to_owned(),
            ));
        };
        records
            .into_iter()
            .map(|record| Ok(serde_json::from_value(normalize_record(record)?)?))
            .collect()
    }

    /// Delete an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, id: MediaId) -> Result<(), CmsError> {
        self.delete_json(&format!("/api/upload/files/{id}")).await?;
        Ok(())
    }
}
