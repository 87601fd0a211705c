//! Client for the Tridify conversion service. Every endpoint degrades to
//! `None` on failure so the viewer keeps running with whatever it has.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dto::{IfcHierarchyDto, MaterialLibraryDto, ObjectPropertySetsDto, PublishedLinkDto};
use crate::error::ViewerError;
use crate::settings::ApiSettings;

/// Partial IFC payloads served per conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialIfcType {
    Types,
    Decomposition,
    Units,
    Header,
    Layers,
    Materials,
}

impl PartialIfcType {
    fn name(self) -> &'static str {
        match self {
            PartialIfcType::Types => "types",
            PartialIfcType::Decomposition => "decomposition",
            PartialIfcType::Units => "units",
            PartialIfcType::Header => "header",
            PartialIfcType::Layers => "layers",
            PartialIfcType::Materials => "materials",
        }
    }
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Published link data for a share key.
    pub async fn published_link(&self, share_key: &str) -> Option<PublishedLinkDto> {
        self.get(
            &format!("shared/published-links/{share_key}"),
            "error while fetching published link",
        )
        .await
    }

    /// Published link data for the caller's draft.
    pub async fn draft_published_link(&self) -> Option<PublishedLinkDto> {
        self.get(
            "published-links/draft",
            "error while fetching draft published link",
        )
        .await
    }

    pub async fn material_library(&self, conversion_hash: &str) -> Option<MaterialLibraryDto> {
        self.get(
            &format!("shared/conversion/{conversion_hash}/material-library"),
            "error while fetching material library",
        )
        .await
    }

    /// IFC property sets and quantities for one object.
    pub async fn object_property_sets(
        &self,
        conversion_hash: &str,
        object_guid: &str,
    ) -> Option<ObjectPropertySetsDto> {
        self.get(
            &format!("shared/conversion/{conversion_hash}/properties/{object_guid}"),
            "error while fetching property sets",
        )
        .await
    }

    pub async fn draft_object_property_sets(
        &self,
        conversion_hash: &str,
        object_guid: &str,
    ) -> Option<ObjectPropertySetsDto> {
        self.get(
            &format!("draft/{conversion_hash}/properties/{object_guid}"),
            "error while fetching draft property sets",
        )
        .await
    }

    pub async fn ifc_hierarchy(&self, conversion_hash: &str) -> Option<IfcHierarchyDto> {
        self.get(
            &format!("shared/conversion/{conversion_hash}/ifc-hierarchy"),
            "error while fetching ifc hierarchy",
        )
        .await
    }

    /// Schemaless partial IFC data, shape varies by `kind`.
    pub async fn partial_ifc_data(
        &self,
        conversion_hash: &str,
        kind: PartialIfcType,
    ) -> Option<Value> {
        self.get(
            &format!("shared/conversion/{conversion_hash}/ifc/{}", kind.name()),
            "error while fetching partial ifc data",
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, error_message: &str) -> Option<T> {
        match self.request(path).await {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("{error_message}: {err}");
                None
            }
        }
    }

    async fn request<T: DeserializeOwned>(&self, path: &str) -> Result<T, ViewerError> {
        let url = format!("{}/{path}", self.base_url);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
