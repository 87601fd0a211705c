//! Wire types for the Tridify conversion service and the extras blob embedded
//! in post-processed glTF files.

use nalgebra_glm as glm;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishedLinkDto {
    pub conversions: Vec<SharedConversionDto>,
    pub configuration: SharedConfigurationDto,
    pub link_enabled: bool,
    pub post_process_state: String,
    #[serde(default)]
    pub post_processed_files: Vec<String>,
    #[serde(default)]
    pub linked_files: Vec<LinkedFileDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SharedConversionDto {
    pub hash: String,
    pub files: Vec<SharedConversionFileDto>,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SharedConversionFileDto {
    pub url: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub format: String,
    pub storey: String,
    pub overlay: bool,
    pub guid: String,
    /// Missing on old conversions.
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SharedConfigurationDto {
    pub tools: ToolsDto,
    #[serde(default)]
    pub property_set_names: Vec<String>,
    #[serde(default)]
    pub quantity_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolsDto {
    #[serde(rename = "VRHeadsetMode")]
    pub vr_headset_mode: bool,
    pub share_viewer: bool,
    pub measure_tool: bool,
    pub bim_tool: bool,
    pub cutting_planes_tool: bool,
    pub waypoint_tool: bool,
    pub combination_visibility_tool: bool,
    pub commenting_tool: bool,
    pub location_tool: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkedFileDto {
    pub original_file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialLibraryDto {
    pub asset: MaterialLibraryAssetDto,
    #[serde(default)]
    pub images: Vec<MaterialLibraryImageDto>,
    #[serde(default)]
    pub samplers: Vec<MaterialLibrarySamplerDto>,
    #[serde(default)]
    pub textures: Vec<MaterialLibraryTextureDto>,
    #[serde(default)]
    pub materials: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialLibraryAssetDto {
    pub version: String,
    pub generator: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialLibraryImageDto {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLibrarySamplerDto {
    pub mag_filter: i32,
    pub min_filter: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialLibraryTextureDto {
    pub source: usize,
    pub sampler: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectPropertySetsDto {
    #[serde(default)]
    pub property_sets: Vec<Value>,
    #[serde(default)]
    pub type_defined_property_sets: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfcHierarchyDto {
    pub file_name: String,
    pub ifc_project: Value,
}

/// Per-object IFC metadata attached to a non-instanced mesh by the
/// post-processing pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostProcessedMeshData {
    pub ifc_guid: String,
    pub ifc_type: String,
    pub ifc_storey: String,
    pub ifc_filename: String,
    pub start_vertex: u32,
    pub end_vertex: u32,
    pub start_index: u32,
    pub end_index: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostProcessedInstanceData {
    pub ifc_filename: String,
    pub ifc_storey: String,
    pub ifc_type: String,
}

/// One entry of the extras `ifc` map: a list of sub-object records for merged
/// meshes, or a single record for GPU-instanced meshes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IfcEntry {
    Meshes(Vec<PostProcessedMeshData>),
    Instance(PostProcessedInstanceData),
}

/// The glTF root-node extras blob written by the Tridify post-processor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfExtras {
    /// Exporter writes the components as strings or numbers depending on
    /// version, hence `Value`.
    #[serde(default)]
    pub centering_offset: Vec<Value>,
    /// Key order is lexicographic, not document order; consumers that pick a
    /// representative entry get the first key alphabetically.
    #[serde(default)]
    pub ifc: BTreeMap<String, IfcEntry>,
}

impl GltfExtras {
    /// Model offset with the x axis mirrored into viewer space.
    pub fn offset(&self) -> Option<glm::Vec3> {
        if self.centering_offset.len() < 3 {
            return None;
        }
        let component = |value: &Value| -> Option<f32> {
            match value {
                Value::Number(n) => n.as_f64().map(|v| v as f32),
                Value::String(s) => s.parse().ok(),
                _ => None,
            }
        };
        let x = component(&self.centering_offset[0])?;
        let y = component(&self.centering_offset[1])?;
        let z = component(&self.centering_offset[2])?;
        Some(glm::vec3(-x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_link_parses_pascal_case() {
        let json = r#"{
            "Conversions": [{
                "Hash": "abc123",
                "FileName": "office.ifc",
                "Files": [{
                    "Url": "https://example.com/office.gltf",
                    "Type": "gltf",
                    "Format": "model",
                    "Storey": "1",
                    "Overlay": false,
                    "Guid": "g-1"
                }]
            }],
            "Configuration": {
                "Tools": {
                    "VRHeadsetMode": false,
                    "ShareViewer": true,
                    "MeasureTool": true,
                    "BimTool": true,
                    "CuttingPlanesTool": false,
                    "WaypointTool": false,
                    "CombinationVisibilityTool": false,
                    "CommentingTool": false,
                    "LocationTool": false
                },
                "PropertySetNames": ["Pset_WallCommon"],
                "QuantityNames": []
            },
            "LinkEnabled": true,
            "PostProcessState": "Done",
            "PostProcessedFiles": ["a.gltf"],
            "LinkedFiles": []
        }"#;

        let link: PublishedLinkDto = serde_json::from_str(json).unwrap();
        assert!(link.link_enabled);
        assert_eq!(link.conversions[0].hash, "abc123");
        assert_eq!(link.conversions[0].files[0].kind, "gltf");
        assert!(link.conversions[0].files[0].file_name.is_none());
        assert!(link.configuration.tools.share_viewer);
    }

    #[test]
    fn extras_offset_negates_x_and_parses_strings() {
        let json = r#"{ "centeringOffset": ["1.5", 2, "-3"], "ifc": {} }"#;
        let extras: GltfExtras = serde_json::from_str(json).unwrap();
        assert_eq!(extras.offset(), Some(glm::vec3(-1.5, 2.0, -3.0)));

        let empty: GltfExtras = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.offset(), None);
    }

    #[test]
    fn ifc_entry_distinguishes_mesh_lists_from_instances() {
        let json = r#"{
            "ifc": {
                "wall_0": [{
                    "ifcGuid": "w-1",
                    "ifcType": "IfcWall",
                    "ifcStorey": "1",
                    "ifcFilename": "office.ifc",
                    "startVertex": 0,
                    "endVertex": 120,
                    "startIndex": 0,
                    "endIndex": 180
                }],
                "chair": {
                    "ifcFilename": "office.ifc",
                    "ifcStorey": "1",
                    "ifcType": "IfcFurniture"
                }
            }
        }"#;

        let extras: GltfExtras = serde_json::from_str(json).unwrap();
        match &extras.ifc["wall_0"] {
            IfcEntry::Meshes(list) => {
                assert_eq!(list[0].ifc_guid, "w-1");
                assert_eq!(list[0].end_index, 180);
            }
            IfcEntry::Instance(_) => panic!("expected mesh list"),
        }
        match &extras.ifc["chair"] {
            IfcEntry::Instance(data) => assert_eq!(data.ifc_type, "IfcFurniture"),
            IfcEntry::Meshes(_) => panic!("expected instance data"),
        }
    }
}
