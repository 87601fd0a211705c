//! Stitches the IFC metadata from the glTF extras blob onto imported meshes.
//!
//! The post-processor merges many IFC objects into one mesh per material and
//! turns repeated furniture into GPU instances; this module resolves which
//! IFC records belong to which imported mesh so picking and BIM queries work
//! on the merged geometry.

use nalgebra_glm as glm;
use std::collections::{BTreeMap, HashMap};

use crate::dto::{GltfExtras, IfcEntry, PostProcessedInstanceData, PostProcessedMeshData};

/// Reserved node names that never carry IFC data.
const SKIPPED_MESH_NAMES: [&str; 2] = ["navigationMesh", "__root__"];

/// A mesh as reported by the glTF import, before IFC stitching.
#[derive(Debug, Clone)]
pub struct ImportedMesh {
    pub name: String,
    /// Names of the instance nodes, empty for regular meshes.
    pub instances: Vec<String>,
}

impl ImportedMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    pub fn is_instanced(&self) -> bool {
        !self.instances.is_empty()
    }
}

/// IFC metadata resolved for one imported mesh.
#[derive(Debug, Clone)]
pub struct MeshIfcBinding {
    pub mesh_name: String,
    pub ifc_type: String,
    pub ifc_storey: String,
    pub ifc_filename: String,
    /// Model id of the source IFC file, empty when unknown.
    pub ifc_id: String,
    /// Per-object ranges inside a merged mesh.
    pub sub_objects: Vec<PostProcessedMeshData>,
    /// Per-instance records for an instanced mesh, keyed by instance name.
    pub instance_data_by_name: BTreeMap<String, PostProcessedInstanceData>,
}

#[derive(Debug, Clone, Default)]
pub struct StitchedModel {
    pub model_offset: Option<glm::Vec3>,
    pub bindings: Vec<MeshIfcBinding>,
}

/// Resolve IFC metadata for every imported mesh. Meshes without any matching
/// record are logged and skipped; the model still renders without them.
pub fn stitch_ifc_metadata(
    meshes: &[ImportedMesh],
    extras: &GltfExtras,
    ifc_id_by_filename: &HashMap<String, String>,
) -> StitchedModel {
    let mut stitched = StitchedModel {
        model_offset: extras.offset(),
        bindings: Vec::new(),
    };

    // Exported files sometimes omit per-instance filenames; the first record
    // in the extras map (alphabetically by mesh name) stands in for them.
    let fallback = extras.ifc.values().next().and_then(first_record_fields);

    let ifc_names = unique_ifc_names(meshes, extras);

    for mesh in meshes {
        if SKIPPED_MESH_NAMES.contains(&mesh.name.as_str()) {
            continue;
        }

        if mesh.is_instanced() {
            stitched.bindings.push(stitch_instanced_mesh(
                mesh,
                extras,
                ifc_id_by_filename,
                fallback.as_ref(),
                &ifc_names,
            ));
        } else if let Some(binding) = stitch_merged_mesh(mesh, extras, ifc_id_by_filename) {
            stitched.bindings.push(binding);
        }
    }

    stitched
}

/// Strip the exporter's `_primitive<N>` suffix from node names.
pub fn base_mesh_name(name: &str) -> &str {
    name.split("_primitive").next().unwrap_or(name)
}

fn stitch_merged_mesh(
    mesh: &ImportedMesh,
    extras: &GltfExtras,
    ifc_id_by_filename: &HashMap<String, String>,
) -> Option<MeshIfcBinding> {
    let records = match extras.ifc.get(&mesh.name) {
        Some(IfcEntry::Meshes(records)) if !records.is_empty() => records,
        _ => {
            log::error!("mesh {} doesn't have any ifc data", mesh.name);
            return None;
        }
    };

    let first = &records[0];
    Some(MeshIfcBinding {
        mesh_name: mesh.name.clone(),
        ifc_type: first.ifc_type.clone(),
        ifc_storey: first.ifc_storey.clone(),
        ifc_filename: first.ifc_filename.clone(),
        ifc_id: ifc_id_by_filename
            .get(&first.ifc_filename)
            .cloned()
            .unwrap_or_default(),
        sub_objects: records.clone(),
        instance_data_by_name: BTreeMap::new(),
    })
}

fn stitch_instanced_mesh(
    mesh: &ImportedMesh,
    extras: &GltfExtras,
    ifc_id_by_filename: &HashMap<String, String>,
    fallback: Option<&PostProcessedInstanceData>,
    ifc_names: &[String],
) -> MeshIfcBinding {
    let name = base_mesh_name(&mesh.name).to_string();

    let mut instance_data_by_name = BTreeMap::new();
    for (index, instance) in mesh.instances.iter().enumerate() {
        let instance_name = base_mesh_name(instance).to_string();
        match instance_record(extras, &instance_name) {
            Some(data) => {
                instance_data_by_name.insert(instance_name, data);
            }
            None => log::error!(
                "instance {} {} of {} doesn't have any ifc data",
                instance_name,
                index + 1,
                mesh.instances.len()
            ),
        }
    }

    let mesh_data = instance_record(extras, &name);
    if let Some(data) = &mesh_data {
        instance_data_by_name.insert(name.clone(), data.clone());
    } else {
        log::error!(
            "mesh {} with {} instances doesn't have any ifc data",
            name,
            mesh.instances.len()
        );
    }

    let (ifc_type, ifc_storey) = match (&mesh_data, fallback) {
        (Some(data), _) => (data.ifc_type.clone(), data.ifc_storey.clone()),
        (None, Some(fallback)) => (fallback.ifc_type.clone(), fallback.ifc_storey.clone()),
        (None, None) => (String::new(), String::new()),
    };

    let ifc_filename = mesh_data
        .as_ref()
        .and_then(|data| instance_filename(ifc_names, &data.ifc_filename))
        .or_else(|| fallback.map(|f| f.ifc_filename.clone()))
        .unwrap_or_default();

    let ifc_id = ifc_id_by_filename
        .get(&ifc_filename)
        .cloned()
        .unwrap_or_default();

    MeshIfcBinding {
        mesh_name: name,
        ifc_type,
        ifc_storey,
        ifc_filename,
        ifc_id,
        sub_objects: Vec::new(),
        instance_data_by_name,
    }
}

fn instance_record(extras: &GltfExtras, name: &str) -> Option<PostProcessedInstanceData> {
    match extras.ifc.get(name) {
        Some(IfcEntry::Instance(data)) => Some(data.clone()),
        _ => None,
    }
}

fn first_record_fields(entry: &IfcEntry) -> Option<PostProcessedInstanceData> {
    match entry {
        IfcEntry::Instance(data) => Some(data.clone()),
        IfcEntry::Meshes(records) => records.first().map(|r| PostProcessedInstanceData {
            ifc_filename: r.ifc_filename.clone(),
            ifc_storey: r.ifc_storey.clone(),
            ifc_type: r.ifc_type.clone(),
        }),
    }
}

/// Distinct IFC filenames of the non-instanced meshes, `.ifc` suffix removed.
fn unique_ifc_names(meshes: &[ImportedMesh], extras: &GltfExtras) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for mesh in meshes {
        if SKIPPED_MESH_NAMES.contains(&mesh.name.as_str()) || mesh.is_instanced() {
            continue;
        }
        if let Some(IfcEntry::Meshes(records)) = extras.ifc.get(&mesh.name)
            && let Some(first) = records.first()
        {
            let name = first
                .ifc_filename
                .split(".ifc")
                .next()
                .unwrap_or(&first.ifc_filename)
                .to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Some exports pass a glTF filename where the IFC filename belongs; map it
/// back to the IFC file whose name it contains. Files in the wild rely on
/// this.
fn instance_filename(ifc_names: &[String], filename: &str) -> Option<String> {
    if filename.is_empty() {
        return None;
    }
    if filename.contains(".gltf") {
        ifc_names
            .iter()
            .find(|name| filename.contains(name.as_str()))
            .map(|name| format!("{name}.ifc"))
    } else {
        Some(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extras(json: &str) -> GltfExtras {
        serde_json::from_str(json).unwrap()
    }

    const EXTRAS_JSON: &str = r#"{
        "centeringOffset": [10, 0, "2"],
        "ifc": {
            "wall_group": [{
                "ifcGuid": "w-1",
                "ifcType": "IfcWall",
                "ifcStorey": "1",
                "ifcFilename": "office.ifc",
                "startVertex": 0,
                "endVertex": 100,
                "startIndex": 0,
                "endIndex": 150
            }],
            "chair": {
                "ifcFilename": "office.ifc",
                "ifcStorey": "1",
                "ifcType": "IfcFurniture"
            },
            "chair.001": {
                "ifcFilename": "office.ifc",
                "ifcStorey": "2",
                "ifcType": "IfcFurniture"
            }
        }
    }"#;

    #[test]
    fn merged_mesh_takes_fields_from_first_record() {
        let extras = extras(EXTRAS_JSON);
        let meshes = vec![ImportedMesh::new("wall_group")];
        let ids = HashMap::from([("office.ifc".to_string(), "model-1".to_string())]);

        let stitched = stitch_ifc_metadata(&meshes, &extras, &ids);
        assert_eq!(stitched.model_offset, Some(glm::vec3(-10.0, 0.0, 2.0)));

        let binding = &stitched.bindings[0];
        assert_eq!(binding.ifc_type, "IfcWall");
        assert_eq!(binding.ifc_id, "model-1");
        assert_eq!(binding.sub_objects.len(), 1);
    }

    #[test]
    fn instanced_mesh_strips_primitive_suffix_and_collects_instances() {
        let extras = extras(EXTRAS_JSON);
        let mut mesh = ImportedMesh::new("chair_primitive0");
        mesh.instances = vec!["chair.001_primitive0".to_string()];

        let stitched = stitch_ifc_metadata(&[mesh], &extras, &HashMap::new());
        let binding = &stitched.bindings[0];

        assert_eq!(binding.mesh_name, "chair");
        assert_eq!(binding.ifc_type, "IfcFurniture");
        assert_eq!(binding.ifc_filename, "office.ifc");
        assert_eq!(binding.instance_data_by_name.len(), 2);
        assert_eq!(binding.instance_data_by_name["chair.001"].ifc_storey, "2");
    }

    #[test]
    fn mesh_without_records_is_logged_and_skipped() {
        let extras = extras(EXTRAS_JSON);
        let meshes = vec![
            ImportedMesh::new("navigationMesh"),
            ImportedMesh::new("__root__"),
            ImportedMesh::new("unknown"),
        ];

        let stitched = stitch_ifc_metadata(&meshes, &extras, &HashMap::new());
        assert!(stitched.bindings.is_empty());
    }

    #[test]
    fn gltf_filename_is_mapped_back_to_ifc() {
        let names = vec!["office".to_string(), "site".to_string()];
        assert_eq!(
            instance_filename(&names, "merged_site_01.gltf"),
            Some("site.ifc".to_string())
        );
        assert_eq!(
            instance_filename(&names, "office.ifc"),
            Some("office.ifc".to_string())
        );
        assert_eq!(instance_filename(&names, ""), None);
    }
}
