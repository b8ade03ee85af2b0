use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control plane reported by mesh discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPlane {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Value>,
}

/// Response body of the SMP mesh listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmpMeshes {
    #[serde(default)]
    pub available_meshes: Vec<String>,
}

/// `open_service_mesh` -> `Open Service Mesh`
pub fn display_name(name: &str) -> String {
    name.split([' ', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Options for the mesh selection field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshOptions {
    adapters: Vec<String>,
    smp: Vec<String>,
    selected: Option<String>,
}

impl MeshOptions {
    /// Record discovered control planes. Only planes with running members become options; the
    /// last reported plane becomes the suggested selection.
    pub fn set_control_planes(&mut self, planes: &[ControlPlane]) {
        if planes.is_empty() {
            return;
        }
        self.adapters = planes
            .iter()
            .filter(|p| !p.members.is_empty())
            .map(|p| display_name(&p.name))
            .collect();
        self.selected = planes.last().map(|p| p.name.clone());
    }

    pub fn set_smp_meshes(&mut self, mut meshes: Vec<String>) {
        meshes.sort_by_key(|m| m.to_lowercase());
        self.smp = meshes;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Discovered adapters first, then the SMP meshes that were not discovered.
    pub fn options(&self) -> Vec<String> {
        self.adapters
            .iter()
            .chain(self.smp.iter().filter(|m| !self.adapters.contains(m)))
            .cloned()
            .collect()
    }

    /// Form values are the lower-cased option labels.
    pub fn values(&self) -> Vec<String> {
        self.options().iter().map(|m| m.to_lowercase()).collect()
    }
}
