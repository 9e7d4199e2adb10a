//! Embedded resources and the UI document container.

/// One entry of the assembly's resource table.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub data: ResourceData,
}

impl Resource {
    pub fn blob(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: ResourceData::Blob(bytes.into()),
        }
    }

    pub fn baml_container(name: impl Into<String>, parts: Vec<ResourcePart>) -> Self {
        Self {
            name: name.into(),
            data: ResourceData::BamlContainer(parts),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.data, ResourceData::BamlContainer(_))
    }
}

/// Resource payload.
///
/// The loader materializes the distinguished `<assembly>.g.resources`
/// entry as a container of named parts; everything else stays an opaque
/// blob.
#[derive(Debug, Clone)]
pub enum ResourceData {
    Blob(Vec<u8>),
    BamlContainer(Vec<ResourcePart>),
}

/// A named entry inside the UI document container. Parts whose name
/// ends in `.baml` are decoded into documents at index build.
#[derive(Debug, Clone)]
pub struct ResourcePart {
    pub name: String,
    pub blob: Vec<u8>,
}

impl ResourcePart {
    pub fn new(name: impl Into<String>, blob: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            blob: blob.into(),
        }
    }

    pub fn is_document(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".baml")
    }
}
