//! Typed view of compiled declarative-UI (BAML) documents.
//!
//! The binary reader for the document format lives outside this crate;
//! it is injected as a [`BamlDecoder`] and hands back documents as flat
//! record sequences. Only the four record kinds that matter for
//! reachability are distinguished; everything else collapses to
//! [`BamlRecord::Other`].

use crate::error::DeadcilResult;

/// File extension of compiled documents inside the container.
pub const DOCUMENT_EXTENSION: &str = ".baml";

/// File extension of markup sources, rewritten to
/// [`DOCUMENT_EXTENSION`] when resource paths are normalized.
pub const MARKUP_EXTENSION: &str = ".xaml";

/// Separator of pack-URI component paths
/// (`/Assembly;component/ui/window.xaml`).
pub const COMPONENT_SEPARATOR: &str = ";component/";

/// A parsed document: an ordered record sequence. Documents are read
/// during scanning, never mutated.
#[derive(Debug, Clone, Default)]
pub struct BamlDocument {
    pub records: Vec<BamlRecord>,
}

impl BamlDocument {
    pub fn new(records: Vec<BamlRecord>) -> Self {
        Self { records }
    }

    /// The full name of the type this document instantiates, from the
    /// first type-declaration record, if any.
    pub fn bound_type(&self) -> Option<&str> {
        self.records.iter().find_map(|r| match r {
            BamlRecord::TypeInfo { type_name } => Some(type_name.as_str()),
            _ => None,
        })
    }
}

/// One typed document record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BamlRecord {
    /// Declares the type this document instantiates.
    TypeInfo { type_name: String },
    /// Maps an XML namespace prefix to a CLR namespace for the rest of
    /// the document.
    NamespaceMapping {
        prefix: String,
        clr_namespace: String,
    },
    /// Free text; `prefix:Name` tokens resolve to types or members
    /// through the active namespace mappings.
    Text { value: String },
    /// A property value; component-path strings reference other parts
    /// of the resource container.
    PropertyValue { value: String },
    /// Any record kind reachability does not care about.
    Other,
}

/// Decoding collaborator for document blobs, consumed once at index
/// build. Failures propagate unchanged.
pub trait BamlDecoder {
    fn decode(&self, name: &str, blob: &[u8]) -> DeadcilResult<BamlDocument>;
}

/// Normalize a container part name for lookup: forward slashes, no
/// leading slash, lowercase.
pub fn normalize_part_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_ascii_lowercase()
}

/// Interpret a property value as a container resource path.
///
/// Returns the normalized in-container path (with the markup extension
/// rewritten to the compiled one), or `None` when the value does not
/// carry the component-path marker.
pub fn resource_path_target(value: &str) -> Option<String> {
    let after = match value.find(COMPONENT_SEPARATOR) {
        Some(pos) => &value[pos + COMPONENT_SEPARATOR.len()..],
        None => return None,
    };

    let mut path = normalize_part_name(after);
    if let Some(stem) = path.strip_suffix(MARKUP_EXTENSION) {
        path = format!("{stem}{DOCUMENT_EXTENSION}");
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_type_first_record_wins() {
        let doc = BamlDocument::new(vec![
            BamlRecord::Other,
            BamlRecord::TypeInfo {
                type_name: "Acme.UI.MainWindow".into(),
            },
            BamlRecord::TypeInfo {
                type_name: "Acme.UI.Second".into(),
            },
        ]);
        assert_eq!(doc.bound_type(), Some("Acme.UI.MainWindow"));
        assert_eq!(BamlDocument::default().bound_type(), None);
    }

    #[test]
    fn test_normalize_part_name() {
        assert_eq!(normalize_part_name("UI\\MainWindow.baml"), "ui/mainwindow.baml");
        assert_eq!(normalize_part_name("/ui/app.baml"), "ui/app.baml");
    }

    #[test]
    fn test_resource_path_target() {
        assert_eq!(
            resource_path_target("/Acme;component/UI/Used.xaml"),
            Some("ui/used.baml".to_string())
        );
        assert_eq!(
            resource_path_target("pack://application:,,,/Acme;component/images/logo.png"),
            Some("images/logo.png".to_string())
        );
        assert_eq!(resource_path_target("Hello world"), None);
        assert_eq!(resource_path_target("{Binding Value}"), None);
    }
}
