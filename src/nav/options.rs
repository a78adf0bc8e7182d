use serde::Deserialize;

/// Marker and attribute names used by a navigation session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NavOptions {
    pub navigable_marker: String,
    /// Attribute that, when set to `"false"`, makes a row or cell unselectable.
    pub selectable_attribute: String,
    pub selected_table_marker: String,
    pub selected_row_marker: String,
    pub selected_cell_marker: String,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            navigable_marker: "tn_navigable".to_string(),
            selectable_attribute: "selectable".to_string(),
            selected_table_marker: "tn_selected_table".to_string(),
            selected_row_marker: "tn_selected_row".to_string(),
            selected_cell_marker: "tn_selected_cell".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let opts: NavOptions = toml::from_str(r#"selected_cell_marker = "cursor""#).unwrap();
        assert_eq!(opts.selected_cell_marker, "cursor");
        assert_eq!(opts.navigable_marker, "tn_navigable");
        assert_eq!(opts.selectable_attribute, "selectable");
    }
}
