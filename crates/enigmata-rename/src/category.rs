//! Closed set of rename categories and their coupling groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of a renamed identifier. Each category owns one
/// [`RenameTable`](crate::RenameTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Filename,
    AnimationController,
    AnimationControllerState,
    Animation,
    Material,
    Model,
    Bone,
    Particle,
    RenderController,
    RenderControllerArray,
    AnimationIndex,
    MaterialIndex,
    ModelIndex,
    ParticleIndex,
    TextureIndex,
    MolangVariable,
    UiControl,
    UiVariable,
    UiBinding,
    Localization,
    UiMerge,
}

impl Category {
    pub const ALL: [Category; 21] = [
        Category::Filename,
        Category::AnimationController,
        Category::AnimationControllerState,
        Category::Animation,
        Category::Material,
        Category::Model,
        Category::Bone,
        Category::Particle,
        Category::RenderController,
        Category::RenderControllerArray,
        Category::AnimationIndex,
        Category::MaterialIndex,
        Category::ModelIndex,
        Category::ParticleIndex,
        Category::TextureIndex,
        Category::MolangVariable,
        Category::UiControl,
        Category::UiVariable,
        Category::UiBinding,
        Category::Localization,
        Category::UiMerge,
    ];

    /// Name used as the category key of an exported table.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Filename => "filenames",
            Category::AnimationController => "animation_controllers",
            Category::AnimationControllerState => "animation_controller_states",
            Category::Animation => "animations",
            Category::Material => "materials",
            Category::Model => "models",
            Category::Bone => "bones",
            Category::Particle => "particles",
            Category::RenderController => "render_controllers",
            Category::RenderControllerArray => "render_controller_arrays",
            Category::AnimationIndex => "animation_indexes",
            Category::MaterialIndex => "material_indexes",
            Category::ModelIndex => "model_indexes",
            Category::ParticleIndex => "particle_indexes",
            Category::TextureIndex => "texture_indexes",
            Category::MolangVariable => "molang_variables",
            Category::UiControl => "ui_controls",
            Category::UiVariable => "ui_variables",
            Category::UiBinding => "ui_bindings",
            Category::Localization => "localizations",
            Category::UiMerge => "ui_merge_controls",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn coupling_group(self) -> Option<CouplingGroup> {
        CouplingGroup::ALL
            .into_iter()
            .find(|group| group.members().contains(&self))
    }

    /// Asset categories draw fresh names from the ASCII pools.
    pub fn prefers_ascii(self) -> bool {
        self.coupling_group() == Some(CouplingGroup::Asset)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories whose generated names are mutually reusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingGroup {
    Ui,
    Asset,
}

impl CouplingGroup {
    pub const ALL: [CouplingGroup; 2] = [CouplingGroup::Ui, CouplingGroup::Asset];

    pub fn members(self) -> &'static [Category] {
        match self {
            CouplingGroup::Ui => &[
                Category::UiControl,
                Category::UiVariable,
                Category::UiBinding,
                Category::Localization,
            ],
            CouplingGroup::Asset => &[
                Category::AnimationControllerState,
                Category::Animation,
                Category::AnimationIndex,
                Category::Bone,
                Category::Material,
                Category::MaterialIndex,
                Category::Model,
                Category::ModelIndex,
                Category::MolangVariable,
                Category::Particle,
                Category::ParticleIndex,
                Category::RenderController,
                Category::RenderControllerArray,
                Category::TextureIndex,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn index_matches_position_in_all() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn export_names_are_distinct() {
        let names: HashSet<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn groups_are_disjoint() {
        assert_eq!(Category::Bone.coupling_group(), Some(CouplingGroup::Asset));
        assert_eq!(Category::UiVariable.coupling_group(), Some(CouplingGroup::Ui));
        assert_eq!(Category::Filename.coupling_group(), None);
        assert_eq!(Category::AnimationController.coupling_group(), None);
        assert!(Category::Model.prefers_ascii());
        assert!(!Category::Localization.prefers_ascii());
    }
}
