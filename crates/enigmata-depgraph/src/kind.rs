use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "entity")]
    Entity,
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "model_index")]
    ModelIndex,
    #[serde(rename = "bone")]
    Bone,
    #[serde(rename = "animation")]
    Animation,
    #[serde(rename = "animation_index")]
    AnimationIndex,
    #[serde(rename = "material_index")]
    MaterialIndex,
    #[serde(rename = "texture_index")]
    TextureIndex,
    #[serde(rename = "particle_index")]
    ParticleIndex,
    #[serde(rename = "particle")]
    Particle,
    #[serde(rename = "rc")]
    RenderController,
    #[serde(rename = "mv")]
    MolangVar,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Entity,
        NodeKind::Model,
        NodeKind::ModelIndex,
        NodeKind::Bone,
        NodeKind::Animation,
        NodeKind::AnimationIndex,
        NodeKind::MaterialIndex,
        NodeKind::TextureIndex,
        NodeKind::ParticleIndex,
        NodeKind::Particle,
        NodeKind::RenderController,
        NodeKind::MolangVar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Entity => "entity",
            NodeKind::Model => "model",
            NodeKind::ModelIndex => "model_index",
            NodeKind::Bone => "bone",
            NodeKind::Animation => "animation",
            NodeKind::AnimationIndex => "animation_index",
            NodeKind::MaterialIndex => "material_index",
            NodeKind::TextureIndex => "texture_index",
            NodeKind::ParticleIndex => "particle_index",
            NodeKind::Particle => "particle",
            NodeKind::RenderController => "rc",
            NodeKind::MolangVar => "mv",
        }
    }

    /// Index kinds are the per-entity short names (`"default"`, `"walk"`, ...).
    pub fn is_index(self) -> bool {
        matches!(
            self,
            NodeKind::ModelIndex
                | NodeKind::AnimationIndex
                | NodeKind::MaterialIndex
                | NodeKind::TextureIndex
                | NodeKind::ParticleIndex
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
