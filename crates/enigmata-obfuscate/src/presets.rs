//! Per-document-kind renaming rules for the entity family.

use crate::{EntityHandler, KeyMapping, ProcessMapping, ReferenceSet};
use enigmata_depgraph::NodeKind;
use enigmata_rename::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    AnimationController,
    Animation,
    ClientEntity,
    Material,
    Model,
    Particle,
    RenderController,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::AnimationController,
        EntityKind::Animation,
        EntityKind::ClientEntity,
        EntityKind::Material,
        EntityKind::Model,
        EntityKind::Particle,
        EntityKind::RenderController,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::AnimationController => "animation_controller",
            EntityKind::Animation => "animation",
            EntityKind::ClientEntity => "client_entity",
            EntityKind::Material => "material",
            EntityKind::Model => "model",
            EntityKind::Particle => "particle",
            EntityKind::RenderController => "render_controller",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the enclosing identifier of a subtree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierSource {
    None,
    /// `description.identifier` of a mapping
    Description,
    /// Keys of the named top-level section (`"animations": {"animation.x": ..}`)
    SectionKeys(&'static str),
    /// `description.identifier`, or `geometry.`-prefixed top-level keys
    Geometry,
}

/// Everything an [`crate::EntityRenamer`] needs for one document kind.
#[derive(Debug, Clone)]
pub struct RenameProfile {
    pub mapping: KeyMapping,
    /// Applies to prefixed keys no mapping entry claims
    pub root: EntityHandler,
    pub identifiers: IdentifierSource,
}

fn insert(mapping: &mut KeyMapping, keys: &[&str], entry: ProcessMapping) {
    for key in keys {
        mapping.insert((*key).to_string(), entry.clone());
    }
}

fn handler(category: Category, reference: ReferenceSet) -> EntityHandler {
    EntityHandler::renaming(category).with_reference(reference)
}

/// The animation handler shared by controllers, animations and entities.
fn animation_root() -> EntityHandler {
    handler(Category::Animation, ReferenceSet::Labels(NodeKind::Animation))
        .recorded_as(NodeKind::Animation)
}

fn particle_effect(mapping: &mut KeyMapping) {
    insert(
        mapping,
        &["effect"],
        ProcessMapping::values(handler(
            Category::ParticleIndex,
            ReferenceSet::Indexes(NodeKind::ParticleIndex),
        )),
    );
}

impl RenameProfile {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::AnimationController => Self::animation_controller(),
            EntityKind::Animation => Self::animation(),
            EntityKind::ClientEntity => Self::client_entity(),
            EntityKind::Material => Self::material(),
            EntityKind::Model => Self::model(),
            EntityKind::Particle => Self::particle(),
            EntityKind::RenderController => Self::render_controller(),
        }
    }

    fn animation_controller() -> Self {
        let mut mapping = KeyMapping::new();
        let state = EntityHandler::renaming(Category::AnimationControllerState);
        insert(&mut mapping, &["states", "transitions"], ProcessMapping::keys(state.clone()));
        insert(&mut mapping, &["initial_state"], ProcessMapping::values(state));
        insert(
            &mut mapping,
            &["animations"],
            ProcessMapping::keys(handler(
                Category::AnimationIndex,
                ReferenceSet::Indexes(NodeKind::AnimationIndex),
            )),
        );
        particle_effect(&mut mapping);
        Self {
            mapping,
            root: animation_root(),
            identifiers: IdentifierSource::SectionKeys("animation_controllers"),
        }
    }

    fn animation() -> Self {
        let mut mapping = KeyMapping::new();
        insert(
            &mut mapping,
            &["bones"],
            ProcessMapping::keys(handler(Category::Bone, ReferenceSet::Bones)),
        );
        particle_effect(&mut mapping);
        Self {
            mapping,
            root: animation_root(),
            identifiers: IdentifierSource::SectionKeys("animations"),
        }
    }

    fn client_entity() -> Self {
        let mut mapping = KeyMapping::new();
        let animation_index = || {
            handler(
                Category::AnimationIndex,
                ReferenceSet::Indexes(NodeKind::AnimationIndex),
            )
        };
        insert(
            &mut mapping,
            &["materials"],
            ProcessMapping::new(
                handler(Category::MaterialIndex, ReferenceSet::Indexes(NodeKind::MaterialIndex)),
                handler(Category::Material, ReferenceSet::MaterialIds),
            ),
        );
        insert(
            &mut mapping,
            &["textures"],
            ProcessMapping::keys(handler(
                Category::TextureIndex,
                ReferenceSet::Indexes(NodeKind::TextureIndex),
            )),
        );
        insert(
            &mut mapping,
            &["geometry"],
            ProcessMapping::new(
                handler(Category::ModelIndex, ReferenceSet::Indexes(NodeKind::ModelIndex))
                    .recorded_as(NodeKind::ModelIndex)
                    .per_occurrence(),
                handler(Category::Model, ReferenceSet::Labels(NodeKind::Model))
                    .recorded_as(NodeKind::Model),
            ),
        );
        insert(&mut mapping, &["animate"], ProcessMapping::keys(animation_index()));
        insert(
            &mut mapping,
            &["animations", "animation_controllers"],
            ProcessMapping::new(animation_index(), animation_root()),
        );
        insert(
            &mut mapping,
            &["render_controllers"],
            ProcessMapping::keys(
                handler(Category::RenderController, ReferenceSet::Labels(NodeKind::RenderController))
                    .recorded_as(NodeKind::RenderController),
            ),
        );
        insert(
            &mut mapping,
            &["particle_effects"],
            ProcessMapping::new(
                handler(Category::ParticleIndex, ReferenceSet::Indexes(NodeKind::ParticleIndex)),
                handler(Category::Particle, ReferenceSet::Labels(NodeKind::Particle)),
            ),
        );
        Self {
            mapping,
            root: EntityHandler::recording(NodeKind::Entity),
            identifiers: IdentifierSource::Description,
        }
    }

    fn material() -> Self {
        let mut mapping = KeyMapping::new();
        insert(
            &mut mapping,
            &["materials"],
            ProcessMapping::keys(handler(Category::Material, ReferenceSet::MaterialIds)),
        );
        Self {
            mapping,
            root: EntityHandler::default(),
            identifiers: IdentifierSource::None,
        }
    }

    fn model() -> Self {
        let mut mapping = KeyMapping::new();
        insert(
            &mut mapping,
            &["name"],
            ProcessMapping::values(
                handler(Category::Bone, ReferenceSet::Bones)
                    .recorded_as(NodeKind::Bone)
                    .per_occurrence(),
            ),
        );
        insert(
            &mut mapping,
            &["parent"],
            ProcessMapping::values(handler(Category::Bone, ReferenceSet::Bones)),
        );
        insert(
            &mut mapping,
            &["identifier"],
            ProcessMapping::values(handler(Category::Model, ReferenceSet::Labels(NodeKind::Model))),
        );
        Self {
            mapping,
            root: handler(Category::Model, ReferenceSet::Labels(NodeKind::Model))
                .recorded_as(NodeKind::Model),
            identifiers: IdentifierSource::Geometry,
        }
    }

    fn particle() -> Self {
        let mut mapping = KeyMapping::new();
        insert(
            &mut mapping,
            &["identifier"],
            ProcessMapping::values(handler(Category::Particle, ReferenceSet::Labels(NodeKind::Particle))),
        );
        insert(
            &mut mapping,
            &["material"],
            ProcessMapping::values(handler(Category::Material, ReferenceSet::MaterialIds)),
        );
        Self {
            mapping,
            root: EntityHandler::recording(NodeKind::Particle),
            identifiers: IdentifierSource::Description,
        }
    }

    fn render_controller() -> Self {
        let mut mapping = KeyMapping::new();
        let model_index = handler(Category::ModelIndex, ReferenceSet::Indexes(NodeKind::ModelIndex));
        insert(
            &mut mapping,
            &["geometry", "geometries"],
            ProcessMapping::both(model_index),
        );
        insert(
            &mut mapping,
            &["material"],
            ProcessMapping::both(handler(Category::Material, ReferenceSet::MaterialIds)),
        );
        insert(
            &mut mapping,
            &["materials"],
            ProcessMapping::values(handler(
                Category::MaterialIndex,
                ReferenceSet::Indexes(NodeKind::MaterialIndex),
            )),
        );
        insert(
            &mut mapping,
            &["textures"],
            ProcessMapping::both(handler(
                Category::TextureIndex,
                ReferenceSet::Indexes(NodeKind::TextureIndex),
            )),
        );
        Self {
            mapping,
            root: handler(Category::RenderController, ReferenceSet::Labels(NodeKind::RenderController))
                .recorded_as(NodeKind::RenderController),
            identifiers: IdentifierSource::SectionKeys("render_controllers"),
        }
    }
}
