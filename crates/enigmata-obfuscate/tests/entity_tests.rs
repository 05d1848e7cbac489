//! Entity-family renaming E2E tests

use enigmata_obfuscate::*;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashSet};

fn session() -> ObfuscationSession {
    let mut reference = ReferenceData::default();
    reference.material_ids.insert("entity_alphatest".into());
    reference.material_ids.insert("particles_alpha".into());
    ObfuscationSession::with_reference(SessionConfig::default(), reference)
        .expect("default config is valid")
}

fn name(session: &ObfuscationSession, category: Category, original: &str) -> String {
    session
        .lookup(category, original)
        .unwrap_or_else(|| panic!("{original} has no {category} name"))
}

fn client_entity() -> Value {
    json!({
        "format_version": "1.10.0",
        "minecraft:client_entity": {
            "description": {
                "identifier": "mypack:cow",
                "materials": { "default": "entity_alphatest" },
                "textures": { "default": "textures/entity/cow" },
                "geometry": { "default": "geometry.cow" },
                "animations": {
                    "walk": "animation.cow.walk",
                    "look": "controller.animation.cow.look"
                },
                "scripts": {
                    "animate": ["walk", { "look": "q.is_alive" }],
                    "pre_animation": ["variable.speed = q.modified_move_speed;"]
                },
                "render_controllers": ["controller.render.cow"]
            }
        }
    })
}

// ============================================================================
// Client entities
// ============================================================================

#[test]
fn test_client_entity_description() -> anyhow::Result<()> {
    let session = session();
    let out = obfuscate_entity_document(&session, EntityKind::ClientEntity, client_entity())?;
    let d = &out["minecraft:client_entity"]["description"];

    // the entity's own identifier is not part of any category
    assert_eq!(d["identifier"], "mypack:cow");
    assert_eq!(out["format_version"], "1.10.0");

    let material_index = name(&session, Category::MaterialIndex, "default");
    assert_eq!(d["materials"][&material_index], "entity_alphatest");

    let texture_index = name(&session, Category::TextureIndex, "default");
    assert_eq!(d["textures"][&texture_index], "textures/entity/cow");

    let model_index = name(&session, Category::ModelIndex, "default");
    let model = name(&session, Category::Model, "cow");
    assert_eq!(d["geometry"][&model_index], format!("geometry.{model}"));

    let walk = name(&session, Category::AnimationIndex, "walk");
    let look = name(&session, Category::AnimationIndex, "look");
    let walk_anim = name(&session, Category::Animation, "cow.walk");
    let look_ctrl = name(&session, Category::Animation, "cow.look");
    assert_eq!(d["animations"][&walk], format!("animation.{walk_anim}"));
    assert_eq!(d["animations"][&look], format!("controller.animation.{look_ctrl}"));

    let animate = &d["scripts"]["animate"];
    assert_eq!(animate[0], walk.as_str());
    assert_eq!(animate[1][&look], "q.is_alive");

    let speed = name(&session, Category::MolangVariable, "speed");
    assert_eq!(
        d["scripts"]["pre_animation"][0],
        format!("v.{speed} = q.modified_move_speed;")
    );

    let rc = name(&session, Category::RenderController, "cow");
    assert_eq!(d["render_controllers"][0], format!("controller.render.{rc}"));
    Ok(())
}

#[test]
fn test_client_entity_graph() -> anyhow::Result<()> {
    let session = session();
    obfuscate_entity_document(&session, EntityKind::ClientEntity, client_entity())?;

    session.with_graph(|g| {
        assert_eq!(g.successors(NodeKind::Entity, "cow", NodeKind::Model), vec!["cow"]);
        assert_eq!(g.successors(NodeKind::Entity, "cow", NodeKind::ModelIndex), vec!["default"]);
        assert_eq!(g.successors(NodeKind::ModelIndex, "default", NodeKind::Model), vec!["cow"]);
        assert_eq!(
            g.successors(NodeKind::Entity, "cow", NodeKind::RenderController),
            vec!["cow"]
        );
        assert_eq!(g.successors(NodeKind::Entity, "cow", NodeKind::MolangVar), vec!["speed"]);

        let animations: BTreeSet<&str> = g
            .successors(NodeKind::Entity, "cow", NodeKind::Animation)
            .into_iter()
            .collect();
        assert_eq!(animations, BTreeSet::from(["cow.walk", "cow.look"]));
    });
    Ok(())
}

#[test]
fn test_reference_names_stay() -> anyhow::Result<()> {
    let mut reference = ReferenceData::default();
    let g = &mut reference.graph;
    g.add_node(NodeKind::Entity, "cow", true);
    g.add_node(NodeKind::ModelIndex, "default", false);
    g.add_edge(NodeKind::Entity, "cow", NodeKind::ModelIndex, "default")?;
    g.add_node(NodeKind::Model, "cow", true);
    g.add_node(NodeKind::Particle, "basic_flame_particle", true);
    let session = ObfuscationSession::with_reference(SessionConfig::default(), reference)?;

    let doc = json!({
        "minecraft:client_entity": {
            "description": {
                "identifier": "minecraft:cow",
                "geometry": { "default": "geometry.cow", "saddle": "geometry.cow.saddle" },
                "particle_effects": { "flame": "minecraft:basic_flame_particle" }
            }
        }
    });
    let out = obfuscate_entity_document(&session, EntityKind::ClientEntity, doc)?;
    let d = &out["minecraft:client_entity"]["description"];

    // vanilla index and vanilla model
    assert_eq!(d["geometry"]["default"], "geometry.cow");
    let saddle = name(&session, Category::ModelIndex, "saddle");
    let saddle_model = name(&session, Category::Model, "cow.saddle");
    assert_eq!(d["geometry"][&saddle], format!("geometry.{saddle_model}"));
    assert!(session.lookup(Category::ModelIndex, "default").is_none());

    // reserved namespace and vanilla particle
    let flame = name(&session, Category::ParticleIndex, "flame");
    assert_eq!(d["particle_effects"][&flame], "minecraft:basic_flame_particle");
    Ok(())
}

#[test]
fn test_configured_exclusions() -> anyhow::Result<()> {
    let config = SessionConfig {
        excluded_entity_names: HashSet::from(["keep_me".to_string()]),
        ..SessionConfig::default()
    };
    let session = ObfuscationSession::new(config)?;

    let doc = json!({
        "format_version": "1.12.0",
        "minecraft:geometry": [{
            "description": { "identifier": "geometry.thing" },
            "bones": [{ "name": "keep_me" }, { "name": "arm", "parent": "keep_me" }]
        }]
    });
    let out = obfuscate_entity_document(&session, EntityKind::Model, doc)?;
    let bones = &out["minecraft:geometry"][0]["bones"];
    assert_eq!(bones[0]["name"], "keep_me");
    assert_eq!(bones[1]["parent"], "keep_me");
    assert_eq!(bones[1]["name"], name(&session, Category::Bone, "arm").as_str());
    Ok(())
}

// ============================================================================
// Models and animations
// ============================================================================

#[test]
fn test_model_formats_agree() -> anyhow::Result<()> {
    let session = session();

    let modern = json!({
        "format_version": "1.12.0",
        "minecraft:geometry": [{
            "description": { "identifier": "geometry.cow" },
            "bones": [{ "name": "body" }, { "name": "head", "parent": "body" }]
        }]
    });
    let legacy = json!({
        "format_version": "1.8.0",
        "geometry.calf": { "bones": [{ "name": "body" }] }
    });
    let modern = obfuscate_entity_document(&session, EntityKind::Model, modern)?;
    let legacy = obfuscate_entity_document(&session, EntityKind::Model, legacy)?;

    let cow = name(&session, Category::Model, "cow");
    let calf = name(&session, Category::Model, "calf");
    let body = name(&session, Category::Bone, "body");
    let head = name(&session, Category::Bone, "head");

    let geometry = &modern["minecraft:geometry"][0];
    assert_eq!(geometry["description"]["identifier"], format!("geometry.{cow}"));
    assert_eq!(geometry["bones"][0]["name"], body.as_str());
    assert_eq!(geometry["bones"][1]["name"], head.as_str());
    assert_eq!(geometry["bones"][1]["parent"], body.as_str());

    let calf_key = format!("geometry.{calf}");
    assert_eq!(legacy["geometry.calf"], Value::Null);
    assert_eq!(legacy[&calf_key]["bones"][0]["name"], body.as_str());

    session.with_graph(|g| {
        let bones: BTreeSet<&str> = g.bones_of(NodeKind::Model, "cow");
        assert_eq!(bones, BTreeSet::from(["body", "head"]));
        assert_eq!(g.successors(NodeKind::Model, "calf", NodeKind::Bone), vec!["body"]);
    });
    Ok(())
}

#[test]
fn test_animation_keeps_vanilla_bones() -> anyhow::Result<()> {
    let mut reference = ReferenceData::default();
    let g = &mut reference.graph;
    for (kind, payload) in [
        (NodeKind::Entity, "cow"),
        (NodeKind::Model, "cow"),
        (NodeKind::Bone, "head"),
        (NodeKind::Animation, "cow.walk"),
    ] {
        g.add_node(kind, payload, true);
    }
    g.add_edge(NodeKind::Entity, "cow", NodeKind::Model, "cow")?;
    g.add_edge(NodeKind::Model, "cow", NodeKind::Bone, "head")?;
    g.add_edge(NodeKind::Entity, "cow", NodeKind::Animation, "cow.walk")?;
    let session = ObfuscationSession::with_reference(SessionConfig::default(), reference)?;

    let doc = json!({
        "format_version": "1.8.0",
        "animations": {
            "animation.cow.walk": {
                "loop": true,
                "bones": {
                    "head": { "rotation": [0, "v.tilt", 0] },
                    "tail": { "rotation": [0, 0, 0] }
                }
            }
        }
    });
    let out = obfuscate_entity_document(&session, EntityKind::Animation, doc)?;

    // vanilla animation id
    assert!(session.lookup(Category::Animation, "cow.walk").is_none());
    let body = &out["animations"]["animation.cow.walk"];
    assert_eq!(body["loop"], true);

    let tail = name(&session, Category::Bone, "tail");
    let tilt = name(&session, Category::MolangVariable, "tilt");
    assert_eq!(body["bones"]["head"]["rotation"][1], format!("v.{tilt}"));
    assert_eq!(body["bones"][&tail]["rotation"], json!([0, 0, 0]));
    assert!(session.lookup(Category::Bone, "head").is_none());
    Ok(())
}

#[test]
fn test_animation_controller() -> anyhow::Result<()> {
    let session = session();
    let doc = json!({
        "format_version": "1.10.0",
        "animation_controllers": {
            "controller.animation.cow.move": {
                "initial_state": "default",
                "states": {
                    "default": {
                        "animations": ["walk"],
                        "transitions": [{ "moving": "q.is_moving && v.speed > 0" }]
                    },
                    "moving": {
                        "particle_effects": [{ "effect": "dust", "locator": "root" }]
                    }
                }
            }
        }
    });
    let out = obfuscate_entity_document(&session, EntityKind::AnimationController, doc)?;

    let controller = name(&session, Category::Animation, "cow.move");
    let body = &out["animation_controllers"][format!("controller.animation.{controller}")];

    let default = name(&session, Category::AnimationControllerState, "default");
    let moving = name(&session, Category::AnimationControllerState, "moving");
    assert_eq!(body["initial_state"], default.as_str());

    let state = &body["states"][&default];
    assert_eq!(
        state["animations"][0],
        name(&session, Category::AnimationIndex, "walk").as_str()
    );
    let speed = name(&session, Category::MolangVariable, "speed");
    assert_eq!(
        state["transitions"][0][&moving],
        format!("q.is_moving && v.{speed} > 0")
    );

    let effect = &body["states"][&moving]["particle_effects"][0];
    assert_eq!(effect["effect"], name(&session, Category::ParticleIndex, "dust").as_str());
    assert_eq!(effect["locator"], "root");
    Ok(())
}

// ============================================================================
// Render controllers, particles, materials
// ============================================================================

#[test]
fn test_render_controller_matches_entity() -> anyhow::Result<()> {
    let session = session();
    obfuscate_entity_document(&session, EntityKind::ClientEntity, client_entity())?;

    let doc = json!({
        "format_version": "1.8.0",
        "render_controllers": {
            "controller.render.cow": {
                "arrays": { "textures": { "Array.skins": ["Texture.default", "Texture.baby"] } },
                "geometry": "Geometry.default",
                "materials": [{ "*": "Material.default" }],
                "textures": ["Array.skins[query.variant]"]
            }
        }
    });
    let out = obfuscate_entity_document(&session, EntityKind::RenderController, doc)?;

    let rc = name(&session, Category::RenderController, "cow");
    let body = &out["render_controllers"][format!("controller.render.{rc}")];

    let model_index = name(&session, Category::ModelIndex, "default");
    let material_index = name(&session, Category::MaterialIndex, "default");
    let texture_index = name(&session, Category::TextureIndex, "default");
    let baby = name(&session, Category::TextureIndex, "baby");
    let skins = name(&session, Category::RenderControllerArray, "skins");

    assert_eq!(body["geometry"], format!("Geometry.{model_index}"));
    assert_eq!(body["materials"][0]["*"], format!("Material.{material_index}"));
    assert_eq!(body["textures"][0], format!("Array.{skins}[query.variant]"));
    assert_eq!(
        body["arrays"]["textures"][format!("Array.{skins}")],
        json!([format!("Texture.{texture_index}"), format!("Texture.{baby}")])
    );
    Ok(())
}

fn cow_model() -> Value {
    json!({
        "format_version": "1.12.0",
        "minecraft:geometry": [{
            "description": { "identifier": "geometry.cow" },
            "bones": [
                { "name": "body" },
                { "name": "head", "parent": "body" },
                { "name": "leg_front", "parent": "body" },
                { "name": "leg_back", "parent": "body" }
            ]
        }]
    })
}

#[test]
fn test_render_controller_bone_keys_follow_model() -> anyhow::Result<()> {
    let session = session();
    let rc_doc = json!({
        "format_version": "1.8.0",
        "render_controllers": {
            "controller.render.cow": {
                "geometry": "Geometry.default",
                "materials": [
                    { "*": "Material.default" },
                    { "leg*": "Material.default" },
                    { "body": "Material.default" }
                ],
                "part_visibility": [{ "*": true }, { "head": "query.is_baby" }]
            }
        }
    });
    let entity = |id: &str, kind: EntityKind, value: Value| {
        Document::new(id, DocumentKind::Entity(kind), value.to_string())
    };
    // the controller comes first but still sees the model's bones
    let report = run(
        &session,
        vec![
            entity("rc.json", EntityKind::RenderController, rc_doc),
            entity("cow.geo.json", EntityKind::Model, cow_model()),
            entity("cow.entity.json", EntityKind::ClientEntity, client_entity()),
        ],
    )?;
    let ids: Vec<&str> = report.outputs.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["rc.json", "cow.geo.json", "cow.entity.json"]);

    let out: Value = serde_json::from_str(&report.outputs["rc.json"])?;
    let rc = name(&session, Category::RenderController, "cow");
    let body = &out["render_controllers"][format!("controller.render.{rc}")];
    let material = format!("Material.{}", name(&session, Category::MaterialIndex, "default"));
    let bone = |original: &str| name(&session, Category::Bone, original);

    let geo: Value = serde_json::from_str(&report.outputs["cow.geo.json"])?;
    assert_eq!(geo["minecraft:geometry"][0]["bones"][0]["name"], bone("body").as_str());

    // the glob expands to every matching bone, in name order
    assert_eq!(
        body["materials"],
        json!([
            { "*": material },
            { bone("leg_back"): material },
            { bone("leg_front"): material },
            { bone("body"): material }
        ])
    );
    assert_eq!(
        body["part_visibility"],
        json!([{ "*": true }, { bone("head"): "query.is_baby" }])
    );
    Ok(())
}

#[test]
fn test_unknown_bone_keys_are_kept() -> anyhow::Result<()> {
    let session = session();
    obfuscate_entity_document(&session, EntityKind::Model, cow_model())?;

    // no entity links this controller to the model
    let doc = json!({
        "render_controllers": {
            "controller.render.pig": {
                "geometry": "Geometry.default",
                "part_visibility": [{ "leg*": false, "tail": false, "head": true }]
            }
        }
    });
    let out = rename_bone_keys(&session, doc);
    let head = name(&session, Category::Bone, "head");
    assert_eq!(
        out["render_controllers"]["controller.render.pig"]["part_visibility"],
        json!([{ "leg*": false, "tail": false, head: true }])
    );
    Ok(())
}

#[test]
fn test_particle_identifier_is_namespaced() -> anyhow::Result<()> {
    let session = session();
    let doc = json!({
        "format_version": "1.10.0",
        "particle_effect": {
            "description": {
                "identifier": "mypack:smoke",
                "basic_render_parameters": {
                    "material": "particles_alpha",
                    "texture": "textures/particle/particles"
                }
            },
            "components": {
                "minecraft:emitter_rate_instant": { "num_particles": "variable.count" }
            }
        }
    });
    let out = obfuscate_entity_document(&session, EntityKind::Particle, doc)?;
    let effect = &out["particle_effect"];

    let namespace = name(&session, Category::Particle, "mypack");
    let smoke = name(&session, Category::Particle, "smoke");
    assert_eq!(effect["description"]["identifier"], format!("{namespace}:{smoke}"));

    let params = &effect["description"]["basic_render_parameters"];
    assert_eq!(params["material"], "particles_alpha");
    assert_eq!(params["texture"], "textures/particle/particles");

    let count = name(&session, Category::MolangVariable, "count");
    assert_eq!(
        effect["components"]["minecraft:emitter_rate_instant"]["num_particles"],
        format!("v.{count}")
    );
    session.with_graph(|g| {
        assert_eq!(g.successors(NodeKind::Particle, "smoke", NodeKind::MolangVar), vec!["count"]);
    });
    Ok(())
}

#[test]
fn test_material_keys() -> anyhow::Result<()> {
    let session = session();
    let doc = json!({
        "materials": {
            "version": "1.0.0",
            "cow_skin:entity_alphatest": { "+defines": ["USE_OVERLAY"] }
        }
    });
    let out = obfuscate_entity_document(&session, EntityKind::Material, doc)?;
    let materials = out["materials"].as_object().expect("materials object");

    let skin = name(&session, Category::Material, "cow_skin");
    assert_eq!(materials["version"], "1.0.0");
    assert!(materials.contains_key(&format!("{skin}:entity_alphatest")));
    Ok(())
}

#[test]
fn test_vanilla_entity_is_unchanged() -> anyhow::Result<()> {
    let session = session();
    let doc = json!({
        "format_version": "1.10.0",
        "minecraft:client_entity": {
            "description": {
                "identifier": "minecraft:pig",
                "materials": { "default": "entity_alphatest" },
                "scripts": { "pre_animation": ["q.is_baby"] }
            }
        }
    });
    let mut reference = ReferenceData::default();
    reference.material_ids.insert("entity_alphatest".into());
    let g = &mut reference.graph;
    g.add_node(NodeKind::Entity, "pig", true);
    g.add_node(NodeKind::MaterialIndex, "default", false);
    g.add_edge(NodeKind::Entity, "pig", NodeKind::MaterialIndex, "default")?;
    let vanilla = ObfuscationSession::with_reference(SessionConfig::default(), reference)?;

    let out = obfuscate_entity_document(&vanilla, EntityKind::ClientEntity, doc.clone())?;
    assert_eq!(out, doc);
    assert!(vanilla.export_tables().is_empty());

    // an empty reference renames the index
    let out = obfuscate_entity_document(&session, EntityKind::ClientEntity, doc.clone())?;
    assert_ne!(out, doc);
    Ok(())
}
