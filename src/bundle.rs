use bevy::{
    prelude::*,
    render::{render_resource::PrimitiveTopology, view::NoFrustumCulling},
    sprite::Mesh2dHandle,
};

use crate::{layer::TileLayer, plugin::MeshManagedByLayer, tileset::AtlasTileset};

// Bundle of components you should typically have for a tile layer.
#[derive(Bundle)]
pub struct TileLayerBundle {
    pub layer: TileLayer,
    pub tileset: AtlasTileset,

    pub material: Handle<ColorMaterial>,
    pub mesh: Mesh2dHandle,
    pub transform: Transform,
    pub global_transform: GlobalTransform,
    pub visibility: Visibility,
    pub inherited_visibility: InheritedVisibility,
    pub view_visibility: ViewVisibility,

    pub mesh_managed_by_layer: MeshManagedByLayer,
    // The mesh changes with the camera, its initial bounds would cull it.
    pub no_frustum_culling: NoFrustumCulling,
}

impl Default for TileLayerBundle {
    fn default() -> Self {
        Self {
            layer: default(),
            tileset: default(),
            material: default(),
            mesh: default(),
            transform: default(),
            global_transform: default(),
            visibility: default(),
            inherited_visibility: default(),
            view_visibility: default(),
            mesh_managed_by_layer: default(),
            no_frustum_culling: NoFrustumCulling,
        }
    }
}

impl TileLayerBundle {
    pub fn new(
        layer: TileLayer,
        tileset: AtlasTileset,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<ColorMaterial>,
    ) -> Self {
        let material = ColorMaterial {
            texture: tileset.atlas_texture().cloned(),
            ..default()
        };
        Self {
            layer,
            tileset,
            material: materials.add(material),
            mesh: Mesh2dHandle(meshes.add(Mesh::new(PrimitiveTopology::TriangleList))),
            ..default()
        }
    }
}
