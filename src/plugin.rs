use bevy::{
    math::{vec2, vec3, Affine3A},
    prelude::*,
    render::render_resource::PrimitiveTopology,
    sprite::Mesh2dHandle,
    transform::TransformSystem,
};

use crate::{
    geometry::{write_mesh, TileVertex},
    layer::TileLayer,
    render::{RenderStates, RenderTarget, View},
    tileset::AtlasTileset,
};

/// Plugin for tile layers.
/// Add this to your app and spawn layers with [`crate::bundle::TileLayerBundle`].
#[derive(Default)]
pub struct TileLayerPlugin;

impl Plugin for TileLayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            (configure_loaded_tilesets, update_layer_meshes)
                .chain()
                .after(TransformSystem::TransformPropagate),
        );
    }
}

/// Marks entities whose `Mesh2dHandle` is filled by their [`TileLayer`].
///
/// Remove it to take over the mesh yourself, e.g. with
/// [`TileLayer::commit_geometry`].
#[derive(Debug, Component, Clone, Default)]
pub struct MeshManagedByLayer {
    /// Rebuild count and vertex transform of what is currently in the mesh.
    uploaded: Option<(u64, Affine3A)>,
}

/// Fill in the atlas size of tilesets once their image is loaded.
pub fn configure_loaded_tilesets(
    images: Res<Assets<Image>>,
    mut tilesets: Query<&mut AtlasTileset>,
) {
    for mut tileset in tilesets.iter_mut() {
        let atlas_size = match tileset.atlas_texture().and_then(|handle| images.get(handle)) {
            Some(image) => {
                let size = image.texture_descriptor.size;
                vec2(size.width as f32, size.height as f32)
            }
            None => continue,
        };

        if tileset.atlas_size() != atlas_size {
            debug!("tileset atlas loaded with size {}", atlas_size);
            tileset.update_atlas_size(atlas_size);
        }
    }
}

/// Render target backed by a 2d camera.
///
/// Submissions are only recorded, the vertices are uploaded into the layer's
/// mesh afterwards if they changed.
struct CameraTarget {
    view: View,
    submitted: Option<RenderStates>,
}

impl RenderTarget for CameraTarget {
    fn view(&self) -> View {
        self.view
    }

    fn draw(&mut self, _vertices: &[TileVertex], topology: PrimitiveTopology, states: &RenderStates) {
        debug_assert_eq!(topology, PrimitiveTopology::TriangleList);
        self.submitted = Some(states.clone());
    }
}

/// Layer-local coordinates grow downwards, world coordinates upwards.
fn flip_y() -> Transform {
    Transform::from_scale(vec3(1.0, -1.0, 1.0))
}

/// Draw every managed layer against the active 2d camera and upload changed
/// geometry into the layer's mesh.
pub fn update_layer_meshes(
    cameras: Query<(&Camera, &OrthographicProjection, &GlobalTransform), With<Camera2d>>,
    mut layers: Query<(
        &mut TileLayer,
        Ref<AtlasTileset>,
        &Mesh2dHandle,
        &GlobalTransform,
        &mut MeshManagedByLayer,
    )>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let Some((_, projection, camera_transform)) =
        cameras.iter().find(|(camera, _, _)| camera.is_active)
    else {
        return;
    };

    let view = View {
        center: camera_transform.translation().truncate(),
        size: projection.area.size(),
    };

    for (mut layer, tileset, mesh_handle, global_transform, mut managed) in layers.iter_mut() {
        // The entity transform places the layer, so culling sees where it is.
        let placement = global_transform.compute_transform() * flip_y();
        if *layer.placement() != placement {
            layer.set_placement(placement);
        }

        // Texture coordinates depend on the atlas size, which is only known
        // once the image is loaded.
        if tileset.is_changed() {
            layer.invalidate_geometry();
        }

        let mut target = CameraTarget {
            view,
            submitted: None,
        };
        layer.draw(&mut target, &*tileset, &RenderStates::default());

        let Some(states) = target.submitted else {
            continue;
        };

        // Bevy applies the entity transform when rendering the mesh.
        let vertex_transform = global_transform.affine().inverse() * states.transform;
        let key = (layer.cache().rebuilds(), vertex_transform);
        if managed.uploaded == Some(key) {
            continue;
        }

        let Some(mesh) = meshes.get_mut(&mesh_handle.0) else {
            warn!("tile layer mesh not available");
            continue;
        };
        write_mesh(mesh, layer.cache().vertices(), &vertex_transform);
        managed.uploaded = Some(key);
    }
}
