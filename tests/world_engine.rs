//! End-to-end behaviour of the voxel world through its public API.

use std::collections::{HashMap, HashSet};

use cgmath::{Deg, Point3, Vector3};
use noise::{Constant, NoiseFn};
use voxel_world::{
    config::WorldConfig,
    engine_state::{
        camera_state::{
            camera::{Camera, Projection},
            frustum::Frustum,
        },
        rendering::{meshing::ChunkMesh, ChunkPresenter, HeadlessPresenter},
        voxels::{
            block::block_type::BlockType,
            chunk::{ChunkKey, CHUNK_DIMENSION, WORLD_HEIGHT},
            perlin::Perlin2D,
            terrain::TerrainGenerator,
            world::World,
        },
        EngineState, PlayerAction,
    },
};
use web_time::Duration;

/// Records every call so handle traffic can be checked.
#[derive(Default)]
struct RecordingPresenter {
    next: u32,
    live: HashMap<u32, (ChunkKey, bool)>,
    attached: u32,
    detached: u32,
    unknown_detaches: u32,
}

impl ChunkPresenter for RecordingPresenter {
    type Handle = u32;

    fn attach(&mut self, key: ChunkKey, mesh: &ChunkMesh) -> u32 {
        assert!(!mesh.is_empty(), "empty mesh attached for {key}");
        self.next += 1;
        self.attached += 1;
        self.live.insert(self.next, (key, true));
        self.next
    }

    fn detach(&mut self, handle: u32) {
        self.detached += 1;
        if self.live.remove(&handle).is_none() {
            self.unknown_detaches += 1;
        }
    }

    fn set_visible(&mut self, handle: &u32, visible: bool) {
        if let Some(entry) = self.live.get_mut(handle) {
            entry.1 = visible;
        }
    }
}

/// Terrain whose surface grass sits at y = 23 everywhere.
fn flat_world<P: ChunkPresenter>(render_distance: i32, presenter: P) -> World<P> {
    World::with_terrain(
        TerrainGenerator::with_noise(Constant::new(0.15)),
        render_distance,
        presenter,
    )
}

/// Terrain with a single grass layer at y = 0.
fn bare_world() -> World<HeadlessPresenter> {
    World::with_terrain(
        TerrainGenerator::with_noise(Constant::new(-10.0)),
        1,
        HeadlessPresenter::new(),
    )
}

#[test]
fn noise_is_deterministic_per_seed() {
    let a = Perlin2D::new(2025);
    let b = Perlin2D::new(2025);
    let c = Perlin2D::new(2026);
    let mut differs = false;
    for i in 0..200 {
        let point = [i as f64 * 0.37 - 20.0, i as f64 * 0.11 + 3.0];
        assert_eq!(a.get(point).to_bits(), b.get(point).to_bits());
        differs |= a.get(point) != c.get(point);
    }
    assert!(differs);
}

#[test]
fn generated_heights_stay_inside_the_world() {
    let config = WorldConfig::default();
    let world = World::new(&config, HeadlessPresenter::new());
    for x in (-1_000..1_000).step_by(37) {
        for z in (-1_000..1_000).step_by(41) {
            let h = world.height_at(x, z);
            assert!((1..=WORLD_HEIGHT - 1).contains(&h), "h = {h} at ({x}, {z})");
        }
    }
}

#[test]
fn flat_terrain_is_stratified() {
    let mut world = flat_world(1, HeadlessPresenter::new());
    world.update(Point3::new(0.0, 30.0, 0.0), None);
    for (x, z) in [(0, 0), (-1, -1), (15, -16), (7, 9)] {
        for y in 0..WORLD_HEIGHT {
            let expected = if y < 20 {
                BlockType::STONE
            } else if y < 23 {
                BlockType::DIRT
            } else if y == 23 {
                BlockType::GRASS
            } else {
                BlockType::AIR
            };
            assert_eq!(world.block_at(x, y, z), expected, "({x}, {y}, {z})");
        }
    }
}

#[test]
fn meshes_keep_exposed_and_seam_blocks_only() {
    let mut world = flat_world(0, HeadlessPresenter::new());
    let chunk = world.ensure_chunk(ChunkKey::new(0, 0));
    let mesh = chunk.mesh().expect("terrain chunk has a mesh");

    assert!(mesh.contains_block(Point3::new(8, 23, 8)));
    assert!(!mesh.contains_block(Point3::new(8, 10, 8)));
    // Chunk borders are kept even though the neighbour would cover them.
    assert!(mesh.contains_block(Point3::new(0, 10, 8)));
    assert!(mesh.contains_block(Point3::new(8, 10, 15)));
    // The floor of the world is exposed too.
    assert!(mesh.contains_block(Point3::new(8, 0, 8)));

    let grass = mesh.batch(BlockType::GRASS).expect("grass batch");
    assert_eq!(grass.instances.len(), (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize);
}

#[test]
fn streaming_keeps_the_radius_loaded_and_drops_far_chunks() {
    let radius = 3;
    let mut world = flat_world(radius, RecordingPresenter::default());
    let path = [
        (0.0, 0.0),
        (40.0, -5.0),
        (-70.0, 20.0),
        (-70.5, -90.25),
        (300.0, 300.0),
        (301.0, 299.0),
    ];
    for (x, z) in path {
        let report = world.update(Point3::new(x, 40.0, z), None);
        let center = ChunkKey::from_world(x, z);
        assert_eq!(report.center, center);

        for dz in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dz * dz <= radius * radius {
                    let key = ChunkKey::new(center.cx + dx, center.cz + dz);
                    assert!(world.get_chunk(key).is_some(), "{key} missing near {center}");
                }
            }
        }
        assert!(world
            .loaded_chunk_keys()
            .all(|key| key.chebyshev_distance(&center) <= radius + 1));
    }

    let presenter = world.presenter();
    assert_eq!(presenter.unknown_detaches, 0);
    assert_eq!(presenter.live.len(), world.loaded_chunk_count());
    assert_eq!(
        (presenter.attached - presenter.detached) as usize,
        presenter.live.len()
    );
    let live_keys: HashSet<ChunkKey> = presenter.live.values().map(|(key, _)| *key).collect();
    assert!(world.loaded_chunk_keys().all(|key| live_keys.contains(&key)));
}

#[test]
fn chunks_behind_the_camera_are_hidden_but_kept() {
    let mut world = flat_world(3, RecordingPresenter::default());
    let camera = Camera::new(Point3::new(8.0, 40.0, 8.0), Deg(0.0), Deg(0.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 500.0);
    let frustum =
        Frustum::from_view_projection(&(projection.calc_matrix() * camera.calc_matrix()));

    let report = world.update(camera.position, Some(&frustum));
    assert!(report.hidden > 0);
    assert!(report.visible > 0);
    assert_eq!(report.visible + report.hidden, world.loaded_chunk_count());

    let behind = ChunkKey::new(-3, 0);
    let ahead = ChunkKey::new(3, 0);
    assert!(!world.get_chunk(behind).unwrap().is_visible());
    assert!(world.get_chunk(ahead).unwrap().is_visible());

    let presented_visibility: HashMap<ChunkKey, bool> =
        world.presenter().live.values().copied().collect();
    assert_eq!(presented_visibility.get(&behind), Some(&false));
    assert_eq!(presented_visibility.get(&ahead), Some(&true));

    // Hidden chunks are still solid.
    assert!(world.is_solid_at(-40, 10, 8));
}

#[test]
fn sand_falls_to_the_bottom_of_a_cleared_column() {
    let mut world = flat_world(1, HeadlessPresenter::new());
    world.update(Point3::new(0.0, 30.0, 0.0), None);
    for y in (0..24).rev() {
        world.set_block(5, y, 5, BlockType::AIR);
    }
    world.set_block(5, 40, 5, BlockType::SAND);

    assert_eq!(world.block_at(5, 0, 5), BlockType::SAND);
    for y in 1..WORLD_HEIGHT {
        assert_eq!(world.block_at(5, y, 5), BlockType::AIR, "y = {y}");
    }
}

#[test]
fn sand_drops_onto_the_next_support_after_removal() {
    let mut world = flat_world(1, HeadlessPresenter::new());
    world.set_block(-3, 24, 2, BlockType::SAND);
    assert_eq!(world.block_at(-3, 24, 2), BlockType::SAND);

    world.set_block(-3, 23, 2, BlockType::AIR);
    assert_eq!(world.block_at(-3, 23, 2), BlockType::SAND);
    assert_eq!(world.block_at(-3, 24, 2), BlockType::AIR);

    world.set_block(-3, 22, 2, BlockType::AIR);
    world.set_block(-3, 21, 2, BlockType::AIR);
    assert_eq!(world.block_at(-3, 21, 2), BlockType::SAND);
    assert_eq!(world.block_at(-3, 20, 2), BlockType::STONE);
}

#[test]
fn raycast_hits_a_lone_block_from_outside() {
    let mut world = bare_world();
    world.set_block(3, 30, 3, BlockType::STONE);

    let side = world
        .raycast_voxel(Point3::new(-20.5, 30.5, 3.5), Vector3::new(1.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(side.block, Point3::new(3, 30, 3));
    assert_eq!(side.normal, Vector3::new(-1, 0, 0));

    let above = world
        .raycast_voxel(Point3::new(3.5, 80.5, 3.5), Vector3::new(0.0, -1.0, 0.0))
        .unwrap();
    assert_eq!(above.block, Point3::new(3, 30, 3));
    assert_eq!(above.normal, Vector3::new(0, 1, 0));

    assert!(world
        .raycast_voxel(Point3::new(-20.5, 50.5, 3.5), Vector3::new(1.0, 0.0, 0.0))
        .is_none());
}

#[test]
fn set_then_query_round_trips() {
    let mut world = bare_world();
    for (i, block_type) in BlockType::ALL.into_iter().enumerate() {
        let (x, y, z) = (-40 + i as i32 * 17, 10 + i as i32, 33);
        world.set_block(x, y, z, block_type);
        if block_type == BlockType::SAND {
            // Sand rests on the grass floor.
            assert_eq!(world.block_at(x, 1, z), BlockType::SAND);
        } else {
            assert_eq!(world.block_at(x, y, z), block_type);
            assert_eq!(world.is_solid_at(x, y, z), block_type.is_solid());
        }
    }
    assert_eq!(
        world.chunk_key_from_world(-40.0, 10.0, 33.0),
        ChunkKey::new(-3, 2)
    );
}

#[test]
fn chunk_keys_round_trip_through_strings() {
    let key = ChunkKey::new(-3, 7);
    assert_eq!(key.to_string(), "-3,7");
    assert_eq!("-3,7".parse::<ChunkKey>(), Ok(key));
    assert!("3;7".parse::<ChunkKey>().is_err());
}

#[test]
fn double_tap_toggles_flight_in_the_frame_loop() {
    let config = WorldConfig {
        render_distance: 1,
        ..WorldConfig::default()
    };
    let world = flat_world(1, HeadlessPresenter::new());
    let mut engine = EngineState::with_world(&config, world);
    let tap = PlayerAction {
        jump_pressed: true,
        ..PlayerAction::default()
    };

    engine.process_frame(Duration::from_millis(100), &tap);
    assert!(!engine.player.is_flying());
    engine.process_frame(Duration::from_millis(100), &tap);
    assert!(engine.player.is_flying());
    assert!(engine.hud_line().ends_with("Fly ON"));

    let rise = PlayerAction {
        move_up: true,
        ..PlayerAction::default()
    };
    let before = engine.player.position.y;
    engine.process_frame(Duration::from_millis(16), &rise);
    assert!(engine.player.position.y > before);
}
