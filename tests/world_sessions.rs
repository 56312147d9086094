use tempfile::TempDir;
use voxel_world::core::{error::WorldError, WorldConfig};
use voxel_world::engine_state::voxels::{
    block::block_type::BlockType,
    coords::ChunkCoord,
    persistence::{ChunkPersistence, DirectoryBlobStore},
    world::World,
};

fn open_world(dir: &TempDir, config: WorldConfig) -> World {
    let store = DirectoryBlobStore::open(dir.path()).expect("open store");
    let mut world = World::new(config).expect("valid config");
    world.initialize(ChunkPersistence::new(store));
    world
}

#[test]
fn test_edits_survive_a_restart() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = WorldConfig {
        seed: 42,
        worker_count: Some(2),
        ..Default::default()
    };

    let mut world = open_world(&dir, config.clone());
    assert!(world.set_block(-5, 200, 37, BlockType::WATER).unwrap());
    assert!(world.set_block(100, 201, -3, BlockType::LAVA).unwrap());
    world.dispose();

    let mut world = open_world(&dir, config);
    assert_eq!(world.get_block(-5, 200, 37), BlockType::AIR);
    world.get_or_load_chunk(ChunkCoord::from_world(-5, 37)).unwrap();
    world.get_or_load_chunk(ChunkCoord::from_world(100, -3)).unwrap();
    assert_eq!(world.get_block(-5, 200, 37), BlockType::WATER);
    assert_eq!(world.get_block(100, 201, -3), BlockType::LAVA);
    world.dispose();
}

#[test]
fn test_same_seed_same_terrain() {
    let coord = ChunkCoord::new(3, -8);
    let config = WorldConfig {
        seed: 7,
        worker_count: Some(0),
        ..Default::default()
    };

    let mut first = World::new(config.clone()).unwrap();
    let mut second = World::new(config).unwrap();
    let a = first.get_or_load_chunk(coord).unwrap().serialize();
    let b = second.get_or_load_chunk(coord).unwrap().serialize();
    assert_eq!(a, b);
}

#[test]
fn test_small_cache_round_trips_through_disk() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let mut world = open_world(
        &dir,
        WorldConfig {
            cache_capacity: 2,
            worker_count: Some(0),
            ..Default::default()
        },
    );

    for x in 0..6 {
        world.set_block(x * 16, 250, 0, BlockType::STONE).unwrap();
        assert!(world.stats().resident_chunks <= 2);
    }
    assert_eq!(world.take_evicted().len(), 4);

    for x in 0..6 {
        world.get_or_load_chunk(ChunkCoord::new(x, 0)).unwrap();
        assert_eq!(world.get_block(x * 16, 250, 0), BlockType::STONE);
    }

    world.dispose();
    assert!(matches!(
        world.request_chunk(ChunkCoord::new(0, 0)),
        Err(WorldError::Disposed)
    ));
}
