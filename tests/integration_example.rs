// tests/integration_example.rs

use macroquad_tmx::{Layer, LayerKind, ObjectShape, TiledMap};
use std::path::PathBuf;

fn demo_map() -> TiledMap {
    let mut assets = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    assets.push("assets");
    assets.push("map.tmx");
    TiledMap::load(&assets).expect("Example assets should load")
}

#[test]
fn example_load_assets() {
    let map = demo_map();
    assert_eq!((map.width, map.height), (4, 3));
    assert_eq!(map.tilesets.len(), 2);
    assert_eq!(map.properties().get_string("theme"), Some("forest"));

    let order: Vec<_> = map.root.walk().into_iter().map(Layer::name).collect();
    assert_eq!(order, vec!["ground", "decor", "props", "spawns", "sky"]);
    assert_eq!(
        map.layers().iter().map(Layer::kind).collect::<Vec<_>>(),
        vec![LayerKind::Tiles, LayerKind::Group, LayerKind::Image]
    );
}

#[test]
fn example_tiles_resolve_across_tsx_and_tsj() {
    let map = demo_map();

    let ground = map.layer("ground").and_then(Layer::as_tiles).unwrap();
    let (tile, owner) = map.tile(ground, 1, 1).unwrap();
    assert_eq!(tile.gid, 6);
    let (terrain, local) = owner.unwrap();
    assert_eq!(terrain.name, "terrain");
    let meta = terrain.tile(local).unwrap();
    assert_eq!(meta.probability, 0.5);
    assert_eq!(meta.properties.get_bool("walkable"), Some(true));
    let corners = terrain.corner_terrains(meta);
    assert_eq!(corners[0].unwrap().name, "grass");
    assert_eq!(corners[3].unwrap().name, "dirt");

    let water = map.tilesets.tile(10).unwrap().1;
    assert_eq!(water.class, "water");
    assert_eq!(water.animation_length_ms(), 400);

    let props = map.layer("props").and_then(Layer::as_tiles).unwrap();
    assert_eq!(props.header.opacity, 0.8);
    let (chest, owner) = map.tile(props, 2, 1).unwrap();
    assert!(chest.flip_h && !chest.flip_v);
    let (ts, local) = owner.unwrap();
    assert_eq!((ts.name.as_str(), ts.first_gid, local), ("props", 17, 1));
    let chest_meta = ts.tile(local).unwrap();
    assert_eq!(chest_meta.class, "chest");
    assert_eq!(chest_meta.properties.get_string("loot"), Some("gold"));
    assert_eq!(chest_meta.object_groups[0].objects[0].width, 12.0);
}

#[test]
fn example_groups_and_objects() {
    let map = demo_map();
    let decor = map.groups().next().unwrap();
    assert_eq!(decor.header.offset.y, -4.0);
    assert_eq!(decor.tile_layers().count(), 1);

    let spawns = decor.object_layers().next().unwrap();
    assert_eq!(spawns.object_by_name("player").unwrap().shape, ObjectShape::Point);
    match spawns.object_by_name("chest").unwrap().shape {
        ObjectShape::Tile { gid, .. } => {
            assert_eq!(map.tilesets.resolve(gid).map(|(ts, l)| (ts.name.as_str(), l)), Some(("props", 1)))
        }
        ref other => panic!("expected tile object, got {:?}", other),
    }

    let sky = map.image_layers().next().unwrap();
    assert!(sky.repeat_x);
    assert!(sky.image.as_ref().unwrap().source.ends_with("assets/sky.png"));
}
