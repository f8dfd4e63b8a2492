use geocon::{ByteOrder, Extent, Grid, Header, LatDirection, LonDirection, Node};
use tempfile::NamedTempFile;

fn sample_header() -> Header {
    Header {
        info: "sample".to_string(),
        source: "unit test".to_string(),
        date: "2024-01-01".to_string(),
        lat_dir: LatDirection::SouthToNorth,
        lon_dir: LonDirection::WestToEast,
        nrows: 3,
        ncols: 3,
        lat_south: 0.0,
        lat_north: 2.0,
        lon_west: 0.0,
        lon_east: 2.0,
        lat_delta: 1.0,
        lon_delta: 1.0,
        horz_scale: 1.0,
        vert_scale: 1.0,
        from_gcs: "NAD27".to_string(),
        from_vcs: String::new(),
        from_semi_major: 6378206.4,
        from_flattening: 1.0 / 294.978_698_2,
        to_gcs: "NAD83".to_string(),
        to_vcs: String::new(),
        to_semi_major: 6378137.0,
        to_flattening: 1.0 / 298.257_222_101,
    }
}

fn sample_nodes() -> Vec<Node> {
    (0..9)
        .map(|i| Node {
            lat_value: i as f32,
            lon_value: (i * 2) as f32,
            hgt_value: (i * 3) as f32,
        })
        .collect()
}

fn write_sample(path: &std::path::Path, byte_order: ByteOrder) {
    let grid = Grid::in_memory(sample_header(), sample_nodes()).unwrap();
    grid.write(path, byte_order).unwrap();
}

#[test]
fn round_trips_through_native_byte_order() {
    let tempfile = NamedTempFile::with_suffix(".gcb").unwrap();
    write_sample(tempfile.path(), ByteOrder::Native);

    let loaded = Grid::load(tempfile.path(), None, true).unwrap();
    assert_eq!(loaded.nrows(), 3);
    assert_eq!(loaded.ncols(), 3);
    for row in 0..3 {
        for col in 0..3 {
            let expected = sample_nodes()[row * 3 + col];
            assert_eq!(loaded.node(row as i32, col as i32), expected);
        }
    }
    assert_eq!(loaded.header().from_gcs, "NAD27");
    assert_eq!(loaded.header().to_gcs, "NAD83");
}

#[test]
fn big_and_little_endian_round_trip_to_the_same_values() {
    for byte_order in [ByteOrder::Big, ByteOrder::Little] {
        let tempfile = NamedTempFile::with_suffix(".gcb").unwrap();
        write_sample(tempfile.path(), byte_order);
        let loaded = Grid::load(tempfile.path(), None, true).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                let expected = sample_nodes()[row * 3 + col];
                assert_eq!(loaded.node(row as i32, col as i32), expected);
            }
        }
    }
}

#[test]
fn streaming_fetch_matches_fully_loaded_fetch() {
    let tempfile = NamedTempFile::with_suffix(".gcb").unwrap();
    write_sample(tempfile.path(), ByteOrder::Big);

    let loaded = Grid::load(tempfile.path(), None, true).unwrap();
    let streamed = Grid::load(tempfile.path(), None, false).unwrap();

    for row in 0..3 {
        for col in 0..3 {
            assert_eq!(loaded.node(row as i32, col as i32), streamed.node(row as i32, col as i32));
        }
    }
}

#[test]
fn crops_on_load_and_skips_unrequested_nodes() {
    let tempfile = NamedTempFile::with_suffix(".gcb").unwrap();
    write_sample(tempfile.path(), ByteOrder::Native);

    let extent = Extent::new(0.5, 0.5, 1.5, 1.5);
    let loaded = Grid::load(tempfile.path(), Some(extent), true).unwrap();
    assert_eq!(loaded.nrows(), 1);
    assert_eq!(loaded.ncols(), 1);
    // The single remaining node is the original grid's center node, (1,1).
    assert_eq!(loaded.node(0, 0), sample_nodes()[1 * 3 + 1]);
}

#[test]
fn streaming_fetch_matches_fully_loaded_fetch_when_cropped() {
    let tempfile = NamedTempFile::with_suffix(".gcb").unwrap();
    write_sample(tempfile.path(), ByteOrder::Big);

    let extent = Extent::new(0.5, 0.5, 1.5, 1.5);
    let loaded = Grid::load(tempfile.path(), Some(extent), true).unwrap();
    let streamed = Grid::load(tempfile.path(), Some(extent), false).unwrap();

    assert_eq!(loaded.nrows(), streamed.nrows());
    assert_eq!(loaded.ncols(), streamed.ncols());
    for row in 0..loaded.nrows() {
        for col in 0..loaded.ncols() {
            assert_eq!(loaded.node(row, col), streamed.node(row, col));
        }
    }
    // The single remaining node is the original grid's center node, (1,1).
    assert_eq!(streamed.node(0, 0), sample_nodes()[1 * 3 + 1]);
}

#[test]
fn closing_a_grid_is_idempotent() {
    let tempfile = NamedTempFile::with_suffix(".gcb").unwrap();
    write_sample(tempfile.path(), ByteOrder::Native);
    let mut loaded = Grid::load(tempfile.path(), None, true).unwrap();
    loaded.close();
    loaded.close();
}

#[test]
fn loading_a_nonexistent_file_is_an_error() {
    let err = Grid::load("/nonexistent/path/grid.gcb", None, true).unwrap_err();
    assert!(matches!(err, geocon::Error::FileNotFound(_)));
}

#[test]
fn loading_an_unknown_extension_is_an_error() {
    let tempfile = NamedTempFile::with_suffix(".txt").unwrap();
    let err = Grid::load(tempfile.path(), None, true).unwrap_err();
    assert!(matches!(err, geocon::Error::UnknownFileType(_)));
}
