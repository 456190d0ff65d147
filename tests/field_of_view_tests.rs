use std::fs;
use std::path::Path;

use loci_layers::layer::{MarkerSize, Symbol, FAIL_CODES_PROPERTY};
use loci_layers::{
    Layer, LayerKind, LociError, LociReader, NpyVolumeReader, ReaderConfig, Volume,
};
use ndarray::{Array5, IxDyn};

const FAIL_LINES_SAMPLE: &str = "\
0,13,5.880338307654485,12.20211975317036,10.728294496728491,S
0,17,10.594366532607864,10.95875680073854,20.711938561802768,R;S;xy;z
0,47,10.198132167665957,14.398450914314138,15.378219719077295,R
0,48,0.7173811741523715,13.999908344240598,2.011625563698183,R;z
0,49,6.274792365451074,14.440034853392085,8.81613597404698,S
0,69,10.03907938905064,18.453449673327853,7.594187495036839,R;S;xy;z
0,71,8.157075382512406,12.780500232574296,3.1916456736466685,R
0,74,7.03360935199292,15.324188332927145,3.6995859572616823,xy
0,76,2.426576702500344,20.546530442060508,2.151493771689803,R;S;xy;O
0,77,6.0415531254567885,13.910733825016758,10.238202728231837,S
";

const PASS_HEADED_WITH_REGION: &str = "\
traceIndex,regionIndex,timeIndex,z,y,x
3,1,4,2.2,5.5,6.5
3,1,5,0.4,5.0,6.0
";

fn write_fov(dir: &Path, volume: &str, pass: &str, fail: &str) {
    if volume.ends_with(".zarr") {
        fs::create_dir(dir.join(volume)).unwrap();
    }
    fs::write(dir.join("P0001.qcpass.csv"), pass).unwrap();
    fs::write(dir.join("P0001.qcfail.csv"), fail).unwrap();
}

fn blank_volume(_: &Path) -> loci_layers::Result<Volume> {
    Ok(Volume::zeros(IxDyn(&[1, 1, 11, 32, 32])))
}

#[test]
fn failed_sample_expands_to_one_pillar_per_row() {
    let lines: Vec<&str> = FAIL_LINES_SAMPLE.lines().collect();
    assert_eq!(lines.len(), 10);
    let z_ceil = lines
        .iter()
        .map(|l| l.split(',').nth(2).unwrap().parse::<f64>().unwrap())
        .fold(f64::MIN, f64::max)
        .ceil() as usize;
    assert_eq!(z_ceil, 11);

    let dir = tempfile::tempdir().unwrap();
    write_fov(dir.path(), "P0001.zarr", "", FAIL_LINES_SAMPLE);

    let reader = LociReader::default();
    let fov = reader.get_reader(dir.path()).unwrap().expect("folder should be accepted");
    let layers = reader.read_layers(&fov, &blank_volume).unwrap();
    assert_eq!(layers.len(), 3);

    let fail = layers[1].as_points().unwrap();
    assert_eq!(fail.len(), z_ceil * lines.len());
    assert_eq!(fail.params.size, MarkerSize::Uniform(0.0));

    let codes = &fail.params.properties.as_ref().unwrap()[FAIL_CODES_PROPERTY];
    assert_eq!(codes.len(), fail.len());

    for (i, line) in lines.iter().enumerate() {
        let pillar = i * z_ceil..(i + 1) * z_ceil;
        let centers: Vec<usize> = pillar
            .clone()
            .filter(|&j| fail.params.symbol[j] == Symbol::Star)
            .collect();
        assert_eq!(centers.len(), 1, "row {i}");

        let expected_code = line.rsplit(',').next().unwrap();
        assert!(codes[pillar.clone()].iter().all(|c| c == expected_code));

        let z_fit: f64 = line.split(',').nth(2).unwrap().parse().unwrap();
        assert_eq!(fail.data[centers[0]][2], z_fit.floor());
    }

    // The pass table is empty but still yields a valid layer.
    let pass = layers[2].as_points().unwrap();
    assert!(pass.is_empty());
}

#[test]
fn headed_tables_with_region_flatten_to_six_fields() {
    let dir = tempfile::tempdir().unwrap();
    let fail = "traceId,regionIndex,timeIndex,z,y,x,failCode\n8,2,9,1.9,1.0,2.0,R;S;xy\n";
    write_fov(dir.path(), "P0001.zarr", PASS_HEADED_WITH_REGION, fail);

    let reader = LociReader::default();
    let fov = reader.get_reader(dir.path()).unwrap().unwrap();
    let (fail_layer, pass_layer) = reader.read_points_layers(&fov).unwrap();

    assert_eq!(pass_layer.len(), 6);
    assert!(pass_layer.data.iter().all(|row| row.len() == 6));
    assert_eq!(pass_layer.data[2], vec![3.0, 1.0, 4.0, 2.0, 5.5, 6.5]);
    assert_eq!(pass_layer.params.symbol[2], Symbol::Star);

    assert_eq!(fail_layer.data, vec![
        vec![8.0, 2.0, 9.0, 0.0, 1.0, 2.0],
        vec![8.0, 2.0, 9.0, 1.0, 1.0, 2.0],
    ]);
    let codes = &fail_layer.params.properties.as_ref().unwrap()[FAIL_CODES_PROPERTY];
    assert_eq!(codes, &vec!["R;S;xy".to_string(), "R;S;xy".to_string()]);
}

#[test]
fn npy_volume_feeds_the_image_layer() {
    let dir = tempfile::tempdir().unwrap();
    let volume = Array5::<u16>::from_elem((1, 1, 3, 4, 5), 7);
    ndarray_npy::write_npy(dir.path().join("P0001.npy"), &volume).unwrap();
    write_fov(dir.path(), "P0001.npy", "0,0,1.0,1.0,1.0\n", "0,0,2.0,1.0,1.0,z\n");

    let config = ReaderConfig {
        volume_suffix: ".npy".to_string(),
        ..ReaderConfig::default()
    };
    let reader = LociReader::new(&config).unwrap();
    let fov = reader.get_reader(dir.path()).unwrap().unwrap();
    let layers = reader.read_layers(&fov, &NpyVolumeReader).unwrap();

    let kinds: Vec<LayerKind> = layers.iter().map(Layer::kind).collect();
    assert_eq!(kinds, vec![LayerKind::Image, LayerKind::Points, LayerKind::Points]);
    let image = layers[0].as_image().unwrap();
    assert_eq!(image.data.shape(), &[1, 1, 3, 4, 5]);
    assert!(image.data.iter().all(|&v| v == 7));
}

#[test]
fn volume_failure_aborts_the_read() {
    let dir = tempfile::tempdir().unwrap();
    write_fov(dir.path(), "P0001.zarr", "0,0,1.0,1.0,1.0\n", "0,0,2.0,1.0,1.0,z\n");

    let reader = LociReader::default();
    let fov = reader.get_reader(dir.path()).unwrap().unwrap();
    // A .zarr folder is not an .npy file.
    let err = reader.read_layers(&fov, &NpyVolumeReader).unwrap_err();
    assert!(matches!(err, LociError::Volume { .. }));
}

#[test]
fn custom_colors_reach_the_layers() {
    let dir = tempfile::tempdir().unwrap();
    write_fov(dir.path(), "P0001.zarr", "0,0,1.0,1.0,1.0\n", "0,0,2.0,1.0,1.0,z\n");

    let config =
        ReaderConfig::from_json_str(r##"{"colors": {"pass": "#112233", "fail": "#445566"}}"##)
            .unwrap();
    let reader = LociReader::new(&config).unwrap();
    let fov = reader.get_reader(dir.path()).unwrap().unwrap();
    let (fail, pass) = reader.read_points_layers(&fov).unwrap();

    assert_eq!(pass.params_map()["face_color"], "#112233");
    assert_eq!(fail.params_map()["edge_color"], "#445566");
    assert_eq!(fail.params_map()["text"]["color"], "#445566");
}
