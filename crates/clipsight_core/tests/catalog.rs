use clipsight_core::{derive_items, friendly_name};

fn manifest(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const MEDIA_ROOT: &str = "http://127.0.0.1:8000/media";

#[test]
fn items_keep_manifest_order() {
    let outputs = manifest(&[
        ("voronoi", "outputs/9/match_with_voronoi.avi"),
        ("detections", "outputs/9/output_video.avi"),
    ]);
    let items = derive_items(&outputs, MEDIA_ROOT);

    let keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, ["voronoi", "detections"]);
}

#[test]
fn filename_is_the_path_basename() {
    let outputs = manifest(&[("detections", "outputs/9/output_video.avi")]);
    let items = derive_items(&outputs, MEDIA_ROOT);
    assert_eq!(items[0].filename, "output_video.avi");

    // A bare filename is its own basename.
    let outputs = manifest(&[("detections", "output_video.avi")]);
    let items = derive_items(&outputs, MEDIA_ROOT);
    assert_eq!(items[0].filename, "output_video.avi");
}

#[test]
fn url_prefixes_the_media_root() {
    let outputs = manifest(&[("voronoi", "outputs/9/match_with_voronoi.avi")]);
    let items = derive_items(&outputs, MEDIA_ROOT);
    assert_eq!(
        items[0].url,
        "http://127.0.0.1:8000/media/outputs/9/match_with_voronoi.avi"
    );
}

#[test]
fn url_does_not_duplicate_an_existing_media_prefix() {
    let with_prefix = manifest(&[("voronoi", "media/outputs/9/v.avi")]);
    let without = manifest(&[("voronoi", "outputs/9/v.avi")]);

    let a = derive_items(&with_prefix, MEDIA_ROOT);
    let b = derive_items(&without, MEDIA_ROOT);
    assert_eq!(a[0].url, b[0].url);
    assert_eq!(a[0].url, "http://127.0.0.1:8000/media/outputs/9/v.avi");
}

#[test]
fn url_join_tolerates_stray_slashes() {
    let outputs = manifest(&[("voronoi", "/outputs/9/v.avi")]);
    let items = derive_items(&outputs, "http://127.0.0.1:8000/media/");
    assert_eq!(items[0].url, "http://127.0.0.1:8000/media/outputs/9/v.avi");
}

#[test]
fn friendly_names_are_title_cased() {
    assert_eq!(friendly_name("ball_tracking"), "Ball Tracking");
    assert_eq!(friendly_name("voronoi"), "Voronoi");
    assert_eq!(friendly_name("tactical_board"), "Tactical Board");
    // Total for any non-empty key, including odd ones.
    assert_eq!(friendly_name("pitch_edges_v2"), "Pitch Edges V2");
}
