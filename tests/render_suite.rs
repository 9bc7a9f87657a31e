use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use neon_rs_renderer::mounts::place_mounts;
use neon_rs_renderer::store::STORAGE_KEY;
use neon_rs_renderer::{
    Config, ContainerId, FileStorage, Geometry, LightAnimator, MeasuredSize, PreferenceStore,
    SizeObserver, StorageBackend, Uid, load_config, render_light, render_svg, resolve_geometry,
    settled_frame,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: NaN in output");
    assert_eq!(
        svg.matches("<g").count(),
        svg.matches("</g>").count(),
        "{fixture}: unbalanced groups"
    );
}

fn fixture_config(name: &str) -> Config {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    load_config(Some(&path)).unwrap_or_else(|err| panic!("{name}: {err}"))
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "ring.json5",
        "bar.json5",
        "washer_ring.json",
        "vertical_bolts.json5",
        "glass_card.json5",
    ];
    for name in fixtures {
        let config = fixture_config(name);
        for lights_on in [true, false] {
            let frame = settled_frame(&config.neon, lights_on);
            let svg = render_svg(&config, &frame, &Uid::new("suite"));
            assert_valid_svg(&svg, name);
            assert!(svg.contains("id=\"suite_tubeMask\""), "{name}: missing mask");
            assert_eq!(
                svg.contains("class=\"glow\""),
                lights_on,
                "{name}: halo visibility"
            );
        }
    }
}

#[test]
fn fixture_settings_reach_the_output() {
    let ring = fixture_config("ring.json5");
    let svg = render_svg(&ring, &settled_frame(&ring.neon, true), &Uid::new("r"));
    assert_eq!(svg.matches("class=\"mount\"").count(), 4);
    assert!(svg.contains("stroke=\"#00a6ff\""));
    assert!(svg.contains("#d7dce1"));

    let bar = fixture_config("bar.json5");
    let svg = render_svg(&bar, &settled_frame(&bar.neon, true), &Uid::new("b"));
    assert!(!svg.contains("<rect width=\"100%\""));
    assert!(svg.contains("id=\"b_bg_1\""));
    assert!(!svg.contains("id=\"b_bg_2\""));
    assert!(!svg.contains("feMorphology"));

    let washers = fixture_config("washer_ring.json");
    let svg = render_svg(&washers, &settled_frame(&washers.neon, false), &Uid::new("w"));
    assert!(svg.contains("stroke-dasharray"));
    assert!(svg.contains("url(#w_washerSteel)"));

    let card = fixture_config("glass_card.json5");
    let svg = render_svg(&card, &settled_frame(&card.neon, true), &Uid::new("g"));
    assert!(!svg.contains("<rect width=\"100%\""));
    assert!(!svg.contains("class=\"mount\""));
    assert_eq!(svg.matches("class=\"frame-mount\"").count(), 4);
    // 120px tall card: stops 0.24 and 0.76 land on rows 29 and 91
    for corner in ["translate(0 29)", "translate(0 91)", "translate(360 29)", "translate(360 91)"] {
        assert!(svg.contains(corner), "missing washer at {corner}");
    }
    assert!(svg.contains("stroke=\"#00ffc8\""));
}

#[test]
fn vertical_bolts_respect_padding() {
    let config = fixture_config("vertical_bolts.json5");
    let size = MeasuredSize::new(40, 600);
    let geometry = resolve_geometry(config.neon.orientation, size, config.neon.stroke);
    let Geometry::Line { y1, y2, .. } = geometry else {
        panic!("expected a line");
    };
    let anchors = place_mounts(&geometry, &config.neon.mounts);
    assert_eq!(anchors.len(), 3);
    assert!((anchors[0].y - (y1 + 10.0)).abs() < 0.5);
    assert!((anchors[2].y - (y2 - 30.0)).abs() < 0.5);
    assert!(anchors.iter().all(|a| a.x == 20.0 && a.angle_deg == 0.0));
}

#[test]
fn preference_persists_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut first = PreferenceStore::new(FileStorage::new(dir.path()));
    first.set(false);
    first.next();
    first.next();
    let saved = first.state().clone();
    assert!(dir.path().join("lights.json").exists());

    let second = PreferenceStore::new(FileStorage::new(dir.path()));
    assert_eq!(second.state(), &saved);
    assert_eq!(second.state().light.name, "Electric Purple");

    let raw = second
        .backend()
        .load(STORAGE_KEY)
        .expect("readable")
        .expect("present");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["version"], 3);
    assert_eq!(value["state"]["lightsOn"], false);
}

#[test]
fn corrupted_file_falls_back_to_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("lights.json"), "{\"state\":").expect("write");
    let store = PreferenceStore::new(FileStorage::new(dir.path()));
    assert!(store.state().lights_on);
    assert_eq!(store.state().light.name, "Pink");
}

#[test]
fn missing_state_dir_is_created_on_first_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("nested").join("state");
    let mut store = PreferenceStore::new(FileStorage::new(&nested));
    store.toggle();
    assert!(nested.join("lights.json").exists());
}

#[test]
fn observer_drives_light_size() {
    let config = fixture_config("bar.json5");
    let mut observer = SizeObserver::new();
    let latest = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&latest);
    let container = ContainerId(1);
    let sub = observer.observe(container, move |size| *sink.borrow_mut() = Some(size));

    observer.report(container, 300.4, 39.6);
    let size = latest.borrow().expect("size emitted");
    let svg = render_light(
        &config.neon,
        size,
        &settled_frame(&config.neon, true),
        &Uid::new("o"),
    );
    assert!(svg.contains("viewBox=\"0 0 300 40\""));

    assert!(observer.unobserve(sub));
    observer.report(container, 500.0, 40.0);
    assert_eq!(*latest.borrow(), Some(MeasuredSize::new(300, 40)));
}

#[test]
fn color_fades_out_before_halo() {
    let config = fixture_config("bar.json5");
    let mut animator = LightAnimator::new(&config.neon, true);
    animator.set_lights(false);
    animator.advance(120.0);
    let frame = animator.frame();
    assert_eq!(frame.color_mix, 0.0);
    assert!(frame.halo_opacity > 0.0);
    animator.advance(60.0);
    assert_eq!(animator.frame().halo_opacity, 0.0);
}
