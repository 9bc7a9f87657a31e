use neon_rs_renderer::render::{RenderOptions, render_with_options};
use neon_rs_renderer::store::{
    MemoryStorage, PreferenceStore, STORAGE_KEY, decode_preference, encode_preference,
};
use neon_rs_renderer::theme::palette;
use neon_rs_renderer::{Uid, parse_config};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NeonRenderOptions {
    /// Config document in the same JSON5 shape the CLI reads.
    config: Option<serde_json::Value>,
    /// Stored `lights` blob, exactly as persisted.
    preference: Option<String>,
    uid: Option<String>,
}

fn build_render_options(options: NeonRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = RenderOptions::default();
    if let Some(config) = options.config {
        render_options.config =
            parse_config(&config.to_string()).map_err(|error| error.to_string())?;
    }
    render_options.preference = options
        .preference
        .as_deref()
        .and_then(|raw| decode_preference(raw, palette()));
    if let Some(uid) = options.uid {
        render_options.uid = Uid::new(&uid);
    }
    Ok(render_options)
}

fn render_from_json(options_json: Option<&str>) -> Result<String, String> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<NeonRenderOptions>(raw).map_err(|e| e.to_string())?,
        None => NeonRenderOptions::default(),
    };
    Ok(render_with_options(&build_render_options(options)?))
}

/// Runs one store action over a stored blob and returns the blob to persist.
fn apply_action(stored: Option<&str>, action: &str) -> Result<String, String> {
    let storage = match stored {
        Some(raw) => MemoryStorage::with_entry(STORAGE_KEY, raw),
        None => MemoryStorage::new(),
    };
    let mut store = PreferenceStore::new(storage);
    match action {
        "toggle" => store.toggle(),
        "on" => store.set(true),
        "off" => store.set(false),
        "next" => store.next(),
        "prev" => store.prev(),
        "load" => {}
        other => return Err(format!("unknown lights action '{other}'")),
    }
    encode_preference(store.state()).map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn render_neon_svg(options_json: Option<String>) -> Result<String, JsValue> {
    render_from_json(options_json.as_deref()).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn lights_action(stored: Option<String>, action: &str) -> Result<String, JsValue> {
    apply_action(stored.as_deref(), action).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn neon_palette_json() -> String {
    serde_json::to_string(palette()).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use crate::{apply_action, render_from_json};

    #[test]
    fn renders_with_defaults() {
        let svg = render_from_json(None).expect("default render");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("gt_0_coreBloom"));
    }

    #[test]
    fn renders_line_from_config_and_preference() {
        let blob = apply_action(None, "next").unwrap();
        let options = serde_json::json!({
            "config": { "orientation": "horizontal", "render": { "width": 300, "height": 40 } },
            "preference": blob,
            "uid": "hero",
        });
        let svg = render_from_json(Some(&options.to_string())).expect("line render");
        assert!(svg.contains("<line"));
        assert!(svg.contains("hero_tubeMask"));
        assert!(svg.contains("#00a6ff"));
    }

    #[test]
    fn actions_round_trip_through_blob() {
        let off = apply_action(None, "off").unwrap();
        let on = apply_action(Some(&off), "toggle").unwrap();
        assert!(off.contains("\"lightsOn\":false"));
        assert!(on.contains("\"lightsOn\":true"));
        assert!(apply_action(Some("garbage"), "load").unwrap().contains("\"version\":3"));
        assert!(apply_action(None, "explode").is_err());
    }
}
