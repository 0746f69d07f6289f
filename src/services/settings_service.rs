//! Admin settings: sanitizing the stored options blob and deriving the theme.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::{
    error::{AppError, Result},
    models::{
        DEFAULT_BORDER_RADIUS, DEFAULT_BTN_TEXT_COLOR, DEFAULT_PER_PAGE, DEFAULT_PRIMARY_COLOR,
        DEFAULT_STATS_BOX_BG, DashboardSettings, DashboardTab, ProfileField, Theme,
    },
    store::DataStore,
};

const MAX_BORDER_RADIUS: u32 = 40;
const MAX_PER_PAGE: usize = 50;

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
});

pub fn sanitize_hex_color(raw: Option<&Value>, fallback: &str) -> String {
    raw.and_then(Value::as_str)
        .map(str::trim)
        .filter(|color| HEX_COLOR_RE.is_match(color))
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn integer(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn known_ids<T: Copy + PartialEq>(
    raw: Option<&Value>,
    from_id: impl Fn(&str) -> Option<T>,
    fallback: &[T],
) -> Vec<T> {
    let Some(list) = raw.and_then(Value::as_array) else {
        return fallback.to_vec();
    };

    let mut ids = Vec::new();
    for id in list.iter().filter_map(Value::as_str).filter_map(&from_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Coerces arbitrary JSON into valid settings. Bad values fall back per key,
/// unknown tab or field ids are dropped.
pub fn sanitize_settings(input: &Value) -> DashboardSettings {
    let empty = Map::new();
    let map = input.as_object().unwrap_or(&empty);
    let defaults = DashboardSettings::default();

    let border_radius = integer(map.get("border_radius"))
        .map(|n| n.clamp(0, i64::from(MAX_BORDER_RADIUS)) as u32)
        .unwrap_or(DEFAULT_BORDER_RADIUS);
    let per_page = integer(map.get("per_page"))
        .map(|n| n.clamp(1, MAX_PER_PAGE as i64) as usize)
        .unwrap_or(DEFAULT_PER_PAGE);

    DashboardSettings {
        primary_color: sanitize_hex_color(map.get("primary_color"), DEFAULT_PRIMARY_COLOR),
        btn_text_color: sanitize_hex_color(map.get("btn_text_color"), DEFAULT_BTN_TEXT_COLOR),
        stats_box_bg: sanitize_hex_color(map.get("stats_box_bg"), DEFAULT_STATS_BOX_BG),
        border_radius,
        per_page,
        tabs_enabled: known_ids(
            map.get("tabs_enabled"),
            DashboardTab::from_id,
            &defaults.tabs_enabled,
        ),
        fields_enabled: known_ids(
            map.get("fields_enabled"),
            ProfileField::from_id,
            &defaults.fields_enabled,
        ),
    }
}

/// Overlays the stored blob on the defaults before sanitizing, so keys added
/// in later versions pick up their default instead of vanishing.
pub fn merge_over_defaults(stored: Option<Value>) -> Result<DashboardSettings> {
    let mut merged = serde_json::to_value(DashboardSettings::default())
        .map_err(|e| AppError::Internal(format!("Failed to encode default settings: {e}")))?;

    if let (Some(Value::Object(stored)), Value::Object(target)) = (stored, &mut merged) {
        for (key, value) in stored {
            target.insert(key, value);
        }
    }

    Ok(sanitize_settings(&merged))
}

pub async fn load_settings(store: &dyn DataStore, name: &str) -> Result<DashboardSettings> {
    let stored = store.load_settings(name).await?;
    if stored.is_none() {
        tracing::info!(option = name, "No stored dashboard settings, using defaults");
    }
    merge_over_defaults(stored)
}

pub async fn save_settings(
    store: &dyn DataStore,
    name: &str,
    input: &Value,
) -> Result<DashboardSettings> {
    let settings = sanitize_settings(input);
    let value = serde_json::to_value(&settings)
        .map_err(|e| AppError::Internal(format!("Failed to encode settings: {e}")))?;

    store.save_settings(name, &value).await?;
    tracing::info!(option = name, "Dashboard settings saved");

    Ok(settings)
}

/// `#rgb` or `#rrggbb` as `rgba(r, g, b, alpha)`. Malformed input yields black.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> String {
    let digits = hex.trim_start_matches('#');
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    let channel = |range: std::ops::Range<usize>| {
        expanded
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0)
    };

    format!(
        "rgba({}, {}, {}, {})",
        channel(0..2),
        channel(2..4),
        channel(4..6),
        alpha
    )
}

pub fn theme(settings: &DashboardSettings) -> Theme {
    Theme {
        primary: settings.primary_color.clone(),
        btn_text: settings.btn_text_color.clone(),
        stats_bg: hex_to_rgba(&settings.stats_box_bg, 0.13),
        radius: format!("{}px", settings.border_radius),
    }
}
