//! Presentation mapping from descriptor props to inline CSS.
//!
//! Mirrors the tables of the browser runtime (`assets/runtime.js`) so both
//! produce the same styles. Prop tests follow JavaScript truthiness: `0`,
//! `""`, `false` and `null` count as absent.

use serde_json::{Number, Value};

const DEFAULT_BORDER_COLOR: &str = "#d1d5db";

/// Whether a JSON value is truthy under JavaScript rules.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Format a number the way JavaScript prints it (`10`, not `10.0`).
pub fn js_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

/// `String(value)` in JavaScript, with `null` mapped to the empty string.
pub fn plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => js_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn px(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(format!("{}px", js_number(n))),
        _ => None,
    }
}

/// Width/height: numbers are pixels, `"full"` is `100%`, strings pass through.
pub fn size(value: &Value) -> String {
    match value {
        Value::String(s) if s == "full" => "100%".to_string(),
        other => px(other).unwrap_or_else(|| plain(other)),
    }
}

/// Padding/margin: a number, or a `{top, right, bottom, left}` map. Numeric
/// sides are pixels, string sides pass through and missing ones are `0px`.
pub fn spacing(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let side = |name: &str| match map.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => px(other).unwrap_or_else(|| "0px".to_string()),
                None => "0px".to_string(),
            };
            format!("{} {} {} {}", side("top"), side("right"), side("bottom"), side("left"))
        }
        other => px(other).unwrap_or_else(|| plain(other)),
    }
}

fn named_color(name: &str) -> Option<&'static str> {
    Some(match name {
        "primary" => "#3b82f6",
        "secondary" => "#6b7280",
        "success" => "#10b981",
        "danger" => "#ef4444",
        "warning" => "#f59e0b",
        "info" => "#06b6d4",
        "black" => "#000000",
        "white" => "#ffffff",
        "gray" => "#6b7280",
        "red" => "#ef4444",
        "blue" => "#3b82f6",
        "green" => "#10b981",
        "yellow" => "#f59e0b",
        "purple" => "#8b5cf6",
        "pink" => "#ec4899",
        _ => return None,
    })
}

/// Named palette colours, `gradient-<from>-<to>`, or any CSS colour.
pub fn color(name: &str) -> String {
    if let Some(rest) = name.strip_prefix("gradient-") {
        if let Some((from, to)) = rest.split_once('-') {
            if !to.contains('-') {
                let from = named_color(from).unwrap_or(from);
                let to = named_color(to).unwrap_or(to);
                return format!("linear-gradient(135deg, {from}, {to})");
            }
        }
    }
    named_color(name).map_or_else(|| name.to_string(), str::to_string)
}

pub fn color_value(value: &Value) -> String {
    color(&plain(value))
}

pub fn font_size(value: &Value) -> String {
    let mapped = match value.as_str() {
        Some("xs") => "0.75rem",
        Some("sm") => "0.875rem",
        Some("md") => "1rem",
        Some("lg") => "1.125rem",
        Some("xl") => "1.25rem",
        Some("2xl") => "1.5rem",
        Some("3xl") => "1.875rem",
        Some("4xl") => "2.25rem",
        _ => return px(value).unwrap_or_else(|| plain(value)),
    };
    mapped.to_string()
}

pub fn font_weight(value: &Value) -> String {
    let mapped = match value.as_str() {
        Some("normal") => "400",
        Some("medium") => "500",
        Some("semibold") => "600",
        Some("bold") => "700",
        _ => return plain(value),
    };
    mapped.to_string()
}

/// Corner radius: `true` is the default radius, numbers are pixels.
pub fn rounded(value: &Value) -> String {
    match value {
        Value::Bool(true) => "0.375rem".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => px(other).unwrap_or_else(|| plain(other)),
    }
}

pub fn shadow(value: &Value) -> String {
    let mapped = match value.as_str() {
        Some("sm") => "0 1px 2px 0 rgba(0, 0, 0, 0.05)",
        Some("md") => "0 4px 6px -1px rgba(0, 0, 0, 0.1)",
        Some("lg") => "0 10px 15px -3px rgba(0, 0, 0, 0.1)",
        Some("xl") => "0 20px 25px -5px rgba(0, 0, 0, 0.1)",
        Some("2xl") => "0 25px 50px -12px rgba(0, 0, 0, 0.25)",
        Some("none") => "none",
        _ => return plain(value),
    };
    mapped.to_string()
}

/// Button padding for a size name; unknown sizes fall back to `md`.
pub fn button_padding(value: Option<&Value>) -> &'static str {
    match value.and_then(Value::as_str) {
        Some("sm") => "0.5rem 1rem",
        Some("lg") => "0.75rem 1.5rem",
        Some("xl") => "1rem 2rem",
        _ => "0.625rem 1.25rem",
    }
}

pub fn button_font_size(value: Option<&Value>) -> &'static str {
    match value.and_then(Value::as_str) {
        Some("sm") => "0.875rem",
        Some("lg") => "1.125rem",
        Some("xl") => "1.25rem",
        _ => "1rem",
    }
}

/// Background, text colour and border for a button variant.
pub fn button_colors(color_prop: Option<&Value>, variant: Option<&Value>) -> Vec<(&'static str, String)> {
    let base = color_prop.map(color_value).unwrap_or_default();
    match variant.and_then(Value::as_str) {
        Some("outline") => vec![
            ("background", "transparent".to_string()),
            ("color", base.clone()),
            ("border", format!("2px solid {base}")),
        ],
        Some("ghost") => vec![
            ("background", "transparent".to_string()),
            ("color", base),
            ("border", "none".to_string()),
        ],
        Some("link") => vec![
            ("background", "transparent".to_string()),
            ("color", base),
            ("border", "none".to_string()),
            ("text-decoration", "underline".to_string()),
        ],
        _ => vec![
            ("background", base),
            ("color", "#ffffff".to_string()),
            ("border", "none".to_string()),
        ],
    }
}

/// A pixel width, or a `{width, color, style}` map. Anything else is ignored.
pub fn border(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(format!("{}px solid {DEFAULT_BORDER_COLOR}", js_number(n))),
        Value::Object(map) => {
            let width = map
                .get("width")
                .filter(|w| truthy(w))
                .map_or_else(|| "1".to_string(), plain);
            let color = map
                .get("color")
                .filter(|c| truthy(c))
                .map_or_else(|| DEFAULT_BORDER_COLOR.to_string(), plain);
            let style = map
                .get("style")
                .filter(|s| truthy(s))
                .map_or_else(|| "solid".to_string(), plain);
            Some(format!("{width}px {style} {color}"))
        }
        _ => None,
    }
}

/// `align` to `align-items`.
pub fn align(value: Option<&Value>) -> &'static str {
    match value.and_then(Value::as_str) {
        Some("start") => "flex-start",
        Some("center") => "center",
        Some("end") => "flex-end",
        _ => "stretch",
    }
}

/// `justify` to `justify-content`.
pub fn justify(value: Option<&Value>) -> &'static str {
    match value.and_then(Value::as_str) {
        Some("center") => "center",
        Some("end") => "flex-end",
        Some("between") => "space-between",
        Some("around") => "space-around",
        _ => "flex-start",
    }
}

/// Split a raw `style` string into `(property, value)` pairs.
pub fn parse_inline(css: &str) -> Vec<(String, String)> {
    css.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let (name, value) = (name.trim(), value.trim());
            (!name.is_empty() && !value.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sizes() {
        assert_eq!(size(&json!(280)), "280px");
        assert_eq!(size(&json!("full")), "100%");
        assert_eq!(size(&json!("100vh")), "100vh");
        assert_eq!(size(&json!(12.5)), "12.5px");
    }

    #[test]
    fn spacing_maps_default_missing_sides() {
        assert_eq!(spacing(&json!(20)), "20px");
        assert_eq!(spacing(&json!({"top": 20, "left": 4})), "20px 0px 0px 4px");
    }

    #[test]
    fn spacing_string_sides_keep_their_unit() {
        assert_eq!(spacing(&json!({"top": "1rem"})), "1rem 0px 0px 0px");
        assert_eq!(spacing(&json!({"left": "5%", "right": 8, "bottom": null})), "0px 8px 0px 5%");
    }

    #[test]
    fn colors_and_gradients() {
        assert_eq!(color("primary"), "#3b82f6");
        assert_eq!(color("#0f172a"), "#0f172a");
        assert_eq!(color("gradient-purple-pink"), "linear-gradient(135deg, #8b5cf6, #ec4899)");
        assert_eq!(color("gradient-#111-#222"), "linear-gradient(135deg, #111, #222)");
        assert_eq!(color("gradient-a-b-c"), "gradient-a-b-c");
    }

    #[test]
    fn typography() {
        assert_eq!(font_size(&json!("2xl")), "1.5rem");
        assert_eq!(font_size(&json!(18)), "18px");
        assert_eq!(font_weight(&json!("semibold")), "600");
        assert_eq!(font_weight(&json!("900")), "900");
    }

    #[test]
    fn radii_and_shadows() {
        assert_eq!(rounded(&json!(true)), "0.375rem");
        assert_eq!(rounded(&json!(12)), "12px");
        assert_eq!(shadow(&json!("md")), "0 4px 6px -1px rgba(0, 0, 0, 0.1)");
    }

    #[test]
    fn button_variants() {
        let outline = button_colors(Some(&json!("danger")), Some(&json!("outline")));
        assert_eq!(outline[2], ("border", "2px solid #ef4444".to_string()));

        let solid = button_colors(Some(&json!("primary")), None);
        assert_eq!(solid[0], ("background", "#3b82f6".to_string()));
        assert_eq!(button_padding(Some(&json!("huge"))), "0.625rem 1.25rem");
    }

    #[test]
    fn borders() {
        assert_eq!(border(&json!(2)).as_deref(), Some("2px solid #d1d5db"));
        assert_eq!(
            border(&json!({"color": "red", "style": "dashed"})).as_deref(),
            Some("1px dashed red")
        );
        assert_eq!(border(&json!("thin")), None);
    }

    #[test]
    fn alignment_falls_back() {
        assert_eq!(align(Some(&json!("end"))), "flex-end");
        assert_eq!(align(None), "stretch");
        assert_eq!(justify(Some(&json!("between"))), "space-between");
        assert_eq!(justify(Some(&json!("nope"))), "flex-start");
    }

    #[test]
    fn truthiness_and_plain_strings() {
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!({})));
        assert_eq!(plain(&json!(3.0)), "3");
        assert_eq!(plain(&Value::Null), "");
    }

    #[test]
    fn inline_styles() {
        assert_eq!(
            parse_inline("color: red; ;margin:0 auto"),
            vec![
                ("color".to_string(), "red".to_string()),
                ("margin".to_string(), "0 auto".to_string())
            ]
        );
    }
}
