/// Declaration file listing every localization key, read by the editor's
/// TypeScript tooling.
pub const TYPINGS_PATH: &str = "thing-editor/src/editor/localization-typings.d.ts";

/// Render the `LocalizationKeys` interface with one overload per key.
///
/// Keys read from disk are not validated, so each one is written as an
/// escaped string literal.
pub fn generate_typings<'a>(keys: impl IntoIterator<Item = &'a str>) -> String {
    let mut lines = vec!["interface LocalizationKeys {".to_string()];
    lines.extend(keys.into_iter().map(|key| {
        let literal = serde_json::Value::String(key.to_string());
        format!("(id: {}, values?: KeyedObject): string;", literal)
    }));
    lines.push("}".to_string());
    lines.join("\n")
}
