use crate::analyzer::ClassManifestEntry;
use crate::error::Result;

/// File name of the generated registration module inside the build dir.
pub const CLASSES_MODULE: &str = "classes.ts";

const HEADER: &str = "/* this file is generated by thing-editor.
\tPlease do not modify it. Any changes will be overridden anyway.*/

\timport { KeyedObject, SourceMappedConstructor } from \"thing-editor/src/editor/env\";
\timport Lib from \"thing-editor/src/engine/lib\";
\tconst classes:KeyedObject = {};";

/// Render the module that imports every retained class, registers it by name
/// and installs the map into the runtime library.
///
/// `entries` must already be sorted; the output is byte-identical for equal
/// input.
pub fn generate_class_registration(entries: &[ClassManifestEntry]) -> Result<String> {
    let mut src = vec![HEADER.to_string()];
    for entry in entries {
        let name = &entry.class_name;
        let path = entry.source_path.trim_start_matches('/');
        src.push(format!("import {} from \"{}\";", name, path));
        src.push(format!("classes[\"{}\"] = {};", name, name));
        src.push(format!(
            "{}.__defaultValues = {};",
            name,
            serde_json::to_string(&entry.default_values)?
        ));
    }
    src.push("Lib._setClasses(classes);".to_string());
    Ok(src.join("\n"))
}
