//! Config command - emit all hook configs as JSON

use addonkit_hooks::Registry;

use crate::error::Result;

/// Run the config command
pub fn run(registry: &Registry) -> Result<()> {
    println!("{}", render(registry)?);
    Ok(())
}

/// One JSON object keyed by hook name
pub fn render(registry: &Registry) -> Result<String> {
    let mut map = serde_json::Map::new();
    for hook in registry.hooks() {
        map.insert(
            hook.metadata.name.clone(),
            serde_json::to_value(&hook.config)?,
        );
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(
        map,
    ))?)
}
