//! `minicursor tools` — list the built-in tools.

use minicursor_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = minicursor_tools::default_registry(&config.tools)?;

    println!("🔧 Built-in tools ({})", registry.len());
    println!("====================\n");
    for definition in registry.definitions() {
        println!("  {}", definition.name);
        println!("    {}", definition.description);
        let schema = serde_json::to_string_pretty(&definition.parameters)?;
        for line in schema.lines() {
            println!("      {line}");
        }
        println!();
    }
    Ok(())
}
