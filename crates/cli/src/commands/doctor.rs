//! `minicursor doctor` — diagnose configuration and connectivity.

use minicursor_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 minicursor Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file — using defaults (run `minicursor init`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    println!("  ✅ Model: {} at {}", config.model, config.api_base_url);

    match minicursor_tools::default_registry(&config.tools) {
        Ok(registry) => println!("  ✅ {} tools registered", registry.len()),
        Err(e) => {
            println!("  ❌ Tool registry: {e}");
            issues += 1;
        }
    }

    if let Some(dir) = &config.tools.working_directory
        && !dir.is_dir()
    {
        println!("  ❌ tools.working_directory does not exist: {}", dir.display());
        issues += 1;
    }

    if config.has_api_key() {
        println!("  ✅ API key configured");
        match minicursor_providers::build_from_config(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Endpoint reachable"),
                Ok(false) => {
                    println!("  ❌ Endpoint rejected the request (check key and base URL)");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Endpoint unreachable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Model client: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ⚠️  No API key configured — export OPENAI_API_KEY");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
