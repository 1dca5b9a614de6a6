//! `driftmind onboard` — initialize config, studio, and memory directories.

use driftmind_config::AppConfig;
use driftmind_sandbox::PathSandbox;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = AppConfig::config_dir();
    std::fs::create_dir_all(&dir)?;

    let config_path = dir.join("config.toml");
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("Wrote default config to {}", config_path.display());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let sandbox = PathSandbox::create(config.sandbox_root.clone())?;
    std::fs::create_dir_all(&config.memory_root)?;

    println!("Studio ready at {}", sandbox.root().display());
    println!("Memory ready at {}", config.memory_root.display());
    println!();
    println!("Next: set DRIFTMIND_API_KEY (or api_key in config.toml), then `driftmind run`.");
    Ok(())
}
