//! `driftmind status` — memory and studio state at a glance.

use driftmind_config::AppConfig;
use driftmind_memory::MemoryStore;
use driftmind_sandbox::PathSandbox;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let memory = MemoryStore::open(config.memory_root.clone());

    println!("Driftmind status");
    println!("  Memory root: {}", config.memory_root.display());
    println!("  Archive:     {} records", memory.archive_len());
    println!("  Experience:  {} actions", memory.experience_len());

    let projects = memory.projects();
    let active = projects.iter().filter(|p| p.is_active()).count();
    println!("  Projects:    {} total, {active} active", projects.len());
    for project in projects.iter().filter(|p| p.is_active()) {
        println!(
            "    - {} (last worked {})",
            project.name,
            project.last_worked.format("%Y-%m-%d %H:%M")
        );
    }

    if config.sandbox_root.exists() {
        let sandbox = PathSandbox::create(config.sandbox_root.clone())?;
        let stats = sandbox.stats()?;
        println!(
            "  Studio:      {} files in {} directories, {} bytes",
            stats.files, stats.directories, stats.total_bytes
        );
    } else {
        println!("  Studio:      not initialized (run `driftmind onboard`)");
    }

    Ok(())
}
