//! Configuration loading for the CLI

use crate::error::CliResult;
use arena_types::ArenaConfig;

/// Load configuration by layering defaults, then an optional file, then
/// `ARENA_`-prefixed environment variables. Validation runs once here;
/// everything downstream can trust the result.
pub fn load(path: Option<&str>) -> CliResult<ArenaConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&ArenaConfig::default())?);

    // Add file configuration if provided
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path));
    }

    // Add environment variables with ARENA_ prefix
    builder = builder.add_source(
        config::Environment::with_prefix("ARENA")
            .separator("_")
            .try_parsing(true),
    );

    let config: ArenaConfig = builder.build()?.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
