use anyhow::Context;
use inquire::Text;

/// Ask for one coordinate as raw text; parsing happens in the pipeline.
pub fn coordinate(message: &str) -> anyhow::Result<String> {
    Text::new(message)
        .with_help_message("decimal degrees, e.g. 54.5742")
        .prompt()
        .with_context(|| format!("Failed to read answer to '{message}'"))
}
