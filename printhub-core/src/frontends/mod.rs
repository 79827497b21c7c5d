//! UI asset providers: templates and static files, embedded in the binary or read from a directory.

pub mod provider_disk;
pub mod provider_embed;
