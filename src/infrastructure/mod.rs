pub mod audio;
pub mod backends;
pub mod renderers;
