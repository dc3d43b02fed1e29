/// In-process engine that does not load any content.
pub mod null;
