pub mod category;
pub mod importer;
pub mod m3u_parser;

pub use category::normalize_category;
pub use importer::ChannelImporter;
pub use m3u_parser::M3uParser;
