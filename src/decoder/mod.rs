pub mod decode;
pub mod options;
pub mod record;
pub mod relation;
