mod generate;
mod import;
mod init;
mod serve;

pub use generate::cmd_generate;
pub use import::cmd_import;
pub use init::cmd_init;
pub use serve::cmd_serve;
