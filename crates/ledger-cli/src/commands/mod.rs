pub mod add_tx;
pub mod common;
pub mod init;
pub mod inspect;
