pub mod link_check;
pub mod mailbox;
