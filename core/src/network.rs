pub mod channel;
pub mod icmp;
