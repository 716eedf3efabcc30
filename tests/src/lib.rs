//! Cross-crate scenarios: address expansion feeding the scheduler, and the
//! real probes run against loopback services.

#[cfg(test)]
mod scan;
