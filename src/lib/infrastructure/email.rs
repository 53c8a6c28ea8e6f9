//! Email transport implementations

pub mod elastic_email;
